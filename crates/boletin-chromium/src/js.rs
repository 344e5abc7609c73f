//! In-page probe scripts.
//!
//! Locators compile to small IIFE expressions evaluated in the page context.
//! Text matching scans links, buttons and inputs the same way the portal's
//! markup demands: case-insensitive substring over visible text or `value`.

use boletin_core::strategy::Locator;

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

/// JS statements that leave the matched element (or null) in `el`.
fn locate(locator: &Locator) -> String {
    match locator {
        Locator::Css(sel) => format!("let el = document.querySelector({});", quote(sel)),
        Locator::TextContains(needle) => format!(
            "const needle = {}.toLowerCase();\n\
             let el = Array.from(document.querySelectorAll('a, button, input[type=\"button\"], input[type=\"submit\"]'))\n\
               .find(n => ((n.textContent || '') + ' ' + (n.value || '')).toLowerCase().includes(needle));",
            quote(needle)
        ),
        Locator::AttrContains { attr, value } => format!(
            "const attr = {};\n\
             const value = {}.toLowerCase();\n\
             let el = Array.from(document.querySelectorAll('[' + attr + ']'))\n\
               .find(n => (n.getAttribute(attr) || '').toLowerCase().includes(value));",
            quote(attr),
            quote(value)
        ),
    }
}

const VISIBLE: &str =
    "const visible = (n) => !!n && n.offsetParent !== null && n.getClientRects().length > 0;";

/// Expression returning whether the locator currently matches a visible
/// element.
pub fn is_visible(locator: &Locator) -> String {
    format!(
        "(() => {{\n{}\n{}\nreturn visible(el);\n}})()",
        VISIBLE,
        locate(locator)
    )
}

/// Expression that scrolls the element into view and clicks it. Returns
/// whether a click happened.
pub fn click(locator: &Locator) -> String {
    format!(
        "(() => {{\n{}\n{}\nif (!visible(el)) return false;\n\
         el.scrollIntoView({{ block: 'center' }});\n\
         el.click();\n\
         return true;\n}})()",
        VISIBLE,
        locate(locator)
    )
}

/// Expression dispatching mouseover/mouseenter so hover-only menus open.
pub fn hover(locator: &Locator) -> String {
    format!(
        "(() => {{\n{}\n{}\nif (!visible(el)) return false;\n\
         el.scrollIntoView({{ block: 'center' }});\n\
         for (const type of ['mouseover', 'mouseenter']) {{\n\
           el.dispatchEvent(new MouseEvent(type, {{ bubbles: true }}));\n\
         }}\n\
         return true;\n}})()",
        VISIBLE,
        locate(locator)
    )
}

/// Expression clearing an input's value.
pub fn clear(locator: &Locator) -> String {
    format!(
        "(() => {{\n{}\nif (!el) return false;\nel.value = '';\nreturn true;\n}})()",
        locate(locator)
    )
}

/// Expression returning the `tr` × `td` inner-text grid of the first
/// matching table, or null when absent.
pub fn table_text(locator: &Locator) -> String {
    format!(
        "(() => {{\n{}\nif (!el) return null;\n\
         const body = el.querySelector('tbody') || el;\n\
         return Array.from(body.querySelectorAll('tr')).map(tr =>\n\
           Array.from(tr.querySelectorAll('td, th')).map(cell => cell.innerText));\n}})()",
        locate(locator)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_probe_quotes_the_selector() {
        let js = is_visible(&Locator::css("#bt_ingresar"));
        assert!(js.contains(r##"querySelector("#bt_ingresar")"##));
        assert!(js.contains("visible(el)"));
    }

    #[test]
    fn text_probe_lowercases_the_needle() {
        let js = click(&Locator::text("Consultar boletas emitidas"));
        assert!(js.contains(r#""Consultar boletas emitidas".toLowerCase()"#));
        assert!(js.contains("el.click()"));
    }

    #[test]
    fn quoting_escapes_embedded_quotes() {
        let js = is_visible(&Locator::css(r#"table[width="630"]"#));
        assert!(js.contains(r#"table[width=\"630\"]"#));
    }
}
