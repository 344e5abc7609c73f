//! Locators and resolution strategies.
//!
//! Each workflow step carries an ordered list of [`ResolutionStrategy`] values.
//! The order is a human-curated priority: the most specific / most stable
//! selector first, looser text matches after it. The resolver tries them in
//! sequence and the first visible match wins; a strategy-level error counts as
//! a miss for that strategy only.

use serde::{Deserialize, Serialize};

/// One way of locating a UI element on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locator {
    /// CSS selector, matched via `querySelector`.
    Css(String),
    /// Case-insensitive substring match against the visible text of links,
    /// buttons and inputs.
    TextContains(String),
    /// Substring match against an attribute value, e.g. `href` containing
    /// `"emisor"`.
    AttrContains { attr: String, value: String },
}

impl Locator {
    pub fn css(sel: impl Into<String>) -> Self {
        Locator::Css(sel.into())
    }

    pub fn text(needle: impl Into<String>) -> Self {
        Locator::TextContains(needle.into())
    }

    pub fn attr(attr: impl Into<String>, value: impl Into<String>) -> Self {
        Locator::AttrContains {
            attr: attr.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(sel) => write!(f, "css:{}", sel),
            Locator::TextContains(needle) => write!(f, "text:{}", needle),
            Locator::AttrContains { attr, value } => write!(f, "attr:{}*={}", attr, value),
        }
    }
}

/// Which text a fill action types into the resolved field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// The run's RUT, as entered by the user.
    Identity,
    /// The run's clave tributaria.
    Secret,
    Literal(String),
}

/// The action performed once a locator resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepAction {
    Click,
    /// Hover without clicking. The SII main menu only reveals its dropdown
    /// entries on mouseover.
    Hover,
    /// Hover first so the element is interactable, then click.
    HoverThenClick,
    Fill(FieldValue),
    /// Resolve only; presence of the element is the step's outcome.
    WaitVisible,
}

/// A locator plus the action to perform on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStrategy {
    pub locator: Locator,
    pub action: StepAction,
}

impl ResolutionStrategy {
    pub fn new(locator: Locator, action: StepAction) -> Self {
        Self { locator, action }
    }

    pub fn click(locator: Locator) -> Self {
        Self::new(locator, StepAction::Click)
    }

    pub fn hover(locator: Locator) -> Self {
        Self::new(locator, StepAction::Hover)
    }

    pub fn hover_click(locator: Locator) -> Self {
        Self::new(locator, StepAction::HoverThenClick)
    }

    pub fn fill(locator: Locator, value: FieldValue) -> Self {
        Self::new(locator, StepAction::Fill(value))
    }

    pub fn wait(locator: Locator) -> Self {
        Self::new(locator, StepAction::WaitVisible)
    }
}
