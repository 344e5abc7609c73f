//! Scripted backend for engine tests.
#![allow(dead_code)]

use async_trait::async_trait;
use boletin_core::strategy::Locator;
use boletin_engine::backend::{Backend, BackendError, NavigationResult};
use std::collections::HashSet;
use std::time::Duration;

/// Which locators the fake page reports as visible.
pub enum Visibility {
    AllVisible,
    Only(HashSet<String>),
}

pub struct MockBackend {
    pub ready: bool,
    pub visibility: Visibility,
    /// Locators whose visibility probe errors instead of answering.
    pub probe_errors: HashSet<String>,
    pub table: Option<Vec<Vec<String>>>,
    pub navigation_works: bool,
    pub screenshot_works: bool,
    pub pdf_works: bool,
    pub url: String,

    pub clicks: Vec<String>,
    pub hovers: Vec<String>,
    pub fills: Vec<(String, String)>,
    pub screenshots_taken: usize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            ready: true,
            visibility: Visibility::AllVisible,
            probe_errors: HashSet::new(),
            table: None,
            navigation_works: true,
            screenshot_works: true,
            pdf_works: true,
            url: "about:blank".to_string(),
            clicks: Vec::new(),
            hovers: Vec::new(),
            fills: Vec::new(),
            screenshots_taken: 0,
        }
    }
}

impl MockBackend {
    pub fn visible_only(locators: &[&Locator]) -> Self {
        Self {
            visibility: Visibility::Only(locators.iter().map(|l| l.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn with_probe_errors(mut self, locators: &[&str]) -> Self {
        self.probe_errors = locators.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_table(mut self, table: Vec<Vec<String>>) -> Self {
        self.table = Some(table);
        self
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.ready
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        self.url = url.to_string();
        Ok(NavigationResult {
            url: url.to_string(),
            title: "mock".to_string(),
        })
    }

    async fn current_url(&mut self) -> Result<String, BackendError> {
        Ok(self.url.clone())
    }

    async fn wait_for_navigation(
        &mut self,
        timeout: Duration,
    ) -> Result<NavigationResult, BackendError> {
        if self.navigation_works {
            Ok(NavigationResult {
                url: self.url.clone(),
                title: "mock".to_string(),
            })
        } else {
            Err(BackendError::Navigation(format!(
                "no navigation within {:?}",
                timeout
            )))
        }
    }

    async fn is_visible(&mut self, locator: &Locator) -> Result<bool, BackendError> {
        let key = locator.to_string();
        if self.probe_errors.contains(&key) {
            return Err(BackendError::Evaluation("probe exploded".into()));
        }
        Ok(match &self.visibility {
            Visibility::AllVisible => true,
            Visibility::Only(set) => set.contains(&key),
        })
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), BackendError> {
        self.clicks.push(locator.to_string());
        Ok(())
    }

    async fn hover(&mut self, locator: &Locator) -> Result<(), BackendError> {
        self.hovers.push(locator.to_string());
        Ok(())
    }

    async fn fill(
        &mut self,
        locator: &Locator,
        text: &str,
        _char_delay: Duration,
    ) -> Result<(), BackendError> {
        self.fills.push((locator.to_string(), text.to_string()));
        Ok(())
    }

    async fn screenshot(&mut self, _full_page: bool) -> Result<Vec<u8>, BackendError> {
        if self.screenshot_works {
            self.screenshots_taken += 1;
            Ok(vec![0x89, b'P', b'N', b'G'])
        } else {
            Err(BackendError::Capture("no renderer".into()))
        }
    }

    async fn pdf(&mut self) -> Result<Vec<u8>, BackendError> {
        if self.pdf_works {
            Ok(b"%PDF-1.4 mock".to_vec())
        } else {
            Err(BackendError::NotSupported("pdf".into()))
        }
    }

    async fn table_text(&mut self, locator: &Locator) -> Result<Vec<Vec<String>>, BackendError> {
        self.table
            .clone()
            .ok_or_else(|| BackendError::Evaluation(format!("no table matched {}", locator)))
    }
}

fn month_row(month: &str, amount: &str) -> Vec<String> {
    let mut row = vec![month.to_string()];
    row.extend(std::iter::repeat_n(String::new(), 7));
    row.push(amount.to_string());
    row
}

/// 2 header rows, 11 month rows of zeros/blanks, 1 totals row.
pub fn all_zero_table() -> Vec<Vec<String>> {
    let mut cells = vec![vec!["h".to_string()], vec!["h".to_string()]];
    for m in 1..=11 {
        cells.push(month_row(
            &format!("Mes {}", m),
            if m % 2 == 0 { "&nbsp;" } else { "0" },
        ));
    }
    cells.push(month_row("Total", "0"));
    cells
}

/// Same shape, but month 5 carries a value.
pub fn table_with_values() -> Vec<Vec<String>> {
    let mut cells = all_zero_table();
    cells[6] = month_row("Mes 5", "15.000");
    cells
}
