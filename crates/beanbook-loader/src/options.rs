//! Ledger option parsing and storage.

use std::collections::HashMap;

/// Ledger-wide options collected from `option "name" "value"` lines.
///
/// `operating_currency` is the only option the pipeline understands; it is
/// repeatable and keeps its declaration order. Anything else is retained in
/// a custom map for sinks that want it.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Operating currencies, in declaration order.
    pub operating_currency: Vec<String>,
    /// Unrecognised options, last value wins.
    pub custom: HashMap<String, String>,
}

impl Options {
    /// Create empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option by name.
    pub fn set(&mut self, key: &str, value: &str) {
        match key {
            "operating_currency" => self.operating_currency.push(value.to_string()),
            _ => {
                self.custom.insert(key.to_string(), value.to_string());
            }
        }
    }

    /// Get a custom option value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.custom.get(key).map(String::as_str)
    }
}
