//! Country name to two-letter code mapping.

use std::collections::HashMap;

/// Resolves the country name chosen at signup to the code used in patient ids.
#[derive(Debug, Clone)]
pub struct CountryCodeResolver {
    /// Exact country name → code
    codes: HashMap<String, String>,
}

impl Default for CountryCodeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CountryCodeResolver {
    /// Create a resolver with the built-in table.
    pub fn new() -> Self {
        Self {
            codes: Self::default_codes(),
        }
    }

    /// Resolve a country name. Never fails.
    ///
    /// Unknown names use their first two characters, upper-cased. Names shorter
    /// than two characters give a shorter code.
    pub fn resolve(&self, country_name: &str) -> String {
        self.codes
            .get(country_name)
            .cloned()
            .unwrap_or_else(|| fallback_code(country_name))
    }

    /// Add or replace a mapping.
    pub fn with_country(mut self, name: &str, code: &str) -> Self {
        self.codes.insert(name.to_string(), code.to_uppercase());
        self
    }

    fn default_codes() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("Nepal".into(), "NP".into());
        map.insert("India".into(), "IN".into());
        map.insert("United States".into(), "US".into());
        map
    }
}

fn fallback_code(country_name: &str) -> String {
    country_name.chars().take(2).collect::<String>().to_uppercase()
}
