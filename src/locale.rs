//! Display-string lookup for the target locale.
//!
//! Kept outside the severity/geometry logic on purpose: the pipeline only
//! resolves tokens (`rojo`, `naranja`, ...); turning them into reader-facing
//! labels is a pure `(key) -> text` lookup against an injected table.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::severity::SeverityLevel;

#[derive(Debug, Clone, Default)]
pub struct Localizer {
    entries: HashMap<String, String>,
}

static ES_ES: Lazy<Localizer> = Lazy::new(|| {
    Localizer::new([
        ("level.amarillo", "Aviso amarillo"),
        ("level.naranja", "Aviso naranja"),
        ("level.rojo", "Aviso rojo"),
        ("summary.from", "Desde"),
        ("summary.until", "hasta"),
        ("summary.more_info", "Más información"),
    ])
});

impl Localizer {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Built-in Spanish table, the feed's default locale.
    pub fn es_es() -> &'static Localizer {
        &ES_ES
    }

    /// Look up a display string; unknown keys fall back to the key itself.
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Reader-facing label for a severity level.
    pub fn level_label(&self, level: SeverityLevel) -> &str {
        match level {
            SeverityLevel::Amarillo => self.text("level.amarillo"),
            SeverityLevel::Naranja => self.text("level.naranja"),
            SeverityLevel::Rojo => self.text("level.rojo"),
            SeverityLevel::None => "",
        }
    }
}
