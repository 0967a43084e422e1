//! Translation context used by page controllers.
//!
//! A `TranslateProvider` collects the configuration of a page module (loader
//! strategy, preferred language, sanitization policy) and turns into the
//! `Translator` its controllers share.

use crate::i18n::loader::{TranslationLoader, TranslationStrategy, Translations};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// How interpolated values are sanitized before substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeStrategy {
    /// HTML-escape every substituted value
    Escape,
}

impl SanitizeStrategy {
    pub fn apply(self, value: &str) -> String {
        match self {
            Self::Escape => escape_html(value),
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Configuration phase of a page module's translation context.
#[derive(Debug, Clone, Default)]
pub struct TranslateProvider {
    strategy: Option<TranslationStrategy>,
    preferred_language: Option<String>,
    sanitize: Option<SanitizeStrategy>,
}

impl TranslateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the loader translation tables are produced with.
    pub fn use_loader(&mut self, strategy: TranslationStrategy) -> &mut Self {
        self.strategy = Some(strategy);
        self
    }

    /// Language used until a controller switches to another one.
    pub fn preferred_language(&mut self, language: &str) -> &mut Self {
        self.preferred_language = Some(language.to_string());
        self
    }

    pub fn use_sanitize_value_strategy(&mut self, strategy: SanitizeStrategy) -> &mut Self {
        self.sanitize = Some(strategy);
        self
    }

    pub fn strategy(&self) -> Option<&TranslationStrategy> {
        self.strategy.as_ref()
    }

    pub fn preferred(&self) -> Option<&str> {
        self.preferred_language.as_deref()
    }

    pub fn sanitize_strategy(&self) -> Option<SanitizeStrategy> {
        self.sanitize
    }

    /// Finish configuration.
    pub fn build(self) -> Translator {
        if self.strategy.is_none() {
            warn!("Translator built without a loader, every table will be empty");
        }

        Translator {
            strategy: self.strategy,
            preferred_language: self.preferred_language,
            sanitize: self.sanitize,
            active: RwLock::new(None),
            tables: Mutex::new(HashMap::new()),
        }
    }
}

/// Active language and loaded tables of one page module.
///
/// Tables are kept per language code: a load finishing after the active
/// language moved on is stored under its own code and never shows up as the
/// table of the new language.
#[derive(Debug)]
pub struct Translator {
    strategy: Option<TranslationStrategy>,
    preferred_language: Option<String>,
    sanitize: Option<SanitizeStrategy>,
    active: RwLock<Option<String>>,
    tables: Mutex<HashMap<String, Translations>>,
}

impl Translator {
    /// Switch to `language`. Its table is loaded on the next `translations`.
    pub fn use_language(&self, language: &str) {
        debug!("Translator switching to {}", language);
        *self.active.write().unwrap_or_else(|e| e.into_inner()) = Some(language.to_string());
    }

    /// The language in use: the last one switched to, else the preferred one.
    pub fn active_language(&self) -> Option<String> {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .or_else(|| self.preferred_language.clone())
    }

    pub fn preferred_language(&self) -> Option<&str> {
        self.preferred_language.as_deref()
    }

    pub fn strategy(&self) -> Option<&TranslationStrategy> {
        self.strategy.as_ref()
    }

    pub fn sanitize_strategy(&self) -> Option<SanitizeStrategy> {
        self.sanitize
    }

    /// Table of the active language, loading it on first use.
    pub async fn translations(&self) -> Translations {
        match self.active_language() {
            Some(language) => self.translations_for(&language).await,
            None => Translations::new(),
        }
    }

    /// Table of `language`, loading it on first use.
    pub async fn translations_for(&self, language: &str) -> Translations {
        if let Some(table) = self.loaded(language) {
            return table;
        }

        let Some(strategy) = &self.strategy else {
            return Translations::new();
        };

        let table = strategy.load(language).await;
        self.tables
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(language.to_string(), table.clone());
        table
    }

    /// Template for `key` in the already loaded table of the active language,
    /// or the key itself when there is none.
    pub fn instant(&self, key: &str) -> String {
        self.active_language()
            .and_then(|language| self.loaded(&language))
            .and_then(|table| table.get(key).cloned())
            .unwrap_or_else(|| key.to_string())
    }

    /// Sanitize an interpolation value with the configured strategy.
    pub fn sanitize(&self, value: &str) -> String {
        match self.sanitize {
            Some(strategy) => strategy.apply(value),
            None => value.to_string(),
        }
    }

    /// Languages whose table is loaded.
    pub fn loaded_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self
            .tables
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        languages.sort();
        languages
    }

    fn loaded(&self, language: &str) -> Option<Translations> {
        self.tables
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(language)
            .cloned()
    }
}
