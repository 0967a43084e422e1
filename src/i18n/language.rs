//! The selected language, shared by every page module.
//!
//! `LanguagePreference` is the single source of truth for the active language
//! code. It reads its initial value from a `PreferenceStore`, writes every
//! change back to it, and announces changes on a `LanguageEventBus`.

use crate::error::Result;
use crate::i18n::events::{LanguageChanged, LanguageEventBus};
use crate::i18n::storage::{PreferenceStore, SELECTED_LANGUAGE_KEY};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Language used when nothing has been selected yet
pub const DEFAULT_LANGUAGE: &str = "en";

/// Injectable language preference.
pub struct LanguagePreference {
    store: Arc<dyn PreferenceStore>,
    events: LanguageEventBus,
    default_language: String,
    current: RwLock<String>,
}

impl std::fmt::Debug for LanguagePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguagePreference")
            .field("current", &self.current_language())
            .field("events", &self.events)
            .finish()
    }
}

impl LanguagePreference {
    /// Load the preference from `store`, falling back to `"en"`.
    pub fn load(store: Arc<dyn PreferenceStore>, events: LanguageEventBus) -> Self {
        Self::load_with_default(store, events, DEFAULT_LANGUAGE)
    }

    /// Load the preference from `store`, falling back to `default_language`
    /// when the slot is absent, empty, or unreadable.
    pub fn load_with_default(
        store: Arc<dyn PreferenceStore>,
        events: LanguageEventBus,
        default_language: &str,
    ) -> Self {
        let stored = match store.get(SELECTED_LANGUAGE_KEY) {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not read stored language, using default: {}", e);
                None
            }
        };

        let default_language = non_empty_or_default(default_language);
        let current = stored
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| default_language.clone());

        info!("Current language: {}", current);

        Self {
            store,
            events,
            default_language,
            current: RwLock::new(current),
        }
    }

    /// Select `code` as the active language.
    ///
    /// Persists the code, updates the in-memory value, then notifies every
    /// listener currently registered on the event bus. No validation is done
    /// on the code, except that an empty code selects the default language.
    /// If the durable write fails nothing else happens.
    pub fn change_language(&self, code: &str) -> Result<()> {
        let code = if code.is_empty() {
            self.default_language.as_str()
        } else {
            code
        };

        {
            // Held across the write so the store and memory agree on the last change
            let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
            self.store.set(SELECTED_LANGUAGE_KEY, code)?;
            *current = code.to_string();
        }

        info!("Language changed to {}", code);
        self.events.publish(&LanguageChanged::new(code));
        Ok(())
    }

    /// The active language code.
    pub fn current_language(&self) -> String {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Event bus change notifications are published on.
    pub fn events(&self) -> &LanguageEventBus {
        &self.events
    }
}

fn non_empty_or_default(code: &str) -> String {
    if code.is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        code.to_string()
    }
}
