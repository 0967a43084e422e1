//! Entry points used by page-level code.
//!
//! `LanguagePreferenceService` bundles the shared language preference with
//! access to the translation directory and wires page modules and their
//! controllers to both.

use crate::config::Config;
use crate::error::Result;
use crate::i18n::events::{LanguageEventBus, Subscription};
use crate::i18n::language::LanguagePreference;
use crate::i18n::loader::{FileFetcher, TranslationStrategy};
use crate::i18n::storage::FileStore;
use crate::i18n::translator::{SanitizeStrategy, TranslateProvider, Translator};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Name page modules list as their translation dependency
pub const TRANSLATE_MODULE: &str = "translate";

/// Something that can be re-rendered after a language switch.
pub trait Scope: Send + Sync {
    /// Re-render synchronously.
    fn apply(&self);
}

/// Shared language preference plus translation wiring.
///
/// Cloning is cheap and every clone talks to the same preference, event bus,
/// fetcher and module registry.
#[derive(Debug, Clone)]
pub struct LanguagePreferenceService {
    preference: Arc<LanguagePreference>,
    fetcher: Arc<FileFetcher>,
    modules: Arc<Mutex<BTreeSet<String>>>,
}

impl LanguagePreferenceService {
    pub fn new(preference: Arc<LanguagePreference>, fetcher: Arc<FileFetcher>) -> Self {
        Self {
            preference,
            fetcher,
            modules: Arc::new(Mutex::new(BTreeSet::new())),
        }
    }

    /// Build the service described by `config`: a file-backed preference and
    /// a fetcher for `{origin}{context}/i18n`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = FileStore::open(&config.preferences_file)?;
        let preference = LanguagePreference::load_with_default(
            Arc::new(store),
            LanguageEventBus::new(),
            &config.default_language,
        );
        let fetcher = FileFetcher::new(
            &config.i18n_base_url(),
            Duration::from_secs(config.fetch_timeout_secs),
        )?;

        Ok(Self::new(Arc::new(preference), Arc::new(fetcher)))
    }

    pub fn preference(&self) -> &Arc<LanguagePreference> {
        &self.preference
    }

    pub fn fetcher(&self) -> &Arc<FileFetcher> {
        &self.fetcher
    }

    /// Persist `code`, make it current and notify every synced controller.
    pub fn change_language(&self, code: &str) -> Result<()> {
        self.preference.change_language(code)
    }

    pub fn current_language(&self) -> String {
        self.preference.current_language()
    }

    /// Configure `provider` for a page.
    ///
    /// Without a page file only the common vocabulary is loaded; with one,
    /// the page vocabulary is merged over it. The preferred language is the
    /// current one and interpolated values are always HTML-escaped.
    pub fn init_translation(&self, provider: &mut TranslateProvider, page_file: Option<&str>) {
        let strategy = TranslationStrategy::for_page(Arc::clone(&self.fetcher), page_file);
        match strategy.page_file() {
            Some(file) => debug!("Loading common and {} translations", file),
            None => debug!("Loading common translations only"),
        }

        provider
            .use_loader(strategy)
            .preferred_language(&self.current_language())
            .use_sanitize_value_strategy(SanitizeStrategy::Escape);
    }

    /// Register a page module whose translation context loads `page_file`.
    pub fn setup_page_translation(&self, module_id: &str, page_file: Option<&str>) -> PageModule {
        let newly_registered = self
            .modules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(module_id.to_string());
        if !newly_registered {
            warn!("Page module {} registered again, replacing it", module_id);
        }

        let mut provider = TranslateProvider::new();
        self.init_translation(&mut provider, page_file);

        info!(
            "Page module {} set up with translations {}",
            module_id,
            page_file.unwrap_or("common")
        );

        PageModule {
            id: module_id.to_string(),
            dependencies: vec![TRANSLATE_MODULE.to_string()],
            translator: Arc::new(provider.build()),
            service: self.clone(),
        }
    }

    /// Keep `translator` on the current language from now on.
    ///
    /// Switches right away, then follows every change notification and, when
    /// a scope is given, re-renders it once per change. Empty language codes
    /// in a notification are ignored.
    pub fn sync_translation(
        &self,
        scope: Option<Arc<dyn Scope>>,
        translator: Arc<Translator>,
    ) -> Subscription {
        translator.use_language(&self.current_language());

        self.preference.events().subscribe(move |event| {
            if event.language.is_empty() {
                return;
            }
            translator.use_language(&event.language);
            if let Some(scope) = &scope {
                scope.apply();
            }
        })
    }

    /// Ids of every page module set up so far, sorted.
    pub fn registered_modules(&self) -> Vec<String> {
        self.modules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}

/// A page module with its own translation context.
#[derive(Debug, Clone)]
pub struct PageModule {
    id: String,
    dependencies: Vec<String>,
    translator: Arc<Translator>,
    service: LanguagePreferenceService,
}

impl PageModule {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Add another module dependency.
    pub fn requires(mut self, module: &str) -> Self {
        if !self.dependencies.iter().any(|dep| dep == module) {
            self.dependencies.push(module.to_string());
        }
        self
    }

    /// Translation context shared by the module's controllers.
    pub fn translator(&self) -> Arc<Translator> {
        Arc::clone(&self.translator)
    }

    /// Start a controller: sync the module translator with the shared
    /// language, re-rendering `scope` on every change.
    pub fn controller(&self, scope: Option<Arc<dyn Scope>>) -> Subscription {
        self.service.sync_translation(scope, self.translator())
    }
}
