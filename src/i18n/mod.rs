//! Language preference and translation loading for page modules.
//!
//! # Architecture
//!
//! - `storage`: Durable key-value slot the selected language is persisted in
//! - `events`: Publish/subscribe hub for language change notifications
//! - `language`: The shared, injectable language preference
//! - `loader`: Translation file fetching and the two loading strategies
//! - `translator`: Per-module translation context and its configuration
//! - `service`: Entry points wiring page modules and controllers together
//!
//! # Example
//!
//! ```rust,ignore
//! use page_translation::i18n::{LanguagePreferenceService, Scope};
//!
//! let page1 = service.setup_page_translation("Page1App", Some("page1"));
//! let _sync = page1.controller(Some(scope));
//!
//! service.change_language("fr")?;
//! let table = page1.translator().translations().await;
//! ```

mod events;
mod language;
mod loader;
mod service;
mod storage;
mod translator;

pub use events::{LanguageChanged, LanguageEventBus, Subscription, GLOBAL_LANGUAGE_CHANGED};
pub use language::{LanguagePreference, DEFAULT_LANGUAGE};
pub use loader::{
    merge_translations, FileFetcher, MergedFilesLoader, StaticFilesLoader, TranslationLoader,
    TranslationStrategy, Translations, COMMON_FILE, FILE_SUFFIX,
};
pub use service::{LanguagePreferenceService, PageModule, Scope, TRANSLATE_MODULE};
pub use storage::{FileStore, MemoryStore, PreferenceStore, SELECTED_LANGUAGE_KEY};
pub use translator::{SanitizeStrategy, TranslateProvider, Translator};
