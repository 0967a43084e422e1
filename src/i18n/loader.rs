//! Translation file loading strategies.
//!
//! Translation files are flat JSON objects mapping keys to template strings,
//! published per language as `{base}/{file}_{lang}.json`. Two strategies are
//! available:
//!
//! - `StaticFilesLoader` fetches one file per language from a fixed
//!   prefix/suffix pair (the shared `common_` vocabulary).
//! - `MergedFilesLoader` fetches the common file and a page-specific file
//!   concurrently and overlays the page entries on top of the common ones.
//!
//! A file that cannot be fetched or parsed loads as an empty mapping, so a
//! page without its own vocabulary still gets the common one.

use crate::error::{Result, TranslationError};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Translation key to template string
pub type Translations = HashMap<String, String>;

/// File stem of the vocabulary shared by every page
pub const COMMON_FILE: &str = "common";

/// Extension of translation files
pub const FILE_SUFFIX: &str = ".json";

/// Strategy for producing the translation table of a language.
pub trait TranslationLoader: Send + Sync {
    /// Load the table for `lang`. Never fails; unavailable files are empty.
    fn load(&self, lang: &str) -> impl Future<Output = Translations> + Send;
}

/// HTTP access to the translation directory.
///
/// Successful responses are cached per URL for the lifetime of the fetcher.
/// Failures are not cached.
#[derive(Debug)]
pub struct FileFetcher {
    client: reqwest::Client,
    base_url: String,
    cache: Mutex<HashMap<String, Translations>>,
}

impl FileFetcher {
    /// Create a fetcher for the directory at `base_url` (no trailing slash).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| TranslationError::Fetch {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self::with_client(client, &base_url))
    }

    /// Create a fetcher sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of `{file}_{lang}.json` in the translation directory.
    pub fn file_url(&self, file: &str, lang: &str) -> String {
        format!("{}/{}_{}{}", self.base_url, file, lang, FILE_SUFFIX)
    }

    /// Fetch and parse the translation file at `url`.
    pub async fn fetch(&self, url: &str) -> Result<Translations> {
        if let Some(cached) = self.cached(url) {
            debug!("Translation cache hit: {}", url);
            return Ok(cached);
        }

        debug!("Fetching translation file {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| TranslationError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| TranslationError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let translations = parse_translations(url, &body)?;
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.to_string(), translations.clone());

        Ok(translations)
    }

    /// Fetch `url`, turning any failure into an empty mapping.
    pub async fn fetch_or_empty(&self, url: &str) -> Translations {
        match self.fetch(url).await {
            Ok(translations) => translations,
            Err(e) => {
                warn!("Translation file unavailable, using empty mapping: {}", e);
                Translations::new()
            }
        }
    }

    fn cached(&self, url: &str) -> Option<Translations> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(url)
            .cloned()
    }
}

/// Parse a translation file body. Only top-level string values are kept.
fn parse_translations(url: &str, body: &[u8]) -> Result<Translations> {
    let value: Value = serde_json::from_slice(body).map_err(|e| TranslationError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let Value::Object(entries) = value else {
        return Err(TranslationError::Parse {
            url: url.to_string(),
            message: "top-level value is not an object".to_string(),
        });
    };

    let mut translations = Translations::with_capacity(entries.len());
    for (key, value) in entries {
        match value {
            Value::String(template) => {
                translations.insert(key, template);
            }
            other => debug!("Skipping non-string entry {} in {}: {}", key, url, other),
        }
    }
    Ok(translations)
}

/// Overlay `page` on top of `common`. Page entries win on identical keys.
pub fn merge_translations(common: Translations, page: Translations) -> Translations {
    let mut merged = common;
    merged.extend(page);
    merged
}

/// Loads one file per language at `{prefix}{lang}{suffix}`.
#[derive(Debug, Clone)]
pub struct StaticFilesLoader {
    fetcher: Arc<FileFetcher>,
    prefix: String,
    suffix: String,
}

impl StaticFilesLoader {
    pub fn new(fetcher: Arc<FileFetcher>, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            fetcher,
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Loader for the common vocabulary of `fetcher`'s directory.
    pub fn common(fetcher: Arc<FileFetcher>) -> Self {
        let prefix = format!("{}/{}_", fetcher.base_url(), COMMON_FILE);
        Self::new(fetcher, prefix, FILE_SUFFIX)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    fn url_for(&self, lang: &str) -> String {
        format!("{}{}{}", self.prefix, lang, self.suffix)
    }
}

impl TranslationLoader for StaticFilesLoader {
    async fn load(&self, lang: &str) -> Translations {
        self.fetcher.fetch_or_empty(&self.url_for(lang)).await
    }
}

/// Loads the common file and a page file, then merges them.
#[derive(Debug, Clone)]
pub struct MergedFilesLoader {
    fetcher: Arc<FileFetcher>,
    page_file: String,
}

impl MergedFilesLoader {
    pub fn new(fetcher: Arc<FileFetcher>, page_file: impl Into<String>) -> Self {
        Self {
            fetcher,
            page_file: page_file.into(),
        }
    }

    pub fn page_file(&self) -> &str {
        &self.page_file
    }
}

impl TranslationLoader for MergedFilesLoader {
    async fn load(&self, lang: &str) -> Translations {
        let common_url = self.fetcher.file_url(COMMON_FILE, lang);
        let page_url = self.fetcher.file_url(&self.page_file, lang);

        // Both requests are in flight together; the merge waits for both.
        let (common, page) = tokio::join!(
            self.fetcher.fetch_or_empty(&common_url),
            self.fetcher.fetch_or_empty(&page_url)
        );

        debug!(
            "Merging {} common and {} {} entries for {}",
            common.len(),
            page.len(),
            self.page_file,
            lang
        );
        merge_translations(common, page)
    }
}

/// Loader selected for a page module.
#[derive(Debug, Clone)]
pub enum TranslationStrategy {
    /// Common file only
    StaticFiles(StaticFilesLoader),
    /// Common file overlaid with a page file
    Merged(MergedFilesLoader),
}

impl TranslationStrategy {
    /// Pick the strategy for an optional page file.
    pub fn for_page(fetcher: Arc<FileFetcher>, page_file: Option<&str>) -> Self {
        match page_file.filter(|file| !file.is_empty()) {
            Some(file) => Self::Merged(MergedFilesLoader::new(fetcher, file)),
            None => Self::StaticFiles(StaticFilesLoader::common(fetcher)),
        }
    }

    /// Page file merged over the common vocabulary, if any.
    pub fn page_file(&self) -> Option<&str> {
        match self {
            Self::StaticFiles(_) => None,
            Self::Merged(loader) => Some(loader.page_file()),
        }
    }
}

impl TranslationLoader for TranslationStrategy {
    async fn load(&self, lang: &str) -> Translations {
        match self {
            Self::StaticFiles(loader) => loader.load(lang).await,
            Self::Merged(loader) => loader.load(lang).await,
        }
    }
}
