//! Preview the translation table a page would load.
//!
//! Usage:
//!   cargo run --bin preview -- <lang> [page_file]
//!
//! Without a page file only the common vocabulary is loaded. Files are
//! fetched from `I18N_ORIGIN` + `APP_CONTEXT_PATH` + `/i18n`.

use anyhow::{Context, Result};
use page_translation::{
    config::Config,
    i18n::{LanguagePreferenceService, TranslateProvider},
};
use std::collections::BTreeMap;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("page_translation=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(language) = args.first() else {
        eprintln!("Usage: preview <lang> [page_file]");
        std::process::exit(2);
    };
    let page_file = args.get(1).map(String::as_str);

    let config = Config::from_env()?;
    let service = LanguagePreferenceService::from_config(&config)
        .context("Failed to load language preference")?;

    let mut provider = TranslateProvider::new();
    service.init_translation(&mut provider, page_file);
    let translator = provider.build();
    translator.use_language(language);

    info!(
        "Loading {} translations for {} from {}",
        page_file.unwrap_or("common"),
        language,
        service.fetcher().base_url()
    );

    // Sorted for stable output
    let table: BTreeMap<String, String> = translator.translations().await.into_iter().collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&table).context("Failed to serialize translations")?
    );

    Ok(())
}
