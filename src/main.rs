use anyhow::{Context, Result};
use page_translation::{config::Config, i18n::LanguagePreferenceService, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("page_translation=info".parse()?),
        )
        .init();

    info!("Starting page translation server");

    // Load configuration from environment
    let config = Config::from_env()?;

    let service = LanguagePreferenceService::from_config(&config)
        .context("Failed to load language preference")?;

    for page in server::PAGES {
        service.setup_page_translation(page.module_id, Some(page.translation_file));
    }
    info!(
        "Current language {}, page modules: {}",
        service.current_language(),
        service.registered_modules().join(", ")
    );

    server::serve(&config, service).await
}
