//! HTTP front for the page modules.
//!
//! Serves the page shells, the translation directory, and a small language
//! endpoint, all under the configured context path.

use crate::config::Config;
use crate::i18n::{LanguagePreferenceService, SanitizeStrategy};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

/// A page served by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Route segment and view name
    pub name: &'static str,
    /// Page module id
    pub module_id: &'static str,
    /// Page-specific translation file stem
    pub translation_file: &'static str,
}

/// Pages served by the application. The first one is also served at `/`.
pub const PAGES: &[Page] = &[
    Page {
        name: "page1",
        module_id: "Page1App",
        translation_file: "page1",
    },
    Page {
        name: "page2",
        module_id: "Page2App",
        translation_file: "page2",
    },
];

#[derive(Clone)]
struct AppState {
    service: LanguagePreferenceService,
    context_path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageBody {
    pub language: String,
}

/// Build the application router.
pub fn router(config: &Config, service: LanguagePreferenceService) -> Router {
    let state = AppState {
        service,
        context_path: config.context_path.clone(),
    };

    let mut app = Router::new()
        .route("/", get(render_root))
        .route(
            "/api/language",
            get(get_language).put(put_language),
        );

    for page in PAGES {
        app = app.route(
            &format!("/{}", page.name),
            get(move |state: State<AppState>| render_page(state, *page)),
        );
    }

    let app = app.nest_service("/i18n", ServeDir::new(&config.i18n_dir));

    // Nesting maps the inner "/" to "{ctx}" only; "{ctx}/" needs its own route.
    let app = if config.context_path.is_empty() {
        app
    } else {
        Router::new()
            .route(&format!("{}/", config.context_path), get(render_root))
            .nest(&config.context_path, app)
    };

    app.with_state(state).layer(TraceLayer::new_for_http())
}

/// Bind to the configured port and serve until the process is stopped.
pub async fn serve(config: &Config, service: LanguagePreferenceService) -> Result<()> {
    let address = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .context(format!("Failed to bind {}", address))?;

    info!(
        "Serving pages on http://{}{}/ (translations from {})",
        address, config.context_path, config.i18n_dir
    );

    axum::serve(listener, router(config, service))
        .await
        .context("Server error")
}

async fn render_root(state: State<AppState>) -> Html<String> {
    render_page(state, PAGES[0]).await
}

async fn render_page(State(state): State<AppState>, page: Page) -> Html<String> {
    Html(page_shell(
        &page,
        &state.context_path,
        &state.service.current_language(),
    ))
}

/// HTML shell of `page`. The front-end picks up the context path and module
/// wiring from it.
pub fn page_shell(page: &Page, context_path: &str, language: &str) -> String {
    let language = SanitizeStrategy::Escape.apply(language);
    let context_path = js_string_literal(context_path);
    format!(
        r#"<!DOCTYPE html>
<html lang="{language}">
<head>
<meta charset="utf-8">
<title>{name}</title>
<script>window.APP_CONTEXT_PATH = {context_path};</script>
</head>
<body data-module="{module}" data-translations="{file}">
</body>
</html>
"#,
        name = page.name,
        module = page.module_id,
        file = page.translation_file,
    )
}

/// Quoted JS string literal safe to embed in an inline `<script>`.
fn js_string_literal(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

async fn get_language(State(state): State<AppState>) -> Json<LanguageBody> {
    Json(LanguageBody {
        language: state.service.current_language(),
    })
}

async fn put_language(State(state): State<AppState>, Json(body): Json<LanguageBody>) -> Response {
    if body.language.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "language must not be empty").into_response();
    }

    match state.service.change_language(&body.language) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            warn!("Could not change language: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
