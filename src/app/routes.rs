use std::path::Path as FsPath;

use axum::Router;
use axum::extract::{Form, OriginalUri, Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::app::state::AppState;
use crate::html::STYLESHEET;
use crate::html::detail::{book_detail_page, not_found_page};
use crate::html::list::book_list_page;
use crate::library::ListFilter;
use crate::store::{load_dark_mode, save_dark_mode};

pub fn router(state: AppState, assets_dir: Option<&FsPath>) -> Router {
    let mut app = Router::new()
        .route("/", get(book_list))
        .route("/book/:id", get(book_detail))
        .route("/dark-mode", post(toggle_dark_mode))
        .route("/static/style.css", get(stylesheet))
        .route("/healthz", get(|| async { "ok\n" }));

    if let Some(dir) = assets_dir {
        app = app.nest_service("/assets", ServeDir::new(dir));
    }

    app.fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn book_list(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
    OriginalUri(uri): OriginalUri,
) -> Html<String> {
    let ctx = state.render_context().await;
    let books = state.library.filter(&filter);
    tracing::debug!(?filter, matched = books.len(), "render list");

    let return_to = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| "/".to_owned());
    Html(book_list_page(&ctx, &books, &filter, &return_to))
}

async fn book_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    let ctx = state.render_context().await;
    let Some(book) = state.library.get(&id) else {
        tracing::info!(id = %id, "book not found");
        return Ok((StatusCode::NOT_FOUND, Html(not_found_page(&ctx))).into_response());
    };

    // Each request is one navigation, so the visit is counted here and never
    // inside rendering.
    let activation = state.views.navigate(&book.id);
    match state.views.on_enter(&activation).await {
        Ok(count) => tracing::debug!(id = %book.id, ?count, "detail view"),
        Err(err) => {
            tracing::warn!(id = %book.id, error = %format!("{err:#}"), "record view failed");
        }
    }

    let page_url = state.page_url(&ctx.links.book(&book.id));
    let html = book_detail_page(&ctx, book, state.library.all(), &page_url).map_err(|err| {
        tracing::error!(id = %book.id, error = %format!("{err:#}"), "render detail page");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("render failed: {err:#}"),
        )
    })?;
    Ok(Html(html).into_response())
}

#[derive(Debug, Deserialize)]
struct ToggleForm {
    #[serde(default)]
    return_to: Option<String>,
}

async fn toggle_dark_mode(State(state): State<AppState>, Form(form): Form<ToggleForm>) -> Redirect {
    {
        let _guard = state.dark_mode_lock.lock().await;
        let enabled = !load_dark_mode(state.store.as_ref()).await;
        match save_dark_mode(state.store.as_ref(), enabled).await {
            Ok(()) => tracing::info!(enabled, "dark mode toggled"),
            Err(err) => tracing::warn!(error = %format!("{err:#}"), "save dark mode flag failed"),
        }
    }
    Redirect::to(&safe_return_path(form.return_to.as_deref()))
}

/// Only same-site paths are honored as redirect targets.
fn safe_return_path(raw: Option<&str>) -> String {
    match raw {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_owned()
        }
        _ => "/".to_owned(),
    }
}

async fn stylesheet() -> Response {
    let mut resp = STYLESHEET.into_response();
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/css; charset=utf-8"),
    );
    resp
}

async fn not_found(State(state): State<AppState>) -> Response {
    let ctx = state.render_context().await;
    (StatusCode::NOT_FOUND, Html(not_found_page(&ctx))).into_response()
}
