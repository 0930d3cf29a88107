use std::sync::Arc;

use anyhow::Context as _;
use tokio::sync::Mutex;
use url::Url;

use crate::cover::CoverResolver;
use crate::html::{Links, RenderContext};
use crate::library::Library;
use crate::store::{KeyValueStore, load_dark_mode};
use crate::views::ViewTracker;

pub const PUBLIC_URL_ENV: &str = "READLOG_PUBLIC_URL";

#[derive(Debug, Clone)]
pub struct Settings {
    pub site_title: String,
    pub covers: CoverResolver,
    /// Absolute base for share links; share links stay path-only without it.
    pub public_url: Option<Url>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_title: "My Reading Log".to_owned(),
            covers: CoverResolver::default(),
            public_url: None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub library: Arc<Library>,
    pub store: Arc<dyn KeyValueStore>,
    pub views: Arc<ViewTracker>,
    pub settings: Arc<Settings>,
    /// Serializes the dark-mode read-then-write so concurrent toggles all apply.
    pub dark_mode_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(library: Library, store: Arc<dyn KeyValueStore>, settings: Settings) -> Self {
        Self {
            library: Arc::new(library),
            views: Arc::new(ViewTracker::new(Arc::clone(&store))),
            store,
            settings: Arc::new(settings),
            dark_mode_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn render_context(&self) -> RenderContext {
        let dark_mode = load_dark_mode(self.store.as_ref()).await;
        RenderContext::new(
            self.settings.site_title.clone(),
            Links::server(),
            self.settings.covers.clone(),
        )
        .with_dark_mode(dark_mode)
    }

    /// Shareable URL for a site path such as `/book/dune`.
    pub fn page_url(&self, path: &str) -> String {
        match &self.settings.public_url {
            Some(base) => base
                .join(path.trim_start_matches('/'))
                .map(|url| url.to_string())
                .unwrap_or_else(|_| path.to_owned()),
            None => path.to_owned(),
        }
    }
}

/// Reads [`PUBLIC_URL_ENV`]; unset or blank means no public URL.
pub fn public_url_from_env() -> anyhow::Result<Option<Url>> {
    match std::env::var(PUBLIC_URL_ENV) {
        Ok(raw) if !raw.trim().is_empty() => parse_public_url(&raw)
            .with_context(|| format!("invalid {PUBLIC_URL_ENV}={raw:?}"))
            .map(Some),
        _ => Ok(None),
    }
}

pub fn parse_public_url(raw: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(raw.trim()).context("parse url")?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("public url must be http/https");
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
