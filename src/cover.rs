use anyhow::Context as _;
use url::Url;

use crate::formats::Book;

pub const DEFAULT_COVER_SERVICE: &str = "https://covers.openlibrary.org/b/title/";

/// Picks the image URL shown for a book.
#[derive(Debug, Clone)]
pub struct CoverResolver {
    base: Url,
}

impl CoverResolver {
    /// `base` is the directory-style URL that fallback covers are appended to.
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base).with_context(|| format!("parse cover service url: {base}"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("cover service url must be hierarchical: {base}");
        }
        if base.scheme() != "http" && base.scheme() != "https" {
            anyhow::bail!("cover service url must be http/https: {base}");
        }
        Ok(Self { base })
    }

    /// The explicit cover when present, otherwise `{base}{escaped title}-S.jpg`.
    /// Whether the fallback actually resolves to an image is not checked.
    pub fn resolve(&self, book: &Book) -> String {
        if let Some(cover) = book.cover.as_deref().filter(|c| !c.is_empty()) {
            return cover.to_owned();
        }

        let base = self.base.as_str();
        let sep = if base.ends_with('/') { "" } else { "/" };
        format!("{base}{sep}{}-S.jpg", urlencoding::encode(&book.title))
    }
}

impl Default for CoverResolver {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_COVER_SERVICE).expect("default cover service url is valid"),
        }
    }
}
