use anyhow::Context as _;
use async_trait::async_trait;
use serde::Serialize;

use crate::formats::Book;

pub const COPIED_CONFIRMATION: &str = "Link copied to clipboard!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareData {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl ShareData {
    pub fn for_book(book: &Book, page_url: &str) -> Self {
        let title = match book.author.as_deref() {
            Some(author) if !author.is_empty() => format!("{} by {author}", book.title),
            _ => book.title.clone(),
        };
        Self {
            title,
            text: format!("Check out this book: {}", book.title),
            url: page_url.to_owned(),
        }
    }
}

/// Native share sheet and clipboard of the viewing platform.
#[async_trait]
pub trait SharePlatform: Send + Sync {
    async fn share(&self, data: &ShareData) -> anyhow::Result<()>;
    async fn copy_to_clipboard(&self, text: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Copied { confirmation: &'static str },
    Failed,
}

/// Shares `data`, falling back to copying its URL. Cancellation and a missing
/// share capability are treated alike. Never returns an error.
pub async fn share_or_copy(platform: &dyn SharePlatform, data: &ShareData) -> ShareOutcome {
    match platform.share(data).await {
        Ok(()) => return ShareOutcome::Shared,
        Err(err) => tracing::debug!(error = %format!("{err:#}"), "share failed; copying link"),
    }

    match platform.copy_to_clipboard(&data.url).await {
        Ok(()) => ShareOutcome::Copied {
            confirmation: COPIED_CONFIRMATION,
        },
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), url = %data.url, "copy link failed");
            ShareOutcome::Failed
        }
    }
}

/// Browser-side rendition of [`share_or_copy`] for the share button.
pub fn share_script(data: &ShareData) -> anyhow::Result<String> {
    let payload = serde_json::to_string(data).context("serialize share data")?;
    // Keep the payload from terminating the surrounding <script> element.
    let payload = payload.replace("</", "<\\/");
    Ok(format!(
        r#"(function () {{
  var data = {payload};
  var button = document.getElementById("share-button");
  if (!button) return;
  button.addEventListener("click", async function () {{
    var url = window.location.href;
    try {{
      await navigator.share({{ title: data.title, text: data.text, url: url }});
    }} catch (err) {{
      try {{
        await navigator.clipboard.writeText(url);
        alert({confirmation});
      }} catch (copyErr) {{
        console.warn("copy link failed", copyErr);
      }}
    }}
  }});
}})();"#,
        confirmation = serde_json::to_string(COPIED_CONFIRMATION).context("serialize confirmation")?,
    ))
}
