//! Server-side markup for the list and detail views.

pub mod card;
pub mod detail;
pub mod list;

use crate::cover::CoverResolver;
use crate::formats::{BookDate, Rating};
use crate::rating::stars;

pub const STYLESHEET: &str = include_str!("style.css");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    /// Routes served by `readlog-app`: `/book/{id}`, `/?tag={tag}`.
    Server,
    /// Directory-style paths written by `readlog export`.
    Static,
}

/// Builds the hrefs every page links to.
#[derive(Debug, Clone)]
pub struct Links {
    base: String,
    style: LinkStyle,
}

impl Links {
    pub fn server() -> Self {
        Self {
            base: "/".to_owned(),
            style: LinkStyle::Server,
        }
    }

    pub fn static_site(base: &str) -> Self {
        let mut base = base.trim().to_owned();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self {
            base,
            style: LinkStyle::Static,
        }
    }

    pub fn style(&self) -> LinkStyle {
        self.style
    }

    pub fn home(&self) -> String {
        self.base.clone()
    }

    pub fn book(&self, id: &str) -> String {
        match self.style {
            LinkStyle::Server => format!("{}book/{}", self.base, urlencoding::encode(id)),
            LinkStyle::Static => format!("{}book/{}/", self.base, urlencoding::encode(id)),
        }
    }

    pub fn tag(&self, tag: &str) -> String {
        match self.style {
            LinkStyle::Server => format!("{}?tag={}", self.base, urlencoding::encode(tag)),
            LinkStyle::Static => format!("{}tag/{}/", self.base, urlencoding::encode(tag)),
        }
    }

    pub fn stylesheet(&self) -> String {
        format!("{}static/style.css", self.base)
    }

    pub fn dark_mode_toggle(&self) -> String {
        format!("{}dark-mode", self.base)
    }
}

/// Everything a page needs besides the books themselves.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub site_title: String,
    pub dark_mode: bool,
    pub links: Links,
    pub covers: CoverResolver,
}

impl RenderContext {
    pub fn new(site_title: impl Into<String>, links: Links, covers: CoverResolver) -> Self {
        Self {
            site_title: site_title.into(),
            dark_mode: false,
            links,
            covers,
        }
    }

    pub fn with_dark_mode(mut self, dark_mode: bool) -> Self {
        self.dark_mode = dark_mode;
        self
    }
}

/// Wraps `body` in the shared document shell.
pub fn layout(ctx: &RenderContext, page_title: &str, body: &str, script: Option<&str>) -> String {
    let mut out = String::new();
    let class = if ctx.dark_mode { " class=\"dark\"" } else { "" };
    out.push_str("<!doctype html>\n");
    out.push_str(&format!("<html lang=\"en\"{class}>\n"));
    out.push_str("<head>\n");
    out.push_str("  <meta charset=\"utf-8\">\n");
    out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("  <title>{}</title>\n", escape(page_title)));
    out.push_str(&format!(
        "  <link rel=\"stylesheet\" href=\"{}\">\n",
        escape(&ctx.links.stylesheet())
    ));
    out.push_str("</head>\n");
    out.push_str("<body>\n");
    out.push_str(body);
    if ctx.links.style() == LinkStyle::Static {
        out.push_str(&format!("<script>{STATIC_DARK_MODE_SCRIPT}</script>\n"));
    }
    if let Some(script) = script {
        out.push_str(&format!("<script>{script}</script>\n"));
    }
    out.push_str("</body>\n");
    out.push_str("</html>\n");
    out
}

// Static pages have no server to remember the flag, so the browser keeps it.
const STATIC_DARK_MODE_SCRIPT: &str = r#"(function () {
  var dark = false;
  try { dark = JSON.parse(localStorage.getItem("darkMode")) === true; } catch (e) {}
  document.documentElement.classList.toggle("dark", dark);
  var button = document.getElementById("dark-mode-toggle");
  if (!button) return;
  button.addEventListener("click", function () {
    dark = !dark;
    localStorage.setItem("darkMode", JSON.stringify(dark));
    document.documentElement.classList.toggle("dark", dark);
  });
})();"#;

/// Dark-mode button. A form post on the server, a script-driven button on
/// static pages.
pub fn dark_mode_toggle(ctx: &RenderContext, return_to: &str) -> String {
    let (icon, title) = if ctx.dark_mode {
        ("\u{2600}\u{fe0f}", "Light mode")
    } else {
        ("\u{1f319}", "Dark mode")
    };

    match ctx.links.style() {
        LinkStyle::Server => format!(
            "<form method=\"post\" action=\"{}\" class=\"dark-mode-form\">\
<input type=\"hidden\" name=\"return_to\" value=\"{}\">\
<button type=\"submit\" class=\"dark-mode-toggle\" title=\"{title}\">{icon}</button></form>",
            escape(&ctx.links.dark_mode_toggle()),
            escape(return_to),
        ),
        LinkStyle::Static => "<button type=\"button\" id=\"dark-mode-toggle\" \
class=\"dark-mode-toggle\" title=\"Toggle dark mode\">\u{1f319}</button>"
            .to_owned(),
    }
}

/// Star widget markup, or an empty string when the rating renders nothing.
pub fn rating_stars(rating: Option<&Rating>) -> String {
    let Some(stars) = stars(rating) else {
        return String::new();
    };

    let mut out = String::from("<div class=\"rating-stars\">");
    for star in stars {
        out.push_str(&format!(
            "<span class=\"{}\">\u{2b50}</span>",
            star.css_class()
        ));
    }
    out.push_str("</div>");
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `Mar 5, 2024`
    Short,
    /// `March 5, 2024`
    Long,
}

/// Human date for a book date. Unparseable values are shown as written.
pub fn format_date(date: &BookDate, style: DateStyle) -> String {
    match date.to_naive() {
        Some(day) => match style {
            DateStyle::Short => day.format("%b %-d, %Y").to_string(),
            DateStyle::Long => day.format("%B %-d, %Y").to_string(),
        },
        None => date.raw(),
    }
}

pub fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
