use crate::formats::Book;
use crate::html::card::book_card;
use crate::html::{RenderContext, dark_mode_toggle, escape, layout};
use crate::library::ListFilter;

pub fn book_list_page(
    ctx: &RenderContext,
    books: &[&Book],
    filter: &ListFilter,
    return_to: &str,
) -> String {
    let mut body = String::new();

    body.push_str("<div class=\"app\">\n");
    body.push_str("<header class=\"app-header\">\n");
    body.push_str("  <div class=\"header-content-wrapper\">\n");
    body.push_str(&format!(
        "    <a href=\"{}\" class=\"site-title\">{}</a>\n",
        escape(&ctx.links.home()),
        escape(&ctx.site_title)
    ));
    body.push_str(&format!(
        "    <div class=\"header-actions\">{}</div>\n",
        dark_mode_toggle(ctx, return_to)
    ));
    body.push_str("  </div>\n");
    body.push_str("</header>\n");

    body.push_str("<main class=\"book-list-page\">\n");
    if let Some(banner) = filter_banner(filter) {
        body.push_str(&format!(
            "  <div class=\"active-filter\">{} <a href=\"{}\" class=\"clear-filter\">clear</a></div>\n",
            escape(&banner),
            escape(&ctx.links.home())
        ));
    }

    if books.is_empty() {
        body.push_str("  <p class=\"empty\">No books match this filter.</p>\n");
    } else {
        body.push_str("  <section class=\"book-grid\">\n");
        for book in books {
            body.push_str(&book_card(ctx, book));
        }
        body.push_str("  </section>\n");
    }
    body.push_str("</main>\n");
    body.push_str("</div>\n");

    let title = match filter.tag.as_deref().filter(|t| !t.is_empty()) {
        Some(tag) => format!("#{tag} \u{b7} {}", ctx.site_title),
        None => ctx.site_title.clone(),
    };
    layout(ctx, &title, &body, None)
}

fn filter_banner(filter: &ListFilter) -> Option<String> {
    let tag = filter.tag.as_deref().filter(|t| !t.is_empty());
    let status = filter.status.as_deref().filter(|s| !s.is_empty());
    match (tag, status) {
        (None, None) => None,
        (Some(tag), None) => Some(format!("Showing books tagged #{tag}")),
        (None, Some(status)) => Some(format!("Showing books with status {status}")),
        (Some(tag), Some(status)) => Some(format!(
            "Showing books tagged #{tag} with status {status}"
        )),
    }
}
