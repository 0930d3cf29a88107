use crate::formats::Book;
use crate::html::{DateStyle, RenderContext, escape, format_date, rating_stars};
use crate::preview::review_preview;

/// One book summary for the list grid. The whole card links to the detail page.
pub fn book_card(ctx: &RenderContext, book: &Book) -> String {
    let mut out = String::new();
    out.push_str("<article class=\"book-card\">\n");
    out.push_str(&format!(
        "  <a class=\"book-card-link\" href=\"{}\">\n",
        escape(&ctx.links.book(&book.id))
    ));

    out.push_str(&format!(
        "    <div class=\"book-cover\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></div>\n",
        escape(&ctx.covers.resolve(book)),
        escape(&book.title)
    ));

    out.push_str("    <div class=\"book-header\">\n");
    out.push_str("      <div class=\"book-info\">\n");
    out.push_str(&format!(
        "        <div class=\"book-status\">{}</div>\n",
        escape(book.status_label())
    ));
    out.push_str(&format!(
        "        <h3 class=\"book-title\">{}</h3>\n",
        escape(&book.title)
    ));
    if let Some(author) = book.author.as_deref().filter(|a| !a.is_empty()) {
        out.push_str(&format!(
            "        <p class=\"book-author\">by {}</p>\n",
            escape(author)
        ));
    }
    let stars = rating_stars(book.rating.as_ref());
    if !stars.is_empty() {
        out.push_str(&format!(
            "        <div class=\"rating-display-inline\">{stars}</div>\n"
        ));
    }
    out.push_str("      </div>\n");
    if let Some(date) = book.date.as_ref().filter(|d| !d.is_empty()) {
        out.push_str(&format!(
            "      <time class=\"book-date\" datetime=\"{}\">{}</time>\n",
            escape(&date.raw()),
            escape(&format_date(date, DateStyle::Short))
        ));
    }
    out.push_str("    </div>\n");

    if !book.tags.is_empty() {
        out.push_str("    <div class=\"book-tags\">");
        for tag in &book.tags {
            out.push_str(&format!("<span class=\"book-tag\">#{}</span>", escape(tag)));
        }
        out.push_str("</div>\n");
    }

    if let Some(review) = book.review.as_deref().filter(|r| !r.is_empty()) {
        out.push_str(&format!(
            "    <div class=\"book-review-preview\"><p>{}</p></div>\n",
            escape(&review_preview(review))
        ));
    }

    out.push_str("  </a>\n");
    out.push_str("</article>\n");
    out
}
