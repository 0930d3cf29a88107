use crate::formats::Book;
use crate::html::{
    DateStyle, RenderContext, dark_mode_toggle, escape, format_date, layout, rating_stars,
};
use crate::recommend::recommendations;
use crate::share::{ShareData, share_script};

/// Full page for one book. `page_url` is what the share button hands out.
///
/// Rendering is pure: counting the visit is the caller's job.
pub fn book_detail_page(
    ctx: &RenderContext,
    book: &Book,
    all_books: &[Book],
    page_url: &str,
) -> anyhow::Result<String> {
    let mut body = String::new();

    body.push_str("<div class=\"app\">\n");
    body.push_str("<header class=\"app-header\">\n");
    body.push_str("  <div class=\"header-content-wrapper\">\n");
    body.push_str(&format!(
        "    <a href=\"{}\" class=\"back-link\">\u{2190} Back to Home</a>\n",
        escape(&ctx.links.home())
    ));
    body.push_str("    <div class=\"header-actions\">\n");
    body.push_str(&format!(
        "      {}\n",
        dark_mode_toggle(ctx, &ctx.links.book(&book.id))
    ));
    body.push_str(
        "      <button type=\"button\" id=\"share-button\" class=\"share-button\" title=\"Share book\">\u{1f517}</button>\n",
    );
    body.push_str("    </div>\n");
    body.push_str("  </div>\n");
    body.push_str("</header>\n");

    body.push_str("<div class=\"book-detail-page\">\n");
    body.push_str("<div class=\"book-detail-container\">\n");
    body.push_str(&format!(
        "  <div class=\"book-cover-large\"><img src=\"{}\" alt=\"{}\"></div>\n",
        escape(&ctx.covers.resolve(book)),
        escape(&book.title)
    ));

    body.push_str("  <div class=\"book-detail-content\">\n");
    body.push_str(&format!(
        "    <div class=\"book-status-detail\">{}</div>\n",
        escape(book.status_label())
    ));
    body.push_str(&format!(
        "    <h1 class=\"book-title-detail\">{}</h1>\n",
        escape(&book.title)
    ));
    if let Some(author) = book.author.as_deref().filter(|a| !a.is_empty()) {
        body.push_str(&format!(
            "    <p class=\"book-author-detail\">by {}</p>\n",
            escape(author)
        ));
    }
    let stars = rating_stars(book.rating.as_ref());
    if !stars.is_empty() {
        body.push_str(&format!(
            "    <div class=\"rating-display-detail\">{stars}</div>\n"
        ));
    }
    if let Some(date) = book.date.as_ref().filter(|d| !d.is_empty()) {
        body.push_str(&format!(
            "    <time class=\"book-date-detail\" datetime=\"{}\">{}</time>\n",
            escape(&date.raw()),
            escape(&format_date(date, DateStyle::Long))
        ));
    }

    if let Some(url) = book.url.as_deref().filter(|u| !u.is_empty()) {
        body.push_str(&format!(
            "    <div class=\"book-url-section\"><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"external-link\">View on Amazon</a></div>\n",
            escape(url)
        ));
    }

    if !book.tags.is_empty() {
        body.push_str("    <div class=\"book-tags-detail\">");
        for tag in &book.tags {
            body.push_str(&format!(
                "<a href=\"{}\" class=\"book-tag-detail\">#{}</a>",
                escape(&ctx.links.tag(tag)),
                escape(tag)
            ));
        }
        body.push_str("</div>\n");
    }

    // Reviews are trusted library content and are emitted as HTML.
    if let Some(review) = book.review.as_deref().filter(|r| !r.is_empty()) {
        body.push_str(&format!(
            "    <div class=\"book-review-detail\"><div>{review}</div></div>\n"
        ));
    }

    let recs = recommendations(book, all_books);
    if !recs.is_empty() {
        body.push_str("    <div class=\"book-recommendations-detail\">\n");
        body.push_str(
            "      <h3 class=\"recommendations-title-detail\">You might also like:</h3>\n",
        );
        body.push_str("      <div class=\"recommendations-list-detail\">\n");
        for rec in recs {
            body.push_str(&format!(
                "        <a href=\"{}\" class=\"recommendation-item-detail\"><div class=\"recommendation-info-detail\"><strong>{}</strong>",
                escape(&ctx.links.book(&rec.id)),
                escape(&rec.title)
            ));
            if let Some(author) = rec.author.as_deref().filter(|a| !a.is_empty()) {
                body.push_str(&format!("<span>by {}</span>", escape(author)));
            }
            body.push_str("</div></a>\n");
        }
        body.push_str("      </div>\n");
        body.push_str("    </div>\n");
    }

    body.push_str("  </div>\n");
    body.push_str("</div>\n");
    body.push_str("</div>\n");
    body.push_str("</div>\n");

    let script = share_script(&ShareData::for_book(book, page_url))?;
    Ok(layout(ctx, &book.title, &body, Some(&script)))
}

/// Shown when the requested id has no book.
pub fn not_found_page(ctx: &RenderContext) -> String {
    let body = format!(
        "<div class=\"not-found\">\n  <h1>Book not found</h1>\n  <a href=\"{}\">Back to home</a>\n</div>\n",
        escape(&ctx.links.home())
    );
    layout(ctx, "Book not found", &body, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::CoverResolver;
    use crate::formats::Status;
    use crate::html::Links;

    fn ctx() -> RenderContext {
        RenderContext::new("Shelf", Links::server(), CoverResolver::default())
    }

    fn tagged(id: &str, title: &str, tags: &[&str]) -> Book {
        let mut book = Book::new(id, title);
        book.tags = tags.iter().map(|t| (*t).to_owned()).collect();
        book
    }

    #[test]
    fn detail_page_renders_review_and_recommendations() -> anyhow::Result<()> {
        let mut dune = tagged("dune", "Dune", &["scifi", "classic"]);
        dune.author = Some("Frank Herbert".to_owned());
        dune.status = Some(Status::Reading);
        dune.date = Some("2024-03-05".into());
        dune.review = Some("<p>Spice <em>must</em> flow.</p>".to_owned());
        dune.url = Some("https://example.com/dune".to_owned());
        let mut messiah = tagged("messiah", "Dune Messiah", &["scifi"]);
        messiah.author = Some("Frank Herbert".to_owned());
        let books = vec![
            dune,
            messiah,
            tagged("emma", "Emma", &["romance"]),
            tagged("odyssey", "The Odyssey", &["classic"]),
        ];

        let html = book_detail_page(&ctx(), &books[0], &books, "/book/dune")?;
        assert!(html.contains("<h1 class=\"book-title-detail\">Dune</h1>"));
        assert!(html.contains("Currently Reading"));
        assert!(html.contains(">March 5, 2024</time>"));
        assert!(html.contains("<p>Spice <em>must</em> flow.</p>"));
        assert!(html.contains("href=\"/?tag=scifi\""));
        assert!(html.contains("href=\"https://example.com/dune\""));
        assert!(html.contains("You might also like:"));
        assert!(html.contains("href=\"/book/messiah\""));
        assert!(html.contains("href=\"/book/odyssey\""));
        assert!(!html.contains("href=\"/book/emma\""));
        assert!(html.contains("Dune by Frank Herbert"));
        assert!(html.contains("<title>Dune</title>"));
        Ok(())
    }

    #[test]
    fn no_tags_means_no_recommendation_block() -> anyhow::Result<()> {
        let books = vec![Book::new("a", "A"), tagged("b", "B", &["x"])];
        let html = book_detail_page(&ctx(), &books[0], &books, "/book/a")?;
        assert!(!html.contains("You might also like"));
        assert!(!html.contains("book-review-detail"));
        Ok(())
    }

    #[test]
    fn not_found_links_home() {
        let html = not_found_page(&ctx());
        assert!(html.contains("Book not found"));
        assert!(html.contains("<a href=\"/\">Back to home</a>"));
    }
}
