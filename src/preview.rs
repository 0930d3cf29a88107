//! Short plain-text excerpts of HTML review bodies.

pub const PREVIEW_CHARS: usize = 200;
pub const ELLIPSIS: &str = "...";

/// Preview of a review: the text of its first paragraph, or the raw input
/// when there is no non-empty paragraph, cut to [`PREVIEW_CHARS`] characters.
///
/// The ellipsis is appended unconditionally, including for short reviews.
pub fn review_preview(html: &str) -> String {
    let source = match first_paragraph_text(html) {
        Some(text) if !text.is_empty() => text,
        _ => html.to_owned(),
    };

    let mut out: String = source.chars().take(PREVIEW_CHARS).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Elements whose start tag implicitly closes an open `<p>`. Their end tags
/// close it too, since they can only end an ancestor of the paragraph.
const PARAGRAPH_BREAKERS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "dd", "details", "dialog", "dir",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "li", "listing", "main", "menu", "nav", "ol",
    "p", "plaintext", "pre", "search", "section", "summary", "table", "ul", "xmp",
];

/// Text content of the first `<p>` element, with nested tags stripped and
/// character references decoded. A paragraph runs until its end tag, the start
/// or end of a block element, or the end of input.
pub fn first_paragraph_text(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();

    let open = find_tag(&lower, "<p", 0)?;
    let content_start = open + lower[open..].find('>')? + 1;
    let content_end = paragraph_end(&lower, content_start);

    Some(decode_entities(&strip_tags(&html[content_start..content_end])))
}

fn paragraph_end(lower: &str, from: usize) -> usize {
    let mut pos = from;
    while let Some(rel) = lower[pos..].find('<') {
        let start = pos + rel;
        let name_start = start + 1 + usize::from(lower[start + 1..].starts_with('/'));
        let name_len = lower[name_start..]
            .bytes()
            .take_while(u8::is_ascii_alphanumeric)
            .count();
        if PARAGRAPH_BREAKERS.contains(&&lower[name_start..name_start + name_len]) {
            return start;
        }
        pos = start + 1;
    }
    lower.len()
}

/// Byte offset of the next opening tag named exactly `tag` (e.g. `<p` but not
/// `<pre`).
fn find_tag(lower: &str, tag: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(rel) = lower[pos..].find(tag) {
        let start = pos + rel;
        let after = start + tag.len();
        match lower.as_bytes().get(after) {
            Some(b'>') | Some(b'/') => return Some(start),
            Some(b) if b.is_ascii_whitespace() => return Some(start),
            _ => pos = after,
        }
    }
    None
}

fn strip_tags(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut rest = fragment;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        let tail = &rest[lt..];
        let skip = if tail.starts_with("<!--") {
            tail.find("-->").map(|i| i + "-->".len())
        } else {
            tail.find('>').map(|i| i + 1)
        };
        match skip {
            Some(skip) => rest = &tail[skip..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Named (the full HTML5 set) and numeric character references.
fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
