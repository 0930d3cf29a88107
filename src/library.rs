use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use pulldown_cmark::{Options, Parser};
use serde::Deserialize;

use crate::formats::Book;

/// The immutable, ordered book collection.
#[derive(Debug, Clone, Default)]
pub struct Library {
    books: Vec<Book>,
}

/// List-view filters; both must match when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListFilter {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ListFilter {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            status: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tag.as_deref().is_none_or(str::is_empty)
            && self.status.as_deref().is_none_or(str::is_empty)
    }

    pub fn matches(&self, book: &Book) -> bool {
        let tag_ok = match self.tag.as_deref() {
            Some(tag) if !tag.is_empty() => book.has_tag(tag),
            _ => true,
        };
        let status_ok = match self.status.as_deref() {
            Some(status) if !status.is_empty() => {
                book.status.as_ref().is_some_and(|s| s.as_str() == status)
            }
            _ => true,
        };
        tag_ok && status_ok
    }
}

impl Library {
    /// Validates ids (non-empty, unique) and titles (non-empty).
    pub fn new(books: Vec<Book>) -> anyhow::Result<Self> {
        let mut seen = HashSet::new();
        for book in &books {
            if book.id.trim().is_empty() {
                anyhow::bail!("book has empty id: {:?}", book.title);
            }
            if book.title.trim().is_empty() {
                anyhow::bail!("book has empty title: {}", book.id);
            }
            if !seen.insert(book.id.as_str()) {
                anyhow::bail!("duplicate book id: {}", book.id);
            }
        }
        Ok(Self { books })
    }

    /// Loads a `.json` array, a `.yaml`/`.yml` sequence, or a directory of
    /// Markdown files with YAML front matter.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let books = if path.is_dir() {
            load_markdown_dir(path)?
        } else {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("read library: {}", path.display()))?;
            match path.extension().and_then(|e| e.to_str()) {
                Some("json") => serde_json::from_str(&contents)
                    .with_context(|| format!("parse json library: {}", path.display()))?,
                Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
                    .with_context(|| format!("parse yaml library: {}", path.display()))?,
                _ => anyhow::bail!(
                    "unsupported library format (expected .json, .yaml or a directory): {}",
                    path.display()
                ),
            }
        };

        let library = Self::new(books)
            .with_context(|| format!("validate library: {}", path.display()))?;
        tracing::info!(path = %path.display(), books = library.len(), "loaded library");
        Ok(library)
    }

    pub fn all(&self) -> &[Book] {
        &self.books
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn filter(&self, filter: &ListFilter) -> Vec<&Book> {
        self.books.iter().filter(|b| filter.matches(b)).collect()
    }

    /// Distinct tags in order of first appearance.
    pub fn tags(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.books
            .iter()
            .flat_map(|b| b.tags.iter())
            .filter(|t| seen.insert(t.as_str()))
            .map(String::as_str)
            .collect()
    }
}

fn load_markdown_dir(dir: &Path) -> anyhow::Result<Vec<Book>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("read library dir: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("md") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut books = Vec::with_capacity(paths.len());
    for path in paths {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("read book: {}", path.display()))?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow::anyhow!("book file has no usable name: {}", path.display()))?;
        let book = parse_markdown_book(&contents, stem)
            .with_context(|| format!("parse book: {}", path.display()))?;
        books.push(book);
    }

    // Newest first; undated books keep file-name order at the end.
    books.sort_by(|a, b| match (&a.date, &b.date) {
        (Some(a), Some(b)) => b.sort_key().cmp(&a.sort_key()),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    Ok(books)
}

/// Front matter supplies the record; the body becomes the review unless the
/// front matter already has one. A missing id defaults to `stem`.
pub fn parse_markdown_book(contents: &str, stem: &str) -> anyhow::Result<Book> {
    let (yaml, body) = split_front_matter(contents)?;
    let mut book: Book = serde_yaml::from_str(yaml).context("deserialize front matter")?;

    if book.id.trim().is_empty() {
        book.id = stem.to_owned();
    }
    if book.review.is_none() && !body.trim().is_empty() {
        book.review = Some(markdown_to_html(body));
    }
    Ok(book)
}

fn split_front_matter(contents: &str) -> anyhow::Result<(&str, &str)> {
    let rest = contents
        .strip_prefix("---\n")
        .or_else(|| contents.strip_prefix("---\r\n"))
        .ok_or_else(|| anyhow::anyhow!("book file must start with YAML front matter ('---')"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Ok((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    anyhow::bail!("unterminated YAML front matter")
}

fn markdown_to_html(md: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(md, options);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{BookDate, Status};

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Library::new(vec![Book::new("a", "A"), Book::new("a", "B")]).unwrap_err();
        assert!(err.to_string().contains("duplicate book id: a"));
    }

    #[test]
    fn rejects_blank_titles() {
        assert!(Library::new(vec![Book::new("a", " ")]).is_err());
    }

    #[test]
    fn loads_json_in_order() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("books.json");
        std::fs::write(
            &path,
            r#"[{"id":"b","title":"B","status":"read"},{"id":"a","title":"A","rating":"5"}]"#,
        )?;

        let library = Library::load(&path)?;
        let ids: Vec<_> = library.all().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(library.get("b").and_then(|b| b.status.clone()), Some(Status::Read));
        assert!(library.get("zzz").is_none());
        Ok(())
    }

    #[test]
    fn numeric_dates_do_not_break_loading() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("books.json");
        std::fs::write(
            &path,
            r#"[{"id":"a","title":"A","date":1709596800000},{"id":"b","title":"B","date":"soon"}]"#,
        )?;

        let library = Library::load(&path)?;
        assert_eq!(library.get("a").unwrap().date, Some(BookDate::Millis(1709596800000.0)));
        assert_eq!(library.get("b").unwrap().date, Some("soon".into()));
        Ok(())
    }

    #[test]
    fn loads_yaml() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("books.yml");
        std::fs::write(
            &path,
            "- id: dune\n  title: Dune\n  rating: 4\n  date: 2024-03-05\n  tags: [scifi]\n",
        )?;

        let library = Library::load(&path)?;
        let book = library.get("dune").unwrap();
        assert_eq!(book.date, Some("2024-03-05".into()));
        assert_eq!(book.tags, vec!["scifi"]);
        Ok(())
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.csv");
        std::fs::write(&path, "id,title").unwrap();
        assert!(Library::load(&path).is_err());
    }

    #[test]
    fn markdown_dir_orders_newest_first() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write(
            dir.path(),
            "dune.md",
            "---\ntitle: Dune\ndate: 2023-01-10\n---\n\nSpice *must* flow.\n",
        );
        write(
            dir.path(),
            "hobbit.md",
            "---\ntitle: The Hobbit\ndate: 2024-06-01\n---\n",
        );
        write(dir.path(), "notes.md", "---\ntitle: Notes\n---\nundated\n");
        write(dir.path(), "ignored.txt", "not a book");

        let library = Library::load(dir.path())?;
        let ids: Vec<_> = library.all().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["hobbit", "dune", "notes"]);

        let dune = library.get("dune").unwrap();
        assert_eq!(
            dune.review.as_deref(),
            Some("<p>Spice <em>must</em> flow.</p>\n")
        );
        assert_eq!(library.get("hobbit").unwrap().review, None);
        Ok(())
    }

    #[test]
    fn front_matter_review_wins_over_body() -> anyhow::Result<()> {
        let book = parse_markdown_book("---\nid: x\ntitle: X\nreview: <p>kept</p>\n---\nbody\n", "file")?;
        assert_eq!(book.id, "x");
        assert_eq!(book.review.as_deref(), Some("<p>kept</p>"));
        Ok(())
    }

    #[test]
    fn front_matter_is_required() {
        assert!(parse_markdown_book("title: X\n", "x").is_err());
        assert!(parse_markdown_book("---\ntitle: X\n", "x").is_err());
    }

    #[test]
    fn filters_by_tag_and_status() -> anyhow::Result<()> {
        let mut a = Book::new("a", "A");
        a.tags = vec!["scifi".to_owned()];
        a.status = Some(Status::Read);
        let mut b = Book::new("b", "B");
        b.tags = vec!["scifi".to_owned(), "classic".to_owned()];
        b.status = Some(Status::Reading);
        let library = Library::new(vec![a, b])?;

        let ids = |filter: &ListFilter| -> Vec<String> {
            library.filter(filter).iter().map(|b| b.id.clone()).collect()
        };
        assert_eq!(ids(&ListFilter::default()), vec!["a", "b"]);
        assert_eq!(ids(&ListFilter::tag("classic")), vec!["b"]);
        assert_eq!(
            ids(&ListFilter {
                tag: Some("scifi".to_owned()),
                status: Some("read".to_owned()),
            }),
            vec!["a"]
        );
        assert_eq!(library.tags(), vec!["scifi", "classic"]);
        Ok(())
    }
}
