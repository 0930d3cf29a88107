use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::ExportArgs;
use crate::cover::CoverResolver;
use crate::html::detail::book_detail_page;
use crate::html::list::book_list_page;
use crate::html::{Links, RenderContext, STYLESHEET};
use crate::library::{Library, ListFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub book_pages: usize,
    pub tag_pages: usize,
}

pub fn run(args: ExportArgs) -> anyhow::Result<()> {
    let out_dir = PathBuf::from(&args.out);
    if out_dir.exists() {
        anyhow::bail!("export output already exists: {}", out_dir.display());
    }

    let library = Library::load(&PathBuf::from(&args.books))?;
    let covers = CoverResolver::new(&args.cover_service)?;
    let ctx = RenderContext::new(args.site_title, Links::static_site(&args.base_path), covers);

    let summary = export_site(&library, &ctx, &out_dir)?;
    tracing::info!(
        out = %out_dir.display(),
        book_pages = summary.book_pages,
        tag_pages = summary.tag_pages,
        "exported site"
    );
    Ok(())
}

/// Writes `index.html`, `book/{id}/index.html`, `tag/{tag}/index.html` and
/// `static/style.css` under `out_dir`.
pub fn export_site(
    library: &Library,
    ctx: &RenderContext,
    out_dir: &Path,
) -> anyhow::Result<ExportSummary> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create export dir: {}", out_dir.display()))?;

    let everything = ListFilter::default();
    let index = book_list_page(ctx, &library.filter(&everything), &everything, &ctx.links.home());
    write_new(&out_dir.join("index.html"), &index)?;

    for book in library.all() {
        let dir = out_dir.join("book").join(dir_segment("book id", &book.id)?);
        let page_url = ctx.links.book(&book.id);
        let html = book_detail_page(ctx, book, library.all(), &page_url)
            .with_context(|| format!("render book page: {}", book.id))?;
        write_new(&dir.join("index.html"), &html)?;
    }

    let tags = library.tags();
    for tag in &tags {
        let dir = out_dir.join("tag").join(dir_segment("tag", tag)?);
        let filter = ListFilter::tag(*tag);
        let html = book_list_page(ctx, &library.filter(&filter), &filter, &ctx.links.tag(tag));
        write_new(&dir.join("index.html"), &html)?;
    }

    write_new(&out_dir.join("static").join("style.css"), STYLESHEET)?;

    Ok(ExportSummary {
        book_pages: library.len(),
        tag_pages: tags.len(),
    })
}

/// A value used verbatim as one directory name.
fn dir_segment<'a>(kind: &str, value: &'a str) -> anyhow::Result<&'a str> {
    if value.is_empty() || value == "." || value == ".." || value.contains(['/', '\\']) {
        anyhow::bail!("{kind} cannot be used as a directory name: {value:?}");
    }
    Ok(value)
}

fn write_new(path: &Path, contents: &str) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path must have parent: {}", path.display()))?;
    std::fs::create_dir_all(parent)
        .with_context(|| format!("create dir: {}", parent.display()))?;

    let mut file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .with_context(|| format!("create: {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("write: {}", path.display()))?;
    file.flush()
        .with_context(|| format!("flush: {}", path.display()))?;
    Ok(())
}
