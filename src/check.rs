use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;

use crate::cli::{CheckArgs, ViewsArgs};
use crate::formats::Status;
use crate::library::Library;
use crate::store::{KeyValueStore, LocalFsStore};
use crate::views::ViewTracker;

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let library = Library::load(&PathBuf::from(&args.books))?;

    let count_status = |status: &Status| {
        library
            .all()
            .iter()
            .filter(|b| b.status.as_ref() == Some(status))
            .count()
    };

    let mut out = std::io::stdout().lock();
    writeln!(out, "books: {}", library.len())?;
    writeln!(out, "tags: {}", library.tags().len())?;
    for status in [Status::Reading, Status::Read, Status::WantToRead] {
        writeln!(out, "{}: {}", status.as_str(), count_status(&status))?;
    }
    out.flush().context("flush stdout")?;
    Ok(())
}

pub async fn views(args: ViewsArgs) -> anyhow::Result<()> {
    let library = match &args.books {
        Some(books) => Some(Library::load(&PathBuf::from(books))?),
        None => None,
    };

    let store: Arc<dyn KeyValueStore> = Arc::new(LocalFsStore::new(&args.data_dir));
    let counts = ViewTracker::new(store).counts().await;

    let mut rows: Vec<(&String, &u64)> = counts.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let mut out = std::io::stdout().lock();
    if rows.is_empty() {
        writeln!(out, "no views recorded")?;
    }
    for (id, count) in rows {
        let title = library
            .as_ref()
            .and_then(|l| l.get(id))
            .map(|b| b.title.as_str());
        match title {
            Some(title) => writeln!(out, "{count}\t{id}\t{title}")?,
            None => writeln!(out, "{count}\t{id}")?,
        }
    }
    out.flush().context("flush stdout")?;
    Ok(())
}
