//! Load a directory of markdown files as documents.

use std::path::Path;

use futures::future::try_join_all;
use tracing::{info, instrument};

use crate::error::{PlaybookError, Result};
use crate::traits::store::DocumentStore;
use crate::types::document::{Document, NewDocument};

/// Insert every `*.md` file in `dir` (not recursive) as a document whose
/// source is the file name. Files are inserted in name order, so ids follow
/// it too. Seeding twice inserts the files twice.
#[instrument(skip(store))]
pub async fn seed_directory<S: DocumentStore + ?Sized>(
    store: &S,
    dir: &Path,
) -> Result<Vec<Document>> {
    let unreadable =
        |e: std::io::Error| PlaybookError::Config(format!("cannot read {}: {}", dir.display(), e));

    let mut entries = tokio::fs::read_dir(dir).await.map_err(unreadable)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }
    files.sort();

    // Reads run concurrently; inserts stay in name order.
    let contents = try_join_all(files.iter().map(tokio::fs::read_to_string))
        .await
        .map_err(unreadable)?;

    let mut documents = Vec::with_capacity(files.len());
    for (path, content) in files.iter().zip(contents) {
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        documents.push(store.insert_document(&NewDocument::new(source, content)).await?);
    }

    info!(documents = documents.len(), "Seeded documents");
    Ok(documents)
}
