//! Loading a document corpus from the filesystem.
//!
//! [`load_directory`] walks a directory tree and dispatches each file on its
//! extension through the [`DocumentLoader`] trait: [`TextLoader`] for plain
//! text and Markdown, [`PdfLoader`] for PDF (one [`Document`] per page).
//! Unsupported extensions are skipped; a file that fails to load is logged
//! and skipped so one bad file cannot sink the whole corpus.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use jwalk::WalkDir;
use tracing::{debug, info, warn};

use crate::document::{Document, META_PAGE, META_SOURCE};
use crate::error::{HelpdeskError, Result};

/// Loads the documents contained in a single file of a supported format.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load every document contained in the file at `path`.
    async fn load(&self, path: &Path) -> Result<Vec<Document>>;

    /// Lower-case file extensions this loader accepts.
    fn supported_extensions(&self) -> &[&str];
}

/// Loads a whole text or Markdown file as one [`Document`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader;

#[async_trait]
impl DocumentLoader for TextLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let text = tokio::fs::read_to_string(path).await?;
        let source = path.display().to_string();
        Ok(vec![Document::new(source.clone(), text, source)])
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md"]
    }
}

/// Loads a PDF file as one [`Document`] per page, with `page` metadata.
///
/// Text extraction is CPU-bound and runs under `spawn_blocking`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let source = path.display().to_string();
        let path = path.to_path_buf();

        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_by_pages(&path)
                .map_err(|e| HelpdeskError::Io(std::io::Error::other(e.to_string())))
        })
        .await
        .map_err(|e| HelpdeskError::Io(std::io::Error::other(e)))??;

        let documents = pages
            .into_iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(i, text)| {
                let page = i + 1;
                Document {
                    id: format!("{source}#page={page}"),
                    text,
                    metadata: HashMap::from([
                        (META_SOURCE.to_string(), source.clone()),
                        (META_PAGE.to_string(), page.to_string()),
                    ]),
                }
            })
            .collect();

        Ok(documents)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }
}

/// Load every supported document under `dir`, in traversal order.
///
/// The ordering follows the directory walk and is not guaranteed stable
/// across filesystems.
///
/// # Errors
///
/// Returns [`HelpdeskError::NotFound`] if `dir` does not exist or is not a
/// directory. Failures on individual files are logged and the file skipped.
pub async fn load_directory(dir: impl AsRef<Path>) -> Result<Vec<Document>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(HelpdeskError::NotFound { path: dir.to_path_buf() });
    }

    let loaders: [&dyn DocumentLoader; 2] = [&TextLoader, &PdfLoader];

    let files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(entry.path()),
            Ok(_) => None,
            Err(err) => {
                warn!(error = %err, "failed to walk directory entry");
                None
            }
        })
        .collect();

    let mut documents = Vec::new();
    for path in files {
        let Some(ext) = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase)
        else {
            continue;
        };
        let Some(loader) =
            loaders.iter().find(|l| l.supported_extensions().contains(&ext.as_str()))
        else {
            debug!(path = %path.display(), "skipping unsupported extension");
            continue;
        };

        match loader.load(&path).await {
            Ok(docs) => documents.extend(docs),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable file");
            }
        }
    }

    info!(dir = %dir.display(), count = documents.len(), "loaded corpus");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let err = load_directory("/definitely/not/a/real/dir").await.unwrap_err();
        assert!(matches!(err, HelpdeskError::NotFound { .. }));
    }

    #[tokio::test]
    async fn loads_text_files_and_skips_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("guide.txt"), "How to reset the router.").unwrap();
        std::fs::write(dir.path().join("notes.md"), "# Release notes").unwrap();
        std::fs::write(dir.path().join("binary.bin"), [0u8, 159, 146, 150]).unwrap();

        let documents = load_directory(dir.path()).await.unwrap();

        assert_eq!(documents.len(), 2);
        assert!(documents.iter().all(|d| d.source().is_some()));
        assert!(documents.iter().any(|d| d.text.contains("reset the router")));
    }

    #[tokio::test]
    async fn unreadable_file_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ok.txt"), "fine").unwrap();
        // Invalid UTF-8 makes read_to_string fail for this file only.
        std::fs::write(dir.path().join("bad.txt"), [0xff, 0xfe, 0xfd]).unwrap();

        let documents = load_directory(dir.path()).await.unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].text, "fine");
    }
}
