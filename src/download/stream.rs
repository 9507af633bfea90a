//! Copying a resource body into a file.

use std::path::Path;

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

use super::StreamError;
use crate::page::Resource;

/// Streams `resource` into `target`, returning the number of bytes written.
///
/// A partially written file is removed when streaming fails.
///
/// # Errors
///
/// [`StreamError::Read`] when the body cannot be read,
/// [`StreamError::Write`] when `target` cannot be created or written.
pub async fn save_resource(resource: Resource, target: &Path) -> Result<u64, StreamError> {
    let file = File::create(target)
        .await
        .map_err(|e| StreamError::write(target, e))?;

    let result = copy_body(file, resource, target).await;
    if result.is_err() {
        debug!(path = %target.display(), "cleaning up partial file after error");
        if let Err(error) = tokio::fs::remove_file(target).await {
            warn!(path = %target.display(), error = %error, "could not remove partial file");
        }
    }
    result
}

async fn copy_body(file: File, resource: Resource, target: &Path) -> Result<u64, StreamError> {
    let url = resource.url().to_string();
    let mut writer = BufWriter::new(file);
    let mut body = resource.into_content_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| StreamError::read(&url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| StreamError::write(target, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| StreamError::write(target, e))?;

    Ok(bytes_written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_resource_writes_all_chunks() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("1.pdf");
        let resource = Resource::from_chunks(
            "https://example.org/1.pdf",
            vec![Ok(b"%PDF-".to_vec()), Ok(b"1.7".to_vec())],
        );

        let written = save_resource(resource, &target).await.unwrap();
        assert_eq!(written, 8);
        assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_read_failure_removes_partial_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("1.pdf");
        let resource = Resource::from_chunks(
            "https://example.org/1.pdf",
            vec![
                Ok(b"%PDF-".to_vec()),
                Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof")),
            ],
        );

        let err = save_resource(resource, &target).await.unwrap_err();
        assert!(matches!(err, StreamError::Read { .. }));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_unwritable_target_is_write_error() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing").join("1.pdf");
        let resource = Resource::from_chunks("https://example.org/1.pdf", vec![]);

        let err = save_resource(resource, &target).await.unwrap_err();
        assert!(matches!(err, StreamError::Write { .. }));
    }
}
