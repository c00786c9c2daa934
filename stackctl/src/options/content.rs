//! `@path` content resolution

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::errors::StackError;
use crate::filesys::file::File;

/// Prefix marking a value as "read this file" instead of literal content
pub const INDIRECTION_MARKER: char = '@';

/// Source of file contents for `@path` values
#[async_trait]
pub trait ContentReader: Send + Sync {
    /// Read the whole file as a string
    async fn read(&self, path: &Path) -> Result<String, StackError>;
}

/// Reads from the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FsContentReader;

#[async_trait]
impl ContentReader for FsContentReader {
    async fn read(&self, path: &Path) -> Result<String, StackError> {
        File::new(path).read_string().await
    }
}

/// Resolve a value that may be literal content or an `@path` reference.
///
/// Absent input stays absent. The referenced file is read exactly once.
pub async fn resolve<R>(reader: &R, value: Option<&str>) -> Result<Option<String>, StackError>
where
    R: ContentReader + ?Sized,
{
    let Some(value) = value else {
        return Ok(None);
    };

    let Some(path) = value.strip_prefix(INDIRECTION_MARKER) else {
        return Ok(Some(value.to_string()));
    };

    let path = PathBuf::from(path);
    if path.as_os_str().is_empty() {
        return Err(StackError::ContentResolution {
            path,
            reason: "empty path after '@'".to_string(),
        });
    }

    debug!("Reading content from {}", path.display());
    match reader.read(&path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(StackError::ContentResolution { path, reason }) => {
            Err(StackError::ContentResolution { path, reason })
        }
        Err(e) => Err(StackError::ContentResolution {
            path,
            reason: e.to_string(),
        }),
    }
}
