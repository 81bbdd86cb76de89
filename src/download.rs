//! Saving retrieved documents.
//!
//! Holds the `content-disposition` filename parser used by the client and
//! [`DirectorySink`], the default [`DownloadSink`]. A download is staged in
//! a temporary file inside the target directory and then persisted under its
//! final name, so a failed write never leaves a partial file behind.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::traits::DownloadSink;

/// Extract the `filename` attribute from a `content-disposition` value.
///
/// Accepts `filename="<name>"` and `filename=<name>`. Quoted values end at
/// the closing quote, unquoted ones at the next `;`. The extended
/// `filename*=` form is not matched.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let lower = header.to_ascii_lowercase();
    let start = lower.find("filename=")? + "filename=".len();
    let rest = header[start..].trim_start();

    let name = match rest.strip_prefix('"') {
        Some(quoted) => quoted.split('"').next().unwrap_or(""),
        None => rest.split(';').next().unwrap_or("").trim(),
    };

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Reduce a suggested filename to a single safe path component.
fn sanitize_file_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or("").trim();
    match last {
        "" | "." | ".." => None,
        other => Some(other.to_string()),
    }
}

/// Saves documents into a fixed directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn save(&self, bytes: &[u8], file_name: &str) -> Result<PathBuf> {
        let Some(name) = sanitize_file_name(file_name) else {
            bail!("Refusing to save download with empty file name");
        };

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create download dir: {}", self.dir.display()))?;

        let mut staged = tempfile::NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("Failed to stage download in {}", self.dir.display()))?;
        staged.write_all(bytes)?;
        staged.flush()?;

        let target = self.dir.join(&name);
        staged
            .persist(&target)
            .with_context(|| format!("Failed to save {}", target.display()))?;

        Ok(target)
    }
}
