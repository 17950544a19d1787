use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

pub const PAGE_EXTENSION: &str = "md";

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_page_filename(page: &str) -> String {
    page.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    pub path: PathBuf,
    /// `false` when an earlier resolution already wrote the file.
    pub created: bool,
}

/// Markdown page files stored flat under one directory.
#[derive(Debug, Clone)]
pub struct PageCache {
    dir: PathBuf,
}

impl PageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns `true` when the directory had to be created.
    pub fn ensure_dir(&self) -> Result<bool> {
        if self.dir.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        Ok(true)
    }

    pub fn path_for(&self, page: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{PAGE_EXTENSION}", sanitize_page_filename(page)))
    }

    /// Store `content` for `page` unless a cached file already exists.
    ///
    /// An existing file is never touched, even if `content` differs.
    pub fn store_if_missing(&self, page: &str, content: &str) -> Result<CachedPage> {
        let path = self.path_for(page);
        if path.exists() {
            debug!(path = %path.display(), "cache hit, keeping existing page");
            return Ok(CachedPage {
                path,
                created: false,
            });
        }

        self.ensure_dir()?;
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                return Ok(CachedPage {
                    path,
                    created: false,
                });
            }
            Err(error) => {
                return Err(error).with_context(|| format!("failed to create {}", path.display()));
            }
        };
        file.write_all(content.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(path = %path.display(), "cached new page");
        Ok(CachedPage {
            path,
            created: true,
        })
    }

    pub fn cached_page_count(&self) -> Result<usize> {
        if !self.dir.is_dir() {
            return Ok(0);
        }
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read {}", self.dir.display()))?;
        let mut count = 0;
        for entry in entries {
            let entry = entry.with_context(|| format!("failed to read {}", self.dir.display()))?;
            let path = entry.path();
            if path.is_file()
                && path
                    .extension()
                    .is_some_and(|extension| extension == PAGE_EXTENSION)
            {
                count += 1;
            }
        }
        Ok(count)
    }
}
