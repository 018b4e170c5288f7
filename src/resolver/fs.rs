//! Filesystem-backed include resolver.
//!
//! Resolves include paths against a root directory: the id is the
//! POSIX-normalized root-relative path (so `./a.md` and `a.md` are the same
//! unit for cycle detection) and the content is the file text. Paths that
//! escape the root are rejected.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use futures::future::BoxFuture;
use tracing::trace;

use super::{IncludeResolver, ResolvedInclude};
use crate::pattern::posix_normalize;

/// Include resolver reading files under a fixed root directory.
#[derive(Debug, Clone)]
pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    /// Create a resolver rooted at `root`. Include paths are interpreted
    /// relative to it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory includes are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl IncludeResolver for FsResolver {
    fn resolve<'a>(
        &'a self,
        path: &'a str,
        _chain: &'a [String],
    ) -> BoxFuture<'a, anyhow::Result<ResolvedInclude>> {
        Box::pin(async move {
            let normalized = posix_normalize(path);
            if Path::new(&normalized).is_absolute()
                || normalized == ".."
                || normalized.starts_with("../")
            {
                bail!("include path escapes resolver root: {path}");
            }

            let full = self.root.join(&normalized);
            trace!("Reading include from {}", full.display());
            let content = tokio::fs::read_to_string(&full)
                .await
                .with_context(|| format!("Failed to read include `{}`", full.display()))?;

            Ok(ResolvedInclude {
                id: normalized,
                content,
            })
        })
    }
}
