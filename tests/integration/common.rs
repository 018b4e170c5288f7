//! Shared helpers for integration tests.

use std::collections::HashMap;

use futures::future::BoxFuture;
use petk::resolver::{IncludeResolver, ResolvedInclude};

/// An in-memory include resolver mapping ids to content. The id returned
/// for a resolution is the requested path itself.
pub struct MapResolver {
    entries: HashMap<String, String>,
}

impl MapResolver {
    pub fn new<const N: usize>(entries: [(&str, &str); N]) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl IncludeResolver for MapResolver {
    fn resolve<'a>(
        &'a self,
        path: &'a str,
        _chain: &'a [String],
    ) -> BoxFuture<'a, anyhow::Result<ResolvedInclude>> {
        Box::pin(async move {
            match self.entries.get(path) {
                Some(content) => Ok(ResolvedInclude {
                    id: path.to_string(),
                    content: content.clone(),
                }),
                None => anyhow::bail!("unknown include id: {path}"),
            }
        })
    }
}
