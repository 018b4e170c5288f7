//! Glob include pipeline.
//!
//! Turns a glob include spec into a concrete, ordered, deduplicated list of
//! file identifiers: each pattern is matched independently against the
//! filesystem rooted at the spec's working directory, results are unioned
//! with first-seen deduplication, optionally normalized, ordered, and
//! sampled. The resolver then resolves and recursively expands each
//! surviving entry in final order.
//!
//! # Pattern Syntax
//!
//! Standard glob patterns as understood by the `glob` crate:
//!
//! - `*` matches any sequence of characters within a path component
//! - `**` matches any sequence of path components
//! - `?` matches any single character
//! - `[abc]` / `[a-z]` match character sets and ranges
//!
//! Matching walks the directory tree without following symlinks and only
//! ever yields files, never directories. Matched paths are relative to the
//! working directory.
//!
//! # Determinism
//!
//! `order_by: shuffle_deterministic` uses the seeded PRNG in [`shuffle`]:
//! identical seed and candidate set produce a byte-identical order on every
//! run. Sampling with `sample_mode: random` draws from a caller-injectable
//! float stream so tests can pin its output.

pub mod shuffle;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::core::{PetkError, Result};

/// Ordering applied to glob matches before sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlobOrder {
    /// Preserve discovery order.
    #[default]
    None,
    /// Lexicographic string compare, ascending.
    AlphabeticalAsc,
    /// Lexicographic string compare, descending.
    AlphabeticalDesc,
    /// Stable sort by file modification time, oldest first.
    LastUpdatedAsc,
    /// Stable sort by file modification time, newest first.
    LastUpdatedDesc,
    /// Seeded deterministic permutation (see [`shuffle`]).
    ShuffleDeterministic,
}

impl GlobOrder {
    /// Parse an `order_by` value.
    ///
    /// # Errors
    ///
    /// Any unrecognized value is fatal and names the value.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "none" => Ok(Self::None),
            "alphabetical_asc" => Ok(Self::AlphabeticalAsc),
            "alphabetical_desc" => Ok(Self::AlphabeticalDesc),
            "last_updated_asc" => Ok(Self::LastUpdatedAsc),
            "last_updated_desc" => Ok(Self::LastUpdatedDesc),
            "shuffle_deterministic" => Ok(Self::ShuffleDeterministic),
            _ => Err(PetkError::InvalidOrderBy {
                value: value.to_string(),
            }),
        }
    }
}

/// Sampling strategy applied after ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleMode {
    /// Keep the first N post-order entries.
    #[default]
    FirstN,
    /// Partial Fisher-Yates over a copy, keep the first N.
    Random,
}

impl SampleMode {
    /// Parse a `sample_mode` value.
    ///
    /// # Errors
    ///
    /// Any unrecognized value is fatal and names the value.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "first_n" => Ok(Self::FirstN),
            "random" => Ok(Self::Random),
            _ => Err(PetkError::InvalidSampleMode {
                value: value.to_string(),
            }),
        }
    }
}

/// A fully classified glob include spec.
#[derive(Debug, Clone, Default)]
pub struct GlobSpec {
    /// The glob patterns to match, each rooted at `cwd`.
    pub patterns: Vec<String>,
    /// Working directory for matching; defaults to the process working
    /// directory.
    pub cwd: Option<PathBuf>,
    /// Ordering applied to the union of matches.
    pub order: GlobOrder,
    /// Seed for `shuffle_deterministic`; defaults to the empty string so
    /// runs stay reproducible even without an explicit seed.
    pub seed: Option<String>,
    /// Number of entries to keep after ordering; `None` keeps all.
    pub sample_size: Option<i64>,
    /// How sampled entries are chosen.
    pub sample_mode: SampleMode,
    /// Whether to drop entries that normalize to an earlier entry's path.
    pub normalize: bool,
}

impl GlobSpec {
    /// A spec matching a single pattern with default options, used when a
    /// bare include path turns out to contain glob metacharacters.
    pub fn from_pattern(pattern: impl Into<String>) -> Self {
        Self {
            patterns: vec![pattern.into()],
            ..Self::default()
        }
    }
}

/// Whether `path` contains glob metacharacters and should be treated as a
/// pattern rather than a literal include path.
pub fn contains_glob_meta(path: &str) -> bool {
    path.chars().any(|c| matches!(c, '*' | '?' | '[' | ']'))
}

/// Expand a glob spec into its final ordered, deduplicated entry list.
///
/// No matches is not an error; the expansion is simply empty.
///
/// # Errors
///
/// Returns an error for malformed patterns, an unusable working directory,
/// failed stat calls during mtime ordering, and non-positive sample sizes.
pub fn expand(spec: &GlobSpec) -> Result<Vec<String>> {
    expand_with_rng(spec, None)
}

/// [`expand`] with a caller-injected float stream for `sample_mode: random`.
///
/// The stream must yield values in `[0, 1)`. When `None`, a seeded spec
/// samples from its own deterministic stream and an unseeded spec falls
/// back to thread-local entropy.
///
/// # Errors
///
/// Same as [`expand`].
pub fn expand_with_rng(
    spec: &GlobSpec,
    rng: Option<&mut dyn FnMut() -> f64>,
) -> Result<Vec<String>> {
    let cwd = match &spec.cwd {
        Some(cwd) => cwd.clone(),
        None => std::env::current_dir().map_err(|source| PetkError::Io {
            operation: "resolving the working directory".to_string(),
            source,
        })?,
    };

    let mut entries = discover(&spec.patterns, &cwd)?;
    if spec.normalize {
        entries = normalize_entries(entries);
    }
    order_entries(&mut entries, spec, &cwd)?;
    sample_entries(entries, spec, rng)
}

/// Match every pattern against the tree under `cwd`, unioning results with
/// exact-string deduplication in first-seen order.
///
/// A pattern without metacharacters is a literal path: it matches iff the
/// file exists, and the entry keeps the pattern's exact spelling (so
/// `./a.txt` and `a.txt` survive as distinct entries until `normalize`
/// collapses them).
fn discover(patterns: &[String], cwd: &Path) -> Result<Vec<String>> {
    let base = cwd.canonicalize().map_err(|source| PetkError::Io {
        operation: format!("canonicalizing glob root `{}`", cwd.display()),
        source,
    })?;

    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for pattern_str in patterns {
        let pattern =
            glob::Pattern::new(pattern_str).map_err(|source| PetkError::InvalidGlobPattern {
                pattern: pattern_str.clone(),
                source,
            })?;

        debug!("Searching for pattern '{}' in {:?}", pattern_str, base);
        let before = entries.len();

        if !contains_glob_meta(pattern_str) {
            if base.join(posix_normalize(pattern_str)).is_file()
                && seen.insert(pattern_str.clone())
            {
                entries.push(pattern_str.clone());
            }
            continue;
        }

        for entry in WalkDir::new(&base)
            .follow_links(false)
            .into_iter()
            .filter_map(std::result::Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&base) else {
                continue;
            };
            let relative_str = relative.to_string_lossy();
            trace!("Checking path: {}", relative_str);

            if pattern.matches(&relative_str) && seen.insert(relative_str.to_string()) {
                entries.push(relative_str.to_string());
            }
        }

        debug!(
            "Found {} new matches for pattern '{}'",
            entries.len() - before,
            pattern_str
        );
    }

    Ok(entries)
}

/// Drop entries whose POSIX-normalized form duplicates an earlier entry,
/// keeping the first original-form representative.
fn normalize_entries(entries: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(entries.len());
    for entry in entries {
        if seen.insert(posix_normalize(&entry)) {
            kept.push(entry);
        }
    }
    kept
}

/// Convert backslashes to `/` and collapse `.`/`..` segments textually.
///
/// This is a purely lexical normalization; it never touches the filesystem.
pub fn posix_normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(&"..")) || segments.is_empty() {
                    if !absolute {
                        segments.push("..");
                    }
                } else {
                    segments.pop();
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

fn order_entries(entries: &mut Vec<String>, spec: &GlobSpec, cwd: &Path) -> Result<()> {
    match spec.order {
        GlobOrder::None => {}
        GlobOrder::AlphabeticalAsc => entries.sort(),
        GlobOrder::AlphabeticalDesc => entries.sort_by(|a, b| b.cmp(a)),
        GlobOrder::LastUpdatedAsc | GlobOrder::LastUpdatedDesc => {
            let mut stamped = Vec::with_capacity(entries.len());
            for entry in entries.drain(..) {
                let path = cwd.join(&entry);
                let modified = std::fs::metadata(&path)
                    .and_then(|meta| meta.modified())
                    .map_err(|source| PetkError::Io {
                        operation: format!("stat of glob entry `{entry}`"),
                        source,
                    })?;
                stamped.push((modified, entry));
            }
            if spec.order == GlobOrder::LastUpdatedAsc {
                stamped.sort_by(|a, b| a.0.cmp(&b.0));
            } else {
                stamped.sort_by(|a, b| b.0.cmp(&a.0));
            }
            entries.extend(stamped.into_iter().map(|(_, entry)| entry));
        }
        GlobOrder::ShuffleDeterministic => {
            let seed = spec.seed.as_deref().unwrap_or("");
            let mut rng = shuffle::Mulberry32::from_seed_str(seed);
            shuffle::fisher_yates(entries, || rng.next_f64());
        }
    }
    Ok(())
}

fn sample_entries(
    entries: Vec<String>,
    spec: &GlobSpec,
    rng: Option<&mut dyn FnMut() -> f64>,
) -> Result<Vec<String>> {
    let Some(size) = spec.sample_size else {
        return Ok(entries);
    };
    if size <= 0 {
        return Err(PetkError::InvalidSampleSize { value: size });
    }
    let n = size as usize;
    if n >= entries.len() {
        return Ok(entries);
    }

    match spec.sample_mode {
        SampleMode::FirstN => Ok(entries.into_iter().take(n).collect()),
        SampleMode::Random => {
            let mut items = entries;
            match rng {
                Some(next) => shuffle::partial_fisher_yates(&mut items, n, next),
                None => match &spec.seed {
                    Some(seed) => {
                        let mut rng = shuffle::Mulberry32::from_seed_str(seed);
                        shuffle::partial_fisher_yates(&mut items, n, &mut || rng.next_f64());
                    }
                    None => {
                        let mut rng = rand::thread_rng();
                        shuffle::partial_fisher_yates(&mut items, n, &mut || rng.r#gen::<f64>());
                    }
                },
            }
            items.truncate(n);
            Ok(items)
        }
    }
}
