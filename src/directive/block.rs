//! Fenced directive block extraction.
//!
//! A directive block begins at a line whose trimmed content is exactly
//! `` ```{petk:TYPE} `` and ends at the next line trimmed to exactly
//! `` ``` ``. The content strictly between the fences is the raw YAML
//! payload. Fences with any other info string (`` ```js ``, plain
//! `` ``` ``) are opaque: they produce no blocks, and their spans are
//! reported so the short-form scanner can mask them out.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use crate::core::{PetkError, Result};

const FENCE: &str = "```";

fn open_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^```\{petk:([A-Za-z0-9_-]+)\}$").expect("fence regex is valid")
    })
}

/// An extracted fenced directive block, consumed by the payload parser.
#[derive(Debug, Clone)]
pub struct Block {
    /// The directive type inside the fence tag.
    pub tag: String,
    /// The raw YAML payload between the fences.
    pub payload: String,
    /// 1-based line number of the opening fence.
    pub start_line: usize,
    /// 1-based line number of the closing fence.
    pub end_line: usize,
    /// Byte range of the whole block, from the start of the opening fence
    /// line through the closing fence line including its trailing newline.
    pub range: Range<usize>,
    /// The raw matched text.
    pub raw: String,
}

/// Result of a block scan over one text snapshot.
#[derive(Debug, Default)]
pub struct BlockScan {
    /// Directive blocks in source order.
    pub blocks: Vec<Block>,
    /// Byte ranges covered by any fence (directive or not), used to mask
    /// the short-form scanner.
    pub fenced: Vec<Range<usize>>,
}

enum State {
    Body,
    Directive {
        tag: String,
        open_line: usize,
        open_start: usize,
        payload_start: usize,
    },
    OtherFence {
        start: usize,
    },
}

/// Scan `text` for fenced blocks.
///
/// # Errors
///
/// Returns [`PetkError::UnclosedFence`] when a directive fence reaches end
/// of input without its closing `` ``` `` line. Unterminated non-directive
/// fences are not an error; they simply mask the rest of the text.
pub fn scan_blocks(text: &str) -> Result<BlockScan> {
    let mut scan = BlockScan::default();
    let mut state = State::Body;
    let mut offset = 0usize;
    let mut line_no = 0usize;

    for line in text.split_inclusive('\n') {
        line_no += 1;
        let start = offset;
        let end = offset + line.len();
        let trimmed = line.trim();

        match state {
            State::Body => {
                if let Some(caps) = open_fence_re().captures(trimmed) {
                    trace!(line = line_no, tag = &caps[1], "directive fence opened");
                    state = State::Directive {
                        tag: caps[1].to_string(),
                        open_line: line_no,
                        open_start: start,
                        payload_start: end,
                    };
                } else if trimmed.starts_with(FENCE) {
                    state = State::OtherFence { start };
                }
            }
            State::Directive {
                ref tag,
                open_line,
                open_start,
                payload_start,
            } => {
                if trimmed == FENCE {
                    let range = open_start..end;
                    scan.blocks.push(Block {
                        tag: tag.clone(),
                        payload: text[payload_start..start].to_string(),
                        start_line: open_line,
                        end_line: line_no,
                        range: range.clone(),
                        raw: text[range.clone()].to_string(),
                    });
                    scan.fenced.push(range);
                    state = State::Body;
                }
            }
            State::OtherFence { start: fence_start } => {
                if trimmed == FENCE {
                    scan.fenced.push(fence_start..end);
                    state = State::Body;
                }
            }
        }

        offset = end;
    }

    match state {
        State::Directive { tag, open_line, .. } => Err(PetkError::UnclosedFence {
            tag,
            line: open_line,
        }),
        State::OtherFence { start } => {
            scan.fenced.push(start..text.len());
            Ok(scan)
        }
        State::Body => Ok(scan),
    }
}
