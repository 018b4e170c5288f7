//! Inline short-form directive scanning.
//!
//! Short forms are `{{include:PATH}}` and `{{var:NAME}}` tokens found
//! directly in body text, outside any code fence. The `include` short form
//! carries its identifier as the path payload; the `var` short form cannot
//! carry a value and always binds its identifier to the empty string.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use serde_yaml::Value;

use super::parser::include_payload_from_path;
use super::{Directive, DirectivePayload};

fn short_form_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{(include|var):([^\s{}]+)\}\}").expect("short form regex is valid")
    })
}

pub(crate) fn scan_short_forms(text: &str, fenced: &[Range<usize>]) -> Vec<Directive> {
    let mut directives = Vec::new();

    for caps in short_form_re().captures_iter(text) {
        let (Some(m), Some(kind), Some(ident)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if fenced.iter().any(|r| r.contains(&m.start())) {
            continue;
        }

        let payload = match kind.as_str() {
            "include" => include_payload_from_path(ident.as_str()),
            _ => DirectivePayload::VarAssignment {
                name: ident.as_str().to_string(),
                value: Value::String(String::new()),
            },
        };

        directives.push(Directive {
            kind: payload.kind(),
            payload,
            range: m.range(),
            raw: m.as_str().to_string(),
        });
    }

    directives
}
