//! Parsing of the model's `=== TITLE ===` formatted reply into sections.
//!
//! The parser never fails. Whatever the model produced is turned into an
//! ordered list of `(title, body)` pairs:
//!
//! 1. the raw text is split on the `===` marker and blank fragments are dropped;
//! 2. each fragment is split at its first newline into a title and a body.
//!
//! A marker written as `=== NAME ===` on its own line yields a title-only
//! fragment (`" NAME "`) followed by a fragment that starts with a newline and
//! carries the body. Those two are joined back into one section. A title-only
//! fragment with nothing to join becomes a section with an empty body and is
//! recorded in [`StructuredAnswer::malformed`].

use crate::types::{Section, StructuredAnswer};

/// Literal section marker.
pub const SECTION_MARKER: &str = "===";

/// A fragment after the first-newline split.
struct Fragment<'a> {
    title: &'a str,
    body: &'a str,
    has_newline: bool,
}

fn split_fragment(fragment: &str) -> Fragment<'_> {
    match fragment.split_once('\n') {
        Some((title, body)) => Fragment {
            title: title.trim(),
            body: body.trim(),
            has_newline: true,
        },
        None => Fragment {
            title: fragment.trim(),
            body: "",
            has_newline: false,
        },
    }
}

/// Parse a raw completion into ordered sections.
///
/// # Example
/// ```
/// use newsdesk_prompt::parse_sections;
///
/// let answer = parse_sections("=== A ===\nfoo\n=== B ===\nbar");
/// assert_eq!(answer.pairs(), vec![("A", "foo"), ("B", "bar")]);
/// ```
pub fn parse_sections(raw: &str) -> StructuredAnswer {
    let mut answer = StructuredAnswer::default();
    // Index of a title-only section still waiting for its body
    let mut pending: Option<usize> = None;

    for fragment in raw
        .split(SECTION_MARKER)
        .filter(|fragment| !fragment.trim().is_empty())
        .map(split_fragment)
    {
        if let Some(idx) = pending.take() {
            if fragment.has_newline && fragment.title.is_empty() {
                answer.sections[idx].body = fragment.body.to_string();
                continue;
            }
            answer.malformed.push(idx);
        }

        answer
            .sections
            .push(Section::new(fragment.title, fragment.body));

        if !fragment.has_newline {
            pending = Some(answer.sections.len() - 1);
        }
    }

    if let Some(idx) = pending {
        answer.malformed.push(idx);
    }

    for &idx in &answer.malformed {
        tracing::warn!(
            "Section '{}' has no body; rendering title only",
            answer.sections[idx].title
        );
    }

    tracing::debug!(
        "Parsed {} sections ({} malformed)",
        answer.sections.len(),
        answer.malformed.len()
    );

    answer
}
