//! Structured reply extraction.
//!
//! The model is instructed to answer in four delimited sections. Each section
//! is located independently against the whole text, so a missing or misplaced
//! marker never prevents the others from being read.

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};
use async_graphql::{Enum, SimpleObject};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

pub(crate) const ANSWER_MARKER: &str = "__ANSWER__";
pub(crate) const CONFIDENCE_MARKER: &str = "__CONFIDENCE__";
pub(crate) const EVIDENCE_MARKER: &str = "__EVIDENCE__";
pub(crate) const ACTION_MARKER: &str = "__ACTION__";

/// Section markers in the order the model is asked to emit them.
const MARKERS: [&str; 4] = [
    ANSWER_MARKER,
    CONFIDENCE_MARKER,
    EVIDENCE_MARKER,
    ACTION_MARKER,
];

const UNKNOWN_SOURCE: &str = "Unknown";
const UNKNOWN_PAGE: &str = "N/A";

#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl Confidence {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = anyhow::Error;

    /// Only the exact, case-sensitive labels are accepted.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "High" => Ok(Confidence::High),
            "Medium" => Ok(Confidence::Medium),
            "Low" => Ok(Confidence::Low),
            other => bail!("unknown confidence label: {other:?}"),
        }
    }
}

#[derive(SimpleObject, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Citation {
    pub(crate) source: String,
    pub(crate) page: String,
    pub(crate) excerpt: String,
}

impl Citation {
    /// A row that could not be split into source, page and excerpt.
    fn degraded(line: &str) -> Self {
        Self {
            source: UNKNOWN_SOURCE.to_string(),
            page: UNKNOWN_PAGE.to_string(),
            excerpt: line.to_string(),
        }
    }
}

#[derive(SimpleObject, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct StructuredReply {
    pub(crate) answer: String,
    pub(crate) confidence: Confidence,
    pub(crate) citations: Vec<Citation>,
    pub(crate) suggested_action: String,
}

/// Splits raw model output into a [`StructuredReply`]. Never fails.
///
/// When no answer section can be read, the whole raw text becomes the answer
/// so a non-empty reply is never shown blank.
pub(crate) fn parse_reply(raw: &str) -> StructuredReply {
    let mut reply = match extract(raw) {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "Failed to extract reply sections, using raw text");
            StructuredReply::default()
        }
    };
    if reply.answer.is_empty() && !raw.is_empty() {
        reply.answer = raw.to_string();
    }
    reply
}

fn extract(raw: &str) -> Result<StructuredReply> {
    let mut reply = StructuredReply::default();

    if let Some(answer) = section(raw, 0)? {
        reply.answer = answer.trim().to_string();
    }
    if let Some(confidence) = section(raw, 1)? {
        if let Ok(confidence) = confidence.trim().parse() {
            reply.confidence = confidence;
        }
    }
    if let Some(evidence) = section(raw, 2)? {
        reply.citations = evidence
            .trim()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_citation)
            .collect();
    }
    if let Some(action) = section(raw, 3)? {
        reply.suggested_action = action.trim().to_string();
    }

    Ok(reply)
}

/// One pattern per marker, in marker order. Section `i` runs from the first
/// `MARKERS[i]` to the nearest marker that comes later in the fixed order, or
/// to the end of the text.
static SECTION_PATTERNS: Lazy<Result<Vec<Regex>, regex::Error>> = Lazy::new(|| {
    (0..MARKERS.len())
        .map(|index| Regex::new(&section_pattern(index)))
        .collect()
});

fn section_pattern(index: usize) -> String {
    let terminators = MARKERS[index + 1..]
        .iter()
        .map(|marker| regex::escape(marker))
        .chain(std::iter::once("$".to_string()))
        .collect::<Vec<_>>()
        .join("|");
    format!(
        r"(?s){}\s*(.*?)(?:{terminators})",
        regex::escape(MARKERS[index])
    )
}

/// Returns the untrimmed content of the section opened by `MARKERS[index]`.
fn section(raw: &str, index: usize) -> Result<Option<&str>> {
    let patterns = SECTION_PATTERNS
        .as_ref()
        .map_err(|e| anyhow!("invalid section pattern: {e}"))?;

    Ok(patterns[index]
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str()))
}

/// Parses `Source | Page | Excerpt`. Only the first two pipes delimit, so the
/// excerpt may itself contain `|`.
fn parse_citation(line: &str) -> Citation {
    let mut fields = line.splitn(3, '|');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(source), Some(page), Some(excerpt)) => {
            let page = page.trim();
            Citation {
                source: source.trim().to_string(),
                page: if page.is_empty() {
                    UNKNOWN_PAGE.to_string()
                } else {
                    page.to_string()
                },
                excerpt: excerpt.trim().to_string(),
            }
        }
        _ => Citation::degraded(line.trim()),
    }
}
