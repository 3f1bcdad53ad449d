// src/finowl/sections.rs
//! Section extraction from a summary body.
//!
//! The body is loosely structured markdown with three `##` headers in a fixed
//! order. We only do literal substring matching; this is not a markdown parser.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    pub marker: &'static str,
    pub name: &'static str,
}

pub const FEATURED_HEADER: SectionHeader = SectionHeader {
    marker: "## Featured Tickers and Projects",
    name: "Featured Tickers and Projects",
};
pub const INSIGHTS_HEADER: SectionHeader = SectionHeader {
    marker: "## Key Insights from Influencers",
    name: "Key Insights from Influencers",
};
pub const SENTIMENT_HEADER: SectionHeader = SectionHeader {
    marker: "## Market Sentiment and Directions",
    name: "Market Sentiment and Directions",
};

/// Expected order inside a summary body.
pub const HEADERS: [SectionHeader; 3] = [FEATURED_HEADER, INSIGHTS_HEADER, SENTIMENT_HEADER];

/// Cleaned, publishable sections of one summary. Only constructible when all three exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSet {
    pub featured: String,
    pub insights: String,
    pub sentiment: String,
}

/// Raw (pre-clean) section bodies borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpans<'a> {
    pub featured: &'a str,
    pub insights: &'a str,
    pub sentiment: &'a str,
}

impl<'a> SectionSpans<'a> {
    pub fn clean(&self) -> SectionSet {
        SectionSet {
            featured: clean_for_post(self.featured),
            insights: clean_for_post(self.insights),
            sentiment: clean_for_post(self.sentiment),
        }
    }
}

/// Locate the three sections. Headers are searched in order, each one after the
/// end of the previous. A header that is absent is reported by name; one that only
/// occurs out of order is reported as `"<name> (out of order)"`.
pub fn locate(content: &str) -> PipelineResult<SectionSpans<'_>> {
    let mut starts: [Option<usize>; 3] = [None; 3];
    let mut missing = Vec::new();
    let mut from = 0usize;

    for (slot, header) in starts.iter_mut().zip(HEADERS.iter()) {
        match content[from..].find(header.marker) {
            Some(rel) => {
                let at = from + rel;
                *slot = Some(at);
                from = at + header.marker.len();
            }
            None if content.contains(header.marker) => {
                missing.push(format!("{} (out of order)", header.name))
            }
            None => missing.push(header.name.to_string()),
        }
    }

    let [Some(f), Some(i), Some(s)] = starts else {
        return Err(PipelineError::MissingSections { names: missing });
    };

    Ok(SectionSpans {
        featured: &content[f + FEATURED_HEADER.marker.len()..i],
        insights: &content[i + INSIGHTS_HEADER.marker.len()..s],
        sentiment: &content[s + SENTIMENT_HEADER.marker.len()..],
    })
}

/// All-or-nothing extraction + cleanup of the three sections.
pub fn extract(content: &str) -> PipelineResult<SectionSet> {
    let spans = locate(content)?;
    Ok(spans.clean())
}

static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold regex"));
static RE_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("italic regex"));
static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").expect("newline regex"));
static RE_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)- ").expect("bullet regex"));

/// Strip emphasis, collapse blank lines, swap `- ` bullets for `•`, trim.
/// No truncation: length limits are left to the publisher.
pub fn clean_for_post(content: &str) -> String {
    let out = RE_BOLD.replace_all(content, "$1");
    let out = RE_ITALIC.replace_all(&out, "$1");
    let out = RE_BLANK_LINES.replace_all(&out, "\n");
    let out = RE_BULLET.replace_all(&out, "${1}• ");
    out.trim().to_string()
}
