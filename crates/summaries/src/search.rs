use callnotes_common::{CallNotesError, Result};
use std::io::{self, Write};

use crate::record::SummaryRecord;
use crate::RULE_WIDTH;

/// Case-insensitive substring query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    needle: String,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CallNotesError::invalid_input("Search query cannot be empty"));
        }

        let needle = text.to_lowercase();
        Ok(Self { text, needle })
    }

    /// Join command-line words with single spaces
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Result<Self> {
        let text = words
            .iter()
            .map(|w| w.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(text)
    }

    /// Query as typed by the user
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.needle)
    }
}

/// A summary containing the query, with the lines that contain it
#[derive(Debug, Clone)]
pub struct SummaryMatch<'a> {
    pub record: &'a SummaryRecord,
    pub lines: Vec<&'a str>,
}

/// Summaries whose text contains the query, in input order
pub fn find_matches<'a>(records: &'a [SummaryRecord], query: &SearchQuery) -> Vec<SummaryMatch<'a>> {
    records
        .iter()
        .filter(|record| query.matches(&record.text))
        .map(|record| SummaryMatch {
            record,
            lines: record
                .text
                .split('\n')
                .filter(|line| query.matches(line))
                .map(str::trim)
                .collect(),
        })
        .collect()
}

/// Render the search result for `query` over `records`
pub fn write_search_report<W: Write>(
    out: &mut W,
    records: &[SummaryRecord],
    query: &SearchQuery,
) -> io::Result<()> {
    let q = query.as_str();

    writeln!(out, "🔍 Searching for: '{}'", q)?;
    writeln!(out, "📊 Total summaries: {}", records.len())?;
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

    let matches = find_matches(records, query);

    if matches.is_empty() {
        writeln!(out)?;
        writeln!(out, "❌ No summaries found containing '{}'", q)?;
        writeln!(out)?;
        writeln!(out, "Available summaries:")?;
        for record in records {
            writeln!(out, "  - {}", record.file_name())?;
        }
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "✅ Found {} summaries containing '{}':", matches.len(), q)?;
    writeln!(out)?;

    for m in &matches {
        writeln!(out, "📄 {}", m.record.file_name())?;
        writeln!(out, "   Client: {}", m.record.client_name())?;
        writeln!(out, "   Type: {}", m.record.call_type())?;
        for line in &m.lines {
            writeln!(out, "   ➜ {}", line)?;
        }
        writeln!(out)?;
    }

    Ok(())
}
