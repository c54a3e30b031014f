use std::io::{self, Write};

use crate::record::SummaryRecord;
use crate::{PREVIEW_RULE_WIDTH, RULE_WIDTH};

/// Characters of summary text shown per record
pub const PREVIEW_CHARS: usize = 500;

/// Render the listing of all summaries with metadata and a text preview
pub fn write_inspect_report<W: Write>(out: &mut W, records: &[SummaryRecord]) -> io::Result<()> {
    let preview_rule = "-".repeat(PREVIEW_RULE_WIDTH);

    writeln!(out, "📊 Found {} transcript summaries", records.len())?;
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

    for (i, record) in records.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "{}. Summary ID: {}", i + 1, record.id)?;
        writeln!(out, "   File: {}", record.file_name())?;
        writeln!(out, "   Client: {}", record.client_name())?;
        writeln!(out, "   Call Type: {}", record.call_type())?;
        writeln!(out, "   Date: {}", record.call_date())?;
        writeln!(out)?;
        writeln!(out, "   Summary:")?;
        writeln!(out, "   {}", preview_rule)?;

        for line in preview(&record.text).split('\n') {
            writeln!(out, "   {}", line)?;
        }

        let total = record.char_len();
        if total > PREVIEW_CHARS {
            writeln!(out, "   ... (truncated, {} total characters)", total)?;
        }

        writeln!(out, "   {}", preview_rule)?;
        writeln!(out)?;
    }

    Ok(())
}

/// First `PREVIEW_CHARS` characters, cut on a char boundary
fn preview(text: &str) -> &str {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callnotes_chroma::Metadata;
    use serde_json::json;

    fn render(records: &[SummaryRecord]) -> String {
        let mut out = Vec::new();
        write_inspect_report(&mut out, records).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn acme(text: &str) -> SummaryRecord {
        SummaryRecord::new(
            "summary-acme",
            text,
            json!({
                "fileName": "Acme_2026-01-15_Sales.vtt",
                "clientName": "Acme",
                "callType": "Sales",
                "callDate": "2026-01-15",
            })
            .as_object()
            .cloned()
            .unwrap(),
        )
    }

    #[test]
    fn test_empty_collection() {
        let report = render(&[]);
        assert_eq!(report, format!("📊 Found 0 transcript summaries\n\n{}\n", "=".repeat(80)));
    }

    #[test]
    fn test_single_record_layout() {
        let report = render(&[acme("Overview\nAction items: send deck")]);
        let rule = format!("   {}", "-".repeat(76));

        let expected = [
            "📊 Found 1 transcript summaries".to_string(),
            String::new(),
            "=".repeat(80),
            String::new(),
            "1. Summary ID: summary-acme".to_string(),
            "   File: Acme_2026-01-15_Sales.vtt".to_string(),
            "   Client: Acme".to_string(),
            "   Call Type: Sales".to_string(),
            "   Date: 2026-01-15".to_string(),
            String::new(),
            "   Summary:".to_string(),
            rule.clone(),
            "   Overview".to_string(),
            "   Action items: send deck".to_string(),
            rule,
            String::new(),
        ]
        .join("\n")
            + "\n";

        assert_eq!(report, expected);
        assert!(!report.contains("truncated"));
    }

    #[test]
    fn test_long_summary_is_truncated() {
        let text = "é".repeat(PREVIEW_CHARS + 20);
        let report = render(&[acme(&text)]);

        assert!(report.contains(&format!("   {}\n", "é".repeat(PREVIEW_CHARS))));
        assert!(!report.contains(&"é".repeat(PREVIEW_CHARS + 1)));
        assert!(report.contains("   ... (truncated, 520 total characters)"));
    }

    #[test]
    fn test_exactly_preview_length_is_not_truncated() {
        let text = "a".repeat(PREVIEW_CHARS);
        let report = render(&[acme(&text)]);

        assert!(!report.contains("truncated"));
    }

    #[test]
    fn test_numbering_and_fallbacks() {
        let records = vec![
            acme("first"),
            SummaryRecord::new("summary-bare", "second", Metadata::new()),
        ];
        let report = render(&records);

        assert!(report.contains("📊 Found 2 transcript summaries"));
        assert!(report.contains("\n2. Summary ID: summary-bare\n   File: Unknown\n   Client: N/A\n"));
    }
}
