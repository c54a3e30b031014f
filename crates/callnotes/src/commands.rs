use callnotes_common::{CallNotesError, Result};
use callnotes_summaries::{
    find_matches, write_inspect_report, write_search_report, ChromaSummaries, CollectionStats,
    SearchQuery, SummarySource,
};
use std::io::Write;
use tracing::info;

const SETUP_HINTS: &str = "Make sure:
  1. ChromaDB server is running (callnotes serve)
  2. You have indexed some transcripts
  3. The indexer has run at least once";

/// List every summary; returns how many were printed
pub async fn inspect<W: Write>(source: &dyn SummarySource, out: &mut W, json: bool) -> Result<usize> {
    let records = source.fetch_all().await?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &records)?;
        writeln!(out)?;
    } else {
        write_inspect_report(out, &records)?;
    }

    Ok(records.len())
}

/// Substring search over all summaries; returns the number of matches
pub async fn search<W: Write>(
    source: &dyn SummarySource,
    query: &SearchQuery,
    out: &mut W,
) -> Result<usize> {
    let records = source.fetch_all().await?;
    write_search_report(out, &records, query)?;

    let matched = find_matches(&records, query).len();
    info!("Query '{}' matched {} of {} summaries", query.as_str(), matched, records.len());
    Ok(matched)
}

/// Server liveness and collection size
pub async fn status<W: Write>(summaries: &ChromaSummaries, out: &mut W) -> Result<u64> {
    let stats = summaries.stats().await?;
    write_status(out, &stats)?;
    Ok(stats.count)
}

pub fn write_status<W: Write>(out: &mut W, stats: &CollectionStats) -> Result<()> {
    writeln!(out, "✅ ChromaDB is up at {} (heartbeat {})", stats.base_url, stats.heartbeat)?;
    writeln!(
        out,
        "📊 Collection '{}' ({}) holds {} documents",
        stats.name, stats.id, stats.count
    )?;
    Ok(())
}

/// Catch-all failure text printed to stderr
pub fn failure_message(err: &CallNotesError, with_hints: bool) -> String {
    let mut message = format!("❌ Error: {}", err);
    if with_hints || err.is_connection_error() {
        message.push_str("\n\n");
        message.push_str(SETUP_HINTS);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use callnotes_summaries::SummaryRecord;
    use serde_json::json;

    struct FakeSource(Vec<SummaryRecord>);

    #[async_trait]
    impl SummarySource for FakeSource {
        async fn fetch_all(&self) -> Result<Vec<SummaryRecord>> {
            Ok(self.0.clone())
        }
    }

    struct DownSource;

    #[async_trait]
    impl SummarySource for DownSource {
        async fn fetch_all(&self) -> Result<Vec<SummaryRecord>> {
            Err(CallNotesError::network("connection refused"))
        }
    }

    fn source() -> FakeSource {
        FakeSource(vec![
            SummaryRecord::new(
                "s1",
                "Action items: send deck",
                json!({ "fileName": "Acme.vtt" }).as_object().cloned().unwrap(),
            ),
            SummaryRecord::new(
                "s2",
                "Renewal",
                json!({ "fileName": "Globex.vtt" }).as_object().cloned().unwrap(),
            ),
        ])
    }

    #[tokio::test]
    async fn test_inspect_text() {
        let mut out = Vec::new();
        let count = inspect(&source(), &mut out, false).await.unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(count, 2);
        assert!(text.starts_with("📊 Found 2 transcript summaries"));
        assert!(text.contains("2. Summary ID: s2"));
    }

    #[tokio::test]
    async fn test_inspect_json() {
        let mut out = Vec::new();
        inspect(&source(), &mut out, true).await.unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["id"], "s1");
        assert_eq!(value[1]["metadata"]["fileName"], "Globex.vtt");
    }

    #[tokio::test]
    async fn test_search_counts_matches() {
        let mut out = Vec::new();
        let query = SearchQuery::new("ACTION").unwrap();
        let matched = search(&source(), &query, &mut out).await.unwrap();

        assert_eq!(matched, 1);
        assert!(String::from_utf8(out).unwrap().contains("📄 Acme.vtt"));
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let mut out = Vec::new();
        let err = inspect(&DownSource, &mut out, false).await.unwrap_err();

        assert!(err.is_connection_error());
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_status() {
        let stats = CollectionStats {
            base_url: "http://localhost:8000".to_string(),
            heartbeat: 1_700_000_000,
            name: "transcript_summaries".to_string(),
            id: "c0ffee".to_string(),
            count: 12,
        };
        let mut out = Vec::new();
        write_status(&mut out, &stats).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "✅ ChromaDB is up at http://localhost:8000 (heartbeat 1700000000)\n\
             📊 Collection 'transcript_summaries' (c0ffee) holds 12 documents\n"
        );
    }

    #[test]
    fn test_failure_message() {
        let err = CallNotesError::not_found("collection 'transcript_summaries'");
        assert_eq!(
            failure_message(&err, false),
            "❌ Error: Not found: collection 'transcript_summaries'"
        );

        let message = failure_message(&err, true);
        assert!(message.contains("1. ChromaDB server is running"));

        let message = failure_message(&CallNotesError::network("refused"), false);
        assert!(message.contains("Make sure:"));
    }
}
