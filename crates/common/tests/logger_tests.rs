use callnotes_common::logger::setup_logging;

#[test]
fn file_log_records_span_close_timing() {
    std::env::remove_var("RUST_LOG");
    let tmp = tempfile::tempdir().unwrap();
    let log_dir = tmp.path().join("logs");

    setup_logging(&log_dir, "debug").unwrap();

    tracing::info_span!("get_collection", name = "transcript_summaries").in_scope(|| {
        tracing::info!("fetching collection");
    });

    let text = std::fs::read_to_string(log_dir.join("callnotes.log")).unwrap();
    assert!(text.contains("fetching collection"));

    let close = text
        .lines()
        .find(|line| line.contains("get_collection") && line.contains("close"))
        .unwrap_or_else(|| panic!("no span close line in:\n{text}"));
    assert!(close.contains("time.busy"));

    assert!(!text.contains("ThreadId"));
    assert!(!text.contains("\x1b["));
}
