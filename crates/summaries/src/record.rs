use callnotes_chroma::{Metadata, Record};
use serde::Serialize;
use serde_json::Value;

/// A stored transcript summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    /// Chroma document id
    pub id: String,

    /// Summary text (empty when the document column was null)
    pub text: String,

    /// Metadata mapping (fileName, clientName, callType, callDate, ...)
    pub metadata: Metadata,
}

impl SummaryRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
        }
    }

    /// Source transcript file name, `Unknown` if absent
    pub fn file_name(&self) -> String {
        self.field("fileName", "Unknown")
    }

    pub fn client_name(&self) -> String {
        self.field("clientName", "N/A")
    }

    pub fn call_type(&self) -> String {
        self.field("callType", "N/A")
    }

    pub fn call_date(&self) -> String {
        self.field("callDate", "N/A")
    }

    /// Metadata value as display text; null counts as absent
    fn field(&self, key: &str, fallback: &str) -> String {
        match self.metadata.get(key) {
            None | Some(Value::Null) => fallback.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Number of characters (not bytes) in the summary
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl From<Record> for SummaryRecord {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            text: record.document.unwrap_or_default(),
            metadata: record.metadata,
        }
    }
}
