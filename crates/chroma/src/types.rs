use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-document key-value attributes as stored by Chroma
pub type Metadata = serde_json::Map<String, Value>;

/// Chroma collection descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Collection UUID, used in record-level routes
    pub id: String,

    /// Collection name
    pub name: String,

    /// Collection-level metadata
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Columns Chroma should return from a get
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Include {
    Documents,
    Metadatas,
    Embeddings,
    Distances,
    Uris,
}

/// Body of `POST .../collections/{id}/get`
#[derive(Debug, Clone, Serialize, Default)]
pub struct GetRequest {
    /// Restrict to these ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,

    /// Metadata filter (Chroma `where` clause)
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,

    /// Maximum number of records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Records to skip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,

    /// Returned columns
    pub include: Vec<Include>,
}

impl GetRequest {
    /// Fetch documents and metadatas of every record
    pub fn documents_and_metadatas() -> Self {
        Self {
            include: vec![Include::Documents, Include::Metadatas],
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: Option<u32>) -> Self {
        self.offset = offset;
        self
    }
}

/// Column-oriented get result
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GetResponse {
    pub ids: Vec<String>,

    #[serde(default)]
    pub documents: Option<Vec<Option<String>>>,

    #[serde(default)]
    pub metadatas: Option<Vec<Option<Metadata>>>,
}

/// One stored document with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub document: Option<String>,
    pub metadata: Metadata,
}

impl GetResponse {
    /// Number of returned records
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Zip the id, document and metadata columns into rows
    ///
    /// Missing columns and null cells become `None` / an empty map.
    pub fn into_records(self) -> Vec<Record> {
        let mut documents = self.documents.unwrap_or_default().into_iter();
        let mut metadatas = self.metadatas.unwrap_or_default().into_iter();

        self.ids
            .into_iter()
            .map(|id| Record {
                id,
                document: documents.next().flatten(),
                metadata: metadatas.next().flatten().unwrap_or_default(),
            })
            .collect()
    }
}

/// Chroma error body, e.g. `{"error": "NotFoundError", "message": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn is_not_found(&self) -> bool {
        self.error
            .as_deref()
            .map(|e| e.contains("NotFound"))
            .unwrap_or(false)
    }

    pub fn describe(&self) -> Option<String> {
        match (&self.error, &self.message) {
            (Some(error), Some(message)) => Some(format!("{}: {}", error, message)),
            (None, Some(message)) => Some(message.clone()),
            (Some(error), None) => Some(error.clone()),
            (None, None) => None,
        }
    }
}
