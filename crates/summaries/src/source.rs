use async_trait::async_trait;
use callnotes_chroma::{ChromaClient, GetRequest};
use callnotes_common::Result;
use tracing::{debug, info, instrument};

use crate::record::SummaryRecord;

/// Where summaries are read from
#[async_trait]
pub trait SummarySource: Send + Sync {
    /// Load every summary in server order
    async fn fetch_all(&self) -> Result<Vec<SummaryRecord>>;
}

/// Server liveness and size of the summaries collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStats {
    /// Chroma base URL that answered
    pub base_url: String,

    /// Server clock from the heartbeat, in nanoseconds
    pub heartbeat: u64,

    pub name: String,
    pub id: String,

    /// Number of stored summaries
    pub count: u64,
}

/// Summaries stored in a Chroma collection
#[derive(Debug, Clone)]
pub struct ChromaSummaries {
    client: ChromaClient,
    collection: String,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl ChromaSummaries {
    pub fn new(client: ChromaClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
            limit: None,
            offset: None,
        }
    }

    /// Restrict to a page of the collection
    pub fn with_page(mut self, limit: Option<u32>, offset: Option<u32>) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Heartbeat the server, then count the collection's documents
    pub async fn stats(&self) -> Result<CollectionStats> {
        let heartbeat = self.client.heartbeat().await?;
        let collection = self.client.get_collection(&self.collection).await?;
        let count = self.client.count(&collection.id).await?;

        Ok(CollectionStats {
            base_url: self.client.base_url().to_string(),
            heartbeat,
            name: collection.name,
            id: collection.id,
            count,
        })
    }
}

#[async_trait]
impl SummarySource for ChromaSummaries {
    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn fetch_all(&self) -> Result<Vec<SummaryRecord>> {
        let collection = self.client.get_collection(&self.collection).await?;

        let request = GetRequest::documents_and_metadatas()
            .with_limit(self.limit)
            .with_offset(self.offset);
        let response = self.client.get(&collection.id, &request).await?;

        info!(
            "Loaded {} summaries from collection {}",
            response.len(),
            collection.name
        );

        let records: Vec<SummaryRecord> = response
            .into_records()
            .into_iter()
            .map(SummaryRecord::from)
            .collect();

        debug!(
            "Summary ids: {:?}",
            records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>()
        );

        Ok(records)
    }
}
