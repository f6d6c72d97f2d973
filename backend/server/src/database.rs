//! # Redis
//!
//! Document store for survey responses.
//!
//! ## Requirements
//!
//! - One collection, one document per accepted submission
//! - Documents are written once and never touched again
//! - No indexes, no lookups, no relations between documents
//!
//! ## Implementation
//!
//! - Redis hash: 1 big key (the collection), then id-document pairs
//! - Document is the JSON of a [`SurveyRecord`], id is a fresh UUID v4
//! - `HSETNX` so an id can never overwrite an existing document
//! - A single [`ConnectionManager`] opened at startup, cloned per request
//! - A dropped connection is retried once by the manager, after that the insert fails and
//!   the request gets a 500. The submission is not queued or retried.
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{
    AsyncCommands, Client, RedisError,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use schema::{SurveyRecord, SurveySubmission};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Failed to encode survey document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Survey {0} already exists")]
    DuplicateId(Uuid),
}

#[async_trait]
pub trait SurveyStore: Send + Sync {
    /// Persists a validated submission. The store assigns the document id.
    async fn insert(
        &self,
        submission: SurveySubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<SurveyRecord, StoreError>;
}

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, RedisError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_secs(1));

    let client = Client::open(redis_url)?;
    client.get_connection_manager_with_config(config).await
}

pub struct RedisStore {
    connection: ConnectionManager,
    collection: String,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager, collection: impl Into<String>) -> Self {
        Self {
            connection,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl SurveyStore for RedisStore {
    async fn insert(
        &self,
        submission: SurveySubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<SurveyRecord, StoreError> {
        let record = SurveyRecord::new(Uuid::new_v4(), submission, submitted_at);
        let document = serde_json::to_string(&record)?;

        let mut connection = self.connection.clone();
        let created: bool = connection
            .hset_nx(&self.collection, record.id.to_string(), document)
            .await?;

        if !created {
            return Err(StoreError::DuplicateId(record.id));
        }

        Ok(record)
    }
}


#[cfg(test)]
mod tests {
    use schema::{FavoriteFeature, Improvement, Recommendation, Role};

    use super::testing::{MemoryStore, UnreachableStore};
    use super::*;

    fn submission() -> SurveySubmission {
        SurveySubmission {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            age: Some(34),
            role: Role::EightToTen,
            recommend: Recommendation::Definitely,
            favorite_feature: FavoriteFeature::TeamProjects,
            improvements: vec![Improvement::LongerWorkshops],
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_keeps_timestamp() {
        let store = MemoryStore::default();
        let submitted_at = Utc::now();

        let record = store.insert(submission(), submitted_at).await.unwrap();

        assert_eq!(record.submission, submission());
        assert_eq!(record.submitted_at, submitted_at);
        let documents = store.documents.lock().await;
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].0, record.id);
        assert_eq!(
            serde_json::from_str::<SurveyRecord>(&documents[0].1).unwrap(),
            record
        );
    }

    #[tokio::test]
    async fn test_identical_submissions_are_separate_documents() {
        let store = MemoryStore::default();

        let first = store.insert(submission(), Utc::now()).await.unwrap();
        let second = store.insert(submission(), Utc::now()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.documents.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_store_fails() {
        let error = UnreachableStore
            .insert(submission(), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(error, StoreError::Redis(_)));
    }

    // Needs a live server: REDIS_TEST_URL=redis://127.0.0.1:6379 cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_redis_store_writes_documents_into_collection_hash() {
        let Ok(redis_url) = std::env::var("REDIS_TEST_URL") else {
            return;
        };
        let collection = format!("surveys_test_{}", Uuid::new_v4());
        let connection = init_redis(&redis_url).await.unwrap();
        let store = RedisStore::new(connection.clone(), collection.clone());

        let first = store.insert(submission(), Utc::now()).await.unwrap();
        let second = store.insert(submission(), Utc::now()).await.unwrap();

        assert_ne!(first.id, second.id);

        let mut connection = connection;
        let count: usize = connection.hlen(&collection).await.unwrap();
        assert_eq!(count, 2);

        for record in [&first, &second] {
            let document: String = connection
                .hget(&collection, record.id.to_string())
                .await
                .unwrap();
            assert_eq!(
                serde_json::from_str::<SurveyRecord>(&document).unwrap(),
                *record
            );
        }

        let created: bool = connection
            .hset_nx(&collection, first.id.to_string(), "overwrite")
            .await
            .unwrap();
        assert!(!created);

        let _: () = connection.del(&collection).await.unwrap();
    }
}
