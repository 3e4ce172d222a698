use async_trait::async_trait;
use mongodb::bson::{self, doc, Bson, Document};
use serde::{de::DeserializeOwned, Serialize};

use crate::ack::{DeleteAck, UpdateAck};
use crate::errors::DBError;

/// A document collection. Every method maps to exactly one query against it.
#[async_trait]
pub trait DBProvider: Send + Sync {
    /// Inserts `item` and returns its `_id`, generated when `item` carries none.
    async fn create(&self, item: &Document) -> Result<Bson, DBError>;
    async fn read(&self, query: &Document) -> Result<Option<Document>, DBError>;
    async fn read_many(&self, query: &Document) -> Result<Vec<Document>, DBError>;
    /// Sets the fields of `update` on the first document matching `query`.
    async fn update(&self, query: &Document, update: &Document) -> Result<UpdateAck, DBError>;
    async fn delete(&self, query: &Document) -> Result<DeleteAck, DBError>;
    async fn delete_many(&self, query: &Document) -> Result<DeleteAck, DBError>;
}

/// Keys whose combined values must be unique across a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueIndex {
    keys: Vec<String>,
}

impl UniqueIndex {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { keys: keys.into_iter().map(Into::into).collect() }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Ascending key specification, as expected by `createIndexes`.
    pub fn to_keys_document(&self) -> Document {
        let mut keys = doc! {};
        for key in &self.keys {
            keys.insert(key.clone(), 1);
        }
        keys
    }

    /// Values of the indexed keys in `document`, missing keys read as null.
    pub(crate) fn project(&self, document: &Document) -> Vec<Bson> {
        self.keys.iter().map(|key| document.get(key).cloned().unwrap_or(Bson::Null)).collect()
    }
}

pub fn to_document<T: Serialize>(item: &T) -> Result<Document, DBError> {
    let doc = bson::to_bson(item)?
        .as_document()
        .cloned()
        .ok_or_else(|| DBError::Other("Failed to convert item to BSON document".to_string()))?;
    Ok(doc)
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, DBError> {
    let item = bson::from_bson(Bson::Document(doc))?;
    Ok(item)
}
