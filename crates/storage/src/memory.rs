use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;

use crate::ack::{DeleteAck, UpdateAck};
use crate::db_provider::{DBProvider, UniqueIndex};
use crate::errors::DBError;

const ID_KEY: &str = "_id";

/// Collection kept in process memory.
///
/// Filters compare top-level fields for exact BSON equality, so `Int32(1)` does
/// not match `Int64(1)`. Clones share the same documents.
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    documents: Arc<RwLock<Vec<Document>>>,
    unique_indexes: Vec<UniqueIndex>,
}

impl InMemoryProvider {
    pub fn new(unique_indexes: Vec<UniqueIndex>) -> Self {
        // `_id` is always unique, as on a server
        let mut indexes = vec![UniqueIndex::new([ID_KEY])];
        indexes.extend(unique_indexes);
        Self { documents: Arc::new(RwLock::new(Vec::new())), unique_indexes: indexes }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    fn matches(document: &Document, query: &Document) -> bool {
        query.iter().all(|(key, value)| document.get(key) == Some(value))
    }

    /// Checks `candidate` against every other document; `skip` is the candidate's own slot.
    fn check_unique(
        &self,
        documents: &[Document],
        candidate: &Document,
        skip: Option<usize>,
    ) -> Result<(), DBError> {
        for index in &self.unique_indexes {
            let key = index.project(candidate);
            let conflict = documents
                .iter()
                .enumerate()
                .filter(|(position, _)| Some(*position) != skip)
                .any(|(_, existing)| index.project(existing) == key);
            if conflict {
                return Err(DBError::DuplicateKey(format!(
                    "index {:?} already holds {:?}",
                    index.keys(),
                    key
                )));
            }
        }
        Ok(())
    }
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl DBProvider for InMemoryProvider {
    async fn create(&self, item: &Document) -> Result<Bson, DBError> {
        let mut item = item.clone();
        let id = match item.get(ID_KEY) {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                item.insert(ID_KEY, id.clone());
                id
            }
        };

        let mut documents = self.documents.write().await;
        self.check_unique(&documents, &item, None)?;
        documents.push(item);
        debug!("Inserted document {}", id);
        Ok(id)
    }

    async fn read(&self, query: &Document) -> Result<Option<Document>, DBError> {
        let documents = self.documents.read().await;
        Ok(documents.iter().find(|document| Self::matches(document, query)).cloned())
    }

    async fn read_many(&self, query: &Document) -> Result<Vec<Document>, DBError> {
        let documents = self.documents.read().await;
        Ok(documents.iter().filter(|document| Self::matches(document, query)).cloned().collect())
    }

    async fn update(&self, query: &Document, update: &Document) -> Result<UpdateAck, DBError> {
        let mut documents = self.documents.write().await;
        let Some(position) = documents.iter().position(|document| Self::matches(document, query))
        else {
            return Ok(UpdateAck::default());
        };

        let mut updated = documents[position].clone();
        for (key, value) in update {
            updated.insert(key.clone(), value.clone());
        }
        if updated == documents[position] {
            return Ok(UpdateAck { matched_count: 1, modified_count: 0 });
        }

        self.check_unique(&documents, &updated, Some(position))?;
        documents[position] = updated;
        Ok(UpdateAck { matched_count: 1, modified_count: 1 })
    }

    async fn delete(&self, query: &Document) -> Result<DeleteAck, DBError> {
        let mut documents = self.documents.write().await;
        match documents.iter().position(|document| Self::matches(document, query)) {
            Some(position) => {
                documents.remove(position);
                Ok(DeleteAck { deleted_count: 1 })
            }
            None => Ok(DeleteAck::default()),
        }
    }

    async fn delete_many(&self, query: &Document) -> Result<DeleteAck, DBError> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|document| !Self::matches(document, query));
        Ok(DeleteAck { deleted_count: (before - documents.len()) as u64 })
    }
}
