use async_trait::async_trait;
use derive_more::Display;
use futures::TryStreamExt;
use log::debug;
use mongodb::{
    bson::{doc, Bson, Document},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Client, Collection,
};

use crate::ack::{DeleteAck, UpdateAck};
use crate::db_provider::{DBProvider, UniqueIndex};
use crate::errors::DBError;

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Display, Clone)]
#[display(
    "MongoDBClient {{ client: {:?}, db_name: {}, collection_name: {} }}",
    client,
    db_name,
    collection_name
)]
pub struct MongoDBClient {
    pub client: Client,
    db_name: String,
    collection_name: String,
}

impl MongoDBClient {
    pub async fn new(
        mongodb_uri: &str,
        db_name: String,
        collection_name: String,
        unique_indexes: &[UniqueIndex],
    ) -> Result<Self, DBError> {
        let client = Client::with_uri_str(mongodb_uri).await?;
        Self::from_client(client, db_name, collection_name, unique_indexes).await
    }

    /// Binds an existing client (and its connection pool) to another collection.
    pub async fn from_client(
        client: Client,
        db_name: String,
        collection_name: String,
        unique_indexes: &[UniqueIndex],
    ) -> Result<Self, DBError> {
        let provider = Self { client, db_name, collection_name };
        for index in unique_indexes {
            provider.create_index(index).await?;
        }
        Ok(provider)
    }

    pub fn get_collection(&self) -> Collection<Document> {
        self.client.database(&self.db_name).collection(&self.collection_name)
    }

    async fn create_index(&self, index: &UniqueIndex) -> Result<(), DBError> {
        debug!("Creating unique index {:?} on {}", index.keys(), self.collection_name);
        let collection = self.get_collection();
        let model = mongodb::IndexModel::builder()
            .keys(index.to_keys_document())
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection.create_index(model, None).await?;
        Ok(())
    }
}

fn classify_write_error(err: mongodb::error::Error) -> DBError {
    if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = err.kind.as_ref() {
        if write_error.code == DUPLICATE_KEY_CODE {
            return DBError::DuplicateKey(write_error.message.clone());
        }
    }
    DBError::Mongo(err)
}

#[async_trait]
impl DBProvider for MongoDBClient {
    async fn create(&self, item: &Document) -> Result<Bson, DBError> {
        let collection = self.get_collection();
        let result = collection.insert_one(item.clone(), None).await.map_err(classify_write_error)?;
        Ok(result.inserted_id)
    }

    async fn read(&self, query: &Document) -> Result<Option<Document>, DBError> {
        let collection = self.get_collection();
        let result = collection.find_one(query.clone(), None).await?;
        Ok(result)
    }

    async fn read_many(&self, query: &Document) -> Result<Vec<Document>, DBError> {
        let collection = self.get_collection();
        let cursor = collection.find(query.clone(), None).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn update(&self, query: &Document, update: &Document) -> Result<UpdateAck, DBError> {
        let collection = self.get_collection();
        let update_doc = doc! { "$set": update.clone() };
        let result = collection
            .update_one(query.clone(), update_doc, None)
            .await
            .map_err(classify_write_error)?;
        Ok(result.into())
    }

    async fn delete(&self, query: &Document) -> Result<DeleteAck, DBError> {
        let collection = self.get_collection();
        let result = collection.delete_one(query.clone(), None).await?;
        Ok(result.into())
    }

    async fn delete_many(&self, query: &Document) -> Result<DeleteAck, DBError> {
        let collection = self.get_collection();
        let result = collection.delete_many(query.clone(), None).await?;
        Ok(result.into())
    }
}

// The `#[ignore]`d tests talk to a live server and only run with `--ignored`.
#[cfg(test)]
mod tests {
    use mongodb::error::{ErrorKind, WriteError, WriteFailure};
    use mongodb::{bson::doc, Client};
    use serde::{Deserialize, Serialize};
    use serial_test::serial;
    use tokio;
    use uuid::Uuid;

    use crate::mongodb_client::{classify_write_error, MongoDBClient};
    use crate::{from_document, to_document, DBError, DBProvider, UniqueIndex};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct TestUser {
        user_id: String,
        name: String,
    }

    // Global test configuration constants
    const DB_URI: &str = "mongodb://localhost:27017";
    const DB_NAME: &str = "chirp_storage_test";
    const COLLECTION_NAME: &str = "test_collection";

    // Helper function to setup the MongoDBClient
    async fn setup_db_provider() -> Result<MongoDBClient, DBError> {
        let db_provider = MongoDBClient::new(
            DB_URI,
            DB_NAME.to_string(),
            COLLECTION_NAME.to_string(),
            &[UniqueIndex::new(["user_id"])],
        )
        .await?;
        Ok(db_provider)
    }

    async fn teardown() -> Result<(), DBError> {
        let client = Client::with_uri_str(DB_URI).await?;
        client.database(DB_NAME).drop(None).await?;
        Ok(())
    }

    // Shaped like the write error a server reports
    fn write_error(code: i32, message: &str) -> mongodb::error::Error {
        let write_error: WriteError =
            mongodb::bson::from_document(doc! { "code": code, "errmsg": message }).unwrap();
        ErrorKind::Write(WriteFailure::WriteError(write_error)).into()
    }

    #[test]
    fn test_duplicate_key_write_error() {
        let err = write_error(11000, "E11000 duplicate key error collection: chirp.users");
        match classify_write_error(err) {
            DBError::DuplicateKey(message) => assert!(message.starts_with("E11000")),
            other => panic!("expected duplicate key error, got {:?}", other),
        }
    }

    #[test]
    fn test_other_write_errors_pass_through() {
        let err = write_error(121, "Document failed validation");
        assert!(matches!(classify_write_error(err), DBError::Mongo(_)));
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires MongoDB on localhost:27017"]
    async fn test_create_and_read() -> Result<(), DBError> {
        let db_provider = setup_db_provider().await?;

        let user = TestUser { user_id: Uuid::new_v4().to_string(), name: "Alice".to_string() };

        let inserted_id = db_provider.create(&to_document(&user)?).await?;
        assert!(inserted_id.as_object_id().is_some());

        let query = doc! { "user_id": &user.user_id };
        let result = db_provider.read(&query).await?;
        let read_user: TestUser = from_document(result.unwrap())?;
        assert_eq!(read_user, user);

        teardown().await
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires MongoDB on localhost:27017"]
    async fn test_unique_user_id() -> Result<(), DBError> {
        let db_provider = setup_db_provider().await?;

        let user_id = Uuid::new_v4().to_string();
        let user1 = TestUser { user_id: user_id.clone(), name: "Alice".to_string() };
        let user2 = TestUser { user_id: user_id.clone(), name: "Bob".to_string() };

        db_provider.create(&to_document(&user1)?).await?;
        let result = db_provider.create(&to_document(&user2)?).await;
        assert!(matches!(result, Err(DBError::DuplicateKey(_))));

        teardown().await
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires MongoDB on localhost:27017"]
    async fn test_update_and_delete() -> Result<(), DBError> {
        let db_provider = setup_db_provider().await?;

        let user = TestUser { user_id: Uuid::new_v4().to_string(), name: "Alice".to_string() };
        db_provider.create(&to_document(&user)?).await?;

        let query = doc! { "user_id": &user.user_id };
        let ack = db_provider.update(&query, &doc! { "name": "Bob" }).await?;
        assert_eq!(ack.matched_count, 1);
        assert_eq!(ack.modified_count, 1);

        let read_user: TestUser = from_document(db_provider.read(&query).await?.unwrap())?;
        assert_eq!(read_user.name, "Bob");

        let ack = db_provider.delete(&query).await?;
        assert_eq!(ack.deleted_count, 1);
        assert_eq!(db_provider.read(&query).await?, None);

        let ack = db_provider.delete(&query).await?;
        assert_eq!(ack.deleted_count, 0);

        teardown().await
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires MongoDB on localhost:27017"]
    async fn test_read_many_and_delete_many() -> Result<(), DBError> {
        let db_provider = setup_db_provider().await?;

        for name in ["Alice", "Bob", "Carol"] {
            let user = TestUser { user_id: Uuid::new_v4().to_string(), name: name.to_string() };
            db_provider.create(&to_document(&user)?).await?;
        }

        assert_eq!(db_provider.read_many(&doc! {}).await?.len(), 3);
        assert_eq!(db_provider.read_many(&doc! { "name": "Bob" }).await?.len(), 1);

        let ack = db_provider.delete_many(&doc! {}).await?;
        assert_eq!(ack.deleted_count, 3);
        assert!(db_provider.read_many(&doc! {}).await?.is_empty());

        teardown().await
    }
}
