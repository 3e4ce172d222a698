pub use ack::{DeleteAck, UpdateAck};
pub use db_provider::{from_document, to_document, DBProvider, UniqueIndex};
pub use errors::DBError;
pub use memory::InMemoryProvider;
pub use mongodb_client::MongoDBClient;

pub mod ack;
pub mod db_provider;
pub mod errors;
pub mod memory;
pub mod mongodb_client;
