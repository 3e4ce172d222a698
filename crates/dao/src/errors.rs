use mongodb::bson::Bson;
use storage::DBError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaoError {
    #[error(transparent)]
    Storage(#[from] DBError),

    #[error("Invalid user: {0}")]
    InvalidUser(String),

    #[error("Update carries no fields")]
    EmptyUpdate,

    #[error("Expected an ObjectId for the inserted record, got {0}")]
    UnexpectedId(Bson),
}
