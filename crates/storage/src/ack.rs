use derive_more::Display;
use mongodb::results::{DeleteResult, UpdateResult};
use serde::Serialize;

/// Outcome of an update-one call. A filter that matched nothing is still a success.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[display("UpdateAck {{ matched_count: {}, modified_count: {} }}", matched_count, modified_count)]
pub struct UpdateAck {
    pub matched_count: u64,
    pub modified_count: u64,
}

impl From<UpdateResult> for UpdateAck {
    fn from(result: UpdateResult) -> Self {
        Self { matched_count: result.matched_count, modified_count: result.modified_count }
    }
}

/// Outcome of a delete-one or delete-many call.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[display("DeleteAck {{ deleted_count: {} }}", deleted_count)]
pub struct DeleteAck {
    pub deleted_count: u64,
}

impl From<DeleteResult> for DeleteAck {
    fn from(result: DeleteResult) -> Self {
        Self { deleted_count: result.deleted_count }
    }
}
