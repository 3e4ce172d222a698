use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use storage::DeleteAck;

use crate::errors::DaoError;
use crate::types::Follow;

/// Follow Data Access contract
///
/// Queries over directed follow edges. Each `(follower, followed)` pair exists
/// at most once, so creating an existing edge fails with a duplicate-key error.
#[async_trait]
pub trait FollowDaoTrait: Send + Sync {
    /// Every edge, in no particular order.
    async fn find_all_follows(&self) -> Result<Vec<Follow>, DaoError>;

    /// Creates the edge `follower -> followed` and returns it.
    async fn user_follows_user(
        &self,
        follower: &ObjectId,
        followed: &ObjectId,
    ) -> Result<Follow, DaoError>;

    /// Removes the edge `follower -> followed`; a missing edge is a zero-count success.
    async fn user_unfollows_user(
        &self,
        follower: &ObjectId,
        followed: &ObjectId,
    ) -> Result<DeleteAck, DaoError>;

    /// Edges pointing at `uid`: its followers.
    async fn find_all_users_following_user(&self, uid: &ObjectId)
        -> Result<Vec<Follow>, DaoError>;

    /// Edges leaving `uid`: who it follows.
    async fn find_all_users_followed_by_user(
        &self,
        uid: &ObjectId,
    ) -> Result<Vec<Follow>, DaoError>;

    async fn find_follow_by_users(
        &self,
        follower: &ObjectId,
        followed: &ObjectId,
    ) -> Result<Option<Follow>, DaoError>;
}
