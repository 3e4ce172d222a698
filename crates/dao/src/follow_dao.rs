use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use mongodb::bson::{doc, oid::ObjectId, Document};

use storage::{from_document, to_document, DBProvider, DeleteAck, UniqueIndex};

use crate::errors::DaoError;
use crate::follow_dao_trait::FollowDaoTrait;
use crate::types::{Follow, FollowEdgeQuery, FollowedQuery, FollowerQuery};

/// Indexes the follows collection needs: one edge per ordered pair.
pub fn follow_indexes() -> Vec<UniqueIndex> {
    vec![UniqueIndex::new(["follower", "followed"])]
}

/// [`FollowDaoTrait`] over any document collection.
#[derive(Debug)]
pub struct FollowDao<P: DBProvider> {
    provider: Arc<P>,
}

impl<P: DBProvider> Clone for FollowDao<P> {
    fn clone(&self) -> Self {
        Self { provider: Arc::clone(&self.provider) }
    }
}

impl<P: DBProvider> FollowDao<P> {
    pub fn new(provider: P) -> Self {
        Self { provider: Arc::new(provider) }
    }

    async fn read_many(&self, query: &Document) -> Result<Vec<Follow>, DaoError> {
        let documents = self.provider.read_many(query).await?;
        let follows = documents
            .into_iter()
            .map(from_document)
            .collect::<Result<Vec<Follow>, _>>()?;
        Ok(follows)
    }
}

#[async_trait]
impl<P: DBProvider> FollowDaoTrait for FollowDao<P> {
    async fn find_all_follows(&self) -> Result<Vec<Follow>, DaoError> {
        self.read_many(&doc! {}).await
    }

    async fn user_follows_user(
        &self,
        follower: &ObjectId,
        followed: &ObjectId,
    ) -> Result<Follow, DaoError> {
        let edge = to_document(&FollowEdgeQuery { follower: *follower, followed: *followed })?;
        let inserted_id = self.provider.create(&edge).await?;
        let id = inserted_id
            .as_object_id()
            .ok_or_else(|| DaoError::UnexpectedId(inserted_id.clone()))?;

        info!("User {} now follows {}", follower, followed);
        Ok(Follow { id, follower: *follower, followed: *followed })
    }

    async fn user_unfollows_user(
        &self,
        follower: &ObjectId,
        followed: &ObjectId,
    ) -> Result<DeleteAck, DaoError> {
        let edge = to_document(&FollowEdgeQuery { follower: *follower, followed: *followed })?;
        let ack = self.provider.delete(&edge).await?;
        debug!("User {} unfollowed {}: {}", follower, followed, ack);
        Ok(ack)
    }

    async fn find_all_users_following_user(
        &self,
        uid: &ObjectId,
    ) -> Result<Vec<Follow>, DaoError> {
        let query = to_document(&FollowedQuery { followed: *uid })?;
        self.read_many(&query).await
    }

    async fn find_all_users_followed_by_user(
        &self,
        uid: &ObjectId,
    ) -> Result<Vec<Follow>, DaoError> {
        let query = to_document(&FollowerQuery { follower: *uid })?;
        self.read_many(&query).await
    }

    async fn find_follow_by_users(
        &self,
        follower: &ObjectId,
        followed: &ObjectId,
    ) -> Result<Option<Follow>, DaoError> {
        let query = to_document(&FollowEdgeQuery { follower: *follower, followed: *followed })?;
        match self.provider.read(&query).await? {
            Some(document) => Ok(Some(from_document(document)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::oid::ObjectId;
    use storage::{DBError, InMemoryProvider};
    use tokio;

    use super::{follow_indexes, FollowDao};
    use crate::errors::DaoError;
    use crate::follow_dao_trait::FollowDaoTrait;

    fn setup_follow_dao() -> FollowDao<InMemoryProvider> {
        FollowDao::new(InMemoryProvider::new(follow_indexes()))
    }

    #[tokio::test]
    async fn test_follow_and_find() -> Result<(), DaoError> {
        let follow_dao = setup_follow_dao();
        let (alice, bob) = (ObjectId::new(), ObjectId::new());

        let follow = follow_dao.user_follows_user(&alice, &bob).await?;
        assert_eq!(follow.follower, alice);
        assert_eq!(follow.followed, bob);

        assert_eq!(follow_dao.find_follow_by_users(&alice, &bob).await?, Some(follow));
        // Edges are directional
        assert_eq!(follow_dao.find_follow_by_users(&bob, &alice).await?, None);
        assert_eq!(follow_dao.find_all_follows().await?, vec![follow]);

        Ok(())
    }

    #[tokio::test]
    async fn test_followers_and_followees() -> Result<(), DaoError> {
        let follow_dao = setup_follow_dao();
        let (alice, bob, carol) = (ObjectId::new(), ObjectId::new(), ObjectId::new());

        follow_dao.user_follows_user(&alice, &bob).await?;
        follow_dao.user_follows_user(&carol, &bob).await?;
        follow_dao.user_follows_user(&bob, &alice).await?;

        let followers_of_bob = follow_dao.find_all_users_following_user(&bob).await?;
        let mut followers: Vec<ObjectId> = followers_of_bob.iter().map(|f| f.follower).collect();
        followers.sort();
        let mut expected = vec![alice, carol];
        expected.sort();
        assert_eq!(followers, expected);
        assert!(followers_of_bob.iter().all(|f| f.followed == bob));

        let followed_by_bob = follow_dao.find_all_users_followed_by_user(&bob).await?;
        assert_eq!(followed_by_bob.len(), 1);
        assert_eq!(followed_by_bob[0].followed, alice);

        assert_eq!(follow_dao.find_all_users_followed_by_user(&carol).await?.len(), 1);
        assert!(follow_dao.find_all_users_following_user(&carol).await?.is_empty());
        assert_eq!(follow_dao.find_all_follows().await?.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_follow_is_rejected() -> Result<(), DaoError> {
        let follow_dao = setup_follow_dao();
        let (alice, bob) = (ObjectId::new(), ObjectId::new());

        follow_dao.user_follows_user(&alice, &bob).await?;
        let result = follow_dao.user_follows_user(&alice, &bob).await;
        assert!(matches!(result, Err(DaoError::Storage(DBError::DuplicateKey(_)))));

        // The reverse edge is a different pair
        follow_dao.user_follows_user(&bob, &alice).await?;
        assert_eq!(follow_dao.find_all_follows().await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_unfollow() -> Result<(), DaoError> {
        let follow_dao = setup_follow_dao();
        let (alice, bob) = (ObjectId::new(), ObjectId::new());

        follow_dao.user_follows_user(&alice, &bob).await?;
        follow_dao.user_follows_user(&bob, &alice).await?;

        let ack = follow_dao.user_unfollows_user(&alice, &bob).await?;
        assert_eq!(ack.deleted_count, 1);
        assert_eq!(follow_dao.find_follow_by_users(&alice, &bob).await?, None);
        assert!(follow_dao.find_follow_by_users(&bob, &alice).await?.is_some());

        let ack = follow_dao.user_unfollows_user(&alice, &bob).await?;
        assert_eq!(ack.deleted_count, 0);

        // Following again after an unfollow is allowed
        follow_dao.user_follows_user(&alice, &bob).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_works_through_trait_object() -> Result<(), DaoError> {
        let follow_dao: Box<dyn FollowDaoTrait> = Box::new(setup_follow_dao());
        let (alice, bob) = (ObjectId::new(), ObjectId::new());

        follow_dao.user_follows_user(&alice, &bob).await?;
        assert_eq!(follow_dao.find_all_users_following_user(&bob).await?.len(), 1);

        Ok(())
    }
}
