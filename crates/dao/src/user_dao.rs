use std::sync::Arc;

use log::{debug, info};
use mongodb::bson::{doc, oid::ObjectId, Document};

use storage::{from_document, to_document, DBProvider, DeleteAck, UniqueIndex, UpdateAck};

use crate::errors::DaoError;
use crate::types::{
    validate_salary, CredentialsQuery, NewUser, SalaryUpdate, User, UserIdQuery, UserUpdate,
    UsernameQuery,
};

/// Indexes the users collection needs: usernames are unique.
pub fn user_indexes() -> Vec<UniqueIndex> {
    vec![UniqueIndex::new(["username"])]
}

/// User Data Access Object
///
/// Each method issues exactly one query against the users collection. Lookups
/// that miss return `None`, and mutations that miss return a zero-count
/// acknowledgment. Only driver failures come back as errors.
///
/// Build one at startup and clone it into whatever needs it; clones share the
/// same provider.
#[derive(Debug)]
pub struct UserDao<P: DBProvider> {
    provider: Arc<P>,
}

impl<P: DBProvider> Clone for UserDao<P> {
    fn clone(&self) -> Self {
        Self { provider: Arc::clone(&self.provider) }
    }
}

impl<P: DBProvider> UserDao<P> {
    pub fn new(provider: P) -> Self {
        Self { provider: Arc::new(provider) }
    }

    async fn read_one(&self, query: &Document) -> Result<Option<User>, DaoError> {
        match self.provider.read(query).await? {
            Some(document) => Ok(Some(from_document(document)?)),
            None => Ok(None),
        }
    }

    /// All users, in no particular order.
    pub async fn find_all_users(&self) -> Result<Vec<User>, DaoError> {
        let documents = self.provider.read_many(&doc! {}).await?;
        let users = documents
            .into_iter()
            .map(from_document)
            .collect::<Result<Vec<User>, _>>()?;
        debug!("Found {} users", users.len());
        Ok(users)
    }

    pub async fn find_user_by_id(&self, id: &ObjectId) -> Result<Option<User>, DaoError> {
        let query = to_document(&UserIdQuery { id: *id })?;
        self.read_one(&query).await
    }

    /// Inserts `user` and returns it along with its generated id.
    pub async fn create_user(&self, user: NewUser) -> Result<User, DaoError> {
        user.validate()?;

        let document = to_document(&user)?;
        let inserted_id = self.provider.create(&document).await?;
        let id = inserted_id
            .as_object_id()
            .ok_or_else(|| DaoError::UnexpectedId(inserted_id.clone()))?;

        info!("Created user {} with id {}", user.username, id);
        Ok(user.into_user(id))
    }

    /// Sets the fields present in `update` on the user with `id`.
    pub async fn update_user(
        &self,
        id: &ObjectId,
        update: UserUpdate,
    ) -> Result<UpdateAck, DaoError> {
        if update.is_empty() {
            return Err(DaoError::EmptyUpdate);
        }
        update.validate()?;

        let query = to_document(&UserIdQuery { id: *id })?;
        let ack = self.provider.update(&query, &to_document(&update)?).await?;
        debug!("Updated user {}: {}", id, ack);
        Ok(ack)
    }

    pub async fn update_user_salary_by_username(
        &self,
        username: &str,
        salary: f64,
    ) -> Result<UpdateAck, DaoError> {
        validate_salary(salary)?;

        let query = to_document(&UsernameQuery { username })?;
        let update = to_document(&SalaryUpdate { salary })?;
        let ack = self.provider.update(&query, &update).await?;
        debug!("Updated salary of {}: {}", username, ack);
        Ok(ack)
    }

    pub async fn delete_user(&self, id: &ObjectId) -> Result<DeleteAck, DaoError> {
        let query = to_document(&UserIdQuery { id: *id })?;
        let ack = self.provider.delete(&query).await?;
        debug!("Deleted user {}: {}", id, ack);
        Ok(ack)
    }

    /// Empties the users collection. Meant for tests and resets.
    pub async fn delete_all_users(&self) -> Result<DeleteAck, DaoError> {
        let ack = self.provider.delete_many(&doc! {}).await?;
        info!("Deleted all users: {}", ack);
        Ok(ack)
    }

    /// Exact match on both username and password.
    ///
    /// The password is compared as stored, in plaintext.
    pub async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DaoError> {
        let query = to_document(&CredentialsQuery { username, password })?;
        self.read_one(&query).await
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DaoError> {
        let query = to_document(&UsernameQuery { username })?;
        self.read_one(&query).await
    }
}
