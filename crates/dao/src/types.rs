use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::errors::DaoError;

// User DB Model
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    /// Stored as given. Credential lookups compare it verbatim.
    pub password: String,
    pub salary: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

// Create User Payload (same as User, without the generated id)
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub salary: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>, salary: f64) -> Self {
        Self { username: username.into(), password: password.into(), salary, ..Default::default() }
    }

    pub(crate) fn validate(&self) -> Result<(), DaoError> {
        if self.username.is_empty() {
            return Err(DaoError::InvalidUser("username is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(DaoError::InvalidUser("password is required".to_string()));
        }
        validate_salary(self.salary)
    }

    pub(crate) fn into_user(self, id: ObjectId) -> User {
        User {
            id,
            username: self.username,
            password: self.password,
            salary: self.salary,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            biography: self.biography,
        }
    }
}

/// Partial field set for a user. Unset fields are left untouched.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fields that are set must pass the same checks as on creation.
    pub(crate) fn validate(&self) -> Result<(), DaoError> {
        if self.username.as_deref() == Some("") {
            return Err(DaoError::InvalidUser("username cannot be empty".to_string()));
        }
        if self.password.as_deref() == Some("") {
            return Err(DaoError::InvalidUser("password cannot be empty".to_string()));
        }
        match self.salary {
            Some(salary) => validate_salary(salary),
            None => Ok(()),
        }
    }
}

pub(crate) fn validate_salary(salary: f64) -> Result<(), DaoError> {
    if !salary.is_finite() {
        return Err(DaoError::InvalidUser(format!("salary {} is not a number", salary)));
    }
    Ok(())
}

// Follow DB Model, a directed edge from `follower` to `followed`
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Follow {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub follower: ObjectId,
    pub followed: ObjectId,
}

// Query Models
#[derive(Serialize, Debug)]
pub(crate) struct UserIdQuery {
    #[serde(rename = "_id")]
    pub id: ObjectId,
}

#[derive(Serialize, Debug)]
pub(crate) struct UsernameQuery<'a> {
    pub username: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct CredentialsQuery<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct SalaryUpdate {
    pub salary: f64,
}

// Also the insert payload for a new edge
#[derive(Serialize, Debug)]
pub(crate) struct FollowEdgeQuery {
    pub follower: ObjectId,
    pub followed: ObjectId,
}

#[derive(Serialize, Debug)]
pub(crate) struct FollowerQuery {
    pub follower: ObjectId,
}

#[derive(Serialize, Debug)]
pub(crate) struct FollowedQuery {
    pub followed: ObjectId,
}
