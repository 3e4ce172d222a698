use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use thiserror::Error;

use config::ConfigError;
use dao::{DaoError, User};
use storage::DBError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to load config: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] DBError),

    #[error(transparent)]
    Dao(#[from] DaoError),

    #[error("Invalid user id {0}: {1}")]
    InvalidId(String, mongodb::bson::oid::Error),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

pub fn parse_object_id(raw: &str) -> Result<ObjectId, CliError> {
    ObjectId::parse_str(raw).map_err(|e| CliError::InvalidId(raw.to_string(), e))
}

pub fn render_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

// User as printed by the CLI, the password stays in the database
#[derive(Serialize, Debug)]
pub struct UserView<'a> {
    #[serde(rename = "_id")]
    pub id: &'a ObjectId,
    pub username: &'a str,
    pub salary: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography: Option<&'a str>,
}

impl<'a> From<&'a User> for UserView<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: &user.id,
            username: &user.username,
            salary: user.salary,
            first_name: user.first_name.as_deref(),
            last_name: user.last_name.as_deref(),
            email: user.email.as_deref(),
            biography: user.biography.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn test_parse_object_id_rejects_garbage() {
        match parse_object_id("alice") {
            Err(CliError::InvalidId(raw, _)) => assert_eq!(raw, "alice"),
            other => panic!("expected invalid id, got {:?}", other),
        }
    }

    #[test]
    fn test_user_view_hides_password() {
        let user = User {
            id: ObjectId::new(),
            username: "alice".to_string(),
            password: "p1".to_string(),
            salary: 1000.0,
            first_name: None,
            last_name: Some("Liddell".to_string()),
            email: None,
            biography: None,
        };

        let rendered = render_json(&UserView::from(&user)).unwrap();
        assert!(!rendered.contains("password"));
        assert!(!rendered.contains("p1"));
        assert!(!rendered.contains("first_name"));
        assert!(rendered.contains("Liddell"));
    }
}
