use derive_more::{Display, From};
use serde::Deserialize;
use serde_valid::yaml::FromYamlStr;
use serde_valid::Validate;

/// Environment variable that replaces `infra.mongo_url` when set.
pub const MONGO_URL_ENV: &str = "CHIRP_MONGO_URL";

// Config Type
#[derive(Debug, Clone)]
pub struct Config {
    // Infra Dependencies
    pub infra: InfraConfig,
    // Database and collection layout
    pub database: DatabaseConfig,
}

impl Config {
    pub fn from_file(file_path: &str) -> Result<Self, ConfigError> {
        let config_file_content = std::fs::read_to_string(file_path)?;
        Self::from_yaml_str(&config_file_content)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let raw_config = RawConfig::from_yaml_str(s)?;

        // Both DAOs would write into the same collection otherwise
        if raw_config.database.users_collection == raw_config.database.follows_collection {
            return Err(ConfigError::DuplicateCollection(
                raw_config.database.users_collection.clone(),
            ));
        }

        Ok(Config { infra: raw_config.infra, database: raw_config.database })
    }

    /// Applies overrides taken from the process environment.
    ///
    /// Overridden values go through the same validation as the file.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(mongo_url) = std::env::var(MONGO_URL_ENV) {
            if !mongo_url.is_empty() {
                self.infra.mongo_url = mongo_url;
                self.infra.validate().map_err(ConfigError::InvalidOverride)?;
            }
        }
        Ok(self)
    }
}

#[derive(Debug, From, Display)]
pub enum ConfigError {
    #[display("Users and follows share the collection: {}", _0)]
    #[from(ignore)]
    DuplicateCollection(String),

    #[display("Invalid {} override: {}", MONGO_URL_ENV, _0)]
    #[from(ignore)]
    InvalidOverride(serde_valid::validation::Errors),

    #[display("Serde Error: {}", _0)]
    SerdeError(serde_valid::Error<serde_yaml::Error>),

    #[display("Error Reading Config File: {}", _0)]
    IoError(std::io::Error),
}

impl std::error::Error for ConfigError {}

// Intermediate Config Type as Deserialization Target
#[derive(Debug, Deserialize, Validate)]
pub struct RawConfig {
    #[validate]
    pub infra: InfraConfig,
    #[validate]
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct InfraConfig {
    // The URL of the MongoDB
    #[validate(pattern = r"^mongodb(\+srv)?://[-a-zA-Z0-9@:%._\+~#=/?&,]{1,256}$")]
    pub mongo_url: String,
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct DatabaseConfig {
    // The database holding both collections
    #[validate(min_length = 1)]
    pub name: String,
    // Collection backing the user DAO
    #[validate(min_length = 1)]
    pub users_collection: String,
    // Collection backing the follow DAO
    #[validate(min_length = 1)]
    pub follows_collection: String,
}

pub fn get_sample_config() -> Config {
    Config::from_file("../../config.yaml.example").unwrap()
}
