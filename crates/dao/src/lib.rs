pub use errors::DaoError;
pub use follow_dao::{follow_indexes, FollowDao};
pub use follow_dao_trait::FollowDaoTrait;
pub use types::{Follow, NewUser, User, UserUpdate};
pub use user_dao::{user_indexes, UserDao};

pub mod errors;
pub mod follow_dao;
pub mod follow_dao_trait;
pub mod types;
pub mod user_dao;
