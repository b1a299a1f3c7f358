pub mod auth;

pub use auth::{Session, SessionAuth};
