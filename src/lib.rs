pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod portal;
pub mod probe;
pub mod resources;
pub mod store;
pub mod transport;
pub mod types;

pub use error::ClientError;
pub use portal::Portal;
pub use types::{IdentityClaim, Role, Session, UserId};
