//! `Authorizer` implementations.

pub mod allow_all;
pub mod json_file;

pub use allow_all::AllowAllAuthorizer;
pub use json_file::{JsonUserStore, UserStoreError};
