//! Core data model definitions shared across Marquee crates.
#![allow(missing_docs)]

pub mod credential;
pub mod identity;
pub mod movie;
pub mod permissions;
pub mod runtime;
pub mod token;
pub mod user;

pub use credential::{CandidateCredential, StoredCredential};
pub use identity::Identity;
pub use movie::Movie;
pub use permissions::{Permissions, permission_codes};
pub use runtime::{Runtime, RuntimeFormatError};
pub use token::{Token, TokenDigest, TokenScope, UnknownTokenScope};
pub use user::User;
