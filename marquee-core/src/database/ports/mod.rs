//! Repository ports, one per aggregate.
//!
//! Adapters live in [`crate::database::postgres`] and
//! [`crate::database::memory`]. Every operation reports failures through
//! [`crate::error::StoreError`] and never retries internally.

pub mod movies;
pub mod permissions;
pub mod tokens;
pub mod users;

pub use movies::MoviesRepository;
pub use permissions::PermissionsRepository;
pub use tokens::TokensRepository;
pub use users::UsersRepository;
