//! PostgreSQL adapters for the repository ports.
//!
//! Queries are built at runtime (`sqlx::query*`) so the crate compiles
//! without a live database. Every call runs under the adapter's deadline.

pub mod movies;
pub mod permissions;
pub mod tokens;
pub mod users;

pub use movies::PostgresMoviesRepository;
pub use permissions::PostgresPermissionsRepository;
pub use tokens::PostgresTokensRepository;
pub use users::PostgresUsersRepository;
