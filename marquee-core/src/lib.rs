//! # Marquee Core
//!
//! Persistence and identity layer for the Marquee catalogue service.
//!
//! ## Overview
//!
//! - **Entity store**: movies and users with optimistic concurrency on a
//!   per-row `version`, plus tokens and permission grants. See [`database`].
//! - **Filter / pagination resolver**: untrusted sort and paging parameters
//!   become a safelisted ORDER BY, a limit and an offset. See [`query`].
//! - **Credential codec**: Argon2id password hashing and opaque bearer tokens
//!   stored only as SHA-256 digests. See [`auth`].
//! - **Validation**: field-tagged, collecting input checks. See [`validation`].
//!
//! The store never builds its own connection pool. The surrounding service
//! owns the [`sqlx::PgPool`] and hands it to [`database::Store::postgres`].
//!
//! ## Feature Flags
//!
//! - `postgres-tests`: compiles the PostgreSQL integration suite (needs
//!   `DATABASE_URL`).

#![allow(missing_docs)]

pub mod auth;
pub mod database;
pub mod error;
pub mod query;
pub mod validation;

pub use marquee_model as model;

pub use database::{DEFAULT_DEADLINE, Store};
pub use error::{Result, StoreError};

/// Schema migrations for the PostgreSQL backend.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
