//! Entity store: repository ports and their backends.

pub(crate) mod deadline;
pub mod memory;
pub mod ports;
pub mod postgres;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tracing::info;

pub use memory::MemoryStore;
pub use ports::movies::MOVIE_SORT_SAFELIST;
pub use ports::{
    MoviesRepository, PermissionsRepository, TokensRepository, UsersRepository,
};
pub use postgres::{
    PostgresMoviesRepository, PostgresPermissionsRepository,
    PostgresTokensRepository, PostgresUsersRepository,
};

/// Deadline applied to each PostgreSQL statement unless configured otherwise.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(3);

/// The four repositories a service works against, behind their ports.
#[derive(Clone)]
pub struct Store {
    movies: Arc<dyn MoviesRepository>,
    users: Arc<dyn UsersRepository>,
    tokens: Arc<dyn TokensRepository>,
    permissions: Arc<dyn PermissionsRepository>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("movies_ptr", &Arc::as_ptr(&self.movies))
            .field("users_ptr", &Arc::as_ptr(&self.users))
            .field("tokens_ptr", &Arc::as_ptr(&self.tokens))
            .field("permissions_ptr", &Arc::as_ptr(&self.permissions))
            .finish()
    }
}

impl Store {
    /// Compose PostgreSQL adapters over a caller-owned pool. Each statement
    /// fails with `StoreError::Timeout` once `deadline` elapses.
    pub fn postgres(pool: PgPool, deadline: Duration) -> Self {
        info!("Using PostgreSQL store with a {:?} statement deadline", deadline);
        Self {
            movies: Arc::new(PostgresMoviesRepository::new(pool.clone(), deadline)),
            users: Arc::new(PostgresUsersRepository::new(pool.clone(), deadline)),
            tokens: Arc::new(PostgresTokensRepository::new(pool.clone(), deadline)),
            permissions: Arc::new(PostgresPermissionsRepository::new(pool, deadline)),
        }
    }

    /// A fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        Self::from_memory(MemoryStore::new())
    }

    pub fn from_memory(memory: MemoryStore) -> Self {
        Self {
            movies: Arc::new(memory.clone()),
            users: Arc::new(memory.clone()),
            tokens: Arc::new(memory.clone()),
            permissions: Arc::new(memory),
        }
    }

    pub fn movies(&self) -> &dyn MoviesRepository {
        self.movies.as_ref()
    }

    pub fn users(&self) -> &dyn UsersRepository {
        self.users.as_ref()
    }

    pub fn tokens(&self) -> &dyn TokensRepository {
        self.tokens.as_ref()
    }

    pub fn permissions(&self) -> &dyn PermissionsRepository {
        self.permissions.as_ref()
    }
}
