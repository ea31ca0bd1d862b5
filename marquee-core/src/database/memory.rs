//! In-process backend.
//!
//! Implements every repository port with the semantics of the PostgreSQL
//! adapters: compare-and-set on `version`, case-insensitive unique e-mail,
//! token lookup by digest + scope + unexpired, idempotent grants. All tables
//! sit behind one mutex, which plays the role of the database's row-level
//! atomicity.
//!
//! Title ordering compares lowercased text. That approximates a database
//! collation but is not locale-aware, so mixed-script titles can order
//! differently than they would in PostgreSQL.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use marquee_model::{
    Movie, Permissions, Token, TokenDigest, TokenScope, User, permission_codes,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::auth::hash_token;
use crate::database::ports::users::assert_password_set;
use crate::database::ports::{
    MoviesRepository, PermissionsRepository, TokensRepository, UsersRepository,
};
use crate::error::{Result, StoreError, USERS_EMAIL_CONSTRAINT};
use crate::query::{Metadata, Page, SortOrder, ValidatedFilters};

const TOKENS_PRIMARY_KEY: &str = "tokens_pkey";

#[derive(Debug, Clone)]
struct TokenRecord {
    hash: TokenDigest,
    user_id: i64,
    expiry: DateTime<Utc>,
    scope: TokenScope,
}

#[derive(Debug)]
struct Tables {
    next_movie_id: i64,
    movies: BTreeMap<i64, Movie>,
    next_user_id: i64,
    users: BTreeMap<i64, User>,
    tokens: Vec<TokenRecord>,
    /// `(id, code)`, seeded with the well-known codes.
    permissions: Vec<(i64, String)>,
    /// `(user_id, permission_id)`
    grants: BTreeSet<(i64, i64)>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            next_movie_id: 1,
            movies: BTreeMap::new(),
            next_user_id: 1,
            users: BTreeMap::new(),
            tokens: Vec::new(),
            permissions: (1..)
                .zip(permission_codes::ALL.iter().map(|code| code.to_string()))
                .collect(),
            grants: BTreeSet::new(),
        }
    }
}

impl Tables {
    fn email_taken(&self, email: &str, except_id: i64) -> bool {
        let email = email.to_lowercase();
        self.users
            .values()
            .any(|user| user.id != except_id && user.email.to_lowercase() == email)
    }
}

/// Shared handle to one set of in-memory tables. Clones see the same data.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn title_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn title_matches(title: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let wanted = title_words(query);
    if wanted.is_empty() {
        return false;
    }
    let have = title_words(title);
    wanted.iter().all(|word| have.contains(word))
}

fn compare_column(column: &str, a: &Movie, b: &Movie) -> Ordering {
    match column {
        "id" => a.id.cmp(&b.id),
        "title" => a
            .title
            .to_lowercase()
            .cmp(&b.title.to_lowercase()),
        "year" => a.year.cmp(&b.year),
        "runtime" => a.runtime.cmp(&b.runtime),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl MoviesRepository for MemoryStore {
    async fn insert_movie(&self, movie: &mut Movie) -> Result<()> {
        let mut tables = self.tables.lock();

        movie.id = tables.next_movie_id;
        movie.created_at = Utc::now();
        movie.version = 1;
        tables.next_movie_id += 1;
        tables.movies.insert(movie.id, movie.clone());

        info!("Created movie {} (version {})", movie.id, movie.version);
        Ok(())
    }

    async fn get_movie(&self, id: i64) -> Result<Movie> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }
        self.tables
            .lock()
            .movies
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_movie(&self, movie: &mut Movie) -> Result<()> {
        let mut tables = self.tables.lock();

        let Some(stored) = tables
            .movies
            .get_mut(&movie.id)
            .filter(|stored| stored.version == movie.version)
        else {
            warn!(
                "Edit conflict on movie {} at version {}",
                movie.id, movie.version
            );
            return Err(StoreError::EditConflict);
        };

        stored.title = movie.title.clone();
        stored.year = movie.year;
        stored.runtime = movie.runtime;
        stored.genres = movie.genres.clone();
        stored.version += 1;
        movie.version = stored.version;

        info!("Updated movie {} (version {})", movie.id, movie.version);
        Ok(())
    }

    async fn delete_movie(&self, id: i64) -> Result<()> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }
        if self.tables.lock().movies.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }

        info!("Deleted movie {id}");
        Ok(())
    }

    async fn list_movies(
        &self,
        title: &str,
        genres: &[String],
        filters: &ValidatedFilters,
    ) -> Result<Page<Movie>> {
        let mut matched: Vec<Movie> = {
            let tables = self.tables.lock();
            tables
                .movies
                .values()
                .filter(|movie| title_matches(&movie.title, title))
                .filter(|movie| genres.iter().all(|genre| movie.genres.contains(genre)))
                .cloned()
                .collect()
        };

        let column = filters.sort_column();
        matched.sort_by(|a, b| {
            let primary = compare_column(column, a, b);
            let primary = match filters.sort_order() {
                SortOrder::Ascending => primary,
                SortOrder::Descending => primary.reverse(),
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });

        let total = i64::try_from(matched.len()).unwrap_or(i64::MAX);
        let offset = usize::try_from(filters.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(filters.limit()).unwrap_or(usize::MAX);
        let records: Vec<Movie> = matched.into_iter().skip(offset).take(limit).collect();

        // The windowed count only exists on returned rows, so a page past the
        // end reports no records at all.
        let total_records = if records.is_empty() { 0 } else { total };
        let metadata = Metadata::calculate(total_records, filters.page(), filters.page_size());

        debug!(
            sort = column,
            order = %filters.sort_order(),
            limit = filters.limit(),
            offset = filters.offset(),
            total_records,
            "Listed {} movies",
            records.len()
        );

        Ok(Page::new(records, metadata))
    }
}

#[async_trait]
impl UsersRepository for MemoryStore {
    async fn insert_user(&self, user: &mut User) -> Result<()> {
        assert_password_set(user);
        let mut tables = self.tables.lock();

        if tables.email_taken(&user.email, 0) {
            return Err(StoreError::duplicate(USERS_EMAIL_CONSTRAINT));
        }

        user.id = tables.next_user_id;
        user.created_at = Utc::now();
        user.version = 1;
        tables.next_user_id += 1;
        tables.users.insert(user.id, user.clone());

        info!("Created user {}", user.id);
        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        let email = email.to_lowercase();
        self.tables
            .lock()
            .users
            .values()
            .find(|user| user.email.to_lowercase() == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_user(&self, user: &mut User) -> Result<()> {
        assert_password_set(user);
        let mut tables = self.tables.lock();

        let current = tables.users.get(&user.id).map(|stored| stored.version);
        if current != Some(user.version) {
            warn!(
                "Edit conflict on user {} at version {}",
                user.id, user.version
            );
            return Err(StoreError::EditConflict);
        }
        if tables.email_taken(&user.email, user.id) {
            return Err(StoreError::duplicate(USERS_EMAIL_CONSTRAINT));
        }

        let mut stored = user.clone();
        stored.version += 1;
        if let Some(previous) = tables.users.get(&user.id) {
            stored.created_at = previous.created_at;
        }
        user.version = stored.version;
        tables.users.insert(user.id, stored);

        info!("Updated user {} (version {})", user.id, user.version);
        Ok(())
    }

    async fn get_user_by_token(&self, plaintext: &str, scope: TokenScope) -> Result<User> {
        let hash = hash_token(plaintext);
        let now = Utc::now();
        let tables = self.tables.lock();

        let owner = tables
            .tokens
            .iter()
            .find(|token| {
                constant_time_eq(&token.hash, &hash)
                    && token.scope == scope
                    && token.expiry > now
            })
            .map(|token| token.user_id);

        debug!("Resolved {scope} token: found={}", owner.is_some());
        owner
            .and_then(|user_id| tables.users.get(&user_id).cloned())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl TokensRepository for MemoryStore {
    async fn insert_token(&self, token: &Token) -> Result<()> {
        let mut tables = self.tables.lock();

        if tables
            .tokens
            .iter()
            .any(|existing| constant_time_eq(&existing.hash, &token.hash))
        {
            return Err(StoreError::duplicate(TOKENS_PRIMARY_KEY));
        }

        tables.tokens.push(TokenRecord {
            hash: token.hash,
            user_id: token.user_id,
            expiry: token.expiry,
            scope: token.scope,
        });

        info!(
            "Issued {} token for user {} (expires {})",
            token.scope, token.user_id, token.expiry
        );
        Ok(())
    }

    async fn delete_all_tokens_for_user(&self, user_id: i64, scope: TokenScope) -> Result<()> {
        let mut tables = self.tables.lock();
        let before = tables.tokens.len();
        tables
            .tokens
            .retain(|token| !(token.user_id == user_id && token.scope == scope));

        info!(
            "Revoked {} {scope} tokens for user {user_id}",
            before - tables.tokens.len()
        );
        Ok(())
    }
}

#[async_trait]
impl PermissionsRepository for MemoryStore {
    async fn get_permissions_for_user(&self, user_id: i64) -> Result<Permissions> {
        let tables = self.tables.lock();
        let mut codes: Vec<String> = tables
            .permissions
            .iter()
            .filter(|(id, _)| tables.grants.contains(&(user_id, *id)))
            .map(|(_, code)| code.clone())
            .collect();
        codes.sort();
        Ok(Permissions::from(codes))
    }

    async fn grant_permissions(&self, user_id: i64, codes: &[&str]) -> Result<()> {
        let mut tables = self.tables.lock();
        let ids: Vec<i64> = tables
            .permissions
            .iter()
            .filter(|(_, code)| codes.contains(&code.as_str()))
            .map(|(id, _)| *id)
            .collect();

        let granted = ids
            .into_iter()
            .filter(|id| tables.grants.insert((user_id, *id)))
            .count();

        info!("Granted {granted} new permissions to user {user_id}");
        Ok(())
    }
}
