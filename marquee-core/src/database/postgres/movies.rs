use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_model::{Movie, Runtime};
use sqlx::{FromRow, PgPool};
use tracing::{debug, info, warn};

use crate::database::deadline::within;
use crate::database::ports::MoviesRepository;
use crate::error::{Result, StoreError};
use crate::query::{Metadata, Page, ValidatedFilters};

#[derive(Debug, FromRow)]
struct MovieRow {
    id: i64,
    created_at: DateTime<Utc>,
    title: String,
    year: i32,
    runtime: i32,
    genres: Vec<String>,
    version: i32,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            created_at: row.created_at,
            title: row.title,
            year: row.year,
            runtime: Runtime(row.runtime),
            genres: row.genres,
            version: row.version,
        }
    }
}

#[derive(Debug, FromRow)]
struct MovieListRow {
    total_records: i64,
    #[sqlx(flatten)]
    movie: MovieRow,
}

#[derive(Debug, FromRow)]
struct InsertedRow {
    id: i64,
    created_at: DateTime<Utc>,
    version: i32,
}

/// PostgreSQL-backed implementation of the `MoviesRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresMoviesRepository {
    pool: PgPool,
    deadline: Duration,
}

impl PostgresMoviesRepository {
    pub fn new(pool: PgPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MoviesRepository for PostgresMoviesRepository {
    async fn insert_movie(&self, movie: &mut Movie) -> Result<()> {
        let inserted = within(self.deadline, "insert_movie", async {
            sqlx::query_as::<_, InsertedRow>(
                r#"
                INSERT INTO movies (title, year, runtime, genres)
                VALUES ($1, $2, $3, $4)
                RETURNING id, created_at, version
                "#,
            )
            .bind(&movie.title)
            .bind(movie.year)
            .bind(movie.runtime.minutes())
            .bind(&movie.genres)
            .fetch_one(self.pool())
            .await
            .map_err(StoreError::from)
        })
        .await?;

        movie.id = inserted.id;
        movie.created_at = inserted.created_at;
        movie.version = inserted.version;

        info!("Created movie {} (version {})", movie.id, movie.version);
        Ok(())
    }

    async fn get_movie(&self, id: i64) -> Result<Movie> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let row = within(self.deadline, "get_movie", async {
            sqlx::query_as::<_, MovieRow>(
                r#"
                SELECT id, created_at, title, year, runtime, genres, version
                FROM movies
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(StoreError::from)
        })
        .await?;

        debug!("Fetched movie {id}: found={}", row.is_some());
        row.map(Movie::from).ok_or(StoreError::NotFound)
    }

    async fn update_movie(&self, movie: &mut Movie) -> Result<()> {
        let version = within(self.deadline, "update_movie", async {
            sqlx::query_scalar::<_, i32>(
                r#"
                UPDATE movies
                SET title = $1, year = $2, runtime = $3, genres = $4,
                    version = version + 1
                WHERE id = $5 AND version = $6
                RETURNING version
                "#,
            )
            .bind(&movie.title)
            .bind(movie.year)
            .bind(movie.runtime.minutes())
            .bind(&movie.genres)
            .bind(movie.id)
            .bind(movie.version)
            .fetch_optional(self.pool())
            .await
            .map_err(StoreError::from)
        })
        .await?;

        match version {
            Some(version) => {
                movie.version = version;
                info!("Updated movie {} (version {})", movie.id, version);
                Ok(())
            }
            None => {
                warn!(
                    "Edit conflict on movie {} at version {}",
                    movie.id, movie.version
                );
                Err(StoreError::EditConflict)
            }
        }
    }

    async fn delete_movie(&self, id: i64) -> Result<()> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let result = within(self.deadline, "delete_movie", async {
            sqlx::query("DELETE FROM movies WHERE id = $1")
                .bind(id)
                .execute(self.pool())
                .await
                .map_err(StoreError::from)
        })
        .await?;

        if result.rows_affected() == 0 {
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
        // Column and direction come from the safelist entry, never from input.
        let sql = format!(
            r#"
            SELECT count(*) OVER() AS total_records,
                   id, created_at, title, year, runtime, genres, version
            FROM movies
            WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '')
              AND (genres @> $2 OR $2 = '{{}}')
            ORDER BY {column} {order}, id ASC
            LIMIT $3 OFFSET $4
            "#,
            column = filters.sort_column(),
            order = filters.sort_order().as_sql(),
        );

        let rows = within(self.deadline, "list_movies", async {
            sqlx::query_as::<_, MovieListRow>(&sql)
                .bind(title)
                .bind(genres)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(self.pool())
                .await
                .map_err(StoreError::from)
        })
        .await?;

        let total_records = rows.first().map_or(0, |row| row.total_records);
        let metadata = Metadata::calculate(total_records, filters.page(), filters.page_size());
        let movies: Vec<Movie> = rows.into_iter().map(|row| row.movie.into()).collect();

        debug!(
            sort = filters.sort_column(),
            order = %filters.sort_order(),
            limit = filters.limit(),
            offset = filters.offset(),
            total_records,
            "Listed {} movies",
            movies.len()
        );

        Ok(Page::new(movies, metadata))
    }
}
