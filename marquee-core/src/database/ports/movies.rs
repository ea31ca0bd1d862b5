use async_trait::async_trait;
use marquee_model::Movie;

use crate::error::Result;
use crate::query::{Page, ValidatedFilters};

/// Sort keys accepted by [`MoviesRepository::list_movies`].
pub const MOVIE_SORT_SAFELIST: &[&str] = &[
    "id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime",
];

#[async_trait]
pub trait MoviesRepository: Send + Sync {
    /// Persist a new movie. `id`, `created_at` and `version` are written back
    /// into `movie`.
    async fn insert_movie(&self, movie: &mut Movie) -> Result<()>;

    /// Ids below 1 are `NotFound` without touching the store.
    async fn get_movie(&self, id: i64) -> Result<Movie>;

    /// Conditional write keyed by `(movie.id, movie.version)`.
    ///
    /// On success `movie.version` holds the new version. A stale version and a
    /// missing row both surface as `EditConflict`.
    async fn update_movie(&self, movie: &mut Movie) -> Result<()>;

    async fn delete_movie(&self, id: i64) -> Result<()>;

    /// Title full-text match (empty matches all) intersected with genre
    /// containment (empty matches all), ordered by the resolved column with
    /// `id ASC` as tie-break.
    async fn list_movies(
        &self,
        title: &str,
        genres: &[String],
        filters: &ValidatedFilters,
    ) -> Result<Page<Movie>>;
}
