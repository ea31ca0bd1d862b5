use chrono::{Datelike, Utc};
use marquee_model::{CandidateCredential, Movie, User};

use super::{Validator, matches_email, unique};
use crate::auth::TOKEN_PLAINTEXT_LEN;

const EARLIEST_RELEASE_YEAR: i32 = 1888;
const MAX_TITLE_CHARS: usize = 500;
const MAX_GENRES: usize = 5;
const MAX_NAME_BYTES: usize = 500;
const MIN_PASSWORD_BYTES: usize = 8;
const MAX_PASSWORD_BYTES: usize = 72;

pub fn validate_movie(v: &mut Validator, movie: &Movie) {
    v.check(!movie.title.trim().is_empty(), "title", "must be provided");
    v.check(
        movie.title.chars().count() <= MAX_TITLE_CHARS,
        "title",
        "must not be more than 500 characters long",
    );

    v.check(movie.year != 0, "year", "must be provided");
    v.check(
        movie.year >= EARLIEST_RELEASE_YEAR,
        "year",
        "must be greater than or equal to 1888",
    );
    v.check(
        movie.year <= Utc::now().year(),
        "year",
        "must not be in the future",
    );

    v.check(!movie.runtime.is_zero(), "runtime", "must be provided");
    v.check(
        movie.runtime.minutes() > 0,
        "runtime",
        "must be a positive integer",
    );

    v.check(!movie.genres.is_empty(), "genres", "must contain at least 1 genre");
    v.check(
        movie.genres.len() <= MAX_GENRES,
        "genres",
        "must not contain more than 5 genres",
    );
    v.check(unique(&movie.genres), "genres", "must not contain duplicate values");
}

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.trim().is_empty(), "email", "must be provided");
    v.check(matches_email(email), "email", "must be a valid email address");
}

pub fn validate_password_plaintext(v: &mut Validator, password: &str) {
    v.check(!password.trim().is_empty(), "password", "must be provided");
    v.check(
        password.len() >= MIN_PASSWORD_BYTES,
        "password",
        "must be at least 8 bytes long",
    );
    v.check(
        password.len() <= MAX_PASSWORD_BYTES,
        "password",
        "must not be more than 72 bytes long",
    );
}

/// Validate a user's profile fields and, when the caller is setting a new
/// password, its plaintext.
pub fn validate_user(
    v: &mut Validator,
    user: &User,
    password: Option<&CandidateCredential>,
) {
    v.check(!user.name.trim().is_empty(), "name", "must be provided");
    v.check(
        user.name.len() <= MAX_NAME_BYTES,
        "name",
        "must not be more than 500 bytes long",
    );

    validate_email(v, &user.email);

    if let Some(candidate) = password {
        validate_password_plaintext(v, candidate.expose());
    }
}

pub fn validate_token_plaintext(v: &mut Validator, token: &str) {
    v.check(!token.is_empty(), "token", "must be provided");
    if token.len() != TOKEN_PLAINTEXT_LEN {
        v.add_error(
            "token",
            format!("must be {TOKEN_PLAINTEXT_LEN} bytes long"),
        );
    }
}
