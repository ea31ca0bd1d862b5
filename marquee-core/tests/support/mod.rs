//! Store contract shared by the in-memory and PostgreSQL suites.
//!
//! Each `contract_*` function drives a [`Store`] through one behaviour and
//! asserts the observable result, so both backends are held to the same
//! rules.
#![allow(dead_code)]

use anyhow::{Context, Result, ensure};
use argon2::Params;
use chrono::Duration;
use marquee_core::Store;
use marquee_core::auth::{CredentialCodec, TOKEN_PLAINTEXT_LEN};
use marquee_core::database::MOVIE_SORT_SAFELIST;
use marquee_core::error::StoreError;
use marquee_core::model::{
    CandidateCredential, Identity, Movie, Runtime, TokenScope, User,
    permission_codes::{MOVIES_READ, MOVIES_WRITE},
};
use marquee_core::query::Filters;

/// Codec with deliberately cheap Argon2 parameters.
pub fn fast_codec() -> CredentialCodec {
    let params = Params::new(1024, 1, 1, Some(32)).expect("valid test params");
    CredentialCodec::with_params("test-pepper", params).expect("codec builds")
}

pub fn sample_movie(title: &str, year: i32, minutes: i32, genres: &[&str]) -> Movie {
    Movie::new(
        title,
        year,
        Runtime(minutes),
        genres.iter().map(|g| g.to_string()).collect(),
    )
}

pub fn sample_user(codec: &CredentialCodec, name: &str, email: &str) -> Result<User> {
    let password = codec.hash(&CandidateCredential::new("correcthorse"))?;
    Ok(User::new(name, email, password))
}

pub async fn insert_sample_catalogue(store: &Store) -> Result<Vec<Movie>> {
    let mut movies = vec![
        sample_movie("Moana", 2016, 107, &["animation", "adventure"]),
        sample_movie("The Breakfast Club", 1985, 96, &["comedy", "drama"]),
        sample_movie("Black Panther", 2018, 134, &["action", "adventure"]),
        sample_movie("Deadpool", 2016, 108, &["action", "comedy"]),
        sample_movie("The Club", 2015, 98, &["drama"]),
        sample_movie("Casablanca", 1942, 102, &["drama", "romance"]),
        sample_movie("Metropolis", 1927, 153, &["drama", "sci-fi"]),
    ];
    for movie in &mut movies {
        store.movies().insert_movie(movie).await?;
    }
    Ok(movies)
}

pub async fn contract_insert_assigns_identity(store: &Store) -> Result<()> {
    let mut movie = sample_movie("Moana", 2016, 107, &["animation", "adventure"]);
    store.movies().insert_movie(&mut movie).await?;

    ensure!(movie.id >= 1, "id assigned");
    ensure!(movie.version == 1, "version starts at 1");

    let fetched = store.movies().get_movie(movie.id).await?;
    assert_eq!(fetched.title, "Moana");
    assert_eq!(fetched.runtime, Runtime(107));
    assert_eq!(fetched.genres, vec!["animation", "adventure"]);
    assert_eq!(fetched.version, 1);
    Ok(())
}

pub async fn contract_update_increments_version(store: &Store) -> Result<()> {
    let mut movie = sample_movie("Black Panther", 2018, 134, &["action"]);
    store.movies().insert_movie(&mut movie).await?;

    movie.title = "Black Panther: Wakanda".into();
    movie.genres.push("adventure".into());
    store.movies().update_movie(&mut movie).await?;
    assert_eq!(movie.version, 2);

    let stored = store.movies().get_movie(movie.id).await?;
    assert_eq!(stored.version, 2);
    assert_eq!(stored.title, "Black Panther: Wakanda");
    assert_eq!(stored.genres, vec!["action", "adventure"]);
    assert_eq!(stored.year, 2018);
    Ok(())
}

pub async fn contract_stale_update_conflicts(store: &Store) -> Result<()> {
    let mut movie = sample_movie("Deadpool", 2016, 108, &["action", "comedy"]);
    store.movies().insert_movie(&mut movie).await?;

    let mut stale = movie.clone();
    movie.runtime = Runtime(109);
    store.movies().update_movie(&mut movie).await?;

    stale.title = "Deadpool 2".into();
    let err = store
        .movies()
        .update_movie(&mut stale)
        .await
        .expect_err("stale version must be rejected");
    assert!(err.is_edit_conflict(), "{err:?}");
    assert_eq!(stale.version, 1, "failed update leaves caller version alone");

    let stored = store.movies().get_movie(movie.id).await?;
    assert_eq!(stored.title, "Deadpool");
    assert_eq!(stored.runtime, Runtime(109));
    assert_eq!(stored.version, 2);
    Ok(())
}

pub async fn contract_update_of_missing_row_conflicts(store: &Store) -> Result<()> {
    let mut ghost = sample_movie("Ghost", 1990, 127, &["romance"]);
    ghost.id = 9_999;
    ghost.version = 1;

    let err = store.movies().update_movie(&mut ghost).await.unwrap_err();
    assert!(err.is_edit_conflict(), "{err:?}");
    Ok(())
}

pub async fn contract_concurrent_updates_have_one_winner(store: &Store) -> Result<()> {
    let mut movie = sample_movie("Metropolis", 1927, 153, &["drama", "sci-fi"]);
    store.movies().insert_movie(&mut movie).await?;

    let mut first = movie.clone();
    first.title = "Metropolis (restored)".into();
    let mut second = movie.clone();
    second.runtime = Runtime(148);

    let (a, b) = tokio::join!(
        store.movies().update_movie(&mut first),
        store.movies().update_movie(&mut second),
    );

    let outcomes = [a.is_ok(), b.is_ok()];
    ensure!(
        outcomes.iter().filter(|ok| **ok).count() == 1,
        "exactly one update wins: {outcomes:?}"
    );
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(StoreError::EditConflict)));

    let stored = store.movies().get_movie(movie.id).await?;
    assert_eq!(stored.version, movie.version + 1);
    Ok(())
}

pub async fn contract_missing_movies(store: &Store) -> Result<()> {
    assert!(store.movies().get_movie(0).await.unwrap_err().is_not_found());
    assert!(store.movies().get_movie(-4).await.unwrap_err().is_not_found());
    assert!(store.movies().get_movie(4_242).await.unwrap_err().is_not_found());
    assert!(store.movies().delete_movie(4_242).await.unwrap_err().is_not_found());

    let mut movie = sample_movie("Casablanca", 1942, 102, &["drama"]);
    store.movies().insert_movie(&mut movie).await?;
    store.movies().delete_movie(movie.id).await?;
    assert!(store.movies().get_movie(movie.id).await.unwrap_err().is_not_found());
    assert!(store.movies().delete_movie(movie.id).await.unwrap_err().is_not_found());
    Ok(())
}

pub async fn contract_list_filters_sorts_and_pages(store: &Store) -> Result<()> {
    insert_sample_catalogue(store).await?;

    let by_title = Filters::new("title", MOVIE_SORT_SAFELIST, 1, 20).validate()?;
    let page = store.movies().list_movies("club", &[], &by_title).await?;
    let titles: Vec<&str> = page.records.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["The Breakfast Club", "The Club"]);
    assert_eq!(page.metadata.total_records, 2);

    let genres = vec!["action".to_string(), "adventure".to_string()];
    let page = store.movies().list_movies("", &genres, &by_title).await?;
    let titles: Vec<&str> = page.records.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Black Panther"]);

    // Moana and Deadpool share 2016; the id tie-break keeps insertion order.
    let by_year_desc = Filters::new("-year", MOVIE_SORT_SAFELIST, 1, 3).validate()?;
    let page = store.movies().list_movies("", &[], &by_year_desc).await?;
    let titles: Vec<&str> = page.records.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Black Panther", "Moana", "Deadpool"]);
    assert_eq!(page.metadata.current_page, 1);
    assert_eq!(page.metadata.last_page, 3);
    assert_eq!(page.metadata.total_records, 7);

    let last = Filters::new("-year", MOVIE_SORT_SAFELIST, 3, 3).validate()?;
    let page = store.movies().list_movies("", &[], &last).await?;
    let titles: Vec<&str> = page.records.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Metropolis"]);
    assert_eq!(page.metadata.current_page, 3);

    let beyond = Filters::new("id", MOVIE_SORT_SAFELIST, 9, 3).validate()?;
    let page = store.movies().list_movies("", &[], &beyond).await?;
    assert!(page.records.is_empty());
    assert!(page.metadata.is_empty());

    let none = store.movies().list_movies("zzz", &[], &by_title).await?;
    assert!(none.records.is_empty());
    assert!(none.metadata.is_empty());
    Ok(())
}

pub async fn contract_users_round_trip(store: &Store) -> Result<()> {
    let codec = fast_codec();
    let mut user = sample_user(&codec, "Alice", "alice@example.com")?;
    store.users().insert_user(&mut user).await?;
    assert_eq!(user.version, 1);
    assert!(!user.activated);

    let fetched = store.users().get_user_by_email("ALICE@example.com").await?;
    assert_eq!(fetched.id, user.id);
    assert!(codec.matches("correcthorse", &fetched.password)?);
    assert!(!codec.matches("wrong", &fetched.password)?);

    let mut activated = fetched.clone();
    activated.activated = true;
    store.users().update_user(&mut activated).await?;
    assert_eq!(activated.version, 2);

    let mut stale = fetched;
    stale.name = "Mallory".into();
    let err = store.users().update_user(&mut stale).await.unwrap_err();
    assert!(err.is_edit_conflict(), "{err:?}");

    let stored = store.users().get_user_by_email("alice@example.com").await?;
    assert!(stored.activated);
    assert_eq!(stored.name, "Alice");
    assert_eq!(stored.version, 2);

    assert!(
        store
            .users()
            .get_user_by_email("nobody@example.com")
            .await
            .unwrap_err()
            .is_not_found()
    );
    Ok(())
}

pub async fn contract_duplicate_email(store: &Store) -> Result<()> {
    let codec = fast_codec();
    let mut alice = sample_user(&codec, "Alice", "alice@example.com")?;
    store.users().insert_user(&mut alice).await?;

    let mut twin = sample_user(&codec, "Alice Two", "Alice@Example.com")?;
    let err = store.users().insert_user(&mut twin).await.unwrap_err();
    assert!(err.is_duplicate_email(), "{err:?}");

    let mut bob = sample_user(&codec, "Bob", "bob@example.com")?;
    store.users().insert_user(&mut bob).await?;
    bob.email = "alice@example.com".into();
    let err = store.users().update_user(&mut bob).await.unwrap_err();
    assert!(err.is_duplicate_email(), "{err:?}");
    Ok(())
}

pub async fn contract_token_lifecycle(store: &Store) -> Result<()> {
    let codec = fast_codec();
    let mut owner = None;
    for n in 1..=7 {
        let mut user = sample_user(&codec, &format!("User {n}"), &format!("user{n}@example.com"))?;
        store.users().insert_user(&mut user).await?;
        owner = Some(user);
    }
    let owner = owner.context("seventh user inserted")?;

    let token = store
        .tokens()
        .new_token(owner.id, Duration::hours(24), TokenScope::Activation)
        .await?;
    assert_eq!(token.plaintext.len(), TOKEN_PLAINTEXT_LEN);

    let found = store
        .users()
        .get_user_by_token(&token.plaintext, TokenScope::Activation)
        .await?;
    assert_eq!(found.id, owner.id);
    assert!(!Identity::from(found).is_anonymous());

    let wrong_scope = store
        .users()
        .get_user_by_token(&token.plaintext, TokenScope::Authentication)
        .await
        .unwrap_err();
    assert!(wrong_scope.is_not_found());

    let unknown = store
        .users()
        .get_user_by_token("AAAAAAAAAAAAAAAAAAAAAAAAAA", TokenScope::Activation)
        .await
        .unwrap_err();
    assert!(unknown.is_not_found());

    let expired = store
        .tokens()
        .new_token(owner.id, Duration::hours(-1), TokenScope::Authentication)
        .await?;
    let err = store
        .users()
        .get_user_by_token(&expired.plaintext, TokenScope::Authentication)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

pub async fn contract_token_revocation(store: &Store) -> Result<()> {
    let codec = fast_codec();
    let mut user = sample_user(&codec, "Carol", "carol@example.com")?;
    store.users().insert_user(&mut user).await?;

    let session = store
        .tokens()
        .new_token(user.id, Duration::hours(1), TokenScope::Authentication)
        .await?;
    let activation = store
        .tokens()
        .new_token(user.id, Duration::hours(1), TokenScope::Activation)
        .await?;

    store
        .tokens()
        .delete_all_tokens_for_user(user.id, TokenScope::Authentication)
        .await?;
    // Nothing left to delete is still a success.
    store
        .tokens()
        .delete_all_tokens_for_user(user.id, TokenScope::Authentication)
        .await?;

    assert!(
        store
            .users()
            .get_user_by_token(&session.plaintext, TokenScope::Authentication)
            .await
            .unwrap_err()
            .is_not_found()
    );
    let still_valid = store
        .users()
        .get_user_by_token(&activation.plaintext, TokenScope::Activation)
        .await?;
    assert_eq!(still_valid.id, user.id);
    Ok(())
}

pub async fn contract_permissions(store: &Store) -> Result<()> {
    let codec = fast_codec();
    let mut user = sample_user(&codec, "Dave", "dave@example.com")?;
    store.users().insert_user(&mut user).await?;

    assert!(store.permissions().get_permissions_for_user(user.id).await?.is_empty());

    store
        .permissions()
        .grant_permissions(user.id, &[MOVIES_READ, "movies:delete"])
        .await?;
    let permissions = store.permissions().get_permissions_for_user(user.id).await?;
    assert!(permissions.includes(MOVIES_READ));
    assert!(!permissions.includes(MOVIES_WRITE));
    assert_eq!(permissions.len(), 1, "unknown codes are ignored");

    store
        .permissions()
        .grant_permissions(user.id, &[MOVIES_WRITE, MOVIES_READ])
        .await?;
    let permissions = store.permissions().get_permissions_for_user(user.id).await?;
    assert_eq!(
        permissions.iter().collect::<Vec<_>>(),
        vec![MOVIES_READ, MOVIES_WRITE]
    );
    Ok(())
}
