//! Administrator provisioning: creates the demo accounts, the groups and a
//! handful of posts. Groups have no self-service creation path, so this is
//! where they come from. Safe to run repeatedly.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use quill_auth_simple::SimpleAuthenticator;
use quill_configs::AppConfig;
use quill_core::error::AppError;
use quill_core::feed::FeedFilter;
use quill_core::models::{NewPost, NewUser, User};
use quill_core::traits::{Authenticator, GroupRepo, PostRepo, UserRepo};
use quill_core::{follows, groups};
use quill_db_sqlite::SqliteStore;

const DEMO_PASSWORD: &str = "quill-demo";

async fn ensure_user(
    store: &SqliteStore,
    auth: &SimpleAuthenticator,
    username: &str,
    first_name: &str,
    last_name: &str,
) -> anyhow::Result<User> {
    if let Some(existing) = store.find_by_username(username).await? {
        return Ok(existing);
    }
    let user = UserRepo::insert(
        store,
        NewUser {
            username: username.to_string(),
            email: format!("{username}@quill.local"),
            password_hash: auth.hash_password(DEMO_PASSWORD)?,
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
        },
    )
    .await?;
    tracing::info!(username, "created user");
    Ok(user)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "seed=info".into()))
        .init();

    let config = AppConfig::load()?;
    let store = Arc::new(SqliteStore::connect(&config.database.url).await?);
    let auth = SimpleAuthenticator::new(store.clone());

    let author = ensure_user(&store, &auth, "author", "Avdotya", "Raskolnikova").await?;
    let reader = ensure_user(&store, &auth, "reader", "Rodion", "Romanovich").await?;

    for (title, description) in [
        ("Rust notes", "Systems programming, one borrow at a time."),
        ("Travel", "Places worth the train ticket."),
    ] {
        match groups::create(store.as_ref(), title, Some(description)).await {
            Ok(group) => tracing::info!(slug = %group.slug, "created group"),
            Err(AppError::Conflict(_)) => tracing::debug!(title, "group already present"),
            Err(err) => return Err(err.into()),
        }
    }

    if PostRepo::count(store.as_ref(), &FeedFilter::Author(author.id)).await? == 0 {
        let rust = store.find_by_slug("rust-notes").await?.map(|g| g.id);
        for (text, group_id) in [
            ("Ownership finally clicked today.", rust),
            ("Drafting a longer piece about lifetimes.", rust),
            ("Weekend plans: none, and proud of it.", None),
        ] {
            PostRepo::insert(
                store.as_ref(),
                NewPost {
                    author_id: author.id,
                    text: text.to_string(),
                    image: None,
                    group_id,
                },
            )
            .await?;
        }
        tracing::info!("created demo posts");
    }

    match follows::follow(store.as_ref(), &reader, &author).await {
        Ok(_) => tracing::info!("reader now follows author"),
        Err(AppError::Validation { .. }) => tracing::debug!("follow edge already present"),
        Err(err) => return Err(err.into()),
    }

    tracing::info!("seeding complete");
    Ok(())
}
