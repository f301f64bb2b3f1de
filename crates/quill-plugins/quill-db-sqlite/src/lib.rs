//! # quill-db-sqlite
//!
//! SQLite implementation of the quill-core repository ports, mapping between
//! the relational layout in `schema.sql` and the domain read models.
//!
//! Uniqueness rules (usernames, emails, group slugs, follow pairs) live in
//! the schema; constraint violations are translated into domain errors here,
//! so multi-step "check then insert" sequences never exist above this crate.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqlitePool, SqliteRow};
use sqlx::Row;

use quill_core::error::{AppError, Result};
use quill_core::feed::FeedFilter;
use quill_core::models::{
    CommentEntry, FollowEntry, Group, GroupRef, NewComment, NewGroup, NewPost, NewUser,
    PostChanges, PostEntry, ProfileChanges, User,
};
use quill_core::traits::{CommentRepo, FollowRepo, GroupRepo, PostRepo, UserRepo};

const SCHEMA: &str = include_str!("schema.sql");

/// Connection pool plus the schema, shared by every repository port.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects, enables foreign keys and applies the schema.
    pub async fn connect(url: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(url)
            .map_err(AppError::internal)?
            .foreign_keys(true);

        let mut pool_opts = SqlitePoolOptions::new();
        // An in-memory database exists per connection; the pool must not
        // hand out a second, empty one.
        if url.contains(":memory:") || url.contains("mode=memory") {
            pool_opts = pool_opts
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_opts.connect_with(opts).await.map_err(AppError::internal)?;
        sqlx::raw_sql(SCHEMA).execute(&pool).await.map_err(AppError::internal)?;
        tracing::debug!(url, "sqlite store ready");
        Ok(Self { pool })
    }

    /// An isolated in-memory store, used by tests and available to callers
    /// that want a throwaway instance.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn internal(err: sqlx::Error) -> AppError {
    AppError::internal(err)
}

/// True when `err` is a UNIQUE constraint violation mentioning `column`
/// (SQLite reports "UNIQUE constraint failed: table.column").
fn is_unique_violation_on(err: &sqlx::Error, column: &str) -> bool {
    err.as_database_error()
        .map(|db| matches!(db.kind(), ErrorKind::UniqueViolation) && db.message().contains(column))
        .unwrap_or(false)
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| matches!(db.kind(), ErrorKind::ForeignKeyViolation))
        .unwrap_or(false)
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        avatar: row.get("avatar"),
        created_at: row.get("created_at"),
    }
}

fn group_from_row(row: &SqliteRow) -> Group {
    Group {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        description: row.get("description"),
    }
}

fn post_from_row(row: &SqliteRow) -> PostEntry {
    let group = row
        .get::<Option<i64>, _>("group_id")
        .map(|id| GroupRef {
            id,
            title: row.get("group_title"),
            slug: row.get("group_slug"),
        });
    PostEntry {
        id: row.get("id"),
        author_id: row.get("author_id"),
        author_username: row.get("author_username"),
        text: row.get("text"),
        image: row.get("image"),
        group,
        created_at: row.get("created_at"),
    }
}

fn comment_from_row(row: &SqliteRow) -> CommentEntry {
    CommentEntry {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        author_username: row.get("author_username"),
        text: row.get("text"),
        created_at: row.get("created_at"),
    }
}

fn follow_from_row(row: &SqliteRow) -> FollowEntry {
    FollowEntry {
        id: row.get("id"),
        user_id: row.get("user_id"),
        user_username: row.get("user_username"),
        author_id: row.get("author_id"),
        author_username: row.get("author_username"),
    }
}

const POST_SELECT: &str = "SELECT p.id, p.author_id, u.username AS author_username, p.text, \
     p.image, p.created_at, p.group_id, g.title AS group_title, g.slug AS group_slug \
     FROM posts p \
     JOIN users u ON u.id = p.author_id \
     LEFT JOIN groups g ON g.id = p.group_id";

/// WHERE clause and its bind value for a feed filter.
fn feed_where(filter: &FeedFilter) -> (&'static str, Option<i64>) {
    match filter {
        FeedFilter::Global => ("", None),
        FeedFilter::Group(id) => (" WHERE p.group_id = ?", Some(*id)),
        FeedFilter::Author(id) => (" WHERE p.author_id = ?", Some(*id)),
        FeedFilter::SubscriptionsOf(user_id) => (
            " WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id = ?)",
            Some(*user_id),
        ),
    }
}

#[async_trait]
impl UserRepo for SqliteStore {
    async fn insert(&self, new: NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, first_name, last_name, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation_on(&err, "users.username") {
                AppError::validation("username", "username is already taken")
            } else if is_unique_violation_on(&err, "users.email") {
                AppError::validation("email", "email is already registered")
            } else {
                internal(err)
            }
        })?;

        let id = result.last_insert_rowid();
        UserRepo::find(self, id)
            .await?
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("inserted user {id} vanished")))
    }

    async fn find(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> Result<User> {
        // COALESCE keeps the stored avatar when no new one was uploaded.
        sqlx::query(
            "UPDATE users SET username = ?, email = ?, first_name = ?, last_name = ?, \
             avatar = COALESCE(?, avatar) WHERE id = ?",
        )
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.avatar)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation_on(&err, "users.username") {
                AppError::validation("username", "username is already taken")
            } else if is_unique_violation_on(&err, "users.email") {
                AppError::validation("email", "email is already registered")
            } else {
                internal(err)
            }
        })?;

        UserRepo::find(self, id)
            .await?
            .ok_or_else(|| AppError::not_found("user", id))
    }
}

#[async_trait]
impl GroupRepo for SqliteStore {
    async fn insert(&self, new: NewGroup) -> Result<Group> {
        let result = sqlx::query("INSERT INTO groups (title, slug, description) VALUES (?, ?, ?)")
            .bind(&new.title)
            .bind(&new.slug)
            .bind(&new.description)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_unique_violation_on(&err, "groups.slug") {
                    AppError::Conflict(format!("group slug `{}` already exists", new.slug))
                } else {
                    internal(err)
                }
            })?;

        let id = result.last_insert_rowid();
        GroupRepo::find(self, id)
            .await?
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("inserted group {id} vanished")))
    }

    async fn find(&self, id: i64) -> Result<Option<Group>> {
        let row = sqlx::query("SELECT * FROM groups WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        Ok(row.as_ref().map(group_from_row))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let row = sqlx::query("SELECT * FROM groups WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        Ok(row.as_ref().map(group_from_row))
    }

    async fn list(&self) -> Result<Vec<Group>> {
        let rows = sqlx::query("SELECT * FROM groups ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
        Ok(rows.iter().map(group_from_row).collect())
    }
}

#[async_trait]
impl PostRepo for SqliteStore {
    async fn insert(&self, new: NewPost) -> Result<PostEntry> {
        let result = sqlx::query(
            "INSERT INTO posts (author_id, text, image, group_id, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(new.author_id)
        .bind(&new.text)
        .bind(&new.image)
        .bind(new.group_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                AppError::validation("group", "unknown group")
            } else {
                internal(err)
            }
        })?;

        let id = result.last_insert_rowid();
        PostRepo::find(self, id)
            .await?
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("inserted post {id} vanished")))
    }

    async fn find(&self, id: i64) -> Result<Option<PostEntry>> {
        let sql = format!("{POST_SELECT} WHERE p.id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn update(&self, id: i64, changes: PostChanges) -> Result<PostEntry> {
        let current = PostRepo::find(self, id)
            .await?
            .ok_or_else(|| AppError::not_found("post", id))?;

        let text = changes.text.unwrap_or(current.text);
        let image = match changes.image {
            Some(image) => image,
            None => current.image,
        };
        let group_id = match changes.group_id {
            Some(group_id) => group_id,
            None => current.group.map(|g| g.id),
        };

        sqlx::query("UPDATE posts SET text = ?, image = ?, group_id = ? WHERE id = ?")
            .bind(&text)
            .bind(&image)
            .bind(group_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    AppError::validation("group", "unknown group")
                } else {
                    internal(err)
                }
            })?;

        PostRepo::find(self, id)
            .await?
            .ok_or_else(|| AppError::not_found("post", id))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn count(&self, filter: &FeedFilter) -> Result<i64> {
        let (clause, bind) = feed_where(filter);
        let sql = format!("SELECT COUNT(*) AS n FROM posts p{clause}");
        let mut query = sqlx::query(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let row = query.fetch_one(&self.pool).await.map_err(internal)?;
        Ok(row.get("n"))
    }

    async fn list(&self, filter: &FeedFilter, limit: i64, offset: i64) -> Result<Vec<PostEntry>> {
        let (clause, bind) = feed_where(filter);
        let sql = format!(
            "{POST_SELECT}{clause} ORDER BY p.created_at DESC, p.id DESC LIMIT ? OFFSET ?"
        );
        let mut query = sqlx::query(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
        Ok(rows.iter().map(post_from_row).collect())
    }
}

const COMMENT_SELECT: &str = "SELECT c.id, c.post_id, c.author_id, \
     u.username AS author_username, c.text, c.created_at \
     FROM comments c JOIN users u ON u.id = c.author_id";

#[async_trait]
impl CommentRepo for SqliteStore {
    async fn insert(&self, new: NewComment) -> Result<CommentEntry> {
        let result = sqlx::query(
            "INSERT INTO comments (post_id, author_id, text, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(new.post_id)
        .bind(new.author_id)
        .bind(&new.text)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                AppError::not_found("post", new.post_id)
            } else {
                internal(err)
            }
        })?;

        let id = result.last_insert_rowid();
        CommentRepo::find(self, id)
            .await?
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("inserted comment {id} vanished")))
    }

    async fn find(&self, id: i64) -> Result<Option<CommentEntry>> {
        let sql = format!("{COMMENT_SELECT} WHERE c.id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        Ok(row.as_ref().map(comment_from_row))
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentEntry>> {
        let sql = format!("{COMMENT_SELECT} WHERE c.post_id = ? ORDER BY c.created_at, c.id");
        let rows = sqlx::query(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn update_text(&self, id: i64, text: &str) -> Result<CommentEntry> {
        sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
            .bind(text)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        CommentRepo::find(self, id)
            .await?
            .ok_or_else(|| AppError::not_found("comment", id))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }
}

const FOLLOW_SELECT: &str = "SELECT f.id, f.user_id, fu.username AS user_username, \
     f.author_id, au.username AS author_username \
     FROM follows f \
     JOIN users fu ON fu.id = f.user_id \
     JOIN users au ON au.id = f.author_id";

#[async_trait]
impl FollowRepo for SqliteStore {
    async fn insert(&self, user_id: i64, author_id: i64) -> Result<FollowEntry> {
        let result =
            sqlx::query("INSERT INTO follows (user_id, author_id, created_at) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(author_id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await
                .map_err(|err| {
                    if is_unique_violation_on(&err, "follows.") {
                        AppError::validation("author", "already following this author")
                    } else {
                        internal(err)
                    }
                })?;

        let id = result.last_insert_rowid();
        let sql = format!("{FOLLOW_SELECT} WHERE f.id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?;
        Ok(follow_from_row(&row))
    }

    async fn delete(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS one FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(user_id)
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        Ok(row.is_some())
    }

    async fn list_for_user(&self, user_id: i64, search: Option<&str>) -> Result<Vec<FollowEntry>> {
        let mut sql = format!("{FOLLOW_SELECT} WHERE f.user_id = ?");
        if search.is_some() {
            sql.push_str(" AND au.username LIKE '%' || ? || '%'");
        }
        sql.push_str(" ORDER BY f.id");

        let mut query = sqlx::query(&sql).bind(user_id);
        if let Some(needle) = search {
            query = query.bind(needle);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(internal)?;
        Ok(rows.iter().map(follow_from_row).collect())
    }

    async fn list_followers(&self, author_id: i64) -> Result<Vec<FollowEntry>> {
        let sql = format!("{FOLLOW_SELECT} WHERE f.author_id = ? ORDER BY f.id");
        let rows = sqlx::query(&sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
        Ok(rows.iter().map(follow_from_row).collect())
    }
}
