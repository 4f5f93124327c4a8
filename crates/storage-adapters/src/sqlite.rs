//! SQLite `ForumStore` (feature `db-sqlite`).
//!
//! Records are stored as JSON documents alongside the columns the listing
//! filters need (parent ids, author, created_at) and a `version` column for
//! the compare-and-set contract. Batches run inside one SQL transaction, so
//! a version conflict rolls the whole unit of work back.

use std::str::FromStr;

use async_trait::async_trait;
use domains::{
    Answer, AppError, Comment, CommentParent, ForumStore, Post, Result, UserRef, WriteBatch,
    WriteOp,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Row, Sqlite, Transaction};
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS posts (
        id BLOB PRIMARY KEY,
        created_at INTEGER NOT NULL,
        version INTEGER NOT NULL,
        doc TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS answers (
        id BLOB PRIMARY KEY,
        post_id BLOB NOT NULL,
        created_at INTEGER NOT NULL,
        version INTEGER NOT NULL,
        doc TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS comments (
        id BLOB PRIMARY KEY,
        parent_kind TEXT NOT NULL,
        parent_id BLOB NOT NULL,
        author BLOB NOT NULL,
        created_at INTEGER NOT NULL,
        version INTEGER NOT NULL,
        doc TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS users (
        id BLOB PRIMARY KEY,
        version INTEGER NOT NULL,
        doc TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_answers_post ON answers (post_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_comments_parent ON comments (parent_kind, parent_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_comments_author ON comments (author)",
];

pub struct SqliteForumStore {
    pool: SqlitePool,
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn unavailable(e: sqlx::Error) -> AppError {
    AppError::StoreUnavailable(e.to_string())
}

fn decode<T: DeserializeOwned>(doc: &str) -> Result<T> {
    serde_json::from_str(doc).map_err(|e| AppError::Internal(format!("undecodable record: {e}")))
}

fn encode<T: Serialize>(entity: &T) -> Result<String> {
    serde_json::to_string(entity).map_err(|e| AppError::Internal(e.to_string()))
}

impl SqliteForumStore {
    /// Opens (and creates if missing) a database at `url` and ensures the
    /// schema exists.
    pub async fn connect(url: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(url)
            .map_err(unavailable)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(unavailable)?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// A private in-memory database. One connection only, since each SQLite
    /// `:memory:` connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let opts =
            SqliteConnectOptions::from_str("sqlite::memory:").map_err(unavailable)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(unavailable)?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(unavailable)?;
        }
        Ok(())
    }

    async fn fetch_doc<T: DeserializeOwned>(&self, table: &str, id: Uuid) -> Result<Option<T>> {
        let sql = format!("SELECT doc FROM {table} WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        row.map(|r| decode(&r.get::<String, _>("doc"))).transpose()
    }

    async fn fetch_docs<T: DeserializeOwned>(&self, sql: &str, binds: Vec<Vec<u8>>) -> Result<Vec<T>> {
        let mut query = sqlx::query(sql);
        for bind in binds {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(unavailable)?;
        rows.iter()
            .map(|r| decode(&r.get::<String, _>("doc")))
            .collect()
    }
}

/// Enforces the versioning contract for one record within the transaction.
async fn expect_version(
    tx: &mut Transaction<'_, Sqlite>,
    table: &str,
    id: Uuid,
    incoming: u64,
) -> Result<()> {
    let sql = format!("SELECT version FROM {table} WHERE id = ?");
    let stored: Option<i64> = sqlx::query_scalar(&sql)
        .bind(uuid_to_blob(id))
        .fetch_optional(&mut **tx)
        .await
        .map_err(unavailable)?;
    match (stored, incoming) {
        (None, 0) => Ok(()),
        (Some(v), w) if v as u64 == w => Ok(()),
        (stored, _) => Err(AppError::Conflict(format!(
            "{table} {id}: version {incoming} does not match stored {stored:?}"
        ))),
    }
}

#[async_trait]
impl ForumStore for SqliteForumStore {
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        self.fetch_doc("posts", id).await
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        self.fetch_docs("SELECT doc FROM posts ORDER BY created_at DESC", vec![])
            .await
    }

    async fn get_answer(&self, id: Uuid) -> Result<Option<Answer>> {
        self.fetch_doc("answers", id).await
    }

    async fn answers_by_post(&self, post_id: Uuid) -> Result<Vec<Answer>> {
        self.fetch_docs(
            "SELECT doc FROM answers WHERE post_id = ? ORDER BY created_at DESC",
            vec![uuid_to_blob(post_id)],
        )
        .await
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        self.fetch_doc("comments", id).await
    }

    async fn list_comments(&self) -> Result<Vec<Comment>> {
        self.fetch_docs("SELECT doc FROM comments ORDER BY created_at DESC", vec![])
            .await
    }

    async fn comments_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        self.fetch_docs(
            "SELECT doc FROM comments WHERE parent_kind = 'post' AND parent_id = ? \
             ORDER BY created_at DESC",
            vec![uuid_to_blob(post_id)],
        )
        .await
    }

    async fn comments_by_answer(&self, answer_id: Uuid) -> Result<Vec<Comment>> {
        self.fetch_docs(
            "SELECT doc FROM comments WHERE parent_kind = 'answer' AND parent_id = ? \
             ORDER BY created_at DESC",
            vec![uuid_to_blob(answer_id)],
        )
        .await
    }

    async fn comments_by_author(&self, author: Uuid) -> Result<Vec<Comment>> {
        self.fetch_docs(
            "SELECT doc FROM comments WHERE author = ? ORDER BY created_at DESC",
            vec![uuid_to_blob(author)],
        )
        .await
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<UserRef>> {
        self.fetch_doc("users", id).await
    }

    async fn users_by_ids(&self, ids: Vec<Uuid>) -> Result<Vec<UserRef>> {
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.get_user(id).await? {
                users.push(user);
            }
        }
        Ok(users)
    }

    async fn apply(&self, batch: WriteBatch) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        for op in batch.ops {
            match op {
                WriteOp::PutPost(mut p) => {
                    expect_version(&mut tx, "posts", p.id, p.version).await?;
                    p.version += 1;
                    sqlx::query(
                        "INSERT OR REPLACE INTO posts (id, created_at, version, doc) \
                         VALUES (?, ?, ?, ?)",
                    )
                    .bind(uuid_to_blob(p.id))
                    .bind(p.created_at.timestamp_millis())
                    .bind(p.version as i64)
                    .bind(encode(&p)?)
                    .execute(&mut *tx)
                    .await
                    .map_err(unavailable)?;
                }
                WriteOp::PutAnswer(mut a) => {
                    expect_version(&mut tx, "answers", a.id, a.version).await?;
                    a.version += 1;
                    sqlx::query(
                        "INSERT OR REPLACE INTO answers (id, post_id, created_at, version, doc) \
                         VALUES (?, ?, ?, ?, ?)",
                    )
                    .bind(uuid_to_blob(a.id))
                    .bind(uuid_to_blob(a.post_id))
                    .bind(a.created_at.timestamp_millis())
                    .bind(a.version as i64)
                    .bind(encode(&a)?)
                    .execute(&mut *tx)
                    .await
                    .map_err(unavailable)?;
                }
                WriteOp::PutComment(mut c) => {
                    expect_version(&mut tx, "comments", c.id, c.version).await?;
                    c.version += 1;
                    let (parent_kind, parent_id) = match c.parent {
                        CommentParent::Post(id) => ("post", id),
                        CommentParent::Answer(id) => ("answer", id),
                    };
                    sqlx::query(
                        "INSERT OR REPLACE INTO comments \
                         (id, parent_kind, parent_id, author, created_at, version, doc) \
                         VALUES (?, ?, ?, ?, ?, ?, ?)",
                    )
                    .bind(uuid_to_blob(c.id))
                    .bind(parent_kind)
                    .bind(uuid_to_blob(parent_id))
                    .bind(uuid_to_blob(c.author))
                    .bind(c.created_at.timestamp_millis())
                    .bind(c.version as i64)
                    .bind(encode(&c)?)
                    .execute(&mut *tx)
                    .await
                    .map_err(unavailable)?;
                }
                WriteOp::PutUser(mut u) => {
                    expect_version(&mut tx, "users", u.id, u.version).await?;
                    u.version += 1;
                    sqlx::query(
                        "INSERT OR REPLACE INTO users (id, version, doc) VALUES (?, ?, ?)",
                    )
                    .bind(uuid_to_blob(u.id))
                    .bind(u.version as i64)
                    .bind(encode(&u)?)
                    .execute(&mut *tx)
                    .await
                    .map_err(unavailable)?;
                }
                WriteOp::DeletePost(id) => {
                    sqlx::query("DELETE FROM posts WHERE id = ?")
                        .bind(uuid_to_blob(id))
                        .execute(&mut *tx)
                        .await
                        .map_err(unavailable)?;
                }
                WriteOp::DeleteAnswer(id) => {
                    sqlx::query("DELETE FROM answers WHERE id = ?")
                        .bind(uuid_to_blob(id))
                        .execute(&mut *tx)
                        .await
                        .map_err(unavailable)?;
                }
                WriteOp::DeleteComment(id) => {
                    sqlx::query("DELETE FROM comments WHERE id = ?")
                        .bind(uuid_to_blob(id))
                        .execute(&mut *tx)
                        .await
                        .map_err(unavailable)?;
                }
            }
        }

        tx.commit().await.map_err(unavailable)?;
        Ok(())
    }
}
