//! Seeds a sqlite database with demo users and content, and prints a
//! bearer token per user so the API can be exercised immediately.

use std::sync::Arc;

use anyhow::Context;
use auth_adapters::JwtIdentityResolver;
use configs::AppConfig;
use domains::{CommentKind, CommentParent, ForumStore, UserRef, VoteDirection, WriteBatch};
use secrecy::ExposeSecret;
use services::Forum;
use storage_adapters::SqliteForumStore;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let store = SqliteForumStore::connect(&config.store.sqlite_url)
        .await
        .context("failed to open sqlite store")?;
    let resolver = JwtIdentityResolver::new(config.auth.jwt_secret.expose_secret().as_bytes());

    let alice = demo_user("alice", 120);
    let bob = demo_user("bob", 45);
    let carol = demo_user("carol", 7);
    store
        .apply(
            WriteBatch::new()
                .put_user(alice.clone())
                .put_user(bob.clone())
                .put_user(carol.clone()),
        )
        .await?;

    let forum = Forum::new(Arc::new(store));

    let post = forum
        .create_post(
            alice.id,
            "How do I model optimistic concurrency?".into(),
            "Every write keeps failing with a conflict under load. What is the usual \
             pattern for retrying safely?"
                .into(),
            vec!["concurrency".into(), "storage".into()],
        )
        .await?;

    let answer = forum
        .create_answer(
            post.id,
            bob.id,
            "Read the current version, apply your change, and re-submit with that \
             version. On a conflict, re-read and retry a bounded number of times."
                .into(),
        )
        .await?;

    forum
        .create_comment(
            carol.id,
            CommentParent::Post(post.id),
            "Does this also apply when several entities change together?",
            CommentKind::Question,
            vec!["@alice".into()],
        )
        .await?;
    forum
        .create_comment(
            alice.id,
            CommentParent::Answer(answer.id),
            "This fixed it for me, thanks!",
            CommentKind::General,
            vec!["@bob".into()],
        )
        .await?;

    forum.vote_post(post.id, bob.id, VoteDirection::Up).await?;
    forum.vote_answer(answer.id, alice.id, VoteDirection::Up).await?;
    forum.vote_answer(answer.id, carol.id, VoteDirection::Up).await?;
    forum.toggle_accept_answer(answer.id, alice.id).await?;

    tracing::info!(post_id = %post.id, answer_id = %answer.id, "demo content seeded");
    println!("seeded demo data into {}", config.store.sqlite_url);
    for user in [&alice, &bob, &carol] {
        let token = resolver.mint(user.id, chrono::Duration::days(7))?;
        println!("{:<8} {}  Bearer {}", user.username, user.id, token);
    }
    Ok(())
}

fn demo_user(username: &str, reputation: i64) -> UserRef {
    UserRef {
        id: Uuid::new_v4(),
        username: username.to_string(),
        reputation,
        version: 0,
    }
}
