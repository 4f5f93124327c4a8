//! HTTP-level tests for `/api/comments`: parent rules, the type field,
//! upvotes, edits, and the aggregation endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_app, TestApp};
use serde_json::json;

async fn post_id(app: &TestApp, token: &str) -> String {
    let created = body_json(
        app.post("/api/posts", token, json!({"title": "q", "content": "body"}))
            .await,
    )
    .await;
    created["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn parent_must_be_exactly_one_of_post_or_answer() {
    let app = build_app().await;
    let (_, token) = app.signed_up_user("commenter").await;
    let post = post_id(&app, &token).await;
    let answer = body_json(
        app.post("/api/answers", &token, json!({"body": "a", "post": post}))
            .await,
    )
    .await;
    let answer_id = answer["id"].as_str().unwrap();

    // Neither parent.
    let response = app
        .post("/api/comments", &token, json!({"content": "floating"}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Both parents.
    let response = app
        .post(
            "/api/comments",
            &token,
            json!({"content": "greedy", "post": post, "answer": answer_id}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn type_field_round_trips_and_rejects_unknowns() {
    let app = build_app().await;
    let (_, token) = app.signed_up_user("commenter").await;
    let post = post_id(&app, &token).await;

    let created = body_json(
        app.post(
            "/api/comments",
            &token,
            json!({"content": "what about this?", "post": post, "type": "question"}),
        )
        .await,
    )
    .await;
    assert_eq!(created["type"], "question");
    assert_eq!(created["status"], "approved");

    // Omitted type defaults to general.
    let created = body_json(
        app.post(
            "/api/comments",
            &token,
            json!({"content": "no type given", "post": post}),
        )
        .await,
    )
    .await;
    assert_eq!(created["type"], "general");

    let response = app
        .post(
            "/api/comments",
            &token,
            json!({"content": "bad type", "post": post, "type": "rant"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn short_content_is_rejected() {
    let app = build_app().await;
    let (_, token) = app.signed_up_user("commenter").await;
    let post = post_id(&app, &token).await;

    let response = app
        .post("/api/comments", &token, json!({"content": "no", "post": post}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upvote_endpoint_toggles() {
    let app = build_app().await;
    let (_, author_token) = app.signed_up_user("author").await;
    let (_, voter_token) = app.signed_up_user("voter").await;
    let post = post_id(&app, &author_token).await;

    let created = body_json(
        app.post(
            "/api/comments",
            &author_token,
            json!({"content": "nice point", "post": post}),
        )
        .await,
    )
    .await;
    let uri = format!("/api/comments/{}/upvote", created["id"].as_str().unwrap());

    let receipt = body_json(app.post(&uri, &voter_token, json!({})).await).await;
    assert_eq!(receipt["outcome"], "cast");
    assert_eq!(receipt["score"], 1);

    let receipt = body_json(app.post(&uri, &voter_token, json!({})).await).await;
    assert_eq!(receipt["outcome"], "withdrawn");
    assert_eq!(receipt["score"], 0);
}

#[tokio::test]
async fn edits_track_history_in_the_view() {
    let app = build_app().await;
    let (_, token) = app.signed_up_user("author").await;
    let post = post_id(&app, &token).await;

    let created = body_json(
        app.post(
            "/api/comments",
            &token,
            json!({"content": "first version", "post": post}),
        )
        .await,
    )
    .await;
    let uri = format!("/api/comments/{}", created["id"].as_str().unwrap());

    let response = app
        .request(
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"content": "second version", "status": "Flagged"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let edited = body_json(response).await;
    assert_eq!(edited["content"], "second version");
    assert_eq!(edited["is_edited"], true);
    assert_eq!(edited["status"], "flagged");
    assert_eq!(
        edited["moderation"]["edit_history"][0]["previous_content"],
        "first version"
    );
}

#[tokio::test]
async fn delete_returns_no_content_then_not_found() {
    let app = build_app().await;
    let (_, token) = app.signed_up_user("author").await;
    let post = post_id(&app, &token).await;

    let created = body_json(
        app.post(
            "/api/comments",
            &token,
            json!({"content": "ephemeral", "post": post}),
        )
        .await,
    )
    .await;
    let uri = format!("/api/comments/{}", created["id"].as_str().unwrap());

    let response = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_routes_filter_by_parent_and_author() {
    let app = build_app().await;
    let (alice, alice_token) = app.signed_up_user("alice").await;
    let (_, bob_token) = app.signed_up_user("bob").await;
    let post = post_id(&app, &alice_token).await;
    let answer = body_json(
        app.post("/api/answers", &bob_token, json!({"body": "a", "post": post}))
            .await,
    )
    .await;
    let answer_id = answer["id"].as_str().unwrap();

    app.post("/api/comments", &alice_token, json!({"content": "on the post", "post": post}))
        .await;
    app.post(
        "/api/comments",
        &bob_token,
        json!({"content": "on the answer", "answer": answer_id}),
    )
    .await;

    let on_post = body_json(app.get(&format!("/api/comments/post/{post}")).await).await;
    assert_eq!(on_post.as_array().unwrap().len(), 1);
    assert_eq!(on_post[0]["content"], "on the post");

    let on_answer = body_json(app.get(&format!("/api/comments/answer/{answer_id}")).await).await;
    assert_eq!(on_answer.as_array().unwrap().len(), 1);
    assert_eq!(on_answer[0]["author_username"], "bob");

    let by_alice = body_json(app.get(&format!("/api/comments/author/{alice}")).await).await;
    assert_eq!(by_alice.as_array().unwrap().len(), 1);

    let all = body_json(app.get("/api/comments").await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn aggregation_endpoints_respond_with_views() {
    let app = build_app().await;
    let (alice, alice_token) = app.signed_up_user("alice").await;
    let (_, bob_token) = app.signed_up_user("bob").await;
    let post = post_id(&app, &alice_token).await;

    for content in ["first remark", "second remark"] {
        app.post("/api/comments", &alice_token, json!({"content": content, "post": post}))
            .await;
    }
    app.post("/api/comments", &bob_token, json!({"content": "lone remark", "post": post}))
        .await;

    let stats = body_json(app.get("/api/comments/stats/aggregate").await).await;
    let stats = stats.as_array().unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0]["author"], alice.to_string());
    assert_eq!(stats[0]["total_comments"], 2);
    assert_eq!(stats[0]["username"], "alice");

    let top_one = body_json(app.get("/api/comments/stats/aggregate?limit=1").await).await;
    assert_eq!(top_one.as_array().unwrap().len(), 1);

    let detailed = body_json(app.get("/api/comments/stats/detailed?limit=2").await).await;
    let detailed = detailed.as_array().unwrap();
    assert_eq!(detailed.len(), 2);
    // Newest first and joined with the parent post's title.
    assert_eq!(detailed[0]["content"], "lone remark");
    assert_eq!(detailed[0]["post_title"], "q");
    assert_eq!(detailed[0]["author_username"], "bob");
}
