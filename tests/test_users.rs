mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn get_user_profile() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let user = common::login(&server, "claudette", None).await;
    let id = user["id"].as_str().unwrap();

    let response = server.get(&format!("/users/{id}")).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["username"].as_str(), Some("claudette"));
    assert_eq!(body["followers"].as_i64(), Some(0));
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let missing = bson::oid::ObjectId::new().to_hex();
    for path in ["", "/savedpostIDs", "/savedposts", "/posts"] {
        let response = server.get(&format!("/users/{missing}{path}")).await;
        response.assert_status_not_found();
    }
}

#[tokio::test]
async fn saved_posts_and_ids() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let post = env.seed_post("Gen rush", "", &[]).await;
    env.seed_post("Stealth", "", &[]).await;

    let user = common::login(&server, "nea", None).await;
    let id = user["id"].as_str().unwrap();
    server
        .post("/savepost")
        .json(&serde_json::json!({ "post_id": post.id.to_hex() }))
        .await
        .assert_status(StatusCode::CREATED);

    let ids: Vec<String> = server.get(&format!("/users/{id}/savedpostIDs")).await.json();
    assert_eq!(ids, vec![post.id.to_hex()]);

    let posts: Vec<serde_json::Value> = server.get(&format!("/users/{id}/savedposts")).await.json();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["name"].as_str(), Some("Gen rush"));
    assert_eq!(posts[0]["is_saved"].as_bool(), Some(true));
}

#[tokio::test]
async fn posts_by_author() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    env.seed_post("Someone else's", "", &[]).await;

    let user = common::login(&server, "meg", None).await;
    let id = user["id"].as_str().unwrap();
    server
        .post("/newpost")
        .json(&serde_json::json!({
            "name": "Sprint loop",
            "perks": [],
            "type": "Survivor",
        }))
        .await
        .assert_status_ok();

    let posts: Vec<serde_json::Value> = server.get(&format!("/users/{id}/posts")).await.json();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["name"].as_str(), Some("Sprint loop"));
}

#[tokio::test]
async fn follow_and_unfollow() {
    let env = common::TestEnv::start().await;

    let target_server = env.server();
    let target = common::login(&target_server, "jake", None).await;
    let target_id = target["id"].as_str().unwrap();

    let server = env.server();
    common::login(&server, "claudette", None).await;

    let body: serde_json::Value = server
        .post(&format!("/users/{target_id}/follow"))
        .await
        .json();
    assert_eq!(body["message"].as_str(), Some("followed"));

    let profile: serde_json::Value = server.get(&format!("/users/{target_id}")).await.json();
    assert_eq!(profile["followers"].as_i64(), Some(1));

    let me: serde_json::Value = server.get("/getuser").await.json();
    assert_eq!(me["following"], serde_json::json!([target_id]));

    let body: serde_json::Value = server
        .post(&format!("/users/{target_id}/unfollow"))
        .await
        .json();
    assert_eq!(body["message"].as_str(), Some("unfollowed"));

    let profile: serde_json::Value = server.get(&format!("/users/{target_id}")).await.json();
    assert_eq!(profile["followers"].as_i64(), Some(0));
}

#[tokio::test]
async fn follow_requires_sign_in() {
    let env = common::TestEnv::start().await;

    let target_server = env.server();
    let target = common::login(&target_server, "jake", None).await;
    let target_id = target["id"].as_str().unwrap();

    let anonymous = env.server();
    let response = anonymous.post(&format!("/users/{target_id}/follow")).await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn cannot_follow_self() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let me = common::login(&server, "jake", None).await;
    let id = me["id"].as_str().unwrap();

    let response = server.post(&format!("/users/{id}/follow")).await;
    response.assert_status_bad_request();
}
