mod common;

fn perk_update(name: &str, img_url: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "description": format!("{name} description"),
        "owner": "Meg Thomas",
        "role": "Survivor",
        "img_url": img_url,
    })
}

#[tokio::test]
async fn perk_defs_requires_admin() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    server.get("/perkDefs").await.assert_status_unauthorized();

    common::login(&server, "meg", None).await;
    server.get("/perkDefs").await.assert_status_forbidden();
}

#[tokio::test]
async fn perk_defs_parses_asset() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    common::login(&server, "admin", Some("admin")).await;

    let response = server.get("/perkDefs").await;
    response.assert_status_ok();

    let defs: Vec<serde_json::Value> = response.json();
    assert!(!defs.is_empty());
    assert_eq!(defs[0]["name"].as_str(), Some("Sprint Burst"));
    assert_eq!(defs[0]["owner"].as_str(), Some("Meg Thomas"));
    assert_eq!(defs[0]["role"].as_str(), Some("Survivor"));
    for def in &defs {
        for field in ["name", "description", "owner", "role"] {
            assert!(!def[field].as_str().unwrap().is_empty());
        }
    }

    // Parsing never writes to the store.
    let perks: Vec<serde_json::Value> = server.get("/perks").await.json();
    assert!(perks.is_empty());
}

#[tokio::test]
async fn update_perks_upserts_by_name() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    common::login(&server, "admin", Some("admin")).await;

    let response = server
        .post("/updatePerks")
        .json(&serde_json::json!([
            perk_update("Sprint Burst", None),
            perk_update("Adrenaline", Some("https://img.example/adrenaline.png")),
        ]))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["upserted"].as_u64(), Some(2));

    // Same name again replaces rather than duplicates.
    server
        .post("/updatePerks")
        .json(&serde_json::json!([perk_update("Adrenaline", None)]))
        .await
        .assert_status_ok();

    let perks: Vec<serde_json::Value> = server.get("/perks").await.json();
    let names: Vec<&str> = perks.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Adrenaline", "Sprint Burst"]);
}

#[tokio::test]
async fn update_perks_forbidden_for_users() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    common::login(&server, "meg", None).await;

    let response = server
        .post("/updatePerks")
        .json(&serde_json::json!([perk_update("Sprint Burst", None)]))
        .await;
    response.assert_status_forbidden();

    let perks: Vec<serde_json::Value> = server.get("/perks").await.json();
    assert!(perks.is_empty());
}
