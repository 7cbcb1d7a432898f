mod common;

use common::{sample_problem, TestApp};
use mongodb::bson::doc;
use reqwest::{Client, StatusCode};
use serde_json::json;

async fn create_and_fetch_id(app: &TestApp, client: &Client, name: &str) -> String {
    let response = client
        .post(format!("{}/problem", app.address))
        .json(&sample_problem(name))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, response.status());

    app.problems("problems")
        .find_one(doc! { "name": name }, None)
        .await
        .unwrap()
        .expect("Problem not found in DB")
        .id
}

#[tokio::test]
async fn update_changes_allowed_fields_and_keeps_timestamp() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let id = create_and_fetch_id(&app, &client, "Crux").await;
    let created = app
        .problems("problems")
        .find_one(doc! { "_id": &id }, None)
        .await
        .unwrap()
        .unwrap();
    let original_timestamp = created.timestamp.expect("timestamp missing after create");

    let response = client
        .patch(format!("{}/problem?id={}", app.address, id))
        .json(&json!({
            "grade": "7c+",
            "comment": "reset after hold spin",
            "grips": { "start": "B7" }
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, response.status());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["name"], "Crux");
    assert_eq!(body["grade"], "7c+");
    assert_eq!(body["comment"], "reset after hold spin");
    assert_eq!(body["grips"]["start"], "B7");

    // Re-saving must not move the creation timestamp
    let stored = app
        .problems("problems")
        .find_one(doc! { "_id": &id }, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.timestamp, Some(original_timestamp));
    assert_eq!(stored.grade, "7c+");

    app.cleanup().await;
}

#[tokio::test]
async fn disallowed_key_rejects_the_entire_update() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let id = create_and_fetch_id(&app, &client, "Crux").await;

    // One allowed key, one disallowed: nothing may change
    let response = client
        .patch(format!("{}/problem?id={}", app.address, id))
        .json(&json!({ "grade": "8a", "isLoop": true }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Invalid updates!");

    let stored = app
        .problems("problems")
        .find_one(doc! { "_id": &id }, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.grade, "7a", "allowed key in a rejected request must not apply");
    assert_eq!(stored.is_loop, None);

    app.cleanup().await;
}

#[tokio::test]
async fn update_of_missing_id_returns_not_found() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .patch(format!("{}/problem?id=no-such-id", app.address))
        .json(&json!({ "grade": "8a" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::NOT_FOUND, response.status());
    let body = response.text().await.expect("Failed to read body");
    assert!(body.is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn null_comment_clears_the_field() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let id = create_and_fetch_id(&app, &client, "Crux").await;

    let set = client
        .patch(format!("{}/problem?id={}", app.address, id))
        .json(&json!({ "comment": "flash candidate" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, set.status());

    let clear = client
        .patch(format!("{}/problem?id={}", app.address, id))
        .json(&json!({ "comment": null }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, clear.status());

    let stored = app
        .problems("problems")
        .find_one(doc! { "_id": &id }, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.comment, None);

    app.cleanup().await;
}

#[tokio::test]
async fn wrongly_typed_value_is_rejected() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let id = create_and_fetch_id(&app, &client, "Crux").await;

    let response = client
        .patch(format!("{}/problem?id={}", app.address, id))
        .json(&json!({ "grade": 42 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    let stored = app
        .problems("problems")
        .find_one(doc! { "_id": &id }, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.grade, "7a");

    app.cleanup().await;
}
