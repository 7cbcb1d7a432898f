mod common;

use common::{sample_problem, TestApp};
use mongodb::bson::doc;
use reqwest::{Client, StatusCode};

#[tokio::test]
async fn delete_removes_the_problem() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let create = client
        .post(format!("{}/problem", app.address))
        .json(&sample_problem("Crux"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, create.status());

    let id = app
        .problems("problems")
        .find_one(doc! { "name": "Crux" }, None)
        .await
        .unwrap()
        .expect("Problem not found in DB")
        .id;

    let response = client
        .delete(format!("{}/problem?id={}", app.address, id))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, response.status());
    let body = response.text().await.expect("Failed to read body");
    assert_eq!(body, format!("Problem with id {} deleted", id));

    // Gone from the list
    let list: serde_json::Value = client
        .get(format!("{}/problem-list", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(list["problemList"], serde_json::json!([]));

    app.cleanup().await;
}

#[tokio::test]
async fn delete_of_missing_id_returns_not_found() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .delete(format!("{}/problem?id=no-such-id", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::NOT_FOUND, response.status());
    let body = response.text().await.expect("Failed to read body");
    assert_eq!(body, "Problem with id no-such-id not found");

    app.cleanup().await;
}
