mod common;

use common::{sample_problem, TestApp};
use reqwest::{Client, StatusCode};

#[tokio::test]
async fn empty_collection_lists_as_empty_array() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/problem-list", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, response.status());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["problemList"], serde_json::json!([]));

    app.cleanup().await;
}

#[tokio::test]
async fn list_returns_every_problem() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    for name in ["Crux", "Slopey Traverse", "Deadpoint"] {
        let response = client
            .post(format!("{}/problem", app.address))
            .json(&sample_problem(name))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(StatusCode::OK, response.status());
    }

    let body: serde_json::Value = client
        .get(format!("{}/problem-list", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    let problems = body["problemList"].as_array().expect("problemList missing");
    assert_eq!(problems.len(), 3);

    let mut names: Vec<&str> = problems
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Crux", "Deadpoint", "Slopey Traverse"]);

    // The opaque grips payload round-trips untouched
    let crux = problems
        .iter()
        .find(|p| p["name"] == "Crux")
        .expect("Crux missing from list");
    assert_eq!(crux["grips"]["finish"], "J12");

    app.cleanup().await;
}
