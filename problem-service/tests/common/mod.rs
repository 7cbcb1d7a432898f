use problem_service::config::ProblemConfig;
use problem_service::models::Problem;
use problem_service::services::MongoDb;
use problem_service::startup::Application;
use serde_json::json;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub db: MongoDb,
    pub db_name: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        std::env::set_var("MONGODB_URI", "mongodb://localhost:27017");

        let db_name = format!("problem_test_{}", Uuid::new_v4());

        let mut config = ProblemConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.mongodb.database = db_name.clone();

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address,
            db,
            db_name,
        }
    }

    /// Direct handle to a problem collection for DB-level assertions.
    pub fn problems(&self, collection: &str) -> mongodb::Collection<Problem> {
        self.db.database().collection::<Problem>(collection)
    }

    /// Cleanup test resources (drop the per-test database).
    pub async fn cleanup(&self) {
        let _ = self.db.client().database(&self.db_name).drop(None).await;
    }
}

/// A valid create payload with the given name.
pub fn sample_problem(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "grade": "7a",
        "grips": { "start": ["L3", "R4"], "finish": "J12" },
        "author": "Ann"
    })
}
