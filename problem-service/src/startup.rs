use crate::config::ProblemConfig;
use crate::handlers;
use crate::services::{CollectionRegistry, MongoDb};
use axum::{
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: ProblemConfig,
    pub db: MongoDb,
    pub registry: Arc<CollectionRegistry>,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: ProblemConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;

        let registry = Arc::new(CollectionRegistry::new(db.database().clone()));

        // Bind the default collection up front so its unique name index
        // exists before the first request.
        registry.resolve(None).await.map_err(|e| {
            tracing::error!("Failed to initialize default problem collection: {}", e);
            AppError::from(e)
        })?;

        let state = AppState {
            config: config.clone(),
            db: db.clone(),
            registry,
        };

        // The original deployment fronts a browser client, hence permissive CORS.
        let app = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics_endpoint))
            .route("/problem-list", get(handlers::list_problems))
            .route("/problem-list/:collection", get(handlers::list_problems))
            .route(
                "/problem",
                post(handlers::create_problem)
                    .patch(handlers::update_problem)
                    .delete(handlers::delete_problem),
            )
            .route(
                "/problem/:collection",
                post(handlers::create_problem)
                    .patch(handlers::update_problem)
                    .delete(handlers::delete_problem),
            )
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn db(&self) -> &MongoDb {
        &self.state.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
