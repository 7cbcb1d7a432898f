use crate::dtos::{CreateProblemRequest, ProblemIdParams, ProblemListResponse, ProblemResponse};
use crate::models::Problem;
use crate::services::RegistryError;
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::stream::TryStreamExt;
use metrics::counter;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::Collection;
use serde_json::{json, Map, Value};

/// Fields a PATCH body may touch. `id`, `timestamp`, `isLoop` and
/// `loopOrder` are fixed at creation.
const ALLOWED_UPDATES: [&str; 5] = ["name", "grade", "grips", "author", "comment"];

fn collection_token(collection: &Option<Path<String>>) -> Option<&str> {
    collection.as_ref().map(|Path(name)| name.as_str())
}

fn invalid_collection_response(err: &RegistryError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

fn server_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Server error" })),
    )
        .into_response()
}

fn is_duplicate_key_error(err: &mongodb::error::Error) -> bool {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) => write_error.code == 11000,
        _ => false,
    }
}

/// GET /problem-list and /problem-list/:collection
///
/// Returns every problem in the target collection, unordered. Storage
/// faults are logged and answered with an empty 500.
pub async fn list_problems(
    State(state): State<AppState>,
    collection: Option<Path<String>>,
) -> Response {
    counter!("problem_requests_total", "operation" => "list").increment(1);

    let problems = match state.registry.resolve(collection_token(&collection)).await {
        Ok(c) => c,
        Err(err @ (RegistryError::InvalidName(_) | RegistryError::AtCapacity)) => {
            return invalid_collection_response(&err);
        }
        Err(RegistryError::Database(e)) => {
            tracing::error!("Error getting problem list: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut cursor = match problems.find(doc! {}, None).await {
        Ok(cursor) => cursor,
        Err(e) => {
            tracing::error!("Error getting problem list: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut problem_list = Vec::new();
    loop {
        match cursor.try_next().await {
            Ok(Some(problem)) => problem_list.push(ProblemResponse::from(problem)),
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Error getting problem list: {}", e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    (StatusCode::OK, Json(ProblemListResponse { problem_list })).into_response()
}

/// POST /problem and /problem/:collection
///
/// Assigns the id and creation timestamp, inserts, and answers 200 with an
/// empty body. A duplicate name is reported to the caller; any other
/// persistence fault is logged and answered generically.
pub async fn create_problem(
    State(state): State<AppState>,
    collection: Option<Path<String>>,
    Json(body): Json<CreateProblemRequest>,
) -> Response {
    counter!("problem_requests_total", "operation" => "create").increment(1);

    let problems = match state.registry.resolve(collection_token(&collection)).await {
        Ok(c) => c,
        Err(err @ (RegistryError::InvalidName(_) | RegistryError::AtCapacity)) => {
            return invalid_collection_response(&err);
        }
        Err(RegistryError::Database(e)) => {
            tracing::error!("Error saving problem: {}", e);
            return server_error_response();
        }
    };

    let mut problem = Problem::from(body);
    problem.touch_timestamp();

    match problems.insert_one(&problem, None).await {
        Ok(_) => {
            tracing::info!(
                problem_id = %problem.id,
                name = %problem.name,
                collection = %problems.name(),
                "Problem created"
            );
            StatusCode::OK.into_response()
        }
        Err(e) if is_duplicate_key_error(&e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Problem name must be unique" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error saving problem: {}", e);
            server_error_response()
        }
    }
}

/// PATCH /problem?id= and /problem/:collection?id=
///
/// Rejects the whole request before touching storage when any body key
/// falls outside the allow-list. The fetch-modify-save sequence is not
/// transactionally isolated; concurrent updates race and the later write
/// wins.
pub async fn update_problem(
    State(state): State<AppState>,
    collection: Option<Path<String>>,
    Query(params): Query<ProblemIdParams>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    counter!("problem_requests_total", "operation" => "update").increment(1);

    let is_valid_operation = body
        .keys()
        .all(|key| ALLOWED_UPDATES.contains(&key.as_str()));

    if !is_valid_operation {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid updates!" })),
        )
            .into_response();
    }

    let problems = match state.registry.resolve(collection_token(&collection)).await {
        Ok(c) => c,
        Err(err @ (RegistryError::InvalidName(_) | RegistryError::AtCapacity)) => {
            return invalid_collection_response(&err);
        }
        Err(RegistryError::Database(e)) => {
            tracing::error!(problem_id = %params.id, "Error updating problem: {}", e);
            return server_error_response();
        }
    };

    let mut problem = match problems.find_one(doc! { "_id": &params.id }, None).await {
        Ok(Some(problem)) => problem,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::error!(problem_id = %params.id, "Error updating problem: {}", e);
            return server_error_response();
        }
    };

    if let Err(rejection) = apply_updates(&mut problem, body) {
        return rejection;
    }

    // Re-runs timestamp assignment; a no-op for a persisted document.
    problem.touch_timestamp();

    match problems
        .replace_one(doc! { "_id": &problem.id }, &problem, None)
        .await
    {
        Ok(_) => {
            tracing::info!(
                problem_id = %problem.id,
                collection = %problems.name(),
                "Problem updated"
            );
            (StatusCode::OK, Json(ProblemResponse::from(problem))).into_response()
        }
        Err(e) => {
            tracing::error!(problem_id = %params.id, "Error updating problem: {}", e);
            server_error_response()
        }
    }
}

fn apply_updates(problem: &mut Problem, body: Map<String, Value>) -> Result<(), Response> {
    for (key, value) in body {
        let applied = match key.as_str() {
            "name" => serde_json::from_value::<String>(value).map(|v| problem.name = v),
            "grade" => serde_json::from_value::<String>(value).map(|v| problem.grade = v),
            "author" => serde_json::from_value::<String>(value).map(|v| problem.author = v),
            // A present key with null clears the comment
            "comment" => {
                serde_json::from_value::<Option<String>>(value).map(|v| problem.comment = v)
            }
            "grips" => serde_json::from_value(value).map(|v| problem.grips = v),
            // Keys were validated against the allow-list before the fetch
            _ => Ok(()),
        };

        if let Err(e) = applied {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Invalid value for {}: {}", key, e) })),
            )
                .into_response());
        }
    }
    Ok(())
}

/// DELETE /problem?id= and /problem/:collection?id=
pub async fn delete_problem(
    State(state): State<AppState>,
    collection: Option<Path<String>>,
    Query(params): Query<ProblemIdParams>,
) -> Response {
    counter!("problem_requests_total", "operation" => "delete").increment(1);

    let problems: Collection<Problem> =
        match state.registry.resolve(collection_token(&collection)).await {
            Ok(c) => c,
            Err(err @ (RegistryError::InvalidName(_) | RegistryError::AtCapacity)) => {
                return invalid_collection_response(&err);
            }
            Err(RegistryError::Database(e)) => {
                tracing::error!(problem_id = %params.id, "Error deleting problem: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error deleting problem with id {}", params.id),
                )
                    .into_response();
            }
        };

    match problems
        .find_one_and_delete(doc! { "_id": &params.id }, None)
        .await
    {
        Ok(Some(_)) => {
            tracing::info!(
                problem_id = %params.id,
                collection = %problems.name(),
                "Problem deleted"
            );
            (
                StatusCode::OK,
                format!("Problem with id {} deleted", params.id),
            )
                .into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            format!("Problem with id {} not found", params.id),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(problem_id = %params.id, "Error deleting problem: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error deleting problem with id {}", params.id),
            )
                .into_response()
        }
    }
}
