use crate::models::Problem;
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Create payload. Presence of the required fields is the only validation
/// the service performs; `grips` and `loopOrder` entries stay opaque.
#[derive(Debug, Deserialize)]
pub struct CreateProblemRequest {
    pub name: String,
    pub grade: String,
    pub grips: Document,
    pub author: String,
    pub comment: Option<String>,
    #[serde(rename = "isLoop")]
    pub is_loop: Option<bool>,
    #[serde(rename = "loopOrder")]
    pub loop_order: Option<Vec<Bson>>,
}

impl From<CreateProblemRequest> for Problem {
    fn from(req: CreateProblemRequest) -> Self {
        Problem {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            grade: req.grade,
            grips: req.grips,
            author: req.author,
            comment: req.comment,
            is_loop: req.is_loop,
            loop_order: req.loop_order,
            // Assigned by the save path at first persistence
            timestamp: None,
        }
    }
}

/// `?id=` query parameter shared by the update and delete routes.
#[derive(Debug, Deserialize)]
pub struct ProblemIdParams {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProblemResponse {
    pub id: String,
    pub name: String,
    pub grade: String,
    pub grips: Document,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "isLoop", skip_serializing_if = "Option::is_none")]
    pub is_loop: Option<bool>,
    #[serde(rename = "loopOrder", skip_serializing_if = "Option::is_none")]
    pub loop_order: Option<Vec<Bson>>,
    /// RFC 3339; always present for persisted documents.
    pub timestamp: Option<String>,
}

impl From<Problem> for ProblemResponse {
    fn from(problem: Problem) -> Self {
        Self {
            id: problem.id,
            name: problem.name,
            grade: problem.grade,
            grips: problem.grips,
            author: problem.author,
            comment: problem.comment,
            is_loop: problem.is_loop,
            loop_order: problem.loop_order,
            timestamp: problem.timestamp.map(|t| t.to_chrono().to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProblemListResponse {
    #[serde(rename = "problemList")]
    pub problem_list: Vec<ProblemResponse>,
}
