pub mod problems;

pub use problems::{
    CreateProblemRequest, ProblemIdParams, ProblemListResponse, ProblemResponse,
};
