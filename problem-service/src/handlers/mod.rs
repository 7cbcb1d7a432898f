pub mod health;
pub mod problems;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use problems::{create_problem, delete_problem, list_problems, update_problem};
