pub mod candidate_routes;
pub mod health;
pub mod interview_routes;
