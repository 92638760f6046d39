pub mod candidate_service;
pub mod delivery_service;
pub mod dispatch_service;
pub mod interview_service;
pub mod sweep_service;
