pub mod client_detail;
pub mod client_wizard;
pub mod clients;
pub mod components;
pub mod dashboard;
pub mod job_wizard;
pub mod jobs;
