pub mod admissions;
pub mod applications;
pub mod auth;
pub mod broadcast;
pub mod campus_events;
pub mod courses;
pub mod jobs;
pub mod notifications;
pub mod student;
pub mod students;
pub mod summaries;
