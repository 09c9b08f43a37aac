//! Event type names published on the bus.

pub const APPLICATION_SUBMITTED: &str = "application.submitted";
pub const APPLICATION_REVIEWED: &str = "application.reviewed";
pub const ADMISSION_UPDATED: &str = "admission.updated";
pub const COURSE_STATUS_CHANGED: &str = "course.status_changed";
pub const BROADCAST_SENT: &str = "broadcast.sent";
pub const EVENT_RSVP: &str = "event.rsvp";
pub const PROFILE_UPDATED: &str = "profile.updated";
pub const JOB_POSTED: &str = "job.posted";
