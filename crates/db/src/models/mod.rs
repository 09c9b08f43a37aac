//! Document models and DTOs.
//!
//! Each submodule contains:
//! - A `Serialize` + `Deserialize` document struct (camelCase on the wire)
//! - A `Deserialize` create DTO, validated with `validator`
//! - Where the resource is mutable, an update DTO with `Option` fields
//!
//! Collection names live next to their model as `COLLECTION`.

pub mod activity;
pub mod admission;
pub mod application;
pub mod chat;
pub mod course;
pub mod event;
pub mod faculty;
pub mod job;
pub mod notification;
pub mod user;
