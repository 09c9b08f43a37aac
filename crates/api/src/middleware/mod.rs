//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Verifies the bearer token against the identity provider.
//! - [`rbac::RequireStudent`] -- Requires the `student` role.
//! - [`rbac::RequireInstitution`] -- Requires the `institution` role.
//! - [`rbac::RequireCompany`] -- Requires the `company` role.

pub mod auth;
pub mod rbac;
