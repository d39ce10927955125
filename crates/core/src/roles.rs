//! Well-known role name constants.
//!
//! Roles are minted by the external identity collaborator; this crate only
//! names the claims the queue engine consumes.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_FRONTDESK: &str = "frontdesk";
