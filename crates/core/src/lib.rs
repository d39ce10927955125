//! Dependency-light domain crate for the medq queue platform.
//!
//! Holds the pieces shared by the persistence and HTTP layers:
//! type aliases, the domain error taxonomy, the token status state
//! machine, booking-source constants, role names and fee computation.

pub mod error;
pub mod fees;
pub mod roles;
pub mod source;
pub mod status;
pub mod types;
