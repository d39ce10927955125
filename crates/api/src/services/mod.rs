pub mod intake;
pub mod reservation;
pub mod role_cache;
