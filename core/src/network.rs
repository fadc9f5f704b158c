pub mod raw;
pub mod route;
pub mod router;
pub mod transport;
