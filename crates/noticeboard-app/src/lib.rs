pub mod error;
pub mod rest_api;
pub mod session;
pub mod state;
pub mod validate;
