mod auth;
mod error_handler;
mod version_gate;

pub use auth::auth_middleware;
pub use error_handler::log_errors;
pub use version_gate::version_gate;
