mod handler;

pub use handler::{health, version_check};
