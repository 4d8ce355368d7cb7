mod handler;
mod model;

pub use handler::{get_all_store_info, get_store_info_by_key};
