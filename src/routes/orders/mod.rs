mod handler;
mod model;

pub use handler::{order_details, order_history, submit_order};
