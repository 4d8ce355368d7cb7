mod handler;
mod model;

pub use handler::buffet_items;
