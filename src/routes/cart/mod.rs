mod handler;
mod model;

pub use handler::cart;
pub use model::{CartLine, CartLineItem, CartOrder, OwnerIdentity, cart_total};
