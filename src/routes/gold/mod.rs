mod handler;
pub mod model;

pub use handler::{gold_history, gold_prices};
