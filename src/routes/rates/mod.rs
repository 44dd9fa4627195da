mod handler;
pub mod model;

pub use handler::latest_rates;
