mod handler;
pub mod model;

pub use handler::health_check;
