pub mod gold;
pub mod health;
pub mod rates;
