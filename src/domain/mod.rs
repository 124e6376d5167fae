pub mod catalog;
pub mod errors;
pub mod item;
pub mod order;
pub mod ports;
