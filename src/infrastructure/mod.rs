pub mod item_repo;
pub mod memory;
pub mod models;
pub mod order_repo;
pub mod rest_client;
