pub mod item_store;
pub mod publisher;
