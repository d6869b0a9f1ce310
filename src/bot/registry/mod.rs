pub mod definition;
pub mod loader;
pub mod manager;
pub mod store;
pub mod sync;
