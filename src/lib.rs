pub mod config;
pub mod debounce;
pub mod feed;
pub mod fetch;
pub mod metrics;
pub mod models;
pub mod server;
pub mod state;
pub mod store;
