pub mod app;
pub mod auth;
pub mod config;
pub mod errors;
pub mod events;
pub mod gallery;
pub mod gateway;
pub mod handlers;
pub mod login;
pub mod models;
pub mod normalize;
pub mod polling;
pub mod progress;
pub mod routes;
pub mod session;
pub mod storage;
pub mod tracker;
pub mod ui;
pub mod week;

pub use app::App;
pub use config::Config;
pub use errors::ApiError;
pub use storage::KeyValueStore;
