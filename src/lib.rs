pub mod catalog;
pub mod config;
pub mod data;
pub mod engine;
pub mod example;
pub mod exchange;
pub mod list_blocks;
pub mod model;
pub mod schema;
pub mod store;
pub mod sweep;
pub mod templates;
pub mod validate;

#[cfg(feature = "full")]
pub mod run;

#[cfg(feature = "wasm")]
pub mod wasm;
