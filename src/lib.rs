#![allow(clippy::uninlined_format_args)]

pub mod actions;
pub mod app;
pub mod cheapshark;
pub mod config;
pub mod data;
pub mod fetch;
pub mod gamerpower;
pub mod logging;
pub mod model;
pub mod news;
pub mod normalize;
pub mod scheduler;
pub mod store;
pub mod ui;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
