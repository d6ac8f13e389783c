pub mod api;
pub mod board;
pub mod config;
pub mod errors;
pub mod logging;
pub mod push;
pub mod session;
pub mod ui;
pub mod util;
