#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

pub mod checker;
pub mod config;
pub mod db;
pub mod history;
pub mod http;
pub mod report;
pub mod rest;
