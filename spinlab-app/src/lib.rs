pub mod app;
pub mod command;
pub mod config;
pub mod db;
pub mod network;
pub mod panel;
pub mod tracing;
