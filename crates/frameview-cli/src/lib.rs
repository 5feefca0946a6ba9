//! CLI library components for the frameview viewer.

pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
pub mod logging;
pub mod render;
