//! Tarot Consult — guided questionnaire for a symbolic tarot reflection.

pub mod cli;
pub mod config;
pub mod error;
pub mod server;
pub mod wizard;
