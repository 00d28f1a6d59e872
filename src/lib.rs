//! Helpers for deploying Heroku applications described by per-application
//! profile files.

pub mod clap_parser;
pub mod command_processor;
pub mod git;
pub mod heroku;
pub mod profile;
pub mod promotion_graph;
pub mod secrets;
pub mod settings;
pub mod shell;
pub mod version;
