//! Command line front end of blogmark: configuration, CMS entries and the
//! `render` and `serve` subcommands.
pub mod cli;
pub mod cms;
pub mod config;
pub mod error;
pub mod render;
pub mod serve;
