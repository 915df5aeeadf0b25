//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`cache`] - Cache management (stats, clear)
//! - [`config`] - Configuration file management (init, path)
//! - [`query`] - Direct queries (route, table, trip, match, nearest)
//! - [`reachability`] - Grid reachability around an origin
//! - [`output`] - JSON and one-line output shared by the above

pub mod cache;
pub mod config;
pub mod output;
pub mod query;
pub mod reachability;
