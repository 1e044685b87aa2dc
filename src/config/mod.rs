//! Configuration module for wrc-harvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and building the immutable [`RunContext`] handed to the pipeline.
//!
//! # Example
//!
//! ```no_run
//! use wrc_harvest::config::{load_config, RunContext};
//! use wrc_harvest::window::DateWindow;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! let window = DateWindow::parse("01-01-2024", "31-01-2024").unwrap();
//! let ctx = RunContext::new(&config, window);
//! println!("Seeds: {:?}", ctx.seed_urls());
//! ```

mod context;
mod parser;
mod types;
mod validation;

pub use context::RunContext;
pub use types::{Config, CrawlerConfig, SiteConfig, StoreConfig, UserAgentConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
