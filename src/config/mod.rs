//! Configuration loading, parsing, and validation for modsync.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use modsync::config::{parse_config, validate};
//! use std::path::Path;
//!
//! let yaml = "game_dir: /games/siege\nfeed:\n  owner: someone\n";
//! let config = parse_config(yaml, Path::new("config.yml")).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.feed.owner, "someone");
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{
    apply_game_dir_overrides, default_config_path, load_config, load_config_file, parse_config,
    require_game_dir, GAME_DIR_ENV,
};
pub use schema::{Config, ExtractConfig, FeedConfig, LayoutConfig, SelfUpdateConfig};
pub use validator::{validate, validate_config, ValidationError};
