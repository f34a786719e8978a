//! Configuration for the geomipmapping terrain demo.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line. Unknown and missing fields are tolerated so config files
//! survive version changes.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, Config, DebugConfig, HeightSource, HeightfieldConfig, TerrainConfig,
    ViewerConfig,
};
pub use error::ConfigError;
