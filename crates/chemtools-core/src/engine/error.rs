use thiserror::Error;

use super::config::ConfigError;
use crate::core::dose::SpeciesLoadError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to load species table: {source}")]
    Species {
        #[from]
        source: SpeciesLoadError,
    },

    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    #[error("Unknown tool '{tool}' in category '{category}'")]
    UnknownTool { category: String, tool: String },

    #[error("Category '{0}' is registered twice")]
    DuplicateCategory(String),

    #[error("Tool '{tool}' is registered twice in category '{category}'")]
    DuplicateTool { category: String, tool: String },
}
