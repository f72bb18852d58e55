use chemtools::engine::config::SuiteConfig;
use std::path::PathBuf;

#[derive(Debug)]
pub struct AppConfig {
    pub suite: SuiteConfig,
    /// Directory relative embed sources are resolved against.
    pub assets_dir: Option<PathBuf>,
    /// The file the configuration was read from, if any.
    pub source: Option<PathBuf>,
}
