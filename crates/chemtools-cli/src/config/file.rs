use crate::error::{CliError, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileEmbedsConfig {
    #[serde(rename = "threedmol-url")]
    pub threedmol_url: Option<String>,
    #[serde(rename = "sortable-url")]
    pub sortable_url: Option<String>,
    #[serde(rename = "nmrium-url")]
    pub nmrium_url: Option<String>,
    #[serde(rename = "ketcher-url")]
    pub ketcher_url: Option<String>,
    #[serde(rename = "assets-dir")]
    pub assets_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileViewerConfig {
    #[serde(rename = "default-pdb")]
    pub default_pdb: Option<String>,
    #[serde(rename = "share-base-url")]
    pub share_base_url: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileDoseConfig {
    /// TOML table of extra species, `[name] weight-kg = ...`.
    #[serde(rename = "species-file")]
    pub species_file: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(rename = "default-category")]
    pub default_category: Option<String>,
    pub embeds: Option<FileEmbedsConfig>,
    pub viewer: Option<FileViewerConfig>,
    pub dose: Option<FileDoseConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// `config.toml` in the per-user configuration directory, if one exists.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "chemtools", "chemtools")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_all_sections() {
        let config = FileConfig::from_toml_str(
            r#"
            default-category = "pk"

            [embeds]
            threedmol-url = "vendor/3Dmol-min.js"
            ketcher-url = "https://example.org/ketcher/index.html"
            assets-dir = "static"

            [viewer]
            default-pdb = "1CRN"
            share-base-url = "viewer.html"

            [dose]
            species-file = "species.toml"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_category.as_deref(), Some("pk"));
        let embeds = config.embeds.unwrap();
        assert_eq!(embeds.threedmol_url.as_deref(), Some("vendor/3Dmol-min.js"));
        assert_eq!(embeds.assets_dir, Some(PathBuf::from("static")));
        assert!(embeds.nmrium_url.is_none());
        assert_eq!(config.viewer.unwrap().default_pdb.as_deref(), Some("1CRN"));
        assert_eq!(
            config.dose.unwrap().species_file,
            Some(PathBuf::from("species.toml"))
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::from_toml_str("[viewer]\ndefault_pdb = \"1CRN\"\n").is_err());
        assert!(FileConfig::from_toml_str("theme = \"dark\"\n").is_err());
    }

    #[test]
    fn from_file_reports_path_on_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[embeds\n").unwrap();

        let err = FileConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = FileConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
