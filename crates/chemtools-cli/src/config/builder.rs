use super::defaults::DefaultsConfig;
use super::file::{self, FileConfig};
use super::models::AppConfig;
use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use chemtools::core::dose::SpeciesTable;
use chemtools::engine::config::SuiteConfigBuilder;
use chemtools::engine::error::EngineError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Values given as explicit command-line flags. They win over `--set`, the file and the defaults.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub default_category: Option<String>,
    pub default_pdb: Option<String>,
    pub assets_dir: Option<PathBuf>,
}

/// Merges defaults, the config file, `--set` values and flag overrides, in that order.
///
/// Without `--config`, `config.toml` from the user's configuration directory is read when it
/// exists. Relative paths inside the file are resolved against the file's directory; paths given
/// through `--set` or flags are taken relative to the working directory.
pub fn build_config(args: &ConfigArgs, overrides: &ConfigOverrides) -> Result<AppConfig> {
    let source = args.path.clone().or_else(file::default_config_path);
    let file_config = match &source {
        Some(path) => {
            let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
            anchor_paths(FileConfig::from_file(path)?, base_dir)
        }
        None => {
            debug!("No configuration file found, using built-in defaults.");
            FileConfig::default()
        }
    };

    let mut app = merge(file_config, &args.set_values, overrides)?;
    app.source = source;
    Ok(app)
}

fn merge(
    file_config: FileConfig,
    set_values: &[String],
    overrides: &ConfigOverrides,
) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = apply_set_values(file_config, set_values)?;

    let embeds = file_config.embeds.take().unwrap_or_default();
    let viewer = file_config.viewer.take().unwrap_or_default();
    let dose = file_config.dose.take().unwrap_or_default();

    let species = match dose.species_file {
        Some(path) => {
            info!("Loading additional species from {:?}", &path);
            SpeciesTable::load(&path).map_err(EngineError::from)?
        }
        None => SpeciesTable::standard(),
    };

    let default_category = overrides
        .default_category
        .clone()
        .or(file_config.default_category);
    let default_pdb = overrides
        .default_pdb
        .clone()
        .or(viewer.default_pdb)
        .unwrap_or(defaults.default_pdb);

    let suite = SuiteConfigBuilder::new()
        .default_category(default_category)
        .threedmol_url(embeds.threedmol_url.unwrap_or(defaults.threedmol_url))
        .sortable_url(embeds.sortable_url.unwrap_or(defaults.sortable_url))
        .nmrium_url(embeds.nmrium_url.unwrap_or(defaults.nmrium_url))
        .ketcher_url(embeds.ketcher_url.unwrap_or(defaults.ketcher_url))
        .default_pdb(default_pdb)
        .share_base_url(viewer.share_base_url.unwrap_or(defaults.share_base_url))
        .species(species)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let assets_dir = overrides
        .assets_dir
        .clone()
        .or(embeds.assets_dir);

    Ok(AppConfig {
        suite,
        assets_dir,
        source: None,
    })
}

fn anchor_paths(mut config: FileConfig, base_dir: &Path) -> FileConfig {
    if let Some(embeds) = config.embeds.as_mut() {
        embeds.assets_dir = embeds.assets_dir.take().map(|p| resolve_relative(p, base_dir));
    }
    if let Some(dose) = config.dose.as_mut() {
        dose.species_file = dose.species_file.take().map(|p| resolve_relative(p, base_dir));
    }
    config
}

fn resolve_relative(path: PathBuf, base_dir: &Path) -> PathBuf {
    if path.is_relative() {
        base_dir.join(path)
    } else {
        path
    }
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let value = value.to_string();
        debug!(key, value = %value, "Applying --set override.");

        match key {
            "default-category" => config.default_category = Some(value),
            "embeds.threedmol-url" => {
                config
                    .embeds
                    .get_or_insert_with(Default::default)
                    .threedmol_url = Some(value)
            }
            "embeds.sortable-url" => {
                config
                    .embeds
                    .get_or_insert_with(Default::default)
                    .sortable_url = Some(value)
            }
            "embeds.nmrium-url" => {
                config.embeds.get_or_insert_with(Default::default).nmrium_url = Some(value)
            }
            "embeds.ketcher-url" => {
                config
                    .embeds
                    .get_or_insert_with(Default::default)
                    .ketcher_url = Some(value)
            }
            "embeds.assets-dir" => {
                config.embeds.get_or_insert_with(Default::default).assets_dir =
                    Some(PathBuf::from(value))
            }
            "viewer.default-pdb" => {
                config
                    .viewer
                    .get_or_insert_with(Default::default)
                    .default_pdb = Some(value)
            }
            "viewer.share-base-url" => {
                config
                    .viewer
                    .get_or_insert_with(Default::default)
                    .share_base_url = Some(value)
            }
            "dose.species-file" => {
                config.dose.get_or_insert_with(Default::default).species_file =
                    Some(PathBuf::from(value))
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemtools::engine::config::{DEFAULT_NMRIUM_URL, DEFAULT_PDB_ID, DEFAULT_THREEDMOL_URL};
    use std::fs;
    use tempfile::tempdir;

    fn args_for(path: &Path, set_values: &[&str]) -> ConfigArgs {
        ConfigArgs {
            path: Some(path.to_path_buf()),
            set_values: set_values.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn build_in_memory(set_values: &[&str], overrides: &ConfigOverrides) -> Result<AppConfig> {
        let set_values: Vec<String> = set_values.iter().map(|s| s.to_string()).collect();
        merge(FileConfig::default(), &set_values, overrides)
    }

    #[test]
    fn defaults_fill_every_value() {
        let app = build_in_memory(&[], &ConfigOverrides::default()).unwrap();
        let suite = app.suite;
        assert_eq!(suite.default_category, None);
        assert_eq!(suite.embeds.threedmol, DEFAULT_THREEDMOL_URL);
        assert_eq!(suite.embeds.nmrium, DEFAULT_NMRIUM_URL);
        assert_eq!(suite.viewer.pdb_id, DEFAULT_PDB_ID);
        assert_eq!(suite.species.weight("mouse"), Some(0.02));
        assert!(app.assets_dir.is_none());
    }

    #[test]
    fn file_values_are_merged_and_paths_resolved_against_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("species.toml"),
            "[hamster]\nweight-kg = 0.12\n",
        )
        .unwrap();
        let cfg_path = dir.path().join("suite.toml");
        fs::write(
            &cfg_path,
            r#"
            default-category = "pk"

            [embeds]
            nmrium-url = "https://nmr.example.org/"
            assets-dir = "static"

            [viewer]
            default-pdb = "1CRN"

            [dose]
            species-file = "species.toml"
            "#,
        )
        .unwrap();

        let app = build_config(&args_for(&cfg_path, &[]), &ConfigOverrides::default()).unwrap();
        assert_eq!(app.source.as_deref(), Some(cfg_path.as_path()));
        assert_eq!(app.suite.default_category.as_deref(), Some("pk"));
        assert_eq!(app.suite.embeds.nmrium, "https://nmr.example.org/");
        assert_eq!(app.suite.embeds.threedmol, DEFAULT_THREEDMOL_URL);
        assert_eq!(app.suite.viewer.pdb_id, "1CRN");
        assert_eq!(app.suite.species.weight("hamster"), Some(0.12));
        assert_eq!(app.assets_dir, Some(dir.path().join("static")));
    }

    #[test]
    fn set_values_override_file_and_flags_override_set_values() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("suite.toml");
        fs::write(&cfg_path, "[viewer]\ndefault-pdb = \"1CRN\"\n").unwrap();

        let args = args_for(
            &cfg_path,
            &["viewer.default-pdb=4HHB", "default-category=spectroscopy"],
        );
        let app = build_config(&args, &ConfigOverrides::default()).unwrap();
        assert_eq!(app.suite.viewer.pdb_id, "4HHB");
        assert_eq!(app.suite.default_category.as_deref(), Some("spectroscopy"));

        let overrides = ConfigOverrides {
            default_pdb: Some("6LU7".to_string()),
            default_category: Some("medchem".to_string()),
            assets_dir: Some(PathBuf::from("/srv/assets")),
        };
        let app = build_config(&args, &overrides).unwrap();
        assert_eq!(app.suite.viewer.pdb_id, "6LU7");
        assert_eq!(app.suite.default_category.as_deref(), Some("medchem"));
        assert_eq!(app.assets_dir, Some(PathBuf::from("/srv/assets")));
    }

    #[test]
    fn set_paths_stay_relative_to_working_directory() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("suite.toml");
        fs::write(&cfg_path, "[embeds]\nassets-dir = \"static\"\n").unwrap();

        let args = args_for(&cfg_path, &["embeds.assets-dir=local/assets"]);
        let app = build_config(&args, &ConfigOverrides::default()).unwrap();
        assert_eq!(app.assets_dir, Some(PathBuf::from("local/assets")));

        let args = args_for(&cfg_path, &["dose.species-file=missing/species.toml"]);
        let err = build_config(&args, &ConfigOverrides::default()).unwrap_err();
        match err {
            CliError::Engine(e) => {
                let message = e.to_string();
                assert!(message.contains("missing/species.toml"));
                assert!(!message.contains(&dir.path().display().to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_and_unknown_set_values_are_rejected() {
        let err = build_in_memory(&["viewer.default-pdb"], &ConfigOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("Expected KEY=VALUE"));

        let err = build_in_memory(&["viewer.theme=dark"], &ConfigOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("Unsupported configuration key"));
    }

    #[test]
    fn blank_value_fails_suite_validation() {
        let err = build_in_memory(&["embeds.ketcher-url=  "], &ConfigOverrides::default())
            .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn unreadable_species_file_is_an_engine_error() {
        let err = build_in_memory(
            &["dose.species-file=/nonexistent/species.toml"],
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Engine(EngineError::Species { .. })));
    }
}
