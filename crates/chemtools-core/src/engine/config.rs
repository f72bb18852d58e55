use crate::core::dose::SpeciesTable;
use thiserror::Error;

pub const DEFAULT_THREEDMOL_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/3Dmol/2.5.1/3Dmol-min.js";
pub const DEFAULT_SORTABLE_URL: &str =
    "https://cdn.jsdelivr.net/npm/sortablejs@1.15.0/Sortable.min.js";
pub const DEFAULT_NMRIUM_URL: &str = "https://www.nmrium.org/nmrium";
pub const DEFAULT_KETCHER_URL: &str = "Ketcher/index.html";
pub const DEFAULT_PDB_ID: &str = "2POR";
pub const DEFAULT_SHARE_BASE_URL: &str = "full-page.html";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Parameter '{0}' must not be empty")]
    EmptyParameter(&'static str),
}

/// Locations of the third-party libraries and frames the viewer tools embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedUrls {
    pub threedmol: String,
    pub sortable: String,
    pub nmrium: String,
    pub ketcher: String,
}

impl Default for EmbedUrls {
    fn default() -> Self {
        Self {
            threedmol: DEFAULT_THREEDMOL_URL.to_string(),
            sortable: DEFAULT_SORTABLE_URL.to_string(),
            nmrium: DEFAULT_NMRIUM_URL.to_string(),
            ketcher: DEFAULT_KETCHER_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerDefaults {
    pub pdb_id: String,
    /// Page the share URL fragment is appended to.
    pub share_base_url: String,
}

impl Default for ViewerDefaults {
    fn default() -> Self {
        Self {
            pdb_id: DEFAULT_PDB_ID.to_string(),
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Category opened when a deep link names none (or an unknown one). `None` means the first
    /// registered category.
    pub default_category: Option<String>,
    pub embeds: EmbedUrls,
    pub viewer: ViewerDefaults,
    pub species: SpeciesTable,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            default_category: None,
            embeds: EmbedUrls::default(),
            viewer: ViewerDefaults::default(),
            species: SpeciesTable::standard(),
        }
    }
}

#[derive(Default)]
pub struct SuiteConfigBuilder {
    default_category: Option<String>,
    threedmol_url: Option<String>,
    sortable_url: Option<String>,
    nmrium_url: Option<String>,
    ketcher_url: Option<String>,
    default_pdb: Option<String>,
    share_base_url: Option<String>,
    species: Option<SpeciesTable>,
}

impl SuiteConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_category(mut self, category: Option<String>) -> Self {
        self.default_category = category;
        self
    }
    pub fn threedmol_url(mut self, url: String) -> Self {
        self.threedmol_url = Some(url);
        self
    }
    pub fn sortable_url(mut self, url: String) -> Self {
        self.sortable_url = Some(url);
        self
    }
    pub fn nmrium_url(mut self, url: String) -> Self {
        self.nmrium_url = Some(url);
        self
    }
    pub fn ketcher_url(mut self, url: String) -> Self {
        self.ketcher_url = Some(url);
        self
    }
    pub fn default_pdb(mut self, pdb_id: String) -> Self {
        self.default_pdb = Some(pdb_id);
        self
    }
    pub fn share_base_url(mut self, url: String) -> Self {
        self.share_base_url = Some(url);
        self
    }
    pub fn species(mut self, species: SpeciesTable) -> Self {
        self.species = Some(species);
        self
    }

    pub fn build(self) -> Result<SuiteConfig, ConfigError> {
        let embeds = EmbedUrls {
            threedmol: required(self.threedmol_url, "threedmol_url")?,
            sortable: required(self.sortable_url, "sortable_url")?,
            nmrium: required(self.nmrium_url, "nmrium_url")?,
            ketcher: required(self.ketcher_url, "ketcher_url")?,
        };
        let viewer = ViewerDefaults {
            pdb_id: required(self.default_pdb, "default_pdb")?,
            share_base_url: required(self.share_base_url, "share_base_url")?,
        };
        let default_category = self
            .default_category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(SuiteConfig {
            default_category,
            embeds,
            viewer,
            species: self.species.unwrap_or_default(),
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    let value = value.ok_or(ConfigError::MissingParameter(name))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyParameter(name));
    }
    Ok(trimmed.to_string())
}
