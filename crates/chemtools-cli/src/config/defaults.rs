use chemtools::engine::config::{
    DEFAULT_KETCHER_URL, DEFAULT_NMRIUM_URL, DEFAULT_PDB_ID, DEFAULT_SHARE_BASE_URL,
    DEFAULT_SORTABLE_URL, DEFAULT_THREEDMOL_URL,
};

pub struct DefaultsConfig {
    pub threedmol_url: String,
    pub sortable_url: String,
    pub nmrium_url: String,
    pub ketcher_url: String,
    pub default_pdb: String,
    pub share_base_url: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            threedmol_url: DEFAULT_THREEDMOL_URL.to_string(),
            sortable_url: DEFAULT_SORTABLE_URL.to_string(),
            nmrium_url: DEFAULT_NMRIUM_URL.to_string(),
            ketcher_url: DEFAULT_KETCHER_URL.to_string(),
            default_pdb: DEFAULT_PDB_ID.to_string(),
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
        }
    }
}
