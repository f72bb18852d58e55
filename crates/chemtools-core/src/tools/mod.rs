//! # Tools Module
//!
//! The built-in widgets. Each submodule exposes a `descriptor` for the registry and an `init`
//! that mounts the tool's panel into a [`Container`](crate::engine::container::Container).
//!
//! - **Calculators** - [`concentration`], [`dose`], [`ic50`], [`efficiency`]
//! - **Viewer Embeds** - [`viewer3d`], [`drawer`], [`nmr`]

pub mod concentration;
pub mod dose;
pub mod drawer;
pub mod efficiency;
pub mod ic50;
pub mod nmr;
pub mod viewer3d;

use tracing::debug;

use crate::engine::config::SuiteConfig;
use crate::engine::error::EngineError;
use crate::engine::panel::PanelError;
use crate::engine::registry::Registry;

pub const MEDCHEM: &str = "medchem";
pub const PK: &str = "pk";
pub const MOLECULAR_DRAWER_CATEGORY: &str = "molecular_drawer";
pub const SPECTROSCOPY: &str = "spectroscopy";

pub const IC50_CONVERTER: &str = "ic50-converter";
pub const EFFICIENCY_METRICS: &str = "efficiency-metrics";
pub const CONCENTRATION_CONVERTER: &str = "concentration-converter";
pub const DOSE_CALCULATOR: &str = "dose-calculator";
pub const MOLECULAR_DRAWER: &str = "molecular-drawer";
pub const MOLECULE_VIEWER: &str = "molecule-viewer";
pub const NMRIUM_VIEWER: &str = "nmrium-viewer";

/// The built-in catalogue, in tab order.
pub fn standard_registry(config: &SuiteConfig) -> Result<Registry, EngineError> {
    let mut registry = Registry::new();

    registry.register(MEDCHEM, ic50::descriptor())?;
    registry.register(MEDCHEM, efficiency::descriptor())?;
    registry.register(MEDCHEM, concentration::descriptor())?;

    registry.register(PK, concentration::descriptor())?;
    registry.register(PK, dose::descriptor(config.species.clone()))?;

    registry.register(
        MOLECULAR_DRAWER_CATEGORY,
        drawer::descriptor(config.embeds.ketcher.clone()),
    )?;
    registry.register(
        MOLECULAR_DRAWER_CATEGORY,
        viewer3d::descriptor(&config.embeds, &config.viewer),
    )?;

    registry.register(SPECTROSCOPY, nmr::descriptor(config.embeds.nmrium.clone()))?;

    debug!(
        categories = registry.categories().len(),
        "Standard registry assembled."
    );
    Ok(registry)
}

pub(crate) fn reject_unknown(field: &str) -> Result<(), PanelError> {
    Err(PanelError::UnknownField(field.to_string()))
}
