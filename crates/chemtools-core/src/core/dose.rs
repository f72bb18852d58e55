use phf::{Map, phf_map};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Typical body weights (kg) of the standard study species.
static STANDARD_SPECIES: Map<&'static str, f64> = phf_map! {
    "mouse" => 0.02,
    "rat" => 0.25,
    "dog" => 12.0,
    "monkey" => 5.0,
    "human" => 85.0,
};

/// Display order of [`STANDARD_SPECIES`]; phf maps are unordered.
pub const STANDARD_SPECIES_ORDER: [&str; 5] = ["mouse", "rat", "dog", "monkey", "human"];

/// Key selecting a manually entered body weight instead of a species default.
pub const CUSTOM_SUBJECT: &str = "custom";

pub fn standard_weight(species: &str) -> Option<f64> {
    STANDARD_SPECIES.get(species).copied()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct SpeciesEntry {
    #[serde(rename = "weight-kg")]
    weight_kg: f64,
}

/// Species → body weight lookup: the built-in species plus any loaded from a TOML file.
///
/// Loaded entries override built-in ones with the same key. The file format is one table per
/// species:
///
/// ```toml
/// [hamster]
/// weight-kg = 0.12
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpeciesTable {
    extra: BTreeMap<String, f64>,
}

#[derive(Debug, Error)]
pub enum SpeciesLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Species '{name}' has invalid weight {weight} kg (must be finite and positive)")]
    InvalidWeight { name: String, weight: f64 },
    #[error("'{0}' is reserved for manually entered weights")]
    ReservedName(String),
}

impl SpeciesTable {
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, SpeciesLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| SpeciesLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            SpeciesLoadError::Toml { source, .. } => SpeciesLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SpeciesLoadError> {
        let entries: BTreeMap<String, SpeciesEntry> =
            toml::from_str(content).map_err(|e| SpeciesLoadError::Toml {
                path: "<inline>".to_string(),
                source: e,
            })?;

        let mut extra = BTreeMap::new();
        for (name, entry) in entries {
            if name == CUSTOM_SUBJECT {
                return Err(SpeciesLoadError::ReservedName(name));
            }
            if !entry.weight_kg.is_finite() || entry.weight_kg <= 0.0 {
                return Err(SpeciesLoadError::InvalidWeight {
                    name,
                    weight: entry.weight_kg,
                });
            }
            extra.insert(name, entry.weight_kg);
        }
        Ok(Self { extra })
    }

    pub fn weight(&self, species: &str) -> Option<f64> {
        self.extra
            .get(species)
            .copied()
            .or_else(|| standard_weight(species))
    }

    /// All selectable species in display order: built-ins first, then loaded extras.
    pub fn species(&self) -> Vec<(String, f64)> {
        let mut out: Vec<(String, f64)> = STANDARD_SPECIES_ORDER
            .iter()
            .filter_map(|name| self.weight(name).map(|w| (name.to_string(), w)))
            .collect();
        out.extend(
            self.extra
                .iter()
                .filter(|(name, _)| standard_weight(name).is_none())
                .map(|(name, w)| (name.clone(), *w)),
        );
        out
    }
}

/// A complete in-vivo dosing regimen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoseRegimen {
    pub weight_kg: f64,
    pub dose_mg_per_kg: f64,
    pub doses_per_day: f64,
    pub days: f64,
    pub subjects: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoseRequirement {
    pub per_subject_per_day_mg: f64,
    pub total_mg: f64,
}

impl DoseRegimen {
    /// Compound needed for the regimen, or `None` unless every quantity is finite and
    /// strictly positive.
    pub fn requirement(&self) -> Option<DoseRequirement> {
        let all_positive = [
            self.weight_kg,
            self.dose_mg_per_kg,
            self.doses_per_day,
            self.days,
            self.subjects,
        ]
        .iter()
        .all(|v| v.is_finite() && *v > 0.0);
        if !all_positive {
            return None;
        }

        let per_subject_per_day_mg = self.weight_kg * self.dose_mg_per_kg * self.doses_per_day;
        let total_mg = per_subject_per_day_mg * self.days * self.subjects;
        Some(DoseRequirement {
            per_subject_per_day_mg,
            total_mg,
        })
    }
}
