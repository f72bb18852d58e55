use super::formula::count_heavy_atoms;

/// Free-energy conversion factor (kcal/mol per pIC50 unit at ~300 K) used by LE and GE.
pub const ENERGY_PER_LOG_UNIT: f64 = -1.4;

/// Lipophilic ligand efficiency: `pIC50 − cLogP`.
pub fn lipophilic_efficiency(pic50: f64, clogp: f64) -> Option<f64> {
    let lle = pic50 - clogp;
    lle.is_finite().then_some(lle)
}

/// Ligand efficiency: `−1.4 × pIC50 / heavy atoms`.
///
/// Returns `None` when the heavy-atom count is zero, which includes malformed formulas.
pub fn ligand_efficiency(pic50: f64, heavy_atoms: u32) -> Option<f64> {
    if heavy_atoms == 0 || !pic50.is_finite() {
        return None;
    }
    Some(ENERGY_PER_LOG_UNIT * pic50 / f64::from(heavy_atoms))
}

/// [`ligand_efficiency`] with the heavy-atom count read from a formula.
pub fn ligand_efficiency_for_formula(pic50: f64, formula: &str) -> Option<f64> {
    ligand_efficiency(pic50, count_heavy_atoms(formula))
}

/// Group efficiency of a structural modification: `−1.4 × ΔpIC50 / ΔHA`,
/// with both deltas taken as `modified − parent`.
pub fn group_efficiency(
    parent_pic50: f64,
    parent_heavy_atoms: u32,
    modified_pic50: f64,
    modified_heavy_atoms: u32,
) -> Option<f64> {
    let delta_pic50 = modified_pic50 - parent_pic50;
    let delta_atoms = i64::from(modified_heavy_atoms) - i64::from(parent_heavy_atoms);
    if delta_atoms == 0 || !delta_pic50.is_finite() {
        return None;
    }
    Some(ENERGY_PER_LOG_UNIT * delta_pic50 / delta_atoms as f64)
}

/// [`group_efficiency`] with both heavy-atom counts read from formulas.
///
/// A malformed formula on either side counts zero atoms; if that leaves a non-zero delta the
/// result is still produced, mirroring how the size delta is defined.
pub fn group_efficiency_for_formulas(
    parent_pic50: f64,
    parent_formula: &str,
    modified_pic50: f64,
    modified_formula: &str,
) -> Option<f64> {
    group_efficiency(
        parent_pic50,
        count_heavy_atoms(parent_formula),
        modified_pic50,
        count_heavy_atoms(modified_formula),
    )
}

/// Qualitative reading of a metric value, shown as a badge on the result card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpretation {
    Excellent,
    Good,
    Poor,
}

impl Interpretation {
    pub fn for_lle(lle: f64) -> Self {
        if lle > 5.0 { Self::Excellent } else { Self::Poor }
    }

    pub fn for_le(le: f64) -> Self {
        if le > 0.3 { Self::Good } else { Self::Poor }
    }

    pub fn for_ge(ge: f64) -> Self {
        if ge > 0.0 { Self::Good } else { Self::Poor }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Poor => "poor",
        }
    }
}

/// Inputs to Lipinski's rule of five.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrugLikeness {
    pub molecular_weight: f64,
    pub logp: f64,
    pub hbond_donors: u32,
    pub hbond_acceptors: u32,
}

impl DrugLikeness {
    /// Number of rule-of-five criteria the compound breaks (0..=4).
    pub fn rule_of_five_violations(&self) -> u8 {
        [
            self.molecular_weight > 500.0,
            self.logp > 5.0,
            self.hbond_donors > 5,
            self.hbond_acceptors > 10,
        ]
        .into_iter()
        .filter(|broken| *broken)
        .count() as u8
    }
}
