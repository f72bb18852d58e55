use super::units::ConcentrationUnit;
use std::fmt;

/// Computes pIC50 from an IC50 expressed in mol/L.
///
/// Returns `None` unless the concentration is finite and strictly positive.
pub fn pic50_from_molar(ic50_molar: f64) -> Option<f64> {
    (ic50_molar.is_finite() && ic50_molar > 0.0).then(|| -ic50_molar.log10())
}

/// Computes pIC50 from an IC50 given in one of the molar units (nM, µM, mM).
pub fn pic50_from_ic50(ic50: f64, unit: ConcentrationUnit) -> Option<f64> {
    if unit.is_mass() {
        return None;
    }
    pic50_from_molar(ic50 * unit.factor())
}

/// Inverse of [`pic50_from_molar`]: `IC50 = 10^(−pIC50)` in mol/L.
pub fn ic50_molar_from_pic50(pic50: f64) -> Option<f64> {
    if !pic50.is_finite() {
        return None;
    }
    Some(10f64.powf(-pic50)).filter(|v| v.is_finite())
}

/// Ratio of IC50 values implied by two pIC50 values: `10^(pIC50_B − pIC50_A)`.
///
/// A fold above 1 means compound B is that many times more potent than A.
pub fn fold_difference(pic50_a: f64, pic50_b: f64) -> Option<f64> {
    if !pic50_a.is_finite() || !pic50_b.is_finite() {
        return None;
    }
    Some(10f64.powf(pic50_b - pic50_a)).filter(|v| v.is_finite())
}

/// Coarse potency bucket shown next to a converted pIC50.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PotencyClass {
    Weak,
    Moderate,
    Potent,
    VeryPotent,
}

impl PotencyClass {
    pub fn classify(pic50: f64) -> Self {
        if pic50 < 4.0 {
            Self::Weak
        } else if pic50 < 6.0 {
            Self::Moderate
        } else if pic50 < 8.0 {
            Self::Potent
        } else {
            Self::VeryPotent
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Weak => "Weak inhibitor",
            Self::Moderate => "Moderate inhibitor",
            Self::Potent => "Potent inhibitor",
            Self::VeryPotent => "Very potent inhibitor",
        }
    }
}

impl fmt::Display for PotencyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
