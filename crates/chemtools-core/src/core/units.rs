use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A concentration unit understood by the converter.
///
/// Molar units scale directly to mol/L. Mass units (`ng/mL`, `mg/mL`) are first scaled to g/L and
/// then divided by the molecular weight, so any conversion touching them needs a valid MW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConcentrationUnit {
    Nanomolar,
    Micromolar,
    Millimolar,
    NanogramPerMl,
    MilligramPerMl,
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConversionError {
    #[error("Unknown concentration unit: '{0}'")]
    UnknownUnit(String),

    #[error("A positive molecular weight is required to convert {from} to {to}")]
    MolecularWeightRequired {
        from: ConcentrationUnit,
        to: ConcentrationUnit,
    },

    #[error("Value must be a finite number, got {0}")]
    NonFiniteValue(f64),
}

impl ConcentrationUnit {
    pub const ALL: [Self; 5] = [
        Self::Nanomolar,
        Self::Micromolar,
        Self::Millimolar,
        Self::NanogramPerMl,
        Self::MilligramPerMl,
    ];

    /// Units that express an IC50 directly in molar terms.
    pub const MOLAR: [Self; 3] = [Self::Nanomolar, Self::Micromolar, Self::Millimolar];

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Nanomolar => "nM",
            Self::Micromolar => "µM",
            Self::Millimolar => "mM",
            Self::NanogramPerMl => "ng/mL",
            Self::MilligramPerMl => "mg/mL",
        }
    }

    pub fn is_mass(self) -> bool {
        matches!(self, Self::NanogramPerMl | Self::MilligramPerMl)
    }

    /// Multiplier to the canonical unit: mol/L for molar units, g/L for mass units.
    pub fn factor(self) -> f64 {
        match self {
            Self::Nanomolar => 1e-9,
            Self::Micromolar => 1e-6,
            Self::Millimolar => 1e-3,
            Self::NanogramPerMl => 1e-6,
            Self::MilligramPerMl => 1.0,
        }
    }

    /// Converts `value` in this unit to mol/L.
    pub fn to_molar(self, value: f64, molecular_weight: Option<f64>) -> Option<f64> {
        if self.is_mass() {
            let mw = valid_molecular_weight(molecular_weight)?;
            Some(value * self.factor() / mw)
        } else {
            Some(value * self.factor())
        }
    }

    /// Converts a mol/L value into this unit.
    pub fn from_molar(self, molar: f64, molecular_weight: Option<f64>) -> Option<f64> {
        if self.is_mass() {
            let mw = valid_molecular_weight(molecular_weight)?;
            Some(molar * mw / self.factor())
        } else {
            Some(molar / self.factor())
        }
    }
}

impl fmt::Display for ConcentrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ConcentrationUnit {
    type Err = ConversionError;

    /// Parses a unit symbol. `uM` and `μM` (Greek mu) are accepted for micromolar; matching is
    /// case-sensitive because `mM` and `MM` would otherwise be ambiguous.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "nM" => Ok(Self::Nanomolar),
            "µM" | "μM" | "uM" => Ok(Self::Micromolar),
            "mM" => Ok(Self::Millimolar),
            "ng/mL" | "ng/ml" => Ok(Self::NanogramPerMl),
            "mg/mL" | "mg/ml" => Ok(Self::MilligramPerMl),
            other => Err(ConversionError::UnknownUnit(other.to_string())),
        }
    }
}

fn valid_molecular_weight(mw: Option<f64>) -> Option<f64> {
    mw.filter(|w| w.is_finite() && *w > 0.0)
}

/// Converts `value` from one concentration unit to another via mol/L.
///
/// # Errors
///
/// Returns [`ConversionError::MolecularWeightRequired`] when either unit is a mass unit and
/// `molecular_weight` is missing, non-finite or not positive.
pub fn convert(
    value: f64,
    from: ConcentrationUnit,
    to: ConcentrationUnit,
    molecular_weight: Option<f64>,
) -> Result<f64, ConversionError> {
    if !value.is_finite() {
        return Err(ConversionError::NonFiniteValue(value));
    }
    let missing_mw = || ConversionError::MolecularWeightRequired { from, to };
    let molar = from.to_molar(value, molecular_weight).ok_or_else(missing_mw)?;
    to.from_molar(molar, molecular_weight).ok_or_else(missing_mw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1e-300)
    }

    #[test]
    fn molar_units_scale_by_powers_of_thousand() {
        let v = convert(1.0, ConcentrationUnit::Micromolar, ConcentrationUnit::Nanomolar, None)
            .unwrap();
        assert!(close(v, 1000.0));
        let v = convert(250.0, ConcentrationUnit::Nanomolar, ConcentrationUnit::Millimolar, None)
            .unwrap();
        assert!(close(v, 2.5e-4));
    }

    #[test]
    fn mass_conversion_uses_molecular_weight() {
        // 1 µM of a 500 g/mol compound is 500 ng/mL.
        let v = convert(
            1.0,
            ConcentrationUnit::Micromolar,
            ConcentrationUnit::NanogramPerMl,
            Some(500.0),
        )
        .unwrap();
        assert!(close(v, 500.0));

        let v = convert(
            1.0,
            ConcentrationUnit::MilligramPerMl,
            ConcentrationUnit::Millimolar,
            Some(250.0),
        )
        .unwrap();
        assert!(close(v, 4.0));
    }

    #[test]
    fn mass_units_without_valid_mw_are_rejected() {
        for mw in [None, Some(0.0), Some(-3.0), Some(f64::NAN)] {
            let result = convert(
                1.0,
                ConcentrationUnit::Nanomolar,
                ConcentrationUnit::MilligramPerMl,
                mw,
            );
            assert!(matches!(
                result,
                Err(ConversionError::MolecularWeightRequired { .. })
            ));
        }
    }

    #[test]
    fn molar_only_conversion_ignores_mw() {
        let v = convert(
            3.0,
            ConcentrationUnit::Millimolar,
            ConcentrationUnit::Micromolar,
            Some(-1.0),
        )
        .unwrap();
        assert!(close(v, 3000.0));
    }

    #[test]
    fn every_unit_pair_round_trips() {
        let mw = Some(342.3);
        for from in ConcentrationUnit::ALL {
            for to in ConcentrationUnit::ALL {
                let value = 12.75;
                let there = convert(value, from, to, mw).unwrap();
                let back = convert(there, to, from, mw).unwrap();
                assert!(close(back, value), "{from} -> {to} -> {from}: {back}");
            }
        }
    }

    #[test]
    fn parses_symbols_and_aliases() {
        assert_eq!("uM".parse(), Ok(ConcentrationUnit::Micromolar));
        assert_eq!("µM".parse(), Ok(ConcentrationUnit::Micromolar));
        assert_eq!("ng/ml".parse(), Ok(ConcentrationUnit::NanogramPerMl));
        assert_eq!(
            "pM".parse::<ConcentrationUnit>(),
            Err(ConversionError::UnknownUnit("pM".to_string()))
        );
    }
}
