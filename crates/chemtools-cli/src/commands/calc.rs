use crate::cli::{
    ConfigArgs, ConvertArgs, DoseArgs, FoldArgs, GeArgs, HeavyAtomsArgs, Ic50Args, LeArgs,
    LleArgs, Pic50Args, SelectionArgs,
};
use crate::config::{ConfigOverrides, build_config};
use crate::error::{CliError, Result};
use chemtools::core::dose::{DoseRegimen, SpeciesTable};
use chemtools::core::efficiency::{
    Interpretation, group_efficiency, ligand_efficiency, lipophilic_efficiency,
};
use chemtools::core::format::{PLACEHOLDER, fixed, significant};
use chemtools::core::formula::parse_formula;
use chemtools::core::potency::{
    PotencyClass, fold_difference, ic50_molar_from_pic50, pic50_from_ic50,
};
use chemtools::core::selection::parse_selection;
use chemtools::core::units::{ConcentrationUnit, convert};
use tracing::debug;

const NANOMOLAR_PER_MOLAR: f64 = 1e9;

fn emit(report: Result<String>) -> Result<()> {
    println!("{}", report?);
    Ok(())
}

pub fn run_convert(args: ConvertArgs) -> Result<()> {
    emit(convert_report(&args))
}

pub fn run_ic50(args: Ic50Args) -> Result<()> {
    emit(ic50_report(&args))
}

pub fn run_pic50(args: Pic50Args) -> Result<()> {
    emit(pic50_report(&args))
}

pub fn run_fold(args: FoldArgs) -> Result<()> {
    emit(fold_report(&args))
}

pub fn run_dose(args: DoseArgs, config_args: &ConfigArgs) -> Result<()> {
    let app = build_config(config_args, &ConfigOverrides::default())?;
    emit(dose_report(&args, &app.suite.species))
}

pub fn run_lle(args: LleArgs) -> Result<()> {
    emit(lle_report(&args))
}

pub fn run_le(args: LeArgs) -> Result<()> {
    emit(le_report(&args))
}

pub fn run_ge(args: GeArgs) -> Result<()> {
    emit(ge_report(&args))
}

pub fn run_heavy_atoms(args: HeavyAtomsArgs) -> Result<()> {
    emit(heavy_atoms_report(&args.formula).map(|(n, breakdown)| {
        format!("{}: {} heavy atoms ({})", args.formula.trim(), n, breakdown)
    }))
}

pub fn run_selection(args: SelectionArgs) -> Result<()> {
    emit(selection_report(&args))
}

fn convert_report(args: &ConvertArgs) -> Result<String> {
    let from: ConcentrationUnit = args.from.parse()?;
    let to: ConcentrationUnit = args.to.parse()?;
    let result = convert(args.value, from, to, args.mw)?;
    debug!(value = args.value, %from, %to, result, "Concentration converted.");
    Ok(format!(
        "{} {} = {} {}",
        significant(args.value, 6),
        from,
        significant(result, 6),
        to
    ))
}

fn molar_unit(symbol: &str) -> Result<ConcentrationUnit> {
    let unit: ConcentrationUnit = symbol.parse()?;
    if unit.is_mass() {
        return Err(CliError::Argument(format!(
            "IC50 unit must be one of {}, got '{}'",
            ConcentrationUnit::MOLAR.map(|u| u.symbol()).join(", "),
            unit
        )));
    }
    Ok(unit)
}

fn ic50_report(args: &Ic50Args) -> Result<String> {
    let unit = molar_unit(&args.unit)?;
    let pic50 = pic50_from_ic50(args.value, unit)
        .ok_or_else(|| CliError::Argument("IC50 must be a positive number".to_string()))?;
    let shown = fixed(pic50, 2);
    // Classified from the displayed value so the badge never disagrees with it.
    let potency = shown
        .parse::<f64>()
        .map(PotencyClass::classify)
        .map_err(|e| CliError::Other(e.into()))?;
    Ok(format!("pIC50: {}\nPotency: {}", shown, potency))
}

fn pic50_report(args: &Pic50Args) -> Result<String> {
    let molar = ic50_molar_from_pic50(args.value)
        .ok_or_else(|| CliError::Argument(format!("pIC50 {} is out of range", args.value)))?;
    Ok(format!(
        "IC50: {} nM\nPotency: {}",
        fixed(molar * NANOMOLAR_PER_MOLAR, 2),
        PotencyClass::classify(args.value)
    ))
}

fn fold_report(args: &FoldArgs) -> Result<String> {
    let fold = fold_difference(args.pic50_a, args.pic50_b)
        .ok_or_else(|| CliError::Argument("Fold difference is out of range".to_string()))?;
    Ok(format!("Fold Difference (B vs A): {}×", fixed(fold, 2)))
}

fn dose_report(args: &DoseArgs, species: &SpeciesTable) -> Result<String> {
    let (subject, weight_kg) = match args.weight {
        Some(kg) => ("custom".to_string(), kg),
        None => {
            let kg = species.weight(&args.species).ok_or_else(|| {
                let known: Vec<String> = species.species().into_iter().map(|(n, _)| n).collect();
                CliError::Argument(format!(
                    "Unknown species '{}' (known: {})",
                    args.species,
                    known.join(", ")
                ))
            })?;
            (args.species.clone(), kg)
        }
    };
    let regimen = DoseRegimen {
        weight_kg,
        dose_mg_per_kg: args.dose,
        doses_per_day: f64::from(args.per_day),
        days: f64::from(args.days),
        subjects: f64::from(args.subjects),
    };
    let requirement = regimen.requirement().ok_or_else(|| {
        CliError::Argument("Weight, dose, subjects and days must all be positive".to_string())
    })?;
    Ok(format!(
        "Subject: {} ({} kg)\nPer Subject · Per Day: {} mg\nTotal Compound Required: {} mg",
        subject,
        weight_kg,
        fixed(requirement.per_subject_per_day_mg, 2),
        fixed(requirement.total_mg, 2)
    ))
}

fn metric_line(label: &str, value: Option<f64>, decimals: usize, interpret: fn(f64) -> Interpretation) -> String {
    match value {
        Some(v) => {
            let value = fixed(v, decimals);
            let shown = value.parse().unwrap_or(v);
            format!("{}: {} [{}]", label, value, interpret(shown).label())
        }
        None => format!("{}: {}", label, PLACEHOLDER),
    }
}

fn lle_report(args: &LleArgs) -> Result<String> {
    let lle = lipophilic_efficiency(args.pic50, args.clogp);
    Ok(metric_line("LLE", lle, 2, Interpretation::for_lle))
}

fn le_report(args: &LeArgs) -> Result<String> {
    let (atoms, _) = heavy_atoms_report(&args.formula)?;
    let le = ligand_efficiency(args.pic50, atoms);
    Ok(format!(
        "{}\nHeavy atoms: {}",
        metric_line("LE", le, 3, Interpretation::for_le),
        atoms
    ))
}

fn ge_report(args: &GeArgs) -> Result<String> {
    let (parent_atoms, _) = heavy_atoms_report(&args.parent_formula)?;
    let (modified_atoms, _) = heavy_atoms_report(&args.modified_formula)?;
    let ge = group_efficiency(
        args.parent_pic50,
        parent_atoms,
        args.modified_pic50,
        modified_atoms,
    );
    let line = metric_line("GE", ge, 3, Interpretation::for_ge);
    if ge.is_none() && parent_atoms == modified_atoms {
        return Ok(format!(
            "{}\nBoth formulas have {} heavy atoms; GE needs a size change.",
            line, parent_atoms
        ));
    }
    Ok(line)
}

/// Heavy-atom count of a formula plus a per-element breakdown (`C6 O6`).
///
/// Unlike the panels, which treat a malformed formula as zero atoms, the command line rejects it.
fn heavy_atoms_report(formula: &str) -> Result<(u32, String)> {
    let tokens = parse_formula(formula)?;
    let heavy: Vec<_> = tokens.iter().filter(|t| t.symbol != "H").collect();
    let count = heavy
        .iter()
        .try_fold(0u32, |sum, t| sum.checked_add(t.count))
        .ok_or_else(|| CliError::Argument(format!("Atom count overflows in '{}'", formula)))?;
    let breakdown = heavy
        .iter()
        .map(|t| format!("{}{}", t.symbol, t.count))
        .collect::<Vec<_>>()
        .join(" ");
    Ok((count, breakdown))
}

fn selection_report(args: &SelectionArgs) -> Result<String> {
    let selection = parse_selection(&args.expression)?;
    Ok(format!("{}\n{}", selection, selection.to_json()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_molar_to_mass_with_mw() {
        let args = ConvertArgs {
            value: 500.0,
            from: "nM".to_string(),
            to: "ng/mL".to_string(),
            mw: Some(300.0),
        };
        assert_eq!(convert_report(&args).unwrap(), "500 nM = 150 ng/mL");
    }

    #[test]
    fn mass_conversion_without_mw_fails() {
        let args = ConvertArgs {
            value: 1.0,
            from: "mg/mL".to_string(),
            to: "uM".to_string(),
            mw: None,
        };
        assert!(matches!(
            convert_report(&args),
            Err(CliError::Conversion(_))
        ));
    }

    #[test]
    fn ic50_to_pic50_with_potency() {
        let args = Ic50Args {
            value: 50.0,
            unit: "nM".to_string(),
        };
        assert_eq!(
            ic50_report(&args).unwrap(),
            "pIC50: 7.30\nPotency: Potent inhibitor"
        );
    }

    #[test]
    fn ic50_rejects_mass_units_and_non_positive_values() {
        let mass = Ic50Args {
            value: 50.0,
            unit: "ng/mL".to_string(),
        };
        assert!(matches!(ic50_report(&mass), Err(CliError::Argument(_))));

        let zero = Ic50Args {
            value: 0.0,
            unit: "uM".to_string(),
        };
        assert!(ic50_report(&zero).is_err());
    }

    #[test]
    fn pic50_back_to_nanomolar() {
        let report = pic50_report(&Pic50Args { value: 7.301 }).unwrap();
        assert!(report.starts_with("IC50: 50.00 nM"));
    }

    #[test]
    fn fold_difference_is_reported() {
        let report = fold_report(&FoldArgs {
            pic50_a: 6.0,
            pic50_b: 7.0,
        })
        .unwrap();
        assert_eq!(report, "Fold Difference (B vs A): 10.00×");
    }

    #[test]
    fn dose_for_mouse_study() {
        let args = DoseArgs {
            dose: 10.0,
            species: "mouse".to_string(),
            weight: None,
            subjects: 5,
            per_day: 2,
            days: 3,
        };
        let report = dose_report(&args, &SpeciesTable::standard()).unwrap();
        assert!(report.contains("Per Subject · Per Day: 0.40 mg"));
        assert!(report.contains("Total Compound Required: 6.00 mg"));
    }

    #[test]
    fn dose_with_unknown_species_lists_known_ones() {
        let args = DoseArgs {
            dose: 10.0,
            species: "hamster".to_string(),
            weight: None,
            subjects: 1,
            per_day: 1,
            days: 1,
        };
        let err = dose_report(&args, &SpeciesTable::standard()).unwrap_err();
        assert!(err.to_string().contains("known: mouse, rat, dog, monkey, human"));
    }

    #[test]
    fn dose_with_custom_weight_and_zero_subjects() {
        let mut args = DoseArgs {
            dose: 2.0,
            species: "mouse".to_string(),
            weight: Some(70.0),
            subjects: 1,
            per_day: 1,
            days: 1,
        };
        assert!(dose_report(&args, &SpeciesTable::standard())
            .unwrap()
            .contains("Total Compound Required: 140.00 mg"));
        args.subjects = 0;
        assert!(dose_report(&args, &SpeciesTable::standard()).is_err());
    }

    #[test]
    fn efficiency_metrics() {
        assert_eq!(
            lle_report(&LleArgs {
                pic50: 7.0,
                clogp: 2.5
            })
            .unwrap(),
            "LLE: 4.50 [poor]"
        );
        assert_eq!(
            lle_report(&LleArgs {
                pic50: 7.001,
                clogp: 2.0
            })
            .unwrap(),
            "LLE: 5.00 [poor]"
        );

        let le = le_report(&LeArgs {
            pic50: 6.0,
            formula: "C6H12O6".to_string(),
        })
        .unwrap();
        assert!(le.starts_with("LE: -0.700"));
        assert!(le.ends_with("Heavy atoms: 12"));

        let ge = ge_report(&GeArgs {
            parent_pic50: 6.0,
            parent_formula: "C6H12O6".to_string(),
            modified_pic50: 7.0,
            modified_formula: "C7H14O6".to_string(),
        })
        .unwrap();
        assert!(ge.starts_with("GE: -1.400"));
    }

    #[test]
    fn ge_without_size_change_explains_placeholder() {
        let ge = ge_report(&GeArgs {
            parent_pic50: 6.0,
            parent_formula: "C6H6".to_string(),
            modified_pic50: 7.0,
            modified_formula: "C6H12".to_string(),
        })
        .unwrap();
        assert!(ge.starts_with("GE: –"));
        assert!(ge.contains("Both formulas have 6 heavy atoms"));
    }

    #[test]
    fn malformed_formula_is_rejected_on_the_command_line() {
        assert!(matches!(
            heavy_atoms_report("c6h12o6"),
            Err(CliError::Formula(_))
        ));
        assert_eq!(
            heavy_atoms_report("C6H12O6").unwrap(),
            (12, "C6 O6".to_string())
        );
    }

    #[test]
    fn selection_prints_normalised_form_and_json() {
        let report = selection_report(&SelectionArgs {
            expression: "chain:A;resi:1-50".to_string(),
        })
        .unwrap();
        let mut lines = report.lines();
        assert_eq!(lines.next(), Some("chain:'A';resi:1-50"));
        assert_eq!(lines.next(), Some(r#"{"chain":"A","resi":"1-50"}"#));
    }

    #[test]
    fn selection_rejects_code() {
        let err = selection_report(&SelectionArgs {
            expression: "alert(1)".to_string(),
        });
        assert!(matches!(err, Err(CliError::Selection(_))));
    }
}
