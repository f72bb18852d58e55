use crate::core::format::{PLACEHOLDER, fixed, parse_number};
use crate::core::potency::{PotencyClass, fold_difference, ic50_molar_from_pic50};
use crate::core::units::ConcentrationUnit;
use crate::engine::container::Container;
use crate::engine::panel::{FieldView, Panel, PanelContext, PanelError, PanelView, ResultCard};
use crate::engine::registry::{Disposer, ToolDescriptor};

use super::{IC50_CONVERTER, reject_unknown};

const NANOMOLAR_PER_MOLAR: f64 = 1e9;
const NO_POTENCY: &str = "Enter values to see potency";

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(IC50_CONVERTER, "IC50 Converter", init)
}

pub fn init(container: &mut Container) -> Option<Disposer> {
    container.mount(Box::new(Ic50Panel::default()));
    None
}

/// Which of the two linked fields drives the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Authority {
    None,
    Ic50,
    Pic50,
}

/// IC50 ⇄ pIC50 conversion plus a fold-difference comparison of two pIC50 values.
#[derive(Debug, Clone)]
pub struct Ic50Panel {
    ic50: String,
    pic50: String,
    unit: ConcentrationUnit,
    authority: Authority,
    fold_a: String,
    fold_b: String,
}

impl Default for Ic50Panel {
    fn default() -> Self {
        Self {
            ic50: String::new(),
            pic50: String::new(),
            unit: ConcentrationUnit::Nanomolar,
            authority: Authority::None,
            fold_a: String::new(),
            fold_b: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Conversion {
    pic50: String,
    ic50_nm: String,
    potency: Option<PotencyClass>,
}

impl Ic50Panel {
    fn conversion(&self) -> Conversion {
        let molar = match self.authority {
            Authority::None => None,
            Authority::Ic50 => parse_number(&self.ic50)
                .map(|ic50| ic50 * self.unit.factor())
                .filter(|molar| *molar > 0.0),
            Authority::Pic50 => parse_number(&self.pic50).and_then(ic50_molar_from_pic50),
        };
        let pic50 = match self.authority {
            Authority::Pic50 => parse_number(&self.pic50),
            _ => molar.map(|m| -m.log10()),
        };

        let (Some(molar), Some(pic50)) = (molar, pic50) else {
            return Conversion {
                pic50: PLACEHOLDER.to_string(),
                ic50_nm: PLACEHOLDER.to_string(),
                potency: None,
            };
        };
        let shown = fixed(pic50, 2);
        // The indicator reads the displayed (rounded) value.
        let potency = shown.parse::<f64>().ok().map(PotencyClass::classify);
        Conversion {
            pic50: shown,
            ic50_nm: fixed(molar * NANOMOLAR_PER_MOLAR, 2),
            potency,
        }
    }

    fn fold(&self) -> String {
        match (parse_number(&self.fold_a), parse_number(&self.fold_b)) {
            (Some(a), Some(b)) => fold_difference(a, b)
                .map_or_else(|| PLACEHOLDER.to_string(), |fold| fixed(fold, 2)),
            _ => PLACEHOLDER.to_string(),
        }
    }

    fn set_linked(&mut self, field: &str, value: &str) -> Result<(), PanelError> {
        let own = if field == "ic50" {
            Authority::Ic50
        } else {
            Authority::Pic50
        };
        if self.authority != Authority::None && self.authority != own {
            return Err(PanelError::DisabledField(field.to_string()));
        }

        let value = value.trim();
        match own {
            Authority::Ic50 => self.ic50 = value.to_string(),
            _ => self.pic50 = value.to_string(),
        }
        if value.is_empty() {
            self.authority = Authority::None;
        } else {
            self.authority = own;
            match own {
                Authority::Ic50 => self.pic50.clear(),
                _ => self.ic50.clear(),
            }
        }
        Ok(())
    }
}

impl Panel for Ic50Panel {
    fn title(&self) -> &str {
        "IC50 ↔ pIC50 Converter"
    }

    fn view(&self) -> PanelView {
        let conversion = self.conversion();
        let potency = conversion
            .potency
            .map_or(NO_POTENCY.to_string(), |p| p.label().to_string());
        PanelView {
            title: self.title().to_string(),
            description: "Higher pIC50 values indicate more potent compounds.".to_string(),
            fields: vec![
                FieldView::number("ic50", "IC50 Value", &self.ic50)
                    .disabled(self.authority == Authority::Pic50),
                FieldView::choice(
                    "unit",
                    "IC50 Unit",
                    ConcentrationUnit::MOLAR.map(|u| u.symbol()),
                    self.unit.symbol(),
                ),
                FieldView::number("pic50", "pIC50 Value", &self.pic50)
                    .disabled(self.authority == Authority::Ic50),
                FieldView::number("fold-a", "pIC50 of Compound A", &self.fold_a),
                FieldView::number("fold-b", "pIC50 of Compound B", &self.fold_b),
            ],
            results: vec![
                ResultCard::new("pIC50", conversion.pic50),
                ResultCard::new("IC50", conversion.ic50_nm).with_unit("nM"),
                ResultCard::new("Potency", potency),
                ResultCard::new("Fold Difference (B vs A)", self.fold()).with_unit("×"),
            ],
            notes: vec![
                "pIC50 = −log10(IC50 in M)".to_string(),
                "Potency scale: < 4 weak, 4–6 moderate, 6–8 potent, ≥ 8 very potent".to_string(),
            ],
        }
    }

    fn input(&mut self, field: &str, value: &str, _cx: &mut PanelContext) -> Result<(), PanelError> {
        match field {
            "ic50" | "pic50" => self.set_linked(field, value)?,
            "unit" => {
                self.unit = value
                    .parse::<ConcentrationUnit>()
                    .ok()
                    .filter(|unit| !unit.is_mass())
                    .ok_or_else(|| {
                        PanelError::invalid_choice(
                            field,
                            value,
                            ConcentrationUnit::MOLAR.map(|u| u.symbol()),
                        )
                    })?;
            }
            "fold-a" => self.fold_a = value.to_string(),
            "fold-b" => self.fold_b = value.to_string(),
            other => return reject_unknown(other),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(panel: &mut Ic50Panel, field: &str, value: &str) {
        panel.input(field, value, &mut PanelContext::new()).unwrap();
    }

    fn result(panel: &Ic50Panel, label: &str) -> String {
        panel.view().result(label).unwrap().value.clone()
    }

    #[test]
    fn fifty_nanomolar_converts_to_pic50() {
        let mut panel = Ic50Panel::default();
        set(&mut panel, "ic50", "50");
        assert_eq!(result(&panel, "pIC50"), "7.30");
        assert_eq!(result(&panel, "IC50"), "50.00");
        assert_eq!(result(&panel, "Potency"), "Potent inhibitor");
    }

    #[test]
    fn pic50_converts_back_to_nanomolar() {
        let mut panel = Ic50Panel::default();
        set(&mut panel, "pic50", "7.301");
        assert_eq!(result(&panel, "IC50"), "50.00");
        assert_eq!(result(&panel, "pIC50"), "7.30");
    }

    #[test]
    fn unit_scales_ic50_and_result_stays_in_nanomolar() {
        let mut panel = Ic50Panel::default();
        set(&mut panel, "unit", "µM");
        set(&mut panel, "ic50", "2");
        assert_eq!(result(&panel, "pIC50"), "5.70");
        assert_eq!(result(&panel, "IC50"), "2000.00");
        assert_eq!(result(&panel, "Potency"), "Moderate inhibitor");
    }

    #[test]
    fn entering_one_field_clears_and_disables_the_other() {
        let mut panel = Ic50Panel::default();
        set(&mut panel, "pic50", "6");
        set(&mut panel, "pic50", "");
        set(&mut panel, "ic50", "10");

        let view = panel.view();
        assert_eq!(view.field("pic50").unwrap().value, "");
        assert!(!view.field("pic50").unwrap().enabled);
        assert_eq!(
            panel.input("pic50", "5", &mut PanelContext::new()),
            Err(PanelError::DisabledField("pic50".to_string()))
        );

        set(&mut panel, "ic50", "");
        assert!(panel.view().field("pic50").unwrap().enabled);
        assert_eq!(result(&panel, "pIC50"), "–");
        assert_eq!(result(&panel, "Potency"), NO_POTENCY);
    }

    #[test]
    fn non_positive_or_garbage_ic50_shows_placeholder() {
        let mut panel = Ic50Panel::default();
        set(&mut panel, "ic50", "0");
        assert_eq!(result(&panel, "pIC50"), "–");
        assert_eq!(result(&panel, "IC50"), "–");
        set(&mut panel, "ic50", "-5");
        assert_eq!(result(&panel, "pIC50"), "–");
        set(&mut panel, "ic50", "abc");
        assert_eq!(result(&panel, "IC50"), "–");
    }

    #[test]
    fn mass_units_are_not_offered() {
        let mut panel = Ic50Panel::default();
        assert!(matches!(
            panel.input("unit", "ng/mL", &mut PanelContext::new()),
            Err(PanelError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn fold_difference_compares_two_compounds() {
        let mut panel = Ic50Panel::default();
        assert_eq!(result(&panel, "Fold Difference (B vs A)"), "–");
        set(&mut panel, "fold-a", "6");
        set(&mut panel, "fold-b", "7.5");
        assert_eq!(result(&panel, "Fold Difference (B vs A)"), "31.62");
        set(&mut panel, "fold-b", "x");
        assert_eq!(result(&panel, "Fold Difference (B vs A)"), "–");
    }
}
