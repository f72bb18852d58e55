use crate::core::format::{PLACEHOLDER, parse_number, significant};
use crate::core::units::{ConcentrationUnit, convert};
use crate::engine::container::Container;
use crate::engine::panel::{FieldView, Panel, PanelContext, PanelError, PanelView, ResultCard};
use crate::engine::registry::{Disposer, ToolDescriptor};

use super::{CONCENTRATION_CONVERTER, reject_unknown};

const SIGNIFICANT_DIGITS: u32 = 6;

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(CONCENTRATION_CONVERTER, "Conc. Converter", init)
}

pub fn init(container: &mut Container) -> Option<Disposer> {
    container.mount(Box::new(ConcentrationPanel::default()));
    None
}

/// Converts a concentration between molar and mass units.
#[derive(Debug, Clone)]
pub struct ConcentrationPanel {
    molecular_weight: String,
    value: String,
    from: ConcentrationUnit,
    to: ConcentrationUnit,
    result: String,
}

impl Default for ConcentrationPanel {
    fn default() -> Self {
        Self {
            molecular_weight: String::new(),
            value: String::new(),
            from: ConcentrationUnit::Nanomolar,
            to: ConcentrationUnit::NanogramPerMl,
            result: PLACEHOLDER.to_string(),
        }
    }
}

impl ConcentrationPanel {
    fn recompute(&mut self) {
        let molecular_weight = parse_number(&self.molecular_weight);
        self.result = parse_number(&self.value)
            .and_then(|value| convert(value, self.from, self.to, molecular_weight).ok())
            .map_or_else(
                || PLACEHOLDER.to_string(),
                |out| significant(out, SIGNIFICANT_DIGITS),
            );
    }

    fn parse_unit(field: &str, value: &str) -> Result<ConcentrationUnit, PanelError> {
        value.parse().map_err(|_| {
            PanelError::invalid_choice(field, value, ConcentrationUnit::ALL.map(|u| u.symbol()))
        })
    }
}

impl Panel for ConcentrationPanel {
    fn title(&self) -> &str {
        "Concentration Unit Converter"
    }

    fn view(&self) -> PanelView {
        let units = ConcentrationUnit::ALL.map(|u| u.symbol());
        PanelView {
            title: self.title().to_string(),
            description:
                "Convert between mass and molar concentration units using molecular weight."
                    .to_string(),
            fields: vec![
                FieldView::number("mw", "Molecular Weight (g/mol)", &self.molecular_weight),
                FieldView::number("value", "Input Concentration", &self.value),
                FieldView::choice("from", "Input Unit", units, self.from.symbol()),
                FieldView::choice("to", "Output Unit", units, self.to.symbol()),
            ],
            results: vec![ResultCard::new(self.to.symbol(), self.result.clone())],
            notes: Vec::new(),
        }
    }

    fn input(&mut self, field: &str, value: &str, _cx: &mut PanelContext) -> Result<(), PanelError> {
        match field {
            "mw" => self.molecular_weight = value.to_string(),
            "value" => self.value = value.to_string(),
            "from" => self.from = Self::parse_unit(field, value)?,
            "to" => self.to = Self::parse_unit(field, value)?,
            other => return reject_unknown(other),
        }
        self.recompute();
        Ok(())
    }
}
