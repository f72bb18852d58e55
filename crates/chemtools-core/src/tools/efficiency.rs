use crate::core::efficiency::{
    Interpretation, group_efficiency, ligand_efficiency, lipophilic_efficiency,
};
use crate::core::format::{PLACEHOLDER, fixed, parse_number};
use crate::core::formula::count_heavy_atoms;
use crate::engine::container::Container;
use crate::engine::panel::{FieldView, Panel, PanelContext, PanelError, PanelView, ResultCard};
use crate::engine::registry::{Disposer, ToolDescriptor};

use super::{EFFICIENCY_METRICS, reject_unknown};

const FIELDS: [(&str, &str); 8] = [
    ("pic50", "LLE: pIC50 Value"),
    ("clogp", "LLE: cLogP Value"),
    ("le-pic50", "LE: pIC50 Value"),
    ("le-formula", "LE: Chemical Formula"),
    ("parent-pic50", "GE: Parent pIC50"),
    ("parent-formula", "GE: Parent Formula"),
    ("mod-pic50", "GE: Modified pIC50"),
    ("mod-formula", "GE: Modified Formula"),
];

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(EFFICIENCY_METRICS, "Efficiency Metrics", init)
}

pub fn init(container: &mut Container) -> Option<Disposer> {
    container.mount(Box::new(EfficiencyPanel::default()));
    None
}

/// LLE, LE and GE computed live from their own inputs.
///
/// Each metric is recomputed on every event; one that cannot be computed shows the placeholder
/// rather than its last valid value.
#[derive(Debug, Clone, Default)]
pub struct EfficiencyPanel {
    values: [String; FIELDS.len()],
}

#[derive(Debug, Clone, PartialEq)]
struct Metric {
    value: String,
    badge: Option<&'static str>,
}

impl Metric {
    fn new(value: Option<f64>, decimals: usize, interpret: fn(f64) -> Interpretation) -> Self {
        match value {
            Some(v) => {
                let value = fixed(v, decimals);
                let shown = value.parse().unwrap_or(v);
                Self {
                    value,
                    badge: Some(interpret(shown).label()),
                }
            }
            None => Self {
                value: PLACEHOLDER.to_string(),
                badge: None,
            },
        }
    }
}

impl EfficiencyPanel {
    fn get(&self, field: &str) -> &str {
        FIELDS
            .iter()
            .position(|(id, _)| *id == field)
            .map_or("", |i| self.values[i].as_str())
    }

    fn number(&self, field: &str) -> Option<f64> {
        parse_number(self.get(field))
    }

    fn lle(&self) -> Metric {
        let value = self
            .number("pic50")
            .zip(self.number("clogp"))
            .and_then(|(pic50, clogp)| lipophilic_efficiency(pic50, clogp));
        Metric::new(value, 2, Interpretation::for_lle)
    }

    fn le(&self) -> Metric {
        let atoms = count_heavy_atoms(self.get("le-formula"));
        let value = self
            .number("le-pic50")
            .and_then(|pic50| ligand_efficiency(pic50, atoms));
        Metric::new(value, 3, Interpretation::for_le)
    }

    fn ge(&self) -> Metric {
        let parent = self.number("parent-pic50");
        let modified = self.number("mod-pic50");
        let value = parent.zip(modified).and_then(|(parent, modified)| {
            group_efficiency(
                parent,
                count_heavy_atoms(self.get("parent-formula")),
                modified,
                count_heavy_atoms(self.get("mod-formula")),
            )
        });
        Metric::new(value, 3, Interpretation::for_ge)
    }
}

fn card(label: &str, metric: Metric) -> ResultCard {
    ResultCard::new(label, metric.value).with_badge(metric.badge)
}

impl Panel for EfficiencyPanel {
    fn title(&self) -> &str {
        "Efficiency Metrics Calculator"
    }

    fn view(&self) -> PanelView {
        let fields = FIELDS
            .iter()
            .zip(&self.values)
            .map(|((id, label), value)| {
                if id.ends_with("formula") {
                    FieldView::text(id, label, value)
                } else {
                    FieldView::number(id, label, value)
                }
            })
            .collect();
        let heavy_atoms = count_heavy_atoms(self.get("le-formula"));
        PanelView {
            title: self.title().to_string(),
            description: "Calculate ligand efficiency metrics for drug optimization.".to_string(),
            fields,
            results: vec![
                card("LLE", self.lle()),
                card("LE", self.le()),
                card("GE", self.ge()),
            ],
            notes: vec![
                format!("LE heavy atoms: {heavy_atoms}"),
                "LLE = pIC50 − cLogP; LE = −1.4 × pIC50 / HA; GE = −1.4 × ΔpIC50 / ΔHA".to_string(),
            ],
        }
    }

    fn input(&mut self, field: &str, value: &str, _cx: &mut PanelContext) -> Result<(), PanelError> {
        match FIELDS.iter().position(|(id, _)| *id == field) {
            Some(index) => {
                self.values[index] = value.to_string();
                Ok(())
            }
            None => reject_unknown(field),
        }
    }
}
