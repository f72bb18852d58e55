use crate::core::dose::{CUSTOM_SUBJECT, DoseRegimen, SpeciesTable};
use crate::core::format::{PLACEHOLDER, fixed, parse_count, parse_number};
use crate::engine::container::Container;
use crate::engine::panel::{FieldView, Panel, PanelContext, PanelError, PanelView, ResultCard};
use crate::engine::registry::{Disposer, ToolDescriptor};

use super::{DOSE_CALCULATOR, reject_unknown};

/// Dosing frequencies offered by the schedule selector.
const SCHEDULES: [(&str, &str); 3] = [
    ("1", "Once daily"),
    ("2", "Twice daily"),
    ("3", "Three times daily"),
];

pub fn descriptor(species: SpeciesTable) -> ToolDescriptor {
    ToolDescriptor::new(DOSE_CALCULATOR, "Dose Calculator", move |container| {
        init(container, species.clone())
    })
}

pub fn init(container: &mut Container, species: SpeciesTable) -> Option<Disposer> {
    container.mount(Box::new(DosePanel::new(species)));
    None
}

/// Compound needed for an in-vivo study.
#[derive(Debug, Clone)]
pub struct DosePanel {
    species: SpeciesTable,
    subject: String,
    custom_weight: String,
    subjects: String,
    dose: String,
    schedule: String,
    days: String,
    total: String,
    per_subject_per_day: String,
}

impl DosePanel {
    pub fn new(species: SpeciesTable) -> Self {
        let subject = species
            .species()
            .first()
            .map_or_else(|| CUSTOM_SUBJECT.to_string(), |(name, _)| name.clone());
        Self {
            species,
            subject,
            custom_weight: String::new(),
            subjects: String::new(),
            dose: String::new(),
            schedule: SCHEDULES[0].0.to_string(),
            days: String::new(),
            total: PLACEHOLDER.to_string(),
            per_subject_per_day: PLACEHOLDER.to_string(),
        }
    }

    fn subject_options(&self) -> Vec<String> {
        self.species
            .species()
            .into_iter()
            .map(|(name, _)| name)
            .chain(std::iter::once(CUSTOM_SUBJECT.to_string()))
            .collect()
    }

    fn weight(&self) -> Option<f64> {
        if self.subject == CUSTOM_SUBJECT {
            parse_number(&self.custom_weight)
        } else {
            self.species.weight(&self.subject)
        }
    }

    fn regimen(&self) -> Option<DoseRegimen> {
        Some(DoseRegimen {
            weight_kg: self.weight()?,
            dose_mg_per_kg: parse_number(&self.dose)?,
            doses_per_day: parse_count(&self.schedule)? as f64,
            days: parse_count(&self.days)? as f64,
            subjects: parse_count(&self.subjects)? as f64,
        })
    }

    fn recompute(&mut self) {
        match self.regimen().and_then(|r| r.requirement()) {
            Some(requirement) => {
                self.total = fixed(requirement.total_mg, 2);
                self.per_subject_per_day = fixed(requirement.per_subject_per_day_mg, 2);
            }
            None => {
                self.total = PLACEHOLDER.to_string();
                self.per_subject_per_day = PLACEHOLDER.to_string();
            }
        }
    }
}

impl Panel for DosePanel {
    fn title(&self) -> &str {
        "In-Vivo Dose Calculator"
    }

    fn view(&self) -> PanelView {
        let custom = self.subject == CUSTOM_SUBJECT;
        let mut notes: Vec<String> = self
            .species
            .species()
            .into_iter()
            .map(|(name, kg)| format!("{name}: {kg} kg"))
            .collect();
        notes.push(
            "Calculations are based on: (Weight × Dose × Frequency × Days × Subjects)".to_string(),
        );
        PanelView {
            title: self.title().to_string(),
            description: "Compound required for a dosing study.".to_string(),
            fields: vec![
                FieldView::choice("subject", "Subject Type", self.subject_options(), &self.subject),
                FieldView::number("weight", "Custom Weight (kg)", &self.custom_weight)
                    .disabled(!custom),
                FieldView::number("subjects", "Number of Subjects", &self.subjects),
                FieldView::number("dose", "Dose (mg/kg)", &self.dose),
                FieldView::choice(
                    "schedule",
                    "Dosing Schedule",
                    SCHEDULES.map(|(key, _)| key),
                    &self.schedule,
                ),
                FieldView::number("days", "Number of Days", &self.days),
            ],
            results: vec![
                ResultCard::new("Total Compound Required", self.total.clone()).with_unit("mg"),
                ResultCard::new("Per Subject · Per Day", self.per_subject_per_day.clone())
                    .with_unit("mg"),
            ],
            notes,
        }
    }

    fn input(&mut self, field: &str, value: &str, _cx: &mut PanelContext) -> Result<(), PanelError> {
        match field {
            "subject" => {
                let options = self.subject_options();
                if !options.iter().any(|o| o == value) {
                    return Err(PanelError::invalid_choice(field, value, options));
                }
                self.subject = value.to_string();
            }
            "weight" => {
                if self.subject != CUSTOM_SUBJECT {
                    return Err(PanelError::DisabledField(field.to_string()));
                }
                self.custom_weight = value.to_string();
            }
            "schedule" => {
                if !SCHEDULES.iter().any(|(key, _)| *key == value) {
                    return Err(PanelError::invalid_choice(
                        field,
                        value,
                        SCHEDULES.map(|(key, _)| key),
                    ));
                }
                self.schedule = value.to_string();
            }
            "subjects" => self.subjects = value.to_string(),
            "dose" => self.dose = value.to_string(),
            "days" => self.days = value.to_string(),
            other => return reject_unknown(other),
        }
        self.recompute();
        Ok(())
    }
}
