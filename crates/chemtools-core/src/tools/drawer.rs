use crate::core::efficiency::DrugLikeness;
use crate::core::format::{fixed, parse_count, parse_number};
use crate::engine::container::Container;
use crate::engine::panel::{FieldView, Panel, PanelContext, PanelError, PanelView, ResultCard};
use crate::engine::registry::{Disposer, ToolDescriptor};

use super::{MOLECULAR_DRAWER, reject_unknown};

pub const KETCHER_FRAME_HEIGHT: u32 = 500;
pub const CHEMDOODLE_CANVAS: (u32, u32) = (900, 600);

const SMILES_ERROR: &str = "Error retrieving SMILES";
const PROPERTIES_ERROR: &str = "Enter the molecular properties of the drawn structure first.";

/// Molecular properties the host computes for the drawn structure.
const PROPERTY_FIELDS: [(&str, &str); 5] = [
    ("mw", "Molecular Weight (g/mol)"),
    ("logp", "LogP"),
    ("tpsa", "TPSA (Å²)"),
    ("hbd", "H-Bond Donors"),
    ("hba", "H-Bond Acceptors"),
];

#[derive(Debug, Clone, Copy, PartialEq)]
struct LipinskiReport {
    properties: DrugLikeness,
    tpsa: f64,
}

pub fn descriptor(ketcher_url: String) -> ToolDescriptor {
    ToolDescriptor::new(MOLECULAR_DRAWER, "Molecular Drawer", move |container| {
        init(container, ketcher_url.clone())
    })
}

pub fn init(container: &mut Container, ketcher_url: String) -> Option<Disposer> {
    container.mount(Box::new(DrawerPanel::new(ketcher_url)));
    let token = container.cancel_token();
    Some(Box::new(move || token.cancel()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Editor {
    None,
    KetcherLoading,
    Ketcher,
    ChemDoodle,
}

/// Switches between the Ketcher and ChemDoodle structure editors.
///
/// Ketcher runs in a frame that is loaded on demand; ChemDoodle draws on a sketcher canvas the
/// host provides. The structure drawn in the editor reaches the panel through the
/// `editor-smiles` field and is exported with the `get-smiles` action (Ketcher only).
/// Its molecular properties feed the rule-of-five check behind `calculate-lipinski`.
#[derive(Debug, Clone)]
pub struct DrawerPanel {
    ketcher_url: String,
    editor: Editor,
    editor_smiles: String,
    exported: Option<String>,
    properties: [String; PROPERTY_FIELDS.len()],
    lipinski: Option<LipinskiReport>,
    message: Option<&'static str>,
}

impl DrawerPanel {
    pub fn new(ketcher_url: String) -> Self {
        Self {
            ketcher_url,
            editor: Editor::None,
            editor_smiles: String::new(),
            exported: None,
            properties: Default::default(),
            lipinski: None,
            message: None,
        }
    }

    fn property(&self, field: &str) -> &str {
        PROPERTY_FIELDS
            .iter()
            .position(|(id, _)| *id == field)
            .map_or("", |i| self.properties[i].as_str())
    }

    fn count(&self, field: &str) -> Option<u32> {
        parse_count(self.property(field)).and_then(|n| u32::try_from(n).ok())
    }

    fn lipinski_report(&self) -> Option<LipinskiReport> {
        let molecular_weight = parse_number(self.property("mw")).filter(|mw| *mw > 0.0)?;
        let logp = parse_number(self.property("logp"))?;
        let tpsa = parse_number(self.property("tpsa")).filter(|tpsa| *tpsa >= 0.0)?;
        Some(LipinskiReport {
            properties: DrugLikeness {
                molecular_weight,
                logp,
                hbond_donors: self.count("hbd")?,
                hbond_acceptors: self.count("hba")?,
            },
            tpsa,
        })
    }

    fn editor_notes(&self) -> Vec<String> {
        match self.editor {
            Editor::None => vec!["Choose an editor to start drawing.".to_string()],
            Editor::KetcherLoading => vec![format!("Loading Ketcher from {}…", self.ketcher_url)],
            Editor::Ketcher => vec![format!(
                "Ketcher Editor: {} ({KETCHER_FRAME_HEIGHT} px tall)",
                self.ketcher_url
            )],
            Editor::ChemDoodle => vec![format!(
                "ChemDoodle Editor: {}×{} sketcher canvas",
                CHEMDOODLE_CANVAS.0, CHEMDOODLE_CANVAS.1
            )],
        }
    }
}

impl Panel for DrawerPanel {
    fn title(&self) -> &str {
        "Molecular Drawer"
    }

    fn view(&self) -> PanelView {
        let ketcher = self.editor == Editor::Ketcher;
        let mut notes = self.editor_notes();
        notes.extend(self.message.map(str::to_string));

        let mut results = Vec::new();
        if let Some(smiles) = &self.exported {
            results.push(ResultCard::new("SMILES", smiles.clone()));
        }
        if let Some(report) = &self.lipinski {
            let p = &report.properties;
            results.extend([
                ResultCard::new("Molecular Weight", fixed(p.molecular_weight, 2)).with_unit("g/mol"),
                ResultCard::new("LogP", fixed(p.logp, 2)),
                ResultCard::new("TPSA", fixed(report.tpsa, 2)).with_unit("Å²"),
                ResultCard::new("H-Bond Donors", p.hbond_donors.to_string()),
                ResultCard::new("H-Bond Acceptors", p.hbond_acceptors.to_string()),
                ResultCard::new("Rule of 5 Violations", p.rule_of_five_violations().to_string()),
            ]);
        }

        let mut fields = vec![
            FieldView::action("load-ketcher", "Load Ketcher"),
            FieldView::action("load-chemdoodle", "Load ChemDoodle"),
            FieldView::text("editor-smiles", "Editor Structure (SMILES)", &self.editor_smiles)
                .disabled(self.editor == Editor::None),
            FieldView::action("get-smiles", "Get SMILES").disabled(!ketcher),
        ];
        fields.extend(
            PROPERTY_FIELDS
                .iter()
                .zip(&self.properties)
                .map(|((id, label), value)| FieldView::number(id, label, value)),
        );
        fields.push(FieldView::action("calculate-lipinski", "Calculate Lipinski Properties"));

        PanelView {
            title: self.title().to_string(),
            description: "Draw a structure with Ketcher or ChemDoodle.".to_string(),
            fields,
            results,
            notes,
        }
    }

    fn input(&mut self, field: &str, value: &str, cx: &mut PanelContext) -> Result<(), PanelError> {
        match field {
            "load-ketcher" => {
                self.editor = Editor::KetcherLoading;
                self.exported = None;
                self.message = None;
                cx.request_sources([self.ketcher_url.clone()]);
            }
            "load-chemdoodle" => {
                self.editor = Editor::ChemDoodle;
                self.exported = None;
                self.message = None;
            }
            "editor-smiles" => {
                if self.editor == Editor::None {
                    return Err(PanelError::DisabledField(field.to_string()));
                }
                self.editor_smiles = value.trim().to_string();
            }
            "get-smiles" => {
                if self.editor != Editor::Ketcher {
                    return Err(PanelError::DisabledField(field.to_string()));
                }
                if self.editor_smiles.is_empty() {
                    self.exported = None;
                    self.message = Some(SMILES_ERROR);
                } else {
                    self.exported = Some(self.editor_smiles.clone());
                    self.message = None;
                }
            }
            "calculate-lipinski" => {
                self.lipinski = self.lipinski_report();
                self.message = self.lipinski.is_none().then_some(PROPERTIES_ERROR);
            }
            other => match PROPERTY_FIELDS.iter().position(|(id, _)| *id == other) {
                Some(i) => {
                    self.properties[i] = value.trim().to_string();
                    self.lipinski = None;
                }
                None => return reject_unknown(other),
            },
        }
        Ok(())
    }

    fn sources_loaded(&mut self, sources: &[String], _cx: &mut PanelContext) {
        if self.editor == Editor::KetcherLoading && sources.contains(&self.ketcher_url) {
            self.editor = Editor::Ketcher;
        }
    }
}
