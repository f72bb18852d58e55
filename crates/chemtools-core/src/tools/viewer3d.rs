//! Rule-based 3D molecule viewer backed by 3Dmol.js.
//!
//! The panel keeps an ordered stack of `selection → style` rules that the viewer library applies
//! top to bottom, and mirrors the stack into a shareable URL fragment.

use serde_json::{Map, Value, json};
use std::fmt;
use url::form_urlencoded;

use crate::core::selection::{AtomSelection, SelectionClause, SelectionValue, parse_selection};
use crate::engine::config::{EmbedUrls, ViewerDefaults};
use crate::engine::container::Container;
use crate::engine::panel::{FieldView, Panel, PanelContext, PanelError, PanelView, ResultCard};
use crate::engine::registry::{Disposer, ToolDescriptor};

use super::{MOLECULE_VIEWER, reject_unknown};

const DEFAULT_COLOR: &str = "#3498db";
const SURFACE_OPACITY: f64 = 0.7;
const ZOOM_STEP_IN: f64 = 1.2;
const ZOOM_STEP_OUT: f64 = 0.8;

pub fn descriptor(embeds: &EmbedUrls, defaults: &ViewerDefaults) -> ToolDescriptor {
    let sources = vec![embeds.threedmol.clone(), embeds.sortable.clone()];
    let defaults = defaults.clone();
    ToolDescriptor::new(MOLECULE_VIEWER, "3D Viewer", move |container| {
        init(container, sources.clone(), &defaults)
    })
}

/// Mounts the viewer and requests its libraries; the default structure loads once they arrive.
pub fn init(container: &mut Container, sources: Vec<String>, defaults: &ViewerDefaults) -> Option<Disposer> {
    container.mount(Box::new(ViewerPanel::new(sources.clone(), defaults)));
    container.request_load(sources);
    let token = container.cancel_token();
    Some(Box::new(move || token.cancel()))
}

macro_rules! keyed_enum {
    ($name:ident { $($variant:ident => $key:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const KEYS: &'static [&'static str] = &[$($key),+];

            pub fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key),+
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $($key => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }
    };
}

keyed_enum!(SelectionKind {
    Protein => "protein",
    Ligand => "ligand",
    Chain => "chain",
    Custom => "custom",
});

keyed_enum!(StylePreset {
    Cartoon => "cartoon",
    Stick => "stick",
    Sphere => "sphere",
    Line => "line",
    Cross => "cross",
    Hide => "hide",
});

keyed_enum!(SurfaceType {
    None => "none",
    Vdw => "VDW",
    Sas => "SAS",
    Ses => "SES",
});

keyed_enum!(ViewEffect {
    None => "none",
    AmbientOcclusion => "ao",
    Outline => "outline",
});

/// One `selection → style` entry of the rule stack.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selection: AtomSelection,
    /// Style object handed to the viewer; `{}` hides the selection.
    pub style: Value,
    pub description: String,
}

impl StyleRule {
    fn new(selection: AtomSelection, style: Value, description: impl Into<String>) -> Self {
        Self {
            selection,
            style,
            description: description.into(),
        }
    }
}

fn flag_selection(key: &str, flag: bool) -> AtomSelection {
    AtomSelection {
        clauses: vec![SelectionClause {
            key: key.to_string(),
            values: vec![SelectionValue::Flag(flag)],
        }],
    }
}

/// Rules installed whenever a structure is loaded.
pub fn default_rules() -> Vec<StyleRule> {
    let water = AtomSelection {
        clauses: vec![SelectionClause {
            key: "resn".to_string(),
            values: vec![SelectionValue::Text("HOH".to_string())],
        }],
    };
    vec![
        StyleRule::new(
            flag_selection("hetflag", false),
            json!({ "cartoon": { "color": "spectrum" } }),
            "Protein → Cartoon (Spectrum)",
        ),
        StyleRule::new(
            flag_selection("hetflag", true),
            json!({ "stick": {} }),
            "Ligands → Stick",
        ),
        StyleRule::new(water, json!({}), "Hide water"),
    ]
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Parses a 1-based rule position.
fn rule_index(field: &str, raw: &str, len: usize) -> Result<usize, PanelError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
        .ok_or_else(|| PanelError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a rule number between 1 and {len}, got '{}'", raw.trim()),
        })
}

#[derive(Debug, Clone)]
pub struct ViewerPanel {
    sources: Vec<String>,
    share_base_url: String,
    default_pdb: String,
    ready: bool,
    pdb_input: String,
    loaded_pdb: Option<String>,
    selection: SelectionKind,
    chains: String,
    custom: String,
    style: StylePreset,
    color: String,
    surface: SurfaceType,
    effect: ViewEffect,
    rules: Vec<StyleRule>,
    zoom: f64,
    spinning: bool,
}

impl ViewerPanel {
    pub fn new(sources: Vec<String>, defaults: &ViewerDefaults) -> Self {
        Self {
            sources,
            share_base_url: defaults.share_base_url.clone(),
            default_pdb: defaults.pdb_id.clone(),
            ready: false,
            pdb_input: defaults.pdb_id.clone(),
            loaded_pdb: None,
            selection: SelectionKind::Protein,
            chains: String::new(),
            custom: String::new(),
            style: StylePreset::Cartoon,
            color: DEFAULT_COLOR.to_string(),
            surface: SurfaceType::None,
            effect: ViewEffect::None,
            rules: Vec::new(),
            zoom: 1.0,
            spinning: false,
        }
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    fn load_structure(&mut self, requested: &str) {
        let id = requested.trim();
        let id = if id.is_empty() { self.default_pdb.as_str() } else { id };
        self.pdb_input = id.to_string();
        self.loaded_pdb = Some(id.to_string());
        self.rules = default_rules();
        self.zoom = 1.0;
    }

    fn selection_from_form(&self) -> Result<(AtomSelection, String), PanelError> {
        match self.selection {
            SelectionKind::Protein => Ok((flag_selection("hetflag", false), "Protein".to_string())),
            SelectionKind::Ligand => Ok((flag_selection("hetflag", true), "Ligands".to_string())),
            SelectionKind::Chain => {
                let chains: Vec<String> = self
                    .chains
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect();
                if chains.is_empty() {
                    return Err(PanelError::InvalidValue {
                        field: "chains".to_string(),
                        reason: "select at least one chain".to_string(),
                    });
                }
                let description = format!("Chain(s) {}", chains.join(","));
                let selection = AtomSelection {
                    clauses: vec![SelectionClause {
                        key: "chain".to_string(),
                        values: chains.into_iter().map(SelectionValue::Text).collect(),
                    }],
                };
                Ok((selection, description))
            }
            SelectionKind::Custom => {
                let raw = self.custom.trim();
                let selection = parse_selection(raw)?;
                let description = if selection.is_empty() {
                    "All atoms".to_string()
                } else {
                    format!("Custom: {raw}")
                };
                Ok((selection, description))
            }
        }
    }

    fn style_from_form(&self) -> (Value, String) {
        match self.style {
            StylePreset::Hide => (json!({}), "Hide".to_string()),
            preset => {
                let mut style = Map::new();
                style.insert(preset.key().to_string(), json!({ "color": self.color }));
                (Value::Object(style), format!("{preset} ({})", self.color))
            }
        }
    }

    fn add_rule(&mut self) -> Result<(), PanelError> {
        let (selection, selection_desc) = self.selection_from_form()?;
        let (style, style_desc) = self.style_from_form();
        self.rules.push(StyleRule::new(
            selection,
            style,
            format!("{selection_desc} → {style_desc}"),
        ));
        Ok(())
    }

    fn move_rule(&mut self, field: &str, raw: &str) -> Result<(), PanelError> {
        let mut parts = raw.split_whitespace();
        let (Some(from), Some(to), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(PanelError::InvalidValue {
                field: field.to_string(),
                reason: "expected '<from> <to>' rule numbers".to_string(),
            });
        };
        let from = rule_index(field, from, self.rules.len())?;
        let to = rule_index(field, to, self.rules.len())?;
        let rule = self.rules.remove(from);
        self.rules.insert(to, rule);
        Ok(())
    }

    /// Shareable link reproducing the loaded structure and rule stack.
    pub fn share_url(&self) -> Option<String> {
        let pdb = self.loaded_pdb.as_deref()?;
        let mut fragment = form_urlencoded::Serializer::new(String::new());
        fragment.append_pair("pdb", pdb);
        for (i, rule) in self.rules.iter().enumerate() {
            fragment.append_pair(&format!("select{}", i + 1), &rule.selection.to_string());
            fragment.append_pair(&format!("style{}", i + 1), &rule.style.to_string());
        }
        Some(format!("{}#{}", self.share_base_url, fragment.finish()))
    }

    fn scene_notes(&self) -> Vec<String> {
        if !self.ready {
            return vec![format!("Loading {}…", self.sources.join(", "))];
        }
        let mut notes = Vec::new();
        if let Some(pdb) = &self.loaded_pdb {
            notes.push(format!("Structure: pdb:{pdb}"));
        }
        notes.push(match self.surface {
            SurfaceType::None => "Surface: none".to_string(),
            surface => format!("Surface: {surface} (opacity {SURFACE_OPACITY}, white)"),
        });
        notes.push(match self.effect {
            ViewEffect::None => "Effect: default".to_string(),
            ViewEffect::AmbientOcclusion => "Effect: ambient occlusion".to_string(),
            ViewEffect::Outline => "Effect: outline".to_string(),
        });
        notes.push(format!(
            "Camera: zoom ×{:.2}{}",
            self.zoom,
            if self.spinning { ", spinning" } else { "" }
        ));
        notes
    }
}

fn choose<T>(field: &str, value: &str, keys: &[&str], parse: fn(&str) -> Option<T>) -> Result<T, PanelError> {
    parse(value).ok_or_else(|| PanelError::invalid_choice(field, value, keys.iter().copied()))
}

impl Panel for ViewerPanel {
    fn title(&self) -> &str {
        "3D Molecule Viewer"
    }

    fn view(&self) -> PanelView {
        let mut results: Vec<ResultCard> = self
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| ResultCard::new(format!("Rule {}", i + 1), rule.description.clone()))
            .collect();
        if let Some(url) = self.share_url() {
            results.push(ResultCard::new("Share URL", url));
        }

        let not_ready = !self.ready;
        let no_rules = self.rules.is_empty();
        PanelView {
            title: self.title().to_string(),
            description: "Build a custom molecular visualization by adding rules, then see the \
                          result in the viewer."
                .to_string(),
            fields: vec![
                FieldView::text("pdb", "PDB ID", &self.pdb_input),
                FieldView::action("load", "Load").disabled(not_ready),
                FieldView::choice("selection", "Selection", SelectionKind::KEYS.iter().copied(), self.selection.key()),
                FieldView::text("chains", "Chain(s)", &self.chains)
                    .disabled(self.selection != SelectionKind::Chain),
                FieldView::text("custom", "Custom Selection", &self.custom)
                    .disabled(self.selection != SelectionKind::Custom),
                FieldView::choice("style", "Style", StylePreset::KEYS.iter().copied(), self.style.key()),
                FieldView::text("color", "Color", &self.color),
                FieldView::choice("surface", "Surface", SurfaceType::KEYS.iter().copied(), self.surface.key()),
                FieldView::choice("effect", "Effect", ViewEffect::KEYS.iter().copied(), self.effect.key()),
                FieldView::action("add-rule", "Add Rule").disabled(not_ready),
                FieldView::action("delete-rule", "Delete Rule").disabled(no_rules),
                FieldView::action("move-rule", "Move Rule").disabled(no_rules),
                FieldView::action("zoom-in", "Zoom In").disabled(not_ready),
                FieldView::action("zoom-out", "Zoom Out").disabled(not_ready),
                FieldView::action("reset-view", "Reset View").disabled(not_ready),
                FieldView::action("toggle-spin", "Toggle Spin").disabled(not_ready),
            ],
            results,
            notes: self.scene_notes(),
        }
    }

    fn input(&mut self, field: &str, value: &str, _cx: &mut PanelContext) -> Result<(), PanelError> {
        let needs_viewer = matches!(
            field,
            "load" | "add-rule" | "delete-rule" | "move-rule" | "zoom-in" | "zoom-out" | "reset-view" | "toggle-spin"
        );
        if needs_viewer && !self.ready {
            return Err(PanelError::NotReady(field.to_string()));
        }

        match field {
            "pdb" => self.pdb_input = value.trim().to_string(),
            "load" => {
                let requested = if value.trim().is_empty() {
                    self.pdb_input.clone()
                } else {
                    value.to_string()
                };
                self.load_structure(&requested);
            }
            "selection" => {
                self.selection = choose(field, value, SelectionKind::KEYS, SelectionKind::from_key)?
            }
            "chains" => {
                if self.selection != SelectionKind::Chain {
                    return Err(PanelError::DisabledField(field.to_string()));
                }
                self.chains = value.to_string();
            }
            "custom" => {
                if self.selection != SelectionKind::Custom {
                    return Err(PanelError::DisabledField(field.to_string()));
                }
                self.custom = value.to_string();
            }
            "style" => self.style = choose(field, value, StylePreset::KEYS, StylePreset::from_key)?,
            "color" => {
                let color = value.trim();
                if !is_hex_color(color) {
                    return Err(PanelError::InvalidValue {
                        field: field.to_string(),
                        reason: format!("expected a colour like {DEFAULT_COLOR}, got '{color}'"),
                    });
                }
                self.color = color.to_ascii_lowercase();
            }
            "surface" => self.surface = choose(field, value, SurfaceType::KEYS, SurfaceType::from_key)?,
            "effect" => self.effect = choose(field, value, ViewEffect::KEYS, ViewEffect::from_key)?,
            "add-rule" => self.add_rule()?,
            "delete-rule" => {
                let index = rule_index(field, value, self.rules.len())?;
                self.rules.remove(index);
            }
            "move-rule" => self.move_rule(field, value)?,
            "zoom-in" => self.zoom *= ZOOM_STEP_IN,
            "zoom-out" => self.zoom *= ZOOM_STEP_OUT,
            "reset-view" => self.zoom = 1.0,
            "toggle-spin" => self.spinning = !self.spinning,
            other => return reject_unknown(other),
        }
        Ok(())
    }

    fn sources_loaded(&mut self, sources: &[String], _cx: &mut PanelContext) {
        if self.ready || !self.sources.iter().all(|s| sources.contains(s)) {
            return;
        }
        self.ready = true;
        let default_pdb = self.default_pdb.clone();
        self.load_structure(&default_pdb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{DEFAULT_SORTABLE_URL, DEFAULT_THREEDMOL_URL};

    fn ready_panel() -> ViewerPanel {
        let sources = vec![
            DEFAULT_THREEDMOL_URL.to_string(),
            DEFAULT_SORTABLE_URL.to_string(),
        ];
        let mut panel = ViewerPanel::new(sources.clone(), &ViewerDefaults::default());
        panel.sources_loaded(&sources, &mut PanelContext::new());
        panel
    }

    fn set(panel: &mut ViewerPanel, field: &str, value: &str) {
        panel.input(field, value, &mut PanelContext::new()).unwrap();
    }

    fn descriptions(panel: &ViewerPanel) -> Vec<&str> {
        panel.rules().iter().map(|r| r.description.as_str()).collect()
    }

    #[test]
    fn init_requests_both_libraries() {
        let mut container = Container::new();
        init(
            &mut container,
            vec!["3dmol.js".to_string(), "sortable.js".to_string()],
            &ViewerDefaults::default(),
        );
        let pending = container.take_pending();
        assert_eq!(pending[0].sources, vec!["3dmol.js", "sortable.js"]);
        assert!(
            !container
                .panel_view()
                .unwrap()
                .field("add-rule")
                .unwrap()
                .enabled
        );
    }

    #[test]
    fn actions_wait_for_libraries() {
        let mut panel = ViewerPanel::new(vec!["a.js".into()], &ViewerDefaults::default());
        assert_eq!(
            panel.input("add-rule", "", &mut PanelContext::new()),
            Err(PanelError::NotReady("add-rule".to_string()))
        );
        // Partial loads do not make it ready.
        panel.sources_loaded(&["b.js".to_string()], &mut PanelContext::new());
        assert!(panel.rules().is_empty());
    }

    #[test]
    fn loading_installs_default_rules() {
        let panel = ready_panel();
        assert_eq!(
            descriptions(&panel),
            vec!["Protein → Cartoon (Spectrum)", "Ligands → Stick", "Hide water"]
        );
        assert_eq!(panel.rules()[2].style, json!({}));
        assert!(panel.view().notes.contains(&"Structure: pdb:2POR".to_string()));
    }

    #[test]
    fn add_rule_from_form() {
        let mut panel = ready_panel();
        set(&mut panel, "selection", "chain");
        set(&mut panel, "chains", "A, B");
        set(&mut panel, "style", "stick");
        set(&mut panel, "color", "#FF0000");
        set(&mut panel, "add-rule", "");

        let rule = panel.rules().last().unwrap();
        assert_eq!(rule.description, "Chain(s) A,B → stick (#ff0000)");
        assert_eq!(rule.style, json!({ "stick": { "color": "#ff0000" } }));
        assert_eq!(rule.selection.to_json(), json!({ "chain": ["A", "B"] }));
    }

    #[test]
    fn custom_selection_is_parsed_not_evaluated() {
        let mut panel = ready_panel();
        set(&mut panel, "selection", "custom");
        set(&mut panel, "custom", "resi:19,23;chain:'B'");
        set(&mut panel, "style", "hide");
        set(&mut panel, "add-rule", "");
        assert_eq!(
            panel.rules().last().unwrap().description,
            "Custom: resi:19,23;chain:'B' → Hide"
        );

        set(&mut panel, "custom", "alert(document.cookie)");
        let err = panel
            .input("add-rule", "", &mut PanelContext::new())
            .unwrap_err();
        assert!(matches!(err, PanelError::Selection { .. }));
        assert_eq!(panel.rules().len(), 4);
    }

    #[test]
    fn rules_can_be_deleted_and_reordered() {
        let mut panel = ready_panel();
        set(&mut panel, "move-rule", "3 1");
        assert_eq!(
            descriptions(&panel),
            vec!["Hide water", "Protein → Cartoon (Spectrum)", "Ligands → Stick"]
        );
        set(&mut panel, "delete-rule", "2");
        assert_eq!(descriptions(&panel), vec!["Hide water", "Ligands → Stick"]);

        let mut cx = PanelContext::new();
        assert!(matches!(
            panel.input("delete-rule", "5", &mut cx),
            Err(PanelError::InvalidValue { .. })
        ));
        assert!(matches!(
            panel.input("move-rule", "1", &mut cx),
            Err(PanelError::InvalidValue { .. })
        ));
    }

    #[test]
    fn share_url_encodes_structure_and_rules() {
        let mut panel = ready_panel();
        set(&mut panel, "delete-rule", "3");
        set(&mut panel, "delete-rule", "2");
        let url = panel.share_url().unwrap();
        assert_eq!(
            url,
            "full-page.html#pdb=2POR&select1=hetflag%3Afalse&style1=%7B%22cartoon%22%3A%7B%22color%22%3A%22spectrum%22%7D%7D"
        );
    }

    #[test]
    fn loading_another_structure_resets_rules() {
        let mut panel = ready_panel();
        set(&mut panel, "delete-rule", "1");
        set(&mut panel, "load", "1CRN");
        assert_eq!(panel.rules().len(), 3);
        assert!(panel.share_url().unwrap().starts_with("full-page.html#pdb=1CRN&"));
    }

    #[test]
    fn invalid_form_values_are_rejected() {
        let mut panel = ready_panel();
        let mut cx = PanelContext::new();
        assert!(matches!(
            panel.input("style", "ribbon", &mut cx),
            Err(PanelError::InvalidChoice { .. })
        ));
        assert!(matches!(
            panel.input("color", "blue", &mut cx),
            Err(PanelError::InvalidValue { .. })
        ));
        assert_eq!(
            panel.input("chains", "A", &mut cx),
            Err(PanelError::DisabledField("chains".to_string()))
        );
        set(&mut panel, "selection", "chain");
        assert!(matches!(
            panel.input("add-rule", "", &mut cx),
            Err(PanelError::InvalidValue { .. })
        ));
    }

    #[test]
    fn camera_and_surface_show_in_notes() {
        let mut panel = ready_panel();
        set(&mut panel, "surface", "SES");
        set(&mut panel, "effect", "outline");
        set(&mut panel, "zoom-in", "");
        set(&mut panel, "toggle-spin", "");
        let notes = panel.view().notes;
        assert!(notes.contains(&"Surface: SES (opacity 0.7, white)".to_string()));
        assert!(notes.contains(&"Effect: outline".to_string()));
        assert!(notes.contains(&"Camera: zoom ×1.20, spinning".to_string()));
    }
}
