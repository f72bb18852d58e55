use crate::core::selection::SelectionError;
use thiserror::Error;

/// How a form field accepts input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Text,
    /// One of a fixed set of option keys.
    Choice(Vec<String>),
    /// A button. The submitted value, if any, is the action's argument.
    Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: String,
    pub enabled: bool,
}

impl FieldView {
    pub fn number(id: &str, label: &str, value: &str) -> Self {
        Self::new(id, label, FieldKind::Number, value)
    }

    pub fn text(id: &str, label: &str, value: &str) -> Self {
        Self::new(id, label, FieldKind::Text, value)
    }

    pub fn choice<I, S>(id: &str, label: &str, options: I, value: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = options.into_iter().map(Into::into).collect();
        Self::new(id, label, FieldKind::Choice(options), value)
    }

    pub fn action(id: &str, label: &str) -> Self {
        Self::new(id, label, FieldKind::Action, "")
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.enabled = !disabled;
        self
    }

    fn new(id: &str, label: &str, kind: FieldKind, value: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            value: value.to_string(),
            enabled: true,
        }
    }
}

/// A computed value shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCard {
    pub label: String,
    pub value: String,
    pub unit: Option<String>,
    pub badge: Option<String>,
}

impl ResultCard {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            unit: None,
            badge: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_badge(mut self, badge: Option<&str>) -> Self {
        self.badge = badge.map(str::to_string);
        self
    }
}

/// Everything a mounted panel currently displays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelView {
    pub title: String,
    pub description: String,
    pub fields: Vec<FieldView>,
    pub results: Vec<ResultCard>,
    pub notes: Vec<String>,
}

impl PanelView {
    pub fn field(&self, id: &str) -> Option<&FieldView> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn result(&self, label: &str) -> Option<&ResultCard> {
        self.results.iter().find(|r| r.label == label)
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum PanelError {
    #[error("No tool is mounted")]
    NoPanel,

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field '{0}' is disabled")]
    DisabledField(String),

    #[error("'{0}' is not available until the tool has finished loading")]
    NotReady(String),

    #[error("'{value}' is not a valid option for '{field}' (expected one of: {})", .allowed.join(", "))]
    InvalidChoice {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid selection: {source}")]
    Selection {
        #[from]
        source: SelectionError,
    },
}

impl PanelError {
    pub fn invalid_choice<I, S>(field: &str, value: &str, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::InvalidChoice {
            field: field.to_string(),
            value: value.to_string(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

/// Side channel a panel uses while handling an event.
#[derive(Debug, Default)]
pub struct PanelContext {
    requested: Vec<String>,
}

impl PanelContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the host to load external scripts or frames before the panel can continue.
    pub fn request_sources<I, S>(&mut self, sources: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requested.extend(sources.into_iter().map(Into::into));
    }

    pub(crate) fn take_requested(&mut self) -> Vec<String> {
        std::mem::take(&mut self.requested)
    }
}

/// An interactive tool surface mounted in a [`Container`](super::container::Container).
///
/// Every accepted input recomputes all results from the current inputs, so [`Panel::view`] is
/// always consistent with the field values it reports.
pub trait Panel: Send {
    fn title(&self) -> &str;

    fn view(&self) -> PanelView;

    /// Applies an input event. Setting a field and pressing an action both arrive here; for
    /// actions `value` is the optional argument.
    fn input(&mut self, field: &str, value: &str, cx: &mut PanelContext) -> Result<(), PanelError>;

    /// Called once every source of an earlier request has loaded.
    fn sources_loaded(&mut self, _sources: &[String], _cx: &mut PanelContext) {}
}
