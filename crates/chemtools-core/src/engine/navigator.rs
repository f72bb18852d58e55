use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;

use super::container::Container;
use super::deeplink::DeepLink;
use super::registry::{Disposer, Registry, category_label};

/// Notice shown in place of a tool whose implementation is missing.
pub const MISSING_TOOL_NOTICE: &str = "Tool unavailable (missing implementation)";

/// Columns of padding on each side of a tab label.
const TAB_PADDING: usize = 1;
/// Columns between adjacent tabs.
const TAB_GAP: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavState {
    pub category: String,
    pub tool: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    SelectCategory(String),
    SelectTool { category: String, tool: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub category: String,
    pub label: String,
    /// Column of the tab's left edge.
    pub offset: usize,
    pub width: usize,
}

/// The indicator underlining the active tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InkBar {
    pub offset: usize,
    pub width: usize,
}

/// One tab per category with measured positions, laid out left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabStrip {
    tabs: Vec<Tab>,
    active: Option<usize>,
    ink: InkBar,
}

impl TabStrip {
    pub fn layout(registry: &Registry) -> Self {
        let mut offset = 0;
        let tabs = registry
            .categories()
            .iter()
            .map(|category| {
                let label = category_label(&category.id);
                let width = label.width() + 2 * TAB_PADDING;
                let tab = Tab {
                    category: category.id.clone(),
                    label,
                    offset,
                    width,
                };
                offset += width + TAB_GAP;
                tab
            })
            .collect();
        Self {
            tabs,
            active: None,
            ink: InkBar::default(),
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active(&self) -> Option<&Tab> {
        self.active.map(|i| &self.tabs[i])
    }

    pub fn ink(&self) -> InkBar {
        self.ink
    }

    /// Total columns spanned by the strip.
    pub fn width(&self) -> usize {
        self.tabs.last().map_or(0, |tab| tab.offset + tab.width)
    }

    fn activate(&mut self, category: &str) {
        self.active = self.tabs.iter().position(|tab| tab.category == category);
        if let Some(tab) = self.active() {
            self.ink = InkBar {
                offset: tab.offset,
                width: tab.width,
            };
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolButton {
    pub id: String,
    pub name: String,
    pub active: bool,
}

/// Tab/tool navigation controller.
///
/// Owns the registry, the content region and the active selection. Unknown categories fall back
/// to the default one and unknown tools are ignored; neither is an error.
pub struct Navigator {
    registry: Registry,
    default_category: Option<String>,
    container: Container,
    state: Option<NavState>,
    tabs: TabStrip,
    tool_row: Vec<ToolButton>,
    disposer: Option<Disposer>,
}

impl Navigator {
    pub fn new(registry: Registry) -> Self {
        let tabs = TabStrip::layout(&registry);
        Self {
            registry,
            default_category: None,
            container: Container::new(),
            state: None,
            tabs,
            tool_row: Vec::new(),
            disposer: None,
        }
    }

    /// Sets the category used when a requested one is not registered.
    pub fn with_default_category(mut self, category: Option<String>) -> Self {
        self.default_category = category;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self) -> Option<&NavState> {
        self.state.as_ref()
    }

    pub fn tabs(&self) -> &TabStrip {
        &self.tabs
    }

    pub fn tool_row(&self) -> &[ToolButton] {
        &self.tool_row
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    /// The category `open_category` falls back to.
    pub fn default_category(&self) -> Option<&str> {
        self.default_category
            .as_deref()
            .filter(|c| self.registry.contains_category(c))
            .or_else(|| self.registry.first_category().map(|c| c.id.as_str()))
    }

    /// Activates a category and loads its first tool.
    ///
    /// Returns the category actually opened, which differs from `category` when it had to fall
    /// back, or `None` when the registry is empty.
    pub fn open_category(&mut self, category: &str) -> Option<String> {
        let resolved = if self.registry.contains_category(category) {
            category.to_string()
        } else {
            let fallback = self.default_category()?.to_string();
            debug!(requested = category, fallback = %fallback, "Unknown category, falling back.");
            fallback
        };

        self.tabs.activate(&resolved);
        let tools = self
            .registry
            .category(&resolved)
            .map(|c| c.tools.clone())
            .unwrap_or_default();
        self.tool_row = tools
            .iter()
            .map(|t| ToolButton {
                id: t.id.clone(),
                name: t.name.clone(),
                active: false,
            })
            .collect();
        self.state = Some(NavState {
            category: resolved.clone(),
            tool: None,
        });
        info!(category = %resolved, "Category opened.");

        match tools.first() {
            Some(first) => {
                self.load_tool(&resolved, &first.id);
            }
            None => {
                self.dispose_current();
                self.container.clear();
            }
        }
        Some(resolved)
    }

    /// Mounts `tool_id` from `category`.
    ///
    /// A no-op returning `false` unless `category` is the active category and contains the tool.
    pub fn load_tool(&mut self, category: &str, tool_id: &str) -> bool {
        let active = self.state.as_ref().map(|s| s.category.as_str());
        if active != Some(category) {
            debug!(category, tool_id, "Ignoring tool load for an inactive category.");
            return false;
        }
        let Some(descriptor) = self.registry.tool(category, tool_id).cloned() else {
            debug!(category, tool_id, "Ignoring unknown tool.");
            return false;
        };

        self.dispose_current();
        self.container.clear();
        for button in &mut self.tool_row {
            button.active = button.id == tool_id;
        }
        if let Some(state) = self.state.as_mut() {
            state.tool = Some(tool_id.to_string());
        }

        match &descriptor.init {
            Some(init) => self.disposer = init(&mut self.container),
            None => self.container.show_notice(MISSING_TOOL_NOTICE),
        }
        info!(category, tool = tool_id, "Tool loaded.");
        true
    }

    /// Opens the selection named by a deep link (query string or hash).
    pub fn bootstrap(&mut self, link: &str) -> Option<NavState> {
        let link = DeepLink::parse(link);
        let requested = link.category.as_deref().unwrap_or("");
        let opened = self.open_category(requested)?;

        if let Some(tool) = link.tool.as_deref() {
            let first = self.registry.category(&opened).and_then(|c| c.first_tool());
            if first.is_some_and(|t| t.id != tool) {
                self.load_tool(&opened, tool);
            }
        }
        self.state.clone()
    }

    /// Applies a navigation event. Returns whether the selection changed.
    pub fn dispatch(&mut self, event: NavEvent) -> bool {
        match event {
            NavEvent::SelectCategory(category) => self.open_category(&category).is_some(),
            NavEvent::SelectTool { category, tool } => self.load_tool(&category, &tool),
        }
    }

    /// Link reproducing the current selection.
    pub fn deep_link(&self) -> Option<String> {
        let state = self.state.as_ref()?;
        Some(DeepLink::new(state.category.clone(), state.tool.clone()).to_href())
    }

    fn dispose_current(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            debug!("Running disposer of the previous tool.");
            disposer();
        }
    }
}

impl Drop for Navigator {
    fn drop(&mut self) {
        self.dispose_current();
    }
}
