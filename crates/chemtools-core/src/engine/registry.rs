use std::fmt;
use std::sync::Arc;

use super::container::Container;
use super::error::EngineError;

/// Teardown hook returned by a tool's init; runs before the next tool mounts.
pub type Disposer = Box<dyn FnOnce() + Send>;

/// Mounts a tool into the container.
pub type ToolInit = Arc<dyn Fn(&mut Container) -> Option<Disposer> + Send + Sync>;

#[derive(Clone)]
pub struct ToolDescriptor {
    pub id: String,
    pub name: String,
    /// `None` models a tool whose implementation is missing.
    pub init: Option<ToolInit>,
}

impl ToolDescriptor {
    pub fn new<F>(id: &str, name: &str, init: F) -> Self
    where
        F: Fn(&mut Container) -> Option<Disposer> + Send + Sync + 'static,
    {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            init: Some(Arc::new(init)),
        }
    }

    pub fn unavailable(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            init: None,
        }
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("has_init", &self.init.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: String,
    pub tools: Vec<ToolDescriptor>,
}

impl Category {
    pub fn label(&self) -> String {
        category_label(&self.id)
    }

    pub fn tool(&self, tool_id: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.id == tool_id)
    }

    pub fn first_tool(&self) -> Option<&ToolDescriptor> {
        self.tools.first()
    }
}

/// Ordered category → tool catalogue. Insertion order is tab order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    categories: Vec<Category>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&mut self, id: &str) -> Result<(), EngineError> {
        if self.contains_category(id) {
            return Err(EngineError::DuplicateCategory(id.to_string()));
        }
        self.categories.push(Category {
            id: id.to_string(),
            tools: Vec::new(),
        });
        Ok(())
    }

    /// Appends `tool` to `category`, creating the category if it does not exist yet.
    pub fn register(&mut self, category: &str, tool: ToolDescriptor) -> Result<(), EngineError> {
        if !self.contains_category(category) {
            self.add_category(category)?;
        }
        let entry = self
            .categories
            .iter_mut()
            .find(|c| c.id == category)
            .ok_or_else(|| EngineError::UnknownCategory(category.to_string()))?;
        if entry.tool(&tool.id).is_some() {
            return Err(EngineError::DuplicateTool {
                category: category.to_string(),
                tool: tool.id,
            });
        }
        entry.tools.push(tool);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn contains_category(&self, id: &str) -> bool {
        self.category(id).is_some()
    }

    pub fn first_category(&self) -> Option<&Category> {
        self.categories.first()
    }

    pub fn tool(&self, category: &str, tool_id: &str) -> Option<&ToolDescriptor> {
        self.category(category)?.tool(tool_id)
    }

    /// Strict lookup for callers that must report a bad category or tool id.
    pub fn resolve(&self, category: &str, tool_id: &str) -> Result<&ToolDescriptor, EngineError> {
        let entry = self
            .category(category)
            .ok_or_else(|| EngineError::UnknownCategory(category.to_string()))?;
        entry.tool(tool_id).ok_or_else(|| EngineError::UnknownTool {
            category: category.to_string(),
            tool: tool_id.to_string(),
        })
    }
}

/// Display label of a category key: underscores become spaces and each word is capitalised
/// (`molecular_drawer` → `Molecular Drawer`).
pub fn category_label(id: &str) -> String {
    id.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(id: &str) -> ToolDescriptor {
        ToolDescriptor::new(id, id, |_| None)
    }

    #[test]
    fn categories_keep_insertion_order() {
        let mut registry = Registry::new();
        registry.register("pk", noop("dose")).unwrap();
        registry.register("medchem", noop("ic50")).unwrap();
        registry.register("pk", noop("conc")).unwrap();

        let ids: Vec<_> = registry.categories().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["pk", "medchem"]);
        let tools: Vec<_> = registry.category("pk").unwrap().tools.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(tools, vec!["dose", "conc"]);
    }

    #[test]
    fn same_tool_may_appear_in_several_categories_but_once_per_category() {
        let mut registry = Registry::new();
        registry.register("a", noop("conc")).unwrap();
        registry.register("b", noop("conc")).unwrap();
        assert!(matches!(
            registry.register("a", noop("conc")),
            Err(EngineError::DuplicateTool { .. })
        ));
        assert!(matches!(
            registry.add_category("b"),
            Err(EngineError::DuplicateCategory(_))
        ));
    }

    #[test]
    fn resolve_reports_which_part_is_unknown() {
        let mut registry = Registry::new();
        registry.register("pk", noop("dose")).unwrap();
        assert!(registry.resolve("pk", "dose").is_ok());
        assert!(matches!(
            registry.resolve("nope", "dose"),
            Err(EngineError::UnknownCategory(_))
        ));
        assert!(matches!(
            registry.resolve("pk", "nope"),
            Err(EngineError::UnknownTool { .. })
        ));
    }

    #[test]
    fn labels_are_title_cased() {
        assert_eq!(category_label("molecular_drawer"), "Molecular Drawer");
        assert_eq!(category_label("pk"), "Pk");
        assert_eq!(category_label("medchem"), "Medchem");
    }

    #[test]
    fn unavailable_descriptor_has_no_init() {
        let descriptor = ToolDescriptor::unavailable("ghost", "Ghost");
        assert!(descriptor.init.is_none());
        assert!(format!("{descriptor:?}").contains("has_init: false"));
    }
}
