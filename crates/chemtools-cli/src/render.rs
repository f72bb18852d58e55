//! Plain-text rendering of the navigator for the terminal browser.

use chemtools::engine::container::ContentView;
use chemtools::engine::navigator::{Navigator, TabStrip, ToolButton};
use chemtools::engine::panel::{FieldKind, FieldView, PanelView, ResultCard};
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

const INK: &str = "━";

/// The tab labels on one line and the ink bar under the active tab on the next.
pub fn tab_strip(strip: &TabStrip) -> String {
    let mut labels = String::new();
    let mut column = 0;
    for tab in strip.tabs() {
        labels.push_str(&" ".repeat(tab.offset.saturating_sub(column)));
        let used = tab.label.width();
        let left = tab.width.saturating_sub(used) / 2;
        let right = tab.width.saturating_sub(used + left);
        labels.push_str(&" ".repeat(left));
        labels.push_str(&tab.label);
        labels.push_str(&" ".repeat(right));
        column = tab.offset + tab.width;
    }

    let mut out = labels.trim_end().to_string();
    if strip.active().is_some() {
        let ink = strip.ink();
        out.push('\n');
        out.push_str(&" ".repeat(ink.offset));
        out.push_str(&INK.repeat(ink.width));
    }
    out
}

pub fn tool_row(buttons: &[ToolButton]) -> String {
    buttons
        .iter()
        .map(|b| {
            if b.active {
                format!("[{}]", b.name)
            } else {
                format!(" {} ", b.name)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn field_line(field: &FieldView) -> String {
    let mut line = match &field.kind {
        FieldKind::Action => format!("  <{}> {}", field.id, field.label),
        FieldKind::Choice(options) => format!(
            "  {:<16} {}: {} ({})",
            field.id,
            field.label,
            field.value,
            options.join("|")
        ),
        FieldKind::Number | FieldKind::Text => {
            format!("  {:<16} {}: {}", field.id, field.label, field.value)
        }
    };
    if !field.enabled {
        line.push_str("  (disabled)");
    }
    line
}

fn result_line(card: &ResultCard) -> String {
    let mut line = format!("  {}: {}", card.label, card.value);
    if let Some(unit) = &card.unit {
        let _ = write!(line, " {}", unit);
    }
    if let Some(badge) = &card.badge {
        let _ = write!(line, "  [{}]", badge);
    }
    line
}

pub fn panel(view: &PanelView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", view.title);
    if !view.description.is_empty() {
        let _ = writeln!(out, "{}", view.description);
    }
    if !view.fields.is_empty() {
        out.push_str("\nInputs:\n");
        for field in &view.fields {
            let _ = writeln!(out, "{}", field_line(field));
        }
    }
    if !view.results.is_empty() {
        out.push_str("\nResults:\n");
        for card in &view.results {
            let _ = writeln!(out, "{}", result_line(card));
        }
    }
    for note in &view.notes {
        let _ = writeln!(out, "  · {}", note);
    }
    out.trim_end().to_string()
}

pub fn content(view: &ContentView) -> String {
    match view {
        ContentView::Empty => "(nothing loaded)".to_string(),
        ContentView::Notice(message) => format!("⚠ {}", message),
        ContentView::Panel(view) => panel(view),
    }
}

/// Tabs, tool row and content region.
pub fn screen(navigator: &Navigator) -> String {
    format!(
        "{}\n{}\n\n{}",
        tab_strip(navigator.tabs()),
        tool_row(navigator.tool_row()),
        content(&navigator.container().view())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemtools::engine::config::SuiteConfig;
    use chemtools::engine::registry::{Registry, ToolDescriptor};
    use chemtools::tools::standard_registry;

    fn navigator() -> Navigator {
        Navigator::new(standard_registry(&SuiteConfig::default()).unwrap())
    }

    #[test]
    fn ink_bar_sits_under_the_active_tab() {
        let mut nav = navigator();
        nav.open_category("pk");

        let rendered = tab_strip(nav.tabs());
        let mut lines = rendered.lines();
        let labels = lines.next().unwrap();
        let ink = lines.next().unwrap();

        let start = labels.find("Pk").unwrap();
        let bar_start = ink.find(INK).unwrap();
        assert_eq!(bar_start, start - 1);
        assert_eq!(ink.chars().filter(|c| c.to_string() == INK).count(), "Pk".len() + 2);
    }

    #[test]
    fn wide_labels_are_measured_in_columns() {
        let mut registry = Registry::new();
        for category in ["分光", "pk"] {
            registry.add_category(category).unwrap();
            registry
                .register(category, ToolDescriptor::new("noop", "Noop", |_| None))
                .unwrap();
        }
        let mut nav = Navigator::new(registry);
        nav.open_category("pk");

        let rendered = tab_strip(nav.tabs());
        let mut lines = rendered.lines();
        let labels = lines.next().unwrap();
        let ink = lines.next().unwrap();

        let before_pk = &labels[..labels.find("Pk").unwrap()];
        assert_eq!(before_pk.width(), 8);
        assert_eq!(ink.find(INK).unwrap(), 7);
    }

    #[test]
    fn no_ink_before_a_category_opens() {
        let nav = navigator();
        let rendered = tab_strip(nav.tabs());
        assert_eq!(rendered.lines().count(), 1);
        assert!(rendered.contains("Medchem"));
        assert!(rendered.contains("Molecular Drawer"));
    }

    #[test]
    fn active_tool_is_bracketed() {
        let mut nav = navigator();
        nav.open_category("medchem");
        let row = tool_row(nav.tool_row());
        assert!(row.starts_with('['));
        assert_eq!(row.matches('[').count(), 1);
    }

    #[test]
    fn panel_lists_fields_results_and_badges() {
        let mut nav = navigator();
        nav.open_category("medchem");
        nav.load_tool("medchem", "efficiency-metrics");
        nav.container_mut().input("pic50", "7.0").unwrap();
        nav.container_mut().input("clogp", "2.5").unwrap();

        let text = screen(&nav);
        assert!(text.contains("== Efficiency Metrics Calculator =="));
        assert!(text.contains("  LLE: 4.50  [poor]"));
        assert!(text.contains("  LE: –"));
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn disabled_fields_and_notices_are_marked() {
        let mut nav = navigator();
        nav.open_category("pk");
        nav.load_tool("pk", "dose-calculator");
        let text = content(&nav.container().view());
        assert!(text.lines().any(|l| l.contains("weight") && l.ends_with("(disabled)")));

        assert_eq!(
            content(&ContentView::Notice("Error: Failed to load script: x.js".into())),
            "⚠ Error: Failed to load script: x.js"
        );
    }
}
