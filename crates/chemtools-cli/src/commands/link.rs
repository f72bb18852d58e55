use crate::cli::{ConfigArgs, LinkArgs};
use crate::config::{ConfigOverrides, build_config};
use crate::error::{CliError, Result};
use chemtools::engine::config::SuiteConfig;
use chemtools::engine::deeplink::{DeepLink, FULL_PAGE};
use chemtools::engine::navigator::Navigator;
use chemtools::tools::standard_registry;
use tracing::warn;

pub fn run(args: LinkArgs, config_args: &ConfigArgs) -> Result<()> {
    let app = build_config(config_args, &ConfigOverrides::default())?;
    println!("{}", resolve_link(&args, &app.suite)?);
    Ok(())
}

/// Builds the link the way a browser would resolve it: the selection is opened in a navigator,
/// so unknown categories fall back and unknown tools are dropped.
fn resolve_link(args: &LinkArgs, suite: &SuiteConfig) -> Result<String> {
    let registry = standard_registry(suite)?;
    let mut navigator =
        Navigator::new(registry).with_default_category(suite.default_category.clone());

    let requested = DeepLink::new(args.category.clone(), args.tool.clone());
    let state = navigator
        .bootstrap(&requested.to_href())
        .ok_or_else(|| CliError::Argument("No categories are registered".to_string()))?;

    if state.category != args.category {
        warn!(
            requested = %args.category,
            opened = %state.category,
            "Unknown category, the link opens the default one."
        );
    }
    if let Some(tool) = &args.tool {
        if state.tool.as_ref() != Some(tool) {
            warn!(requested = %tool, "Unknown tool, the link opens the category's first tool.");
        }
    }

    let page = args.page.as_deref().unwrap_or(FULL_PAGE);
    Ok(DeepLink::new(state.category, state.tool).to_href_on(page))
}
