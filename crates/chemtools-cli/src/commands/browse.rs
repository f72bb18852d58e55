use crate::cli::{BrowseArgs, ConfigArgs};
use crate::config::{ConfigOverrides, build_config};
use crate::error::Result;
use crate::fetch::HttpScriptFetcher;
use crate::render;
use crate::utils::progress::LoadSpinner;
use chemtools::engine::deeplink::DeepLink;
use chemtools::engine::embed::{ScriptCache, ScriptFetcher, settle_pending};
use chemtools::engine::navigator::{NavEvent, Navigator};
use chemtools::tools::standard_registry;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

const PROMPT: &str = "chemtools> ";

const HELP: &str = "\
Commands:
  tabs                    Show the category tabs and the tools of the open category
  tab <category>          Open a category and its first tool
  tool <tool-id>          Load a tool of the open category
  set <field> [value]     Set a field of the mounted tool (no value clears it)
  press <action> [arg]    Press a button of the mounted tool
  show                    Redraw the whole screen
  link                    Print a deep link to the current selection
  help                    Show this help
  quit                    Leave the browser";

pub async fn run(args: BrowseArgs, config_args: &ConfigArgs) -> Result<()> {
    let overrides = ConfigOverrides {
        default_category: None,
        default_pdb: args.pdb.clone(),
        assets_dir: args.assets_dir.clone(),
    };
    let app = build_config(config_args, &overrides)?;
    if let Some(source) = &app.source {
        info!("Configuration loaded from {:?}", source);
    }

    let registry = standard_registry(&app.suite)?;
    let navigator =
        Navigator::new(registry).with_default_category(app.suite.default_category.clone());
    let fetcher = HttpScriptFetcher::new(app.assets_dir.clone(), args.offline)?;
    let mut session = Session::new(navigator, Box::new(fetcher), LoadSpinner::new());

    println!("{}", session.open(&start_link(&args)).await);
    println!("\nType 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", PROMPT);
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        match session.execute(&line).await {
            Step::Output(text) if text.is_empty() => {}
            Step::Output(text) => println!("{}", text),
            Step::Quit => break,
        }
    }

    info!("Browser session closed.");
    Ok(())
}

fn start_link(args: &BrowseArgs) -> String {
    match (&args.link, &args.category) {
        (Some(link), _) => link.clone(),
        (None, Some(category)) => DeepLink::new(category.clone(), args.tool.clone()).to_href(),
        (None, None) => String::new(),
    }
}

/// What the terminal should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Output(String),
    Quit,
}

/// One interactive browser: the navigator plus the loader that settles its pending sources.
pub struct Session {
    navigator: Navigator,
    cache: ScriptCache,
    fetcher: Box<dyn ScriptFetcher>,
    spinner: LoadSpinner,
}

impl Session {
    pub fn new(navigator: Navigator, fetcher: Box<dyn ScriptFetcher>, spinner: LoadSpinner) -> Self {
        Self {
            navigator,
            cache: ScriptCache::new(),
            fetcher,
            spinner,
        }
    }

    /// Opens the selection named by `link` (an empty link opens the default category).
    pub async fn open(&mut self, link: &str) -> String {
        let opened = self.navigator.bootstrap(link);
        debug!(?opened, "Session bootstrapped.");
        self.settle().await;
        render::screen(&self.navigator)
    }

    pub async fn execute(&mut self, line: &str) -> Step {
        let line = line.trim();
        let (command, rest) = split_word(line);
        let output = match command {
            "" => String::new(),
            "help" => HELP.to_string(),
            "quit" | "exit" => return Step::Quit,
            "tabs" => format!(
                "{}\n{}",
                render::tab_strip(self.navigator.tabs()),
                render::tool_row(self.navigator.tool_row())
            ),
            "show" => render::screen(&self.navigator),
            "link" => self
                .navigator
                .deep_link()
                .unwrap_or_else(|| "(no selection)".to_string()),
            "tab" => self.open_tab(rest).await,
            "tool" => self.open_tool(rest).await,
            "set" | "press" => self.input(command, rest).await,
            other => format!("Unknown command '{}'. Type 'help' for commands.", other),
        };
        Step::Output(output)
    }

    async fn open_tab(&mut self, category: &str) -> String {
        if category.is_empty() {
            return "Usage: tab <category>".to_string();
        }
        self.navigator
            .dispatch(NavEvent::SelectCategory(category.to_string()));
        let mut out = String::new();
        if let Some(state) = self.navigator.state() {
            if state.category != category {
                out = format!(
                    "Unknown category '{}', showing '{}'.\n",
                    category, state.category
                );
            }
        }
        self.settle().await;
        out + &render::screen(&self.navigator)
    }

    async fn open_tool(&mut self, tool: &str) -> String {
        if tool.is_empty() {
            return "Usage: tool <tool-id>".to_string();
        }
        let Some(category) = self.navigator.state().map(|s| s.category.clone()) else {
            return "No category is open.".to_string();
        };
        let changed = self.navigator.dispatch(NavEvent::SelectTool {
            category: category.clone(),
            tool: tool.to_string(),
        });
        if !changed {
            return format!("Unknown tool '{}' in '{}'.", tool, category);
        }
        self.settle().await;
        render::screen(&self.navigator)
    }

    async fn input(&mut self, command: &str, rest: &str) -> String {
        let (field, value) = split_word(rest);
        if field.is_empty() {
            return format!("Usage: {} <field> [value]", command);
        }
        if let Err(e) = self.navigator.container_mut().input(field, value) {
            return format!("Error: {}", e);
        }
        self.settle().await;
        render::content(&self.navigator.container().view())
    }

    async fn settle(&mut self) {
        if !self.navigator.container().has_pending() {
            return;
        }
        let loading = self
            .navigator
            .tool_row()
            .iter()
            .find(|b| b.active)
            .map_or_else(|| "external sources".to_string(), |b| b.name.clone());
        self.spinner.start(&loading);
        let applied = settle_pending(
            self.navigator.container_mut(),
            &mut self.cache,
            self.fetcher.as_ref(),
        )
        .await;
        self.spinner.finish(applied);
    }
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (input, ""),
    }
}
