use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ChemTools CLI - Medicinal-chemistry calculators, viewer embeds and an interactive tool browser.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Where the suite configuration comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    /// Defaults to `config.toml` in the user's configuration directory, when present.
    #[arg(short = 'c', long = "config", global = true, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S viewer.default-pdb=1CRN
    #[arg(short = 'S', long = "set", global = true, value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive tool browser (tabs, tools and their panels).
    Browse(BrowseArgs),
    /// Convert a concentration between nM, µM, mM, ng/mL and mg/mL.
    Convert(ConvertArgs),
    /// Convert an IC50 to pIC50 and classify its potency.
    Ic50(Ic50Args),
    /// Convert a pIC50 back to an IC50 in nM.
    Pic50(Pic50Args),
    /// Fold difference in potency between two pIC50 values.
    Fold(FoldArgs),
    /// Total compound required for an in-vivo dosing study.
    Dose(DoseArgs),
    /// Lipophilic ligand efficiency (pIC50 - cLogP).
    Lle(LleArgs),
    /// Ligand efficiency from a pIC50 and a molecular formula.
    Le(LeArgs),
    /// Group efficiency between a parent and a modified compound.
    Ge(GeArgs),
    /// Count the non-hydrogen atoms of a molecular formula.
    HeavyAtoms(HeavyAtomsArgs),
    /// Validate an atom-selection expression and print its JSON form.
    Selection(SelectionArgs),
    /// Build a deep link to a category and tool.
    Link(LinkArgs),
}

/// Arguments for the `browse` subcommand.
#[derive(Args, Debug, Default)]
pub struct BrowseArgs {
    /// Start from a deep link, e.g. 'full-page.html?category=pk&tool=dose-calculator'.
    #[arg(long, value_name = "URL", conflicts_with_all = ["category", "tool"])]
    pub link: Option<String>,

    /// Category to open first.
    #[arg(long, value_name = "ID")]
    pub category: Option<String>,

    /// Tool to load within the opened category.
    #[arg(long, value_name = "ID", requires = "category")]
    pub tool: Option<String>,

    /// Fail every remote script or frame load instead of fetching it.
    #[arg(long)]
    pub offline: bool,

    /// Directory that relative embed sources (such as the Ketcher bundle) are resolved against.
    #[arg(long, value_name = "PATH")]
    pub assets_dir: Option<PathBuf>,

    /// Override the structure the 3D viewer loads first.
    #[arg(long, value_name = "PDB_ID")]
    pub pdb: Option<String>,
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// The value to convert.
    #[arg(allow_negative_numbers = true)]
    pub value: f64,

    /// Source unit (nM, uM, mM, ng/mL, mg/mL).
    pub from: String,

    /// Target unit (nM, uM, mM, ng/mL, mg/mL).
    pub to: String,

    /// Molecular weight in g/mol; required whenever a mass unit is involved.
    #[arg(long, value_name = "G_PER_MOL")]
    pub mw: Option<f64>,
}

/// Arguments for the `ic50` subcommand.
#[derive(Args, Debug)]
pub struct Ic50Args {
    /// The IC50 value.
    pub value: f64,

    /// Unit of the IC50 (nM, uM, mM).
    #[arg(short, long, default_value = "nM")]
    pub unit: String,
}

/// Arguments for the `pic50` subcommand.
#[derive(Args, Debug)]
pub struct Pic50Args {
    /// The pIC50 value.
    #[arg(allow_negative_numbers = true)]
    pub value: f64,
}

/// Arguments for the `fold` subcommand.
#[derive(Args, Debug)]
pub struct FoldArgs {
    /// pIC50 of compound A (the reference).
    #[arg(allow_negative_numbers = true)]
    pub pic50_a: f64,

    /// pIC50 of compound B.
    #[arg(allow_negative_numbers = true)]
    pub pic50_b: f64,
}

/// Arguments for the `dose` subcommand.
#[derive(Args, Debug)]
pub struct DoseArgs {
    /// Dose in mg/kg.
    #[arg(short, long, value_name = "MG_PER_KG")]
    pub dose: f64,

    /// Species whose reference weight is used (mouse, rat, dog, monkey, human or a configured one).
    #[arg(short, long, default_value = "mouse", conflicts_with = "weight")]
    pub species: String,

    /// Use a custom body weight in kg instead of a species.
    #[arg(short, long, value_name = "KG")]
    pub weight: Option<f64>,

    /// Number of subjects.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub subjects: u32,

    /// Doses per day (1, 2 or 3).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=3))]
    pub per_day: u32,

    /// Study length in days.
    #[arg(long, default_value_t = 1)]
    pub days: u32,
}

/// Arguments for the `lle` subcommand.
#[derive(Args, Debug)]
pub struct LleArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub pic50: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub clogp: f64,
}

/// Arguments for the `le` subcommand.
#[derive(Args, Debug)]
pub struct LeArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub pic50: f64,

    /// Molecular formula, e.g. C6H12O6.
    #[arg(long)]
    pub formula: String,
}

/// Arguments for the `ge` subcommand.
#[derive(Args, Debug)]
pub struct GeArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub parent_pic50: f64,

    #[arg(long)]
    pub parent_formula: String,

    #[arg(long = "mod-pic50", allow_negative_numbers = true)]
    pub modified_pic50: f64,

    #[arg(long = "mod-formula")]
    pub modified_formula: String,
}

/// Arguments for the `heavy-atoms` subcommand.
#[derive(Args, Debug)]
pub struct HeavyAtomsArgs {
    /// Molecular formula, e.g. C6H12O6.
    pub formula: String,
}

/// Arguments for the `selection` subcommand.
#[derive(Args, Debug)]
pub struct SelectionArgs {
    /// Selection expression, e.g. "chain:A;resi:1-50".
    pub expression: String,
}

/// Arguments for the `link` subcommand.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Category to link to. Unknown categories fall back to the default one.
    pub category: String,

    /// Tool within the category.
    pub tool: Option<String>,

    /// Page the link points at.
    #[arg(long, value_name = "PAGE")]
    pub page: Option<String>,
}
