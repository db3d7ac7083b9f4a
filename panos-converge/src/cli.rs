use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "panos-converge")]
#[command(about = "Converge PAN-OS configuration objects to a declared state")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Run one module against a device configuration.
    Apply(ApplyArgs),
    /// List registered modules.
    Modules(ModulesArgs),
    /// Show the options a module accepts.
    Describe(DescribeArgs),
}

#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// Module name, e.g. gre_tunnel or ha.
    pub module: String,
    /// Device configuration XML (the candidate configuration).
    #[arg(long)]
    pub device: PathBuf,
    /// Flat TOML or JSON file of module options.
    #[arg(long)]
    pub params: Option<PathBuf>,
    /// Override one option, e.g. --set ttl=42. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
    /// Where a commit writes the running configuration.
    /// Defaults to <device stem>.running.xml.
    #[arg(long)]
    pub running: Option<PathBuf>,
    /// Report what would change without modifying the device.
    #[arg(long)]
    pub check: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct ModulesArgs {
    /// Audit every module's option bindings.
    #[arg(long)]
    pub audit: bool,
}

#[derive(Parser, Debug)]
pub struct DescribeArgs {
    pub module: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
