use anyhow::{bail, Context, Result};
use clap::Parser;
use panos_converge::config::{load_params, parse_overrides};
use panos_converge::invocation::{execute, prepare, ExecuteOptions};
use panos_converge::mapper::verify_bindings;
use panos_converge::modules::{all_modules, find_module, ModuleDef};
use panos_converge::params::ParameterSet;
use panos_converge::report::{render_describe, render_modules, render_result};
use panos_converge::session::XmlDevice;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod path_guard;

use cli::{ApplyArgs, Cli, Command, DescribeArgs, ModulesArgs, OutputFormat};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Apply(args) => run_apply(args),
        Command::Modules(args) => run_modules(args),
        Command::Describe(args) => run_describe(args),
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn lookup(name: &str) -> Result<&'static ModuleDef> {
    find_module(name).with_context(|| {
        let known: Vec<&str> = all_modules().iter().map(|m| m.name).collect();
        format!("unknown module '{name}' (available: {})", known.join(", "))
    })
}

fn run_apply(args: ApplyArgs) -> Result<()> {
    let module = lookup(&args.module)?;

    let mut raw = match &args.params {
        Some(path) => load_params(path)?,
        None => ParameterSet::new(),
    };
    raw.merge(parse_overrides(&args.set)?);
    debug!(module = module.name, options = raw.len(), "loaded parameters");

    let prepared = prepare(module, &raw)?;

    if let Some(running) = &args.running {
        path_guard::ensure_running_not_candidate(running, &args.device)?;
    }
    let mut device = XmlDevice::open(&args.device, args.running.clone()).with_context(|| {
        format!(
            "failed to open device configuration {}",
            args.device.display()
        )
    })?;

    let opts = ExecuteOptions {
        check_mode: args.check,
    };
    let result = execute(prepared, &mut device, opts)
        .with_context(|| format!("module {} failed", module.name))?;

    match args.format {
        OutputFormat::Text => println!("{}", render_result(&result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    if let Some(err) = &result.invocation_error {
        bail!("module {} failed: {err}", module.name);
    }
    Ok(())
}

fn run_modules(args: ModulesArgs) -> Result<()> {
    let modules = all_modules();
    println!("{}", render_modules(&modules));

    if args.audit {
        let mut failures = 0;
        for module in &modules {
            match verify_bindings(module) {
                Ok(()) => println!("audit {}: ok", module.name),
                Err(err) => {
                    failures += 1;
                    println!("audit {}: {err}", module.name);
                }
            }
        }
        if failures > 0 {
            bail!("binding audit failed for {failures} module(s)");
        }
    }
    Ok(())
}

fn run_describe(args: DescribeArgs) -> Result<()> {
    let module = lookup(&args.module)?;
    println!("{}", render_describe(module));
    Ok(())
}
