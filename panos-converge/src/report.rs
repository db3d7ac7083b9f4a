use colored::Colorize;

use crate::diff::{format_summary, format_text, Change};
use crate::modules::ModuleDef;
use crate::result::ModuleResult;
use crate::schema::{all_options, Choices, DefaultValue, OptionSpec};

/// Render changes for terminal output.
pub fn render_changes(changes: &[Change]) -> String {
    let raw = format_text(changes);
    let mut out = Vec::new();

    for line in raw.lines() {
        let colored = if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with('~') {
            line.yellow().to_string()
        } else {
            line.to_string()
        };
        out.push(colored);
    }

    out.join("\n")
}

/// Render change counts for terminal output.
pub fn render_summary(changes: &[Change]) -> String {
    format_summary(changes).cyan().to_string()
}

/// Render a module result as text.
pub fn render_result(result: &ModuleResult) -> String {
    let mut out = Vec::new();
    let status = if result.failed() {
        "failed".red().bold().to_string()
    } else if result.changed {
        "changed".yellow().bold().to_string()
    } else {
        "ok".green().bold().to_string()
    };
    out.push(format!("{status} changed={} msg={}", result.changed, result.msg));

    if let Some(kind) = result.error_kind {
        let kind = serde_json::to_value(kind)
            .ok()
            .and_then(|v| v.as_str().map(ToString::to_string))
            .unwrap_or_default();
        out.push(format!("error_kind={kind}").red().to_string());
    }

    if !result.changes.is_empty() {
        out.push(String::new());
        out.push(render_changes(&result.changes));
        out.push(render_summary(&result.changes));
    }

    if let Some(diff) = &result.diff {
        out.push(String::new());
        out.push("before".bold().to_string());
        out.push(diff.before.clone().unwrap_or_else(|| "- none".to_string()));
        out.push("after".bold().to_string());
        out.push(diff.after.clone().unwrap_or_else(|| "- none".to_string()));
    }

    if let Some(gathered) = &result.gathered {
        out.push(String::new());
        out.push(format!("gathered={}", gathered.len()));
        for obj in gathered {
            out.push(format!("- {obj}"));
        }
    }

    out.join("\n")
}

/// Render the module registry, one line per module.
pub fn render_modules(modules: &[&ModuleDef]) -> String {
    let mut out = Vec::new();
    for module in modules {
        let states: Vec<&str> = module.states.iter().map(|s| s.as_str()).collect();
        out.push(format!(
            "- {} [{}] {}",
            module.name.bold(),
            states.join("|"),
            module.summary
        ));
    }
    out.join("\n")
}

/// Render the options of one module.
pub fn render_describe(module: &ModuleDef) -> String {
    let mut out = Vec::new();
    out.push(format!("{} - {}", module.name.bold(), module.summary));
    if let Some(min) = module.min_version {
        out.push(format!("requires PAN-OS {min} or newer"));
    }
    out.push(String::new());
    out.push("options".to_string());
    for option in all_options(module) {
        out.push(describe_option(option));
    }
    out.join("\n")
}

fn describe_option(option: &OptionSpec) -> String {
    let mut line = format!("- {} ({})", option.name, option.ty);
    if option.required {
        line.push_str(" required");
    }
    match option.default {
        Some(DefaultValue::Str(s)) => line.push_str(&format!(" default={s}")),
        Some(DefaultValue::Int(i)) => line.push_str(&format!(" default={i}")),
        Some(DefaultValue::Bool(b)) => line.push_str(&format!(" default={b}")),
        None => {}
    }
    match option.choices {
        Choices::Any => {}
        Choices::Str(choices) => line.push_str(&format!(" choices={}", choices.join("|"))),
        Choices::Int(choices) => {
            let choices: Vec<String> = choices.iter().map(ToString::to_string).collect();
            line.push_str(&format!(" choices={}", choices.join("|")));
        }
    }
    if let Some((min, max)) = option.range {
        line.push_str(&format!(" range={min}..={max}"));
    }
    format!("{line}: {}", option.help)
}
