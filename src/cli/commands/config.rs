//! `qf config` command - Configuration management
//!
//! View and modify the global and project config files.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::helpers::load_project;
use crate::cli::GlobalOpts;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path(PathArgs),

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,

    /// Show only project-level config
    #[arg(long = "project-only")]
    pub project_only: bool,

    /// Show only global (user) config
    #[arg(long = "global-only")]
    pub global_only: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., policy, thresholds.max_selected)
    pub key: String,

    /// Value to set (numbers and booleans keep their type)
    pub value: String,

    /// Set in global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Show only project config path
    #[arg(long = "project-only")]
    pub project_only: bool,

    /// Show only global config path
    #[arg(long = "global-only")]
    pub global_only: bool,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("author", "Author recorded on saved quotes"),
    ("policy", "Readiness policy: lenient or strict"),
    ("knowledge_db", "Path of the reference knowledge store"),
    ("default_format", "Default output format (yaml, json, tsv)"),
    ("thresholds.<field>", "Dimension extraction threshold override"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path(args) => run_path(args, global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();

    if let Some(key) = &args.key {
        return match get_config_value(&config, key)? {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    if args.project_only && args.global_only {
        return Err(miette::miette!(
            "Cannot specify both --project-only and --global-only"
        ));
    }

    if args.project_only {
        show_file("Project config:", project_config_path(global)?)?;
    } else if args.global_only {
        show_file("Global config:", global_config_path()?)?;
    } else {
        println!("{}", style("Effective Configuration").bold().underlined());
        println!();

        print_config_value("author", config.author.as_deref());
        print_config_value("policy", Some(config.policy().to_string().as_str()));
        let db = config.knowledge_db.as_ref().map(|p| p.display().to_string());
        print_config_value("knowledge_db", db.as_deref());
        print_config_value("default_format", config.default_format.as_deref());

        let thresholds = serde_yml::to_string(&config.thresholds()).into_diagnostic()?;
        println!("  {}:", style("thresholds").cyan());
        for line in thresholds.lines() {
            println!("    {}", style(line).yellow());
        }

        println!();
        println!("{}", style("Config Sources (in priority order):").dim());
        println!("  1. Environment variables (QF_AUTHOR, QF_POLICY, QF_KNOWLEDGE_DB)");
        println!("  2. Project config (.qf/config.yaml)");
        println!("  3. Global config (~/.config/quoteforge/config.yaml)");
    }

    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    validate_key(&args.key)?;

    let config_path = if args.global {
        global_config_path()?
    } else {
        project_config_path(global)?
    };

    let mut config_map = read_mapping(&config_path)?;
    set_nested_value(&mut config_map, &args.key, parse_scalar(&args.value))?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    let scope = if args.global { "global" } else { "project" };
    println!(
        "{} Set {} {} {} in {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow(),
        scope
    );

    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    let config_path = if args.global {
        global_config_path()?
    } else {
        project_config_path(global)?
    };

    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut config_map = read_mapping(&config_path)?;
    if !unset_nested_value(&mut config_map, &args.key) {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    let scope = if args.global { "global" } else { "project" };
    println!(
        "{} Removed {} from {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        scope
    );

    Ok(())
}

fn run_path(args: PathArgs, global: &GlobalOpts) -> Result<()> {
    if args.project_only && args.global_only {
        return Err(miette::miette!(
            "Cannot specify both --project-only and --global-only"
        ));
    }

    if args.project_only {
        println!("{}", project_config_path(global)?.display());
        return Ok(());
    }
    if args.global_only {
        println!("{}", global_config_path()?.display());
        return Ok(());
    }

    println!("{}", style("Configuration file paths:").bold());
    println!();
    print_path_line("Global:", Some(global_config_path()?));
    println!();
    print_path_line("Project:", project_config_path(global).ok());

    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<22} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'qf config set <key> <value>' to set a value.").dim()
    );

    Ok(())
}

fn global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn project_config_path(global: &GlobalOpts) -> Result<PathBuf> {
    Ok(load_project(global)?.config_path())
}

/// Reject keys that no config layer would read
fn validate_key(key: &str) -> Result<()> {
    let valid = match key.split_once('.') {
        Some(("thresholds", field)) => threshold_fields()?.iter().any(|f| f == field),
        Some(_) => false,
        None => VALID_KEYS.iter().any(|(k, _)| *k == key),
    };
    if valid {
        Ok(())
    } else {
        Err(miette::miette!(
            "Unknown config key '{}'. Run 'qf config keys' to list them.",
            key
        ))
    }
}

fn threshold_fields() -> Result<Vec<String>> {
    let defaults = serde_yml::to_value(Config::default().thresholds()).into_diagnostic()?;
    Ok(match defaults {
        serde_yml::Value::Mapping(map) => map
            .keys()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    })
}

fn get_config_value(config: &Config, key: &str) -> Result<Option<String>> {
    let value = match key {
        "author" => config.author.clone(),
        "policy" => Some(config.policy().to_string()),
        "knowledge_db" => config
            .knowledge_db
            .as_ref()
            .map(|p| p.display().to_string()),
        "default_format" => config.default_format.clone(),
        _ => match key.strip_prefix("thresholds.") {
            Some(field) => {
                let all = serde_yml::to_value(config.thresholds()).into_diagnostic()?;
                all.get(field)
                    .and_then(|v| serde_yml::to_string(v).ok())
                    .map(|s| s.trim().to_string())
            }
            None => None,
        },
    };
    Ok(value)
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}

fn print_path_line(label: &str, path: Option<PathBuf>) {
    let pad = " ".repeat(label.len() + 3);
    match path {
        Some(path) => {
            println!("  {} {}", style(label).cyan(), path.display());
            if path.exists() {
                println!("{}{}", pad, style("(exists)").green());
            } else {
                println!("{}{}", pad, style("(not created)").dim());
            }
        }
        None => println!(
            "  {} {}",
            style(label).cyan(),
            style("(not in a QuoteForge project)").dim()
        ),
    }
}

fn show_file(label: &str, path: PathBuf) -> Result<()> {
    println!("{} {}", style(label).bold(), style(path.display()).dim());
    println!();

    if path.exists() {
        let content = fs::read_to_string(&path).into_diagnostic()?;
        print!("{}", content);
    } else {
        println!("{}", style("(not created)").dim());
    }
    Ok(())
}

/// Existing config file as a YAML mapping; missing or blank files are empty
fn read_mapping(path: &std::path::Path) -> Result<serde_yml::Value> {
    let empty = || serde_yml::Value::Mapping(Default::default());
    if !path.exists() {
        return Ok(empty());
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    let parsed: serde_yml::Value = serde_yml::from_str(&content).unwrap_or_else(|_| empty());
    Ok(if parsed.is_mapping() { parsed } else { empty() })
}

/// Command-line value as a YAML scalar, so `0.5` stays a number
fn parse_scalar(raw: &str) -> serde_yml::Value {
    match serde_yml::from_str::<serde_yml::Value>(raw) {
        Ok(v @ (serde_yml::Value::Number(_) | serde_yml::Value::Bool(_))) => v,
        _ => serde_yml::Value::String(raw.to_string()),
    }
}

fn set_nested_value(root: &mut serde_yml::Value, key: &str, value: serde_yml::Value) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((last, parents)) = parts.split_last() else {
        return Err(miette::miette!("Empty config key"));
    };

    let mut current = root;
    for part in parents {
        let serde_yml::Value::Mapping(map) = current else {
            return Err(miette::miette!("'{}' is not a mapping", part));
        };
        let key = serde_yml::Value::String(part.to_string());
        if !map.contains_key(&key) {
            map.insert(key.clone(), serde_yml::Value::Mapping(Default::default()));
        }
        current = map
            .get_mut(&key)
            .ok_or_else(|| miette::miette!("Cannot set '{}'", part))?;
    }

    match current {
        serde_yml::Value::Mapping(map) => {
            map.insert(serde_yml::Value::String(last.to_string()), value);
            Ok(())
        }
        _ => Err(miette::miette!("Cannot set '{}': parent is not a mapping", key)),
    }
}

fn unset_nested_value(root: &mut serde_yml::Value, key: &str) -> bool {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((last, parents)) = parts.split_last() else {
        return false;
    };

    let mut current = root;
    for part in parents {
        match current.get_mut(*part) {
            Some(next) => current = next,
            None => return false,
        }
    }

    match current {
        serde_yml::Value::Mapping(map) => {
            let key = serde_yml::Value::String(last.to_string());
            map.remove(&key).is_some()
        }
        _ => false,
    }
}
