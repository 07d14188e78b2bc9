//! xplat CLI
//!
//! Entry point for the `xplat` command-line tool.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::error;
use xplat_document::merge_into_with;
use xplat_prepare::config::{default_host_config_path, ConfigError};
use xplat_prepare::{
    CommandPlugins, DirectoryProject, EffectiveConfig, FileMetadataStore, GenericPlatformFactory,
    PrepareOptions, PrepareSettings, Preparer, ProjectPaths, ProjectRegistry, ScriptHookRunner,
};

#[derive(Parser)]
#[command(name = "xplat")]
#[command(about = "Prepare cross-platform app build trees", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy web assets and merge configuration into platform build trees
    Prepare {
        /// Prepare only this platform (default: every added platform)
        platform: Option<String>,

        /// Debug logging, passed to hooks as `verbose`
        #[arg(long, short = 'v')]
        verbose: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,

        /// Settings file used instead of .xplat/prepare.toml
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Options passed through to hooks (after --)
        #[arg(last = true)]
        options: Vec<String>,
    },

    /// List platforms added to the project
    Platforms {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Merge one configuration document into another
    MergeConfig {
        /// Document merged from
        source: PathBuf,

        /// Document merged into
        dest: PathBuf,

        /// Apply `<platform name=...>` sections for this platform
        #[arg(long, default_value = "")]
        platform: String,

        /// Overwrite existing attributes and text
        #[arg(long)]
        clobber: bool,

        /// Write here instead of back to DEST
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show effective settings with provenance
    Config {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Prepare { verbose: true, .. });
    xplat_prepare::telemetry::init(verbose);

    let code = match cli.command {
        Commands::Prepare {
            platform,
            verbose,
            json,
            config,
            options,
        } => run_prepare(platform, verbose, json, config, options).await,
        Commands::Platforms { json } => run_platforms(json),
        Commands::MergeConfig {
            source,
            dest,
            platform,
            clobber,
            output,
        } => run_merge_config(&source, &dest, &platform, clobber, output),
        Commands::Config { json } => run_config(json),
    };
    process::exit(code);
}

fn current_dir() -> Result<PathBuf, i32> {
    std::env::current_dir().map_err(|e| {
        eprintln!("Error: cannot determine current directory: {}", e);
        1
    })
}

/// Resolve settings for the project containing `start`.
///
/// The project is located with host-level settings first, then settings
/// are rebuilt with the project's own file layered on top. An explicit
/// `--config` file replaces the project file and must exist.
fn load_config(start: &Path, config_path: Option<&Path>) -> Result<(EffectiveConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = config_path {
        let config = EffectiveConfig::with_config_file(path, None)?;
        let root = DirectoryProject::new(config.settings()?).find_root(start);
        return Ok((config, root));
    }

    let host = default_host_config_path();
    let bootstrap = EffectiveConfig::build(host.as_deref(), None, None)?;
    match DirectoryProject::new(bootstrap.settings()?).find_root(start) {
        Some(root) => Ok((EffectiveConfig::for_project(&root, None)?, Some(root))),
        None => Ok((bootstrap, None)),
    }
}

fn parse_options(options: Vec<String>) -> Value {
    Value::Array(options.into_iter().map(Value::String).collect())
}

async fn run_prepare(
    platform: Option<String>,
    verbose: bool,
    json: bool,
    config_path: Option<PathBuf>,
    options: Vec<String>,
) -> i32 {
    let cwd = match current_dir() {
        Ok(cwd) => cwd,
        Err(code) => return code,
    };

    let (settings, root) = match load_config(&cwd, config_path.as_deref())
        .and_then(|(config, root)| Ok((config.settings()?, root)))
    {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return 1;
        }
    };

    let preparer = build_preparer(settings, root.as_deref().unwrap_or(&cwd));
    let options = PrepareOptions {
        verbose,
        options: parse_options(options),
    };

    match preparer.prepare(&cwd, platform.as_deref(), options).await {
        Ok(report) => {
            if json {
                match serde_json::to_string_pretty(&report) {
                    Ok(out) => println!("{}", out),
                    Err(e) => {
                        eprintln!("Error serializing output: {}", e);
                        return 1;
                    }
                }
            } else {
                for p in &report.platforms {
                    let note = if p.config_changed { "" } else { " (configuration unchanged)" };
                    println!("Prepared {}{}", p.platform, note);
                }
            }
            0
        }
        Err(e) => {
            error!(platform = e.platform().unwrap_or_default(), "prepare failed");
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn build_preparer(settings: PrepareSettings, root: &Path) -> Preparer {
    let paths = ProjectPaths::new(root, &settings);
    let hooks = ScriptHookRunner::new(
        root,
        paths.hooks.clone(),
        Duration::from_secs(settings.hooks.timeout_seconds),
    );

    Preparer::new(
        settings.clone(),
        Arc::new(DirectoryProject::new(settings.clone())),
        Arc::new(GenericPlatformFactory::new(settings.clone())),
        Arc::new(hooks),
        Arc::new(CommandPlugins::new(settings.plugins.command.clone())),
        Arc::new(FileMetadataStore::new(paths.platforms)),
    )
}

fn run_platforms(json: bool) -> i32 {
    let cwd = match current_dir() {
        Ok(cwd) => cwd,
        Err(code) => return code,
    };

    let (config, root) = match load_config(&cwd, None) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return 1;
        }
    };
    let Some(root) = root else {
        eprintln!("Error: Current working directory is not an xplat-based project.");
        return 2;
    };
    let settings = match config.settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return 1;
        }
    };

    let platforms = match DirectoryProject::new(settings).list_platforms(&root) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 4;
        }
    };

    if json {
        println!("{}", serde_json::json!({ "platforms": platforms }));
    } else if platforms.is_empty() {
        println!("No platforms added.");
    } else {
        for p in platforms {
            println!("{}", p);
        }
    }
    0
}

fn run_merge_config(
    source: &Path,
    dest: &Path,
    platform: &str,
    clobber: bool,
    output: Option<PathBuf>,
) -> i32 {
    let cwd = match current_dir() {
        Ok(cwd) => cwd,
        Err(code) => return code,
    };
    let singletons = match load_config(&cwd, None).and_then(|(config, _)| config.settings()) {
        Ok(settings) => settings.singleton_tags(),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return 1;
        }
    };

    let source_doc = match xplat_document::read_file(source) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let mut dest_doc = match xplat_document::read_file(dest) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    merge_into_with(&source_doc.root, &mut dest_doc.root, platform, clobber, &singletons);

    let target = output.unwrap_or_else(|| dest.to_path_buf());
    if let Err(e) = xplat_document::write_file(&target, &dest_doc) {
        eprintln!("Error: {}", e);
        return 1;
    }
    println!("Merged {} into {}", source.display(), target.display());
    0
}

fn run_config(json: bool) -> i32 {
    let cwd = match current_dir() {
        Ok(cwd) => cwd,
        Err(code) => return code,
    };

    let config = match load_config(&cwd, None) {
        Ok((config, _)) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return 1;
        }
    };

    if json {
        match config.to_json() {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                return 1;
            }
        }
        return 0;
    }

    for source in &config.sources {
        let origin = serde_json::to_value(&source.origin)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        match &source.path {
            Some(path) => println!("source: {} ({})", origin, path),
            None => println!("source: {}", origin),
        }
    }
    match serde_json::to_string_pretty(&config.config) {
        Ok(out) => println!("{}", out),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            return 1;
        }
    }
    0
}
