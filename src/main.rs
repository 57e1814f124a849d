use importpick::cli::{Cli, Commands, ConfigAction};
use importpick::config::Config;
use importpick::editing::{add_import, read_source, symbol_at_path, InsertOutcome, TargetSpec};
use importpick::error::{ImportPickError, Result};
use importpick::project::{ensure_dependencies, find_project_root, start_dir};
use importpick::session::{search_pattern, Orchestrator, SessionOutcome};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Add {
            target,
            keyword,
            prompt,
            root,
            dry_run,
        } => {
            cmd_add(cli.config, &target, keyword, prompt, root, dry_run)?;
        }
        Commands::Symbol { target } => {
            return cmd_symbol(&target);
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    // the terminal belongs to the selector, so stay quiet unless asked
    let default = if verbose {
        "importpick=debug"
    } else {
        "importpick=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_add(
    config_path: Option<PathBuf>,
    target: &str,
    keyword: Option<String>,
    prompt: Option<String>,
    root: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let config = Config::load_or_default(config_path.as_deref())?;
    let target = TargetSpec::parse(target)?;

    // fail before any subprocess starts if the file is unreadable
    read_source(&target.path)?;

    let keyword = match (keyword, target.position) {
        (Some(keyword), _) => Some(keyword),
        (None, Some(pos)) => {
            let symbol = symbol_at_path(&target.path, pos.row, pos.col)?;
            if symbol.is_none() {
                eprintln!(
                    "No identifier at {}:{}:{}, browsing all imports",
                    target.path.display(),
                    pos.row,
                    pos.col
                );
            }
            symbol
        }
        (None, None) => None,
    };

    ensure_dependencies(&[
        config.search.program.as_str(),
        config.selector.program.as_str(),
    ])?;

    let root = match root {
        Some(root) => root,
        None => find_project_root(&start_dir(&target.path)?, &config.project.root_markers),
    };
    let prompt = prompt.unwrap_or_else(|| match &keyword {
        Some(keyword) => format!("{}> ", keyword),
        None => config.selector.prompt.clone(),
    });
    let pattern = search_pattern(keyword.as_deref());

    tracing::info!(
        "Searching {:?} for {:?}",
        root,
        keyword.as_deref().unwrap_or("<any import>")
    );

    let orchestrator = Orchestrator::new(config);
    let rt = tokio::runtime::Runtime::new().map_err(|e| ImportPickError::Io {
        source: e,
        context: "Failed to create tokio runtime".to_string(),
    })?;
    let outcome = rt.block_on(orchestrator.run(&pattern, &root, &prompt, keyword.as_deref()))?;

    match outcome {
        SessionOutcome::Selected(line) => insert_selected(&target.path, &line, dry_run)?,
        SessionOutcome::Cancelled => eprintln!("Cancelled"),
        SessionOutcome::NoMatches => match &keyword {
            Some(keyword) => eprintln!("No imports found for '{}'", keyword),
            None => eprintln!("No imports found in {}", root.display()),
        },
        SessionOutcome::Empty => eprintln!("Nothing selected"),
    }

    Ok(())
}

fn insert_selected(path: &Path, line: &str, dry_run: bool) -> Result<()> {
    match add_import(path, line, dry_run)? {
        InsertOutcome::Inserted { index } if dry_run => {
            println!("Would insert at line {}: {}", index + 1, line);
        }
        InsertOutcome::Inserted { index } => {
            println!("✓ Added to {} (line {})", path.display(), index + 1);
            println!("  {}", line);
        }
        InsertOutcome::AlreadyPresent => {
            println!("Already imported in {}: {}", path.display(), line);
        }
    }
    Ok(())
}

fn cmd_symbol(target: &str) -> Result<ExitCode> {
    let target = TargetSpec::parse(target)?;
    let pos = target.position.ok_or_else(|| {
        ImportPickError::InvalidTarget(format!(
            "expected path:row:col, got '{}'",
            target.path.display()
        ))
    })?;

    match symbol_at_path(&target.path, pos.row, pos.col)? {
        Some(symbol) => {
            println!("{}", symbol);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!(
                "No identifier at {}:{}:{}",
                target.path.display(),
                pos.row,
                pos.col
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default(config_path.as_deref())?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| ImportPickError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;
            println!("{}", json);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ImportPickError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}
