//! fat - File & Archive Tool
//!
//! Terminal viewer for text files, hex dumps and nested archives.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use fat::config::{self, Config};
use fat::input::CrosstermEvents;
use fat::plugins::register_bundled;
use fat::render::ui::{ColorTheme, TerminalUI, ThemeCatalog};
use fat::{Application, ForceViewMode, PluginRegistry};
use std::fs::File;
use std::path::{Path, PathBuf};

fn cli() -> Command {
    Command::new("fat")
        .version(fat::VERSION)
        .about("A terminal viewer for text files, hex dumps and nested archives")
        .arg(
            Arg::new("file")
                .help("Path to the file to view")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("force-text")
                .long("force-text")
                .help("Always show the file as text")
                .action(ArgAction::SetTrue)
                .conflicts_with("force-hex"),
        )
        .arg(
            Arg::new("force-hex")
                .long("force-hex")
                .help("Always show the file as a hex dump")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("plugin-dir")
                .long("plugin-dir")
                .value_name("DIR")
                .help("Extra directory to load archive plugin modules from")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Append),
        )
}

/// Log to a file so the alternate screen stays clean.
fn init_logging(config_dir: Option<&Path>) {
    let log_path = config_dir
        .map(|dir| dir.join("fat.log"))
        .unwrap_or_else(|| PathBuf::from("fat.log"));

    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    match File::create(&log_path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            // nowhere to write; keep the screen clean
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
}

fn build_registry(extra_dirs: &[PathBuf], config_dir: Option<&Path>) -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    let dirs = extra_dirs
        .iter()
        .cloned()
        .chain(config_dir.map(config::plugins_dir));
    for dir in dirs {
        match registry.load_plugins(&dir) {
            Ok(count) => log::info!("loaded {} plugins from {}", count, dir.display()),
            Err(err) => log::warn!("could not scan {}: {}", dir.display(), err),
        }
    }
    let bundled = register_bundled(&mut registry);
    log::info!("registered {} bundled handlers", bundled);
    registry
}

fn pick_theme(config: &Config, catalog: &ThemeCatalog) -> (String, ColorTheme) {
    let Some(wanted) = config.default_theme.as_deref() else {
        return ("default".to_string(), ColorTheme::default());
    };
    match catalog.find(wanted).map(|entry| (entry.name.clone(), entry.load())) {
        Some((name, Ok(theme))) => (name, theme),
        Some((name, Err(err))) => {
            log::warn!("theme {}: {}", name, err);
            ("default".to_string(), ColorTheme::default())
        }
        None => {
            log::warn!("theme '{}' not found", wanted);
            ("default".to_string(), ColorTheme::default())
        }
    }
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config_dir = config::config_dir();
    if let Some(dir) = &config_dir {
        // the log file lives here, so create it before logging starts
        let _ = std::fs::create_dir_all(dir);
    }
    init_logging(config_dir.as_deref());

    let file_path = matches
        .get_one::<PathBuf>("file")
        .cloned()
        .context("file argument is required")?;
    let force = if matches.get_flag("force-text") {
        ForceViewMode::Text
    } else if matches.get_flag("force-hex") {
        ForceViewMode::Hex
    } else {
        ForceViewMode::None
    };
    let plugin_dirs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("plugin-dir")
        .map(|dirs| dirs.cloned().collect())
        .unwrap_or_default();

    fat::content::validate_file_path(&file_path)
        .with_context(|| format!("cannot open {}", file_path.display()))?;

    let config = match &config_dir {
        Some(dir) => Config::load_or_create(dir),
        None => Config::default(),
    };
    let registry = build_registry(&plugin_dirs, config_dir.as_deref());
    let catalog = match &config_dir {
        Some(dir) => ThemeCatalog::discover(&config::themes_dir(dir)),
        None => ThemeCatalog::builtin(),
    };
    let (theme_name, theme) = pick_theme(&config, &catalog);

    let ui_renderer = Box::new(TerminalUI::with_theme(theme)?);
    let mut app = Application::new(
        config,
        force,
        registry,
        catalog,
        ui_renderer,
        Box::new(CrosstermEvents),
    );
    app.set_theme_name(theme_name);
    app.open(&file_path)
        .with_context(|| format!("failed to load {}", file_path.display()))?;

    app.run().context("terminal session failed")?;
    log::info!("clean exit");
    Ok(())
}
