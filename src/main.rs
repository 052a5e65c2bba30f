use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use timeline::app::App;
use timeline::calendar::gregorian_time_type;
use timeline::cli::{Cli, TUTORIAL_PATH};
use timeline::config::Config;
use timeline::db::Db;
use timeline::{event, tui, tutorial, xml};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let (db, path) = open_timeline(&cli)?;

    let mut app = App::new(db, config, path);
    let mut terminal = tui::init()?;
    let result = event::run(&mut app, &mut terminal);

    tui::restore()?;

    result
}

fn load_config(cli: &Cli) -> Result<Config> {
    if let Some(path) = &cli.config_file {
        return Config::load(path);
    }
    let Some(dir) = dirs::config_dir() else {
        return Ok(Config::default());
    };
    let path = dir.join("timeline").join("config.toml");
    if path.exists() { Config::load(&path) } else { Ok(Config::default()) }
}

/// Resolve the CLI path to a db. A missing file opens empty and is created
/// on first save; no path at all opens an unsaved scratch timeline.
fn open_timeline(cli: &Cli) -> Result<(Db, Option<PathBuf>)> {
    match &cli.timeline_path {
        None => Ok((Db::new(gregorian_time_type()), None)),
        Some(path) if path.as_os_str() == TUTORIAL_PATH => {
            Ok((tutorial::tutorial_db()?, None))
        }
        Some(path) if path.exists() => {
            let mut db = xml::load_timeline(path)
                .with_context(|| format!("cannot open {}", path.display()))?;
            if std::fs::metadata(path)?.permissions().readonly() {
                db.set_readonly(true);
            }
            Ok((db, Some(path.clone())))
        }
        Some(path) => Ok((Db::new(gregorian_time_type()), Some(path.clone()))),
    }
}
