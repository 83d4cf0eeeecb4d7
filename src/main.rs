use std::sync::Arc;
use std::time::Duration;

use tilawa::{
    api::{ApiClient, quran::QuranApi},
    app::{App, AppServices, ThreadExecutor},
    audio::ProcessPlayer,
    cli::Cli,
    config::{Config, get_app_data_prefix},
    logging::{self, LogLevel},
    preferences::Preferences,
    storage::LocalStorage,
    ui::reader::Reader,
};

use clap::Parser;
use eyre::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path.clone())?,
        None => Config::new()?,
    };

    let prefix = get_app_data_prefix()?;
    let _log_guard = match logging::init(LogLevel::from_flags(cli.verbose, cli.debug), &prefix) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: logging disabled: {err}");
            None
        }
    };
    tracing::debug!(config = %config.filepath().display(), "configuration loaded");

    if cli.history {
        print_history()
    } else if cli.bookmarks {
        print_bookmarks()
    } else {
        run_tui(config, cli.chapter)
    }
}

fn print_history() -> Result<()> {
    let storage = LocalStorage::new()?;
    let prefs = Preferences::restore(&storage);
    if prefs.history.is_empty() {
        println!("No chapters read yet");
    }
    for entry in prefs.history.as_slice().iter().rev() {
        println!("{:>3}  {}", entry.id, entry.name);
    }
    Ok(())
}

fn print_bookmarks() -> Result<()> {
    let storage = LocalStorage::new()?;
    let prefs = Preferences::restore(&storage);
    println!("{}", prefs.bookmarks.to_pretty_json()?);
    Ok(())
}

fn run_tui(config: Config, chapter: Option<u32>) -> Result<()> {
    let settings = config.settings.clone();
    let client = ApiClient::with_reqwest(
        &settings.api_base,
        Duration::from_secs(settings.request_timeout_secs),
    )?;
    let services = AppServices {
        source: Arc::new(QuranApi::new(client)),
        storage: Box::new(LocalStorage::new()?),
        audio: Box::new(ProcessPlayer::from_settings(&settings)),
        executor: Box::new(ThreadExecutor),
    };

    let mut app = App::new(settings, config.download_dir()?, services);
    app.start(chapter);

    let mut reader = Reader::new(app)?;
    reader.run()
}
