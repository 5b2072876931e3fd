use color_eyre::eyre::{Result, WrapErr};
use crossterm::event::{self, Event, KeyEventKind};
use noble_journal::app::App;
use noble_journal::config::Config;
use noble_journal::kv_store::FileStore;
use noble_journal::logging;
use noble_journal::paths::AppPaths;
use noble_journal::ui::UI;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::load().wrap_err("failed to load configuration")?;
    let _log_guard = logging::init(&AppPaths::log_dir()?, &config.log_level)?;

    let data_dir = config.resolved_data_dir()?;
    info!(data_dir = %data_dir.display(), "starting");
    let storage = Arc::new(FileStore::new(data_dir));

    let mut app = App::new(storage, &config);
    app.init().await;

    let mut ui = UI::new()?;
    while !app.should_quit {
        ui.display(&app)?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key).await;
                }
            }
        }
    }

    info!("exiting");
    Ok(())
}
