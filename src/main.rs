mod app;
mod config;
mod error;
mod event;
mod form;
mod logging;
mod lookup;
mod model;
mod store;
#[cfg(test)]
mod test_utils;
mod ui;
mod url;
mod validate;

use app::{App, Effect};
use clap::Parser;
use config::Config;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use event::AppEvent;
use form::ConnectForm;
use futures::StreamExt;
use lookup::{
    backend::BackendClient, github::GitHubBranches, BranchLookup, DatasetService, DoiLookup,
    Lookups,
};
use std::sync::Arc;
use std::time::Duration;
use store::{FileStore, KeyValueStore, MemoryStore, TokenCache};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(
    name = "rdm-connect",
    about = "Connect a GitHub/GitLab repository to a Dataverse dataset"
)]
struct Cli {
    #[arg(long, help = "Base URL of the integration backend")]
    backend_url: Option<String>,

    #[arg(long, help = "Keep tokens in memory only; nothing is written to disk")]
    ephemeral: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.backend_url);

    if let Err(e) = logging::init(&config.log_file) {
        eprintln!("warning: logging disabled: {e}");
    }
    tracing::info!(backend = %config.backend_url, ephemeral = cli.ephemeral, "starting");

    let store: Box<dyn KeyValueStore> = if cli.ephemeral {
        Box::new(MemoryStore::new())
    } else {
        let file = FileStore::open(&config.token_store);
        tracing::debug!(path = %file.path().display(), "token store opened");
        Box::new(file)
    };

    let backend = BackendClient::new(
        &config.backend_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let lookups = Arc::new(Lookups::new(
        GitHubBranches::new(config.max_branches),
        backend,
    ));

    let form = ConnectForm::new(TokenCache::new(store), config.gitlab_placeholder());
    let mut app = App::new(form);

    // Install panic hook before entering raw mode so terminal is restored on panic
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    let input_tx = tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            let app_event = match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
                Event::Resize(_, _) => Some(AppEvent::Resize),
                _ => None,
            };
            if let Some(e) = app_event {
                if input_tx.send(e).is_err() {
                    break;
                }
            }
        }
    });

    let ticker = tokio::spawn(event::start_ticker(tx.clone(), 1));

    loop {
        terminal.draw(|f| app.render(f))?;

        let first = match rx.recv().await {
            Some(e) => e,
            None => break,
        };

        process_event(&mut app, first, &lookups, &tx);
        while let Ok(pending) = rx.try_recv() {
            process_event(&mut app, pending, &lookups, &tx);
        }

        if app.should_quit {
            break;
        }
    }

    ticker.abort();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(handoff) = app.handoff {
        println!("{}", serde_json::to_string_pretty(&handoff)?);
    }

    Ok(())
}

fn process_event<S: KeyValueStore>(
    app: &mut App<S>,
    event: AppEvent,
    lookups: &Arc<Lookups>,
    tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let Some(effect) = app.handle_event(event) else {
        return;
    };

    let lookups = lookups.clone();
    let tx = tx.clone();
    // Nothing cancels these; a superseded response is dropped by request id.
    tokio::spawn(async move {
        let event = match effect {
            Effect::FetchBranches(ticket) => AppEvent::BranchesLoaded {
                id: ticket.id,
                result: lookups
                    .branches(ticket.request)
                    .await
                    .map_err(|e| e.to_string()),
            },
            Effect::FetchDois(ticket) => AppEvent::DoisLoaded {
                id: ticket.id,
                result: lookups
                    .dois(&ticket.request)
                    .await
                    .map_err(|e| e.to_string()),
            },
            Effect::CreateDataset(ticket) => AppEvent::DatasetCreated {
                id: ticket.id,
                result: lookups
                    .new_dataset(&ticket.request)
                    .await
                    .map_err(|e| e.to_string()),
            },
        };
        let _ = tx.send(event);
    });
}
