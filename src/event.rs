use crate::form::RequestId;
use crate::lookup::NewDatasetResponse;
use crate::model::OptionItem;
use crossterm::event::KeyEvent;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    BranchesLoaded {
        id: RequestId,
        result: Result<Vec<OptionItem>, String>,
    },
    DoisLoaded {
        id: RequestId,
        result: Result<Vec<OptionItem>, String>,
    },
    DatasetCreated {
        id: RequestId,
        result: Result<NewDatasetResponse, String>,
    },
}

/// Drives toast expiry while the user is idle.
pub async fn start_ticker(tx: mpsc::UnboundedSender<AppEvent>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    interval.tick().await;

    loop {
        interval.tick().await;
        if tx.send(AppEvent::Tick).is_err() {
            break;
        }
    }
}
