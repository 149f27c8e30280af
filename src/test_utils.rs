#![cfg(test)]

use crate::app::App;
use crate::event::AppEvent;
use crate::store::KeyValueStore;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub fn type_text<S: KeyValueStore>(app: &mut App<S>, text: &str) {
    for c in text.chars() {
        app.handle_event(key(KeyCode::Char(c)));
    }
}
