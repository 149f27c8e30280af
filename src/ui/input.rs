use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Up,
    Down,
    Activate,
    OpenDoiList,
    NewDataset,
    Connect,
    EditChar(char),
    EditBackspace,
    EditConfirm,
    EditCancel,
    Quit,
    None,
}

/// Which key table is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Navigate,
    Editing,
    Picking,
}

pub fn map_key(key: KeyEvent, mode: InputMode) -> Action {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match mode {
        InputMode::Editing => match key.code {
            KeyCode::Esc => Action::EditCancel,
            KeyCode::Enter => Action::EditConfirm,
            KeyCode::Backspace => Action::EditBackspace,
            KeyCode::Char(c) => Action::EditChar(c),
            _ => Action::None,
        },
        InputMode::Picking => match key.code {
            KeyCode::Esc => Action::EditCancel,
            KeyCode::Enter | KeyCode::Char(' ') => Action::EditConfirm,
            KeyCode::Char('j') | KeyCode::Down => Action::Down,
            KeyCode::Char('k') | KeyCode::Up => Action::Up,
            _ => Action::None,
        },
        InputMode::Navigate => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => Action::Down,
            KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => Action::Up,
            KeyCode::Enter => Action::Activate,
            KeyCode::Char('o') => Action::OpenDoiList,
            KeyCode::Char('n') => Action::NewDataset,
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Connect,
            KeyCode::Char('c') => Action::Connect,
            _ => Action::None,
        },
    }
}
