use crate::error::FormError;
use crate::event::AppEvent;
use crate::form::{Applied, ConnectForm, Ticket};
use crate::lookup::BranchRequest;
use crate::model::{is_pending, Handoff, OptionItem, RepoType};
use crate::store::KeyValueStore;
use crate::ui::{
    form_view::FormView,
    input::{self, Action, InputMode},
    picker::Picker,
    toast::{Notification, NotifyLevel, Toast},
};
use ratatui::Frame;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    RepoType,
    Url,
    RepoToken,
    Branch,
    DataverseToken,
    DatasetId,
}

impl FormField {
    pub const ALL: &[FormField] = &[
        FormField::RepoType,
        FormField::Url,
        FormField::RepoToken,
        FormField::Branch,
        FormField::DataverseToken,
        FormField::DatasetId,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::RepoType => "Repository type",
            FormField::Url => "Repository URL",
            FormField::RepoToken => "Repository token",
            FormField::Branch => "Branch",
            FormField::DataverseToken => "Dataverse token",
            FormField::DatasetId => "Dataset DOI",
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, FormField::RepoToken | FormField::DataverseToken)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMode {
    Navigate,
    Editing(String),
    Picking { field: FormField, cursor: usize },
}

/// Outbound work requested by the form; the event loop runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchBranches(Ticket<BranchRequest>),
    FetchDois(Ticket<String>),
    CreateDataset(Ticket<String>),
}

pub struct App<S> {
    pub form: ConnectForm<S>,
    pub cursor: usize,
    pub field_mode: FieldMode,
    pub notification: Option<Notification>,
    pub handoff: Option<Handoff>,
    pub should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(form: ConnectForm<S>) -> Self {
        Self {
            form,
            cursor: 0,
            field_mode: FieldMode::Navigate,
            notification: None,
            handoff: None,
            should_quit: false,
        }
    }

    pub fn focused(&self) -> FormField {
        FormField::ALL[self.cursor.min(FormField::ALL.len() - 1)]
    }

    fn input_mode(&self) -> InputMode {
        match self.field_mode {
            FieldMode::Navigate => InputMode::Navigate,
            FieldMode::Editing(_) => InputMode::Editing,
            FieldMode::Picking { .. } => InputMode::Picking,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Option<Effect> {
        match event {
            AppEvent::Key(key) => {
                let action = input::map_key(key, self.input_mode());
                return self.handle_action(action);
            }
            AppEvent::Resize => {}
            AppEvent::Tick => self.expire_notification(),
            AppEvent::BranchesLoaded { id, result } => {
                let outcome = self.form.apply_branches(id, result);
                self.report(outcome);
                self.clamp_picker();
            }
            AppEvent::DoisLoaded { id, result } => {
                let outcome = self.form.apply_dois(id, result);
                self.report(outcome);
                self.clamp_picker();
            }
            AppEvent::DatasetCreated { id, result } => {
                let outcome = self.form.finish_new_dataset(id, result);
                if matches!(outcome, Ok(Applied::Updated)) {
                    self.notify(NotifyLevel::Info, "new dataset created");
                }
                self.report(outcome);
            }
        }
        None
    }

    fn handle_action(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Up => self.move_cursor(-1),
            Action::Down => self.move_cursor(1),
            Action::Activate => return self.activate(),
            Action::OpenDoiList => return self.open_doi_list(),
            Action::NewDataset => {
                return match self.form.begin_new_dataset() {
                    Ok(ticket) => ticket.map(Effect::CreateDataset),
                    Err(e) => {
                        self.notify_error(&e);
                        None
                    }
                };
            }
            Action::Connect => self.connect(),
            Action::EditChar(c) => {
                if let FieldMode::Editing(ref mut text) = self.field_mode {
                    text.push(c);
                }
            }
            Action::EditBackspace => {
                if let FieldMode::Editing(ref mut text) = self.field_mode {
                    text.pop();
                }
            }
            Action::EditConfirm => self.confirm(),
            Action::EditCancel => self.field_mode = FieldMode::Navigate,
            Action::None => {}
        }
        None
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.field_mode {
            FieldMode::Picking { field, cursor } => {
                let len = self.picker_items(field).len();
                let cursor = if delta < 0 {
                    cursor.saturating_sub(1)
                } else if cursor + 1 < len {
                    cursor + 1
                } else {
                    cursor
                };
                self.field_mode = FieldMode::Picking { field, cursor };
            }
            _ => {
                let len = FormField::ALL.len() as isize;
                self.cursor = (self.cursor as isize + delta).rem_euclid(len) as usize;
            }
        }
    }

    fn activate(&mut self) -> Option<Effect> {
        let field = self.focused();
        match field {
            FormField::RepoType => {
                let cursor = self
                    .form
                    .repo_type
                    .and_then(|t| RepoType::ALL.iter().position(|x| *x == t))
                    .unwrap_or(0);
                self.field_mode = FieldMode::Picking { field, cursor };
                None
            }
            FormField::Branch => self.open_branch_list(),
            _ => {
                let current = self.field_value(field).unwrap_or_default();
                self.field_mode = FieldMode::Editing(current);
                None
            }
        }
    }

    fn open_branch_list(&mut self) -> Option<Effect> {
        let mut effect = None;
        if is_pending(self.form.branch_items()) && !self.form.branch_lookup_pending() {
            match self.form.begin_branch_lookup() {
                Ok(ticket) => effect = Some(Effect::FetchBranches(ticket)),
                Err(e) => {
                    self.notify_error(&e);
                    return None;
                }
            }
        }
        self.field_mode = FieldMode::Picking {
            field: FormField::Branch,
            cursor: 0,
        };
        effect
    }

    fn open_doi_list(&mut self) -> Option<Effect> {
        match self.form.begin_doi_lookup() {
            Ok(ticket) => {
                self.cursor = FormField::ALL
                    .iter()
                    .position(|f| *f == FormField::DatasetId)
                    .unwrap_or(self.cursor);
                self.field_mode = FieldMode::Picking {
                    field: FormField::DatasetId,
                    cursor: 0,
                };
                ticket.map(Effect::FetchDois)
            }
            Err(e) => {
                self.notify_error(&e);
                None
            }
        }
    }

    fn confirm(&mut self) {
        let mode = std::mem::replace(&mut self.field_mode, FieldMode::Navigate);
        match mode {
            FieldMode::Editing(text) => self.set_field_value(self.focused(), text),
            FieldMode::Picking { field, cursor } => {
                let Some(item) = self.picker_items(field).get(cursor).cloned() else {
                    return;
                };
                if item.is_loading() {
                    return;
                }
                match field {
                    FormField::RepoType => {
                        match RepoType::from_value(&item.value) {
                            Some(t) if self.form.repo_type != Some(t) => self.form.change_repo(t),
                            _ => {}
                        }
                    }
                    FormField::Branch => self.form.repo_branch = Some(item.value),
                    FormField::DatasetId => self.form.dataset_id = Some(item.value),
                    _ => {}
                }
            }
            FieldMode::Navigate => {}
        }
    }

    fn connect(&mut self) {
        match self.form.connect() {
            Ok(handoff) => {
                self.handoff = Some(handoff);
                self.should_quit = true;
            }
            Err(e) => self.notify_error(&e),
        }
    }

    pub fn picker_items(&self, field: FormField) -> Vec<OptionItem> {
        match field {
            FormField::RepoType => RepoType::options(),
            FormField::Branch => self.form.branch_items().to_vec(),
            FormField::DatasetId => self.form.doi_items().to_vec(),
            _ => Vec::new(),
        }
    }

    fn clamp_picker(&mut self) {
        if let FieldMode::Picking { field, cursor } = self.field_mode {
            let len = self.picker_items(field).len();
            self.field_mode = FieldMode::Picking {
                field,
                cursor: cursor.min(len.saturating_sub(1)),
            };
        }
    }

    pub fn field_value(&self, field: FormField) -> Option<String> {
        match field {
            FormField::RepoType => self.form.repo_type.map(|t| t.label().to_string()),
            FormField::Url => self.form.base_url.clone(),
            FormField::RepoToken => self.form.repo_token.clone(),
            FormField::Branch => self.form.repo_branch.clone(),
            FormField::DataverseToken => self.form.dataverse_token.clone(),
            FormField::DatasetId => self.form.dataset_id.clone(),
        }
    }

    fn set_field_value(&mut self, field: FormField, text: String) {
        match field {
            FormField::Url => {
                if self.form.base_url.as_deref() != Some(text.as_str()) {
                    self.form.base_url = Some(text);
                    self.form.on_repo_change();
                }
            }
            FormField::RepoToken => self.form.repo_token = Some(text),
            FormField::DataverseToken => {
                if self.form.dataverse_token.as_deref() != Some(text.as_str()) {
                    self.form.dataverse_token = Some(text);
                    self.form.on_user_change();
                }
            }
            FormField::DatasetId => self.form.dataset_id = Some(text),
            FormField::RepoType | FormField::Branch => {}
        }
    }

    fn report<T>(&mut self, outcome: Result<T, FormError>) {
        if let Err(e) = outcome {
            self.notify_error(&e);
        }
    }

    fn notify_error(&mut self, error: &FormError) {
        warn!(error = %error, "form action failed");
        self.notify(NotifyLevel::Error, error.to_string());
    }

    fn notify(&mut self, level: NotifyLevel, message: impl Into<String>) {
        self.notification = Some(Notification {
            message: message.into(),
            level,
            created: Instant::now(),
        });
    }

    fn expire_notification(&mut self) {
        let expired = self
            .notification
            .as_ref()
            .is_some_and(|n| n.created.elapsed().as_secs() >= n.level.ttl_secs());
        if expired {
            debug!("notification expired");
            self.notification = None;
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let view = FormView { app: self };
        frame.render_widget(view, area);

        if let FieldMode::Picking { field, cursor } = self.field_mode {
            let items = self.picker_items(field);
            let picker = Picker {
                title: field.label(),
                items: &items,
                cursor,
                loading: match field {
                    FormField::Branch => self.form.branch_lookup_pending(),
                    FormField::DatasetId => self.form.doi_lookup_pending(),
                    _ => false,
                },
            };
            frame.render_widget(picker, area);
        }

        if let Some(ref notification) = self.notification {
            frame.render_widget(Toast { notification }, area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::pending_options;
    use crate::store::{MemoryStore, TokenCache, GITHUB_TOKEN_KEY};
    use crate::test_utils::{key, type_text};
    use crossterm::event::KeyCode;

    fn app() -> App<MemoryStore> {
        let store = MemoryStore::new()
            .with(GITHUB_TOKEN_KEY, "ghp_cached")
            .with("dataverseToken", "dv_cached");
        App::new(ConnectForm::new(
            TokenCache::new(store),
            "https://gitlab.kuleuven.be/<group>/<project>",
        ))
    }

    fn focus(app: &mut App<MemoryStore>, field: FormField) {
        app.cursor = FormField::ALL.iter().position(|f| *f == field).unwrap();
    }

    fn pick_github(app: &mut App<MemoryStore>) {
        focus(app, FormField::RepoType);
        app.handle_event(key(KeyCode::Enter));
        app.handle_event(key(KeyCode::Enter));
    }

    #[test]
    fn picking_repo_type_loads_cached_token() {
        let mut app = app();
        pick_github(&mut app);
        assert_eq!(app.form.repo_type, Some(RepoType::GitHub));
        assert_eq!(app.form.repo_token.as_deref(), Some("ghp_cached"));
        assert_eq!(app.field_mode, FieldMode::Navigate);
    }

    #[test]
    fn editing_url_resets_branch_options() {
        let mut app = app();
        pick_github(&mut app);
        focus(&mut app, FormField::Url);

        app.handle_event(key(KeyCode::Enter));
        app.field_mode = FieldMode::Editing(String::new());
        type_text(&mut app, "https://github.com/acme/widgets");
        app.handle_event(key(KeyCode::Enter));

        assert_eq!(
            app.form.base_url.as_deref(),
            Some("https://github.com/acme/widgets")
        );
        assert_eq!(app.form.branch_items(), pending_options().as_slice());
    }

    #[test]
    fn editing_url_clears_chosen_branch() {
        let mut app = app();
        pick_github(&mut app);
        app.form.base_url = Some("https://github.com/acme/widgets".to_string());
        app.form.repo_branch = Some("main".to_string());
        focus(&mut app, FormField::Url);

        app.handle_event(key(KeyCode::Enter));
        type_text(&mut app, "-fork");
        app.handle_event(key(KeyCode::Enter));

        assert_eq!(
            app.form.base_url.as_deref(),
            Some("https://github.com/acme/widgets-fork")
        );
        assert_eq!(app.form.repo_branch, None);
        assert_eq!(app.field_value(FormField::Branch), None);
    }

    #[test]
    fn opening_branches_issues_lookup_once() {
        let mut app = app();
        pick_github(&mut app);
        app.form.base_url = Some("https://github.com/acme/widgets".to_string());
        focus(&mut app, FormField::Branch);

        let effect = app.handle_event(key(KeyCode::Enter));
        let Some(Effect::FetchBranches(ticket)) = effect else {
            panic!("expected a branch fetch");
        };
        assert!(matches!(app.field_mode, FieldMode::Picking { field: FormField::Branch, .. }));

        app.handle_event(key(KeyCode::Esc));
        assert_eq!(app.handle_event(key(KeyCode::Enter)), None);

        app.handle_event(AppEvent::BranchesLoaded {
            id: ticket.id,
            result: Ok(vec![OptionItem::new("main", "main"), OptionItem::new("dev", "dev")]),
        });
        app.handle_event(key(KeyCode::Down));
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.form.repo_branch.as_deref(), Some("dev"));
    }

    #[test]
    fn branch_precondition_shows_toast_and_keeps_picker_closed() {
        let mut app = app();
        focus(&mut app, FormField::Branch);
        assert_eq!(app.handle_event(key(KeyCode::Enter)), None);
        assert_eq!(app.field_mode, FieldMode::Navigate);
        let toast = app.notification.as_ref().unwrap();
        assert!(toast.message.contains("repository type is missing"));
    }

    #[test]
    fn failed_doi_lookup_surfaces_error() {
        let mut app = app();
        let Some(Effect::FetchDois(ticket)) = app.handle_event(key(KeyCode::Char('o'))) else {
            panic!("expected a doi fetch");
        };
        assert_eq!(ticket.request, "dv_cached");
        assert_eq!(app.handle_event(key(KeyCode::Esc)), None);
        assert_eq!(app.handle_event(key(KeyCode::Char('o'))), None);

        app.handle_event(AppEvent::DoisLoaded {
            id: ticket.id,
            result: Err("connection refused".to_string()),
        });
        let toast = app.notification.as_ref().unwrap();
        assert_eq!(toast.message, "doi lookup failed: connection refused");
        assert_eq!(app.form.doi_items(), pending_options().as_slice());
    }

    #[test]
    fn new_dataset_round_trip_through_events() {
        let mut app = app();
        let Some(Effect::CreateDataset(ticket)) = app.handle_event(key(KeyCode::Char('n'))) else {
            panic!("expected dataset creation");
        };
        assert!(app.form.creating_new_dataset());

        app.handle_event(AppEvent::DatasetCreated {
            id: ticket.id,
            result: Ok(crate::lookup::NewDatasetResponse {
                persistent_id: "doi:10.5072/FK2/NEW".to_string(),
            }),
        });
        assert_eq!(app.form.dataset_id.as_deref(), Some("doi:10.5072/FK2/NEW"));
        assert!(!app.form.creating_new_dataset());
    }

    #[test]
    fn connect_with_missing_fields_stays_on_form() {
        let mut app = app();
        app.handle_event(key(KeyCode::Char('c')));
        assert!(!app.should_quit);
        assert!(app.handoff.is_none());
        let toast = app.notification.as_ref().unwrap();
        assert!(toast
            .message
            .starts_with("One or more mandatory fields are missing:"));
    }

    #[test]
    fn connect_success_quits_with_handoff() {
        let mut app = app();
        pick_github(&mut app);
        app.form.base_url = Some("https://github.com/acme/widgets".to_string());
        app.form.repo_branch = Some("main".to_string());
        app.form.dataset_id = Some("doi:10.5072/FK2/XYZ".to_string());

        app.handle_event(key(KeyCode::Char('c')));
        assert!(app.should_quit);
        let handoff = app.handoff.as_ref().unwrap();
        assert_eq!(handoff.credentials.repo_name(), "widgets");
    }

    #[test]
    fn stale_branch_result_is_ignored_by_app() {
        let mut app = app();
        pick_github(&mut app);
        app.form.base_url = Some("https://github.com/acme/widgets".to_string());
        let old = app.form.begin_branch_lookup().unwrap();
        let new = app.form.begin_branch_lookup().unwrap();

        app.handle_event(AppEvent::BranchesLoaded {
            id: new.id,
            result: Ok(vec![OptionItem::new("main", "main")]),
        });
        assert_eq!(
            app.form.apply_branches(old.id, Ok(vec![])),
            Ok(Applied::Stale)
        );
        assert_eq!(app.form.branch_items().len(), 1);
    }

    #[test]
    fn cursor_wraps_around() {
        let mut app = app();
        app.handle_event(key(KeyCode::Up));
        assert_eq!(app.focused(), FormField::DatasetId);
        app.handle_event(key(KeyCode::Down));
        assert_eq!(app.focused(), FormField::RepoType);
    }
}
