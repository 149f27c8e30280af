use crate::error::{FormError, LookupKind};
use crate::lookup::{BranchRequest, NewDatasetResponse};
use crate::model::{
    is_pending, pending_options, CredentialParts, Credentials, Handoff, OptionItem, RepoType,
    Route, GITHUB_PLACEHOLDER,
};
use crate::store::{KeyValueStore, TokenCache};
use crate::url::parse_repo_url;
use crate::validate::{check_fields, Field, MissingFields};
use tracing::{debug, info, warn};

pub const DOI_PREFIX: &str = "doi:";

/// Identifies one outbound call. Only the latest id of each kind is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

/// An outbound call the form wants made on its behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<T> {
    pub id: RequestId,
    pub request: T,
}

/// Whether a response changed the form or arrived too late to matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    Stale,
}

#[derive(Debug, Default)]
struct RequestTracker {
    issued: u64,
    latest: Option<u64>,
}

impl RequestTracker {
    fn issue(&mut self) -> RequestId {
        self.issued += 1;
        self.latest = Some(self.issued);
        RequestId(self.issued)
    }

    fn in_flight(&self) -> bool {
        self.latest.is_some()
    }

    /// Marks `id` as answered; false when it has been superseded.
    fn settle(&mut self, id: RequestId) -> bool {
        if self.latest == Some(id.0) {
            self.latest = None;
            true
        } else {
            false
        }
    }

    fn supersede(&mut self) {
        self.latest = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Navigating,
}

pub struct ConnectForm<S> {
    pub repo_type: Option<RepoType>,
    pub base_url: Option<String>,
    pub base: Option<String>,
    pub repo_owner: Option<String>,
    pub repo_name: Option<String>,
    pub repo_branch: Option<String>,
    pub repo_token: Option<String>,
    pub dataset_id: Option<String>,
    pub dataverse_token: Option<String>,

    branch_items: Vec<OptionItem>,
    doi_items: Vec<OptionItem>,
    creating_new_dataset: bool,
    phase: Phase,

    branch_requests: RequestTracker,
    doi_requests: RequestTracker,
    dataset_requests: RequestTracker,

    tokens: TokenCache<S>,
    gitlab_placeholder: String,
}

impl<S: KeyValueStore> ConnectForm<S> {
    pub fn new(tokens: TokenCache<S>, gitlab_placeholder: impl Into<String>) -> Self {
        let dataverse_token = tokens.dataverse_token();
        Self {
            repo_type: None,
            base_url: None,
            base: None,
            repo_owner: None,
            repo_name: None,
            repo_branch: None,
            repo_token: None,
            dataset_id: Some(DOI_PREFIX.to_string()),
            dataverse_token,
            branch_items: pending_options(),
            doi_items: pending_options(),
            creating_new_dataset: false,
            phase: Phase::Idle,
            branch_requests: RequestTracker::default(),
            doi_requests: RequestTracker::default(),
            dataset_requests: RequestTracker::default(),
            tokens,
            gitlab_placeholder: gitlab_placeholder.into(),
        }
    }

    pub fn branch_items(&self) -> &[OptionItem] {
        &self.branch_items
    }

    pub fn doi_items(&self) -> &[OptionItem] {
        &self.doi_items
    }

    pub fn creating_new_dataset(&self) -> bool {
        self.creating_new_dataset
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn branch_lookup_pending(&self) -> bool {
        self.branch_requests.in_flight()
    }

    pub fn doi_lookup_pending(&self) -> bool {
        self.doi_requests.in_flight()
    }

    pub fn placeholder_for(&self, repo_type: RepoType) -> &str {
        match repo_type {
            RepoType::GitHub => GITHUB_PLACEHOLDER,
            RepoType::GitLab => self.gitlab_placeholder.as_str(),
        }
    }

    fn placeholders(&self) -> [&str; 2] {
        [GITHUB_PLACEHOLDER, self.gitlab_placeholder.as_str()]
    }

    fn url_is_unset(&self) -> bool {
        match self.base_url.as_deref() {
            None | Some("") => true,
            Some(url) => self.placeholders().contains(&url),
        }
    }

    /// Switches provider: reloads its cached token, shows its URL template
    /// and forgets any branches listed for the previous repository.
    pub fn change_repo(&mut self, repo_type: RepoType) {
        debug!(%repo_type, "repository type changed");
        self.repo_type = Some(repo_type);
        self.repo_token = self.tokens.repo_token(repo_type);
        self.base_url = Some(self.placeholder_for(repo_type).to_string());
        self.on_repo_change();
    }

    /// The repository URL was edited. Everything derived from the previous
    /// URL is dropped, including the chosen branch.
    pub fn on_repo_change(&mut self) {
        self.base = None;
        self.repo_owner = None;
        self.repo_name = None;
        self.repo_branch = None;
        self.branch_requests.supersede();
        self.branch_items = pending_options();
    }

    /// The dataverse token was edited.
    pub fn on_user_change(&mut self) {
        self.doi_requests.supersede();
        self.doi_items = pending_options();
    }

    /// Splits the URL field into base, owner and name. Leaves all three
    /// untouched when the URL does not parse or is still a template.
    pub fn parse_url(&mut self) {
        if self.url_is_unset() {
            return;
        }
        let Some(parsed) = self.base_url.as_deref().and_then(parse_repo_url) else {
            return;
        };
        self.base = Some(parsed.base);
        self.repo_owner = Some(parsed.owner);
        self.repo_name = Some(parsed.name);
    }

    pub fn check_fields(&self) -> Result<(), MissingFields> {
        let fields = [
            (self.repo_type.map(RepoType::value), Field::RepoType),
            (self.repo_owner.as_deref(), Field::Owner),
            (self.repo_name.as_deref(), Field::Repository),
            (self.repo_branch.as_deref(), Field::Branch),
            (self.repo_token.as_deref(), Field::RepoToken),
            (self.dataset_id.as_deref(), Field::DatasetId),
            (self.dataverse_token.as_deref(), Field::DataverseToken),
        ];
        check_fields(&fields, &self.placeholders())
    }

    /// Validates the form and, if complete, remembers the tokens and
    /// produces the credentials for the comparison view.
    pub fn connect(&mut self) -> Result<Handoff, FormError> {
        if self.phase == Phase::Navigating {
            return Err(FormError::AlreadyConnected);
        }

        self.parse_url();
        self.check_fields()?;

        self.persist_tokens();

        // check_fields guarantees every value below is present
        let credentials = Credentials::new(CredentialParts {
            repo_type: self.repo_type.unwrap_or(RepoType::GitHub),
            repo_owner: self.repo_owner.clone().unwrap_or_default(),
            repo_name: self.repo_name.clone().unwrap_or_default(),
            repo_branch: self.repo_branch.clone().unwrap_or_default(),
            repo_token: self.repo_token.clone().unwrap_or_default(),
            base_url: self.base.clone().unwrap_or_default(),
            dataset_id: self.dataset_id.clone().unwrap_or_default(),
            dataverse_token: self.dataverse_token.clone().unwrap_or_default(),
        });

        self.phase = Phase::Navigating;
        info!(
            repo_type = %credentials.repo_type(),
            owner = credentials.repo_owner(),
            repo = credentials.repo_name(),
            dataset = credentials.dataset_id(),
            "connecting"
        );

        Ok(Handoff {
            route: Route::Compare {
                dataset_id: credentials.dataset_id().to_string(),
            },
            credentials,
        })
    }

    fn persist_tokens(&mut self) {
        if let Some(token) = self.dataverse_token.as_deref() {
            if let Err(e) = self.tokens.save_dataverse_token(token) {
                warn!(error = %e, "failed to cache dataverse token");
            }
        }
        if let (Some(repo_type), Some(token)) = (self.repo_type, self.repo_token.as_deref()) {
            if let Err(e) = self.tokens.save_repo_token(repo_type, token) {
                warn!(error = %e, %repo_type, "failed to cache repository token");
            }
        }
    }

    pub fn begin_branch_lookup(&mut self) -> Result<Ticket<BranchRequest>, FormError> {
        let Some(repo_type) = self.repo_type else {
            return Err(FormError::Precondition(
                "Branch lookup failed: repository type is missing".to_string(),
            ));
        };
        let token = match self.repo_token.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                return Err(FormError::Precondition(
                    "Branch lookup failed: token is missing".to_string(),
                ))
            }
        };
        if self.url_is_unset() {
            return Err(FormError::Precondition(
                "Branch lookup failed: URL is missing".to_string(),
            ));
        }

        self.parse_url();
        let owner = self.repo_owner.clone().unwrap_or_default();
        let name = self.repo_name.clone().unwrap_or_default();

        let request = match repo_type {
            RepoType::GitHub => BranchRequest::GitHub {
                owner,
                repo: name,
                token,
            },
            RepoType::GitLab => BranchRequest::GitLab {
                base: self.base.clone().unwrap_or_default(),
                group: owner,
                project: name,
                token,
            },
        };

        let id = self.branch_requests.issue();
        debug!(?id, ?request, "branch lookup issued");
        Ok(Ticket { id, request })
    }

    pub fn apply_branches(
        &mut self,
        id: RequestId,
        result: Result<Vec<OptionItem>, String>,
    ) -> Result<Applied, FormError> {
        if !self.branch_requests.settle(id) {
            debug!(?id, "dropping superseded branch lookup response");
            return Ok(Applied::Stale);
        }
        match result {
            Ok(items) => {
                self.branch_items = items;
                Ok(Applied::Updated)
            }
            Err(message) => {
                self.branch_items = pending_options();
                Err(FormError::Lookup {
                    kind: LookupKind::Branch,
                    message,
                })
            }
        }
    }

    /// Returns `Ok(None)` when the DOI list is already filled or a fetch
    /// for it is still outstanding.
    pub fn begin_doi_lookup(&mut self) -> Result<Option<Ticket<String>>, FormError> {
        let token = match self.dataverse_token.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                return Err(FormError::Precondition(
                    "DOI lookup failed: Dataverse API token is missing".to_string(),
                ))
            }
        };
        if !is_pending(&self.doi_items) || self.doi_requests.in_flight() {
            return Ok(None);
        }

        let id = self.doi_requests.issue();
        debug!(?id, "doi lookup issued");
        Ok(Some(Ticket { id, request: token }))
    }

    pub fn apply_dois(
        &mut self,
        id: RequestId,
        result: Result<Vec<OptionItem>, String>,
    ) -> Result<Applied, FormError> {
        if !self.doi_requests.settle(id) {
            debug!(?id, "dropping superseded doi lookup response");
            return Ok(Applied::Stale);
        }
        match result {
            Ok(items) => {
                self.doi_items = items;
                Ok(Applied::Updated)
            }
            Err(message) => {
                self.doi_items = pending_options();
                Err(FormError::Lookup {
                    kind: LookupKind::Doi,
                    message,
                })
            }
        }
    }

    /// Returns `Ok(None)` while a previous creation is still running.
    pub fn begin_new_dataset(&mut self) -> Result<Option<Ticket<String>>, FormError> {
        let Some(token) = self.dataverse_token.clone() else {
            return Err(FormError::Precondition(
                "Dataverse API token is missing.".to_string(),
            ));
        };
        if self.creating_new_dataset {
            return Ok(None);
        }

        self.creating_new_dataset = true;
        let id = self.dataset_requests.issue();
        debug!(?id, "new dataset requested");
        Ok(Some(Ticket { id, request: token }))
    }

    pub fn finish_new_dataset(
        &mut self,
        id: RequestId,
        result: Result<NewDatasetResponse, String>,
    ) -> Result<Applied, FormError> {
        if !self.dataset_requests.settle(id) {
            return Ok(Applied::Stale);
        }
        self.creating_new_dataset = false;
        match result {
            Ok(response) => {
                info!(dataset = %response.persistent_id, "dataset created");
                self.dataset_id = Some(response.persistent_id);
                Ok(Applied::Updated)
            }
            Err(message) => Err(FormError::NewDataset(message)),
        }
    }
}
