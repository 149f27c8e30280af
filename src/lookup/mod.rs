pub mod backend;
pub mod github;

use crate::error::Result;
use crate::model::{OptionItem, RepoType};
use async_trait::async_trait;
use backend::BackendClient;
use github::GitHubBranches;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-specific identification for a branch listing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "repoType", rename_all = "lowercase")]
pub enum BranchRequest {
    GitHub {
        #[serde(rename = "user")]
        owner: String,
        repo: String,
        token: String,
    },
    GitLab {
        base: String,
        group: String,
        project: String,
        token: String,
    },
}

impl BranchRequest {
    pub fn repo_type(&self) -> RepoType {
        match self {
            BranchRequest::GitHub { .. } => RepoType::GitHub,
            BranchRequest::GitLab { .. } => RepoType::GitLab,
        }
    }
}

impl fmt::Debug for BranchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchRequest::GitHub { owner, repo, .. } => f
                .debug_struct("GitHub")
                .field("owner", owner)
                .field("repo", repo)
                .finish_non_exhaustive(),
            BranchRequest::GitLab {
                base,
                group,
                project,
                ..
            } => f
                .debug_struct("GitLab")
                .field("base", base)
                .field("group", group)
                .field("project", project)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDatasetResponse {
    #[serde(rename = "persistentId")]
    pub persistent_id: String,
}

#[async_trait]
pub trait BranchLookup: Send + Sync {
    async fn branches(&self, request: BranchRequest) -> Result<Vec<OptionItem>>;
}

#[async_trait]
pub trait DoiLookup: Send + Sync {
    async fn dois(&self, dataverse_token: &str) -> Result<Vec<OptionItem>>;
}

#[async_trait]
pub trait DatasetService: Send + Sync {
    async fn new_dataset(&self, dataverse_token: &str) -> Result<NewDatasetResponse>;
}

/// Routes each lookup to the adapter that serves it: GitHub branches go
/// straight to the GitHub API, everything else through the backend.
pub struct Lookups {
    github: GitHubBranches,
    backend: BackendClient,
}

impl Lookups {
    pub fn new(github: GitHubBranches, backend: BackendClient) -> Self {
        Self { github, backend }
    }
}

#[async_trait]
impl BranchLookup for Lookups {
    async fn branches(&self, request: BranchRequest) -> Result<Vec<OptionItem>> {
        match request.repo_type() {
            RepoType::GitHub => self.github.branches(request).await,
            RepoType::GitLab => self.backend.branches(request).await,
        }
    }
}

#[async_trait]
impl DoiLookup for Lookups {
    async fn dois(&self, dataverse_token: &str) -> Result<Vec<OptionItem>> {
        self.backend.dois(dataverse_token).await
    }
}

#[async_trait]
impl DatasetService for Lookups {
    async fn new_dataset(&self, dataverse_token: &str) -> Result<NewDatasetResponse> {
        self.backend.new_dataset(dataverse_token).await
    }
}
