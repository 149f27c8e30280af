use serde::{Deserialize, Serialize};
use std::fmt;

pub const LOADING_VALUE: &str = "loading";
pub const GITHUB_PLACEHOLDER: &str = "https://github.com/<owner>/<repository>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoType {
    GitHub,
    GitLab,
}

impl RepoType {
    pub const ALL: &[RepoType] = &[RepoType::GitHub, RepoType::GitLab];

    pub fn label(self) -> &'static str {
        match self {
            RepoType::GitHub => "GitHub",
            RepoType::GitLab => "GitLab",
        }
    }

    pub fn value(self) -> &'static str {
        match self {
            RepoType::GitHub => "github",
            RepoType::GitLab => "gitlab",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        RepoType::ALL.iter().copied().find(|t| t.value() == value)
    }

    pub fn options() -> Vec<OptionItem> {
        RepoType::ALL
            .iter()
            .map(|t| OptionItem::new(t.label(), t.value()))
            .collect()
    }
}

impl fmt::Display for RepoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// One selectable dropdown entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub label: String,
    pub value: String,
}

impl OptionItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// The pending sentinel: a fetch for this list has not completed.
    pub fn loading() -> Self {
        Self::new("Loading...", LOADING_VALUE)
    }

    pub fn is_loading(&self) -> bool {
        self.value == LOADING_VALUE
    }
}

pub fn pending_options() -> Vec<OptionItem> {
    vec![OptionItem::loading()]
}

/// True when the list is exactly the single pending sentinel.
pub fn is_pending(items: &[OptionItem]) -> bool {
    matches!(items, [only] if only.is_loading())
}

/// Validated connection parameters handed to the comparison view.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    repo_type: RepoType,
    repo_owner: String,
    repo_name: String,
    repo_branch: String,
    repo_token: String,
    base_url: String,
    dataset_id: String,
    dataverse_token: String,
}

pub struct CredentialParts {
    pub repo_type: RepoType,
    pub repo_owner: String,
    pub repo_name: String,
    pub repo_branch: String,
    pub repo_token: String,
    pub base_url: String,
    pub dataset_id: String,
    pub dataverse_token: String,
}

impl Credentials {
    pub fn new(parts: CredentialParts) -> Self {
        Self {
            repo_type: parts.repo_type,
            repo_owner: parts.repo_owner,
            repo_name: parts.repo_name,
            repo_branch: parts.repo_branch,
            repo_token: parts.repo_token,
            base_url: parts.base_url,
            dataset_id: parts.dataset_id,
            dataverse_token: parts.dataverse_token,
        }
    }

    pub fn repo_type(&self) -> RepoType {
        self.repo_type
    }

    pub fn repo_owner(&self) -> &str {
        &self.repo_owner
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    pub fn repo_branch(&self) -> &str {
        &self.repo_branch
    }

    pub fn repo_token(&self) -> &str {
        &self.repo_token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    pub fn dataverse_token(&self) -> &str {
        &self.dataverse_token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("repo_type", &self.repo_type)
            .field("repo_owner", &self.repo_owner)
            .field("repo_name", &self.repo_name)
            .field("repo_branch", &self.repo_branch)
            .field("repo_token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("dataset_id", &self.dataset_id)
            .field("dataverse_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Route {
    Compare { dataset_id: String },
}

/// What a successful connect produces: where to go and what to carry there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handoff {
    pub route: Route,
    pub credentials: Credentials,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_check_needs_exactly_the_sentinel() {
        assert!(is_pending(&pending_options()));
        assert!(!is_pending(&[]));
        assert!(!is_pending(&[OptionItem::new("main", "main")]));
        assert!(!is_pending(&[OptionItem::loading(), OptionItem::loading()]));
    }

    #[test]
    fn repo_type_values_round_trip() {
        for t in RepoType::ALL {
            assert_eq!(RepoType::from_value(t.value()), Some(*t));
        }
        assert_eq!(RepoType::from_value("bitbucket"), None);
        assert_eq!(RepoType::options()[1], OptionItem::new("GitLab", "gitlab"));
    }

    #[test]
    fn credentials_debug_hides_tokens() {
        let creds = Credentials::new(CredentialParts {
            repo_type: RepoType::GitHub,
            repo_owner: "acme".into(),
            repo_name: "widgets".into(),
            repo_branch: "main".into(),
            repo_token: "ghp_secret".into(),
            base_url: "https://github.com".into(),
            dataset_id: "doi:10.1/X".into(),
            dataverse_token: "dv_secret".into(),
        });
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("ghp_secret"));
        assert!(!dbg.contains("dv_secret"));
        assert!(dbg.contains("widgets"));
    }
}
