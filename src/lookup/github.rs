use crate::error::{ConnectError, Result};
use crate::lookup::{BranchLookup, BranchRequest};
use crate::model::OptionItem;
use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

#[derive(Clone)]
pub struct GitHubBranches {
    max_branches: usize,
}

impl GitHubBranches {
    pub fn new(max_branches: usize) -> Self {
        Self {
            max_branches: max_branches.max(1),
        }
    }

    async fn fetch(&self, token: &str, owner: &str, repo: &str) -> Result<Vec<OptionItem>> {
        let octo = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| ConnectError::GitHub(e.to_string()))?;

        let mut branches = Vec::new();
        let mut page = 1u32;

        loop {
            let result = octo
                .repos(owner, repo)
                .list_branches()
                .per_page(100)
                .page(page)
                .send()
                .await
                .map_err(|e| ConnectError::GitHub(e.to_string()))?;

            if result.items.is_empty() {
                break;
            }

            for branch in &result.items {
                branches.push(OptionItem::new(branch.name.clone(), branch.name.clone()));
                if branches.len() >= self.max_branches {
                    break;
                }
            }

            if branches.len() >= self.max_branches || result.next.is_none() {
                break;
            }
            page += 1;
        }

        debug!(owner, repo, count = branches.len(), "listed github branches");
        Ok(branches)
    }
}

#[async_trait]
impl BranchLookup for GitHubBranches {
    async fn branches(&self, request: BranchRequest) -> Result<Vec<OptionItem>> {
        match request {
            BranchRequest::GitHub { owner, repo, token } => {
                self.fetch(&token, &owner, &repo).await
            }
            other => Err(ConnectError::GitHub(format!(
                "cannot list {} branches through the GitHub API",
                other.repo_type().label()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_gitlab_requests_without_calling_out() {
        let lookup = GitHubBranches::new(10);
        let err = lookup
            .branches(BranchRequest::GitLab {
                base: "https://gitlab.example.org".into(),
                group: "g".into(),
                project: "p".into(),
                token: "t".into(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("GitLab"));
    }
}
