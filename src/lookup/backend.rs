use crate::error::{ConnectError, Result};
use crate::lookup::{BranchLookup, BranchRequest, DatasetService, DoiLookup, NewDatasetResponse};
use crate::model::OptionItem;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const BRANCHES_PATH: &str = "api/plugin/options";
const DOIS_PATH: &str = "api/common/dois";
const NEW_DATASET_PATH: &str = "api/common/newdataset";

/// JSON client for the companion service that fronts GitLab and Dataverse.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(%url, "backend request");
        let response = self.http.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.trim();
            return Err(ConnectError::Backend(if text.is_empty() {
                status.to_string()
            } else {
                format!("{status}: {text}")
            }));
        }

        Ok(response.json::<T>().await?)
    }
}

fn options_or_empty(items: Option<Vec<OptionItem>>) -> Vec<OptionItem> {
    items.unwrap_or_default()
}

#[async_trait]
impl BranchLookup for BackendClient {
    async fn branches(&self, request: BranchRequest) -> Result<Vec<OptionItem>> {
        let items: Option<Vec<OptionItem>> = self.post(BRANCHES_PATH, &request).await?;
        Ok(options_or_empty(items))
    }
}

#[async_trait]
impl DoiLookup for BackendClient {
    async fn dois(&self, dataverse_token: &str) -> Result<Vec<OptionItem>> {
        let items: Option<Vec<OptionItem>> = self
            .post(DOIS_PATH, &json!({ "token": dataverse_token }))
            .await?;
        Ok(options_or_empty(items))
    }
}

#[async_trait]
impl DatasetService for BackendClient {
    async fn new_dataset(&self, dataverse_token: &str) -> Result<NewDatasetResponse> {
        self.post(NEW_DATASET_PATH, &json!({ "token": dataverse_token }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = BackendClient::new("http://localhost:7788/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint(DOIS_PATH),
            "http://localhost:7788/api/common/dois"
        );
    }

    #[test]
    fn null_option_list_reads_as_empty() {
        let items: Option<Vec<OptionItem>> = serde_json::from_str("null").unwrap();
        assert!(options_or_empty(items).is_empty());
    }
}
