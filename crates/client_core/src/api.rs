use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{ActionFields, ActionId, ActionRecord, ProjectId},
    protocol::{ActionOrderRequest, SaveActionResponse},
};
use url::Url;

/// Remote side of the action list.
#[async_trait]
pub trait ActionsApi: Send + Sync {
    async fn create(&self, fields: &ActionFields) -> Result<SaveActionResponse>;
    async fn update(&self, id: ActionId, fields: &ActionFields) -> Result<SaveActionResponse>;
    /// The reply body is not inspected.
    async fn destroy(&self, id: ActionId) -> Result<()>;
    /// Persists `order` as the complete ordering. The reply body is not
    /// inspected.
    async fn reorder(&self, order: &[ActionId]) -> Result<()>;
}

/// [`ActionsApi`] over HTTP against `<server>/project/<id>/...`.
pub struct HttpActionsApi {
    http: Client,
    base: Url,
}

impl HttpActionsApi {
    pub fn new(server_url: &str, project_id: ProjectId) -> Result<Self> {
        Self::with_client(Client::new(), server_url, project_id)
    }

    pub fn with_client(http: Client, server_url: &str, project_id: ProjectId) -> Result<Self> {
        let mut server = Url::parse(server_url)
            .with_context(|| format!("invalid server url '{server_url}'"))?;
        if !server.path().ends_with('/') {
            let path = format!("{}/", server.path());
            server.set_path(&path);
        }
        let base = server
            .join(&format!("project/{project_id}/"))
            .context("failed to build project url")?;
        Ok(Self { http, base })
    }

    /// The collection resource; new actions are created here.
    pub fn collection_url(&self) -> Result<Url> {
        self.endpoint("action")
    }

    pub fn item_url(&self, id: ActionId) -> Result<Url> {
        self.endpoint(&format!("action/{id}"))
    }

    pub fn order_url(&self) -> Result<Url> {
        self.endpoint("action-order")
    }

    /// Loads the initial list for the project, in stored order.
    pub async fn fetch_seed(&self) -> Result<Vec<ActionRecord>> {
        let url = self.collection_url()?;
        let records = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("failed to fetch actions from {url}"))?
            .error_for_status()?
            .json()
            .await
            .context("invalid action list")?;
        Ok(records)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("failed to build endpoint url for '{path}'"))
    }
}

#[async_trait]
impl ActionsApi for HttpActionsApi {
    async fn create(&self, fields: &ActionFields) -> Result<SaveActionResponse> {
        let res = self
            .http
            .post(self.collection_url()?)
            .json(fields)
            .send()
            .await
            .context("create request failed")?
            .error_for_status()?;
        res.json().await.context("invalid create response")
    }

    async fn update(&self, id: ActionId, fields: &ActionFields) -> Result<SaveActionResponse> {
        let res = self
            .http
            .put(self.item_url(id)?)
            .json(fields)
            .send()
            .await
            .with_context(|| format!("update request for action {id} failed"))?
            .error_for_status()?;
        res.json().await.context("invalid update response")
    }

    async fn destroy(&self, id: ActionId) -> Result<()> {
        self.http
            .delete(self.item_url(id)?)
            .send()
            .await
            .with_context(|| format!("destroy request for action {id} failed"))?
            .error_for_status()?;
        Ok(())
    }

    async fn reorder(&self, order: &[ActionId]) -> Result<()> {
        self.http
            .post(self.order_url()?)
            .json(&ActionOrderRequest {
                order: order.to_vec(),
            })
            .send()
            .await
            .context("reorder request failed")?
            .error_for_status()?;
        Ok(())
    }
}
