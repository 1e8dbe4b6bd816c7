//! Flow listing and update operations

use reqwest::Method;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ApiError;
use crate::model::FlowStatus;
use crate::model::PopulatedFlow;
use crate::table::Cursor;
use crate::table::Page;

use super::client::FlowdeckClient;

/// Query for one page of a project's flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFlowsRequest {
    pub project_id: String,
    pub cursor: Option<Cursor>,
    pub limit: usize,
    pub folder_id: Option<String>,
    pub status: Option<FlowStatus>,
}

impl ListFlowsRequest {
    /// First page of `project_id` with `limit` rows.
    pub fn new(project_id: impl Into<String>, limit: usize) -> Self {
        Self {
            project_id: project_id.into(),
            cursor: None,
            limit,
            folder_id: None,
            status: None,
        }
    }

    pub fn cursor(mut self, cursor: Option<Cursor>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    pub fn status(mut self, status: FlowStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Query string pairs, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("projectId", self.project_id.clone())];
        if let Some(cursor) = &self.cursor {
            pairs.push(("cursor", cursor.as_str().to_string()));
        }
        pairs.push(("limit", self.limit.to_string()));
        if let Some(folder_id) = &self.folder_id {
            pairs.push(("folderId", folder_id.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_wire().to_string()));
        }
        pairs
    }
}

/// Page envelope returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeekPage<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

impl<T> SeekPage<T> {
    /// Converts into a table page; an empty `next` token ends the sequence.
    pub fn into_page(self) -> Page<T> {
        let next = self.next.filter(|token| !token.is_empty()).map(Cursor::new);
        Page::new(self.data).with_next_cursor_opt(next)
    }
}

/// Update request body for a single flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "request",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum FlowOperation {
    ChangeStatus { status: FlowStatus },
    ChangeFolder { folder_id: Option<String> },
    ChangeName { display_name: String },
}

impl FlowdeckClient {
    /// Lists one page of flows.
    pub async fn list_flows(
        &self,
        request: &ListFlowsRequest,
    ) -> Result<Page<PopulatedFlow>, ApiError> {
        let mut url = self.endpoint("v1/flows")?;
        url.query_pairs_mut().extend_pairs(request.query_pairs());

        let page: SeekPage<PopulatedFlow> = self.request_json(Method::GET, url, None).await?;
        log::debug!(
            "Listed {} flows for project {} (more: {})",
            page.data.len(),
            request.project_id,
            page.next.is_some()
        );
        Ok(page.into_page())
    }

    /// Fetches a single flow.
    pub async fn get_flow(&self, flow_id: &str) -> Result<PopulatedFlow, ApiError> {
        let url = self.flow_url(flow_id)?;
        self.request_json(Method::GET, url, None).await
    }

    /// Applies an operation to a flow and returns the updated flow.
    pub async fn update_flow(
        &self,
        flow_id: &str,
        operation: &FlowOperation,
    ) -> Result<PopulatedFlow, ApiError> {
        let url = self.flow_url(flow_id)?;
        let body = serde_json::to_value(operation).map_err(|e| ApiError::parse(e.to_string()))?;
        self.request_json(Method::POST, url, Some(&body)).await
    }

    /// Enables or disables a flow.
    pub async fn change_status(
        &self,
        flow_id: &str,
        status: FlowStatus,
    ) -> Result<PopulatedFlow, ApiError> {
        log::info!("Changing status of flow {} to {}", flow_id, status.label());
        self.update_flow(flow_id, &FlowOperation::ChangeStatus { status })
            .await
    }

    fn flow_url(&self, flow_id: &str) -> Result<url::Url, ApiError> {
        let mut url = self.endpoint("v1/flows")?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(flow_id.to_string()))?
            .push(flow_id);
        Ok(url)
    }
}
