//! Flows listing built on the paginated table.
//!
//! [`columns`] describes how a [`PopulatedFlow`] renders, [`FlowsSource`]
//! pages flows of one project through the HTTP API, and [`table`] wires both
//! into a [`PaginatedTable`].

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::api::FlowdeckClient;
use crate::api::ListFlowsRequest;
use crate::error::FetchError;
use crate::error::TableError;
use crate::model::PopulatedFlow;
use crate::table::Cell;
use crate::table::Column;
use crate::table::DataSource;
use crate::table::Page;
use crate::table::PaginatedTable;
use crate::table::Pagination;
use crate::table::Row;
use crate::table::RowActions;

/// Row action bound to the status column's toggle.
pub const TOGGLE_STATUS_ACTION: &str = "toggle-status";

/// Folder label for flows outside any folder.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Formats a timestamp the way listings show it, e.g. `Mar 4, 2024, 9:05 AM`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y, %-I:%M %p").to_string()
}

/// Column definitions for the flows table.
///
/// `on_toggle` runs when the status control of a row is clicked and the
/// row's [`TOGGLE_STATUS_ACTION`] is enabled.
pub fn columns<F>(on_toggle: F) -> Vec<Column<PopulatedFlow>>
where
    F: Fn(&Row<PopulatedFlow>) + Send + Sync + 'static,
{
    vec![
        Column::new("name", "Name", |row: &Row<PopulatedFlow>| {
            Cell::text(row.data.display_name())
        }),
        Column::new("steps", "Steps", |row: &Row<PopulatedFlow>| {
            Cell::text(row.data.version.piece_names().join(", "))
        }),
        Column::new("folderId", "Folder", |row: &Row<PopulatedFlow>| {
            Cell::text(row.data.folder_id.as_deref().unwrap_or(UNCATEGORIZED))
        }),
        Column::new("created", "Created", |row: &Row<PopulatedFlow>| {
            Cell::text(format_date(&row.data.created))
        }),
        Column::new("status", "Status", |row: &Row<PopulatedFlow>| {
            Cell::control(TOGGLE_STATUS_ACTION, row.data.status.label())
        })
        .on_control(on_toggle),
    ]
}

/// Per-row actions: a flow that was never published cannot be toggled.
pub fn row_actions(flow: &PopulatedFlow) -> RowActions {
    let actions = RowActions::new();
    if flow.published_version_id.is_some() {
        actions
    } else {
        actions.disable(TOGGLE_STATUS_ACTION)
    }
}

/// Data source listing the flows of one project.
#[derive(Clone)]
pub struct FlowsSource {
    client: FlowdeckClient,
    project_id: String,
}

impl FlowsSource {
    pub fn new(client: FlowdeckClient, project_id: impl Into<String>) -> Self {
        Self {
            client,
            project_id: project_id.into(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Builds the request for one page.
    pub fn request(&self, pagination: &Pagination) -> ListFlowsRequest {
        ListFlowsRequest::new(self.project_id.clone(), pagination.limit)
            .cursor(pagination.cursor.clone())
    }
}

#[async_trait]
impl DataSource<PopulatedFlow> for FlowsSource {
    async fn fetch(
        &self,
        pagination: Pagination,
        cancel: CancellationToken,
    ) -> Result<Page<PopulatedFlow>, FetchError> {
        let request = self.request(&pagination);
        match cancel.run_until_cancelled(self.client.list_flows(&request)).await {
            Some(result) => result.map_err(FetchError::from),
            None => Err(FetchError::new("flow listing cancelled").retryable(false)),
        }
    }
}

/// Builds the flows table for a project.
pub fn table<F>(
    source: FlowsSource,
    page_size: usize,
    on_toggle: F,
    on_row_click: impl Fn(&Row<PopulatedFlow>) + Send + Sync + 'static,
) -> Result<PaginatedTable<PopulatedFlow>, TableError>
where
    F: Fn(&Row<PopulatedFlow>) + Send + Sync + 'static,
{
    PaginatedTable::builder()
        .columns(columns(on_toggle))
        .source(source)
        .page_size(page_size)
        .row_actions(row_actions)
        .on_row_click(on_row_click)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn flow(folder: Option<&str>, published: bool) -> PopulatedFlow {
        serde_json::from_value(json!({
            "id": "flow-1",
            "projectId": "proj-1",
            "folderId": folder,
            "status": "DISABLED",
            "publishedVersionId": if published { Some("v-1") } else { None },
            "created": "2024-03-04T09:05:00Z",
            "updated": "2024-03-04T09:05:00Z",
            "version": {
                "id": "v-1",
                "flowId": "flow-1",
                "displayName": "Sync leads",
                "valid": true,
                "state": "LOCKED",
                "created": "2024-03-04T09:05:00Z",
                "updated": "2024-03-04T09:05:00Z",
                "trigger": {
                    "name": "trigger",
                    "displayName": "Every hour",
                    "type": "PIECE_TRIGGER",
                    "valid": true,
                    "settings": {"pieceName": "@activepieces/piece-schedule"},
                    "nextAction": {
                        "name": "step_1",
                        "displayName": "Post",
                        "type": "PIECE",
                        "valid": true,
                        "settings": {
                            "pieceName": "@activepieces/piece-slack",
                            "pieceVersion": "0.5.0",
                            "actionName": "send_message",
                            "input": {}
                        }
                    }
                }
            }
        }))
        .unwrap()
    }

    fn render(flow: PopulatedFlow) -> Vec<Cell> {
        let row = Row::new(flow.clone()).with_actions(row_actions(&flow));
        columns(|_| {}).iter().map(|c| c.render(&row)).collect()
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 4, 15, 5, 0).unwrap();
        assert_eq!(format_date(&date), "Mar 4, 2024, 3:05 PM");
    }

    #[test]
    fn test_columns_render_flow() {
        let cells = render(flow(None, true));
        assert_eq!(
            cells,
            vec![
                Cell::text("Sync leads"),
                Cell::text("@activepieces/piece-schedule, @activepieces/piece-slack"),
                Cell::text("Uncategorized"),
                Cell::text("Mar 4, 2024, 9:05 AM"),
                Cell::control(TOGGLE_STATUS_ACTION, "Disabled"),
            ]
        );
    }

    #[test]
    fn test_folder_column_shows_folder() {
        let cells = render(flow(Some("folder-9"), true));
        assert_eq!(cells[2], Cell::text("folder-9"));
    }

    #[test]
    fn test_unpublished_flow_cannot_toggle() {
        assert!(!row_actions(&flow(None, false)).is_enabled(TOGGLE_STATUS_ACTION));
        assert!(row_actions(&flow(None, true)).is_enabled(TOGGLE_STATUS_ACTION));
    }

    #[test]
    fn test_request_carries_cursor() {
        let client = FlowdeckClient::builder()
            .url("https://cloud.example.com/api")
            .build()
            .unwrap();
        let source = FlowsSource::new(client, "proj-1");
        let request = source.request(&Pagination::after("c1".into(), 5));
        assert_eq!(request.project_id, "proj-1");
        assert_eq!(request.cursor.as_ref().map(|c| c.as_str()), Some("c1"));
        assert_eq!(request.limit, 5);
    }
}
