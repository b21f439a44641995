use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use log::*;

use crate::{
    dashboard::{Dashboard, DashboardLayout, Routes, SalesFilter},
    export::write_records_with_revenue,
    records::SaleRecord,
    report::run_pipeline,
    xlsx_report::workbook_to_buffer,
};

const EXPORT_FILE_NAME: &str = "vendas_veiculos.csv";
const WORKBOOK_FILE_NAME: &str = "relatorio_vendas.xlsx";
const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Loaded once at startup, only ever read by the handlers
pub struct AppState {
    records: Vec<SaleRecord>,
    dashboard: Dashboard,
}

impl AppState {
    pub fn new(records: Vec<SaleRecord>, layout: DashboardLayout) -> anyhow::Result<Self> {
        Ok(Self {
            records,
            dashboard: Dashboard::new(layout, Routes::default())?,
        })
    }
}

/// Turns any failure of a handler into a plain error page
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    fn bad_request(error: anyhow::Error) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed: {:#}", self.error);
        } else {
            warn!("Rejected request: {:#}", self.error);
        }
        (self.status, format!("{:#}", self.error)).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let routes = Routes::default();
    Router::new()
        .route("/", get(landing))
        .route(&routes.dashboard, get(dashboard))
        .route(&routes.export, get(export_csv))
        .route(&routes.workbook, get(export_workbook))
        .with_state(state)
}

async fn landing(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    Ok(Html(state.dashboard.render_landing()?))
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Html<String>, AppError> {
    let filter = SalesFilter::from_query(&params).map_err(AppError::bad_request)?;
    Ok(Html(state.dashboard.render(&state.records, &filter)?))
}

/// The whole dataset, whatever the dashboard filters are
async fn export_csv(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let mut body = Vec::new();
    write_records_with_revenue(&state.records, &mut body)?;
    Ok(attachment("text/csv; charset=utf-8", EXPORT_FILE_NAME, body))
}

async fn export_workbook(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let bundle = run_pipeline(&state.records).context("Cannot build the report")?;
    let body = workbook_to_buffer(&bundle)?;
    Ok(attachment(XLSX_CONTENT_TYPE, WORKBOOK_FILE_NAME, body))
}

fn attachment(content_type: &'static str, file_name: &str, body: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file_name);
    (
        [
            (header::CONTENT_TYPE, content_type.to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// Serves until the process is stopped
pub async fn serve(state: AppState, bind: SocketAddr) -> anyhow::Result<()> {
    let app = router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Cannot listen on {}", bind))?;
    info!("Dashboard available at http://{}{}", bind, Routes::default().dashboard);
    axum::serve(listener, app).await.context("Server stopped")?;
    Ok(())
}
