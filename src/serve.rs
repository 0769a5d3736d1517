//! HTTP server for interactive mode
//!
//! `streamcharts serve songs.csv` → loads the CSV once, opens the browser,
//! and re-renders the charts for every selector or brush change.

use crate::chart::{self, ChartParams, RawParams};
use crate::config::Config;
use crate::dataset::{genre_options, Dataset};
use crate::error::{Error, Result};
use crate::report::html;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{info, warn};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(error: &Error) -> Self {
        Self { ok: false, data: None, error: Some(error.to_string()) }
    }
}

#[derive(Deserialize, Debug)]
struct BrushParams {
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    percentile: Option<f64>,
    dimension: String,
    y0: f64,
    y1: f64,
}

impl BrushParams {
    fn chart_params(&self) -> RawParams {
        RawParams {
            platform: self.platform.clone(),
            genre: self.genre.clone(),
            percentile: self.percentile,
        }
    }
}

/// Immutable state shared by every request
pub struct AppState {
    pub dataset: Dataset,
    pub config: Config,
}

/// Start server, open browser, serve UI
pub fn start(port: u16, path: PathBuf, config: Config) -> Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| Error::Server(e.to_string()))?;

    let dataset = Dataset::load(&path, &config);
    if dataset.is_empty() {
        warn!(path = %path.display(), "no rows loaded, charts will be empty");
    }
    let state = AppState { dataset, config };

    let url = format!("http://localhost:{}", port);
    info!(%url, csv = %path.display(), "serving charts");

    // Open browser
    let _ = open::that(&url);

    // Handle requests
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &state) {
            warn!("request failed: {}", e);
        }
    }

    Ok(())
}

fn handle_request(request: Request, state: &AppState) -> Result<()> {
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or("/");
    let query = url.split('?').nth(1).unwrap_or("");
    let method = request.method().clone();

    tracing::debug!(%method, %url, "request");

    let (status, body, content_type) = match (&method, path) {
        (&Method::Get, "/") => match page(state) {
            Ok(html) => (200, html, "text/html; charset=utf-8"),
            Err(e) => (500, error_json(&e)?, "application/json"),
        },
        (&Method::Get, api) if api.starts_with("/api/") => match route_api(api, query, state) {
            Ok(Some(json)) => (200, json, "application/json"),
            Ok(None) => (404, "Not found".to_string(), "text/plain"),
            Err(e) => (400, error_json(&e)?, "application/json"),
        },
        _ => (404, "Not found".to_string(), "text/plain"),
    };

    let header = Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
        .map_err(|_| Error::Server("invalid content type header".into()))?;
    let response = Response::from_string(body)
        .with_status_code(status)
        .with_header(header);
    request.respond(response)?;
    Ok(())
}

fn page(state: &AppState) -> Result<String> {
    let data = chart::render(&state.dataset, &ChartParams::default(), &state.config)?;
    Ok(html::render_page(&data, true)?)
}

/// Dispatch an `/api/...` route. `Ok(None)` means no such route.
pub fn route_api(path: &str, query: &str, state: &AppState) -> Result<Option<String>> {
    let AppState { dataset, config } = state;

    let json = match path {
        "/api/chart" => {
            let params = ChartParams::parse(&parse_query(query)?, config)?;
            success(chart::render(dataset, &params, config)?)?
        }
        "/api/sankey" => {
            let params = ChartParams::parse(&parse_query(query)?, config)?;
            success(chart::render_sankey(dataset, &params.platform, config))?
        }
        "/api/parallel" => {
            let params = ChartParams::parse(&parse_query(query)?, config)?;
            success(chart::render_parallel(dataset, &params.genre, params.percentile, config)?)?
        }
        "/api/brush" => {
            let brush: BrushParams = parse_query(query)?;
            let params = ChartParams::parse(&brush.chart_params(), config)?;
            let parallel = chart::render_parallel(dataset, &params.genre, params.percentile, config)?;
            success(parallel.brush(&brush.dimension, brush.y0, brush.y1)?)?
        }
        "/api/genres" => success(genre_options(&dataset.records))?,
        _ => return Ok(None),
    };

    Ok(Some(json))
}

fn parse_query<T: for<'de> Deserialize<'de>>(query: &str) -> Result<T> {
    serde_urlencoded::from_str(query).map_err(|e| Error::Server(format!("bad query: {}", e)))
}

fn success<T: Serialize>(data: T) -> Result<String> {
    Ok(serde_json::to_string(&ApiResponse::success(data))?)
}

fn error_json(error: &Error) -> Result<String> {
    Ok(serde_json::to_string(&ApiResponse::failure(error))?)
}
