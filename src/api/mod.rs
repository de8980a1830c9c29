use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    Bar, BarType, DecompositionError, Node, RawNode, SweepAxis, SweepError,
    decomposition_to_waterfall, select_index, visible_bars,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");
const SAMPLE_DECOMPOSITION: &str = include_str!("../../data/sample_decomposition.json");

const SUB_TOTAL_FILL: &str = "rgba(55, 128, 191, 0.7)";
const SUB_TOTAL_LINE: &str = "rgba(55, 128, 191, 1.0)";
const NEGATIVE_FILL: &str = "rgba(219, 64, 82, 0.7)";
const NEGATIVE_LINE: &str = "rgba(219, 64, 82, 1.0)";
const POSITIVE_FILL: &str = "rgba(50, 171, 96, 0.7)";
const POSITIVE_LINE: &str = "rgba(50, 171, 96, 1.0)";

#[derive(Parser, Debug)]
#[command(
    name = "waterfall",
    about = "Interactive waterfall explorer for precomputed tax-benefit decompositions"
)]
pub struct ServeArgs {
    #[arg(long, default_value_t = 7777)]
    pub port: u16,
    #[arg(
        long,
        help = "Decomposition JSON produced by the simulation engine; defaults to the bundled sample"
    )]
    pub decomposition: Option<PathBuf>,
    #[arg(long, default_value_t = 0.0)]
    pub axis_min: f64,
    #[arg(long, default_value_t = 100_000.0)]
    pub axis_max: f64,
    #[arg(long, default_value = "salaire_de_base")]
    pub axis_name: String,
    #[arg(long, help = "Initial slider position; defaults to --axis-min")]
    pub initial_value: Option<f64>,
    #[arg(long, help = "Grand-total bar code; defaults to the decomposition root")]
    pub total_code: Option<String>,
}

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("failed to read {path}: {source}")]
    ReadDecomposition {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid decomposition JSON: {0}")]
    ParseDecomposition(#[from] serde_json::Error),
    #[error(transparent)]
    Decomposition(#[from] DecompositionError),
    #[error(transparent)]
    Sweep(#[from] SweepError),
    #[error("{0}")]
    InvalidArgs(String),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct AppState {
    tree: Node<Vec<f64>>,
    axis: SweepAxis,
    axis_name: String,
    initial_value: f64,
    total_code: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WaterfallPayload {
    value: Option<f64>,
    sub_totals: Option<bool>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartSegment {
    label: String,
    base: f64,
    value: f64,
    fill_color: String,
    line_color: String,
    line_width: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WaterfallResponse {
    axis_name: String,
    value: f64,
    index: usize,
    title: String,
    bars: Vec<Bar<f64>>,
    segments: Vec<ChartSegment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigResponse<'a> {
    axis_name: &'a str,
    min: f64,
    max: f64,
    step: f64,
    count: usize,
    initial_value: f64,
    total_code: &'a str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_state(args: &ServeArgs) -> Result<AppState, ServeError> {
    let raw_json = match &args.decomposition {
        Some(path) => {
            std::fs::read_to_string(path).map_err(|source| ServeError::ReadDecomposition {
                path: path.clone(),
                source,
            })?
        }
        None => SAMPLE_DECOMPOSITION.to_string(),
    };

    let raw: RawNode = serde_json::from_str(&raw_json)?;
    let tree = raw.into_vector_tree()?;
    let count = tree.sweep_len().ok_or_else(|| {
        ServeError::InvalidArgs(
            "decomposition has no leaves, cannot derive the sweep length".to_string(),
        )
    })?;
    let axis = SweepAxis::new(args.axis_min, args.axis_max, count)?;

    let initial_value = args.initial_value.unwrap_or(args.axis_min);
    if !(args.axis_min..=args.axis_max).contains(&initial_value) {
        return Err(ServeError::InvalidArgs(
            "--initial-value must lie between --axis-min and --axis-max".to_string(),
        ));
    }

    let total_code = match &args.total_code {
        Some(code) => code.clone(),
        None => tree.code.clone(),
    };

    Ok(AppState {
        tree,
        axis,
        axis_name: args.axis_name.clone(),
        initial_value,
        total_code,
    })
}

fn chart_segments(bars: &[Bar<f64>]) -> Vec<ChartSegment> {
    bars.iter()
        .map(|bar| {
            let (fill, line) = match bar.bar_type {
                BarType::SubTotal => (SUB_TOTAL_FILL, SUB_TOTAL_LINE),
                BarType::Value if bar.value < 0.0 => (NEGATIVE_FILL, NEGATIVE_LINE),
                BarType::Value => (POSITIVE_FILL, POSITIVE_LINE),
            };
            ChartSegment {
                label: bar.label().to_string(),
                base: bar.base,
                value: bar.value,
                fill_color: fill.to_string(),
                line_color: line.to_string(),
                line_width: 2,
            }
        })
        .collect()
}

fn build_waterfall_response(state: &AppState, payload: WaterfallPayload) -> WaterfallResponse {
    let value = state.axis.clamp(payload.value.unwrap_or(state.initial_value));
    let show_sub_totals = payload.sub_totals.unwrap_or(false);
    let index = state.axis.index_for(value);

    let selected = select_index(&state.tree, index);
    let bars = decomposition_to_waterfall(&selected);
    let bars = visible_bars(&bars, show_sub_totals, &state.total_code);
    let title = bars
        .last()
        .map(|bar| bar.title().to_string())
        .unwrap_or_else(|| state.total_code.clone());
    let segments = chart_segments(&bars);

    tracing::debug!(value, index, bars = bars.len(), "waterfall recomputed");

    WaterfallResponse {
        axis_name: state.axis_name.clone(),
        value,
        index,
        title,
        bars,
        segments,
    }
}

pub async fn run_http_server(args: ServeArgs) -> Result<(), ServeError> {
    let state = Arc::new(build_state(&args)?);
    tracing::info!(
        points = state.axis.count,
        total = %state.total_code,
        "decomposition loaded"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/config", get(config_handler))
        .route(
            "/api/waterfall",
            get(waterfall_get_handler).post(waterfall_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("waterfall UI listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn config_handler(State(state): State<Arc<AppState>>) -> Response {
    json_response(
        StatusCode::OK,
        ConfigResponse {
            axis_name: &state.axis_name,
            min: state.axis.min,
            max: state.axis.max,
            step: state.axis.step,
            count: state.axis.count,
            initial_value: state.initial_value,
            total_code: &state.total_code,
        },
    )
}

async fn waterfall_get_handler(
    State(state): State<Arc<AppState>>,
    Query(payload): Query<WaterfallPayload>,
) -> Response {
    json_response(StatusCode::OK, build_waterfall_response(&state, payload))
}

async fn waterfall_post_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WaterfallPayload>,
) -> Response {
    json_response(StatusCode::OK, build_waterfall_response(&state, payload))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
