//! HTTP API server
//!
//! Transport layer for the tracking core. Validates incoming updates before
//! they reach the dispatcher and serializes query responses. Also exposes
//! service metrics in Prometheus text format at /metrics. Uses hyper for the
//! HTTP server.
//!
//! Routes:
//! - `POST /locations` - ingest one courier location update
//! - `GET /couriers/{id}/distance` - cumulative distance in meters
//! - `GET /couriers/{id}/entrances` - recorded store entrances
//! - `GET /health` - liveness probe
//! - `GET /metrics` - Prometheus metrics

use crate::domain::types::{CourierId, LocationUpdate};
use crate::infra::metrics::Metrics;
use crate::services::LocationDispatcher;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use std::convert::Infallible;
use std::fmt::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Incoming location update payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdateRequest {
    pub courier_id: String,
    pub lat: f64,
    pub lng: f64,
    pub time: DateTime<Utc>,
}

impl LocationUpdateRequest {
    /// Validate ranges before the update reaches the core. The core assumes
    /// valid input; everything suspect is rejected here.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.courier_id.trim().is_empty() {
            return Err("courierId must not be empty");
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err("lat must be within [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err("lng must be within [-180, 180]");
        }
        Ok(())
    }

    fn into_update(self) -> LocationUpdate {
        LocationUpdate {
            courier_id: CourierId::new(self.courier_id),
            lat: self.lat,
            lng: self.lng,
            time: self.time,
        }
    }
}

/// Courier sub-resource addressed by a GET request
#[derive(Debug, PartialEq)]
enum CourierQuery {
    Distance,
    Entrances,
}

/// Parse `/couriers/{id}/distance|entrances` paths
fn parse_courier_path(path: &str) -> Option<(&str, CourierQuery)> {
    let mut segments = path.trim_start_matches('/').splitn(3, '/');
    if segments.next()? != "couriers" {
        return None;
    }
    let courier_id = segments.next()?;
    if courier_id.is_empty() {
        return None;
    }
    match segments.next()? {
        "distance" => Some((courier_id, CourierQuery::Distance)),
        "entrances" => Some((courier_id, CourierQuery::Entrances)),
        _ => None,
    }
}

fn response(status: StatusCode, content_type: &str, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .body(Full::new(body.into()))
        .expect("static response should not fail")
}

fn json_error(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    response(
        status,
        "application/json",
        format!(r#"{{"error":"{message}"}}"#),
    )
}

/// Prometheus metric type
enum MetricType {
    Counter,
    Gauge,
}

impl MetricType {
    fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
        }
    }
}

/// Write a simple metric (counter or gauge) with service label
fn write_metric(
    output: &mut String,
    name: &str,
    help: &str,
    typ: MetricType,
    service: &str,
    val: u64,
) {
    let _ = writeln!(output, "# HELP {name} {help}");
    let _ = writeln!(output, "# TYPE {name} {}", typ.as_str());
    let _ = writeln!(output, "{name}{{service=\"{service}\"}} {val}");
}

/// Write a gauge metric with f64 value
fn write_gauge_f64(output: &mut String, name: &str, help: &str, service: &str, val: f64) {
    let _ = writeln!(output, "# HELP {name} {help}");
    let _ = writeln!(output, "# TYPE {name} gauge");
    let _ = writeln!(output, "{name}{{service=\"{service}\"}} {val:.6}");
}

/// Format metrics in Prometheus text exposition format
fn format_prometheus_metrics(
    metrics: &Metrics,
    courier_count: usize,
    service: &str,
) -> String {
    let summary = metrics.report(courier_count);
    let mut output = String::with_capacity(2048);

    write_metric(
        &mut output,
        "courier_updates_total",
        "Total location updates processed",
        MetricType::Counter,
        service,
        summary.updates_total,
    );
    write_gauge_f64(
        &mut output,
        "courier_updates_per_sec",
        "Location updates processed per second",
        service,
        summary.updates_per_sec,
    );
    write_metric(
        &mut output,
        "courier_update_latency_avg_us",
        "Average update processing latency in microseconds",
        MetricType::Gauge,
        service,
        summary.avg_latency_us,
    );
    write_metric(
        &mut output,
        "courier_update_latency_max_us",
        "Maximum update processing latency in microseconds",
        MetricType::Gauge,
        service,
        summary.max_latency_us,
    );
    write_metric(
        &mut output,
        "courier_entrances_recorded_total",
        "Store entrances recorded",
        MetricType::Counter,
        service,
        summary.entrances_recorded_total,
    );
    write_metric(
        &mut output,
        "courier_entrances_suppressed_total",
        "Store entrances suppressed by the cooldown window",
        MetricType::Counter,
        service,
        summary.entrances_suppressed_total,
    );
    write_gauge_f64(
        &mut output,
        "courier_distance_total_meters",
        "Total distance accumulated across all couriers",
        service,
        summary.distance_total_m,
    );
    write_metric(
        &mut output,
        "courier_active_couriers",
        "Couriers that have reported at least once",
        MetricType::Gauge,
        service,
        summary.courier_count as u64,
    );

    output
}

/// Handle one HTTP request
async fn handle_request(
    req: Request<hyper::body::Incoming>,
    dispatcher: Arc<LocationDispatcher>,
    metrics: Arc<Metrics>,
    site_id: Arc<String>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    // Method and path are cloned out so the POST arm can consume the body
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if method == Method::POST && path == "/locations" {
        let body = match req.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(error = %e, "location_body_read_failed");
                return Ok(json_error(StatusCode::BAD_REQUEST, "failed to read body"));
            }
        };

        let request: LocationUpdateRequest = match serde_json::from_slice(&body) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "location_body_parse_failed");
                return Ok(json_error(StatusCode::BAD_REQUEST, "malformed location update"));
            }
        };

        if let Err(reason) = request.validate() {
            warn!(reason = %reason, "location_update_rejected");
            return Ok(json_error(StatusCode::BAD_REQUEST, reason));
        }

        dispatcher.submit_location_update(&request.into_update());
        return Ok(response(StatusCode::ACCEPTED, "application/json", ""));
    }

    if method != Method::GET {
        return Ok(response(StatusCode::NOT_FOUND, "text/plain", "Not Found"));
    }

    match path.as_str() {
        "/health" => Ok(response(StatusCode::OK, "text/plain", "ok")),
        "/metrics" => {
            let body =
                format_prometheus_metrics(&metrics, dispatcher.courier_count(), &site_id);
            Ok(response(
                StatusCode::OK,
                "text/plain; version=0.0.4; charset=utf-8",
                body,
            ))
        }
        other => match parse_courier_path(other) {
            Some((courier_id, CourierQuery::Distance)) => {
                let meters = dispatcher.get_total_distance(courier_id);
                Ok(response(
                    StatusCode::OK,
                    "application/json",
                    format!("{meters}"),
                ))
            }
            Some((courier_id, CourierQuery::Entrances)) => {
                let entrances = dispatcher.get_entrances(courier_id);
                match serde_json::to_vec(&entrances) {
                    Ok(body) => Ok(response(StatusCode::OK, "application/json", body)),
                    Err(e) => {
                        error!(error = %e, "entrances_serialize_failed");
                        Ok(json_error(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "serialization failed",
                        ))
                    }
                }
            }
            None => Ok(response(StatusCode::NOT_FOUND, "text/plain", "Not Found")),
        },
    }
}

/// Start the HTTP API server
pub async fn start_api_server(
    port: u16,
    dispatcher: Arc<LocationDispatcher>,
    metrics: Arc<Metrics>,
    site_id: String,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    let site_id = Arc::new(site_id);

    info!(port = %port, service = %site_id, "api_server_started");

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, _addr)) => {
                        let io = TokioIo::new(stream);
                        let dispatcher = dispatcher.clone();
                        let metrics = metrics.clone();
                        let site_id = site_id.clone();

                        tokio::spawn(async move {
                            let service = service_fn(move |req| {
                                let dispatcher = dispatcher.clone();
                                let metrics = metrics.clone();
                                let site_id = site_id.clone();
                                async move {
                                    handle_request(req, dispatcher, metrics, site_id).await
                                }
                            });

                            if let Err(e) = http1::Builder::new()
                                .serve_connection(io, service)
                                .await
                            {
                                error!(error = %e, "api_http_error");
                            }
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "api_accept_error");
                    }
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("api_server_shutdown");
                    return Ok(());
                }
            }
        }
    }
}
