use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fhir::{ConversionFailure, Converter, ConverterConfig, FhirError, Resource, ResourceKind};

/// Application state shared across REST API handlers
#[derive(Clone)]
struct AppState {
    converter: Arc<Converter>,
}

#[derive(Serialize)]
struct HealthRes {
    ok: bool,
    message: String,
}

/// FHIR `OperationOutcome` returned for rejected records.
#[derive(Debug, Serialize)]
struct OperationOutcome {
    #[serde(rename = "resourceType")]
    resource_type: &'static str,
    issue: Vec<OutcomeIssue>,
}

#[derive(Debug, Serialize)]
struct OutcomeIssue {
    severity: &'static str,
    code: &'static str,
    diagnostics: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    expression: Vec<String>,
}

impl OperationOutcome {
    fn single(code: &'static str, diagnostics: String) -> Self {
        Self {
            resource_type: "OperationOutcome",
            issue: vec![OutcomeIssue {
                severity: "error",
                code,
                diagnostics,
                expression: vec![],
            }],
        }
    }

    fn from_failure(failure: &ConversionFailure) -> Self {
        let issue = failure
            .causes()
            .iter()
            .map(|cause| OutcomeIssue {
                severity: "error",
                code: "invalid",
                diagnostics: cause.to_string(),
                expression: match cause {
                    FhirError::FieldValidation { field, .. } => vec![field.clone()],
                    FhirError::Normalization { path, .. } => vec![path.clone()],
                    FhirError::InvariantViolation(_) => vec![],
                },
            })
            .collect();
        Self {
            resource_type: "OperationOutcome",
            issue,
        }
    }
}

type Rejection = (StatusCode, Json<OperationOutcome>);

/// Main entry point for the intake conversion service
///
/// Serves the converter over HTTP. The service holds no state between requests and never
/// stores or forwards resources.
///
/// # Environment Variables
/// - `INTAKE_REST_ADDR`: server address (default: "0.0.0.0:3000")
/// - `INTAKE_MIN_BIRTH_YEAR`: earliest accepted birth year (default: 1900)
/// - `INTAKE_MAX_BIRTH_YEAR`: latest accepted birth year (default: current year)
/// - `INTAKE_ASSIGN_IDS`: assign a random `id` to each resource (default: false)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the converter configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intake_run=info".parse()?)
                .add_directive("fhir=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("INTAKE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let config = ConverterConfig::from_env_values(
        std::env::var("INTAKE_MIN_BIRTH_YEAR").ok(),
        std::env::var("INTAKE_MAX_BIRTH_YEAR").ok(),
        std::env::var("INTAKE_ASSIGN_IDS").ok(),
    )?;
    tracing::info!(?config, "converter configured");

    let state = AppState {
        converter: Arc::new(Converter::new(config)),
    };

    tracing::info!("++ Starting intake REST on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/:kind/$convert", post(convert_resource))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "intake conversion service is alive".into(),
    })
}

/// Convert an intake record into a resource of the kind named in the path
///
/// # Errors
/// Returns `400 Bad Request` if the path names an unsupported resource kind, and
/// `422 Unprocessable Entity` with an `OperationOutcome` if the record is rejected.
async fn convert_resource(
    State(state): State<AppState>,
    AxumPath(kind): AxumPath<String>,
    Json(raw): Json<serde_json::Value>,
) -> Result<Json<Resource>, Rejection> {
    let kind: ResourceKind = kind.parse().map_err(|e: fhir::UnknownResourceKind| {
        (
            StatusCode::BAD_REQUEST,
            Json(OperationOutcome::single("not-supported", e.to_string())),
        )
    })?;

    match state.converter.convert(kind, &raw) {
        Ok(resource) => Ok(Json(resource)),
        Err(failure) => {
            tracing::info!(%kind, causes = failure.causes().len(), "conversion rejected");
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(OperationOutcome::from_failure(&failure)),
            ))
        }
    }
}
