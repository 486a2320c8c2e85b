use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{PredictionError, PredictionService};
use crate::models::{
    BatchPredictRequest, BatchPredictionItem, BuildingRecord, BuildingRequest, ErrorResponse,
    HealthResponse, ModelVersions, PredictResponse, Target,
};
use std::sync::Arc;

/// Error message for a batch request without a `buildings` array
pub const MISSING_BUILDINGS: &str = "Missing 'buildings' key in request";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
}

/// Configure all prediction routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/predict", web::post().to(predict))
        .route("/predict_all", web::post().to(predict_all));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let models = state.service.models();

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        models: ModelVersions {
            heating: models.version(Target::Heating).to_string(),
            cooling: models.version(Target::Cooling).to_string(),
        },
    })
}

/// Predict loads for a single building
///
/// POST /predict
///
/// Request body:
/// ```json
/// {
///   "Building_Type": "Office",
///   "Building_Shape": "Rectangle",
///   "Orientation": 180,
///   "Building_Height": 9,
///   "Building_Stories": 3,
///   "Wall_Area": 200,
///   "Window_Area": 40,
///   "Roof_Area": 120,
///   "energy_code": "A",
///   "hvac_category": "Central"
/// }
/// ```
async fn predict(
    state: web::Data<AppState>,
    req: web::Json<BuildingRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for predict request: {}", errors);
        return validation_failed(errors.to_string());
    }

    let record = BuildingRecord::from(req.into_inner());

    match state.service.predict_one(&record) {
        Ok(prediction) => HttpResponse::Ok().json(PredictResponse::from(prediction)),
        Err(e) => prediction_failed(&e),
    }
}

/// Predict loads for many buildings in one pass
///
/// POST /predict_all
///
/// Request body:
/// ```json
/// { "buildings": [ { "id": "b1", "Building_Type": "Office", ... } ] }
/// ```
///
/// Results come back in input order; a building without `id` is identified by
/// its zero-based position.
async fn predict_all(
    state: web::Data<AppState>,
    req: web::Json<BatchPredictRequest>,
) -> impl Responder {
    let buildings = match req.into_inner().buildings {
        Some(buildings) => buildings,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: MISSING_BUILDINGS.to_string(),
                message: "Request body must contain a 'buildings' array".to_string(),
                status_code: 400,
            });
        }
    };

    for (row, building) in buildings.iter().enumerate() {
        if let Err(errors) = building.validate() {
            tracing::info!("Validation failed for building {} in batch: {}", row, errors);
            return validation_failed(format!("row {}: {}", row, errors));
        }
    }

    let records: Vec<BuildingRecord> = buildings.into_iter().map(BuildingRecord::from).collect();

    tracing::debug!("Predicting loads for {} buildings", records.len());

    match state.service.predict_batch(&records) {
        Ok(results) => {
            let items: Vec<BatchPredictionItem> =
                results.into_iter().map(BatchPredictionItem::from).collect();
            HttpResponse::Ok().json(items)
        }
        Err(e) => prediction_failed(&e),
    }
}

fn validation_failed(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message,
        status_code: 400,
    })
}

/// Translate a pipeline error into an HTTP error response
fn prediction_failed(err: &PredictionError) -> HttpResponse {
    let body = |status_code: u16| ErrorResponse {
        error: err.kind().to_string(),
        message: err.to_string(),
        status_code,
    };

    if err.is_client_error() {
        tracing::info!("Rejected prediction request: {}", err);
        HttpResponse::BadRequest().json(body(400))
    } else {
        tracing::error!("Prediction failed: {}", err);
        HttpResponse::InternalServerError().json(body(500))
    }
}
