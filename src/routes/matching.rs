use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::{ErrorResponse, HealthResponse};
use crate::reconciler::Reconciler;
use crate::services::HealthCheck;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<Reconciler>,
    pub database: Arc<dyn HealthCheck>,
    /// Held for the duration of a pass; overlapping triggers are rejected
    pub run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(reconciler: Arc<Reconciler>, database: Arc<dyn HealthCheck>) -> Self {
        Self {
            reconciler,
            database,
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Configure all matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matching/run", web::post().to(run_matching));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.database.is_healthy().await { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Run a matching pass
///
/// POST /api/v1/matching/run
///
/// Takes no body. Responds with the run summary; a partial persistence
/// failure is still a 200 with `"status": "partial_success"`.
async fn run_matching(state: web::Data<AppState>) -> impl Responder {
    let Ok(_guard) = state.run_lock.try_lock() else {
        tracing::info!("Rejecting matching trigger, a pass is already running");
        return HttpResponse::Conflict().json(ErrorResponse {
            error: "Run in progress".to_string(),
            message: "A matching pass is already running".to_string(),
            status_code: 409,
        });
    };

    match state.reconciler.run(chrono::Utc::now()).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => {
            tracing::error!("Matching pass failed: {}", e);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "Matching pass failed".to_string(),
                message: e.to_string(),
                status_code: 503,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Matcher, Throttle};
    use crate::models::{RawJob, RunSummary, UserPreference, UserStatus};
    use crate::services::{FailureInjection, InMemoryStore};
    use actix_web::{test, App};
    use std::collections::BTreeSet;

    fn create_state(store: Arc<InMemoryStore>) -> AppState {
        let reconciler = Reconciler::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            Matcher::default(),
            Throttle::default(),
        );
        AppState::new(Arc::new(reconciler), store)
    }

    fn create_store() -> InMemoryStore {
        let user = UserPreference {
            user_id: "u1".to_string(),
            status: UserStatus::NoExperiencePosition,
            min_experience: None,
            max_experience: None,
            degree: None,
            management_interest: None,
            management_level: BTreeSet::new(),
            domains: BTreeSet::new(),
            locations: BTreeSet::new(),
        };
        let job = RawJob {
            title: "Junior QA".to_string(),
            source_url: "https://jobs.example/qa".to_string(),
            experience_level: Some("0-1".to_string()),
            ..RawJob::default()
        };
        InMemoryStore::new(vec![user], vec![job])
    }

    #[actix_web::test]
    async fn test_run_endpoint_returns_summary() {
        let state = create_state(Arc::new(create_store()));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/v1/matching/run").to_request();
        let summary: RunSummary = test::call_and_read_body_json(&app, req).await;

        assert_eq!(summary.candidates_evaluated, 1);
        assert_eq!(summary.notifications_sent, 1);
        assert!(!summary.is_partial());
    }

    #[actix_web::test]
    async fn test_run_endpoint_reports_source_failure() {
        let store = Arc::new(create_store());
        store
            .inject_failures(FailureInjection {
                jobs_unavailable: true,
                ..FailureInjection::default()
            })
            .await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_state(store.clone())))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/v1/matching/run").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 503);
        assert!(store.history().await.is_empty());
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_state(Arc::new(create_store()))))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let health: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(health.status, "healthy");
    }
}
