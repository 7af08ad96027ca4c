use axum::{
    extract::State,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::{optional_auth, require_auth, require_course_owner, require_instructor};
use crate::state::AppState;

/// The full HTTP surface with its global layers
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(course_routes(&state))
        .merge(enrollment_routes(&state))
        .merge(auth_routes(&state))
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }

    router.with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

fn course_routes(state: &AppState) -> Router<AppState> {
    use protected::{course_delete, course_post, course_put};
    use public::{course_get, courses_get, instructor_courses_get};

    let instructor_gate = ServiceBuilder::new()
        .layer(from_fn_with_state(state.clone(), require_auth))
        .layer(from_fn(require_instructor));
    let owner_gate = ServiceBuilder::new()
        .layer(from_fn_with_state(state.clone(), require_auth))
        .layer(from_fn(require_instructor))
        .layer(from_fn_with_state(state.clone(), require_course_owner));

    Router::new()
        .route(
            "/api/courses",
            get(courses_get).merge(post(course_post).route_layer(instructor_gate)),
        )
        .route(
            "/api/courses/:id",
            get(course_get).merge(put(course_put).delete(course_delete).route_layer(owner_gate)),
        )
        .route("/api/courses/instructor/:instructor_id", get(instructor_courses_get))
}

fn enrollment_routes(state: &AppState) -> Router<AppState> {
    use protected::{course_roster_get, enrollment_delete, enrollment_post, enrollments_me_get, progress_put};

    let owner_gate = ServiceBuilder::new()
        .layer(from_fn_with_state(state.clone(), require_auth))
        .layer(from_fn(require_instructor))
        .layer(from_fn_with_state(state.clone(), require_course_owner));

    let roster = Router::new().route("/api/enrollments/course/:id", get(course_roster_get).route_layer(owner_gate));

    Router::new()
        .route("/api/enrollments", post(enrollment_post))
        .route("/api/enrollments/me", get(enrollments_me_get))
        .route("/api/enrollments/:enrollment_id", delete(enrollment_delete))
        .route("/api/enrollments/:enrollment_id/progress", put(progress_put))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
        .merge(roster)
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/api/auth/whoami",
        get(public::whoami_get).route_layer(from_fn_with_state(state.clone(), optional_auth)),
    )
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "The server is working",
        "name": "Coursemart API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "courses": "/api/courses[/:id] (public reads, instructor writes)",
            "instructor": "/api/courses/instructor/:instructorId (public)",
            "enrollments": "/api/enrollments (authenticated)",
            "whoami": "/api/auth/whoami (optional auth)",
            "health": "/health"
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Store health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": "unavailable"
                })),
            )
        }
    }
}
