use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::{analytics, features, health, predict};
use crate::config::{AppConfig, ServerConfig};
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Engine endpoints without the operational layers
pub fn create_api_routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .route("/features", get(features::list_feature_importances))
        .route("/features/schema", get(features::feature_schema))
        .route("/recommendations", get(features::get_recommendation))
        .route("/analytics/correlation", get(analytics::get_correlation))
        .route("/analytics/distributions", get(analytics::get_distributions))
        .route("/analytics/quality-dist", get(analytics::get_quality_distribution))
        .route("/predict", post(predict::predict))
        .route(
            "/predict/batch",
            post(predict::predict_batch)
                .layer(DefaultBodyLimit::max(config.batch.max_upload_bytes)),
        )
}

/// Create the full router with application state
pub fn create_router(
    state: AppState,
    config: &AppConfig,
    metrics: Option<PrometheusMetrics>,
) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .merge(create_api_routes(config))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(metrics_middleware))
                .layer(middleware::from_fn(logging_middleware)),
        );

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    if let Some(dir) = &config.server.static_dir {
        info!(dir = %dir.display(), "Serving static files");
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.layer(cors_layer(&config.server))
}

/// Any origin when the list is empty or contains `*`
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if config.cors_origins.is_empty() || config.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::BatchConfig;
    use crate::domain::dataset::fixtures::sample_dataset;
    use crate::domain::model::StubModel;
    use crate::domain::DistributionPolicy;
    use crate::infrastructure::model::fixtures::forest;
    use crate::infrastructure::services::{Engine, QualityService, ServiceState};

    const BOUNDARY: &str = "X-WINE-BOUNDARY";

    fn reference_body() -> Value {
        json!({
            "fixed_acidity": 7.4,
            "volatile_acidity": 0.7,
            "citric_acid": 0.0,
            "residual_sugar": 1.9,
            "chlorides": 0.076,
            "free_sulfur_dioxide": 11.0,
            "total_sulfur_dioxide": 34.0,
            "density": 0.9978,
            "pH": 3.51,
            "sulphates": 0.56,
            "alcohol": 9.4
        })
    }

    fn service(model: Arc<StubModel>) -> Arc<QualityService> {
        Arc::new(QualityService::ready(Engine::new(
            model,
            sample_dataset(),
            DistributionPolicy::default(),
            BatchConfig::default(),
        )))
    }

    fn app(service: Arc<QualityService>) -> Router {
        create_router(AppState::new(service), &AppConfig::default(), None)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload_request(field: &str, table: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"wines.csv\"\r\n\
Content-Type: text/csv\r\n\r\n{table}\r\n--{b}--\r\n",
            b = BOUNDARY,
            field = field,
            table = table
        );

        Request::builder()
            .method("POST")
            .uri("/predict/batch")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_reference_vector_scores_in_range() {
        let engine = Engine::new(
            Arc::new(forest()),
            sample_dataset(),
            DistributionPolicy::default(),
            BatchConfig::default(),
        );
        let app = app(Arc::new(QualityService::ready(engine)));

        let (status, body) = send(app, json_request("/predict", &reference_body())).await;

        assert_eq!(status, StatusCode::OK);
        let quality = body["quality"].as_f64().unwrap();
        assert!((3.0..=8.0).contains(&quality));
        assert!(body.get("features").is_none());
    }

    #[tokio::test]
    async fn test_predict_echo_and_coercion() {
        let mut body = reference_body();
        body["pH"] = json!("3.51");

        let (status, body) = send(
            app(service(Arc::new(StubModel::new()))),
            json_request("/predict?echo=true", &body),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["features"]["pH"], 3.51);
    }

    #[tokio::test]
    async fn test_predict_rejects_bad_bodies() {
        let (status, body) = send(
            app(service(Arc::new(StubModel::new()))),
            json_request("/predict", &json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().starts_with("Missing required fields"));

        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(service(Arc::new(StubModel::new()))), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let mut bad = reference_body();
        bad["alcohol"] = json!([1]);
        let (status, _) = send(
            app(service(Arc::new(StubModel::new()))),
            json_request("/predict", &bad),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_uninitialized_service_is_unavailable() {
        let app = app(Arc::new(QualityService::uninitialized()));

        let response = app
            .clone()
            .oneshot(get_request("/features"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().contains_key(header::RETRY_AFTER));

        let (status, body) = send(app.clone(), get_request("/ready")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["state"], "uninitialized");

        let (status, body) = send(app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn test_ready_reports_state_without_serving() {
        let service = service(Arc::new(StubModel::new()));

        let (status, body) = send(app(Arc::clone(&service)), get_request("/ready")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "ready");
        assert_eq!(service.state(), ServiceState::Ready);
    }

    #[tokio::test]
    async fn test_correlation_before_any_prediction() {
        let (status, body) = send(
            app(service(Arc::new(StubModel::new()))),
            get_request("/analytics/correlation"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["features"].as_array().unwrap().len(), 11);

        let nodes = body["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 121);
        assert!(nodes.iter().all(|n| n["value"].is_number()));
    }

    #[tokio::test]
    async fn test_analytics_payloads() {
        let app = app(service(Arc::new(StubModel::new())));

        let (status, body) = send(app.clone(), get_request("/analytics/distributions")).await;
        assert_eq!(status, StatusCode::OK);
        let alcohol = &body["alcohol"];
        assert_eq!(alcohol["bins"].as_array().unwrap().len(), 31);
        assert_eq!(alcohol["counts"].as_array().unwrap().len(), 30);
        assert_eq!(alcohol["kde_y"].as_array().unwrap().len(), 100);

        let (status, body) = send(app.clone(), get_request("/analytics/quality-dist")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0], json!({"quality": 5, "count": 7}));

        let (status, body) = send(app.clone(), get_request("/recommendations")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["primary_driver"], "alcohol");

        let (status, body) = send(app, get_request("/features/schema")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 11);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_feature_requests_rank_once() {
        let model = Arc::new(StubModel::new().with_importance_delay(std::time::Duration::from_millis(50)));
        let app = app(service(Arc::clone(&model)));

        let (first, second) = tokio::join!(
            send(app.clone(), get_request("/features")),
            send(app.clone(), get_request("/features")),
        );

        assert_eq!(first.0, StatusCode::OK);
        assert_eq!(first.1, second.1);
        assert_eq!(first.1[0]["feature"], "alcohol");
        assert_eq!(model.importance_calls(), 1);
    }

    #[tokio::test]
    async fn test_batch_upload() {
        let table = "fixed acidity,volatile acidity,citric acid,residual sugar,chlorides,\
free sulfur dioxide,total sulfur dioxide,density,pH,sulphates,alcohol\n\
7.4,0.7,0,1.9,0.076,11,34,0.9978,3.51,0.56,9.4\n\
7.4,oops,0,1.9,0.076,11,34,0.9978,3.51,0.56,9.4\n";

        let (status, body) = send(
            app(service(Arc::new(StubModel::new()))),
            upload_request("file", table),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["row_index"], 0);
        assert_eq!(rows[0]["volatile acidity"], 0.7);
        assert!(rows[0]["predicted_quality"].is_number());
        assert!(rows[1]["predicted_quality"].is_null());
        assert!(rows[1]["error"].is_string());
    }

    #[tokio::test]
    async fn test_batch_whole_request_errors() {
        let (status, body) = send(
            app(service(Arc::new(StubModel::new()))),
            upload_request("file", "alcohol\n9.4\n"),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("Missing required columns"));

        let request = Request::builder()
            .method("POST")
            .uri("/predict/batch")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
                b = BOUNDARY
            )))
            .unwrap();
        let (status, _) = send(app(service(Arc::new(StubModel::new()))), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let request = Request::builder()
            .uri("/live")
            .header("x-request-id", "req-42")
            .body(Body::empty())
            .unwrap();

        let response = app(Arc::new(QualityService::uninitialized()))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-request-id"], "req-42");
    }

    #[tokio::test]
    async fn test_cors_allows_only_listed_origins() {
        let mut config = AppConfig::default();
        config.server.cors_origins = vec![
            "http://localhost:3000".to_string(),
            "bad\norigin".to_string(),
        ];
        let router = create_router(
            AppState::new(Arc::new(QualityService::uninitialized())),
            &config,
            None,
        );

        let request = |origin: &str| {
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, origin)
                .body(Body::empty())
                .unwrap()
        };

        let allowed = router
            .clone()
            .oneshot(request("http://localhost:3000"))
            .await
            .unwrap();
        assert_eq!(
            allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );

        let denied = router.oneshot(request("http://evil.test")).await.unwrap();
        assert!(denied
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_cors_wildcard_allows_any_origin() {
        let response = app(Arc::new(QualityService::uninitialized()))
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://anywhere.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
