use actix_web::{http::header, web, HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use ostrichdb_core::{Record, SearchOptions};

use crate::config::TestServerConfig;
use crate::store::{render_records, Store, StoreError};

/// Shared application state
pub struct AppState {
    pub store: Arc<Mutex<Store>>,
    pub config: Arc<TestServerConfig>,
}

impl AppState {
    pub fn new(config: TestServerConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::new())),
            config: Arc::new(config),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
struct NamedEntry {
    name: String,
}

#[derive(Serialize)]
struct ProjectList {
    projects: Vec<NamedEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecordQuery {
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub value: String,
}

type ClusterPath = web::Path<(String, String, String)>;
type RecordPath = web::Path<(String, String, String, String)>;

fn store_error(err: StoreError) -> HttpResponse {
    let body = ErrorResponse {
        error: err.to_string(),
    };
    match err {
        StoreError::NotFound(_) => HttpResponse::NotFound().json(body),
        StoreError::AlreadyExists(_) => HttpResponse::Conflict().json(body),
        StoreError::Invalid(_) => HttpResponse::BadRequest().json(body),
    }
}

/// Rejects the request unless it carries the configured bearer token
fn authorize(req: &HttpRequest, state: &AppState) -> Result<(), HttpResponse> {
    let Some(expected) = state.config.token.as_deref() else {
        return Ok(());
    };
    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented == Some(expected) {
        Ok(())
    } else {
        tracing::debug!("Rejected request with missing or wrong token");
        Err(HttpResponse::Unauthorized().json(ErrorResponse {
            error: "invalid or missing bearer token".to_string(),
        }))
    }
}

fn text(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(body)
}

fn lines(items: Vec<String>) -> HttpResponse {
    let mut body = items.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    text(body)
}

/// Health check
/// GET /health
pub async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

/// List projects as `{"projects":[{"name":...}]}`
/// GET /api/v1/projects
#[tracing::instrument(skip(state, req))]
pub async fn list_projects(state: web::Data<AppState>, req: HttpRequest) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let store = state.store.lock().await;
    let projects = store
        .list_projects()
        .into_iter()
        .map(|name| NamedEntry { name })
        .collect();
    Ok(HttpResponse::Ok().json(ProjectList { projects }))
}

/// POST /api/v1/projects/{project}
#[tracing::instrument(skip(state, req))]
pub async fn create_project(
    path: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let project = path.into_inner();
    let mut store = state.store.lock().await;
    Ok(match store.create_project(&project) {
        Ok(()) => {
            tracing::debug!(project = %project, "Created project");
            HttpResponse::Created().finish()
        }
        Err(e) => store_error(e),
    })
}

/// DELETE /api/v1/projects/{project}
#[tracing::instrument(skip(state, req))]
pub async fn delete_project(
    path: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let mut store = state.store.lock().await;
    Ok(match store.delete_project(&path.into_inner()) {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => store_error(e),
    })
}

/// GET /api/v1/projects/{project}/collections
#[tracing::instrument(skip(state, req))]
pub async fn list_collections(
    path: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let store = state.store.lock().await;
    Ok(match store.list_collections(&path.into_inner()) {
        Ok(names) => lines(names),
        Err(e) => store_error(e),
    })
}

/// POST /api/v1/projects/{project}/collections/{collection}
#[tracing::instrument(skip(state, req))]
pub async fn create_collection(
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let (project, collection) = path.into_inner();
    let mut store = state.store.lock().await;
    Ok(match store.create_collection(&project, &collection) {
        Ok(()) => HttpResponse::Created().finish(),
        Err(e) => store_error(e),
    })
}

/// GET /api/v1/projects/{project}/collections/{collection}
#[tracing::instrument(skip(state, req))]
pub async fn get_collection(
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let (project, collection) = path.into_inner();
    let store = state.store.lock().await;
    Ok(match store.render_collection(&project, &collection) {
        Ok(body) => text(body),
        Err(e) => store_error(e),
    })
}

/// DELETE /api/v1/projects/{project}/collections/{collection}
#[tracing::instrument(skip(state, req))]
pub async fn delete_collection(
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let (project, collection) = path.into_inner();
    let mut store = state.store.lock().await;
    Ok(match store.delete_collection(&project, &collection) {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => store_error(e),
    })
}

/// GET /api/v1/projects/{project}/collections/{collection}/clusters
#[tracing::instrument(skip(state, req))]
pub async fn list_clusters(
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let (project, collection) = path.into_inner();
    let store = state.store.lock().await;
    Ok(match store.list_clusters(&project, &collection) {
        Ok(names) => lines(names),
        Err(e) => store_error(e),
    })
}

/// POST .../collections/{collection}/clusters/{cluster}
#[tracing::instrument(skip(state, req))]
pub async fn create_cluster(
    path: ClusterPath,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let (project, collection, cluster) = path.into_inner();
    let mut store = state.store.lock().await;
    Ok(match store.create_cluster(&project, &collection, &cluster) {
        Ok(()) => HttpResponse::Created().finish(),
        Err(e) => store_error(e),
    })
}

/// GET .../collections/{collection}/clusters/{cluster}
#[tracing::instrument(skip(state, req))]
pub async fn get_cluster(
    path: ClusterPath,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let (project, collection, cluster) = path.into_inner();
    let store = state.store.lock().await;
    Ok(match store.render_cluster(&project, &collection, &cluster) {
        Ok(body) => text(body),
        Err(e) => store_error(e),
    })
}

/// DELETE .../collections/{collection}/clusters/{cluster}
#[tracing::instrument(skip(state, req))]
pub async fn delete_cluster(
    path: ClusterPath,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let (project, collection, cluster) = path.into_inner();
    let mut store = state.store.lock().await;
    Ok(match store.delete_cluster(&project, &collection, &cluster) {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => store_error(e),
    })
}

/// List or search records; one `<name> :<TYPE>: <value>` line per record
/// GET .../clusters/{cluster}/records[?query]
#[tracing::instrument(skip(state, req))]
pub async fn list_records(
    path: ClusterPath,
    query: web::Query<SearchOptions>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let (project, collection, cluster) = path.into_inner();
    let store = state.store.lock().await;
    Ok(
        match store.search_records(&project, &collection, &cluster, &query) {
            Ok(found) => text(render_records(found.into_iter())),
            Err(e) => store_error(e),
        },
    )
}

/// POST .../clusters/{cluster}/records/{record}?type=&value=
#[tracing::instrument(skip(state, req))]
pub async fn create_record(
    path: RecordPath,
    query: web::Query<CreateRecordQuery>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let (project, collection, cluster, name) = path.into_inner();
    let CreateRecordQuery { record_type, value } = query.into_inner();
    let record = Record::new(name, record_type, value);

    let mut store = state.store.lock().await;
    Ok(
        match store.create_record(&project, &collection, &cluster, record) {
            Ok(id) => {
                tracing::debug!(id, "Created record");
                HttpResponse::Created().finish()
            }
            Err(e) => store_error(e),
        },
    )
}

/// GET .../clusters/{cluster}/records/{name-or-id}
#[tracing::instrument(skip(state, req))]
pub async fn get_record(
    path: RecordPath,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let (project, collection, cluster, identifier) = path.into_inner();
    let store = state.store.lock().await;
    Ok(
        match store.get_record(&project, &collection, &cluster, &identifier) {
            Ok(stored) => text(stored.record.to_string()),
            Err(e) => store_error(e),
        },
    )
}

/// DELETE .../clusters/{cluster}/records/{record}
#[tracing::instrument(skip(state, req))]
pub async fn delete_record(
    path: RecordPath,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = authorize(&req, &state) {
        return Ok(resp);
    }
    let (project, collection, cluster, name) = path.into_inner();
    let mut store = state.store.lock().await;
    Ok(
        match store.delete_record(&project, &collection, &cluster, &name) {
            Ok(()) => HttpResponse::Ok().finish(),
            Err(e) => store_error(e),
        },
    )
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/projects")
            .route("", web::get().to(list_projects))
            .route("/{project}", web::post().to(create_project))
            .route("/{project}", web::delete().to(delete_project))
            .route("/{project}/collections", web::get().to(list_collections))
            .route(
                "/{project}/collections/{collection}",
                web::post().to(create_collection),
            )
            .route(
                "/{project}/collections/{collection}",
                web::get().to(get_collection),
            )
            .route(
                "/{project}/collections/{collection}",
                web::delete().to(delete_collection),
            )
            .route(
                "/{project}/collections/{collection}/clusters",
                web::get().to(list_clusters),
            )
            .route(
                "/{project}/collections/{collection}/clusters/{cluster}",
                web::post().to(create_cluster),
            )
            .route(
                "/{project}/collections/{collection}/clusters/{cluster}",
                web::get().to(get_cluster),
            )
            .route(
                "/{project}/collections/{collection}/clusters/{cluster}",
                web::delete().to(delete_cluster),
            )
            .route(
                "/{project}/collections/{collection}/clusters/{cluster}/records",
                web::get().to(list_records),
            )
            .route(
                "/{project}/collections/{collection}/clusters/{cluster}/records/{record}",
                web::post().to(create_record),
            )
            .route(
                "/{project}/collections/{collection}/clusters/{cluster}/records/{record}",
                web::get().to(get_record),
            )
            .route(
                "/{project}/collections/{collection}/clusters/{cluster}/records/{record}",
                web::delete().to(delete_record),
            ),
    )
    .route("/health", web::get().to(health));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    async fn body_text(resp: actix_web::dev::ServiceResponse) -> String {
        let bytes = test::read_body(resp).await;
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn state(config: TestServerConfig) -> web::Data<AppState> {
        web::Data::new(AppState::new(config))
    }

    #[actix_web::test]
    async fn test_project_list_is_json() {
        let app = test::init_service(
            App::new()
                .app_data(state(TestServerConfig::default()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/projects/alpha")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/api/v1/projects").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, r#"{"projects":[{"name":"alpha"}]}"#);
    }

    #[actix_web::test]
    async fn test_duplicate_project_conflicts() {
        let app = test::init_service(
            App::new()
                .app_data(state(TestServerConfig::default()))
                .configure(configure),
        )
        .await;

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let req = test::TestRequest::post()
                .uri("/api/v1/projects/dup")
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }
    }

    #[actix_web::test]
    async fn test_record_lifecycle_with_encoded_names() {
        let app = test::init_service(
            App::new()
                .app_data(state(TestServerConfig::default()))
                .configure(configure),
        )
        .await;

        for uri in [
            "/api/v1/projects/my%20project",
            "/api/v1/projects/my%20project/collections/caf%C3%A9",
            "/api/v1/projects/my%20project/collections/caf%C3%A9/clusters/k",
            "/api/v1/projects/my%20project/collections/caf%C3%A9/clusters/k/records/first%20name?type=string&value=Ada+L",
        ] {
            let req = test::TestRequest::post().uri(uri).to_request();
            assert_eq!(
                test::call_service(&app, req).await.status(),
                StatusCode::CREATED,
                "POST {uri}"
            );
        }

        let req = test::TestRequest::get()
            .uri("/api/v1/projects/my%20project/collections/caf%C3%A9/clusters/k/records/first%20name")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, "first name :STRING: Ada L");

        let req = test::TestRequest::get()
            .uri("/api/v1/projects/my%20project/collections")
            .to_request();
        assert_eq!(body_text(test::call_service(&app, req).await).await, "café\n");
    }

    #[actix_web::test]
    async fn test_unknown_record_type_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(state(TestServerConfig::default()))
                .configure(configure),
        )
        .await;

        for uri in [
            "/api/v1/projects/p",
            "/api/v1/projects/p/collections/c",
            "/api/v1/projects/p/collections/c/clusters/k",
        ] {
            let req = test::TestRequest::post().uri(uri).to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::post()
            .uri("/api/v1/projects/p/collections/c/clusters/k/records/r?type=BLOB&value=1")
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn test_token_required_when_configured() {
        let app = test::init_service(
            App::new()
                .app_data(state(TestServerConfig::default().with_token("secret")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/projects").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let req = test::TestRequest::get()
            .uri("/api/v1/projects")
            .insert_header((header::AUTHORIZATION, "Bearer secret"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        // Health stays open
        let req = test::TestRequest::get().uri("/health").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_missing_record_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(state(TestServerConfig::default()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/projects/p/collections/c/clusters/k/records/nope")
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }
}
