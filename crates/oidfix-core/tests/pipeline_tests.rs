use std::fs;
use std::net::{SocketAddr, TcpListener as StdListener};
use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::routing::get;
use oidfix_core::config::{FetchConfig, PipelineConfig, SourceConfig};
use oidfix_core::error::{PipelineError, RetrievalError};
use oidfix_core::source::{DocumentSource, FetchSource, FileSource};
use oidfix_core::{Pipeline, Stage};

const RECIPES: &str = include_str!("fixtures/recipes-api.json");
const LOGIN: &str =
    r#"{"paths": {"/login": {"post": {"tags": ["auth"], "operationId": "auth-login_user"}}}}"#;

/// An axum server on an ephemeral port, alive as long as this value is.
struct TestServer {
    addr: SocketAddr,
    _runtime: tokio::runtime::Runtime,
}

impl TestServer {
    fn start() -> Self {
        let router = Router::new()
            .route(
                "/api/v1/openapi.json",
                get(|| async { ([(header::CONTENT_TYPE, "application/json")], RECIPES) }),
            )
            .route(
                "/login.json",
                get(|| async { ([(header::CONTENT_TYPE, "application/json")], LOGIN) }),
            )
            .route(
                "/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route("/html", get(|| async { "<html><body>docs</body></html>" }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    LOGIN
                }),
            );

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .unwrap();
        let addr = listener.local_addr().unwrap();
        runtime.spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            addr,
            _runtime: runtime,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

fn url_config(url: String, output: PathBuf) -> PipelineConfig {
    PipelineConfig {
        source: SourceConfig::Url(url),
        output,
        fetch: FetchConfig { timeout_secs: 5 },
    }
}

#[test]
fn fetch_normalize_write_end_to_end() {
    let server = TestServer::start();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("openapi.json");

    let mut pipeline =
        Pipeline::from_config(&url_config(server.url("/login.json"), output.clone())).unwrap();
    let outcome = pipeline.run().unwrap();

    assert_eq!(pipeline.stage(), Stage::Done);
    assert_eq!(outcome.report.renames.len(), 1);

    let written = fs::read_to_string(&output).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed["paths"]["/login"]["post"]["operationId"], "login_user");

    insta::assert_snapshot!(written, @r#"
    {
      "paths": {
        "/login": {
          "post": {
            "tags": [
              "auth"
            ],
            "operationId": "login_user"
          }
        }
      }
    }
    "#);
}

#[test]
fn fetches_full_document() {
    let server = TestServer::start();
    let source = FetchSource::new(&server.url("/api/v1/openapi.json"), None).unwrap();

    let doc = source.load().unwrap();
    assert_eq!(doc.root()["info"]["title"], "Yumbook API");
    assert_eq!(doc.operation_count().unwrap(), 9);
}

#[test]
fn server_error_leaves_output_absent() {
    let server = TestServer::start();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("openapi.json");

    let mut pipeline =
        Pipeline::from_config(&url_config(server.url("/broken"), output.clone())).unwrap();
    let err = pipeline.run().unwrap_err();

    match err {
        PipelineError::Retrieval(RetrievalError::Status { status, .. }) => {
            assert_eq!(status.as_u16(), 500);
        }
        other => panic!("expected HTTP status error, got {other:?}"),
    }
    assert_eq!(pipeline.stage(), Stage::Failed);
    assert!(!output.exists());
}

#[test]
fn server_error_leaves_existing_output_untouched() {
    let server = TestServer::start();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("openapi.json");
    fs::write(&output, "previous").unwrap();

    let mut pipeline =
        Pipeline::from_config(&url_config(server.url("/broken"), output.clone())).unwrap();
    assert!(pipeline.run().is_err());

    assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
}

#[test]
fn slow_server_times_out() {
    let server = TestServer::start();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("openapi.json");
    let config = PipelineConfig {
        source: SourceConfig::Url(server.url("/slow")),
        output: output.clone(),
        fetch: FetchConfig { timeout_secs: 1 },
    };

    let mut pipeline = Pipeline::from_config(&config).unwrap();
    let err = pipeline.run().unwrap_err();

    match err {
        PipelineError::Retrieval(RetrievalError::Request { source, .. }) => {
            assert!(source.is_timeout(), "{source}");
        }
        other => panic!("expected request timeout, got {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn non_json_body_is_retrieval_error() {
    let server = TestServer::start();
    let source = FetchSource::new(&server.url("/html"), None).unwrap();

    let err = source.load().unwrap_err();
    assert!(matches!(err, RetrievalError::Body { .. }));
}

#[test]
fn connection_refused_is_retrieval_error() {
    let addr = StdListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let source = FetchSource::new(&format!("http://{addr}/openapi.json"), None).unwrap();

    let err = source.load().unwrap_err();
    assert!(matches!(err, RetrievalError::Request { .. }));
}

#[test]
fn file_source_rewrites_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("openapi.json");
    fs::write(&path, RECIPES).unwrap();

    let mut pipeline = Pipeline::new(Box::new(FileSource::new(&path)), &path);
    let outcome = pipeline.run().unwrap();
    assert_eq!(outcome.report.renames.len(), 5);

    let rewritten: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        rewritten["paths"]["/api/v1/users/me"]["patch"]["operationId"],
        "update_user_me"
    );
    assert_eq!(
        rewritten["paths"]["/api/v1/users/follow"]["post"]["operationId"],
        "admin-follow_user"
    );
}

#[test]
fn file_source_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("openapi.yaml");
    let output = dir.path().join("openapi.json");
    fs::write(
        &input,
        "paths:\n  /pets:\n    get:\n      tags: [pets]\n      operationId: pets-list_pets\n",
    )
    .unwrap();

    let config = PipelineConfig {
        source: SourceConfig::File(input),
        output: output.clone(),
        ..PipelineConfig::default()
    };
    Pipeline::from_config(&config).unwrap().run().unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["paths"]["/pets"]["get"]["operationId"], "list_pets");
}
