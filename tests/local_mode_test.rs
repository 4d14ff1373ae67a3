//! Local mode: direct fetch plus LLM inference, without the middleware

use easyapigis::collaborator::{DirectFetcher, LlmSchemaInferrer, SampleFetcher};
use easyapigis::llm::{LlmError, MockLLMClient, MockResponse};
use easyapigis::pipeline::{PipelineController, PipelineState};
use easyapigis::schema::{generate_ddl, Srid};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_REPLY: &str = r#"Here is the schema:
```json
{
  "geometry_type": "POINT",
  "srid": "EPSG:4674",
  "fields": [
    {"original_name": "Nome da Escola", "target_name": "nome_escola", "type": "TEXT"},
    {"original_name": "alunos", "target_name": "alunos", "type": "INTEGER"}
  ]
}
```"#;

async fn source_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/escolas.geojson"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"Nome da Escola": "EMEF Centro", "alunos": 420}},
                {"type": "Feature", "properties": {"Nome da Escola": "EMEF Norte", "alunos": 210}}
            ]
        })))
        .mount(&server)
        .await;
    server
}

fn local_controller(llm: Arc<MockLLMClient>, max_sample_size: usize) -> PipelineController {
    let fetcher = DirectFetcher::new(Duration::from_secs(5)).unwrap();
    let inferrer = LlmSchemaInferrer::new(llm, max_sample_size);
    PipelineController::new(Arc::new(fetcher), Arc::new(inferrer))
}

#[tokio::test]
async fn test_local_pipeline_infers_schema() {
    let server = source_server().await;
    let llm = Arc::new(MockLLMClient::new());
    llm.add_response(MockResponse::text(MODEL_REPLY));

    let controller = local_controller(llm.clone(), 512_000);
    let url = format!("{}/escolas.geojson", server.uri());
    let snapshot = controller.process(&url).await.unwrap();

    assert_eq!(snapshot.state, PipelineState::Done);
    let schema = snapshot.schema.unwrap();
    assert_eq!(schema.srid, Srid::Text("EPSG:4674".to_string()));
    assert_eq!(schema.fields.len(), 2);

    let ddl = generate_ddl("Escolas Municipais", &schema);
    assert!(ddl.contains("layers.escolas_municipais"));
    assert!(ddl.contains("alunos INTEGER"));
    assert!(ddl.contains("geom GEOMETRY(POINT, 4674)"));

    let requests = llm.received_requests();
    assert_eq!(requests.len(), 1);
    let prompt = &requests[0].messages[1].content;
    assert!(prompt.contains("EMEF Centro"));
    assert!(!prompt.contains("EMEF Norte"));
}

#[tokio::test]
async fn test_local_pipeline_model_failure() {
    let server = source_server().await;
    let llm = Arc::new(MockLLMClient::new());
    llm.add_response(MockResponse::error(LlmError::ApiError {
        message: "rate limited".to_string(),
        status_code: Some(429),
    }));

    let controller = local_controller(llm, 512_000);
    let url = format!("{}/escolas.geojson", server.uri());
    let snapshot = controller.process(&url).await.unwrap();

    assert_eq!(snapshot.state, PipelineState::Idle);
    assert!(snapshot.sample.is_some());
    assert!(snapshot.schema.is_none());
    assert!(snapshot.error.unwrap().contains("rate limited"));
}

#[tokio::test]
async fn test_local_pipeline_rejects_oversized_sample() {
    let server = source_server().await;
    let llm = Arc::new(MockLLMClient::new());

    let controller = local_controller(llm.clone(), 64);
    let url = format!("{}/escolas.geojson", server.uri());
    let snapshot = controller.process(&url).await.unwrap();

    assert_eq!(snapshot.state, PipelineState::Idle);
    assert!(snapshot.error.unwrap().starts_with("Sample is too large"));
    assert!(llm.received_requests().is_empty());
}

#[tokio::test]
async fn test_direct_fetch_invalid_url() {
    let fetcher = DirectFetcher::new(Duration::from_secs(5)).unwrap();
    let err = fetcher.fetch("not a url").await.unwrap_err();
    assert_eq!(err.user_message(), "Invalid URL: not a url");
}

#[tokio::test]
async fn test_direct_fetch_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = DirectFetcher::new(Duration::from_secs(5)).unwrap();
    let err = fetcher
        .fetch(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}
