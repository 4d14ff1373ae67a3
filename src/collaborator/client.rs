use super::error::CollaboratorError;
use crate::schema::InferredSchema;
use async_trait::async_trait;
use serde_json::Value;

/// Retrieves the raw payload behind a source URL
#[async_trait]
pub trait SampleFetcher: Send + Sync {
    async fn fetch(&self, source_url: &str) -> Result<Value, CollaboratorError>;

    fn name(&self) -> &str;
}

/// Turns a single sample record into a proposed schema
#[async_trait]
pub trait SchemaInferrer: Send + Sync {
    async fn infer(&self, sample: &Value) -> Result<InferredSchema, CollaboratorError>;

    fn name(&self) -> &str;

    fn model_info(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Srid;

    struct EchoFetcher;

    #[async_trait]
    impl SampleFetcher for EchoFetcher {
        async fn fetch(&self, source_url: &str) -> Result<Value, CollaboratorError> {
            Ok(serde_json::json!({ "url": source_url }))
        }

        fn name(&self) -> &str {
            "EchoFetcher"
        }
    }

    struct FixedInferrer;

    #[async_trait]
    impl SchemaInferrer for FixedInferrer {
        async fn infer(&self, _sample: &Value) -> Result<InferredSchema, CollaboratorError> {
            Ok(InferredSchema::new("POINT", Srid::Code(4326), vec![]))
        }

        fn name(&self) -> &str {
            "FixedInferrer"
        }
    }

    #[tokio::test]
    async fn test_fetcher_trait() {
        let fetcher = EchoFetcher;
        let value = fetcher.fetch("https://example.com/data").await.unwrap();
        assert_eq!(value["url"], "https://example.com/data");
        assert_eq!(fetcher.name(), "EchoFetcher");
    }

    #[tokio::test]
    async fn test_inferrer_trait() {
        let inferrer = FixedInferrer;
        let schema = inferrer.infer(&Value::Null).await.unwrap();
        assert_eq!(schema.geometry_type, "POINT");
        assert!(inferrer.model_info().is_none());
    }
}
