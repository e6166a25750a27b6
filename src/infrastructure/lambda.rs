//! Lambda Invoke REST client
//!
//! Sends one synchronous invocation per attempt:
//! `POST {endpoint}/2015-03-31/functions/{name}/invocations[?Qualifier=..]`.
//!
//! Requests are unsigned. Point the endpoint at a signing proxy or a local
//! emulator when the target needs credentials.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::InvokeError;
use crate::services::{InvokeRequest, Invoker};

const API_VERSION: &str = "2015-03-31";
const FUNCTION_ERROR_HEADER: &str = "X-Amz-Function-Error";

/// Default regional endpoint
pub fn regional_endpoint(region: &str) -> String {
    format!("https://lambda.{}.amazonaws.com", region)
}

/// HTTP invoker backed by reqwest
pub struct LambdaHttpInvoker {
    client: Client,
    endpoint: String,
}

impl LambdaHttpInvoker {
    /// Create an invoker for `endpoint` with a per-request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, InvokeError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| InvokeError::Transport {
                function: String::new(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Invocation URL for a request
    pub fn invocation_url(&self, request: &InvokeRequest) -> String {
        let mut url = format!(
            "{}/{}/functions/{}/invocations",
            self.endpoint,
            API_VERSION,
            urlencoding::encode(&request.function_name)
        );
        if let Some(qualifier) = &request.qualifier {
            url.push_str("?Qualifier=");
            url.push_str(&urlencoding::encode(qualifier));
        }
        url
    }
}

#[async_trait]
impl Invoker for LambdaHttpInvoker {
    async fn invoke(&self, request: InvokeRequest) -> Result<(), InvokeError> {
        let url = self.invocation_url(&request);
        debug!("POST {}", url);

        let mut builder = self
            .client
            .post(&url)
            .header("X-Amz-Invocation-Type", "RequestResponse")
            .header("X-Amz-Log-Type", "None")
            .header("Content-Type", "application/json")
            .body(request.payload.clone());
        if let Some(context) = &request.client_context {
            builder = builder.header("X-Amz-Client-Context", context.as_str());
        }

        let response = builder.send().await.map_err(|e| InvokeError::Transport {
            function: request.function_name.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        let function_error = response
            .headers()
            .get(FUNCTION_ERROR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InvokeError::Status {
                function: request.function_name,
                status: status.as_u16(),
                body,
            });
        }

        if let Some(kind) = function_error {
            return Err(InvokeError::Function {
                function: request.function_name,
                kind,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, qualifier: Option<&str>) -> InvokeRequest {
        InvokeRequest {
            function_name: name.to_string(),
            qualifier: qualifier.map(str::to_string),
            payload: "{}".to_string(),
            client_context: None,
        }
    }

    #[test]
    fn test_invocation_url() {
        let invoker =
            LambdaHttpInvoker::new("http://localhost:3001/", Duration::from_secs(5)).unwrap();
        assert_eq!(invoker.endpoint(), "http://localhost:3001");
        assert_eq!(
            invoker.invocation_url(&request("shop-dev-cart", None)),
            "http://localhost:3001/2015-03-31/functions/shop-dev-cart/invocations"
        );
        assert_eq!(
            invoker.invocation_url(&request("shop-dev-cart", Some("live"))),
            "http://localhost:3001/2015-03-31/functions/shop-dev-cart/invocations?Qualifier=live"
        );
    }

    #[test]
    fn test_invocation_url_encodes_arn() {
        let invoker = LambdaHttpInvoker::new(regional_endpoint("eu-west-1"), Duration::from_secs(5))
            .unwrap();
        assert_eq!(
            invoker.invocation_url(&request("arn:aws:lambda:eu-west-1:1:function:f", None)),
            "https://lambda.eu-west-1.amazonaws.com/2015-03-31/functions/\
             arn%3Aaws%3Alambda%3Aeu-west-1%3A1%3Afunction%3Af/invocations"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let invoker =
            LambdaHttpInvoker::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = invoker.invoke(request("f", None)).await.unwrap_err();
        assert!(matches!(err, InvokeError::Transport { ref function, .. } if function == "f"));
    }
}
