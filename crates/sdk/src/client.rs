//! Service Client Implementation

use crate::error::{Result, SdkError};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Wire name the server uses for its signature document unless configured otherwise
pub const DEFAULT_SIGNATURE_METHOD: &str = "get_signature";

/// Client for one remote service
///
/// # Example
///
/// ```no_run
/// use svcbind_sdk::ServiceClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ServiceClient::connect("http://127.0.0.1:2000").await?;
/// println!("{}", client.signature().await?);
/// # Ok(())
/// # }
/// ```
pub struct ServiceClient {
    client: HttpClient,
    signature_method: String,
}

impl ServiceClient {
    /// Connect to a service endpoint
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:2000`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url)
            .map_err(|e| SdkError::Endpoint {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            signature_method: DEFAULT_SIGNATURE_METHOD.to_string(),
        })
    }

    /// Use a non-default signature wire name
    pub fn with_signature_method(mut self, name: impl Into<String>) -> Self {
        self.signature_method = name.into();
        self
    }

    /// Call a method and decode its result
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use svcbind_sdk::ServiceClient;
    /// # use serde_json::{json, Value};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = ServiceClient::connect("http://127.0.0.1:2000").await?;
    /// let kinds: Value = client
    ///     .invoke("get_login_kind", &json!({"channel": "web"}))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn invoke<I, O>(&self, method: &str, input: &I) -> Result<O>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let response: serde_json::Value = self.call(method, input).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Call a method that returns no payload; success is the absence of an error
    pub async fn invoke_void<I>(&self, method: &str, input: &I) -> Result<()>
    where
        I: Serialize + ?Sized,
    {
        self.call(method, input).await?;
        Ok(())
    }

    /// Fetch the service signature document (YAML)
    pub async fn signature(&self) -> Result<String> {
        let document: String = self
            .client
            .request(&self.signature_method, rpc_params![])
            .await?;
        Ok(document)
    }

    /// Wire names listed in the signature document
    pub async fn method_names(&self) -> Result<Vec<String>> {
        let document: serde_yaml::Value = serde_yaml::from_str(&self.signature().await?)?;
        let names = document["spec"]
            .as_sequence()
            .map(|spec| {
                spec.iter()
                    .filter_map(|m| m["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(names)
    }

    async fn call<I>(&self, method: &str, input: &I) -> Result<serde_json::Value>
    where
        I: Serialize + ?Sized,
    {
        let payload = serde_json::to_value(input)?;
        let outcome: Result<serde_json::Value> = self
            .client
            .request(method, rpc_params![payload.clone()])
            .await
            .map_err(SdkError::from);

        match &outcome {
            Ok(response) => debug!(method, input = %payload, output = %response, "invoke"),
            Err(e) => debug!(method, input = %payload, error = %e, "invoke failed"),
        }
        outcome
    }
}
