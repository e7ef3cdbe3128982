//! Atlas Admin API client
//!
//! Direct REST implementation of [`RemoteClient`] using Bearer token
//! authentication and the versioned `application/vnd.atlas.*+json` media
//! type. Each resource type registers a [`Route`] whose `{param}`
//! placeholders are filled from the address parameters.

use crate::config::AtlasConfig;
use crate::error::{AtlasError, Result};
use async_trait::async_trait;
use cloudstate_core::{Address, RemoteClient, RemoteFailure, RemoteResult};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Path templates for one resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Create and list
    pub collection: &'static str,
    /// Get, update and delete
    pub item: &'static str,
}

/// Atlas API client
pub struct AtlasClient {
    client: reqwest::Client,
    base_url: Url,
    access_token: String,
    items_per_page: u32,
    routes: HashMap<String, Route>,
}

impl AtlasClient {
    pub fn new(config: AtlasConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AtlasError::InvalidConfig(format!("{}: {}", config.base_url, e)))?;

        let mut headers = HeaderMap::new();
        let accept = HeaderValue::from_str(&config.accept_header())
            .map_err(|e| AtlasError::InvalidConfig(format!("API version: {}", e)))?;
        headers.insert(ACCEPT, accept);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            access_token: config.access_token,
            items_per_page: config.items_per_page,
            routes: HashMap::new(),
        })
    }

    pub fn with_route(mut self, resource_type: impl Into<String>, route: Route) -> Self {
        self.routes.insert(resource_type.into(), route);
        self
    }

    fn route(&self, address: &Address) -> Result<Route> {
        self.routes
            .get(&address.resource_type)
            .copied()
            .ok_or_else(|| AtlasError::UnknownRoute(address.resource_type.clone()))
    }

    /// Render a path template against the address parameters.
    /// Parameter values are percent-encoded as single path segments.
    fn url_for(&self, address: &Address, template: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                AtlasError::InvalidConfig(format!("not a base URL: {}", self.base_url))
            })?;
            segments.pop_if_empty();

            for segment in template.split('/').filter(|s| !s.is_empty()) {
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(param) => {
                        let value = address
                            .param(param)
                            .filter(|v| !v.is_empty())
                            .ok_or_else(|| AtlasError::MissingParam {
                                resource_type: address.resource_type.clone(),
                                param: param.to_string(),
                            })?;
                        segments.push(value);
                    }
                    None => {
                        segments.push(segment);
                    }
                }
            }
        }
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> RemoteResult<Value> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url.clone())
            .bearer_auth(&self.access_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(AtlasError::from)?;
        let status = response.status();
        let text = response.text().await.map_err(AtlasError::from)?;

        if !status.is_success() {
            let failure = failure_from_response(status, &text, url.path());
            tracing::debug!("{} {} -> {}", url, status, failure);
            return Err(failure);
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).map_err(AtlasError::from)?)
    }
}

#[async_trait]
impl RemoteClient for AtlasClient {
    async fn create(&self, address: &Address, body: &Value) -> RemoteResult<Value> {
        let url = self.url_for(address, self.route(address)?.collection)?;
        self.send(Method::POST, url, Some(body)).await
    }

    async fn get(&self, address: &Address) -> RemoteResult<Value> {
        let url = self.url_for(address, self.route(address)?.item)?;
        self.send(Method::GET, url, None).await
    }

    async fn get_status(&self, address: &Address) -> RemoteResult<Value> {
        // verification requests expose their status on the item route
        self.get(address).await
    }

    async fn update(&self, address: &Address, patch: &Value) -> RemoteResult<Value> {
        let url = self.url_for(address, self.route(address)?.item)?;
        self.send(Method::PATCH, url, Some(patch)).await
    }

    async fn delete(&self, address: &Address) -> RemoteResult<()> {
        let url = self.url_for(address, self.route(address)?.item)?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn list(&self, address: &Address) -> RemoteResult<Vec<Value>> {
        let url = self.url_for(address, self.route(address)?.collection)?;
        let mut items = Vec::new();
        let mut page_num: u32 = 1;

        loop {
            let mut page_url = url.clone();
            page_url
                .query_pairs_mut()
                .append_pair("pageNum", &page_num.to_string())
                .append_pair("itemsPerPage", &self.items_per_page.to_string());

            let body = self.send(Method::GET, page_url, None).await?;
            let page: Page = serde_json::from_value(body).map_err(AtlasError::from)?;
            let received = page.results.len();
            items.extend(page.results);

            if is_last_page(received, items.len(), page.total_count, self.items_per_page) {
                break;
            }
            page_num += 1;
        }

        tracing::debug!("Listed {} {} item(s)", items.len(), address.resource_type);
        Ok(items)
    }
}

/// Translate a non-success response into a [`RemoteFailure`].
///
/// Atlas reports some missing parents with 400 and an `*_NOT_FOUND` error
/// code rather than 404; both map to `NotFound`.
fn failure_from_response(status: StatusCode, body: &str, path: &str) -> RemoteFailure {
    let parsed: Option<ApiErrorBody> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|b| b.error_code.clone());
    let detail = parsed.as_ref().and_then(|b| b.detail.clone());

    let not_found = status == StatusCode::NOT_FOUND
        || code.as_deref().is_some_and(|c| c.ends_with("_NOT_FOUND"));
    if not_found {
        return RemoteFailure::NotFound(detail.unwrap_or_else(|| path.to_string()));
    }

    RemoteFailure::Api {
        status: status.as_u16(),
        code: code.unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("UNKNOWN")
                .to_uppercase()
                .replace(' ', "_")
        }),
        detail: detail.unwrap_or_else(|| body.trim().to_string()),
    }
}

fn is_last_page(received: usize, collected: usize, total: Option<u64>, per_page: u32) -> bool {
    if received == 0 {
        return true;
    }
    match total {
        Some(total) => collected as u64 >= total,
        None => received < per_page as usize,
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    detail: Option<String>,
    error_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page {
    #[serde(default)]
    results: Vec<Value>,
    total_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudstate_core::StateFields;

    const ROUTE: Route = Route {
        collection: "/api/atlas/v2/groups/{project_id}/streams/{instance_name}/connections",
        item: "/api/atlas/v2/groups/{project_id}/streams/{instance_name}/connections/{connection_name}",
    };

    fn client() -> AtlasClient {
        AtlasClient::new(AtlasConfig::new("token"))
            .unwrap()
            .with_route("stream_connection", ROUTE)
    }

    fn address(pairs: &[(&str, &str)]) -> Address {
        let params: StateFields = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Address::new("stream_connection", params)
    }

    #[test]
    fn test_url_for_item() {
        let address = address(&[
            ("project_id", "5f4e3d2c1b0a9f8e7d6c5b4a"),
            ("instance_name", "my-instance"),
            ("connection_name", "kafka conn/1"),
        ]);
        let url = client().url_for(&address, ROUTE.item).unwrap();
        assert_eq!(
            url.as_str(),
            "https://cloud.mongodb.com/api/atlas/v2/groups/5f4e3d2c1b0a9f8e7d6c5b4a/streams/my-instance/connections/kafka%20conn%2F1"
        );
    }

    #[test]
    fn test_url_for_missing_param() {
        let address = address(&[("project_id", "p1")]);
        let err = client().url_for(&address, ROUTE.collection).unwrap_err();
        assert!(matches!(err, AtlasError::MissingParam { ref param, .. } if param == "instance_name"));
    }

    #[test]
    fn test_unknown_route() {
        let address = Address::new("cluster", StateFields::new());
        assert!(matches!(
            client().route(&address),
            Err(AtlasError::UnknownRoute(_))
        ));
    }

    #[test]
    fn test_failure_from_404() {
        let failure = failure_from_response(StatusCode::NOT_FOUND, "", "/api/atlas/v2/x");
        assert_eq!(failure, RemoteFailure::NotFound("/api/atlas/v2/x".to_string()));
    }

    #[test]
    fn test_failure_from_not_found_error_code() {
        let body = r#"{"detail":"Stream instance my-instance not found.","error":400,"errorCode":"STREAM_TENANT_NOT_FOUND"}"#;
        let failure = failure_from_response(StatusCode::BAD_REQUEST, body, "/x");
        assert!(failure.is_not_found());
    }

    #[test]
    fn test_failure_from_error_body() {
        let body = r#"{"detail":"Invalid LDAP configuration.","error":400,"errorCode":"INVALID_LDAP_CONFIGURATION","reason":"Bad Request"}"#;
        let failure = failure_from_response(StatusCode::BAD_REQUEST, body, "/x");
        assert_eq!(
            failure,
            RemoteFailure::Api {
                status: 400,
                code: "INVALID_LDAP_CONFIGURATION".to_string(),
                detail: "Invalid LDAP configuration.".to_string(),
            }
        );
    }

    #[test]
    fn test_failure_from_plain_body() {
        let failure = failure_from_response(StatusCode::BAD_GATEWAY, "upstream down\n", "/x");
        assert_eq!(
            failure,
            RemoteFailure::Api {
                status: 502,
                code: "BAD_GATEWAY".to_string(),
                detail: "upstream down".to_string(),
            }
        );
    }

    #[test]
    fn test_is_last_page() {
        assert!(is_last_page(0, 10, Some(20), 10));
        assert!(!is_last_page(10, 10, Some(20), 10));
        assert!(is_last_page(10, 20, Some(20), 10));
        assert!(is_last_page(3, 3, None, 10));
        assert!(!is_last_page(10, 10, None, 10));
    }

    #[test]
    fn test_page_deserialize() {
        let page: Page = serde_json::from_value(serde_json::json!({
            "results": [{"name": "a"}, {"name": "b"}],
            "totalCount": 2,
            "links": []
        }))
        .unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.total_count, Some(2));
    }
}
