use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::model::{ContainerSummary, DesiredState, Endpoint, EndpointId, ServiceSummary, Stack};

use super::StackApi;

/// Header Portainer reads access tokens from.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// HTTP client for the Portainer REST API.
pub struct PortainerClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl PortainerClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let res = self
            .http
            .get(self.url(path))
            .header(API_KEY_HEADER, &self.token)
            .send()
            .await?;
        let bytes = check_status(res).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        debug!(path, "GET");
        let res = self
            .http
            .get(self.url(path))
            .header(API_KEY_HEADER, &self.token)
            .send()
            .await?;
        Ok(check_status(res).await?.bytes().await?.to_vec())
    }

    async fn post(&self, path: &str, body: Option<&Value>) -> Result<(), ApiError> {
        debug!(path, "POST");
        let mut req = self
            .http
            .post(self.url(path))
            .header(API_KEY_HEADER, &self.token)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }
        check_status(req.send().await?).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into `ApiError::Status`, keeping the body text.
async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}

#[async_trait]
impl StackApi for PortainerClient {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, ApiError> {
        self.get_json("/api/endpoints").await
    }

    async fn stacks(&self) -> Result<Vec<Stack>, ApiError> {
        self.get_json("/api/stacks").await
    }

    async fn containers(&self, endpoint: EndpointId) -> Result<Vec<ContainerSummary>, ApiError> {
        self.get_json(&format!("/api/endpoints/{}/docker/containers/json?all=true", endpoint))
            .await
    }

    async fn services(&self, endpoint: EndpointId) -> Result<Vec<ServiceSummary>, ApiError> {
        self.get_json(&format!("/api/endpoints/{}/docker/services", endpoint))
            .await
    }

    async fn stack_lifecycle(
        &self,
        stack_id: i64,
        endpoint: EndpointId,
        desired: DesiredState,
    ) -> Result<(), ApiError> {
        let path = format!("/api/stacks/{}/{}?endpointId={}", stack_id, desired.verb(), endpoint);
        self.post(&path, None).await
    }

    async fn update_service(
        &self,
        endpoint: EndpointId,
        service_id: &str,
        version: u64,
        spec: &Value,
    ) -> Result<(), ApiError> {
        let path = format!(
            "/api/endpoints/{}/docker/services/{}/update?version={}",
            endpoint, service_id, version
        );
        self.post(&path, Some(spec)).await
    }

    async fn container_logs(
        &self,
        endpoint: EndpointId,
        container_id: &str,
        tail: u32,
    ) -> Result<Vec<u8>, ApiError> {
        let path = format!(
            "/api/endpoints/{}/docker/containers/{}/logs?stdout=true&stderr=true&tail={}",
            endpoint, container_id, tail
        );
        self.get_bytes(&path).await
    }

    async fn restart_container(&self, endpoint: EndpointId, container_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/endpoints/{}/docker/containers/{}/restart", endpoint, container_id);
        self.post(&path, None).await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn client(server: &mockito::Server) -> PortainerClient {
        PortainerClient::new(&server.url(), "ptr_token", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn sends_api_key_and_parses_stacks() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/stacks")
            .match_header(API_KEY_HEADER, "ptr_token")
            .with_status(200)
            .with_body(r#"[{"Id":1,"Name":"demo","Type":2,"Status":1,"EndpointId":2}]"#)
            .create_async()
            .await;

        let stacks = client(&server).stacks().await.unwrap();
        assert_eq!(stacks.len(), 1);
        assert_eq!(stacks[0].name, "demo");
    }

    #[tokio::test]
    async fn non_success_keeps_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/endpoints")
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let err = client(&server).endpoints().await.unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "Unauthorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn containers_listing_requests_all() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/endpoints/3/docker/containers/json")
            .match_query(Matcher::UrlEncoded("all".into(), "true".into()))
            .with_status(200)
            .with_body(r#"[{"Id":"abc","Names":["/web"],"State":"running","Labels":{}}]"#)
            .create_async()
            .await;

        let containers = client(&server).containers(3).await.unwrap();
        assert_eq!(containers[0].display_name(), "web");
    }

    #[tokio::test]
    async fn stack_stop_posts_to_lifecycle_route() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/api/stacks/7/stop")
            .match_query(Matcher::UrlEncoded("endpointId".into(), "2".into()))
            .match_header(API_KEY_HEADER, "ptr_token")
            .with_status(200)
            .create_async()
            .await;

        client(&server)
            .stack_lifecycle(7, 2, DesiredState::Stopped)
            .await
            .unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn service_update_sends_version_and_spec() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/api/endpoints/1/docker/services/svc1/update")
            .match_query(Matcher::UrlEncoded("version".into(), "42".into()))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "Mode": {"Replicated": {"Replicas": 0}}
            })))
            .with_status(200)
            .with_body(r#"{"Warnings":null}"#)
            .create_async()
            .await;

        let spec = serde_json::json!({"Name": "ops_api", "Mode": {"Replicated": {"Replicas": 0}}});
        client(&server).update_service(1, "svc1", 42, &spec).await.unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn container_logs_returns_raw_bytes() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/endpoints/1/docker/containers/abc/logs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("stdout".into(), "true".into()),
                Matcher::UrlEncoded("stderr".into(), "true".into()),
                Matcher::UrlEncoded("tail".into(), "50".into()),
            ]))
            .with_status(200)
            .with_body(b"\x01\x00\x00\x00\x00\x00\x00\x06hello\n".to_vec())
            .create_async()
            .await;

        let bytes = client(&server).container_logs(1, "abc", 50).await.unwrap();
        assert_eq!(bytes.len(), 14);
    }
}
