//! Lanyard REST client.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::Client;
use tracing::debug;

use crate::config::Config;
use crate::error::{ClientError, PollError};
use crate::source::{PresencePayload, PresenceSource};

/// `GET {base_url}/v1/users/{user_id}` over `reqwest`.
///
/// The request timeout is applied by the controller, not here, so every source
/// gets the same bound.
#[derive(Clone, Debug)]
pub struct LanyardClient {
    client: Client,
    endpoint: String,
}

impl LanyardClient {
    /// Builds a client for `cfg.endpoint()`.
    pub fn new(cfg: &Config) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, cfg.endpoint()))
    }

    /// Uses an existing `reqwest` client.
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl PresenceSource for LanyardClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(&self) -> Result<PresencePayload, PollError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| PollError::Transport {
                error: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| PollError::Transport {
            error: e.to_string(),
        })?;
        debug!(endpoint = %self.endpoint, bytes = body.len(), "presence response received");

        PresencePayload::from_body(&body).map_err(|e| PollError::Decode {
            error: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn local_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    /// Serves one canned HTTP response and returns the raw request it saw.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut request = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}/v1/users/42"), server)
    }

    #[tokio::test]
    async fn test_success_body_is_decoded_and_headers_sent() {
        let (url, server) =
            serve_once("200 OK", r#"{"success":true,"data":{"discord_status":"online"}}"#).await;
        let client = LanyardClient::with_client(local_client(), url);

        let payload = client.fetch().await.unwrap();
        assert!(payload.success);
        assert_eq!(payload.data["discord_status"], "online");

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /v1/users/42 "));
        assert!(request.contains("accept: application/json"));
        assert!(request.contains("cache-control: no-cache"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let (url, server) = serve_once("500 Internal Server Error", "{}").await;
        let client = LanyardClient::with_client(local_client(), url);

        assert_eq!(
            client.fetch().await,
            Err(PollError::HttpStatus { status: 500 })
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unsuccessful_payload_keeps_body_text() {
        let raw = r#"{"success":false,"zeta":1,"alpha":2,"data":null}"#;
        let (url, server) = serve_once("200 OK", raw).await;
        let client = LanyardClient::with_client(local_client(), url);

        let payload = client.fetch().await.unwrap();
        assert!(!payload.success);
        assert_eq!(payload.body(), raw);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_success_flag_is_not_a_decode_error() {
        let (url, server) = serve_once("200 OK", r#"{"data":{}}"#).await;
        let client = LanyardClient::with_client(local_client(), url);

        let payload = client.fetch().await.unwrap();
        assert!(!payload.success);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_garbage_body_is_decode_error() {
        let (url, server) = serve_once("200 OK", "<html>oops</html>").await;
        let client = LanyardClient::with_client(local_client(), url);

        assert!(matches!(
            client.fetch().await,
            Err(PollError::Decode { .. })
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = LanyardClient::with_client(local_client(), format!("http://{addr}/v1/users/42"));
        assert!(matches!(
            client.fetch().await,
            Err(PollError::Transport { .. })
        ));
    }

    #[test]
    fn test_endpoint_comes_from_config() {
        let client = LanyardClient::new(&Config::default()).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://api.lanyard.rest/v1/users/1010166973973405727"
        );
    }
}
