use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use url::Url;

use crate::api::models::{Ack, ContactFields};
use crate::api::{DeliveryError, Gateway};

/// Posts contact messages to the work-inquiry webhook, which forwards them to
/// a messaging channel.
pub struct WebhookGateway {
    pub http: HttpClient,
    pub endpoint: Url,
}

impl WebhookGateway {
    /// `timeout` of `None` keeps the HTTP client's default.
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> Result<Self, DeliveryError> {
        let mut builder = HttpClient::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            http: builder.build()?,
            endpoint,
        })
    }

    async fn post(&self, fields: &ContactFields) -> Result<Ack, DeliveryError> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(fields)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }
        Ok(Ack {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl Gateway for WebhookGateway {
    /// One POST, no retry.
    async fn send(&self, fields: ContactFields) -> Result<Ack, DeliveryError> {
        match self.post(&fields).await {
            Ok(ack) => {
                log::info!("work inquiry delivered to {} (HTTP {})", self.endpoint, ack.status);
                Ok(ack)
            }
            Err(e) => {
                log::error!("Error sending work inquiry to {}: {e}", self.endpoint);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers a single request with `status_line` and returns the raw request.
    async fn serve_once(status_line: &'static str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let len = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length")
                                .then(|| v.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + len {
                        break;
                    }
                }
            }
            let reply = format!(
                "HTTP/1.1 {status_line}\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok"
            );
            sock.write_all(reply.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&buf).to_string()
        });
        let url = Url::parse(&format!("http://{addr}/forward")).unwrap();
        (url, handle)
    }

    /// Loopback gateway that ignores any proxy set in the environment.
    fn local(url: Url, timeout: Option<Duration>) -> WebhookGateway {
        let mut builder = HttpClient::builder().no_proxy();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        WebhookGateway {
            http: builder.build().unwrap(),
            endpoint: url,
        }
    }

    fn sample() -> ContactFields {
        ContactFields {
            fname: "A".into(),
            lname: "B".into(),
            email: "a@b.com".into(),
            tel: String::new(),
            message: "hi".into(),
        }
    }

    #[test]
    fn builds_with_and_without_timeout() {
        let url = Url::parse(crate::app::DEFAULT_ENDPOINT).unwrap();
        assert!(WebhookGateway::new(url.clone(), None).is_ok());
        assert!(WebhookGateway::new(url, Some(Duration::from_secs(5))).is_ok());
    }

    #[tokio::test]
    async fn posts_json_body_and_acks_on_2xx() {
        let (url, server) = serve_once("200 OK").await;
        let gateway = local(url, None);

        let ack = gateway.send(sample()).await.unwrap();
        assert_eq!(ack.status, 200);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /forward HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        let body = request.split("\r\n\r\n").nth(1).unwrap();
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "fname": "A",
                "lname": "B",
                "email": "a@b.com",
                "tel": "",
                "message": "hi",
            })
        );
    }

    #[tokio::test]
    async fn any_success_status_is_delivery() {
        let (url, server) = serve_once("202 Accepted").await;
        let gateway = local(url, None);
        assert_eq!(gateway.send(sample()).await.unwrap().status, 202);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (url, server) = serve_once("502 Bad Gateway").await;
        let gateway = local(url, None);
        match gateway.send(sample()).await {
            Err(DeliveryError::Status(502)) => {}
            other => panic!("expected HTTP 502 error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/")).unwrap();
        let gateway = local(url, None);
        assert!(matches!(
            gateway.send(sample()).await,
            Err(DeliveryError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn configured_timeout_turns_a_hang_into_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection open without answering.
        let _server = tokio::spawn(async move {
            let (sock, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(sock);
        });

        let url = Url::parse(&format!("http://{addr}/")).unwrap();
        let gateway = local(url, Some(Duration::from_millis(200)));
        assert!(matches!(
            gateway.send(sample()).await,
            Err(DeliveryError::Transport(_))
        ));
    }
}
