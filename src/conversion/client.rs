//! HTTP client for the conversion service.
//!
//! Sends `POST {"video_url": "..."}` as JSON. A 2xx answer carries the audio
//! bytes and a `Content-Disposition` filename hint; anything else may carry a
//! JSON body with a human-readable `detail` field.

use async_trait::async_trait;
use reqwest::header::CONTENT_DISPOSITION;
use serde::{Deserialize, Serialize};

use super::{ConversionEndpoint, ConversionError, ConvertedAudio};
use crate::submission::VideoUrl;

#[derive(Debug, Serialize)]
struct ConversionRequest<'a> {
    video_url: &'a str,
}

/// Error body shape; every field is optional on the wire.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Reads the `detail` message out of an error body, if it is a JSON string.
pub(crate) fn error_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        _ => None,
    }
}

/// Conversion service client backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpConversionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpConversionClient {
    /// Creates a client for the given endpoint using reqwest's default transport settings.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ConversionEndpoint for HttpConversionClient {
    async fn convert(&self, video_url: &VideoUrl) -> Result<ConvertedAudio, ConversionError> {
        tracing::debug!(
            "Conversion API Call:\n  URL: {}\n  Method: POST\n  Body: video_url={}",
            self.endpoint,
            video_url
        );

        let response = match self
            .client
            .post(&self.endpoint)
            .json(&ConversionRequest {
                video_url: video_url.as_str(),
            })
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                let error_msg = if e.is_connect() {
                    "Failed to connect to the conversion service. Check your internet connection."
                        .to_string()
                } else if e.is_timeout() {
                    "Request to the conversion service timed out.".to_string()
                } else if e.is_builder() {
                    format!("Failed to build conversion request: {e}. Check api.endpoint in your config.")
                } else {
                    format!("Conversion service network error: {e}")
                };
                return Err(ConversionError::Transport(error_msg));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let detail = error_detail(&body);
            tracing::debug!(
                "Conversion API Response:\n  Status: {}\n  Detail: {:?}",
                status,
                detail
            );
            return Err(ConversionError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(|e| {
            ConversionError::Transport(format!("Failed to read audio from conversion service: {e}"))
        })?;

        tracing::debug!(
            "Conversion API Response:\n  Status: {}\n  Content-Disposition: {:?}\n  Payload: {} bytes",
            status,
            content_disposition,
            bytes.len()
        );

        Ok(ConvertedAudio {
            content_disposition,
            bytes: bytes.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn youtube_url() -> VideoUrl {
        VideoUrl::parse("https://youtu.be/abc", &["youtu.be".to_string()]).unwrap()
    }

    /// Serves a single canned HTTP response and hands back the raw request.
    async fn serve_once(response: Vec<u8>) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            socket.write_all(&response).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{addr}/download-mp3"), handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    fn http_response(status: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {status}\r\n");
        for (name, value) in headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        ));
        let mut out = head.into_bytes();
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn detail_extraction() {
        assert_eq!(
            error_detail(br#"{"detail": "video unavailable"}"#),
            Some("video unavailable".to_string())
        );
        assert_eq!(error_detail(br#"{"detail": ["not", "a string"]}"#), None);
        assert_eq!(error_detail(br#"{"error": "nope"}"#), None);
        assert_eq!(error_detail(b"<html>502</html>"), None);
        assert_eq!(error_detail(b""), None);
    }

    #[tokio::test]
    async fn posts_json_and_returns_payload() {
        let (endpoint, server) = serve_once(http_response(
            "200 OK",
            &[
                ("Content-Type", "audio/mpeg"),
                ("Content-Disposition", r#"attachment; filename="Song Title.mp3""#),
            ],
            b"ID3-bytes",
        ))
        .await;

        let client = HttpConversionClient::new(endpoint);
        let audio = client.convert(&youtube_url()).await.unwrap();

        assert_eq!(audio.bytes, b"ID3-bytes");
        assert_eq!(
            audio.content_disposition.as_deref(),
            Some(r#"attachment; filename="Song Title.mp3""#)
        );

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /download-mp3 "));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"video_url":"https://youtu.be/abc"}"#));
    }

    #[tokio::test]
    async fn non_success_carries_detail() {
        let (endpoint, _server) = serve_once(http_response(
            "500 Internal Server Error",
            &[("Content-Type", "application/json")],
            br#"{"detail": "video unavailable"}"#,
        ))
        .await;

        let client = HttpConversionClient::new(endpoint);
        match client.convert(&youtube_url()).await {
            Err(ConversionError::Rejected { status, detail }) => {
                assert_eq!(status, 500);
                assert_eq!(detail.as_deref(), Some("video unavailable"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpConversionClient::new(format!("http://{addr}/download-mp3"));
        let result = client.convert(&youtube_url()).await;
        assert!(matches!(result, Err(ConversionError::Transport(_))));
    }
}
