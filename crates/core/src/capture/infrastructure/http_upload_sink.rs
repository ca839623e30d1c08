use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;

use crate::capture::domain::capture_sink::{CaptureError, CaptureSink, Snapshot};
use crate::shared::constants::{CAPTURE_FILE_NAME, UPLOAD_CONTENT_TYPE, UPLOAD_FIELD_NAME};

use super::png_encoder::encode_png;

const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// POSTs each snapshot as `multipart/form-data`.
///
/// The PNG goes in field `image` with filename `captured_image.png`.
/// One attempt per snapshot: a transport error or non-2xx status is
/// returned to the caller and nothing is retried.
pub struct HttpUploadSink {
    client: Client,
    endpoint: String,
}

impl HttpUploadSink {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, CaptureError> {
        let endpoint = endpoint.into();
        let client = Client::builder()
            .timeout(DEFAULT_UPLOAD_TIMEOUT)
            .build()
            .map_err(|source| CaptureError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        Ok(Self::with_client(endpoint, client))
    }

    pub fn with_client(endpoint: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn transport_error(&self, source: reqwest::Error) -> CaptureError {
        CaptureError::Transport {
            endpoint: self.endpoint.clone(),
            source,
        }
    }
}

impl CaptureSink for HttpUploadSink {
    fn deliver(&self, snapshot: &Snapshot) -> Result<(), CaptureError> {
        let bytes = encode_png(&snapshot.frame)?;
        let part = Part::bytes(bytes)
            .file_name(CAPTURE_FILE_NAME)
            .mime_str(UPLOAD_CONTENT_TYPE)
            .map_err(|e| self.transport_error(e))?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptureError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }
        log::info!(
            "Uploaded capture #{} to {} (HTTP {})",
            snapshot.number,
            self.endpoint,
            status.as_u16()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("endpoint {}", self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::Frame;
    use mockito::Matcher;

    fn local_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(Frame::filled(8, 8, [1, 2, 3]), 1)
    }

    #[test]
    fn test_posts_multipart_image_field() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/upload")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".into()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="image""#.into()),
                Matcher::Regex(r#"filename="captured_image.png""#.into()),
                Matcher::Regex("(?i)content-type: image/png".into()),
                Matcher::Regex("PNG".into()),
            ]))
            .with_status(200)
            .create();

        let sink = HttpUploadSink::with_client(format!("{}/upload", server.url()), local_client());
        sink.deliver(&snapshot()).unwrap();

        mock.assert();
    }

    #[test]
    fn test_non_success_status_is_reported() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/upload").with_status(500).create();

        let sink = HttpUploadSink::with_client(format!("{}/upload", server.url()), local_client());
        let err = sink.deliver(&snapshot()).unwrap_err();

        assert!(matches!(err, CaptureError::Status { status: 500, .. }));
        mock.assert();
    }

    #[test]
    fn test_unreachable_endpoint_is_transport_error() {
        // Bind then drop to get a port nobody is listening on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let sink =
            HttpUploadSink::with_client(format!("http://127.0.0.1:{port}/upload"), local_client());

        let err = sink.deliver(&snapshot()).unwrap_err();
        assert!(matches!(err, CaptureError::Transport { .. }));
    }

    #[test]
    fn test_describe_names_endpoint() {
        let sink = HttpUploadSink::new("http://localhost:8080/upload").unwrap();
        assert_eq!(sink.describe(), "endpoint http://localhost:8080/upload");
    }
}
