use std::time::Duration;

use {
    bytes::Bytes,
    secrecy::{ExposeSecret, Secret},
    tracing::debug,
};

use printbot_channels::{Error, Result};

/// Fetches private Slack files with the bot token.
pub struct FileDownloader {
    http: reqwest::Client,
    bot_token: Secret<String>,
}

impl FileDownloader {
    pub fn new(bot_token: Secret<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| Error::external("build download client", e))?;
        Ok(Self { http, bot_token })
    }

    /// GET `url` with `Authorization: Bearer <bot token>` and return the body.
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(self.bot_token.expose_secret())
            .send()
            .await
            .map_err(|e| Error::external("file download", e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::rejected("file download", format!("HTTP {status}")));
        }
        let data = resp
            .bytes()
            .await
            .map_err(|e| Error::external("file download body", e))?;
        debug!(url, size = data.len(), "file downloaded");
        Ok(data)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        axum::{
            Router,
            http::{HeaderMap, StatusCode, header},
            response::IntoResponse,
            routing::get,
        },
        tokio::sync::oneshot,
    };

    async fn private_file(headers: HeaderMap) -> impl IntoResponse {
        match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            Some("Bearer xoxb-test") => (StatusCode::OK, b"%PDF-1.7 body".to_vec()),
            _ => (StatusCode::FORBIDDEN, Vec::new()),
        }
    }

    async fn start_mock() -> (u16, oneshot::Sender<()>) {
        let app = Router::new().route("/files-pri/report.pdf", get(private_file));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let port = listener.local_addr().expect("local addr").port();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve mock files");
        });
        (port, shutdown_tx)
    }

    fn downloader(token: &str) -> FileDownloader {
        FileDownloader::new(Secret::new(token.into()), Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn downloads_with_bearer_token() {
        let (port, shutdown) = start_mock().await;
        let data = downloader("xoxb-test")
            .download(&format!("http://127.0.0.1:{port}/files-pri/report.pdf"))
            .await
            .expect("download");
        assert_eq!(&data[..], b"%PDF-1.7 body");
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn rejected_token_is_an_error() {
        let (port, shutdown) = start_mock().await;
        let err = downloader("xoxb-wrong")
            .download(&format!("http://127.0.0.1:{port}/files-pri/report.pdf"))
            .await
            .expect_err("forbidden");
        assert!(matches!(err, Error::Rejected { .. }));
        assert!(err.to_string().contains("403"));
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let (port, shutdown) = start_mock().await;
        let err = downloader("xoxb-test")
            .download(&format!("http://127.0.0.1:{port}/files-pri/missing.pdf"))
            .await
            .expect_err("not found");
        assert!(err.to_string().contains("404"));
        let _ = shutdown.send(());
    }
}
