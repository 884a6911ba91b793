use std::time::Duration;

use {
    async_trait::async_trait,
    ipp::{operation::IppOperation, prelude::*},
    secrecy::ExposeSecret,
    tracing::{debug, warn},
};

use printbot_config::CupsConfig;

use crate::{
    Error, Result,
    service::{JobId, JobOptions, PrintDocument, PrintService},
};

/// [`PrintService`] backed by a CUPS server.
pub struct CupsClient {
    config: CupsConfig,
    timeout: Duration,
}

impl CupsClient {
    /// Build a client whose every request is bounded by `timeout`.
    pub fn new(config: CupsConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    fn ipp_client(&self, printer_uri: Uri) -> AsyncIppClient {
        let builder = AsyncIppClient::builder(printer_uri).request_timeout(self.timeout);
        if self.config.has_password() {
            builder
                .basic_auth(&self.config.username, self.config.password.expose_secret())
                .build()
        } else {
            builder.build()
        }
    }
}

/// `Print-Job` that also declares the document format, which the stock
/// builder leaves to the server's auto-typing.
struct PrintJobWithFormat<O> {
    inner: O,
    document_format: String,
}

impl<O: IppOperation> IppOperation for PrintJobWithFormat<O> {
    fn into_ipp_request(self) -> IppRequestResponse {
        let mut request = self.inner.into_ipp_request();
        request.attributes_mut().add(
            DelimiterTag::OperationAttributes,
            IppAttribute::new(
                "document-format",
                IppValue::MimeMediaType(self.document_format.into()),
            ),
        );
        request
    }
}

/// Integers go out as IPP `integer`, everything else as `keyword`.
fn job_attribute(name: &str, value: &str) -> IppAttribute {
    let value = match value.parse::<i32>() {
        Ok(n) => IppValue::Integer(n),
        Err(_) => IppValue::Keyword(value.to_string().into()),
    };
    IppAttribute::new(name, value)
}

fn job_id(response: &IppRequestResponse) -> Option<i32> {
    response
        .attributes()
        .groups_of(DelimiterTag::JobAttributes)
        .find_map(|group| group.attributes().get("job-id"))
        .and_then(|attr| match attr.value() {
            IppValue::Integer(id) => Some(*id),
            _ => None,
        })
}

fn status_message(response: &IppRequestResponse) -> Option<String> {
    response
        .attributes()
        .groups_of(DelimiterTag::OperationAttributes)
        .find_map(|group| group.attributes().get("status-message"))
        .map(|attr| attr.value().to_string())
}

#[async_trait]
impl PrintService for CupsClient {
    async fn submit_print_job(
        &self,
        document: PrintDocument,
        queue: &str,
        options: &JobOptions,
    ) -> Result<JobId> {
        let printer_uri = self.config.printer_uri(queue);
        let uri: Uri = printer_uri
            .parse()
            .map_err(|e| Error::invalid_uri(&printer_uri, e))?;

        debug!(queue, uri = %printer_uri, size = document.size(), "sending IPP Print-Job");

        let payload = IppPayload::new_async(futures::io::Cursor::new(document.data.to_vec()));
        let builder = options.iter().fold(
            IppOperationBuilder::print_job(uri.clone(), payload)
                .user_name(&self.config.username)
                .job_title(&document.name),
            |builder, (name, value)| builder.attribute(job_attribute(name, value)),
        );
        let operation = PrintJobWithFormat {
            inner: builder.build(),
            document_format: document.mime_type,
        };

        let response = self.ipp_client(uri).send(operation).await?;
        let status = response.header().status_code();
        if !status.is_success() {
            let message = status_message(&response);
            warn!(queue, status = ?status, message = ?message, "print job refused");
            return Err(Error::ipp(status as u16, message.as_deref()));
        }

        job_id(&response).map(JobId).ok_or(Error::MissingJobId)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        axum::{
            Router,
            body::Bytes as AxumBytes,
            extract::{Path, State},
            http::{HeaderMap, StatusCode as HttpStatus, header},
            response::IntoResponse,
            routing::post,
        },
        bytes::Bytes,
        secrecy::Secret,
        std::sync::{Arc, Mutex},
        tokio::sync::oneshot,
    };

    #[derive(Debug, Clone)]
    struct CapturedRequest {
        queue: String,
        content_type: Option<String>,
        authorization: Option<String>,
        body: Vec<u8>,
    }

    type Reply = Arc<dyn Fn(u32) -> (HttpStatus, Vec<u8>) + Send + Sync>;

    #[derive(Clone)]
    struct MockCups {
        requests: Arc<Mutex<Vec<CapturedRequest>>>,
        reply: Reply,
    }

    async fn print_handler(
        State(state): State<MockCups>,
        Path(queue): Path<String>,
        headers: HeaderMap,
        body: AxumBytes,
    ) -> impl IntoResponse {
        let header_value = |name| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        state
            .requests
            .lock()
            .expect("lock requests")
            .push(CapturedRequest {
                queue,
                content_type: header_value(header::CONTENT_TYPE),
                authorization: header_value(header::AUTHORIZATION),
                body: body.to_vec(),
            });
        // Echo the request-id back, the way CUPS does.
        let request_id = u32::from_be_bytes([body[4], body[5], body[6], body[7]]);
        let (status, reply) = (state.reply)(request_id);
        (status, [(header::CONTENT_TYPE, "application/ipp")], reply)
    }

    async fn start_mock(reply: Reply) -> (u16, Arc<Mutex<Vec<CapturedRequest>>>, oneshot::Sender<()>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/printers/{queue}", post(print_handler))
            .with_state(MockCups {
                requests: Arc::clone(&requests),
                reply,
            });
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
                .expect("serve mock cups");
        });
        (port, requests, shutdown_tx)
    }

    fn ipp_reply(
        status: StatusCode,
        request_id: u32,
        job_id: Option<i32>,
        message: Option<&str>,
    ) -> Vec<u8> {
        let mut response = IppRequestResponse::new_response(IppVersion::v1_1(), status, request_id);
        if let Some(message) = message {
            response.attributes_mut().add(
                DelimiterTag::OperationAttributes,
                IppAttribute::new(
                    "status-message",
                    IppValue::TextWithoutLanguage(message.to_string().into()),
                ),
            );
        }
        if let Some(id) = job_id {
            response.attributes_mut().add(
                DelimiterTag::JobAttributes,
                IppAttribute::new("job-id", IppValue::Integer(id)),
            );
        }
        response.to_bytes().to_vec()
    }

    fn client(port: u16, password: &str) -> CupsClient {
        CupsClient::new(
            CupsConfig {
                host: "127.0.0.1".into(),
                port,
                username: "printbot".into(),
                password: Secret::new(password.into()),
                tls: false,
            },
            Duration::from_secs(5),
        )
    }

    fn document() -> PrintDocument {
        PrintDocument {
            data: Bytes::from_static(b"%PDF-1.7 test"),
            name: "printbot.pdf".into(),
            mime_type: "application/pdf".into(),
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn job_options_pick_integer_or_keyword() {
        assert_eq!(job_attribute("copies", "2").value(), &IppValue::Integer(2));
        assert!(matches!(
            job_attribute("sides", "two-sided-long-edge").value(),
            IppValue::Keyword(_)
        ));
    }

    #[tokio::test]
    async fn submits_job_and_returns_job_id() {
        let (port, requests, shutdown) = start_mock(Arc::new(|request_id| {
            (
                HttpStatus::OK,
                ipp_reply(StatusCode::SuccessfulOk, request_id, Some(314), None),
            )
        }))
        .await;

        let options = JobOptions::from([
            ("sides".to_string(), "two-sided-long-edge".to_string()),
            ("copies".to_string(), "2".to_string()),
        ]);
        let job = client(port, "secret")
            .submit_print_job(document(), "hp", &options)
            .await
            .expect("print job accepted");
        assert_eq!(job, JobId(314));

        {
            let requests = requests.lock().expect("requests lock");
            assert_eq!(requests.len(), 1);
            let request = &requests[0];
            assert_eq!(request.queue, "hp");
            assert_eq!(request.content_type.as_deref(), Some("application/ipp"));
            assert!(
                request
                    .authorization
                    .as_deref()
                    .is_some_and(|v| v.starts_with("Basic "))
            );
            // Print-Job operation id.
            assert_eq!(&request.body[2..4], &[0x00, 0x02]);
            assert!(contains(&request.body, b"/printers/hp"));
            assert!(contains(&request.body, b"printbot.pdf"));
            assert!(contains(&request.body, b"application/pdf"));
            assert!(contains(&request.body, b"two-sided-long-edge"));
            assert!(request.body.ends_with(b"%PDF-1.7 test"));
        }
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn omits_basic_auth_without_password() {
        let (port, requests, shutdown) = start_mock(Arc::new(|request_id| {
            (
                HttpStatus::OK,
                ipp_reply(StatusCode::SuccessfulOk, request_id, Some(1), None),
            )
        }))
        .await;

        client(port, "")
            .submit_print_job(document(), "hp", &JobOptions::new())
            .await
            .expect("print job accepted");
        assert!(
            requests.lock().expect("requests lock")[0]
                .authorization
                .is_none()
        );
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn ipp_error_status_is_reported() {
        let (port, _requests, shutdown) = start_mock(Arc::new(|request_id| {
            (
                HttpStatus::OK,
                ipp_reply(
                    StatusCode::ClientErrorNotFound,
                    request_id,
                    None,
                    Some("The printer or class does not exist."),
                ),
            )
        }))
        .await;

        let err = client(port, "")
            .submit_print_job(document(), "missing", &JobOptions::new())
            .await
            .expect_err("unknown queue rejected");
        assert!(matches!(err, Error::Ipp { status: 0x0406, .. }), "{err}");
        assert!(err.to_string().contains("does not exist"));
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn http_error_status_is_client_error() {
        let (port, _requests, shutdown) =
            start_mock(Arc::new(|_| (HttpStatus::UNAUTHORIZED, Vec::new()))).await;

        let err = client(port, "wrong")
            .submit_print_job(document(), "hp", &JobOptions::new())
            .await
            .expect_err("auth failure");
        assert!(matches!(err, Error::Client(_)), "{err}");
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn missing_job_id_is_an_error() {
        let (port, _requests, shutdown) = start_mock(Arc::new(|request_id| {
            (
                HttpStatus::OK,
                ipp_reply(StatusCode::SuccessfulOk, request_id, None, None),
            )
        }))
        .await;

        let err = client(port, "")
            .submit_print_job(document(), "hp", &JobOptions::new())
            .await
            .expect_err("no job id");
        assert!(matches!(err, Error::MissingJobId));
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn unreachable_server_is_client_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let err = client(port, "")
            .submit_print_job(document(), "hp", &JobOptions::new())
            .await
            .expect_err("connection refused");
        assert!(matches!(err, Error::Client(_)));
    }

    #[tokio::test]
    async fn queue_name_that_breaks_the_uri_is_rejected() {
        let err = client(631, "")
            .submit_print_job(document(), "bad queue", &JobOptions::new())
            .await
            .expect_err("space in uri");
        assert!(matches!(err, Error::InvalidUri { .. }), "{err}");
    }
}
