//! Reqwest-backed adapter for the host platform's bot API.
//!
//! One `sendMessage` call per delivery, bounded by the client timeout. The
//! bot token is part of the request path, so transport errors are stripped of
//! their URL before they are logged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::PlatformId;
use crate::domain::ports::{PlatformNotifier, PlatformNotifierError};

const PARSE_MODE: &str = "MarkdownV2";

#[derive(Serialize)]
struct SendMessageBody<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Deserialize)]
struct ApiFailure {
    #[serde(default)]
    description: Option<String>,
}

/// Delivers notifications through `<api_base>/bot<token>/sendMessage`.
pub struct BotApiNotifier {
    client: Client,
    endpoint: Zeroizing<String>,
}

impl BotApiNotifier {
    /// Build a notifier with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(api_base: &str, bot_token: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = Zeroizing::new(format!(
            "{}/bot{bot_token}/sendMessage",
            api_base.trim_end_matches('/')
        ));
        Ok(Self { client, endpoint })
    }
}

impl std::fmt::Debug for BotApiNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotApiNotifier").finish_non_exhaustive()
    }
}

#[async_trait]
impl PlatformNotifier for BotApiNotifier {
    async fn deliver(&self, recipient: PlatformId, text: &str) -> Result<(), PlatformNotifierError> {
        let response = self
            .client
            .post(self.endpoint.as_str())
            .json(&SendMessageBody {
                chat_id: recipient.get(),
                text,
                parse_mode: PARSE_MODE,
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(recipient, status, &body))
    }
}

fn map_transport_error(error: reqwest::Error) -> PlatformNotifierError {
    PlatformNotifierError::transport(error.without_url().to_string())
}

fn map_status_error(recipient: PlatformId, status: StatusCode, body: &[u8]) -> PlatformNotifierError {
    if status == StatusCode::FORBIDDEN {
        return PlatformNotifierError::revoked(recipient.get());
    }
    let message = serde_json::from_slice::<ApiFailure>(body)
        .ok()
        .and_then(|failure| failure.description)
        .unwrap_or_else(|| String::from_utf8_lossy(body).chars().take(160).collect());
    PlatformNotifierError::rejected(status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    use rstest::rstest;

    use super::*;

    /// Serve one request with `status` and `body`, returning the raw request.
    fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));
            let mut head = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("read line");
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().expect("length");
                }
                head.push_str(&line);
                if line == "\r\n" {
                    break;
                }
            }
            let mut payload = vec![0; content_length];
            reader.read_exact(&mut payload).expect("body");
            head.push_str(&String::from_utf8_lossy(&payload));

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            )
            .expect("respond");
            tx.send(head).expect("report request");
        });
        (base, rx)
    }

    #[rstest]
    #[tokio::test]
    async fn posts_markdown_message_to_bot_endpoint() {
        let (base, requests) = serve_once("200 OK", r#"{"ok":true}"#);
        let notifier =
            BotApiNotifier::new(&base, "123:abc", Duration::from_secs(5)).expect("client");

        notifier
            .deliver(PlatformId::new(42), "hello\\!")
            .await
            .expect("delivered");

        let request = requests.recv().expect("request captured");
        assert!(request.starts_with("POST /bot123:abc/sendMessage HTTP/1.1"));
        assert!(request.contains(r#""chat_id":42"#));
        assert!(request.contains(r#""parse_mode":"MarkdownV2""#));
    }

    #[rstest]
    #[tokio::test]
    async fn forbidden_means_revoked() {
        let (base, _requests) = serve_once(
            "403 Forbidden",
            r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#,
        );
        let notifier =
            BotApiNotifier::new(&base, "123:abc", Duration::from_secs(5)).expect("client");

        let err = notifier
            .deliver(PlatformId::new(42), "hi")
            .await
            .expect_err("revoked");
        assert_eq!(err, PlatformNotifierError::revoked(42));
    }

    #[rstest]
    fn other_statuses_carry_the_api_description() {
        let err = map_status_error(
            PlatformId::new(1),
            StatusCode::BAD_REQUEST,
            br#"{"ok":false,"description":"Bad Request: can't parse entities"}"#,
        );
        assert_eq!(
            err,
            PlatformNotifierError::rejected(400u16, "Bad Request: can't parse entities")
        );

        let err = map_status_error(PlatformId::new(1), StatusCode::BAD_GATEWAY, b"upstream down");
        assert_eq!(err, PlatformNotifierError::rejected(502u16, "upstream down"));
    }

    #[rstest]
    #[tokio::test]
    async fn unreachable_api_is_a_transport_error_without_the_token() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        drop(listener);
        let notifier =
            BotApiNotifier::new(&base, "123:secret", Duration::from_millis(500)).expect("client");

        let err = notifier
            .deliver(PlatformId::new(1), "hi")
            .await
            .expect_err("unreachable");
        assert!(matches!(err, PlatformNotifierError::Transport { .. }));
        assert!(!err.to_string().contains("secret"));
    }
}
