//! Tests for the HTTP generator against a canned local server.

use rowsmith::{
    DefaultClassifier, ErrorClassifier, Generator, GenerationErrorKind, HttpGenerator,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serve one request with `status` and `body`, reporting the raw request text.
async fn serve_once(status: u16, body: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
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
        let response = format!(
            "HTTP/1.1 {status} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
    });

    (format!("http://{addr}/generate"), rx)
}

fn request_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some((head, body)) = text.split_once("\r\n\r\n") else {
        return false;
    };
    let length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    body.len() >= length
}

#[tokio::test]
async fn test_success_returns_text_and_sends_prompt() {
    let (endpoint, request) = serve_once(200, r#"{"text":"a bright lamp"}"#).await;
    let generator = HttpGenerator::new(endpoint).with_api_key("secret");

    let text = generator.generate("Describe lamp").await.unwrap();
    assert_eq!(text, "a bright lamp");

    let request = request.await.unwrap();
    assert!(request.starts_with("POST /generate"));
    assert!(request.contains(r#""prompt":"Describe lamp""#));
    assert!(request.to_lowercase().contains("authorization: bearer secret"));
}

#[tokio::test]
async fn test_output_alias_is_accepted() {
    let (endpoint, _request) = serve_once(200, r#"{"output":"aliased"}"#).await;
    let text = HttpGenerator::new(endpoint).generate("x").await.unwrap();
    assert_eq!(text, "aliased");
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (endpoint, _request) = serve_once(503, r#"{"error":"overloaded"}"#).await;

    let err = HttpGenerator::new(endpoint).generate("x").await.unwrap_err();
    assert_eq!(err.kind().status_code(), Some(503));

    let classifier = DefaultClassifier::new();
    assert!(classifier.is_retryable(&classifier.classify(&err)));
}

#[tokio::test]
async fn test_client_error_is_permanent() {
    let (endpoint, _request) = serve_once(400, r#"{"error":"bad prompt"}"#).await;

    let err = HttpGenerator::new(endpoint).generate("x").await.unwrap_err();
    assert!(matches!(
        err.kind(),
        GenerationErrorKind::Http { status_code: 400, message } if message.contains("bad prompt")
    ));

    let classifier = DefaultClassifier::new();
    assert!(!classifier.is_retryable(&classifier.classify(&err)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = HttpGenerator::new(format!("http://{addr}/generate"))
        .generate("x")
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), GenerationErrorKind::Network(_)));
    assert!(err.kind().is_retryable());
}

#[tokio::test]
async fn test_malformed_reply_is_permanent() {
    let (endpoint, _request) = serve_once(200, r#"{"unexpected":true}"#).await;

    let err = HttpGenerator::new(endpoint).generate("x").await.unwrap_err();
    assert!(matches!(err.kind(), GenerationErrorKind::Other(_)));
    assert!(!DefaultClassifier::new().is_transient(&err));
}
