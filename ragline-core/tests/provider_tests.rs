use ragline_core::config::LlmConfig;
use ragline_core::provider::{GenerationProvider, OpenAiProvider, ProviderError};
use ragline_core::rag::{Chunk, ChunkMetadata, ContentHash};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves one HTTP response and hands back the raw request it received.
async fn one_shot_server(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
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
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{addr}/v1"), handle)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
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
    raw.len() >= header_end + 4 + content_length
}

fn provider_for(base_url: String) -> OpenAiProvider {
    OpenAiProvider::new(&LlmConfig {
        base_url,
        api_key: Some("sk-test".to_string()),
        timeout_secs: 5,
        ..LlmConfig::default()
    })
    .unwrap()
}

fn contexts() -> Vec<ChunkMetadata> {
    let chunk = Chunk::new("Return Policy", "Returns accepted within 14 days of purchase.")
        .with_section("Timeframe");
    vec![ChunkMetadata::from_chunk(&chunk, &ContentHash::of(&chunk.text))]
}

#[tokio::test]
async fn test_completion_is_returned() {
    let (url, server) = one_shot_server(
        "200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"Returns are accepted within 14 days (Return Policy, Timeframe)."}}]}"#,
    )
    .await;

    let provider = provider_for(url);
    let answer = provider
        .generate("Can I return a blender after 20 days?", &contexts())
        .await
        .unwrap();
    assert!(answer.contains("14 days"));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1/chat/completions"));
    assert!(request.to_lowercase().contains("authorization: bearer sk-test"));
    assert!(request.contains("\"temperature\":0.1"));
    assert!(request.contains("Return Policy | Timeframe"));
}

#[tokio::test]
async fn test_api_error_propagates() {
    let (url, server) = one_shot_server("401 Unauthorized", r#"{"error":"bad key"}"#).await;

    let err = provider_for(url).generate("q", &[]).await.unwrap_err();
    match err {
        ProviderError::Api { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("bad key"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let (url, server) = one_shot_server("200 OK", r#"{"choices":[]}"#).await;

    let err = provider_for(url).generate("q", &[]).await.unwrap_err();
    assert!(matches!(err, ProviderError::EmptyCompletion));
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_service_is_a_request_error() {
    let provider = provider_for("http://127.0.0.1:1/v1".to_string());
    let err = provider.generate("q", &contexts()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Request(_)));
}
