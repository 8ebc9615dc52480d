use alloy_primitives::U256;
use core_logic::ContextProvider;
use merak_bot::{MerakConfig, SuiKeypair, SuiSessionProvider};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Answers a single JSON-RPC request with `result`, then closes.
async fn serve_once(result: serde_json::Value) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request_complete(&request) {
                break;
            }
        }

        let body = json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
    });

    format!("http://{}", addr)
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

fn provider(rpc_url: &str, wrap_mist: u64) -> SuiSessionProvider {
    let mut config = MerakConfig::default();
    config.rpc_url = Some(rpc_url.to_string());
    config.wrap.amount = U256::from(wrap_mist);
    SuiSessionProvider::new(Arc::new(config))
}

fn keypair() -> SuiKeypair {
    SuiKeypair::from_secret(&[9u8; 32])
}

#[tokio::test]
async fn test_preflight_continues_when_balance_lookup_fails() {
    // Nothing listens on port 1.
    let provider = provider("http://127.0.0.1:1", 100_000_000);
    let ctx = provider.connect(&keypair(), None).await.unwrap();

    assert!(provider.preflight(&ctx).await.unwrap());
}

#[tokio::test]
async fn test_preflight_skips_wallet_below_wrap_amount() {
    let url = serve_once(json!({
        "coinType": "0x2::sui::SUI",
        "coinObjectCount": 1,
        "totalBalance": "99999999",
        "lockedBalance": {}
    }))
    .await;
    let provider = provider(&url, 100_000_000);
    let ctx = provider.connect(&keypair(), None).await.unwrap();

    assert!(!provider.preflight(&ctx).await.unwrap());
}

#[tokio::test]
async fn test_preflight_passes_with_enough_balance() {
    let url = serve_once(json!({
        "coinType": "0x2::sui::SUI",
        "coinObjectCount": 2,
        "totalBalance": "100000000",
        "lockedBalance": {}
    }))
    .await;
    let provider = provider(&url, 100_000_000);
    let ctx = provider.connect(&keypair(), None).await.unwrap();

    assert!(provider.preflight(&ctx).await.unwrap());
}

#[tokio::test]
async fn test_preflight_disabled_never_queries() {
    let mut config = MerakConfig::default();
    config.rpc_url = Some("http://127.0.0.1:1".to_string());
    config.run.check_balance_before_transactions = false;
    config.wrap.amount = U256::MAX;
    let provider = SuiSessionProvider::new(Arc::new(config));
    let ctx = provider.connect(&keypair(), None).await.unwrap();

    assert!(provider.preflight(&ctx).await.unwrap());
}
