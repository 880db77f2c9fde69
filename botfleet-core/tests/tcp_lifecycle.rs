//! End-to-end lifecycle tests over loopback TCP

use std::sync::Arc;
use std::time::Duration;

use botfleet_core::transport::TcpTransportFactory;
use botfleet_core::{BotRegistry, RegistryConfig, TransportConfig};
use tokio::net::TcpListener;

fn create_registry() -> Arc<BotRegistry> {
    let factory = Arc::new(TcpTransportFactory::new(TransportConfig {
        connect_timeout_ms: 1_000,
    }));
    BotRegistry::spawn(factory, RegistryConfig::default())
}

async fn wait_until_absent(registry: &BotRegistry, name: &str) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while registry.has_session(name).await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("bot was never removed");
}

#[tokio::test]
async fn server_closing_connection_removes_bot() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let registry = create_registry();

    assert!(registry.add_session("bot1", "127.0.0.1", port).await.unwrap());
    let (server_side, _) = listener.accept().await.unwrap();
    assert!(registry.has_session("bot1").await);

    drop(server_side);

    wait_until_absent(&registry, "bot1").await;
}

#[tokio::test]
async fn remove_session_closes_connection() {
    use tokio::io::AsyncReadExt;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let registry = create_registry();

    registry.add_session("bot1", "127.0.0.1", port).await.unwrap();
    let (mut server_side, _) = listener.accept().await.unwrap();

    assert!(registry.remove_session("bot1").await);
    assert!(!registry.has_session("bot1").await);

    // The server sees EOF once the bot's receive loop shuts down
    let mut buf = [0u8; 16];
    let read = tokio::time::timeout(Duration::from_secs(2), server_side.read(&mut buf))
        .await
        .expect("connection should close");
    assert!(matches!(read, Ok(0) | Err(_)));
}

#[tokio::test]
async fn unreachable_server_is_not_added() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let registry = create_registry();

    assert!(!registry.add_session("bot1", "127.0.0.1", port).await.unwrap());
    assert!(registry.list_names().await.is_empty());
}

#[tokio::test]
async fn server_data_keeps_bot_alive() {
    use tokio::io::AsyncWriteExt;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let registry = create_registry();

    registry.add_session("bot1", "127.0.0.1", port).await.unwrap();
    let (mut server_side, _) = listener.accept().await.unwrap();

    server_side.write_all(b"hello bot").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let session = registry.get_session("bot1").await.unwrap();
    assert!(session.connected());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn instant_close_leaves_no_disconnected_bots() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((server_side, _)) = listener.accept().await {
            drop(server_side);
        }
    });
    let registry = create_registry();

    let mut handles = Vec::new();
    for i in 0..200 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry
                .add_session(&format!("bot-{}", i), "127.0.0.1", port)
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Every connection is closed by the server, so every admitted bot must
    // eventually leave; a disconnected entry that lingers never would.
    let settled = tokio::time::timeout(Duration::from_secs(5), async {
        while registry.session_count().await > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    let stale: Vec<String> = registry
        .list_sessions()
        .await
        .into_iter()
        .filter(|bot| !bot.connected)
        .map(|bot| bot.name)
        .collect();
    assert!(stale.is_empty(), "disconnected bots left registered: {:?}", stale);
    assert!(settled.is_ok(), "bots still registered after every peer closed");
}
