//! Concurrency tests for BotRegistry
//!
//! These tests validate that the single map lock keeps the registry
//! consistent under concurrent callers:
//! - Concurrent adds and removes leave exactly the expected set of bots
//! - A slow connect does not block lookups or listing
//! - Exit hooks fired from foreign threads are all processed

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use botfleet_core::transport::MockTransportFactory;
use botfleet_core::{BotRegistry, RegistryConfig};

fn create_registry(
    factory: MockTransportFactory,
) -> (Arc<BotRegistry>, Arc<MockTransportFactory>) {
    let factory = Arc::new(factory);
    let registry = BotRegistry::spawn(factory.clone(), RegistryConfig::default());
    (registry, factory)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_and_removes_leave_expected_set() {
    let (registry, _) = create_registry(MockTransportFactory::new());

    let doomed: Vec<String> = (0..20).map(|i| format!("old-{}", i)).collect();
    for name in &doomed {
        assert!(registry.add_session(name, "localhost", 25565).await.unwrap());
    }

    let fresh: Vec<String> = (0..30).map(|i| format!("new-{}", i)).collect();
    let mut handles = Vec::new();

    for name in fresh.clone() {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            assert!(registry.add_session(&name, "localhost", 25565).await.unwrap());
        }));
    }
    for name in doomed.clone() {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            assert!(registry.remove_session(&name).await);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    // Let exit events from the removed bots drain through the supervisor
    tokio::time::sleep(Duration::from_millis(50)).await;

    let names = registry.list_names().await;
    let unique: HashSet<_> = names.iter().cloned().collect();
    let expected: HashSet<_> = fresh.into_iter().collect();

    assert_eq!(names.len(), unique.len(), "duplicate names in {:?}", names);
    assert_eq!(unique, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_of_same_name_keep_one_entry() {
    let (registry, _) = create_registry(MockTransportFactory::new());
    let mut handles = Vec::new();

    for i in 0..10 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry
                .add_session("shared", &format!("host-{}", i), 25565)
                .await
                .unwrap()
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap());
    }

    assert_eq!(registry.list_names().await, vec!["shared".to_string()]);
    assert_eq!(registry.session_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_exit_hooks_remove_every_bot() {
    let (registry, factory) = create_registry(MockTransportFactory::new());
    let names: Vec<String> = (0..25).map(|i| format!("bot-{}", i)).collect();
    for name in &names {
        registry.add_session(name, "localhost", 25565).await.unwrap();
    }

    let mut handles = Vec::new();
    for name in &names {
        let hooks = factory.hooks(name).unwrap();
        handles.push(std::thread::spawn(move || hooks.on_exit()));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    tokio::time::timeout(Duration::from_secs(2), async {
        while registry.session_count().await > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("all bots should be removed");
}

#[tokio::test]
async fn lookups_proceed_while_add_is_connecting() {
    let (registry, _) = create_registry(
        MockTransportFactory::new().with_connect_delay(Duration::from_millis(200)),
    );

    let adder = Arc::clone(&registry);
    let add = tokio::spawn(async move { adder.add_session("slow", "localhost", 25565).await });

    // Give the add time to start connecting
    tokio::time::sleep(Duration::from_millis(20)).await;

    let start = Instant::now();
    assert!(!registry.has_session("slow").await);
    assert!(registry.list_names().await.is_empty());
    assert!(
        start.elapsed() < Duration::from_millis(50),
        "lookups blocked for {:?}",
        start.elapsed()
    );

    assert!(add.await.unwrap().unwrap());
    assert!(registry.has_session("slow").await);
}
