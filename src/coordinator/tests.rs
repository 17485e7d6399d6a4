// Coordinator tests.
//
// These run on real time with short timeouts: the document store talks to a
// SQLite worker thread, which does not mix with a paused tokio clock.

use super::*;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::sync::mpsc;

use crate::backend::SimulatedBackend;
use crate::error_handling::{ErrorType, InfoType};
use crate::config::REQUIRED_SECURITY_HEADERS;
use crate::models::{
    AnalysisResult, CookieSignals, ExplanationStatus, FingerprintSignals, FingerprintTechnique,
    HeaderSignals, SignalBundle, Verdict,
};
use crate::protocol::{CollectorMessage, Message, Notification, Response};
use crate::storage::init_store_pool;
use crate::utils::ManualClock;

async fn memory_store() -> DocumentStore {
    DocumentStore::new(init_store_pool(None).await.unwrap())
}

fn fast_config() -> Config {
    Config {
        collection_timeout: Duration::from_millis(100),
        backend_timeout: Duration::from_secs(2),
        explanation_timeout: Duration::from_secs(2),
        ..Config::default()
    }
}

fn clean_bundle(url: &str, domain: &str) -> SignalBundle {
    let mut bundle = SignalBundle::empty(url, domain, Utc::now());
    bundle.ssl.valid = url.starts_with("https://");
    bundle.headers = HeaderSignals {
        present: REQUIRED_SECURITY_HEADERS.iter().map(|h| h.to_string()).collect(),
        missing: vec![],
        issues: vec![],
    };
    bundle
}

fn hostile_bundle(url: &str, domain: &str) -> SignalBundle {
    let mut bundle = SignalBundle::empty(url, domain, Utc::now());
    bundle.cookies = CookieSignals {
        total: 40,
        first_party: 0,
        third_party: 40,
        ..Default::default()
    };
    bundle.trackers.detected = (0..12).map(|i| format!("tracker-{i}")).collect();
    bundle.fingerprinting = FingerprintSignals::from_techniques(vec![
        FingerprintTechnique::Canvas,
        FingerprintTechnique::Webgl,
        FingerprintTechnique::Audio,
    ]);
    bundle.headers = HeaderSignals {
        present: vec![],
        missing: REQUIRED_SECURITY_HEADERS.iter().map(|h| h.to_string()).collect(),
        issues: (0..8).map(|i| format!("unsafe directive {i}")).collect(),
    };
    bundle
}

/// Answers every `COLLECT_SIGNALS` with whatever `make` builds for the tab.
fn spawn_responder<F>(
    coordinator: Coordinator,
    mut rx: mpsc::Receiver<CollectorMessage>,
    make: F,
) -> tokio::task::JoinHandle<()>
where
    F: Fn(TabId) -> SignalBundle + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(CollectorMessage::CollectSignals { tab_id }) = rx.recv().await {
            let signals = make(tab_id);
            coordinator
                .handle(Message::SignalsCollected { tab_id, signals })
                .await;
        }
    })
}

async fn local_coordinator() -> (Coordinator, mpsc::Receiver<CollectorMessage>) {
    Coordinator::builder(memory_store().await)
        .config(&fast_config())
        .build()
        .await
}

fn drain(rx: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut seen = Vec::new();
    while let Ok(n) = rx.try_recv() {
        seen.push(n);
    }
    seen
}

fn published_results(notifications: &[Notification]) -> Vec<(AnalysisResult, bool)> {
    notifications
        .iter()
        .filter_map(|n| match n {
            Notification::AnalysisResult { result, from_cache } => {
                Some((result.clone(), *from_cache))
            }
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_startup_connects_local_backend() {
    let (coordinator, _rx) = local_coordinator().await;
    let status = coordinator.status();
    assert_eq!(status.connection_status, ConnectionStatus::Connected);
    assert!(status.is_authenticated);
    assert_eq!(status.pending_analyses, 0);
    assert_eq!(status.offline_queue_size, 0);
}

#[tokio::test]
async fn test_analysis_then_cache_hit() {
    let (coordinator, rx) = local_coordinator().await;
    let responder = spawn_responder(coordinator.clone(), rx, |_| {
        clean_bundle("https://shop.example/cart", "shop.example")
    });

    let (first, from_cache) = coordinator
        .analyze_page(1, "https://shop.example/cart")
        .await
        .unwrap();
    assert!(!from_cache);
    assert_eq!(first.domain, "shop.example");
    assert_eq!(first.verdict, Verdict::Safe);

    let (second, from_cache) = coordinator
        .analyze_page(2, "https://SHOP.example/other")
        .await
        .unwrap();
    assert!(from_cache);
    assert_eq!(second.id, first.id);
    assert_eq!(coordinator.phase(2), AnalysisPhase::Done);

    // Both tabs hold the result in the session map
    for tab in [1, 2] {
        match coordinator.handle(Message::GetTabResult { tab_id: tab }).await {
            Response::Result { result: Some(r) } => assert_eq!(r.id, first.id),
            other => panic!("unexpected response {other:?}"),
        }
    }

    assert_eq!(coordinator.status().pending_analyses, 0);
    assert_eq!(coordinator.stats().get_info_count(InfoType::CacheHit), 1);
    responder.abort();
}

#[tokio::test]
async fn test_collection_timeout_falls_back_without_dangling_waiter() {
    let (coordinator, _rx) = local_coordinator().await;

    let (result, from_cache) = coordinator
        .analyze_page(3, "https://quiet.example/")
        .await
        .unwrap();
    assert!(!from_cache);
    // TLS-only fallback: nothing observed, headers unavailable
    assert!(result.signals.ssl.valid);
    assert_eq!(result.signals.cookies.total, 0);
    assert!(result.signals.trackers.detected.is_empty());
    assert!(!coordinator.is_collecting(3));
    assert_eq!(
        coordinator.stats().get_error_count(ErrorType::CollectionTimeout),
        1
    );

    // Signals arriving after the timeout are a no-op
    let late = coordinator
        .handle(Message::SignalsCollected {
            tab_id: 3,
            signals: clean_bundle("https://quiet.example/", "quiet.example"),
        })
        .await;
    assert_eq!(late, Response::success());
    assert_eq!(
        coordinator.stats().get_info_count(InfoType::LateSignalsDropped),
        1
    );
    assert_eq!(coordinator.status().pending_analyses, 0);
}

#[tokio::test]
async fn test_unreachable_page_context_falls_back() {
    let (coordinator, rx) = local_coordinator().await;
    drop(rx);

    let (result, _) = coordinator
        .analyze_page(4, "http://plain.example/")
        .await
        .unwrap();
    assert!(!result.signals.ssl.valid);
    assert_eq!(result.scores.ssl, 30);
    assert_eq!(
        coordinator.stats().get_error_count(ErrorType::CollectionUnreachable),
        1
    );
    assert!(!coordinator.is_collecting(4));
}

#[tokio::test]
async fn test_invalid_url_is_rejected() {
    let (coordinator, _rx) = local_coordinator().await;
    let response = coordinator
        .handle(Message::AnalyzePage {
            tab_id: 5,
            url: "chrome://settings".to_string(),
        })
        .await;
    match response {
        Response::Error { retriable, .. } => assert!(!retriable),
        other => panic!("unexpected response {other:?}"),
    }
    assert_eq!(coordinator.phase(5), AnalysisPhase::Idle);
}

#[tokio::test]
async fn test_danger_verdict_raises_security_alert() {
    let (coordinator, rx) = local_coordinator().await;
    let mut notifications = coordinator.subscribe();
    let responder = spawn_responder(coordinator.clone(), rx, |_| {
        hostile_bundle("http://shady.example/", "shady.example")
    });

    let (result, _) = coordinator
        .analyze_page(6, "http://shady.example/")
        .await
        .unwrap();
    assert_eq!(result.verdict, Verdict::Danger);

    let alert = drain(&mut notifications).into_iter().find_map(|n| match n {
        Notification::SecurityAlert {
            domain,
            trust_score,
        } => Some((domain, trust_score)),
        _ => None,
    });
    assert_eq!(alert, Some(("shady.example".to_string(), result.trust_score)));
    responder.abort();
}

#[tokio::test]
async fn test_security_alert_respects_notification_setting() {
    let (coordinator, rx) = local_coordinator().await;
    let responder = spawn_responder(coordinator.clone(), rx, |_| {
        hostile_bundle("http://shady.example/", "shady.example")
    });
    let settings = Settings {
        notifications: false,
        ..Settings::default()
    };
    coordinator
        .handle(Message::UpdateSettings { settings })
        .await;

    let mut notifications = coordinator.subscribe();
    coordinator
        .analyze_page(7, "http://shady.example/")
        .await
        .unwrap();
    assert!(!drain(&mut notifications)
        .iter()
        .any(|n| matches!(n, Notification::SecurityAlert { .. })));
    responder.abort();
}

#[tokio::test]
async fn test_explanation_is_republished() {
    let (coordinator, rx) = local_coordinator().await;
    let mut notifications = coordinator.subscribe();
    let responder = spawn_responder(coordinator.clone(), rx, |_| {
        clean_bundle("https://docs.example/", "docs.example")
    });

    let (result, _) = coordinator
        .analyze_page(8, "https://docs.example/")
        .await
        .unwrap();
    assert_eq!(result.explanation.status, ExplanationStatus::Pending);

    coordinator.wait_for_background().await;
    assert_eq!(coordinator.phase(8), AnalysisPhase::Done);

    let published = published_results(&drain(&mut notifications));
    assert_eq!(published.len(), 2);
    let (enriched, from_cache) = &published[1];
    assert!(!from_cache);
    assert_eq!(enriched.id, result.id);
    assert_eq!(enriched.explanation.status, ExplanationStatus::Complete);
    assert!(enriched.explanation.text.is_some());

    match coordinator
        .handle(Message::GetCachedResult {
            domain: "docs.example".to_string(),
        })
        .await
    {
        Response::Result { result: Some(r) } => {
            assert_eq!(r.explanation.status, ExplanationStatus::Complete)
        }
        other => panic!("unexpected response {other:?}"),
    }
    responder.abort();
}

#[tokio::test]
async fn test_explanation_after_cache_clear_is_dropped() {
    let (coordinator, rx) = Coordinator::builder(memory_store().await)
        .config(&fast_config())
        .explainer(Arc::new(TemplateExplainer::with_delay(Duration::from_millis(
            150,
        ))))
        .build()
        .await;
    let responder = spawn_responder(coordinator.clone(), rx, |_| {
        clean_bundle("https://gone.example/", "gone.example")
    });

    let (result, _) = coordinator
        .analyze_page(9, "https://gone.example/")
        .await
        .unwrap();
    let mut notifications = coordinator.subscribe();
    assert_eq!(coordinator.handle(Message::ClearCache).await, Response::success());

    coordinator.wait_for_background().await;

    assert!(published_results(&drain(&mut notifications)).is_empty());
    match coordinator.handle(Message::GetTabResult { tab_id: 9 }).await {
        Response::Result { result: Some(r) } => {
            assert_eq!(r.id, result.id);
            assert_eq!(r.explanation.status, ExplanationStatus::Pending);
        }
        other => panic!("unexpected response {other:?}"),
    }
    responder.abort();
}

#[tokio::test]
async fn test_backend_outage_queues_then_flushes() {
    let clock = Arc::new(ManualClock::default());
    let backend = Arc::new(SimulatedBackend::new(clock.clone(), Duration::ZERO));
    let (coordinator, rx) = Coordinator::builder(memory_store().await)
        .config(&fast_config())
        .clock(clock)
        .backend(backend.clone())
        .build()
        .await;
    let responder = spawn_responder(coordinator.clone(), rx, |_| {
        clean_bundle("https://later.example/", "later.example")
    });
    assert_eq!(coordinator.status().connection_status, ConnectionStatus::Connected);

    backend.set_reachable(false);
    let response = coordinator
        .handle(Message::AnalyzePage {
            tab_id: 10,
            url: "https://later.example/".to_string(),
        })
        .await;
    match response {
        Response::Error { retriable, error } => {
            assert!(retriable);
            assert!(error.contains("Backend not available"));
        }
        other => panic!("unexpected response {other:?}"),
    }

    let status = coordinator.status();
    assert_eq!(status.offline_queue_size, 1);
    assert_eq!(status.connection_status, ConnectionStatus::Offline);
    assert_eq!(status.pending_analyses, 0);
    assert_eq!(coordinator.phase(10), AnalysisPhase::Idle);

    match coordinator.handle(Message::GetOfflineQueue).await {
        Response::Queue { items } => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].signals.domain, "later.example");
        }
        other => panic!("unexpected response {other:?}"),
    }

    backend.set_reachable(true);
    let retry = coordinator.handle(Message::RetryOfflineQueue).await;
    assert_eq!(
        retry,
        Response::Retry {
            submitted: 1,
            remaining: 0
        }
    );
    assert_eq!(coordinator.status().offline_queue_size, 0);
    assert_eq!(coordinator.status().connection_status, ConnectionStatus::Connected);

    match coordinator
        .handle(Message::GetCachedResult {
            domain: "later.example".to_string(),
        })
        .await
    {
        Response::Result { result: Some(r) } => assert_eq!(r.domain, "later.example"),
        other => panic!("unexpected response {other:?}"),
    }

    // Resubmitted results get explained like live ones
    coordinator.wait_for_background().await;
    match coordinator
        .handle(Message::GetCachedResult {
            domain: "later.example".to_string(),
        })
        .await
    {
        Response::Result { result: Some(r) } => {
            assert_eq!(r.explanation.status, ExplanationStatus::Complete);
            assert!(r.explanation.text.is_some());
        }
        other => panic!("unexpected response {other:?}"),
    }
    responder.abort();
}

#[tokio::test]
async fn test_concurrent_requests_each_get_their_own_result() {
    let (coordinator, rx) = local_coordinator().await;
    let responder = spawn_responder(coordinator.clone(), rx, |tab| {
        clean_bundle(&format!("https://tab{tab}.example/"), &format!("tab{tab}.example"))
    });

    let (a, b) = tokio::join!(
        coordinator.analyze_page(21, "https://tab21.example/"),
        coordinator.analyze_page(22, "https://tab22.example/"),
    );
    let (a, _) = a.unwrap();
    let (b, _) = b.unwrap();
    assert_eq!(a.domain, "tab21.example");
    assert_eq!(b.domain, "tab22.example");
    assert_eq!(coordinator.status().pending_analyses, 0);
    responder.abort();
}

#[tokio::test]
async fn test_concurrent_requests_for_one_domain_keep_their_own_results() {
    let (coordinator, rx) = local_coordinator().await;
    let mut notifications = coordinator.subscribe();
    let responder = spawn_responder(coordinator.clone(), rx, |_| {
        clean_bundle("https://same.example/", "same.example")
    });

    let (a, b) = tokio::join!(
        coordinator.analyze_page(31, "https://same.example/"),
        coordinator.analyze_page(32, "https://same.example/page"),
    );
    let (a, a_cached) = a.unwrap();
    let (b, b_cached) = b.unwrap();
    assert!(!a_cached && !b_cached);
    assert_ne!(a.id, b.id);

    // Each tab holds the result its own request computed
    for (tab, id) in [(31, &a.id), (32, &b.id)] {
        match coordinator.handle(Message::GetTabResult { tab_id: tab }).await {
            Response::Result { result: Some(r) } => assert_eq!(&r.id, id),
            other => panic!("unexpected response {other:?}"),
        }
    }

    coordinator.wait_for_background().await;
    let published: Vec<String> = published_results(&drain(&mut notifications))
        .into_iter()
        .filter(|(r, from_cache)| !from_cache && r.explanation.status == ExplanationStatus::Pending)
        .map(|(r, _)| r.id)
        .collect();
    assert_eq!(published.len(), 2);
    assert!(published.contains(&a.id) && published.contains(&b.id));

    // Last write wins: one entry, holding one of the two results
    let entries = coordinator.inner.cache.entries().await;
    assert_eq!(entries.len(), 1);
    let (domain, cached) = &entries[0];
    assert_eq!(domain, "same.example");
    assert!(cached.result.id == a.id || cached.result.id == b.id);
    assert_eq!(coordinator.status().pending_analyses, 0);
    responder.abort();
}

#[tokio::test]
async fn test_signals_for_another_domain_are_not_cached_under_the_request() {
    let (coordinator, rx) = local_coordinator().await;
    let responder = spawn_responder(coordinator.clone(), rx, |_| {
        hostile_bundle("https://b.example/", "b.example")
    });

    let (result, from_cache) = coordinator
        .analyze_page(41, "https://a.example/")
        .await
        .unwrap();
    assert!(!from_cache);
    assert_eq!(result.domain, "a.example");
    // The foreign bundle is replaced by the TLS-only fallback
    assert!(result.signals.trackers.detected.is_empty());
    assert_eq!(result.signals.cookies.total, 0);
    assert_eq!(
        coordinator.stats().get_error_count(ErrorType::CollectionMismatch),
        1
    );

    coordinator.wait_for_background().await;
    let entries = coordinator.inner.cache.entries().await;
    assert_eq!(entries.len(), 1);
    let (domain, cached) = &entries[0];
    assert_eq!(domain, "a.example");
    assert_eq!(cached.result.id, result.id);
    assert_eq!(cached.result.domain, "a.example");
    assert_eq!(cached.result.explanation.status, ExplanationStatus::Complete);
    responder.abort();
}

#[tokio::test]
async fn test_overflowing_cookie_counts_fail_the_request() {
    let (coordinator, rx) = local_coordinator().await;
    let responder = spawn_responder(coordinator.clone(), rx, |_| {
        let mut bundle = clean_bundle("https://big.example/", "big.example");
        bundle.cookies = CookieSignals {
            total: 0,
            first_party: u32::MAX,
            third_party: 1,
            ..Default::default()
        };
        bundle
    });

    let response = coordinator
        .handle(Message::AnalyzePage {
            tab_id: 42,
            url: "https://big.example/".to_string(),
        })
        .await;
    assert!(matches!(response, Response::Error { retriable: false, .. }));
    assert_eq!(coordinator.phase(42), AnalysisPhase::Idle);
    assert_eq!(coordinator.status().pending_analyses, 0);
    assert_eq!(coordinator.status().offline_queue_size, 0);
    responder.abort();
}

#[tokio::test]
async fn test_tab_updated_respects_auto_analyze() {
    let (coordinator, _rx) = local_coordinator().await;
    let settings = Settings {
        auto_analyze: false,
        cache_expiration_hours: 6,
        ..Settings::default()
    };
    assert_eq!(
        coordinator
            .handle(Message::UpdateSettings {
                settings: settings.clone()
            })
            .await,
        Response::success()
    );

    let response = coordinator
        .handle(Message::TabUpdated {
            tab_id: 30,
            url: "https://idle.example/".to_string(),
        })
        .await;
    assert_eq!(response, Response::success());
    assert_eq!(
        coordinator.handle(Message::GetTabResult { tab_id: 30 }).await,
        Response::Result { result: None }
    );
    assert_eq!(
        coordinator.handle(Message::GetSettings).await,
        Response::Settings { settings }
    );
}

#[tokio::test]
async fn test_settings_survive_restart() {
    let store = memory_store().await;
    let (coordinator, _rx) = Coordinator::builder(store.clone())
        .config(&fast_config())
        .build()
        .await;
    let settings = Settings {
        notifications: false,
        ..Settings::default()
    };
    coordinator
        .handle(Message::UpdateSettings {
            settings: settings.clone(),
        })
        .await;

    let (restarted, _rx) = Coordinator::builder(store)
        .config(&fast_config())
        .build()
        .await;
    assert_eq!(restarted.settings(), settings);
}

#[tokio::test]
async fn test_router_rejects_unknown_and_malformed_messages() {
    let (coordinator, _rx) = local_coordinator().await;

    let unsupported = coordinator.handle_json(json!({"type": "OPEN_DASHBOARD"})).await;
    assert_eq!(
        unsupported,
        Response::Error {
            error: "Unsupported message type: OPEN_DASHBOARD".to_string(),
            retriable: false
        }
    );

    let malformed = coordinator
        .handle_json(json!({"type": "ANALYZE_PAGE", "tabId": "seven"}))
        .await;
    match malformed {
        Response::Error { error, retriable } => {
            assert!(error.starts_with("Invalid payload for ANALYZE_PAGE"));
            assert!(!retriable);
        }
        other => panic!("unexpected response {other:?}"),
    }

    assert!(coordinator.handle_json(json!({"tabId": 1})).await.is_error());
    assert!(coordinator.handle_str("{not json").await.is_error());

    // Collection requests flow the other way and are not accepted here
    assert!(coordinator
        .handle_json(json!({"type": "COLLECT_SIGNALS", "tabId": 1}))
        .await
        .is_error());
}

#[tokio::test]
async fn test_router_status_round_trip() {
    let (coordinator, _rx) = local_coordinator().await;
    let response = coordinator.handle_str(r#"{"type":"GET_STATUS"}"#).await;
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["status"]["connectionStatus"], "connected");
    assert_eq!(value["status"]["pendingAnalyses"], 0);
}

#[tokio::test]
async fn test_status_updates_are_broadcast() {
    let (coordinator, rx) = local_coordinator().await;
    let mut notifications = coordinator.subscribe();
    let responder = spawn_responder(coordinator.clone(), rx, |_| {
        clean_bundle("https://busy.example/", "busy.example")
    });

    coordinator
        .analyze_page(40, "https://busy.example/")
        .await
        .unwrap();

    let pending: Vec<u32> = drain(&mut notifications)
        .into_iter()
        .filter_map(|n| match n {
            Notification::StatusUpdate { status } => Some(status.pending_analyses),
            _ => None,
        })
        .collect();
    assert_eq!(pending, vec![1, 0]);
    responder.abort();
}
