//! Message protocol between the page, Coordinator and UI contexts.
//!
//! Every message is a closed enum keyed by its `type` field. Unknown tags
//! are answered with an "unsupported" error by the router, never dropped.

mod message;
mod notification;
mod response;

pub use message::{CollectorMessage, Message};
pub use notification::Notification;
pub use response::Response;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error_handling::AnalysisError;
    use crate::models::ExtensionStatus;
    use serde_json::json;

    #[test]
    fn test_message_wire_shape() {
        let msg: Message = serde_json::from_value(json!({
            "type": "ANALYZE_PAGE",
            "tabId": 7,
            "url": "https://example.com"
        }))
        .unwrap();
        assert_eq!(
            msg,
            Message::AnalyzePage {
                tab_id: 7,
                url: "https://example.com".into()
            }
        );

        let status: Message = serde_json::from_value(json!({"type": "GET_STATUS"})).unwrap();
        assert_eq!(status, Message::GetStatus);
        assert_eq!(
            serde_json::to_value(Message::ClearCache).unwrap(),
            json!({"type": "CLEAR_CACHE"})
        );
    }

    #[test]
    fn test_tags_cover_every_variant() {
        let samples = [
            Message::AnalyzePage { tab_id: 1, url: String::new() },
            Message::TabUpdated { tab_id: 1, url: String::new() },
            Message::GetCachedResult { domain: String::new() },
            Message::GetTabResult { tab_id: 1 },
            Message::GetStatus,
            Message::ClearCache,
            Message::GetSettings,
            Message::UpdateSettings { settings: Settings::default() },
            Message::GetOfflineQueue,
            Message::RetryOfflineQueue,
        ];
        for msg in samples {
            let value = serde_json::to_value(&msg).unwrap();
            assert_eq!(value["type"], msg.tag());
            assert!(Message::TAGS.contains(&msg.tag()));
        }
    }

    #[test]
    fn test_collector_message_shape() {
        assert_eq!(
            serde_json::to_value(CollectorMessage::CollectSignals { tab_id: 3 }).unwrap(),
            json!({"type": "COLLECT_SIGNALS", "tabId": 3})
        );
    }

    #[test]
    fn test_response_shapes() {
        assert_eq!(
            serde_json::to_value(Response::success()).unwrap(),
            json!({"success": true})
        );
        assert_eq!(
            serde_json::to_value(Response::Result { result: None }).unwrap(),
            json!({"result": null})
        );
        assert_eq!(
            serde_json::to_value(Response::unsupported("FOO")).unwrap(),
            json!({"error": "Unsupported message type: FOO", "retriable": false})
        );
        let status = serde_json::to_value(Response::Status {
            status: ExtensionStatus::default(),
        })
        .unwrap();
        assert_eq!(status["status"]["connectionStatus"], "disconnected");
        assert_eq!(status["status"]["offlineQueueSize"], 0);
    }

    #[test]
    fn test_analysis_errors_carry_retriable_flag() {
        let retriable: Response = AnalysisError::BackendUnavailable {
            queued_id: "q1".into(),
            reason: "offline".into(),
        }
        .into();
        assert!(matches!(retriable, Response::Error { retriable: true, .. }));

        let fatal: Response = AnalysisError::Scoring("bad bundle".into()).into();
        assert!(matches!(fatal, Response::Error { retriable: false, .. }));
    }

    #[test]
    fn test_notification_shape() {
        let value = serde_json::to_value(Notification::SecurityAlert {
            domain: "evil.example".into(),
            trust_score: 12,
        })
        .unwrap();
        assert_eq!(
            value,
            json!({"type": "SECURITY_ALERT", "domain": "evil.example", "trustScore": 12})
        );
    }
}
