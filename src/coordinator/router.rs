//! Message dispatch.

use serde_json::Value;

use crate::error_handling::{ErrorType, InfoType};
use crate::models::{ConnectionStatus, TabId};
use crate::protocol::{Message, Response};
use crate::storage::save_settings;

use super::Coordinator;

impl Coordinator {
    /// Handles one request and produces its response.
    pub async fn handle(&self, message: Message) -> Response {
        let inner = &self.inner;
        log::trace!("Handling {}", message.tag());

        match message {
            Message::SignalsCollected { tab_id, signals } => {
                if !inner.pending.resolve(tab_id, signals) {
                    log::debug!("Dropping signals for tab {}: no pending collection", tab_id);
                    inner.stats.increment_info(InfoType::LateSignalsDropped);
                }
                Response::success()
            }
            Message::AnalyzePage { tab_id, url } => self.analyze_response(tab_id, &url).await,
            Message::TabUpdated { tab_id, url } => {
                if self.settings().auto_analyze {
                    self.analyze_response(tab_id, &url).await
                } else {
                    Response::success()
                }
            }
            Message::GetCachedResult { domain } => {
                let domain = domain.trim().to_ascii_lowercase();
                Response::Result {
                    result: inner.cache.get(&domain).await.map(|cached| cached.result),
                }
            }
            Message::GetTabResult { tab_id } => Response::Result {
                result: inner.session.get(tab_id),
            },
            Message::GetStatus => Response::Status {
                status: inner.status.snapshot(),
            },
            Message::ClearCache => {
                inner.cache.clear().await;
                Response::success()
            }
            Message::GetSettings => Response::Settings {
                settings: self.settings(),
            },
            Message::UpdateSettings { settings } => {
                if let Err(e) = save_settings(&inner.store, &settings).await {
                    log::error!("Failed to persist settings: {}", e);
                    inner.stats.increment_error(ErrorType::StorageWriteError);
                }
                *inner.settings.lock().unwrap_or_else(|e| e.into_inner()) = settings;
                Response::success()
            }
            Message::GetOfflineQueue => Response::Queue {
                items: inner.queue.list().await,
            },
            Message::RetryOfflineQueue => {
                let connected = inner.backend.is_connected()
                    || self.try_reconnect().await == ConnectionStatus::Connected;
                let (submitted, remaining) = if connected {
                    self.flush_offline_queue().await
                } else {
                    (0, inner.queue.len().await)
                };
                Response::Retry {
                    submitted,
                    remaining,
                }
            }
        }
    }

    async fn analyze_response(&self, tab_id: TabId, url: &str) -> Response {
        match self.analyze_page(tab_id, url).await {
            Ok((result, from_cache)) => Response::Analysis { result, from_cache },
            Err(e) => e.into(),
        }
    }

    /// Handles a raw JSON message.
    ///
    /// Unknown `type` tags get an "unsupported" error; known tags with a
    /// malformed payload get an invalid-payload error.
    pub async fn handle_json(&self, value: Value) -> Response {
        let Some(tag) = value.get("type").and_then(Value::as_str).map(str::to_string) else {
            return Response::invalid_payload("message", "missing \"type\" field");
        };

        if !Message::TAGS.contains(&tag.as_str()) {
            log::debug!("Unsupported message type {}", tag);
            return Response::unsupported(&tag);
        }

        match serde_json::from_value::<Message>(value) {
            Ok(message) => self.handle(message).await,
            Err(e) => Response::invalid_payload(&tag, e),
        }
    }

    /// Parses and handles a JSON message string.
    pub async fn handle_str(&self, raw: &str) -> Response {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => self.handle_json(value).await,
            Err(e) => Response::invalid_payload("message", e),
        }
    }
}
