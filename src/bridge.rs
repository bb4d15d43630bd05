//! Message passing between the requester and the page context.
//!
//! The page context is the only side that can read the host's internal
//! state, so the requester cannot call into it. Both sides share a broadcast
//! channel of untyped JSON messages, much like window message passing: the
//! requester posts a tagged request carrying a post id and waits, under a
//! timeout, for a tagged result with the same id. Anything else on the
//! channel is ignored.

use crate::config::{BridgeConfig, Config};
use crate::detail::{detail_from_page, DetailSource, PostDetail};
use crate::error::{ExtractError, Result};
use crate::page::PageSnapshot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio::time::timeout;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeMessage {
    #[serde(rename = "FETCH_TWEET_DATA_FROM_PAGE", rename_all = "camelCase")]
    FetchPost { tweet_id: String },

    #[serde(rename = "TWEET_DATA_RESULT", rename_all = "camelCase")]
    PostResult {
        tweet_id: String,
        success: bool,
        #[serde(default)]
        data: Option<PostDetail>,
        #[serde(default)]
        error: Option<ExtractError>,
    },
}

impl BridgeMessage {
    fn result(tweet_id: &str, outcome: Result<PostDetail>) -> Self {
        let tweet_id = tweet_id.to_string();
        match outcome {
            Ok(detail) => BridgeMessage::PostResult {
                tweet_id,
                success: true,
                data: Some(detail),
                error: None,
            },
            Err(err) => BridgeMessage::PostResult {
                tweet_id,
                success: false,
                data: None,
                error: Some(err),
            },
        }
    }
}

/// Requester end of the channel.
#[derive(Debug, Clone)]
pub struct Bridge {
    sender: broadcast::Sender<Value>,
    timeout: Duration,
}

impl Bridge {
    pub fn new(config: &BridgeConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            timeout: config.timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Value> {
        self.sender.subscribe()
    }

    /// Posts a raw message to every listener.
    pub fn post(&self, message: Value) {
        if self.sender.send(message).is_err() {
            tracing::debug!("message posted with no listeners");
        }
    }

    fn send(&self, message: &BridgeMessage) -> Result<()> {
        self.post(serde_json::to_value(message)?);
        Ok(())
    }

    /// Starts a page context answering post requests from `snapshot`.
    pub fn attach_page(&self, snapshot: PageSnapshot, config: Config) -> PageContext {
        let mut receiver = self.subscribe();
        let bridge = self.clone();

        let handle = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => {
                        let Ok(BridgeMessage::FetchPost { tweet_id }) =
                            serde_json::from_value::<BridgeMessage>(message)
                        else {
                            continue;
                        };
                        tracing::debug!(%tweet_id, "page context received post request");
                        let outcome = detail_from_page(&snapshot, &tweet_id, &config);
                        if let Err(err) = &outcome {
                            tracing::warn!(%tweet_id, error = %err, "page context could not read post");
                        }
                        if let Err(err) = bridge.send(&BridgeMessage::result(&tweet_id, outcome)) {
                            tracing::warn!(error = %err, "failed to encode post result");
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "page context lagged, requests may be missed");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        PageContext { handle }
    }

    /// Requests detailed data for one post and waits for the matching result.
    pub async fn request_post(&self, post_id: &str) -> Result<PostDetail> {
        // subscribe before sending so the reply cannot be missed
        let mut receiver = self.subscribe();
        self.send(&BridgeMessage::FetchPost {
            tweet_id: post_id.to_string(),
        })?;

        let wait = async {
            loop {
                match receiver.recv().await {
                    Ok(message) => {
                        let Ok(BridgeMessage::PostResult {
                            tweet_id,
                            success,
                            data,
                            error,
                        }) = serde_json::from_value::<BridgeMessage>(message)
                        else {
                            continue;
                        };
                        if tweet_id != post_id {
                            continue;
                        }
                        return match (success, data) {
                            (true, Some(detail)) => Ok(detail),
                            _ => Err(error.unwrap_or_else(|| ExtractError::EmptyResponse {
                                post_id: post_id.to_string(),
                            })),
                        };
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "request receiver lagged, messages may be missed");
                    }
                    Err(RecvError::Closed) => return Err(ExtractError::ChannelClosed),
                }
            }
        };

        match timeout(self.timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(ExtractError::FetchTimeout {
                post_id: post_id.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

#[async_trait]
impl DetailSource for Bridge {
    async fn fetch_post(&self, post_id: &str) -> Result<PostDetail> {
        self.request_post(post_id).await
    }
}

/// A running page context. Dropping it stops the context.
#[derive(Debug)]
pub struct PageContext {
    handle: JoinHandle<()>,
}

impl Drop for PageContext {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
