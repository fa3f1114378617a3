//! Conversation session
//!
//! Owns the running history and drives one request per user turn through the
//! provider manager.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::ai::client::CallOptions;
use crate::ai::manager::ProviderManager;
use crate::ai::types::ChatMessage;
use crate::error::{ArchitectError, Result};

/// What happens to the user turn when no reply arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailedTurnPolicy {
    /// Leave the unanswered user turn in history
    #[default]
    Keep,
    /// Remove the unanswered user turn
    Rollback,
}

pub struct ChatSession {
    providers: Arc<ProviderManager>,
    history: Mutex<Vec<ChatMessage>>,
    policy: FailedTurnPolicy,
}

impl ChatSession {
    pub fn new(providers: Arc<ProviderManager>) -> Self {
        Self {
            providers,
            history: Mutex::new(Vec::new()),
            policy: FailedTurnPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailedTurnPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn providers(&self) -> &Arc<ProviderManager> {
        &self.providers
    }

    /// Send one user turn and return the assistant's reply.
    ///
    /// The user turn is appended before the request. Any failure is logged and
    /// surfaced as the generic [`ArchitectError::ChatFailure`].
    pub async fn send_message(&self, text: &str) -> Result<String> {
        let turn = ChatMessage::user(text);
        let snapshot = {
            let mut history = self.history.lock();
            history.push(turn.clone());
            history.clone()
        };

        let adapter = self.providers.current_provider();
        debug!(
            "Sending turn to {} with {} messages of history",
            adapter.name(),
            snapshot.len()
        );

        match adapter
            .call_api(text, &CallOptions::with_history(snapshot))
            .await
        {
            Ok(reply) => {
                self.history.lock().push(ChatMessage::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                error!("Chat turn via {} failed: {:?}", adapter.name(), e);
                if self.policy == FailedTurnPolicy::Rollback {
                    let mut history = self.history.lock();
                    if let Some(pos) = history.iter().rposition(|m| *m == turn) {
                        history.remove(pos);
                    }
                }
                Err(ArchitectError::chat_failure())
            }
        }
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    /// Copy of the current history
    pub fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().clone()
    }
}
