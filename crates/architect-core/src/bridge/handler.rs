//! Dispatch of webview messages onto the chat session

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, warn};

use super::protocol::{
    InboundMessage, OutboundMessage, ANALYZE_FILE_FAILED, EXECUTE_COMMAND_FAILED,
    SEND_MESSAGE_FAILED,
};
use crate::constants;
use crate::error::Result;
use crate::session::ChatSession;

/// Runs a shell command on the user's behalf (e.g. in a visible terminal)
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str) -> Result<()>;
}

pub struct MessageHandler {
    session: Arc<ChatSession>,
    runner: Arc<dyn CommandRunner>,
}

impl MessageHandler {
    pub fn new(session: Arc<ChatSession>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { session, runner }
    }

    pub fn session(&self) -> &Arc<ChatSession> {
        &self.session
    }

    /// Handle one inbound message. `None` means nothing is sent back.
    pub async fn handle(&self, message: InboundMessage) -> Option<OutboundMessage> {
        match message {
            InboundMessage::SendMessage { message } => {
                Some(match self.session.send_message(&message).await {
                    Ok(reply) => OutboundMessage::Response { message: reply },
                    Err(_) => OutboundMessage::error(SEND_MESSAGE_FAILED),
                })
            }
            InboundMessage::ExecuteCommand { command } => {
                match self.runner.run(&command).await {
                    Ok(()) => None,
                    Err(e) => {
                        error!("Command {:?} failed: {}", command, e);
                        Some(OutboundMessage::error(EXECUTE_COMMAND_FAILED))
                    }
                }
            }
            InboundMessage::AnalyzeFile { file_path } => Some(
                match self.analyze_file(Path::new(&file_path)).await {
                    Ok(analysis) => OutboundMessage::FileAnalysis { analysis },
                    Err(e) => {
                        error!("Analysis of {} failed: {}", file_path, e);
                        OutboundMessage::error(ANALYZE_FILE_FAILED)
                    }
                },
            ),
            InboundMessage::Unknown => {
                debug!("Ignoring unknown webview message");
                None
            }
        }
    }

    /// Read `path` and ask the current provider to analyze it
    pub async fn analyze_file(&self, path: &Path) -> Result<String> {
        let content = tokio::fs::read_to_string(path).await?;
        self.session
            .send_message(&format!("{}{}", constants::ai::ANALYZE_PROMPT, content))
            .await
    }

    /// Handle one JSON-encoded message and return the JSON reply, if any
    pub async fn handle_json(&self, line: &str) -> Option<String> {
        let message = match serde_json::from_str::<InboundMessage>(line) {
            Ok(m) => m,
            Err(e) => {
                warn!("Malformed webview message: {}", e);
                return None;
            }
        };
        let reply = self.handle(message).await?;
        match serde_json::to_string(&reply) {
            Ok(json) => Some(json),
            Err(e) => {
                error!("Failed to encode reply: {}", e);
                None
            }
        }
    }

    /// Serve newline-delimited JSON until `reader` reaches EOF
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(reply) = self.handle_json(&line).await {
                writer.write_all(reply.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        debug!("Bridge input closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::adapter::mock::MockProvider;
    use crate::ai::adapter::ProviderAdapter;
    use crate::ai::manager::ProviderManager;
    use crate::ai::providers::ProviderId;
    use crate::error::ArchitectError;
    use crate::storage::{CredentialSource, CredentialStore, SecretStore};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingRunner {
        commands: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, command: &str) -> Result<()> {
            self.commands.lock().push(command.to_string());
            if self.fail {
                return Err(ArchitectError::Validation("no terminal".to_string()));
            }
            Ok(())
        }
    }

    fn handler(
        provider: MockProvider,
        runner: RecordingRunner,
    ) -> (MessageHandler, Arc<MockProvider>, Arc<RecordingRunner>) {
        let mut store = CredentialStore::default();
        store.set(ProviderId::OpenAI, "k".to_string());
        let secrets = Arc::new(SecretStore::in_memory(store));
        let credentials: Arc<dyn CredentialSource> = secrets.clone();

        let provider = Arc::new(provider);
        let registry: Vec<Arc<dyn ProviderAdapter>> = vec![provider.clone()];
        let manager = ProviderManager::new(registry, credentials, secrets)
            .unwrap()
            .with_default_provider("openai");
        let session = Arc::new(ChatSession::new(Arc::new(manager)));
        let runner = Arc::new(runner);
        (
            MessageHandler::new(session, runner.clone()),
            provider,
            runner,
        )
    }

    #[tokio::test]
    async fn test_send_message_replies() {
        let (handler, _, _) = handler(
            MockProvider::replying(ProviderId::OpenAI, "hello back"),
            RecordingRunner::default(),
        );
        let reply = handler
            .handle(InboundMessage::SendMessage {
                message: "hi".to_string(),
            })
            .await;
        assert_eq!(
            reply,
            Some(OutboundMessage::Response {
                message: "hello back".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_send_message_failure_is_generic() {
        let (handler, _, _) = handler(
            MockProvider::failing(ProviderId::OpenAI, "HTTP 503"),
            RecordingRunner::default(),
        );
        let reply = handler.handle_json(r#"{"type":"sendMessage","message":"hi"}"#).await;
        assert_eq!(
            reply.as_deref(),
            Some(r#"{"type":"error","message":"Failed to get AI response"}"#)
        );
    }

    #[tokio::test]
    async fn test_execute_command() {
        let (handler, _, runner) = handler(
            MockProvider::replying(ProviderId::OpenAI, "ok"),
            RecordingRunner::default(),
        );
        let reply = handler
            .handle(InboundMessage::ExecuteCommand {
                command: "cargo --version".to_string(),
            })
            .await;
        assert_eq!(reply, None);
        assert_eq!(*runner.commands.lock(), vec!["cargo --version".to_string()]);
    }

    #[tokio::test]
    async fn test_execute_command_failure() {
        let (handler, _, _) = handler(
            MockProvider::replying(ProviderId::OpenAI, "ok"),
            RecordingRunner {
                fail: true,
                ..Default::default()
            },
        );
        let reply = handler
            .handle(InboundMessage::ExecuteCommand {
                command: "ls".to_string(),
            })
            .await;
        assert_eq!(reply, Some(OutboundMessage::error(EXECUTE_COMMAND_FAILED)));
    }

    #[tokio::test]
    async fn test_analyze_file_sends_prefixed_content() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("main.rs");
        std::fs::write(&path, "fn main() {}").unwrap();

        let (handler, provider, _) = handler(
            MockProvider::replying(ProviderId::OpenAI, "looks fine"),
            RecordingRunner::default(),
        );
        let reply = handler
            .handle(InboundMessage::AnalyzeFile {
                file_path: path.to_string_lossy().into_owned(),
            })
            .await;
        assert_eq!(
            reply,
            Some(OutboundMessage::FileAnalysis {
                analysis: "looks fine".to_string()
            })
        );
        assert_eq!(
            provider.calls.lock()[0].0,
            "Analyze this code:\n\nfn main() {}"
        );
    }

    #[tokio::test]
    async fn test_analyze_missing_file() {
        let (handler, provider, _) = handler(
            MockProvider::replying(ProviderId::OpenAI, "ok"),
            RecordingRunner::default(),
        );
        let reply = handler
            .handle(InboundMessage::AnalyzeFile {
                file_path: "/definitely/not/here.rs".to_string(),
            })
            .await;
        assert_eq!(reply, Some(OutboundMessage::error(ANALYZE_FILE_FAILED)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_serve_loop() {
        let (handler, _, _) = handler(
            MockProvider::replying(ProviderId::OpenAI, "pong"),
            RecordingRunner::default(),
        );
        let input = concat!(
            "{\"type\":\"sendMessage\",\"message\":\"ping\"}\n",
            "not json\n",
            "\n",
            "{\"type\":\"somethingElse\"}\n",
        );
        let mut output = Vec::new();
        handler
            .serve(tokio::io::BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "{\"type\":\"response\",\"message\":\"pong\"}\n"
        );
    }
}
