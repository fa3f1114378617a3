//! Webview message protocol
//!
//! One JSON object per message, discriminated by `type`.

use serde::{Deserialize, Serialize};

pub const SEND_MESSAGE_FAILED: &str = "Failed to get AI response";
pub const EXECUTE_COMMAND_FAILED: &str = "Failed to execute command";
pub const ANALYZE_FILE_FAILED: &str = "Failed to analyze file";

/// Messages from the webview to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    SendMessage {
        message: String,
    },
    ExecuteCommand {
        command: String,
    },
    AnalyzeFile {
        #[serde(rename = "filePath")]
        file_path: String,
    },
    /// Any other `type`; ignored
    #[serde(other)]
    Unknown,
}

/// Messages from the host to the webview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    Response { message: String },
    Error { message: String },
    FileAnalysis { analysis: String },
}

impl OutboundMessage {
    pub fn error(message: &str) -> Self {
        OutboundMessage::Error {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inbound_wire_names() {
        let msg: InboundMessage =
            serde_json::from_value(json!({"type": "analyzeFile", "filePath": "/tmp/a.rs"}))
                .unwrap();
        assert_eq!(
            msg,
            InboundMessage::AnalyzeFile {
                file_path: "/tmp/a.rs".to_string()
            }
        );

        let msg: InboundMessage =
            serde_json::from_value(json!({"type": "executeCommand", "command": "ls"})).unwrap();
        assert_eq!(
            msg,
            InboundMessage::ExecuteCommand {
                command: "ls".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_type_is_tolerated() {
        let msg: InboundMessage =
            serde_json::from_value(json!({"type": "analyzeFiles", "files": []})).unwrap();
        assert_eq!(msg, InboundMessage::Unknown);
    }

    #[test]
    fn test_outbound_wire_names() {
        let json = serde_json::to_value(OutboundMessage::FileAnalysis {
            analysis: "fine".to_string(),
        })
        .unwrap();
        assert_eq!(json, json!({"type": "fileAnalysis", "analysis": "fine"}));

        let json = serde_json::to_value(OutboundMessage::error(SEND_MESSAGE_FAILED)).unwrap();
        assert_eq!(
            json,
            json!({"type": "error", "message": "Failed to get AI response"})
        );
    }
}
