//! JSON-RPC message framing
//!
//! Bodies arriving over HTTP are decoded into rmcp's typed
//! [`ClientJsonRpcMessage`] before they reach a session, and replies are
//! encoded back to a single line of JSON for the push channel. A body that
//! does not decode is rejected with a [`MessageError`].

use rmcp::model::{ClientJsonRpcMessage, JsonRpcMessage, ServerJsonRpcMessage};

/// Why a body could not be used as a protocol message
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("body is empty")]
    Empty,

    #[error("not a valid JSON-RPC 2.0 message: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Decode a request, notification or response sent by a client
pub fn decode_client_message(body: &[u8]) -> Result<ClientJsonRpcMessage, MessageError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(MessageError::Empty);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Encode a server message as one line of JSON
pub fn encode_server_message(message: &ServerJsonRpcMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

/// Short label for logs
pub fn message_kind<Req, Resp, Not>(message: &JsonRpcMessage<Req, Resp, Not>) -> &'static str {
    match message {
        JsonRpcMessage::Request(_) => "request",
        JsonRpcMessage::Notification(_) => "notification",
        _ => "response",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_notification() {
        let request = decode_client_message(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).unwrap();
        assert_eq!(message_kind(&request), "request");

        let notification =
            decode_client_message(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert_eq!(message_kind(&notification), "notification");
    }

    #[test]
    fn test_tools_call_decodes_arguments() {
        let message = decode_client_message(
            br#"{"jsonrpc":"2.0","id":"a","method":"tools/call","params":{"name":"google_search","arguments":{"q":"cats"}}}"#,
        )
        .unwrap();
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["params"]["arguments"]["q"], "cats");
        assert_eq!(value["id"], "a");
    }

    #[test]
    fn test_rejects_malformed_bodies() {
        assert!(matches!(decode_client_message(b"  "), Err(MessageError::Empty)));
        assert!(matches!(
            decode_client_message(b"{not json"),
            Err(MessageError::Invalid(_))
        ));
        assert!(decode_client_message(b"\"ping\"").is_err());
        assert!(decode_client_message(br#"{"id":1,"method":"ping"}"#).is_err());
    }
}
