//! Socket.IO v4 text framing over a websocket.
//!
//! # Purpose
//! Decodes the Engine.IO/Socket.IO packets the backend emits and renders the
//! few the client sends back.
//!
//! # Key invariants
//! - Only the default namespace is joined; a namespace prefix on incoming
//!   packets is tolerated and ignored.
//! - Event payloads are never interpreted: a notification is a pure trigger.
//!
//! # Wire summary
//! - `0{json}` open, `1` close, `2` ping, `3` pong, `6` noop.
//! - `4` message carrying a Socket.IO packet: `0` connect, `1` disconnect,
//!   `2` event (`42["name", ...]`), `4` connect error.
use anyhow::{Result, bail};
use serde_json::Value;

/// Namespace connect request sent after the open packet.
pub const CONNECT_FRAME: &str = "40";
/// Reply to an Engine.IO ping.
pub const PONG_FRAME: &str = "3";

#[derive(Debug, Clone, PartialEq)]
pub enum PushFrame {
    Open {
        sid: Option<String>,
        ping_interval_ms: Option<u64>,
        ping_timeout_ms: Option<u64>,
    },
    Close,
    Ping,
    Pong,
    Noop,
    Connected,
    Disconnected,
    Event { name: String },
    ConnectError(String),
}

/// Decode one text frame; `None` for frames the client does not act on.
pub fn decode_frame(text: &str) -> Option<PushFrame> {
    let mut chars = text.chars();
    let engine_type = chars.next()?;
    let rest = chars.as_str();
    match engine_type {
        '0' => {
            let open: Value = serde_json::from_str(rest).unwrap_or(Value::Null);
            Some(PushFrame::Open {
                sid: open.get("sid").and_then(Value::as_str).map(str::to_string),
                ping_interval_ms: open.get("pingInterval").and_then(Value::as_u64),
                ping_timeout_ms: open.get("pingTimeout").and_then(Value::as_u64),
            })
        }
        '1' => Some(PushFrame::Close),
        '2' => Some(PushFrame::Ping),
        '3' => Some(PushFrame::Pong),
        '6' => Some(PushFrame::Noop),
        '4' => decode_packet(rest),
        _ => None,
    }
}

fn decode_packet(packet: &str) -> Option<PushFrame> {
    let mut chars = packet.chars();
    let packet_type = chars.next()?;
    let body = strip_namespace(chars.as_str());
    match packet_type {
        '0' => Some(PushFrame::Connected),
        '1' => Some(PushFrame::Disconnected),
        '2' => {
            // Skip an optional ack id before the JSON array.
            let body = body.trim_start_matches(|c: char| c.is_ascii_digit());
            let args: Vec<Value> = serde_json::from_str(body).ok()?;
            let name = args.first()?.as_str()?.to_string();
            Some(PushFrame::Event { name })
        }
        '4' => {
            let detail: Value = serde_json::from_str(body).unwrap_or(Value::Null);
            let message = detail
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string());
            Some(PushFrame::ConnectError(message))
        }
        _ => None,
    }
}

// `/admin,["event"]` -> `["event"]`
fn strip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        match body.split_once(',') {
            Some((_, rest)) => rest,
            None => "",
        }
    } else {
        body
    }
}

/// Websocket endpoint for a backend base URI.
pub fn socket_url(push_url: &str) -> Result<String> {
    let base = push_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if base.starts_with("ws://") || base.starts_with("wss://") {
        base.to_string()
    } else {
        bail!("unsupported push channel url: {push_url}");
    };
    Ok(format!("{base}/socket.io/?EIO=4&transport=websocket"))
}
