use chrono::Utc;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::error::GatewayError;
use crate::messages::{DepthMessage, TradeMessage};

/// A decoded stream message
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Trade(TradeMessage),
    Depth(DepthMessage),
    /// Channel-level error notification from the exchange
    Error(String),
    /// Subscription acks and other control traffic
    Control,
}

#[derive(Deserialize)]
struct Envelope {
    stream: String,
    data: Value,
}

#[derive(Deserialize)]
struct DepthPayload {
    #[serde(rename = "s", default)]
    symbol: Option<String>,
    #[serde(alias = "b")]
    bids: Vec<[String; 2]>,
    #[serde(alias = "a")]
    asks: Vec<[String; 2]>,
}

/// Decode one stream message
pub fn parse_stream_message(line: &str) -> Result<StreamEvent, GatewayError> {
    let value: Value = serde_json::from_str(line)?;

    if value.get("stream").is_some() {
        let envelope: Envelope = serde_json::from_value(value)?;
        return parse_payload(Some(&envelope.stream), envelope.data);
    }
    parse_payload(None, value)
}

fn parse_payload(stream: Option<&str>, data: Value) -> Result<StreamEvent, GatewayError> {
    // Subscription acks: {"result": null, "id": 1}
    if data.get("result").is_some() && data.get("id").is_some() {
        return Ok(StreamEvent::Control);
    }

    let event_type = data.get("e").and_then(Value::as_str).map(str::to_string);
    let channel = stream.and_then(|s| s.split('@').nth(1)).unwrap_or_default();

    match event_type.as_deref() {
        Some("error") => {
            let message = data
                .get("m")
                .and_then(Value::as_str)
                .unwrap_or("unspecified")
                .to_string();
            Ok(StreamEvent::Error(message))
        }
        Some("trade") => Ok(StreamEvent::Trade(serde_json::from_value(data)?)),
        Some("depthUpdate") => parse_depth(stream, data),
        Some(other) => {
            debug!("Ignoring unsupported event type {:?}", other);
            Ok(StreamEvent::Control)
        }
        None if channel == "trade" => Ok(StreamEvent::Trade(serde_json::from_value(data)?)),
        None if channel.starts_with("depth") => parse_depth(stream, data),
        None => Err(GatewayError::Malformed(format!(
            "unrecognised stream message (stream={:?})",
            stream
        ))),
    }
}

fn parse_depth(stream: Option<&str>, data: Value) -> Result<StreamEvent, GatewayError> {
    let payload: DepthPayload = serde_json::from_value(data)?;

    // Partial depth streams omit the symbol; take it from the stream name
    let symbol = payload
        .symbol
        .or_else(|| stream.and_then(|s| s.split('@').next()).map(str::to_string))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GatewayError::Malformed("depth message without symbol".to_string()))?;

    Ok(StreamEvent::Depth(DepthMessage::new(
        symbol,
        payload.bids,
        payload.asks,
        Utc::now(),
    )))
}
