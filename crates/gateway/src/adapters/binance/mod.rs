//! Binance combined-stream adapter
//!
//! Decodes `{"stream": "<symbol>@trade", "data": {...}}` and
//! `{"stream": "<symbol>@depth5", "data": {...}}` envelopes, as well as bare
//! payloads carrying an `"e"` event type.

mod feed;
mod parsers;

pub use feed::{FeedStats, StreamFeed};
pub use parsers::{StreamEvent, parse_stream_message};
