//! SSE decoding on top of eventsource-stream
//!
//! eventsource-stream handles UTF-8 boundaries, line buffering and field
//! parsing. This layer adds the `[DONE]` terminator and drops blank events.

use eventsource_stream::{Event, Eventsource};
use futures::Stream;
use futures_util::StreamExt;
use std::fmt::Display;
use std::pin::Pin;

use crate::error::LlmError;

/// Data payload that terminates a stream. It is never yielded.
pub const DONE_MARKER: &str = "[DONE]";

/// Stream of decoded SSE events
pub type SseEventStream = Pin<Box<dyn Stream<Item = Result<Event, LlmError>> + Send>>;

/// Decode a streaming HTTP response into SSE events.
pub fn sse_event_stream(response: reqwest::Response) -> SseEventStream {
    sse_event_stream_from_bytes(response.bytes_stream())
}

/// Decode any byte stream into SSE events.
///
/// The stream ends at the first `[DONE]` event or after the first decode error.
pub fn sse_event_stream_from_bytes<S, B, E>(bytes: S) -> SseEventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let events = bytes.eventsource();
    let stream = async_stream::stream! {
        let mut events = Box::pin(events);
        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    let data = event.data.trim();
                    if data == DONE_MARKER {
                        tracing::debug!("SSE stream finished with {DONE_MARKER}");
                        break;
                    }
                    if data.is_empty() {
                        continue;
                    }
                    tracing::debug!(event = %event.event, data = %event.data, "SSE event");
                    yield Ok(event);
                }
                Err(e) => {
                    yield Err(LlmError::StreamError(format!("SSE parsing error: {e}")));
                    break;
                }
            }
        }
    };
    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn bytes(body: &str) -> SseEventStream {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![Ok(body.as_bytes().to_vec())];
        sse_event_stream_from_bytes(stream::iter(chunks))
    }

    #[tokio::test]
    async fn stops_at_done_marker() {
        let body = "data: {\"a\":1}\n\ndata: [DONE]\n\ndata: {\"a\":2}\n\n";
        let events: Vec<_> = bytes(body).collect().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().data, "{\"a\":1}");
    }

    #[tokio::test]
    async fn skips_blank_events_and_keeps_event_names() {
        let body = "event: result\ndata: {\"a\":1}\n\ndata: \n\nevent: result\ndata: {\"a\":2}\n\n";
        let events: Vec<_> = bytes(body).collect().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].as_ref().unwrap().event, "result");
    }

    #[tokio::test]
    async fn events_split_across_chunks_are_reassembled() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"data: {\"te".to_vec()),
            Ok(b"xt\":\"hi\"}\n".to_vec()),
            Ok(b"\n".to_vec()),
        ];
        let events: Vec<_> = sse_event_stream_from_bytes(stream::iter(chunks))
            .collect()
            .await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().data, "{\"text\":\"hi\"}");
    }
}
