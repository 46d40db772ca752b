//! Server-sent event processing for streaming chat responses.
//!
//! This module turns the raw, arbitrarily-chunked byte stream of a streaming
//! chat exchange into a lazy sequence of [`StreamEvent`]s. The wire format is
//! UTF-8 text: frames separated by a blank line, each meaningful frame
//! carrying a `data: ` prefix followed by either a JSON payload or the
//! literal `[DONE]` sentinel.

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::observability;
use crate::types::StreamEvent;

/// Prefix carried by every meaningful frame.
const DATA_PREFIX: &str = "data: ";

/// Terminal payload marking stream completion.
const DONE_SENTINEL: &str = "[DONE]";

/// Frame separator.
const FRAME_DELIMITER: &str = "\n\n";

/// A boxed stream of decoded events, as produced by a streaming exchange.
pub type StreamEventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// JSON payload of a structured frame.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FramePayload {
    Token { content: String },
    Suggestions { content: Vec<String> },
}

fn decode_payload(payload: &str) -> StreamEvent {
    match serde_json::from_str::<FramePayload>(payload) {
        Ok(FramePayload::Token { content }) => StreamEvent::Token { text: content },
        Ok(FramePayload::Suggestions { content }) => StreamEvent::Suggestions { items: content },
        Err(_) => {
            observability::FRAME_MALFORMED.click();
            StreamEvent::Malformed {
                raw: payload.to_string(),
            }
        }
    }
}

/// Incremental frame decoder.
///
/// The transport may deliver a frame in any number of chunks, so the decoder
/// buffers text across [`feed`](FrameDecoder::feed) calls and only processes
/// delimiter-terminated frames; the trailing, possibly-incomplete segment
/// stays buffered for the next call. Feeding the same stream in one chunk or
/// one byte at a time produces the identical event sequence.
///
/// A decoder is scoped to a single exchange and discarded with it.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: String,
    /// Bytes of `buffer` already scanned for a delimiter.
    scanned: usize,
    done: bool,
}

impl FrameDecoder {
    /// Creates a decoder for a fresh exchange.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once the terminal sentinel has been decoded.
    ///
    /// After that point the decoder ignores all further input.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feeds one chunk of response text, returning the events completed by it.
    ///
    /// A chunk may complete zero frames (empty chunk, partial frame) or many;
    /// events are returned in wire order. Frames without the `data: ` prefix
    /// are keep-alives and are discarded silently.
    pub fn feed(&mut self, chunk: &str) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.done || chunk.is_empty() {
            return events;
        }
        self.buffer.push_str(chunk);

        // The delimiter itself may straddle the chunk boundary; back up one
        // byte when the scanned region ends mid-delimiter.
        let mut search_from = self.scanned;
        if self.buffer[..search_from].ends_with('\n') {
            search_from -= 1;
        }

        while let Some(offset) = self.buffer[search_from..].find(FRAME_DELIMITER) {
            let frame_end = search_from + offset;
            let frame: String = self.buffer.drain(..frame_end + FRAME_DELIMITER.len()).collect();
            let frame = &frame[..frame_end];
            search_from = 0;
            if let Some(event) = self.decode_frame(frame) {
                observability::FRAME_EVENTS.click();
                let terminal = event.is_terminal();
                events.push(event);
                if terminal {
                    self.done = true;
                    self.buffer.clear();
                    break;
                }
            }
        }
        self.scanned = self.buffer.len();
        events
    }

    fn decode_frame(&self, frame: &str) -> Option<StreamEvent> {
        let payload = frame.strip_prefix(DATA_PREFIX)?;
        if payload == DONE_SENTINEL {
            return Some(StreamEvent::Done);
        }
        Some(decode_payload(payload))
    }

    /// Closes the decoder at end of stream.
    ///
    /// A residual buffer holding one last complete frame (the transport is
    /// allowed to omit the final delimiter) yields that frame's event. A
    /// residual that is a cut-off fragment of a frame means the stream was
    /// truncated and surfaces as an error, not an event. Residual text
    /// without the `data: ` prefix is an ignorable keep-alive tail.
    pub fn finish(mut self) -> Result<Vec<StreamEvent>> {
        if self.done {
            return Ok(Vec::new());
        }
        let residual = std::mem::take(&mut self.buffer);
        let residual = residual.trim_end_matches('\n');
        if residual.is_empty() {
            return Ok(Vec::new());
        }
        let Some(payload) = residual.strip_prefix(DATA_PREFIX) else {
            return Ok(Vec::new());
        };
        if payload == DONE_SENTINEL {
            return Ok(vec![StreamEvent::Done]);
        }
        match decode_payload(payload) {
            StreamEvent::Malformed { .. } => Err(Error::truncated_stream(
                "stream ended inside an unterminated frame",
            )),
            event => Ok(vec![event]),
        }
    }
}

/// Incremental UTF-8 decoder for response body chunks.
///
/// HTTP chunk boundaries do not respect character boundaries, so a multi-byte
/// scalar split across two chunks must be held back until its remaining bytes
/// arrive. Genuinely invalid bytes are an [`Error::Encoding`].
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Creates a decoder with no pending bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes one chunk, returning the complete text it makes available.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<String> {
        let mut data = std::mem::take(&mut self.pending);
        data.extend_from_slice(bytes);
        match String::from_utf8(data) {
            Ok(text) => Ok(text),
            Err(err) => {
                let utf8_err = err.utf8_error();
                if utf8_err.error_len().is_some() {
                    return Err(utf8_err.into());
                }
                let valid_up_to = utf8_err.valid_up_to();
                let mut data = err.into_bytes();
                self.pending = data.split_off(valid_up_to);
                String::from_utf8(data)
                    .map_err(|_| Error::encoding("invalid UTF-8 in response body", None))
            }
        }
    }

    /// Verifies that no partial scalar is left over at end of stream.
    pub fn finish(self) -> Result<()> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(Error::encoding(
                "response body ended inside a UTF-8 sequence",
                None,
            ))
        }
    }
}

struct DecodeState<S> {
    stream: S,
    utf8: Option<Utf8Decoder>,
    decoder: Option<FrameDecoder>,
    queued: VecDeque<StreamEvent>,
    pending_error: Option<Error>,
    saw_bytes: bool,
    terminated: bool,
    eof: bool,
}

/// Process a stream of response bytes into a stream of decoded events.
///
/// The produced sequence yields every event decoded from the body, in arrival
/// order, and is exhausted after the `Done` event. If the body ends, or the
/// underlying stream errors, before `Done` was seen, all successfully decoded
/// events are yielded first and the sequence then yields exactly one
/// [`Error::TruncatedStream`]; callers must treat the events already yielded
/// as valid partial output. Nothing is yielded after a terminal event or
/// error.
pub fn decode_frames<S>(byte_stream: S) -> impl Stream<Item = Result<StreamEvent>>
where
    S: Stream<Item = Result<Bytes>> + Unpin + 'static,
{
    let state = DecodeState {
        stream: byte_stream,
        utf8: Some(Utf8Decoder::new()),
        decoder: Some(FrameDecoder::new()),
        queued: VecDeque::new(),
        pending_error: None,
        saw_bytes: false,
        terminated: false,
        eof: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(event) = st.queued.pop_front() {
                if event.is_terminal() {
                    st.terminated = true;
                }
                return Some((Ok(event), st));
            }
            if let Some(err) = st.pending_error.take() {
                st.terminated = true;
                return Some((Err(err), st));
            }
            if st.terminated || st.eof {
                return None;
            }

            match st.stream.next().await {
                Some(Ok(bytes)) => {
                    if !bytes.is_empty() {
                        st.saw_bytes = true;
                    }
                    let text = match st.utf8.as_mut() {
                        Some(utf8) => match utf8.decode(&bytes) {
                            Ok(text) => text,
                            Err(err) => {
                                st.pending_error = Some(err);
                                continue;
                            }
                        },
                        None => continue,
                    };
                    if let Some(decoder) = st.decoder.as_mut() {
                        st.queued.extend(decoder.feed(&text));
                    }
                }
                Some(Err(err)) => {
                    // A drop after bytes arrived is a truncation; partial
                    // output already yielded stays valid. Before any byte,
                    // the caller-supplied error passes through untouched.
                    st.pending_error = Some(if st.saw_bytes {
                        observability::STREAM_TRUNCATIONS.click();
                        Error::truncated_stream(format!("stream dropped mid-exchange: {err}"))
                    } else {
                        err
                    });
                }
                None => {
                    st.eof = true;
                    let mut completed = false;
                    match st.decoder.take() {
                        Some(decoder) if decoder.is_done() => completed = true,
                        Some(decoder) => match decoder.finish() {
                            Ok(events) => {
                                completed = events.iter().any(StreamEvent::is_terminal);
                                st.queued.extend(events);
                            }
                            Err(err) => {
                                observability::STREAM_TRUNCATIONS.click();
                                st.pending_error = Some(err);
                            }
                        },
                        None => completed = true,
                    }
                    if let Some(utf8) = st.utf8.take()
                        && !completed
                        && st.pending_error.is_none()
                        && utf8.finish().is_err()
                    {
                        observability::STREAM_TRUNCATIONS.click();
                        st.pending_error =
                            Some(Error::truncated_stream("stream ended inside a UTF-8 sequence"));
                    }
                    if !completed && st.pending_error.is_none() {
                        observability::STREAM_TRUNCATIONS.click();
                        st.pending_error = Some(Error::truncated_stream(
                            "stream ended without completion marker",
                        ));
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    const SCENARIO: &str = "data: {\"type\":\"token\",\"content\":\"Hel\"}\n\ndata: {\"type\":\"token\",\"content\":\"lo\"}\n\ndata: [DONE]\n\n";

    fn token(text: &str) -> StreamEvent {
        StreamEvent::Token {
            text: text.to_string(),
        }
    }

    fn feed_all(chunks: &[&str]) -> Vec<StreamEvent> {
        let mut decoder = FrameDecoder::new();
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(decoder.feed(chunk));
        }
        events
    }

    #[test]
    fn single_chunk_stream() {
        let events = feed_all(&[SCENARIO]);
        assert_eq!(events, vec![token("Hel"), token("lo"), StreamEvent::Done]);
    }

    #[test]
    fn split_invariance_every_byte_offset() {
        let expected = feed_all(&[SCENARIO]);
        for i in 0..=SCENARIO.len() {
            let events = feed_all(&[&SCENARIO[..i], &SCENARIO[i..]]);
            assert_eq!(events, expected, "split at byte {i}");
        }
    }

    #[test]
    fn split_invariance_three_chunks() {
        let expected = feed_all(&[SCENARIO]);
        for i in 0..=SCENARIO.len() {
            for j in i..=SCENARIO.len() {
                let events = feed_all(&[&SCENARIO[..i], &SCENARIO[i..j], &SCENARIO[j..]]);
                assert_eq!(events, expected, "split at bytes {i}/{j}");
            }
        }
    }

    #[test]
    fn one_byte_at_a_time() {
        let expected = feed_all(&[SCENARIO]);
        let mut decoder = FrameDecoder::new();
        let mut events = Vec::new();
        for i in 0..SCENARIO.len() {
            events.extend(decoder.feed(&SCENARIO[i..i + 1]));
        }
        assert_eq!(events, expected);
    }

    #[test]
    fn delimiter_split_across_chunks() {
        let events = feed_all(&[
            "data: {\"type\":\"token\",\"content\":\"a\"}\n",
            "\ndata: [DONE]\n\n",
        ]);
        assert_eq!(events, vec![token("a"), StreamEvent::Done]);
    }

    #[test]
    fn empty_chunk_is_a_no_op() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed("").is_empty());
        let events = decoder.feed(SCENARIO);
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn keep_alive_frames_are_discarded() {
        let events = feed_all(&[": ping\n\nevent: ping\n\ndata: [DONE]\n\n"]);
        assert_eq!(events, vec![StreamEvent::Done]);
    }

    #[test]
    fn malformed_frames_do_not_disturb_valid_ones() {
        let events = feed_all(&[
            "data: {\"type\":\"token\",\"content\":\"a\"}\n\ndata: {oops\n\ndata: {\"type\":\"token\",\"content\":\"b\"}\n\ndata: [DONE]\n\n",
        ]);
        assert_eq!(
            events,
            vec![
                token("a"),
                StreamEvent::Malformed {
                    raw: "{oops".to_string()
                },
                token("b"),
                StreamEvent::Done,
            ]
        );
    }

    #[test]
    fn unknown_payload_type_is_malformed() {
        let events = feed_all(&["data: {\"type\":\"usage\",\"content\":\"x\"}\n\n"]);
        assert_eq!(
            events,
            vec![StreamEvent::Malformed {
                raw: "{\"type\":\"usage\",\"content\":\"x\"}".to_string()
            }]
        );
    }

    #[test]
    fn suggestions_payload_decodes_in_order() {
        let events = feed_all(&["data: {\"type\":\"suggestions\",\"content\":[\"A\",\"B\"]}\n\n"]);
        assert_eq!(
            events,
            vec![StreamEvent::Suggestions {
                items: vec!["A".to_string(), "B".to_string()]
            }]
        );
    }

    #[test]
    fn nothing_after_done() {
        let mut decoder = FrameDecoder::new();
        let events =
            decoder.feed("data: [DONE]\n\ndata: {\"type\":\"token\",\"content\":\"late\"}\n\n");
        assert_eq!(events, vec![StreamEvent::Done]);
        assert!(decoder.is_done());
        assert!(
            decoder
                .feed("data: {\"type\":\"token\",\"content\":\"later\"}\n\n")
                .is_empty()
        );
    }

    #[test]
    fn finish_on_empty_buffer() {
        let decoder = FrameDecoder::new();
        assert!(decoder.finish().unwrap().is_empty());
    }

    #[test]
    fn finish_recovers_undelimited_final_frame() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed("data: {\"type\":\"token\",\"content\":\"tail\"}");
        assert!(events.is_empty());
        assert_eq!(decoder.finish().unwrap(), vec![token("tail")]);
    }

    #[test]
    fn finish_recovers_undelimited_done() {
        let mut decoder = FrameDecoder::new();
        decoder.feed("data: [DONE]\n");
        assert_eq!(decoder.finish().unwrap(), vec![StreamEvent::Done]);
    }

    #[test]
    fn finish_rejects_cut_off_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.feed("data: {\"type\":\"tok");
        let err = decoder.finish().unwrap_err();
        assert!(err.is_truncated_stream());
    }

    #[test]
    fn finish_ignores_keep_alive_tail() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(": ping");
        assert!(decoder.finish().unwrap().is_empty());
    }

    #[test]
    fn utf8_decoder_reassembles_split_scalar() {
        let text = "héllo";
        let bytes = text.as_bytes();
        // Split inside the two-byte 'é'.
        let mut utf8 = Utf8Decoder::new();
        let first = utf8.decode(&bytes[..2]).unwrap();
        let second = utf8.decode(&bytes[2..]).unwrap();
        assert_eq!(format!("{first}{second}"), text);
        utf8.finish().unwrap();
    }

    #[test]
    fn utf8_decoder_rejects_invalid_bytes() {
        let mut utf8 = Utf8Decoder::new();
        assert!(utf8.decode(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn utf8_decoder_finish_rejects_dangling_prefix() {
        let mut utf8 = Utf8Decoder::new();
        utf8.decode(&"é".as_bytes()[..1]).unwrap();
        assert!(utf8.finish().is_err());
    }

    async fn collect(chunks: Vec<Result<Bytes>>) -> Vec<Result<StreamEvent>> {
        let stream = Box::pin(stream::iter(chunks));
        decode_frames(stream).collect::<Vec<_>>().await
    }

    #[tokio::test]
    async fn adapter_decodes_single_chunk() {
        let items = collect(vec![Ok(Bytes::from(SCENARIO))]).await;
        let events: Vec<_> = items.into_iter().map(|i| i.unwrap()).collect();
        assert_eq!(events, vec![token("Hel"), token("lo"), StreamEvent::Done]);
    }

    #[tokio::test]
    async fn adapter_split_invariance_includes_multibyte_scalars() {
        let body = "data: {\"type\":\"token\",\"content\":\"héllo \u{1f4da}\"}\n\ndata: [DONE]\n\n";
        let whole = collect(vec![Ok(Bytes::from(body))]).await;
        let expected: Vec<_> = whole.into_iter().map(|i| i.unwrap()).collect();
        let raw = body.as_bytes();
        for i in 0..=raw.len() {
            let chunks = vec![
                Ok(Bytes::copy_from_slice(&raw[..i])),
                Ok(Bytes::copy_from_slice(&raw[i..])),
            ];
            let events: Vec<_> = collect(chunks)
                .await
                .into_iter()
                .map(|item| item.unwrap())
                .collect();
            assert_eq!(events, expected, "split at byte {i}");
        }
    }

    #[tokio::test]
    async fn adapter_reports_truncation_after_partial_output() {
        let items = collect(vec![Ok(Bytes::from(
            "data: {\"type\":\"token\",\"content\":\"Partial\"}\n\n",
        ))])
        .await;
        assert_eq!(items.len(), 2);
        assert_eq!(*items[0].as_ref().unwrap(), token("Partial"));
        assert!(items[1].as_ref().unwrap_err().is_truncated_stream());
    }

    #[tokio::test]
    async fn adapter_maps_mid_stream_drop_to_truncation() {
        let items = collect(vec![
            Ok(Bytes::from("data: {\"type\":\"token\",\"content\":\"a\"}\n\n")),
            Err(Error::connection("connection reset by peer", None)),
        ])
        .await;
        assert_eq!(items.len(), 2);
        assert_eq!(*items[0].as_ref().unwrap(), token("a"));
        assert!(items[1].as_ref().unwrap_err().is_truncated_stream());
    }

    #[tokio::test]
    async fn adapter_passes_through_error_before_any_byte() {
        let items = collect(vec![Err(Error::connection("refused", None))]).await;
        assert_eq!(items.len(), 1);
        assert!(items[0].as_ref().unwrap_err().is_connection());
    }

    #[tokio::test]
    async fn adapter_stops_at_done_even_with_more_chunks() {
        let items = collect(vec![
            Ok(Bytes::from("data: [DONE]\n\n")),
            Ok(Bytes::from("data: {\"type\":\"token\",\"content\":\"late\"}\n\n")),
        ])
        .await;
        assert_eq!(items.len(), 1);
        assert_eq!(*items[0].as_ref().unwrap(), StreamEvent::Done);
    }
}
