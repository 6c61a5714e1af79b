//! Turns a streamed completion body into ordered text fragments
//!
//! The body is a sequence of newline-delimited records, each optionally
//! prefixed with `data: ` and carrying one JSON [`StreamChunk`]. The decoded
//! stream yields every non-empty content delta in order and ends on the
//! first of:
//!
//! - a record with a non-null `finish_reason` (its own content is still yielded)
//! - the `[DONE]` sentinel
//! - natural end of the body
//! - a malformed record or transport error, yielded as a final `Err`
//!
//! Only choice 0 is relayed; increments for other choices are skipped.
//!
//! Lines are framed here rather than through an SSE parser because bare JSON
//! lines without a `data:` prefix must decode too.

use std::pin::Pin;

use bytes::BytesMut;
use futures::{Stream, StreamExt, stream};

use crate::backend::ByteStream;
use crate::error::{OpenAiError, Result};
use crate::types::StreamChunk;

/// Ordered text fragments of one streamed response
///
/// An `Err` item is always the last item
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// Decode a streamed completion body into text fragments
///
/// The body is dropped as soon as the fragment stream terminates, whichever
/// way it terminates.
pub fn decode(body: ByteStream) -> FragmentStream {
    let decoder = Decoder {
        body: Some(body),
        buffer: BytesMut::new(),
    };

    Box::pin(stream::unfold(decoder, |mut decoder| async move {
        let item = decoder.next_fragment().await?;
        Some((item, decoder))
    }))
}

/// Outcome of interpreting one record
#[derive(Debug, PartialEq, Eq)]
enum Record {
    /// Nothing to emit; keep reading
    Skip,
    /// A content fragment
    Content(String),
    /// The response is complete, possibly with trailing content
    Finished(Option<String>),
}

struct Decoder {
    /// `None` once the stream has terminated
    body: Option<ByteStream>,
    buffer: BytesMut,
}

impl Decoder {
    async fn next_fragment(&mut self) -> Option<Result<String>> {
        loop {
            if let Some(line) = self.take_line() {
                match line.and_then(|line| parse_record(&line)) {
                    Ok(Record::Skip) => continue,
                    Ok(Record::Content(text)) => return Some(Ok(text)),
                    Ok(Record::Finished(trailing)) => {
                        self.close();
                        return trailing.map(Ok);
                    }
                    Err(e) => {
                        self.close();
                        return Some(Err(e));
                    }
                }
            }

            let body = self.body.as_mut()?;

            match body.next().await {
                Some(Ok(bytes)) => self.buffer.extend_from_slice(&bytes),
                Some(Err(e)) => {
                    self.close();
                    return Some(Err(e));
                }
                None => {
                    // Decode an unterminated final record before finishing
                    self.body = None;
                    if self.buffer.is_empty() {
                        return None;
                    }
                    self.buffer.extend_from_slice(b"\n");
                }
            }
        }
    }

    /// Split the next complete line off the buffer
    fn take_line(&mut self) -> Option<Result<String>> {
        let end = self.buffer.iter().position(|&b| b == b'\n')?;
        let raw = self.buffer.split_to(end + 1);
        let line = raw.strip_suffix(b"\n").unwrap_or(&raw[..]);
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        Some(
            std::str::from_utf8(line)
                .map(str::to_owned)
                .map_err(|e| OpenAiError::Decode(format!("record is not valid UTF-8: {e}"))),
        )
    }

    fn close(&mut self) {
        self.body = None;
        self.buffer.clear();
    }
}

/// Interpret a single line of the body
fn parse_record(line: &str) -> Result<Record> {
    // SSE comments and non-data fields carry no payload
    if line.starts_with(':') || ["event:", "id:", "retry:"].iter().any(|field| line.starts_with(field)) {
        return Ok(Record::Skip);
    }

    let payload = line.strip_prefix(DATA_PREFIX).unwrap_or(line).trim();

    if payload.is_empty() {
        return Ok(Record::Skip);
    }

    if payload == DONE_SENTINEL {
        return Ok(Record::Finished(None));
    }

    let chunk: StreamChunk = serde_json::from_str(payload).map_err(|e| OpenAiError::Decode(e.to_string()))?;

    let Some(choice) = chunk.choices.into_iter().find(|choice| choice.index == 0) else {
        return Ok(Record::Skip);
    };

    let content = choice.delta.content.filter(|text| !text.is_empty());

    if choice.finish_reason.is_some() {
        return Ok(Record::Finished(content));
    }

    Ok(content.map_or(Record::Skip, Record::Content))
}
