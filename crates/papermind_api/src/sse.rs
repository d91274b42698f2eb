use serde_json::Value;

use crate::events::ChatStreamEvent;

const DONE_SENTINEL: &str = "[DONE]";

/// Decodes UTF-8 across chunk boundaries, holding back an incomplete tail.
#[derive(Debug, Default)]
struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let text = text.to_owned();
                self.pending.clear();
                text
            }
            Err(error) if error.error_len().is_none() => {
                let valid = error.valid_up_to();
                let text = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                self.pending.drain(..valid);
                text
            }
            Err(_) => self.finish(),
        }
    }

    fn finish(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }

    fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Incremental parser for SSE text streams.
#[derive(Debug, Default)]
pub struct SseStreamParser {
    utf8: Utf8Carry,
    buffer: String,
    done: bool,
}

impl SseStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete events.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ChatStreamEvent> {
        let decoded = self.utf8.decode(bytes);
        self.buffer.push_str(&decoded);
        if self.buffer.contains('\r') {
            self.buffer = self.buffer.replace("\r\n", "\n");
        }

        let mut events = Vec::new();
        while let Some(split) = self.buffer.find("\n\n") {
            let frame = self.buffer[..split].to_string();
            self.buffer.drain(0..split + 2);
            self.push_frame(&frame, &mut events);
        }

        events
    }

    /// Flush a trailing frame that was not terminated by a blank line.
    pub fn finish(&mut self) -> Vec<ChatStreamEvent> {
        let tail = self.utf8.finish();
        self.buffer.push_str(&tail);
        let frame = std::mem::take(&mut self.buffer);

        let mut events = Vec::new();
        self.push_frame(frame.trim_end_matches(['\r', '\n']), &mut events);
        events
    }

    /// Parse a complete SSE payload string in one shot.
    pub fn parse_frames(input: &str) -> Vec<ChatStreamEvent> {
        let mut parser = Self::default();
        let mut events = parser.feed(input.as_bytes());
        events.extend(parser.finish());
        events
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty() && self.utf8.is_empty()
    }

    fn push_frame(&mut self, frame: &str, events: &mut Vec<ChatStreamEvent>) {
        if self.done {
            return;
        }

        let Some(payload) = extract_data_payload(frame) else {
            return;
        };
        if payload.is_empty() {
            return;
        }
        if payload.trim() == DONE_SENTINEL {
            self.done = true;
            events.push(ChatStreamEvent::Done);
            return;
        }

        events.push(map_payload(payload));
    }
}

/// Decoder for a raw (non-SSE) text body; every decoded chunk is one event.
#[derive(Debug, Default)]
pub struct TextStreamDecoder {
    utf8: Utf8Carry,
}

impl TextStreamDecoder {
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ChatStreamEvent> {
        text_event(self.utf8.decode(bytes))
    }

    pub fn finish(&mut self) -> Vec<ChatStreamEvent> {
        text_event(self.utf8.finish())
    }
}

/// Body decoder selected from the response `content-type`.
#[derive(Debug)]
pub enum StreamDecoder {
    Sse(SseStreamParser),
    Text(TextStreamDecoder),
}

impl StreamDecoder {
    pub fn for_content_type(content_type: Option<&str>) -> Self {
        let is_sse = content_type
            .is_some_and(|value| value.to_ascii_lowercase().contains("text/event-stream"));
        if is_sse {
            Self::Sse(SseStreamParser::default())
        } else {
            Self::Text(TextStreamDecoder::default())
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ChatStreamEvent> {
        match self {
            Self::Sse(parser) => parser.feed(bytes),
            Self::Text(decoder) => decoder.feed(bytes),
        }
    }

    pub fn finish(&mut self) -> Vec<ChatStreamEvent> {
        match self {
            Self::Sse(parser) => parser.finish(),
            Self::Text(decoder) => decoder.finish(),
        }
    }
}

fn text_event(text: String) -> Vec<ChatStreamEvent> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![ChatStreamEvent::Text(text)]
    }
}

// Only one optional space after `data:` is stripped; token text keeps its own whitespace.
fn extract_data_payload(frame: &str) -> Option<String> {
    let data_lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

// Only JSON objects are records; bare scalars such as ` 42` or ` true` are
// answer text and keep their whitespace.
fn map_payload(payload: String) -> ChatStreamEvent {
    match serde_json::from_str::<Value>(&payload) {
        Ok(value @ Value::Object(_)) => ChatStreamEvent::Record(value),
        _ => ChatStreamEvent::Text(payload),
    }
}
