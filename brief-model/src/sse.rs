//! Minimal server-sent-events line splitter.

/// Accumulates raw response bytes and hands back the payload of every
/// complete `data:` line. Bytes are buffered until a newline arrives, so a
/// multi-byte character split across chunks is decoded intact.
#[derive(Debug, Default)]
pub(crate) struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(line_end) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=line_end).collect();
            if let Some(data) = data_payload(&String::from_utf8_lossy(&line)) {
                events.push(data);
            }
        }
        events
    }

    /// Payload of a trailing line that was not newline-terminated.
    pub(crate) fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        data_payload(&String::from_utf8_lossy(&rest))
    }
}

fn data_payload(line: &str) -> Option<String> {
    let data = line.trim().strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" { None } else { Some(data.to_string()) }
}
