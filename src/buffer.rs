/// How an incoming chunk related to what was already buffered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    /// The chunk extended the previous text; only the delta was appended.
    Extended,
    /// The chunk did not start with the previous text and replaced it.
    Replaced,
}

/// Cumulative stream text plus the not-yet-consumed tail.
#[derive(Debug, Default)]
pub struct StreamBuffer {
    latest: String,
    pending: String,
}

impl StreamBuffer {
    /// Feed the full accumulated text seen so far.
    pub fn ingest(&mut self, chunk: &str) -> Ingest {
        let outcome = match chunk.strip_prefix(self.latest.as_str()) {
            Some(delta) => {
                self.pending.push_str(delta);
                Ingest::Extended
            }
            None => {
                self.pending.clear();
                self.pending.push_str(chunk);
                Ingest::Replaced
            }
        };
        self.latest.clear();
        self.latest.push_str(chunk);
        outcome
    }

    /// The most recent raw chunk, as passed to [`ingest`](Self::ingest).
    pub fn latest(&self) -> &str {
        &self.latest
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Drop the first `len` bytes of the pending tail.
    pub fn consume(&mut self, len: usize) {
        let len = len.min(self.pending.len());
        self.pending.drain(..len);
    }

    pub fn take_pending(&mut self) -> String {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.latest.clear();
        self.pending.clear();
    }
}
