/// Decides which text is the live, still-being-written edge of the stream.
///
/// The check is a plain substring search over the latest raw chunk, so an
/// earlier occurrence of repeated text can be tagged as well. The mark is
/// advisory: rendering shows a caret there, nothing structural depends on it.
#[derive(Debug, Clone, Copy)]
pub struct GenerationTagger<'a> {
    latest: &'a str,
    enabled: bool,
}

impl<'a> GenerationTagger<'a> {
    pub fn new(latest: &'a str, enabled: bool) -> Self {
        Self { latest, enabled }
    }

    pub fn disabled() -> Self {
        Self {
            latest: "",
            enabled: false,
        }
    }

    /// True iff the last occurrence of `text` (trimmed) in the latest chunk
    /// ends the chunk or is followed only by non-tag text.
    pub fn is_generating(&self, text: &str) -> bool {
        if !self.enabled {
            return false;
        }
        let needle = text.trim();
        if needle.is_empty() {
            return false;
        }
        let Some(at) = self.latest.rfind(needle) else {
            return false;
        };
        let rest = &self.latest[at + needle.len()..];
        !rest.contains('<')
    }
}
