const SECTION_OPEN: &str = "<SECTION";
const SECTION_CLOSE: &str = "</SECTION>";

/// Result of one scan over the pending buffer
#[derive(Debug, Default, PartialEq)]
pub struct Extraction {
    /// Completed section strings, each ending in `</SECTION>`
    pub sections: Vec<String>,
    /// Bytes of the buffer that may be dropped
    pub consumed: usize,
    /// Whether the buffer, once consumed, starts with a still-open section
    pub open: bool,
}

/// Finds `<SECTION>` blocks in a partially streamed document.
///
/// Matching is ASCII case-insensitive. An open section is force-closed when
/// the next `<SECTION` start shows up before its closing tag, provided the
/// fragment holds at least one content tag; otherwise it is dropped as noise.
pub struct SectionExtractor<'c> {
    content_tags: &'c [String],
}

impl<'c> SectionExtractor<'c> {
    pub fn new(content_tags: &'c [String]) -> Self {
        Self { content_tags }
    }

    pub fn extract(&self, buffer: &str) -> Extraction {
        let upper = buffer.to_ascii_uppercase();
        let mut extraction = Extraction::default();
        let mut cursor = 0;

        loop {
            let from = skip_preamble(&upper, cursor);
            let Some(start) = find_section_start(&upper, from) else {
                break;
            };
            let body = start + SECTION_OPEN.len();
            let close = upper[body..].find(SECTION_CLOSE).map(|at| body + at);
            let next = find_section_start(&upper, body);

            match (close, next) {
                (Some(close), next) if next.is_none_or(|next| close < next) => {
                    let end = close + SECTION_CLOSE.len();
                    tracing::trace!(start, end, "extracted section");
                    extraction.sections.push(buffer[start..end].to_string());
                    cursor = end;
                }
                (_, Some(next)) => {
                    let fragment = &buffer[start..next];
                    if self.has_content_tag(fragment) {
                        tracing::debug!(start, next, "force-closing unterminated section");
                        extraction.sections.push(force_close(fragment));
                    } else {
                        tracing::debug!(start, next, "discarding section fragment without content");
                    }
                    cursor = next;
                }
                _ => {
                    extraction.open = true;
                    cursor = start;
                    break;
                }
            }
        }

        extraction.consumed = cursor;
        extraction
    }

    /// Whether `fragment` contains an opening tag from the content tag list.
    pub fn has_content_tag(&self, fragment: &str) -> bool {
        let upper = fragment.to_ascii_uppercase();
        self.content_tags.iter().any(|tag| {
            let needle = format!("<{}", tag.to_ascii_uppercase());
            let bytes = upper.as_bytes();
            upper.match_indices(&needle).any(|(at, _)| {
                bytes
                    .get(at + needle.len())
                    .is_none_or(|&b| !b.is_ascii_alphanumeric() && b != b'-')
            })
        })
    }
}

/// Terminate an open section fragment with a synthesized closing tag.
pub fn force_close(fragment: &str) -> String {
    let mut section = String::with_capacity(fragment.len() + SECTION_CLOSE.len());
    section.push_str(fragment);
    section.push_str(SECTION_CLOSE);
    section
}

/// Skip whitespace, comments, declarations and a `<PRESENTATION>` wrapper.
fn skip_preamble(upper: &str, mut pos: usize) -> usize {
    loop {
        let rest = &upper[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();

        let skip = if let Some(body) = trimmed.strip_prefix("<!--") {
            body.find("-->").map(|end| 4 + end + 3)
        } else if trimmed.starts_with("<?") || trimmed.starts_with("<PRESENTATION") {
            trimmed.find('>').map(|end| end + 1)
        } else {
            None
        };

        match skip {
            Some(len) => pos += len,
            None => return pos,
        }
    }
}

fn find_section_start(upper: &str, from: usize) -> Option<usize> {
    let bytes = upper.as_bytes();
    let mut search = from;
    while let Some(rel) = upper[search..].find(SECTION_OPEN) {
        let at = search + rel;
        let terminated = match bytes.get(at + SECTION_OPEN.len()) {
            None => true,
            Some(&b) => b == b'>' || b == b'/' || b.is_ascii_whitespace(),
        };
        if terminated {
            return Some(at);
        }
        search = at + 1;
    }
    None
}
