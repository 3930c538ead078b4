use std::collections::BTreeMap;

pub const TEXT_TAG: &str = "#text";
const ROOT_TAG: &str = "#document";
const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

/// Untyped element or text node produced by the tree builder.
///
/// Tag names are stored uppercased, attribute names lowercased. Text nodes
/// carry [`TEXT_TAG`] and keep their (entity-decoded) text in `text`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericNode {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    /// Undecoded source of the last text segment merged into this node
    pub source: String,
    pub children: Vec<GenericNode>,
    /// Raw text between `<` and `>` (or end of input when unterminated)
    pub raw_opening_tag: Option<String>,
}

impl GenericNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn text_node(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            tag: TEXT_TAG.to_string(),
            source: text.clone(),
            text,
            ..Self::default()
        }
    }

    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Element children, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &GenericNode> {
        self.children.iter().filter(|c| !c.is_text())
    }

    pub fn first_child(&self, tag: &str) -> Option<&GenericNode> {
        self.elements().find(|c| c.is(tag))
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if self.is_text() {
            out.push_str(&self.text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let decoded = decode_entities(text);
        match self.children.last_mut() {
            Some(last) if last.is_text() => {
                last.text.push_str(&decoded);
                last.source = text.to_string();
            }
            _ => {
                let mut node = GenericNode::text_node(decoded);
                node.source = text.to_string();
                self.children.push(node);
            }
        }
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "IMG" | "ICON" | "BR" | "HR")
}

/// Recursive, never-failing parser for the markup of one section.
pub struct TreeBuilder<'a> {
    input: &'a str,
    pos: usize,
    max_depth: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(input: &'a str, max_depth: usize) -> Self {
        Self {
            input,
            pos: 0,
            max_depth: max_depth.max(1),
        }
    }

    /// Parse the whole input into a synthetic document root.
    pub fn parse_document(mut self) -> GenericNode {
        let mut root = GenericNode::element(ROOT_TAG);
        let mut open = vec![root.tag.clone()];
        self.parse_element(&mut root, &mut open);
        root
    }

    /// Consume input into `parent.children` until `parent`'s closing tag,
    /// a closing tag of an open ancestor (left unconsumed), or end of input.
    /// Closing tags matching nothing open are skipped.
    fn parse_element(&mut self, parent: &mut GenericNode, open: &mut Vec<String>) {
        let input = self.input;
        loop {
            let rest = &input[self.pos..];
            if rest.is_empty() {
                return;
            }

            let Some(lt) = rest.find('<') else {
                parent.push_text(rest);
                self.pos = input.len();
                return;
            };
            if lt > 0 {
                parent.push_text(&rest[..lt]);
                self.pos += lt;
                continue;
            }

            if let Some(body) = rest.strip_prefix(COMMENT_START) {
                self.pos += match body.find(COMMENT_END) {
                    Some(end) => COMMENT_START.len() + end + COMMENT_END.len(),
                    None => rest.len(),
                };
                continue;
            }

            if rest.starts_with("<!") || rest.starts_with("<?") {
                self.pos += rest.find('>').map_or(rest.len(), |end| end + 1);
                continue;
            }

            if let Some(after) = rest.strip_prefix("</") {
                let (name, consumed) = match after.find('>') {
                    Some(end) => (&after[..end], 2 + end + 1),
                    None => (after, rest.len()),
                };
                let name = name.trim().to_ascii_uppercase();
                if name == parent.tag {
                    self.pos += consumed;
                    return;
                }
                if open.iter().any(|tag| *tag == name) {
                    return;
                }
                tracing::trace!(tag = %name, "skipping unmatched closing tag");
                self.pos += consumed;
                continue;
            }

            let after = &rest[1..];
            if !after.starts_with(|c: char| c.is_alphabetic()) {
                // A bare `<` in running text, e.g. "a < b"
                parent.push_text("<");
                self.pos += 1;
                continue;
            }

            let (tag_text, consumed, terminated) = match after.find('>') {
                Some(end) => (&after[..end], 1 + end + 1, true),
                None => (after, rest.len(), false),
            };
            self.pos += consumed;

            let (mut node, self_closing) = open_tag(tag_text);
            let descend = terminated
                && !self_closing
                && !is_void(&node.tag)
                && open.len() < self.max_depth;
            if descend {
                open.push(node.tag.clone());
                self.parse_element(&mut node, open);
                open.pop();
            }
            parent.children.push(node);
        }
    }
}

fn open_tag(tag_text: &str) -> (GenericNode, bool) {
    let trimmed = tag_text.trim_end();
    let (body, self_closing) = match trimmed.strip_suffix('/') {
        Some(body) => (body, true),
        None => (trimmed, false),
    };
    let (name, attrs) = match body.find(char::is_whitespace) {
        Some(split) => (&body[..split], &body[split..]),
        None => (body, ""),
    };

    let node = GenericNode {
        tag: name.to_ascii_uppercase(),
        attributes: parse_attributes(attrs),
        raw_opening_tag: Some(tag_text.to_string()),
        ..GenericNode::default()
    };
    (node, self_closing)
}

/// Parse `name=value` pairs. Values may be quoted (an unterminated quote
/// runs to the end) or bare (up to the next whitespace).
pub fn parse_attributes(input: &str) -> BTreeMap<String, String> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut attributes = BTreeMap::new();
    let mut i = 0;

    let skip_whitespace = |i: &mut usize| {
        while *i < len && bytes[*i].is_ascii_whitespace() {
            *i += 1;
        }
    };

    loop {
        skip_whitespace(&mut i);
        if i >= len {
            break;
        }

        let name_start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
            i += 1;
        }
        let name = &input[name_start..i];

        let mut j = i;
        skip_whitespace(&mut j);
        let value = if j < len && bytes[j] == b'=' {
            i = j + 1;
            skip_whitespace(&mut i);
            if i < len && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i] as char;
                let start = i + 1;
                match input[start..].find(quote) {
                    Some(end) => {
                        i = start + end + 1;
                        &input[start..start + end]
                    }
                    None => {
                        i = len;
                        &input[start..]
                    }
                }
            } else {
                let start = i;
                while i < len && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                &input[start..i]
            }
        } else {
            ""
        };

        if name.is_empty() {
            // Stray `=value` with no name
            continue;
        }
        attributes.insert(name.to_ascii_lowercase(), decode_entities(value));
    }

    attributes
}

/// Decode the predefined XML entities and numeric character references.
/// Unknown or malformed references are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi + 1))
        });
        match decoded {
            Some((ch, used)) => {
                out.push(ch);
                rest = &rest[used..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Build the tree for one section string.
///
/// Falls back to splitting the raw text on the section markers, keeping
/// the inner text unparsed, when no `<SECTION>` element can be recovered.
pub fn parse_section(xml: &str, max_depth: usize) -> GenericNode {
    let mut root = TreeBuilder::new(xml, max_depth).parse_document();
    match root.children.iter().position(|c| c.is("SECTION")) {
        Some(index) => root.children.swap_remove(index),
        None => {
            tracing::debug!("no section element recovered, using raw split");
            raw_section(xml)
        }
    }
}

fn raw_section(xml: &str) -> GenericNode {
    let upper = xml.to_ascii_uppercase();
    let start = upper
        .find("<SECTION")
        .map(|open| upper[open..].find('>').map_or(xml.len(), |end| open + end + 1))
        .unwrap_or(0);
    let end = upper[start..]
        .find("</SECTION>")
        .map_or(xml.len(), |end| start + end);

    let mut section = GenericNode::element("SECTION");
    section.raw_opening_tag = Some("SECTION".to_string());
    let inner = &xml[start..end];
    if !inner.is_empty() {
        section.children.push(GenericNode::text_node(inner));
    }
    section
}
