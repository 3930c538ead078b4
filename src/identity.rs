use std::collections::HashMap;

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::slide::SlideId;
use crate::tree::GenericNode;

const ID_LEN: usize = 12;
const MIN_FINGERPRINT_LEN: usize = 5;

/// Derive the fingerprint that recognizes "the same slide" across re-parses.
///
/// Sections with a non-empty `H1` are keyed by its text. Otherwise the
/// sorted section attributes plus the first three child tags are used, and
/// if that is still too short to be meaningful, a hash of the raw text.
/// Structurally identical headingless sections share a fingerprint.
pub fn fingerprint(section: &GenericNode, raw: &str) -> String {
    if let Some(h1) = find_h1(section) {
        let text = h1.text_content();
        let text = text.trim();
        if !text.is_empty() {
            return format!("heading-{text}");
        }
    }

    let attrs = section
        .attributes
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(";");
    let children = section
        .elements()
        .take(3)
        .map(|c| c.tag.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let structural = format!("{attrs}|{children}");
    if structural.len() >= MIN_FINGERPRINT_LEN {
        return structural;
    }

    format!("content-hash-{}", rolling_hash(raw).unsigned_abs())
}

fn find_h1(node: &GenericNode) -> Option<&GenericNode> {
    for child in node.elements() {
        if child.is("H1") {
            return Some(child);
        }
        if let Some(found) = find_h1(child) {
            return Some(found);
        }
    }
    None
}

/// 32-bit `h * 31 + c` rolling hash over the UTF-16 code units of `text`.
fn rolling_hash(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

fn mint_id() -> SlideId {
    let id: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect();
    SlideId::new(id)
}

/// Fingerprint to slide id map, kept for the lifetime of a parser.
#[derive(Debug, Default)]
pub struct IdentityMap {
    ids: HashMap<String, SlideId>,
}

impl IdentityMap {
    /// Reuse the id recorded for `fingerprint`, or mint and record a new one.
    pub fn resolve(&mut self, fingerprint: String) -> SlideId {
        self.ids
            .entry(fingerprint)
            .or_insert_with_key(|key| {
                let id = mint_id();
                tracing::debug!(fingerprint = %key, id = %id, "minted slide id");
                id
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_section;

    fn fp(xml: &str) -> String {
        fingerprint(&parse_section(xml, 64), xml)
    }

    #[test]
    fn heading_text_wins() {
        assert_eq!(fp("<SECTION layout=\"left\"><H1>  Market Size </H1><P>x</P></SECTION>"), "heading-Market Size");
    }

    #[test]
    fn heading_inside_wrapper_div() {
        assert_eq!(fp("<SECTION><DIV><H1>Wrapped</H1></DIV></SECTION>"), "heading-Wrapped");
    }

    #[test]
    fn structure_when_no_heading() {
        assert_eq!(
            fp("<SECTION layout=\"right\" align=\"start\"><H2>a</H2><P>b</P><BULLETS></BULLETS><P>c</P></SECTION>"),
            "align=start;layout=right|H2,P,BULLETS"
        );
    }

    #[test]
    fn empty_h1_falls_through() {
        assert_eq!(fp("<SECTION><H1> </H1><P>b</P></SECTION>"), "|H1,P");
    }

    #[test]
    fn hash_when_structure_is_too_short() {
        let a = fp("<SECTION><P>x</P></SECTION>");
        let b = fp("<SECTION><P>y</P></SECTION>");
        assert!(a.starts_with("content-hash-"));
        assert_ne!(a, b);
        assert_eq!(a, fp("<SECTION><P>x</P></SECTION>"));
    }

    #[test]
    fn rolling_hash_matches_reference_values() {
        assert_eq!(rolling_hash(""), 0);
        assert_eq!(rolling_hash("a"), 97);
        assert_eq!(rolling_hash("ab"), 97 * 31 + 98);
        // U+1F600 is the surrogate pair D83D DE00
        assert_eq!(rolling_hash("\u{1F600}"), 0xD83D * 31 + 0xDE00);
    }

    #[test]
    fn resolve_is_stable_per_fingerprint() {
        let mut map = IdentityMap::default();
        let a = map.resolve("heading-A".into());
        let b = map.resolve("heading-B".into());
        assert_ne!(a, b);
        assert_eq!(map.resolve("heading-A".into()), a);
        assert_eq!(map.len(), 2);
        assert_eq!(a.as_str().len(), ID_LEN);
    }
}
