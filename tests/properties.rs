//! Property tests: malformed or truncated input never panics and the
//! parser's lifecycle guarantees hold for arbitrary streams.

use proptest::prelude::*;
use slidestream::SlideParser;

const TOKENS: &[&str] = &[
    "<SECTION>",
    "</SECTION>",
    "<SECTION layout=\"left\">",
    "<H1>",
    "</H1>",
    "<P>",
    "</P>",
    "<LI>",
    "<IMG query=\"",
    "\"/>",
    "<BULLETS><DIV>",
    "</DIV>",
    "<CHART charttype=\"scatter\"><DATA><X>",
    "<TABLE><TR><TD colspan=",
    "<!--",
    "-->",
    "<",
    ">",
    "&amp;",
];

fn markup_token() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(TOKENS).prop_map(String::from),
        1 => "[a-zA-Z0-9 éß]{0,6}",
    ]
}

fn markup_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(markup_token(), 0..40).prop_map(|tokens| tokens.concat())
}

proptest! {
    #[test]
    fn arbitrary_text_never_panics(text in any::<String>()) {
        let mut parser = SlideParser::new();
        parser.parse_chunk(&text);
        parser.finalize();
    }

    #[test]
    fn every_prefix_of_markup_soup_is_accepted(text in markup_soup()) {
        let mut parser = SlideParser::new();
        for (i, _) in text.char_indices() {
            parser.parse_chunk(&text[..i]);
        }
        parser.parse_chunk(&text);
        let first = parser.finalize();
        let second = parser.finalize();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn out_of_order_chunks_are_accepted(text in markup_soup(), cuts in prop::collection::vec(any::<prop::sample::Index>(), 1..8)) {
        let mut parser = SlideParser::new();
        let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        for cut in cuts {
            let end = boundaries[cut.index(boundaries.len())];
            parser.parse_chunk(&text[..end]);
        }
        parser.finalize();
        parser.clear_all_generating_marks();
        prop_assert!(parser.get_all_slides().iter().flat_map(|s| s.text_runs()).all(|r| !r.generating));
    }
}
