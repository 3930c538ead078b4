//! Streaming parser for AI-generated slide markup.
//!
//! Language models emit decks as `<SECTION>` blocks token by token. The
//! [`SlideParser`] accepts the growing text after every token and keeps a
//! list of typed [`Slide`]s whose ids stay stable while a section is
//! re-parsed, marking the run that is still being written.

mod buffer;
mod config;
mod convert;
mod error;
mod generating;
mod identity;
mod parser;
mod section;
mod slide;
mod tree;

pub use buffer::{Ingest, StreamBuffer};
pub use config::{Config, GeneratingConfig, LayoutConfig, SectionsConfig, TreeConfig};
pub use convert::Converter;
pub use error::{Error, Result};
pub use generating::GenerationTagger;
pub use identity::{IdentityMap, fingerprint};
pub use parser::SlideParser;
pub use section::{Extraction, SectionExtractor, force_close};
pub use slide::{
    Alignment, Button, ButtonSize, ButtonVariant, Chart, ChartData, ChartType, Column, Container,
    Descendant, Icon, Image, LabeledPoint, LayoutType, ListStyle, Paragraph, RootImage,
    ScatterPoint, Slide, SlideId, SlideNode, TableCell, TextRun,
};
pub use tree::{GenericNode, TreeBuilder, decode_entities, parse_attributes, parse_section};

/// Parse a complete document into slides using the default config.
pub fn parse_document(markup: &str) -> Vec<Slide> {
    parse_document_with_config(markup, Config::compiled_default())
}

/// Parse a complete document into slides with a custom config.
pub fn parse_document_with_config(markup: &str, config: Config) -> Vec<Slide> {
    let mut parser = SlideParser::with_config(config);
    parser.parse_chunk(markup);
    parser.finalize();
    parser.clear_all_generating_marks();
    parser.get_all_slides().to_vec()
}
