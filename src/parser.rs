use crate::buffer::{Ingest, StreamBuffer};
use crate::config::Config;
use crate::convert::Converter;
use crate::generating::GenerationTagger;
use crate::identity::{IdentityMap, fingerprint};
use crate::section::{SectionExtractor, force_close};
use crate::slide::Slide;
use crate::tree::parse_section;

/// Incremental parser turning a growing completion into slides.
///
/// Feed it the full accumulated text each time with [`parse_chunk`]; call
/// [`finalize`] once the stream ends. One producer per instance: calls must
/// not interleave.
///
/// [`parse_chunk`]: SlideParser::parse_chunk
/// [`finalize`]: SlideParser::finalize
#[derive(Debug, Default)]
pub struct SlideParser {
    config: Config,
    buffer: StreamBuffer,
    identities: IdentityMap,
    slides: Vec<Slide>,
    /// The last entry of `slides` was built from the trailing, still-open
    /// section and is rebuilt on every call
    provisional: bool,
}

impl SlideParser {
    pub fn new() -> Self {
        Self::with_config(Config::compiled_default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ingest the accumulated stream text and return the slides whose
    /// sections completed during this call.
    pub fn parse_chunk(&mut self, chunk: &str) -> Vec<Slide> {
        if self.buffer.ingest(chunk) == Ingest::Replaced {
            tracing::debug!("chunk does not extend the buffer, restarting stream");
        }
        self.drain(false)
    }

    /// Flush everything still buffered, force-closing a trailing open
    /// section regardless of its content, and return all slides.
    pub fn finalize(&mut self) -> Vec<Slide> {
        self.drain(true);
        self.slides.clone()
    }

    pub fn get_all_slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Clear per-stream state. Known fingerprints keep their slide ids.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.slides.clear();
        self.provisional = false;
    }

    /// Drop every generating mark, once the stream has ended.
    pub fn clear_all_generating_marks(&mut self) {
        for slide in &mut self.slides {
            slide.clear_generating_marks();
        }
    }

    fn drain(&mut self, finalize: bool) -> Vec<Slide> {
        if std::mem::take(&mut self.provisional) {
            self.slides.pop();
        }

        let extraction = SectionExtractor::new(&self.config.sections.content_tags)
            .extract(self.buffer.pending());
        self.buffer.consume(extraction.consumed);

        let mut completed = Vec::with_capacity(extraction.sections.len());
        for section in &extraction.sections {
            let slide = self.convert(section);
            self.commit(slide.clone());
            completed.push(slide);
        }

        if extraction.open {
            if finalize {
                let fragment = self.buffer.take_pending();
                tracing::debug!("finalize: force-closing trailing section");
                let slide = self.convert(&force_close(&fragment));
                self.commit(slide.clone());
                completed.push(slide);
            } else if SectionExtractor::new(&self.config.sections.content_tags)
                .has_content_tag(self.buffer.pending())
            {
                let section = force_close(self.buffer.pending());
                let slide = self.convert(&section);
                self.show_provisional(slide);
            }
        }

        completed
    }

    fn convert(&mut self, section: &str) -> Slide {
        let tree = parse_section(section, self.config.tree.max_depth);
        let id = self.identities.resolve(fingerprint(&tree, section));
        let tagger = GenerationTagger::new(self.buffer.latest(), self.config.generating.enabled);
        Converter::new(
            tagger,
            &self.config.layout.column_width,
            self.config.layout.default_alignment,
        )
        .convert_section(&tree, id)
    }

    /// Insert a slide from a completed section, replacing an earlier one
    /// with the same id.
    fn commit(&mut self, slide: Slide) {
        match self.slides.iter_mut().find(|s| s.id == slide.id) {
            Some(existing) => *existing = slide,
            None => self.slides.push(slide),
        }
    }

    /// Append the live slide as the trailing entry. While its fingerprint
    /// still matches a completed slide it stays hidden.
    fn show_provisional(&mut self, slide: Slide) {
        if self.slides.iter().any(|s| s.id == slide.id) {
            tracing::debug!(id = %slide.id, "open section shares an id with a completed slide");
            return;
        }
        self.slides.push(slide);
        self.provisional = true;
    }
}
