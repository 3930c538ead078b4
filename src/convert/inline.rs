use crate::slide::TextRun;
use crate::tree::GenericNode;

use super::Converter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Marks {
    bold: bool,
    italic: bool,
    underline: bool,
    strikethrough: bool,
}

impl Marks {
    fn with_tag(mut self, tag: &str) -> Self {
        match tag {
            "B" | "STRONG" => self.bold = true,
            "I" | "EM" => self.italic = true,
            "U" => self.underline = true,
            "S" | "STRIKE" | "DEL" => self.strikethrough = true,
            _ => {}
        }
        self
    }
}

/// Text gathered under one set of marks
struct Piece {
    marks: Marks,
    text: String,
    generating: bool,
}

impl Converter<'_> {
    /// Flatten inline content into text runs. Adjacent text with the same
    /// marks is merged, the outer edges are trimmed and empty runs dropped.
    /// The generating mark is decided per source text node, so a merged run
    /// is live when any of its pieces is.
    pub(super) fn inline_runs<'n>(
        &self,
        nodes: impl IntoIterator<Item = &'n GenericNode>,
    ) -> Vec<TextRun> {
        let mut pieces: Vec<Piece> = Vec::new();
        for node in nodes {
            self.collect(node, Marks::default(), &mut pieces);
        }

        while let Some(first) = pieces.first_mut() {
            let trimmed = first.text.trim_start();
            if trimmed.is_empty() {
                pieces.remove(0);
            } else {
                first.text = trimmed.to_string();
                break;
            }
        }
        while let Some(last) = pieces.last_mut() {
            let trimmed = last.text.trim_end();
            if trimmed.is_empty() {
                pieces.pop();
            } else {
                last.text = trimmed.to_string();
                break;
            }
        }

        pieces
            .into_iter()
            .map(|piece| TextRun {
                text: piece.text,
                bold: piece.marks.bold,
                italic: piece.marks.italic,
                underline: piece.marks.underline,
                strikethrough: piece.marks.strikethrough,
                generating: piece.generating,
            })
            .collect()
    }

    fn collect(&self, node: &GenericNode, marks: Marks, out: &mut Vec<Piece>) {
        if node.is_text() {
            let generating = self.tagger.is_generating(&node.source);
            push(out, marks, &node.text, generating);
            return;
        }
        if node.is("BR") {
            push(out, marks, "\n", false);
            return;
        }
        let marks = marks.with_tag(&node.tag);
        for child in &node.children {
            self.collect(child, marks, out);
        }
    }
}

fn push(out: &mut Vec<Piece>, marks: Marks, text: &str, generating: bool) {
    if text.is_empty() {
        return;
    }
    match out.last_mut() {
        Some(last) if last.marks == marks => {
            last.text.push_str(text);
            last.generating |= generating;
        }
        _ => out.push(Piece {
            marks,
            text: text.to_string(),
            generating,
        }),
    }
}
