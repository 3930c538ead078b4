//! Conversion of generic section trees into typed slides.
//!
//! Every converter returns "no node" for content it cannot (yet) render,
//! so an incomplete item simply drops out of its group until more text
//! arrives.

mod chart;
mod groups;
mod inline;
mod table;

use crate::generating::GenerationTagger;
use crate::slide::{
    Alignment, Button, ButtonSize, ButtonVariant, Column, Container, Descendant, Icon, Image,
    LayoutType, ListStyle, Paragraph, RootImage, Slide, SlideId, SlideNode,
};
use crate::tree::{GenericNode, decode_entities};

use groups::GroupKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Heading(u8),
    Paragraph,
    Image,
    Icon,
    Columns,
    Div,
    Group(GroupKind),
    Chart,
    Table,
    Button,
    ListItem,
    List(ListStyle),
}

impl BlockKind {
    /// Block-level kind of an element tag; `None` means inline content.
    fn of(node: &GenericNode) -> Option<Self> {
        if node.is_text() {
            return None;
        }
        let kind = match node.tag.as_str() {
            "H1" => BlockKind::Heading(1),
            "H2" => BlockKind::Heading(2),
            "H3" => BlockKind::Heading(3),
            "H4" => BlockKind::Heading(4),
            "H5" => BlockKind::Heading(5),
            "H6" => BlockKind::Heading(6),
            "P" => BlockKind::Paragraph,
            "IMG" => BlockKind::Image,
            "ICON" => BlockKind::Icon,
            "COLUMNS" => BlockKind::Columns,
            "DIV" => BlockKind::Div,
            "CHART" => BlockKind::Chart,
            "TABLE" => BlockKind::Table,
            "BUTTON" => BlockKind::Button,
            "LI" => BlockKind::ListItem,
            "UL" => BlockKind::List(ListStyle::Disc),
            "OL" => BlockKind::List(ListStyle::Decimal),
            tag => BlockKind::Group(GroupKind::from_tag(tag)?),
        };
        Some(kind)
    }
}

/// Maps generic trees to [`Slide`]s.
pub struct Converter<'a> {
    tagger: GenerationTagger<'a>,
    column_width: &'a str,
    default_alignment: Alignment,
}

impl<'a> Converter<'a> {
    pub fn new(tagger: GenerationTagger<'a>, column_width: &'a str, default_alignment: Alignment) -> Self {
        Self {
            tagger,
            column_width,
            default_alignment,
        }
    }

    pub fn convert_section(&self, section: &GenericNode, id: SlideId) -> Slide {
        let mut slide = Slide::new(id);
        slide.layout_type = section.attr("layout").and_then(LayoutType::parse);
        slide.alignment = section
            .attr("align")
            .or_else(|| section.attr("alignment"))
            .and_then(Alignment::parse)
            .unwrap_or(self.default_alignment);
        slide.bg_color = non_empty(section.attr("bgcolor").or_else(|| section.attr("bg-color")));
        slide.width = non_empty(section.attr("width"));

        self.convert_top_level(&section.children, &mut slide);
        slide
    }

    /// Section-level pass: root images are lifted out and bare `DIV`s are
    /// unwrapped so their children become top-level content.
    fn convert_top_level(&self, children: &[GenericNode], slide: &mut Slide) {
        let mut pending: Vec<&GenericNode> = Vec::new();
        for child in children {
            if child.is("IMG") {
                if slide.root_image.is_none() {
                    slide.root_image = image_payload(child).map(|image| RootImage {
                        query: image.query,
                        url: image.url,
                        layout_type: slide.layout_type,
                    });
                }
                continue;
            }
            if child.is("DIV") {
                slide.content.extend(self.convert_children(pending.drain(..)));
                self.convert_top_level(&child.children, slide);
                continue;
            }
            pending.push(child);
        }
        slide.content.extend(self.convert_children(pending));
    }

    /// Convert a sibling list in block context. Inline material between
    /// blocks is gathered into one paragraph and consecutive `LI`s are
    /// converted together as one list run.
    pub(crate) fn convert_children<'n>(
        &self,
        nodes: impl IntoIterator<Item = &'n GenericNode>,
    ) -> Vec<SlideNode> {
        let nodes: Vec<&GenericNode> = nodes.into_iter().collect();
        let mut out = Vec::new();
        let mut inline: Vec<&GenericNode> = Vec::new();

        let mut i = 0;
        while i < nodes.len() {
            let node = nodes[i];
            let Some(kind) = BlockKind::of(node) else {
                inline.push(node);
                i += 1;
                continue;
            };
            self.flush_inline(&mut inline, &mut out);

            if kind == BlockKind::ListItem {
                let end = list_run_end(&nodes, i);
                let items = nodes[i..end].iter().copied().filter(|n| n.is("LI"));
                out.extend(self.list_paragraphs(items, ListStyle::Disc));
                i = end;
                continue;
            }

            self.convert_block(kind, node, &mut out);
            i += 1;
        }
        self.flush_inline(&mut inline, &mut out);
        out
    }

    fn convert_block(&self, kind: BlockKind, node: &GenericNode, out: &mut Vec<SlideNode>) {
        match kind {
            BlockKind::Heading(level) => out.extend(self.heading(level, node)),
            BlockKind::Paragraph => out.extend(self.paragraph(node)),
            BlockKind::Image => out.extend(image_payload(node).map(|image| {
                SlideNode::Image(Image {
                    query: image.query,
                    url: image.url,
                })
            })),
            BlockKind::Icon => out.extend(icon(node)),
            BlockKind::Columns => out.extend(self.columns(node)),
            BlockKind::Div => out.extend(self.convert_children(&node.children)),
            BlockKind::Group(group) => out.extend(self.group(group, node)),
            BlockKind::Chart => out.push(chart::convert_chart(node)),
            BlockKind::Table => out.extend(self.table(node)),
            BlockKind::Button => out.extend(self.button(node)),
            BlockKind::ListItem => {
                out.extend(self.list_paragraphs(std::iter::once(node), ListStyle::Disc))
            }
            BlockKind::List(style) => {
                let items = node.elements().filter(|c| c.is("LI"));
                out.extend(self.list_paragraphs(items, style));
            }
        }
    }

    fn flush_inline(&self, inline: &mut Vec<&GenericNode>, out: &mut Vec<SlideNode>) {
        if inline.is_empty() {
            return;
        }
        let runs = self.inline_runs(inline.drain(..));
        if !runs.is_empty() {
            out.push(SlideNode::Paragraph(Paragraph {
                children: into_descendants(runs),
                ..Paragraph::default()
            }));
        }
    }

    fn heading(&self, level: u8, node: &GenericNode) -> Option<SlideNode> {
        let runs = self.inline_runs(&node.children);
        if runs.is_empty() {
            return None;
        }
        Some(SlideNode::heading(level, into_descendants(runs)))
    }

    fn paragraph(&self, node: &GenericNode) -> Option<SlideNode> {
        let runs = self.inline_runs(&node.children);
        if runs.is_empty() {
            return None;
        }
        Some(SlideNode::Paragraph(Paragraph {
            children: into_descendants(runs),
            ..Paragraph::default()
        }))
    }

    fn list_paragraphs<'n>(
        &self,
        items: impl IntoIterator<Item = &'n GenericNode>,
        style: ListStyle,
    ) -> Vec<SlideNode> {
        let mut out = Vec::new();
        let mut position = 0;
        for item in items {
            let runs = self.inline_runs(&item.children);
            if runs.is_empty() {
                continue;
            }
            position += 1;
            out.push(SlideNode::Paragraph(Paragraph {
                children: into_descendants(runs),
                indent: Some(1),
                list_style_type: Some(style),
                list_start: (style == ListStyle::Decimal).then_some(position),
            }));
        }
        out
    }

    fn columns(&self, node: &GenericNode) -> Option<SlideNode> {
        let columns: Vec<SlideNode> = node
            .elements()
            .filter(|c| c.is("DIV"))
            .map(|div| {
                SlideNode::Column(Column {
                    width: self.column_width.to_string(),
                    children: into_descendants(self.convert_children(&div.children)),
                })
            })
            .collect();
        if columns.is_empty() {
            return None;
        }
        Some(SlideNode::ColumnGroup(Container::new(columns)))
    }

    fn button(&self, node: &GenericNode) -> Option<SlideNode> {
        let runs = self.inline_runs(&node.children);
        if runs.is_empty() {
            return None;
        }
        Some(SlideNode::Button(Button {
            variant: node.attr("variant").and_then(ButtonVariant::parse),
            size: node.attr("size").and_then(ButtonSize::parse),
            children: into_descendants(runs),
        }))
    }
}

/// Index one past the last `LI` of the run starting at `start`; whitespace
/// between items does not break the run.
fn list_run_end(nodes: &[&GenericNode], start: usize) -> usize {
    let mut last = start;
    for (j, node) in nodes.iter().enumerate().skip(start) {
        if node.is("LI") {
            last = j;
        } else if !(node.is_text() && node.text.trim().is_empty()) {
            break;
        }
    }
    last + 1
}

fn into_descendants<T: Into<Descendant>>(items: Vec<T>) -> Vec<Descendant> {
    items.into_iter().map(Into::into).collect()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

struct ImagePayload {
    query: String,
    url: Option<String>,
}

/// An image is complete only once its `query` attribute is quoted and the
/// closing quote has arrived.
fn image_payload(node: &GenericNode) -> Option<ImagePayload> {
    let raw = node.raw_opening_tag.as_deref()?;
    let query = closed_quoted_value(raw, "query")?;
    let query = decode_entities(query).trim().to_string();
    if query.is_empty() {
        return None;
    }
    let url = closed_quoted_value(raw, "src")
        .or_else(|| closed_quoted_value(raw, "url"))
        .and_then(|url| non_empty(Some(decode_entities(url).as_str())));
    Some(ImagePayload { query, url })
}

fn icon(node: &GenericNode) -> Option<SlideNode> {
    let raw = node.raw_opening_tag.as_deref()?;
    let name = closed_quoted_value(raw, "name")
        .and_then(|n| non_empty(Some(decode_entities(n).as_str())));
    let query = closed_quoted_value(raw, "query")
        .and_then(|q| non_empty(Some(decode_entities(q).as_str())))
        .or_else(|| name.clone())?;
    Some(SlideNode::Icon(Icon { query, name }))
}

/// Value of `name="..."` / `name='...'` in a raw opening tag, only if the
/// matching closing quote is present.
fn closed_quoted_value<'r>(raw: &'r str, name: &str) -> Option<&'r str> {
    let lower = raw.to_ascii_lowercase();
    let bytes = raw.as_bytes();
    let pattern = format!("{name}=");
    let mut from = 0;
    while let Some(rel) = lower[from..].find(&pattern) {
        let at = from + rel;
        from = at + 1;
        if at > 0 && !bytes[at - 1].is_ascii_whitespace() {
            continue;
        }
        let value_start = at + pattern.len();
        let quote = *bytes.get(value_start)?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        let rest = &raw[value_start + 1..];
        return rest.find(quote as char).map(|end| &rest[..end]);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slide::TextRun;
    use crate::tree::parse_section;
    use pretty_assertions::assert_eq;

    pub(super) fn convert(xml: &str) -> Slide {
        let section = parse_section(xml, 64);
        Converter::new(GenerationTagger::disabled(), "50%", Alignment::Center)
            .convert_section(&section, SlideId::new("test"))
    }

    pub(super) fn runs(text: &str) -> Vec<Descendant> {
        vec![TextRun::plain(text).into()]
    }

    #[test]
    fn headings_and_paragraphs() {
        let slide = convert("<SECTION><H1>Title</H1><H3>Sub</H3><P>Body</P></SECTION>");
        assert_eq!(
            slide.content,
            vec![
                SlideNode::heading(1, runs("Title")),
                SlideNode::heading(3, runs("Sub")),
                SlideNode::Paragraph(Paragraph {
                    children: runs("Body"),
                    ..Paragraph::default()
                }),
            ]
        );
    }

    #[test]
    fn empty_heading_is_not_rendered_yet() {
        let slide = convert("<SECTION><H1></H1><P>  </P></SECTION>");
        assert!(slide.content.is_empty());
    }

    #[test]
    fn section_attributes_fill_slide_fields() {
        let slide = convert(
            r##"<SECTION layout="right" align="end" bgcolor="#102030" width="L"><H1>x</H1></SECTION>"##,
        );
        assert_eq!(slide.layout_type, Some(LayoutType::Right));
        assert_eq!(slide.alignment, Alignment::End);
        assert_eq!(slide.bg_color.as_deref(), Some("#102030"));
        assert_eq!(slide.width.as_deref(), Some("L"));

        let plain = convert("<SECTION layout=\"diagonal\"><H1>x</H1></SECTION>");
        assert_eq!(plain.layout_type, None);
        assert_eq!(plain.alignment, Alignment::Center);
    }

    #[test]
    fn root_image_is_lifted_out_of_content() {
        let slide = convert(
            r#"<SECTION layout="left"><IMG query="first"/><H1>x</H1><IMG query="second" /></SECTION>"#,
        );
        let root = slide.root_image.unwrap();
        assert_eq!(root.query, "first");
        assert_eq!(root.layout_type, Some(LayoutType::Left));
        assert_eq!(slide.content, vec![SlideNode::heading(1, runs("x"))]);
    }

    #[test]
    fn incomplete_root_image_is_skipped_for_a_later_valid_one() {
        let slide = convert(r#"<SECTION><IMG query=sunset/><IMG query="dawn"/></SECTION>"#);
        assert_eq!(slide.root_image.unwrap().query, "dawn");
    }

    #[test]
    fn nested_image_requires_closed_query() {
        let done = convert(r#"<SECTION><COLUMNS><DIV><IMG query='a cat' src="https://x/c.png"/></DIV></COLUMNS></SECTION>"#);
        let SlideNode::ColumnGroup(group) = &done.content[0] else {
            panic!("expected column group");
        };
        let Descendant::Element(SlideNode::Column(column)) = &group.children[0] else {
            panic!("expected column");
        };
        assert_eq!(
            column.children,
            vec![Descendant::Element(SlideNode::Image(Image {
                query: "a cat".into(),
                url: Some("https://x/c.png".into()),
            }))]
        );

        let partial = convert(r#"<SECTION><COLUMNS><DIV><IMG query="a c"#);
        let SlideNode::ColumnGroup(group) = &partial.content[0] else {
            panic!("expected column group");
        };
        let Descendant::Element(SlideNode::Column(column)) = &group.children[0] else {
            panic!("expected column");
        };
        assert!(column.children.is_empty());
    }

    #[test]
    fn quoted_value_lookup() {
        assert_eq!(closed_quoted_value(r#"IMG query="x y""#, "query"), Some("x y"));
        assert_eq!(closed_quoted_value(r#"IMG QUERY='z'"#, "query"), Some("z"));
        assert_eq!(closed_quoted_value(r#"IMG query="x"#, "query"), None);
        assert_eq!(closed_quoted_value(r#"IMG subquery="x" query="y""#, "query"), Some("y"));
        assert_eq!(closed_quoted_value("IMG query=x", "query"), None);
    }

    #[test]
    fn bare_li_siblings_become_one_list_run() {
        let slide = convert("<SECTION><LI>one</LI>\n<LI>two</LI><P>after</P></SECTION>");
        let list_item = |text| {
            SlideNode::Paragraph(Paragraph {
                children: runs(text),
                indent: Some(1),
                list_style_type: Some(ListStyle::Disc),
                list_start: None,
            })
        };
        assert_eq!(
            slide.content,
            vec![
                list_item("one"),
                list_item("two"),
                SlideNode::Paragraph(Paragraph {
                    children: runs("after"),
                    ..Paragraph::default()
                }),
            ]
        );
    }

    #[test]
    fn ordered_list_numbers_its_items() {
        let slide = convert("<SECTION><OL><LI>a</LI><LI>b</LI></OL></SECTION>");
        let starts: Vec<_> = slide
            .content
            .iter()
            .map(|n| match n {
                SlideNode::Paragraph(p) => (p.list_style_type, p.list_start),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            starts,
            vec![(Some(ListStyle::Decimal), Some(1)), (Some(ListStyle::Decimal), Some(2))]
        );
    }

    #[test]
    fn columns_use_default_width() {
        let slide = convert("<SECTION><COLUMNS><DIV><H3>A</H3></DIV><DIV><P>B</P></DIV></COLUMNS></SECTION>");
        let SlideNode::ColumnGroup(group) = &slide.content[0] else {
            panic!("expected column group");
        };
        assert_eq!(group.children.len(), 2);
        for child in &group.children {
            let Descendant::Element(SlideNode::Column(column)) = child else {
                panic!("expected column");
            };
            assert_eq!(column.width, "50%");
            assert_eq!(column.children.len(), 1);
        }
    }

    #[test]
    fn bare_div_under_section_is_unwrapped() {
        let slide = convert("<SECTION><DIV><H2>A</H2><DIV><P>B</P></DIV></DIV><P>C</P></SECTION>");
        assert_eq!(slide.content.len(), 3);
        assert_eq!(slide.content[0].heading_level(), Some(2));
        assert_eq!(slide.content[1].plain_text(), "B");
        assert_eq!(slide.content[2].plain_text(), "C");
    }

    #[test]
    fn unknown_tags_wrap_or_drop() {
        let slide = convert("<SECTION><CALLOUT>Note <B>this</B></CALLOUT><SPACER/><FOO></FOO></SECTION>");
        assert_eq!(slide.content.len(), 1);
        let SlideNode::Paragraph(p) = &slide.content[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            p.children,
            vec![
                TextRun::plain("Note ").into(),
                TextRun {
                    text: "this".into(),
                    bold: true,
                    ..TextRun::default()
                }
                .into(),
            ]
        );
    }

    #[test]
    fn button_variant_and_size_are_validated() {
        let slide = convert(
            r#"<SECTION><BUTTON variant="outline" size="xl">Go</BUTTON><BUTTON>Empty variant</BUTTON><BUTTON></BUTTON></SECTION>"#,
        );
        assert_eq!(
            slide.content,
            vec![
                SlideNode::Button(Button {
                    variant: Some(ButtonVariant::Outline),
                    size: None,
                    children: runs("Go"),
                }),
                SlideNode::Button(Button {
                    children: runs("Empty variant"),
                    ..Button::default()
                }),
            ]
        );
    }

    #[test]
    fn icon_needs_query_or_name() {
        let slide = convert(
            r#"<SECTION><ICONS><DIV><ICON query="rocket"/><H3>Launch</H3></DIV><DIV><ICON name="star"/></DIV><DIV><ICON/></DIV></ICONS></SECTION>"#,
        );
        let SlideNode::Icons(group) = &slide.content[0] else {
            panic!("expected icons");
        };
        let firsts: Vec<_> = group
            .children
            .iter()
            .map(|item| match item {
                Descendant::Element(SlideNode::IconItem(c)) => c.children.first().cloned(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            firsts,
            vec![
                Some(Descendant::Element(SlideNode::Icon(Icon {
                    query: "rocket".into(),
                    name: None
                }))),
                Some(Descendant::Element(SlideNode::Icon(Icon {
                    query: "star".into(),
                    name: Some("star".into())
                }))),
                None,
            ]
        );
    }

    #[test]
    fn raw_fallback_text_becomes_a_paragraph() {
        let slide = convert("loose words");
        assert_eq!(slide.content[0].plain_text(), "loose words");
    }
}
