use std::fmt;

use serde::{Deserialize, Serialize};

/// Session-stable identifier of a slide
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SlideId(String);

impl SlideId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A run of text with inline formatting marks
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub text: String,
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    /// Set while this run is the unterminated live edge of the stream
    #[serde(skip_serializing_if = "is_false")]
    pub generating: bool,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Child of a container node: either a nested element or a text leaf
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Descendant {
    Element(SlideNode),
    Text(TextRun),
}

impl From<SlideNode> for Descendant {
    fn from(node: SlideNode) -> Self {
        Descendant::Element(node)
    }
}

impl From<TextRun> for Descendant {
    fn from(run: TextRun) -> Self {
        Descendant::Text(run)
    }
}

/// Plain container payload shared by headings, groups, items and rows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Container {
    pub children: Vec<Descendant>,
}

impl Container {
    pub fn new(children: impl IntoIterator<Item = impl Into<Descendant>>) -> Self {
        Self {
            children: children.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Disc,
    Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    pub children: Vec<Descendant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_style_type: Option<ListStyle>,
    /// 1-based position inside an ordered run of list items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_start: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Icon {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub width: String,
    pub children: Vec<Descendant>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
    Radar,
    Scatter,
    Area,
}

impl ChartType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bar" => Some(Self::Bar),
            "line" => Some(Self::Line),
            "pie" => Some(Self::Pie),
            "radar" => Some(Self::Radar),
            "scatter" => Some(Self::Scatter),
            "area" => Some(Self::Area),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartData {
    Labeled(Vec<LabeledPoint>),
    Scatter(Vec<ScatterPoint>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub chart_type: ChartType,
    pub data: ChartData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_span: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_span: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub children: Vec<Descendant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    Filled,
    Outline,
    Ghost,
}

impl ButtonVariant {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "filled" => Some(Self::Filled),
            "outline" => Some(Self::Outline),
            "ghost" => Some(Self::Ghost),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonSize {
    Sm,
    Md,
    Lg,
}

impl ButtonSize {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sm" => Some(Self::Sm),
            "md" => Some(Self::Md),
            "lg" => Some(Self::Lg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Button {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<ButtonVariant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<ButtonSize>,
    pub children: Vec<Descendant>,
}

/// Typed slide content element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlideNode {
    H1(Container),
    H2(Container),
    H3(Container),
    H4(Container),
    H5(Container),
    H6(Container),
    #[serde(rename = "p")]
    Paragraph(Paragraph),
    #[serde(rename = "img")]
    Image(Image),
    Icon(Icon),
    ColumnGroup(Container),
    Column(Column),
    Bullets(Container),
    Bullet(Container),
    Icons(Container),
    IconItem(Container),
    Cycle(Container),
    CycleItem(Container),
    Staircase(Container),
    StairItem(Container),
    Pyramid(Container),
    PyramidItem(Container),
    Arrows(Container),
    ArrowItem(Container),
    Timeline(Container),
    TimelineItem(Container),
    Boxes(Container),
    BoxItem(Container),
    Compare(Container),
    CompareSide(Container),
    BeforeAfter(Container),
    BeforeAfterSide(Container),
    ProsCons(Container),
    ProsItem(Container),
    ConsItem(Container),
    SequenceArrow(Container),
    SequenceArrowItem(Container),
    Chart(Chart),
    Table(Container),
    Tr(Container),
    Td(TableCell),
    Th(TableCell),
    Button(Button),
}

impl SlideNode {
    /// Build a heading node; levels outside 1..=6 clamp to the nearest one.
    pub fn heading(level: u8, children: Vec<Descendant>) -> Self {
        let container = Container { children };
        match level {
            0 | 1 => SlideNode::H1(container),
            2 => SlideNode::H2(container),
            3 => SlideNode::H3(container),
            4 => SlideNode::H4(container),
            5 => SlideNode::H5(container),
            _ => SlideNode::H6(container),
        }
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self {
            SlideNode::H1(_) => Some(1),
            SlideNode::H2(_) => Some(2),
            SlideNode::H3(_) => Some(3),
            SlideNode::H4(_) => Some(4),
            SlideNode::H5(_) => Some(5),
            SlideNode::H6(_) => Some(6),
            _ => None,
        }
    }

    /// Children of container variants; `None` for void variants.
    pub fn children(&self) -> Option<&[Descendant]> {
        match self {
            SlideNode::H1(c)
            | SlideNode::H2(c)
            | SlideNode::H3(c)
            | SlideNode::H4(c)
            | SlideNode::H5(c)
            | SlideNode::H6(c)
            | SlideNode::ColumnGroup(c)
            | SlideNode::Bullets(c)
            | SlideNode::Bullet(c)
            | SlideNode::Icons(c)
            | SlideNode::IconItem(c)
            | SlideNode::Cycle(c)
            | SlideNode::CycleItem(c)
            | SlideNode::Staircase(c)
            | SlideNode::StairItem(c)
            | SlideNode::Pyramid(c)
            | SlideNode::PyramidItem(c)
            | SlideNode::Arrows(c)
            | SlideNode::ArrowItem(c)
            | SlideNode::Timeline(c)
            | SlideNode::TimelineItem(c)
            | SlideNode::Boxes(c)
            | SlideNode::BoxItem(c)
            | SlideNode::Compare(c)
            | SlideNode::CompareSide(c)
            | SlideNode::BeforeAfter(c)
            | SlideNode::BeforeAfterSide(c)
            | SlideNode::ProsCons(c)
            | SlideNode::ProsItem(c)
            | SlideNode::ConsItem(c)
            | SlideNode::SequenceArrow(c)
            | SlideNode::SequenceArrowItem(c)
            | SlideNode::Table(c)
            | SlideNode::Tr(c) => Some(&c.children),
            SlideNode::Paragraph(p) => Some(&p.children),
            SlideNode::Column(c) => Some(&c.children),
            SlideNode::Td(cell) | SlideNode::Th(cell) => Some(&cell.children),
            SlideNode::Button(b) => Some(&b.children),
            SlideNode::Image(_) | SlideNode::Icon(_) | SlideNode::Chart(_) => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Descendant>> {
        match self {
            SlideNode::H1(c)
            | SlideNode::H2(c)
            | SlideNode::H3(c)
            | SlideNode::H4(c)
            | SlideNode::H5(c)
            | SlideNode::H6(c)
            | SlideNode::ColumnGroup(c)
            | SlideNode::Bullets(c)
            | SlideNode::Bullet(c)
            | SlideNode::Icons(c)
            | SlideNode::IconItem(c)
            | SlideNode::Cycle(c)
            | SlideNode::CycleItem(c)
            | SlideNode::Staircase(c)
            | SlideNode::StairItem(c)
            | SlideNode::Pyramid(c)
            | SlideNode::PyramidItem(c)
            | SlideNode::Arrows(c)
            | SlideNode::ArrowItem(c)
            | SlideNode::Timeline(c)
            | SlideNode::TimelineItem(c)
            | SlideNode::Boxes(c)
            | SlideNode::BoxItem(c)
            | SlideNode::Compare(c)
            | SlideNode::CompareSide(c)
            | SlideNode::BeforeAfter(c)
            | SlideNode::BeforeAfterSide(c)
            | SlideNode::ProsCons(c)
            | SlideNode::ProsItem(c)
            | SlideNode::ConsItem(c)
            | SlideNode::SequenceArrow(c)
            | SlideNode::SequenceArrowItem(c)
            | SlideNode::Table(c)
            | SlideNode::Tr(c) => Some(&mut c.children),
            SlideNode::Paragraph(p) => Some(&mut p.children),
            SlideNode::Column(c) => Some(&mut c.children),
            SlideNode::Td(cell) | SlideNode::Th(cell) => Some(&mut cell.children),
            SlideNode::Button(b) => Some(&mut b.children),
            SlideNode::Image(_) | SlideNode::Icon(_) | SlideNode::Chart(_) => None,
        }
    }

    /// Concatenated text of every run below this node.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        let mut push = |run: &TextRun| out.push_str(&run.text);
        visit_runs(std::slice::from_ref(self), &mut push);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    Left,
    Right,
    Vertical,
    Background,
}

impl LayoutType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "vertical" => Some(Self::Vertical),
            "background" => Some(Self::Background),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Start,
    #[default]
    Center,
    End,
}

impl Alignment {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "start" => Some(Self::Start),
            "center" => Some(Self::Center),
            "end" => Some(Self::End),
            _ => None,
        }
    }
}

/// Image shown beside or behind the slide content
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootImage {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_type: Option<LayoutType>,
}

/// One converted `<SECTION>`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: SlideId,
    pub content: Vec<SlideNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_image: Option<RootImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_type: Option<LayoutType>,
    pub alignment: Alignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
}

impl Slide {
    pub fn new(id: SlideId) -> Self {
        Self {
            id,
            content: Vec::new(),
            root_image: None,
            layout_type: None,
            alignment: Alignment::default(),
            bg_color: None,
            width: None,
        }
    }

    /// All text runs in document order.
    pub fn text_runs(&self) -> Vec<&TextRun> {
        let mut runs = Vec::new();
        visit_runs(&self.content, &mut |run| runs.push(run));
        runs
    }

    pub fn clear_generating_marks(&mut self) {
        for node in &mut self.content {
            clear_node_marks(node);
        }
    }
}

fn visit_runs<'a>(nodes: &'a [SlideNode], f: &mut impl FnMut(&'a TextRun)) {
    for node in nodes {
        if let Some(children) = node.children() {
            visit_descendants(children, f);
        }
    }
}

fn visit_descendants<'a>(children: &'a [Descendant], f: &mut impl FnMut(&'a TextRun)) {
    for child in children {
        match child {
            Descendant::Text(run) => f(run),
            Descendant::Element(node) => visit_runs(std::slice::from_ref(node), f),
        }
    }
}

fn clear_node_marks(node: &mut SlideNode) {
    let Some(children) = node.children_mut() else {
        return;
    };
    for child in children {
        match child {
            Descendant::Text(run) => run.generating = false,
            Descendant::Element(inner) => clear_node_marks(inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_discriminators() {
        let heading = SlideNode::heading(2, vec![TextRun::plain("Hi").into()]);
        let json = serde_json::to_value(&heading).unwrap();
        assert_eq!(json["type"], "h2");
        assert_eq!(json["children"][0]["text"], "Hi");

        let item = SlideNode::BeforeAfterSide(Container::default());
        assert_eq!(serde_json::to_value(&item).unwrap()["type"], "before_after_side");

        let para = SlideNode::Paragraph(Paragraph {
            indent: Some(1),
            list_style_type: Some(ListStyle::Disc),
            ..Paragraph::default()
        });
        let json = serde_json::to_value(&para).unwrap();
        assert_eq!(json["type"], "p");
        assert_eq!(json["listStyleType"], "disc");
        assert!(json.get("listStart").is_none());
    }

    #[test]
    fn false_marks_are_omitted() {
        let run = TextRun {
            text: "x".into(),
            bold: true,
            ..TextRun::default()
        };
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["bold"], true);
        assert!(json.get("italic").is_none());
        assert!(json.get("generating").is_none());
    }

    #[test]
    fn clear_marks_reaches_nested_runs() {
        let live = TextRun {
            text: "live".into(),
            generating: true,
            ..TextRun::default()
        };
        let item = SlideNode::Bullet(Container::new([SlideNode::Paragraph(Paragraph {
            children: vec![live.into()],
            ..Paragraph::default()
        })]));
        let mut slide = Slide::new(SlideId::new("s"));
        slide.content.push(SlideNode::Bullets(Container::new([item])));

        assert!(slide.text_runs()[0].generating);
        slide.clear_generating_marks();
        assert!(slide.text_runs().iter().all(|r| !r.generating));
    }
}
