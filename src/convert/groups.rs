use crate::slide::{Container, SlideNode};
use crate::tree::GenericNode;

use super::Converter;

/// Layout groups whose `DIV` children each become one typed item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum GroupKind {
    Bullets,
    Icons,
    Cycle,
    Staircase,
    Pyramid,
    Arrows,
    Timeline,
    Boxes,
    Compare,
    BeforeAfter,
    ProsCons,
    SequenceArrow,
}

impl GroupKind {
    pub(super) fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "BULLETS" => Some(Self::Bullets),
            "ICONS" => Some(Self::Icons),
            "CYCLE" => Some(Self::Cycle),
            "STAIRCASE" => Some(Self::Staircase),
            "PYRAMID" => Some(Self::Pyramid),
            "ARROWS" => Some(Self::Arrows),
            "TIMELINE" => Some(Self::Timeline),
            "BOXES" => Some(Self::Boxes),
            "COMPARE" => Some(Self::Compare),
            "BEFORE-AFTER" => Some(Self::BeforeAfter),
            "PROS-CONS" => Some(Self::ProsCons),
            "ARROW-VERTICAL" => Some(Self::SequenceArrow),
            _ => None,
        }
    }

    fn group(self, items: Vec<SlideNode>) -> SlideNode {
        let container = Container::new(items);
        match self {
            Self::Bullets => SlideNode::Bullets(container),
            Self::Icons => SlideNode::Icons(container),
            Self::Cycle => SlideNode::Cycle(container),
            Self::Staircase => SlideNode::Staircase(container),
            Self::Pyramid => SlideNode::Pyramid(container),
            Self::Arrows => SlideNode::Arrows(container),
            Self::Timeline => SlideNode::Timeline(container),
            Self::Boxes => SlideNode::Boxes(container),
            Self::Compare => SlideNode::Compare(container),
            Self::BeforeAfter => SlideNode::BeforeAfter(container),
            Self::ProsCons => SlideNode::ProsCons(container),
            Self::SequenceArrow => SlideNode::SequenceArrow(container),
        }
    }

    fn item(self, children: Vec<SlideNode>) -> SlideNode {
        let container = Container::new(children);
        match self {
            Self::Bullets => SlideNode::Bullet(container),
            Self::Icons => SlideNode::IconItem(container),
            Self::Cycle => SlideNode::CycleItem(container),
            Self::Staircase => SlideNode::StairItem(container),
            Self::Pyramid => SlideNode::PyramidItem(container),
            Self::Arrows => SlideNode::ArrowItem(container),
            Self::Timeline => SlideNode::TimelineItem(container),
            Self::Boxes => SlideNode::BoxItem(container),
            Self::Compare => SlideNode::CompareSide(container),
            Self::BeforeAfter => SlideNode::BeforeAfterSide(container),
            Self::ProsCons => SlideNode::ProsItem(container),
            Self::SequenceArrow => SlideNode::SequenceArrowItem(container),
        }
    }
}

impl Converter<'_> {
    pub(super) fn group(&self, kind: GroupKind, node: &GenericNode) -> Option<SlideNode> {
        let items: Vec<SlideNode> = match kind {
            GroupKind::ProsCons => self.pros_cons_items(node),
            _ => node
                .elements()
                .filter(|c| c.is("DIV"))
                .map(|div| kind.item(self.convert_children(&div.children)))
                .collect(),
        };
        if items.is_empty() {
            return None;
        }
        Some(kind.group(items))
    }

    /// Explicit `<PROS>`/`<CONS>` sides win; otherwise `DIV`s alternate
    /// starting with pros.
    fn pros_cons_items(&self, node: &GenericNode) -> Vec<SlideNode> {
        let explicit: Vec<&GenericNode> = node
            .elements()
            .filter(|c| c.is("PROS") || c.is("CONS"))
            .collect();
        if !explicit.is_empty() {
            return explicit
                .into_iter()
                .map(|side| {
                    let container = Container::new(self.convert_children(&side.children));
                    if side.is("PROS") {
                        SlideNode::ProsItem(container)
                    } else {
                        SlideNode::ConsItem(container)
                    }
                })
                .collect();
        }

        node.elements()
            .filter(|c| c.is("DIV"))
            .enumerate()
            .map(|(index, div)| {
                let container = Container::new(self.convert_children(&div.children));
                if index % 2 == 0 {
                    SlideNode::ProsItem(container)
                } else {
                    SlideNode::ConsItem(container)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::convert::tests::convert;
    use crate::slide::{Descendant, SlideNode};

    fn item_types(node: &SlideNode) -> Vec<String> {
        node.children()
            .unwrap()
            .iter()
            .map(|child| match child {
                Descendant::Element(item) => serde_json::to_value(item).unwrap()["type"]
                    .as_str()
                    .unwrap()
                    .to_string(),
                Descendant::Text(run) => panic!("unexpected text {run:?}"),
            })
            .collect()
    }

    #[test]
    fn every_group_maps_its_divs_to_items() {
        let cases = [
            ("BULLETS", "bullets", "bullet"),
            ("ICONS", "icons", "icon_item"),
            ("CYCLE", "cycle", "cycle_item"),
            ("STAIRCASE", "staircase", "stair_item"),
            ("PYRAMID", "pyramid", "pyramid_item"),
            ("ARROWS", "arrows", "arrow_item"),
            ("TIMELINE", "timeline", "timeline_item"),
            ("BOXES", "boxes", "box_item"),
            ("COMPARE", "compare", "compare_side"),
            ("BEFORE-AFTER", "before_after", "before_after_side"),
            ("ARROW-VERTICAL", "sequence_arrow", "sequence_arrow_item"),
        ];
        for (tag, group_type, item_type) in cases {
            let xml = format!(
                "<SECTION><{tag}><DIV><H3>One</H3><P>a</P></DIV><DIV><H3>Two</H3></DIV><P>stray</P></{tag}></SECTION>"
            );
            let slide = convert(&xml);
            assert_eq!(slide.content.len(), 1, "{tag}");
            let group = &slide.content[0];
            assert_eq!(serde_json::to_value(group).unwrap()["type"], group_type);
            assert_eq!(item_types(group), vec![item_type, item_type], "{tag}");
        }
    }

    #[test]
    fn item_content_is_converted_recursively() {
        let slide = convert("<SECTION><BULLETS><DIV><H3>Fast</H3><P>Really <B>fast</B></P></DIV></BULLETS></SECTION>");
        let SlideNode::Bullets(group) = &slide.content[0] else {
            panic!("expected bullets");
        };
        let Descendant::Element(SlideNode::Bullet(item)) = &group.children[0] else {
            panic!("expected bullet");
        };
        assert_eq!(item.children.len(), 2);
        let Descendant::Element(heading) = &item.children[0] else {
            panic!("expected heading");
        };
        assert_eq!(heading.heading_level(), Some(3));
    }

    #[test]
    fn empty_group_yields_no_node() {
        assert!(convert("<SECTION><TIMELINE>").content.is_empty());
        assert!(convert("<SECTION><BOXES><P>x</P></BOXES></SECTION>").content.is_empty());
    }

    #[test]
    fn pros_cons_prefers_explicit_sides() {
        let slide = convert(
            "<SECTION><PROS-CONS><CONS><P>bad</P></CONS><PROS><P>good</P></PROS><DIV><P>x</P></DIV></PROS-CONS></SECTION>",
        );
        assert_eq!(item_types(&slide.content[0]), vec!["cons_item", "pros_item"]);
    }

    #[test]
    fn pros_cons_falls_back_to_div_parity() {
        let slide = convert(
            "<SECTION><PROS-CONS><DIV><P>a</P></DIV><DIV><P>b</P></DIV><DIV><P>c</P></DIV></PROS-CONS></SECTION>",
        );
        assert_eq!(item_types(&slide.content[0]), vec!["pros_item", "cons_item", "pros_item"]);
    }
}
