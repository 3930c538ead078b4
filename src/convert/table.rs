use crate::slide::{Container, SlideNode, TableCell};
use crate::tree::GenericNode;

use super::{Converter, into_descendants, non_empty};

impl Converter<'_> {
    /// Rows may sit under `THEAD`/`TBODY`/`TFOOT` or directly in the table.
    pub(super) fn table(&self, node: &GenericNode) -> Option<SlideNode> {
        let mut rows = Vec::new();
        for child in node.elements() {
            match child.tag.as_str() {
                "THEAD" | "TBODY" | "TFOOT" => rows.extend(
                    child
                        .elements()
                        .filter(|r| r.is("TR"))
                        .filter_map(|r| self.row(r)),
                ),
                "TR" => rows.extend(self.row(child)),
                _ => {}
            }
        }
        if rows.is_empty() {
            return None;
        }
        Some(SlideNode::Table(Container::new(rows)))
    }

    fn row(&self, node: &GenericNode) -> Option<SlideNode> {
        let cells: Vec<SlideNode> = node.elements().filter_map(|c| self.cell(c)).collect();
        if cells.is_empty() {
            return None;
        }
        Some(SlideNode::Tr(Container::new(cells)))
    }

    fn cell(&self, node: &GenericNode) -> Option<SlideNode> {
        let header = match node.tag.as_str() {
            "TD" => false,
            "TH" => true,
            _ => return None,
        };
        let cell = TableCell {
            col_span: span(node.attr("colspan")),
            row_span: span(node.attr("rowspan")),
            background: non_empty(node.attr("background").or_else(|| node.attr("bgcolor"))),
            children: into_descendants(self.convert_children(&node.children)),
        };
        Some(if header {
            SlideNode::Th(cell)
        } else {
            SlideNode::Td(cell)
        })
    }
}

fn span(value: Option<&str>) -> Option<u32> {
    value?.trim().parse().ok().filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use crate::convert::tests::convert;
    use crate::slide::{Descendant, SlideNode, TableCell};
    use pretty_assertions::assert_eq;

    fn rows(slide_xml: &str) -> Vec<Vec<SlideNode>> {
        let slide = convert(slide_xml);
        let SlideNode::Table(table) = &slide.content[0] else {
            panic!("expected table, got {:?}", slide.content);
        };
        table
            .children
            .iter()
            .map(|row| match row {
                Descendant::Element(SlideNode::Tr(row)) => row
                    .children
                    .iter()
                    .map(|cell| match cell {
                        Descendant::Element(cell) => cell.clone(),
                        other => panic!("unexpected {other:?}"),
                    })
                    .collect(),
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn head_and_body_sections() {
        let rows = rows(
            "<SECTION><TABLE><THEAD><TR><TH>Name</TH><TH>Qty</TH></TR></THEAD><TBODY><TR><TD>Apples</TD><TD>3</TD></TR></TBODY></TABLE></SECTION>",
        );
        assert_eq!(rows.len(), 2);
        assert!(matches!(rows[0][0], SlideNode::Th(_)));
        assert!(matches!(rows[1][1], SlideNode::Td(_)));
        assert_eq!(rows[1][0].plain_text(), "Apples");
    }

    #[test]
    fn bare_rows_and_cell_attributes() {
        let rows = rows(
            r##"<SECTION><TABLE><TR><TD colspan="2" rowspan="x" background="#eee">Wide</TD></TR><TR></TR></TABLE></SECTION>"##,
        );
        assert_eq!(rows.len(), 1);
        let SlideNode::Td(TableCell {
            col_span,
            row_span,
            background,
            ..
        }) = &rows[0][0]
        else {
            panic!("expected td");
        };
        assert_eq!(*col_span, Some(2));
        assert_eq!(*row_span, None);
        assert_eq!(background.as_deref(), Some("#eee"));
    }

    #[test]
    fn table_without_rows_is_dropped() {
        assert!(convert("<SECTION><TABLE><THEAD>").content.is_empty());
    }
}
