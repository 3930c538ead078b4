use crate::slide::{Chart, ChartData, ChartType, LabeledPoint, ScatterPoint, SlideNode};
use crate::tree::GenericNode;

/// `<CHART charttype="..">` with one `<DATA>` child per point. Fields come
/// from child tags (`LABEL`/`VALUE`, or `X`/`Y` for scatter) or attributes.
pub(super) fn convert_chart(node: &GenericNode) -> SlideNode {
    let chart_type = node
        .attr("charttype")
        .and_then(ChartType::parse)
        .unwrap_or_default();
    let points = node.elements().filter(|c| c.is("DATA"));

    let data = match chart_type {
        ChartType::Scatter => ChartData::Scatter(
            points
                .map(|point| ScatterPoint {
                    x: number(field(point, "X")),
                    y: number(field(point, "Y")),
                })
                .collect(),
        ),
        _ => ChartData::Labeled(
            points
                .map(|point| LabeledPoint {
                    label: field(point, "LABEL").unwrap_or_default(),
                    value: number(field(point, "VALUE")),
                })
                .collect(),
        ),
    };

    SlideNode::Chart(Chart { chart_type, data })
}

fn field(point: &GenericNode, tag: &str) -> Option<String> {
    point
        .first_child(tag)
        .map(|child| child.text_content().trim().to_string())
        .or_else(|| {
            point
                .attr(&tag.to_ascii_lowercase())
                .map(|v| v.trim().to_string())
        })
}

/// Unparsable or non-finite numbers read as 0.
fn number(value: Option<String>) -> f64 {
    value
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}
