//! DrawingML chart part for a native Word bar chart.

use crate::xml::{NS_A, NS_C, NS_R, escape_xml};
use brief_chart::{BarChart, Palette};
use std::fmt::Write;

/// Gap between bars as a percentage of bar width; 67 leaves bars at 60% of
/// their category slot.
const GAP_WIDTH: u32 = 67;

fn rich_text(xml: &mut String, text: &str, size_hundredths: u32, bold: bool, rotate: Option<i32>) {
    let _ = write!(xml, "<c:tx><c:rich>");
    match rotate {
        Some(rot) => {
            let _ = write!(xml, r#"<a:bodyPr rot="{rot}" vert="horz"/>"#);
        }
        None => xml.push_str("<a:bodyPr/>"),
    }
    let _ = write!(
        xml,
        r#"<a:lstStyle/><a:p><a:pPr><a:defRPr sz="{size_hundredths}" b="{b}"/></a:pPr><a:r><a:rPr lang="en-US" sz="{size_hundredths}" b="{b}"/><a:t>{}</a:t></a:r></a:p></c:rich></c:tx>"#,
        escape_xml(text),
        b = u8::from(bold),
    );
}

/// Serializes `chart` as a clustered column chart with literal data.
pub(crate) fn chart_xml(chart: &BarChart, palette: &Palette) -> String {
    let bar_color = chart.color.unwrap_or(palette.primary).hex();
    let grid_color = palette.connector.hex();
    let text_color = palette.text.hex();
    let (step, axis_max) = chart.value_axis();

    let mut xml = String::with_capacity(4096);
    let _ = write!(
        xml,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="{NS_C}" xmlns:a="{NS_A}" xmlns:r="{NS_R}"><c:date1904 val="0"/><c:lang val="en-US"/><c:roundedCorners val="0"/><c:chart><c:title>"#
    );
    rich_text(&mut xml, &chart.title, 1400, true, None);
    xml.push_str(r#"<c:overlay val="0"/></c:title><c:autoTitleDeleted val="0"/><c:plotArea><c:layout/>"#);

    let _ = write!(
        xml,
        r#"<c:barChart><c:barDir val="col"/><c:grouping val="clustered"/><c:varyColors val="0"/><c:ser><c:idx val="0"/><c:order val="0"/><c:tx><c:v>{}</c:v></c:tx><c:spPr><a:solidFill><a:srgbClr val="{bar_color}"/></a:solidFill></c:spPr><c:invertIfNegative val="0"/>"#,
        escape_xml(&chart.y_label)
    );

    let count = chart.points.len();
    let _ = write!(xml, r#"<c:cat><c:strLit><c:ptCount val="{count}"/>"#);
    for (i, point) in chart.points.iter().enumerate() {
        let _ = write!(xml, r#"<c:pt idx="{i}"><c:v>{}</c:v></c:pt>"#, escape_xml(&point.label));
    }
    xml.push_str("</c:strLit></c:cat>");

    let _ = write!(
        xml,
        r#"<c:val><c:numLit><c:formatCode>General</c:formatCode><c:ptCount val="{count}"/>"#
    );
    for (i, point) in chart.points.iter().enumerate() {
        let _ = write!(xml, r#"<c:pt idx="{i}"><c:v>{}</c:v></c:pt>"#, point.value);
    }
    xml.push_str("</c:numLit></c:val></c:ser>");

    let _ = write!(
        xml,
        r#"<c:gapWidth val="{GAP_WIDTH}"/><c:axId val="1"/><c:axId val="2"/></c:barChart>"#
    );

    // Category axis
    let _ = write!(
        xml,
        r#"<c:catAx><c:axId val="1"/><c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="0"/><c:axPos val="b"/><c:numFmt formatCode="General" sourceLinked="0"/><c:majorTickMark val="none"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:spPr><a:ln w="9525"><a:solidFill><a:srgbClr val="{grid_color}"/></a:solidFill></a:ln></c:spPr><c:txPr><a:bodyPr/><a:lstStyle/><a:p><a:pPr><a:defRPr sz="900"><a:solidFill><a:srgbClr val="{text_color}"/></a:solidFill></a:defRPr></a:pPr><a:endParaRPr lang="en-US"/></a:p></c:txPr><c:crossAx val="2"/><c:crosses val="autoZero"/><c:auto val="1"/><c:lblAlgn val="ctr"/><c:lblOffset val="100"/><c:noMultiLvlLbl val="0"/></c:catAx>"#
    );

    // Value axis with dashed gridlines
    let _ = write!(
        xml,
        r#"<c:valAx><c:axId val="2"/><c:scaling><c:orientation val="minMax"/><c:max val="{axis_max}"/><c:min val="0"/></c:scaling><c:delete val="0"/><c:axPos val="l"/><c:majorGridlines><c:spPr><a:ln w="6350"><a:solidFill><a:srgbClr val="{grid_color}"><a:alpha val="30000"/></a:srgbClr></a:solidFill><a:prstDash val="dash"/></a:ln></c:spPr></c:majorGridlines><c:title>"#
    );
    rich_text(&mut xml, &chart.y_label, 1000, false, Some(-5_400_000));
    let _ = write!(
        xml,
        r#"<c:overlay val="0"/></c:title><c:numFmt formatCode="General" sourceLinked="0"/><c:majorTickMark val="none"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:spPr><a:ln><a:noFill/></a:ln></c:spPr><c:crossAx val="1"/><c:crosses val="autoZero"/><c:crossBetween val="between"/><c:majorUnit val="{step}"/></c:valAx>"#
    );

    xml.push_str(
        r#"</c:plotArea><c:plotVisOnly val="1"/><c:dispBlanksAs val="gap"/></c:chart><c:spPr><a:noFill/><a:ln><a:noFill/></a:ln></c:spPr></c:chartSpace>"#,
    );
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_chart::DataPoint;

    #[test]
    fn chart_carries_series_and_axis_scale() {
        let chart = BarChart::operational_costs("Contoso");
        let xml = chart_xml(&chart, &Palette::default());

        assert!(xml.contains(r#"<c:barDir val="col"/>"#));
        assert!(xml.contains(r#"<a:srgbClr val="004C6D"/>"#));
        assert!(xml.contains(r#"<c:pt idx="3"><c:v>2025 (Est)</c:v></c:pt>"#));
        assert!(xml.contains(r#"<c:pt idx="0"><c:v>12.5</c:v></c:pt>"#));
        assert!(xml.contains(r#"<c:max val="20"/>"#));
        assert!(xml.contains(r#"<c:majorUnit val="5"/>"#));
        assert!(xml.contains(r#"<a:prstDash val="dash"/>"#));
        assert!(xml.contains("Contoso: Rising Operational Costs"));
    }

    #[test]
    fn labels_are_escaped() {
        let chart = BarChart::new("P&L <trend>", "USD", vec![DataPoint::new("Q1 & Q2", 3.0)]);
        let xml = chart_xml(&chart, &Palette::default());
        assert!(xml.contains("P&amp;L &lt;trend&gt;"));
        assert!(xml.contains("Q1 &amp; Q2"));
    }
}
