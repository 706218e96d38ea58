use brief_chart::{BarChart, Palette};
use brief_core::BriefError;
use brief_office::{ContentTypes, Package, Relationships, SlideContent, populate_pptx};

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_LAYOUT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

fn placeholder(id: u32, ph: &str, text: Option<&str>) -> String {
    let body = text
        .map(|t| format!(r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" sz="2400"/><a:t>{t}</a:t></a:r></a:p></p:txBody>"#))
        .unwrap_or_default();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Placeholder {id}"/><p:cNvSpPr/><p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr/>{body}</p:sp>"#
    )
}

fn slide(shapes: &[String]) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
        shapes.concat()
    )
    .into_bytes()
}

/// Two slides listed in reverse part order: slide2.xml is shown first.
fn deck_template() -> Vec<u8> {
    let mut types = ContentTypes::default();
    types.add_override(
        "ppt/presentation.xml",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
    );

    let mut pres_rels = Relationships::new();
    pres_rels.add(REL_SLIDE, "slides/slide1.xml");
    pres_rels.add(REL_SLIDE, "slides/slide2.xml");

    let mut slide1_rels = Relationships::new();
    slide1_rels.add(REL_LAYOUT, "../slideLayouts/slideLayout2.xml");

    let mut package = Package::new();
    package.set_part("[Content_Types].xml", types.to_xml().into_bytes());
    package.set_part(
        "ppt/presentation.xml",
        format!(
            r#"<p:presentation {NS}><p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId1"/></p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/></p:presentation>"#
        )
        .into_bytes(),
    );
    package.set_part("ppt/_rels/presentation.xml.rels", pres_rels.to_xml().into_bytes());
    package.set_part(
        "ppt/slides/slide2.xml",
        slide(&[
            placeholder(2, r#"<p:ph type="ctrTitle"/>"#, Some("Click to add title")),
            placeholder(3, r#"<p:ph type="subTitle" idx="1"/>"#, None),
        ]),
    );
    package.set_part(
        "ppt/slides/slide1.xml",
        slide(&[
            placeholder(2, r#"<p:ph type="title"/>"#, None),
            placeholder(4, r#"<p:ph idx="1"/>"#, Some("Click to add text")),
            placeholder(5, r#"<p:ph type="sldNum" sz="quarter" idx="12"/>"#, Some("1")),
        ]),
    );
    package.set_part("ppt/slides/_rels/slide1.xml.rels", slide1_rels.to_xml().into_bytes());
    package.to_bytes().unwrap()
}

fn part_text(package: &Package, name: &str) -> String {
    String::from_utf8(package.require(name).unwrap().to_vec()).unwrap()
}

#[test]
fn fills_slides_in_presentation_order() {
    let figure = BarChart::operational_costs("Contoso").render(&Palette::default()).unwrap();
    let contents = vec![
        SlideContent::new().with_title("Strategic Intelligence Brief: Contoso").with_body("Prepared by Strategy Desk"),
        SlideContent::new()
            .with_title("The Strategic Bottleneck")
            .with_body("- Legacy ERP\n\n- Manual reconciliation")
            .with_picture(figure.clone()),
        SlideContent::new().with_title("Skipped: the deck has two slides"),
    ];

    let output = populate_pptx(&deck_template(), &contents).unwrap();
    let package = Package::from_bytes(&output).unwrap();

    let first = part_text(&package, "ppt/slides/slide2.xml");
    assert!(first.contains(r#"<a:t>Strategic Intelligence Brief: Contoso</a:t>"#));
    assert!(first.contains(r#"<a:t>Prepared by Strategy Desk</a:t>"#));
    assert!(!first.contains("Click to add title"));
    assert!(!first.contains("<p:pic"));

    let second = part_text(&package, "ppt/slides/slide1.xml");
    assert!(second.contains(r#"<a:t>The Strategic Bottleneck</a:t>"#));
    assert!(second.contains(r#"<a:rPr lang="en-US" sz="2400"/><a:t>Legacy ERP</a:t>"#));
    assert!(second.contains(r#"<a:t>Manual reconciliation</a:t>"#));
    assert!(second.contains(r#"<a:t>1</a:t>"#), "slide number placeholder is untouched");
    assert!(second.contains(r#"<p:cNvPr id="6" name="brief1.png"/>"#));
    assert!(second.contains(r#"<a:blip r:embed="rId2"/>"#));
    assert!(second.ends_with("</p:pic></p:spTree></p:cSld></p:sld>"));
    assert!(!second.contains("Skipped"));

    let rels = Relationships::parse(&part_text(&package, "ppt/slides/_rels/slide1.xml.rels")).unwrap();
    assert_eq!(rels.get("rId2").unwrap().target, "../media/brief1.png");
    assert_eq!(package.require("ppt/media/brief1.png").unwrap(), figure.png.as_slice());

    let types = ContentTypes::parse(&part_text(&package, "[Content_Types].xml")).unwrap();
    assert!(types.has_default("png"));
}

#[test]
fn slide_without_relationships_part_gets_one() {
    let figure = BarChart::operational_costs("Contoso").render(&Palette::default()).unwrap();
    let contents = vec![SlideContent::new().with_picture(figure)];

    let output = populate_pptx(&deck_template(), &contents).unwrap();
    let package = Package::from_bytes(&output).unwrap();

    let rels = Relationships::parse(&part_text(&package, "ppt/slides/_rels/slide2.xml.rels")).unwrap();
    assert_eq!(rels.len(), 1);
    assert_eq!(rels.get("rId1").unwrap().target, "../media/brief1.png");
}

#[test]
fn template_without_presentation_part_is_rejected() {
    let mut package = Package::new();
    package.set_part("[Content_Types].xml", ContentTypes::default().to_xml().into_bytes());
    let err = populate_pptx(&package.to_bytes().unwrap(), &[]).unwrap_err();
    assert!(matches!(err, BriefError::Template(msg) if msg.contains("ppt/presentation.xml")));
}
