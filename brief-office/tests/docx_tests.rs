use brief_chart::{BarChart, Palette};
use brief_core::BriefError;
use brief_office::{ContentTypes, DocumentStyle, DocxDocument, Package, Relationships, TemplateFields, populate_docx};

fn part_text(package: &Package, name: &str) -> String {
    String::from_utf8(package.require(name).unwrap().to_vec()).unwrap()
}

#[test]
fn report_package_contains_every_part() {
    let palette = Palette::default();
    let chart = BarChart::operational_costs("Contoso");
    let figure = chart.render(&palette).unwrap();

    let mut doc = DocxDocument::new(DocumentStyle::default());
    doc.set_core_properties("Strategic Intelligence Brief: Contoso", "Strategy Desk");
    doc.add_heading("Strategic Intelligence Brief: Contoso", 0).unwrap();
    doc.add_paragraph("Operating costs rose 9% in 2024.");
    doc.add_figure(&figure, 5.0).unwrap();
    doc.add_bar_chart(&chart, &palette, 5.0).unwrap();

    let package = Package::from_bytes(&doc.to_bytes().unwrap()).unwrap();
    assert_eq!(package.part_names().next(), Some("[Content_Types].xml"));
    for name in [
        "_rels/.rels",
        "docProps/core.xml",
        "docProps/app.xml",
        "word/document.xml",
        "word/styles.xml",
        "word/_rels/document.xml.rels",
        "word/media/image1.png",
        "word/media/image1.svg",
        "word/charts/chart1.xml",
    ] {
        assert!(package.contains(name), "missing {name}");
    }

    assert_eq!(package.require("word/media/image1.png").unwrap(), figure.png.as_slice());

    let types = ContentTypes::parse(&part_text(&package, "[Content_Types].xml")).unwrap();
    assert!(types.has_default("png"));
    assert!(types.has_default("svg"));
    assert_eq!(
        types.override_for("word/charts/chart1.xml"),
        Some("application/vnd.openxmlformats-officedocument.drawingml.chart+xml")
    );

    let rels = Relationships::parse(&part_text(&package, "word/_rels/document.xml.rels")).unwrap();
    let targets: Vec<&str> = rels.iter().map(|r| r.target.as_str()).collect();
    assert_eq!(targets, vec!["styles.xml", "media/image1.png", "media/image1.svg", "charts/chart1.xml"]);

    let document = part_text(&package, "word/document.xml");
    assert!(document.contains("Operating costs rose 9% in 2024."));
    assert!(document.contains(r#"<c:chart "#));
    assert!(part_text(&package, "word/charts/chart1.xml").contains("<c:barChart>"));
    assert!(part_text(&package, "docProps/core.xml").contains("<dc:creator>Strategy Desk</dc:creator>"));
}

fn word_template(document_body: &str) -> Vec<u8> {
    let mut types = ContentTypes::default();
    types.add_override(
        "word/document.xml",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
    );
    let mut rels = Relationships::new();
    rels.add(
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
        "word/document.xml",
    );

    let mut package = Package::new();
    package.set_part("[Content_Types].xml", types.to_xml().into_bytes());
    package.set_part("_rels/.rels", rels.to_xml().into_bytes());
    package.set_part(
        "word/document.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{document_body}</w:body></w:document>"#
        )
        .into_bytes(),
    );
    package.set_part("word/styles.xml", b"<w:styles>{{title}}</w:styles>".to_vec());
    package.to_bytes().unwrap()
}

#[test]
fn populate_docx_fills_document_and_leaves_other_parts() {
    let template = word_template(concat!(
        r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>{{title}}</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t xml:space="preserve">Prepared by {{author}} on {{date}}</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>{{roi_analysis}}</w:t></w:r></w:p>"#,
    ));
    let fields = TemplateFields::new()
        .with("title", "Margin Rescue")
        .with("author", "Strategy Desk")
        .with("date", "October 2026")
        .with("roi_analysis", "Savings: $120M\nPayback: 14 months");

    let output = populate_docx(&template, &fields).unwrap();
    let package = Package::from_bytes(&output).unwrap();
    let document = part_text(&package, "word/document.xml");

    assert!(document.contains(r#"<w:pStyle w:val="Title"/></w:pPr><w:r><w:t xml:space="preserve">Margin Rescue</w:t>"#));
    assert!(document.contains("Prepared by Strategy Desk on October 2026"));
    assert!(document.contains(">Savings: $120M</w:t>"));
    assert!(document.contains(">Payback: 14 months</w:t>"));
    assert!(!document.contains("{{"));

    assert_eq!(package.require("word/styles.xml").unwrap(), b"<w:styles>{{title}}</w:styles>");
}

#[test]
fn populate_docx_rejects_non_packages() {
    let err = populate_docx(b"not a zip", &TemplateFields::new()).unwrap_err();
    assert!(matches!(err, BriefError::Template(_)));

    let mut package = Package::new();
    package.set_part("[Content_Types].xml", ContentTypes::default().to_xml().into_bytes());
    let err = populate_docx(&package.to_bytes().unwrap(), &TemplateFields::new()).unwrap_err();
    assert!(matches!(err, BriefError::Template(msg) if msg.contains("word/document.xml")));
}
