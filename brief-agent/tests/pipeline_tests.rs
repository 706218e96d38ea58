use brief_agent::{Branding, ChartMode, OutputKind, Pipeline, Stage};
use brief_core::{BriefError, CitationMetadata, CitationSource, Content, LlmResponse};
use brief_model::MockLlm;
use brief_office::{ContentTypes, DOCX_MIME_TYPE, PPTX_MIME_TYPE, Package, Relationships};
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

const MEMO: &str = r#"```json
{
  "title": "Margin Rescue",
  "executive_summary": "Operating costs grew faster than revenue.",
  "problem_statement": "A fragmented ERP estate costs $140M a year.",
  "solution_architecture": "An agent layer between the data lake and the ERP.",
  "roi_analysis": "Savings of $120M over two years.",
  "implementation_plan": ["Phase 1 (Month 1-2): audit", "Phase 2 (Month 3-4): pilot"],
  "financials": [{"label": "2023", "value": 3.4}, {"label": "2024", "value": 3.9}]
}
```"#;

fn text(text: &str) -> LlmResponse {
    LlmResponse::new(Content::new("model").with_text(text))
}

fn research_reply() -> LlmResponse {
    let mut response = text("Contoso spent $14.8B on operations in 2024.");
    response.citation_metadata = Some(CitationMetadata {
        citation_sources: vec![CitationSource {
            uri: Some("https://contoso.example/10-k".to_string()),
            title: Some("Contoso 10-K".to_string()),
            publication_date: None,
        }],
    });
    response
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()
}

fn part_text(package: &Package, name: &str) -> String {
    String::from_utf8(package.require(name).unwrap().to_vec()).unwrap()
}

#[tokio::test]
async fn report_run_reports_every_stage_and_builds_docx() {
    let hunter = Arc::new(MockLlm::new("sonar").with_response(research_reply()));
    let architect = Arc::new(MockLlm::new("gemini-2.5-pro").with_response(text(MEMO)));
    let stages = Arc::new(Mutex::new(Vec::new()));
    let seen = stages.clone();

    let pipeline = Pipeline::builder()
        .hunter(hunter.clone())
        .architect(architect.clone())
        .date(date())
        .on_stage(move |stage| seen.lock().unwrap().push(stage))
        .build()
        .unwrap();

    let artifact = pipeline.run("  Contoso Ltd ").await.unwrap();
    assert_eq!(*stages.lock().unwrap(), Stage::ALL.to_vec());
    assert_eq!(artifact.file_name, "Strategy_Brief_Contoso_Ltd_Report.docx");
    assert_eq!(artifact.mime_type, DOCX_MIME_TYPE);
    assert!(!artifact.degraded);

    let strategy_prompt = architect.requests()[0].contents[0].text();
    assert!(strategy_prompt.contains("Contoso spent $14.8B on operations in 2024."));

    let package = Package::from_bytes(&artifact.bytes).unwrap();
    let document = part_text(&package, "word/document.xml");
    assert!(document.contains("Strategic Intelligence Brief: Contoso Ltd"));
    assert!(document.contains("Prepared by: Strategy Desk | October 2026"));
    assert!(document.contains("Phase 2 (Month 3-4): pilot"));
    assert!(document.contains("[1] Contoso 10-K (https://contoso.example/10-k)"));

    let chart = part_text(&package, "word/charts/chart1.xml");
    assert!(chart.contains("2024"));
    assert!(chart.contains("3.9"));
    assert!(!chart.contains("2025 (Est)"));
}

#[tokio::test]
async fn image_chart_mode_embeds_two_pictures() {
    let pipeline = Pipeline::builder()
        .hunter(Arc::new(MockLlm::new("sonar").with_response(research_reply())))
        .architect(Arc::new(MockLlm::new("gemini").with_response(text(MEMO))))
        .chart_mode(ChartMode::Image)
        .date(date())
        .build()
        .unwrap();

    let package = Package::from_bytes(&pipeline.run("Contoso").await.unwrap().bytes).unwrap();
    assert!(package.contains("word/media/image1.png"));
    assert!(package.contains("word/media/image2.svg"));
    assert!(!package.contains("word/charts/chart1.xml"));
}

#[tokio::test]
async fn strategy_failure_still_produces_a_brief() {
    let pipeline = Pipeline::builder()
        .hunter(Arc::new(MockLlm::new("sonar").with_response(research_reply())))
        .architect(Arc::new(MockLlm::new("gemini").with_error("Gemini API error (500, retryable): boom")))
        .date(date())
        .build()
        .unwrap();

    let artifact = pipeline.run("Contoso").await.unwrap();
    assert!(artifact.degraded);
    let document = part_text(&Package::from_bytes(&artifact.bytes).unwrap(), "word/document.xml");
    assert!(document.contains("Analysis failed. Please retry."));
}

#[tokio::test]
async fn research_failure_stops_the_run() {
    let architect = Arc::new(MockLlm::new("gemini").with_response(text(MEMO)));
    let pipeline = Pipeline::builder()
        .hunter(Arc::new(MockLlm::new("sonar").with_error("Perplexity API error (401, non-retryable)")))
        .architect(architect.clone())
        .build()
        .unwrap();

    let err = pipeline.run("Contoso").await.unwrap_err();
    assert!(matches!(err, BriefError::Model(_)));
    assert!(architect.requests().is_empty());
}

#[tokio::test]
async fn blank_company_is_rejected_before_any_call() {
    let hunter = Arc::new(MockLlm::new("sonar").with_response(research_reply()));
    let pipeline = Pipeline::builder()
        .hunter(hunter.clone())
        .architect(Arc::new(MockLlm::new("gemini")))
        .build()
        .unwrap();

    let err = pipeline.run("   ").await.unwrap_err();
    assert!(matches!(err, BriefError::Agent(_)));
    assert!(hunter.requests().is_empty());
}

#[tokio::test]
async fn docx_template_output_fills_placeholders() {
    let mut template = Package::new();
    let mut types = ContentTypes::default();
    types.add_override(
        "word/document.xml",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
    );
    template.set_part("[Content_Types].xml", types.to_xml().into_bytes());
    template.set_part(
        "word/document.xml",
        concat!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
            r#"<w:p><w:r><w:t>{{title}}</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>{{company}} | {{date}}</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>{{implementation_plan}}</w:t></w:r></w:p>"#,
            r#"</w:body></w:document>"#
        )
        .as_bytes()
        .to_vec(),
    );

    let branding = Branding { file_suffix: "Ops".to_string(), ..Default::default() };
    let pipeline = Pipeline::builder()
        .hunter(Arc::new(MockLlm::new("sonar").with_response(research_reply())))
        .architect(Arc::new(MockLlm::new("gemini").with_response(text(MEMO))))
        .branding(branding)
        .output(OutputKind::DocxTemplate(template.to_bytes().unwrap()))
        .date(date())
        .build()
        .unwrap();

    let artifact = pipeline.run("Contoso").await.unwrap();
    assert_eq!(artifact.file_name, "Strategy_Brief_Contoso_Ops.docx");

    let document = part_text(&Package::from_bytes(&artifact.bytes).unwrap(), "word/document.xml");
    assert!(document.contains(">Margin Rescue</w:t>"));
    assert!(document.contains(">Contoso | October 2026</w:t>"));
    assert!(document.contains(">Phase 1 (Month 1-2): audit</w:t>"));
    assert!(document.contains(">Phase 2 (Month 3-4): pilot</w:t>"));
}

#[tokio::test]
async fn pptx_template_output_fills_slides() {
    let ns = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
    let slide = |n: u32| {
        format!(
            r#"<p:sld {ns}><p:cSld><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="{n}" name="Title"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp><p:sp><p:nvSpPr><p:cNvPr id="9" name="Body"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp></p:spTree></p:cSld></p:sld>"#
        )
    };

    let mut rels = Relationships::new();
    let mut ids = String::new();
    let mut template = Package::new();
    template.set_part("[Content_Types].xml", ContentTypes::default().to_xml().into_bytes());
    for n in 1..=3 {
        let id = rels.add(
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide",
            &format!("slides/slide{n}.xml"),
        );
        ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{id}"/>"#, 255 + n));
        template.set_part(format!("ppt/slides/slide{n}.xml"), slide(n + 1).into_bytes());
    }
    template.set_part(
        "ppt/presentation.xml",
        format!(r#"<p:presentation {ns}><p:sldIdLst>{ids}</p:sldIdLst></p:presentation>"#).into_bytes(),
    );
    template.set_part("ppt/_rels/presentation.xml.rels", rels.to_xml().into_bytes());

    let pipeline = Pipeline::builder()
        .hunter(Arc::new(MockLlm::new("sonar").with_response(research_reply())))
        .architect(Arc::new(MockLlm::new("gemini").with_response(text(MEMO))))
        .output(OutputKind::PptxTemplate(template.to_bytes().unwrap()))
        .date(date())
        .build()
        .unwrap();

    let artifact = pipeline.run("Contoso").await.unwrap();
    assert_eq!(artifact.mime_type, PPTX_MIME_TYPE);
    assert!(artifact.file_name.ends_with(".pptx"));

    let package = Package::from_bytes(&artifact.bytes).unwrap();
    assert!(part_text(&package, "ppt/slides/slide1.xml").contains("<a:t>Margin Rescue</a:t>"));
    assert!(part_text(&package, "ppt/slides/slide2.xml").contains("<a:t>Executive Summary</a:t>"));
    let third = part_text(&package, "ppt/slides/slide3.xml");
    assert!(third.contains("<a:t>The Strategic Bottleneck</a:t>"));
    assert!(third.contains("<p:pic "));
    assert!(package.contains("ppt/media/brief1.png"));
}
