use brief_agent::{StrategyMemo, parse_memo};
use proptest::prelude::*;

fn memo_json(title: &str, summary: &str) -> String {
    serde_json::json!({
        "title": title,
        "executive_summary": summary,
        "problem_statement": "p",
        "solution_architecture": "s",
        "roi_analysis": "r",
        "implementation_plan": "i"
    })
    .to_string()
}

proptest! {
    #[test]
    fn memo_survives_fences_and_surrounding_chatter(
        title in "[^`]{0,40}",
        summary in "[^`]{0,200}",
        prefix in "[^{}`]{0,40}",
        suffix in "[^{}`]{0,40}",
        fenced in any::<bool>(),
    ) {
        let json = memo_json(&title, &summary);
        let reply = if fenced {
            format!("{prefix}```json\n{json}\n```{suffix}")
        } else {
            format!("{prefix}{json}{suffix}")
        };

        let memo = parse_memo(&reply).unwrap();
        prop_assert_eq!(memo.title, title);
        prop_assert_eq!(memo.executive_summary, summary);
    }

    #[test]
    fn arbitrary_text_never_panics(reply in ".{0,300}") {
        let _ = parse_memo(&reply);
    }

    #[test]
    fn fallback_title_names_company(company in "[A-Za-z0-9 &.-]{1,30}") {
        let memo = StrategyMemo::fallback(&company);
        prop_assert_eq!(memo.title, format!("AI Transformation Strategy for {company}"));
    }
}
