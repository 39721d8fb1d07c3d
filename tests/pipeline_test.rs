//! End-to-end pipeline tests against a scripted backend.

use std::sync::Arc;

use counsel_rs::agent::prompt::{
    COMPILATION_SYSTEM_PROMPT, EXTRACTION_SYSTEM_PROMPT, RELEVANCE_SYSTEM_PROMPT,
};
use counsel_rs::agent::{AgentConfig, Orchestrator};
use counsel_rs::core::{FailureCause, IRRELEVANT_MESSAGE, PipelineResult, UNKNOWN_FIRM};
use counsel_rs::error::AgentError;
use counsel_rs::testing::ScriptedProvider;
use test_case::test_case;

const KIRKLAND_QUERY: &str = "Is Kirkland & Ellis present in the agreement?";

const SEGMENTS: [&str; 4] = [
    "Ecolab Inc. (\"Buyer\") has been represented by Shearman & Sterling LLP in connection \
     with the acquisition of all outstanding shares of ChemCo Holdings.",
    "ChemCo Holdings (\"Seller\") has retained Cleary Gottlieb Steen & Hamilton LLP as its \
     legal counsel for the transaction.",
    "Gibson, Dunn & Crutcher LLP has provided an independent fairness review to the board of \
     directors of the Buyer.",
    "The closing shall occur on the third business day following satisfaction of the \
     conditions set forth in Article VII.",
];

const SCENARIO_A_EXTRACTION: &str = "\
Paragraph 1 Analysis:
Buyer: Ecolab Inc.
Buyer Representative: Shearman & Sterling LLP
Seller: ChemCo Holdings
Seller Representative: Not stated
Third-Party Representation: None
Target Company Mentioned: No

Paragraph 2 Analysis:
Buyer: Not identified
Buyer Representative: Not stated
Seller: ChemCo Holdings
Seller Representative: Cleary Gottlieb Steen & Hamilton LLP
Third-Party Representation: None
Target Company Mentioned: No

Paragraph 3 Analysis:
Buyer: Ecolab Inc.
Buyer Representative: Not stated
Seller: Not identified
Seller Representative: Not stated
Third-Party Representation: Gibson, Dunn & Crutcher LLP
Target Company Mentioned: No

Paragraph 4 Analysis:
Buyer: Not identified
Buyer Representative: Not stated
Seller: Not identified
Seller Representative: Not stated
Third-Party Representation: None
Target Company Mentioned: No
";

const SCENARIO_A_RECORD: &str = r#"{
  "buyer_firm": "Shearman & Sterling LLP",
  "seller_firm": "Cleary Gottlieb Steen & Hamilton LLP",
  "third_party": "Gibson, Dunn & Crutcher LLP",
  "contains_target_firm": false
}"#;

fn config() -> AgentConfig {
    AgentConfig::builder()
        .api_key("test-key")
        .model("gpt-4o-mini")
        .temperature(0.3)
        .build()
        .unwrap_or_else(|_| unreachable!())
}

fn orchestrator(provider: &Arc<ScriptedProvider>) -> Orchestrator {
    Orchestrator::new(provider.clone(), config())
}

fn scenario_a_provider() -> Arc<ScriptedProvider> {
    Arc::new(
        ScriptedProvider::new()
            .reply_with_usage("The target company is Kirkland & Ellis.", 20)
            .reply_with_usage(SCENARIO_A_EXTRACTION, 300)
            .reply_with_usage(SCENARIO_A_RECORD, 50),
    )
}

#[tokio::test]
async fn test_scenario_a_positive_run() {
    let provider = scenario_a_provider();
    let run = orchestrator(&provider)
        .run(KIRKLAND_QUERY, &SEGMENTS)
        .await
        .unwrap_or_else(|_| unreachable!());

    let PipelineResult::Success {
        target_company,
        extraction_text,
        record,
    } = &run.result
    else {
        unreachable!()
    };
    assert_eq!(target_company, "Kirkland & Ellis");
    assert_eq!(extraction_text, SCENARIO_A_EXTRACTION);
    assert_eq!(record.buyer_firm, "Shearman & Sterling LLP");
    assert_eq!(record.seller_firm, "Cleary Gottlieb Steen & Hamilton LLP");
    assert_eq!(record.third_party, "Gibson, Dunn & Crutcher LLP");
    assert!(!record.contains_target_firm);

    assert_eq!(run.backend_calls, 3);
    assert_eq!(run.total_tokens, 370);
    assert_eq!(run.extraction_complete, Some(true));
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_stages_receive_fixed_instructions_verbatim() {
    let provider = scenario_a_provider();
    orchestrator(&provider)
        .process(KIRKLAND_QUERY, &SEGMENTS)
        .await
        .unwrap_or_else(|_| unreachable!());

    let requests = provider.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].system_content(), Some(RELEVANCE_SYSTEM_PROMPT));
    assert_eq!(requests[1].system_content(), Some(EXTRACTION_SYSTEM_PROMPT));
    assert_eq!(requests[2].system_content(), Some(COMPILATION_SYSTEM_PROMPT));

    for request in &requests {
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.model, "gpt-4o-mini");
    }
    assert!(!requests[0].json_mode);
    assert!(!requests[1].json_mode);
    assert!(requests[2].json_mode);
}

#[tokio::test]
async fn test_stage_inputs_chain_together() {
    let provider = scenario_a_provider();
    orchestrator(&provider)
        .process(KIRKLAND_QUERY, &SEGMENTS)
        .await
        .unwrap_or_else(|_| unreachable!());

    let requests = provider.requests();
    assert_eq!(requests[0].user_content(), Some(KIRKLAND_QUERY));

    let extraction_input = requests[1].user_content().unwrap_or_default();
    assert!(extraction_input.starts_with("Target company to look for: Kirkland & Ellis\n\n"));
    for (i, segment) in SEGMENTS.iter().enumerate() {
        assert!(extraction_input.contains(&format!("Paragraph {}:\n{segment}\n\n", i + 1)));
    }

    let compilation_input = requests[2].user_content().unwrap_or_default();
    assert_eq!(
        compilation_input,
        format!("Paragraph analyses to compile:\n\n{SCENARIO_A_EXTRACTION}")
    );
}

#[tokio::test]
async fn test_scenario_b_irrelevant_query() {
    let provider = Arc::new(ScriptedProvider::new().reply(IRRELEVANT_MESSAGE));
    let result = orchestrator(&provider)
        .process("What is the weather forecast for tomorrow?", &SEGMENTS)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(
        result,
        PipelineResult::Irrelevant {
            message: IRRELEVANT_MESSAGE.to_string()
        }
    );
    assert_eq!(provider.call_count(), 1);
}

#[test_case(3 ; "three segments")]
#[test_case(5 ; "five segments")]
#[test_case(0 ; "no segments")]
fn test_scenario_c_wrong_segment_count(count: usize) {
    let provider = Arc::new(ScriptedProvider::new());
    let segments: Vec<String> = (0..count).map(|i| format!("segment {i}")).collect();

    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|_| unreachable!());
    let result = rt.block_on(orchestrator(&provider).process(KIRKLAND_QUERY, &segments));

    assert!(matches!(
        result,
        Err(AgentError::InputCardinality { expected: 4, actual }) if actual == count
    ));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_format_violation_aborts_after_one_call() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .reply("Sure! You are asking about Kirkland & Ellis.")
            .reply(SCENARIO_A_EXTRACTION),
    );
    let result = orchestrator(&provider)
        .process(KIRKLAND_QUERY, &SEGMENTS)
        .await;

    let Err(AgentError::FormatViolation { content }) = result else {
        unreachable!()
    };
    assert_eq!(content, "Sure! You are asking about Kirkland & Ellis.");
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_unparseable_record_becomes_failure() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .reply("The target company is Kirkland & Ellis.")
            .reply(SCENARIO_A_EXTRACTION)
            .reply("The buyer was represented by Shearman & Sterling LLP."),
    );
    let result = orchestrator(&provider)
        .process(KIRKLAND_QUERY, &SEGMENTS)
        .await
        .unwrap_or_else(|_| unreachable!());

    let PipelineResult::Failure {
        target_company,
        raw_output,
        cause,
        ..
    } = result
    else {
        unreachable!()
    };
    assert_eq!(target_company, "Kirkland & Ellis");
    assert_eq!(raw_output, "The buyer was represented by Shearman & Sterling LLP.");
    assert_eq!(cause, FailureCause::CompilationParseFailure);
}

#[tokio::test]
async fn test_record_with_extra_key_becomes_failure() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .reply("The target company is Kirkland & Ellis.")
            .reply(SCENARIO_A_EXTRACTION)
            .reply(
                r#"{"buyer_firm":"a","seller_firm":"b","third_party":"c","contains_target_firm":false,"notes":"x"}"#,
            ),
    );
    let result = orchestrator(&provider)
        .process(KIRKLAND_QUERY, &SEGMENTS)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(result.status(), "failure");
}

#[tokio::test]
async fn test_fenced_record_with_markers_normalizes() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .reply("The target company is Latham & Watkins")
            .reply(SCENARIO_A_EXTRACTION)
            .reply(
                "```json\n{\"buyer_firm\":\"Not identified\",\"seller_firm\":\"\",\"third_party\":\"None\",\"contains_target_firm\":false}\n```",
            ),
    );
    let result = orchestrator(&provider)
        .process("Does Latham & Watkins appear?", &SEGMENTS)
        .await
        .unwrap_or_else(|_| unreachable!());

    let record = result.record().cloned().unwrap_or_default();
    assert_eq!(result.target_company(), Some("Latham & Watkins"));
    assert_eq!(record.buyer_firm, UNKNOWN_FIRM);
    assert_eq!(record.seller_firm, UNKNOWN_FIRM);
    assert_eq!(record.third_party, UNKNOWN_FIRM);
}

#[test_case(0 ; "relevance stage")]
#[test_case(1 ; "extraction stage")]
#[test_case(2 ; "compilation stage")]
fn test_backend_failure_propagates(failing_stage: usize) {
    let replies = [
        "The target company is Kirkland & Ellis.",
        SCENARIO_A_EXTRACTION,
        SCENARIO_A_RECORD,
    ];
    let mut scripted = ScriptedProvider::new();
    for (stage, reply) in replies.iter().enumerate() {
        scripted = if stage == failing_stage {
            scripted.fail("quota exceeded")
        } else {
            scripted.reply(*reply)
        };
    }
    let provider = Arc::new(scripted);

    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|_| unreachable!());
    let result = rt.block_on(orchestrator(&provider).process(KIRKLAND_QUERY, &SEGMENTS));

    let Err(AgentError::ApiRequest { message, .. }) = result else {
        unreachable!()
    };
    assert_eq!(message, "quota exceeded");
    assert_eq!(provider.call_count(), failing_stage + 1);
}

#[tokio::test]
async fn test_truncated_extraction_still_compiles() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .reply("The target company is Kirkland & Ellis.")
            .reply_truncated("Paragraph 1 Analysis:\nBuyer: Ecolab Inc.\nBuyer Repr")
            .reply(SCENARIO_A_RECORD),
    );
    let run = orchestrator(&provider)
        .run(KIRKLAND_QUERY, &SEGMENTS)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(run.extraction_complete, Some(false));
    assert_eq!(run.result.status(), "success");
}

#[tokio::test]
async fn test_identical_backend_output_gives_identical_results() {
    let first = orchestrator(&scenario_a_provider())
        .process(KIRKLAND_QUERY, &SEGMENTS)
        .await
        .unwrap_or_else(|_| unreachable!());
    let second = orchestrator(&scenario_a_provider())
        .process(KIRKLAND_QUERY, &SEGMENTS)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_result_json_shape() {
    let provider = scenario_a_provider();
    let result = orchestrator(&provider)
        .process(KIRKLAND_QUERY, &SEGMENTS)
        .await
        .unwrap_or_else(|_| unreachable!());
    let json = serde_json::to_value(&result).unwrap_or_default();

    assert_eq!(json["status"], "success");
    assert_eq!(json["targetCompany"], "Kirkland & Ellis");
    let record = json["record"].as_object().cloned().unwrap_or_default();
    assert_eq!(record.len(), 4);
    assert_eq!(record["contains_target_firm"], false);
}

#[tokio::test]
async fn test_prompt_overrides_from_directory() {
    let dir = tempfile::TempDir::new().unwrap_or_else(|_| unreachable!());
    std::fs::write(dir.path().join("relevance.md"), "custom relevance instruction")
        .unwrap_or_else(|_| unreachable!());

    let config = AgentConfig::builder()
        .api_key("test-key")
        .prompt_dir(dir.path())
        .build()
        .unwrap_or_else(|_| unreachable!());
    let provider = Arc::new(ScriptedProvider::new().reply(IRRELEVANT_MESSAGE));
    let orchestrator = Orchestrator::new(provider.clone(), config);
    orchestrator
        .process("weather?", &SEGMENTS)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(
        provider.requests()[0].system_content(),
        Some("custom relevance instruction")
    );
    assert_eq!(orchestrator.prompts().extraction, EXTRACTION_SYSTEM_PROMPT);
}
