mod common;

use common::{brief, funnel_json, funnel_response};
use copyfunnel_sdk::{
    sdk_test::MockLanguageModel, LanguageModelError, ModelResponse, ResponseFormatOption,
};
use copyfunnel_studio::{
    parse_funnel_response, prompt, schema::ViolationKind, AdminSettings, EmailType,
    FunnelGenerator, GenerationError, ResponseParseError,
};
use serde_json::json;
use std::sync::Arc;

fn generator_with(model: &Arc<MockLanguageModel>) -> FunnelGenerator {
    FunnelGenerator::new(model.clone())
}

#[test]
fn request_embeds_the_brief_and_fixes_email_types() {
    let request = FunnelGenerator::build_request(&brief(), &AdminSettings::default());

    let prompt_text = &request.messages[0].text;
    for field in [
        "Product Name: X",
        "Target Audience: Y",
        "Main Pain Points: Z",
        "Key Benefits: W",
    ] {
        assert!(prompt_text.contains(field), "prompt is missing {field:?}");
    }
    assert!(prompt_text.contains("Tone of Voice: urgent"));
    assert!(prompt_text.contains("Language: English"));
    assert!(prompt_text.ends_with(prompt::OUTPUT_INSTRUCTIONS));

    let Some(ResponseFormatOption::Json(format)) = &request.response_format else {
        panic!("expected a JSON response format");
    };
    let schema = format.schema.as_ref().expect("schema is attached");
    assert_eq!(
        schema["properties"]["emails"]["items"]["properties"]["type"]["enum"],
        json!(["welcome", "nurture", "sales"])
    );
    assert_eq!(request.temperature, Some(0.7));
    assert_eq!(
        request.system_prompt.as_deref(),
        Some(AdminSettings::default().system_instruction.as_str())
    );
}

#[test]
fn request_follows_admin_settings() {
    let settings = AdminSettings {
        system_instruction: "Be brief.".to_string(),
        base_prompt_template: "Write a funnel for:".to_string(),
        model_temperature: 0.2,
    };
    let request = FunnelGenerator::build_request(&brief(), &settings);

    assert_eq!(request.system_prompt.as_deref(), Some("Be brief."));
    assert!(request.messages[0].text.starts_with("Write a funnel for:\n\n"));
    assert_eq!(request.temperature, Some(0.2));
}

#[tokio::test]
async fn generate_stamps_the_funnel_with_the_original_brief() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(funnel_response());

    let input = brief();
    let funnel = generator_with(&model)
        .generate(&input, &AdminSettings::default())
        .await
        .expect("generation should succeed");

    assert_eq!(funnel.input, input);
    assert!(!funnel.id.is_empty());
    assert_eq!(funnel.landing_page.headline, "Stop losing leads");
    assert_eq!(
        funnel.emails.iter().map(|e| e.kind).collect::<Vec<_>>(),
        EmailType::ALL.to_vec()
    );
    assert_eq!(funnel.ads.len(), 2);

    let tracked = model.tracked_generate_inputs();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0], FunnelGenerator::build_request(&input, &AdminSettings::default()));
}

#[tokio::test]
async fn missing_credential_is_a_configuration_error() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(LanguageModelError::MissingCredential("google"));

    let err = generator_with(&model)
        .generate(&brief(), &AdminSettings::default())
        .await
        .expect_err("generation should fail");

    assert!(matches!(err, GenerationError::Configuration("google")));
}

#[tokio::test]
async fn remote_failure_is_a_service_error() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(LanguageModelError::Refusal("prompt blocked: SAFETY".to_string()));

    let err = generator_with(&model)
        .generate(&brief(), &AdminSettings::default())
        .await
        .expect_err("generation should fail");

    assert!(matches!(err, GenerationError::Service(LanguageModelError::Refusal(_))));
}

#[tokio::test]
async fn non_json_reply_is_a_parse_error() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(ModelResponse::text("Sure! Here is your funnel:"));

    let err = generator_with(&model)
        .generate(&brief(), &AdminSettings::default())
        .await
        .expect_err("generation should fail");

    assert!(matches!(
        err,
        GenerationError::ResponseParse(ResponseParseError::InvalidJson(_))
    ));
}

#[test]
fn empty_reply_is_rejected() {
    assert!(matches!(parse_funnel_response("  "), Err(ResponseParseError::Empty)));
}

#[test]
fn schema_violations_carry_json_paths() {
    let mut reply = funnel_json();
    reply["emails"][1]["type"] = json!("promo");
    reply["landingPage"].as_object_mut().unwrap().remove("cta");
    reply["ads"] = json!("none");

    let Err(ResponseParseError::Schema { violations }) = parse_funnel_response(&reply.to_string())
    else {
        panic!("expected schema violations");
    };

    let mut paths: Vec<&str> = violations.iter().map(|v| v.path.as_str()).collect();
    paths.sort_unstable();
    assert_eq!(paths, vec!["$.ads", "$.emails[1].type", "$.landingPage.cta"]);

    let email = violations
        .iter()
        .find(|v| v.path == "$.emails[1].type")
        .unwrap();
    assert!(matches!(&email.kind, ViolationKind::NotInEnum { value, .. } if value == "\"promo\""));
}

#[test]
fn extra_keys_and_empty_arrays_are_accepted() {
    let mut reply = funnel_json();
    reply["ads"] = json!([]);
    reply["notes"] = json!("ignored");

    let copy = parse_funnel_response(&reply.to_string()).expect("reply should parse");
    assert!(copy.ads.is_empty());
}
