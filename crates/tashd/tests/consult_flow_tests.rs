//! Consult flow tests
//!
//! Exercise the matching pipeline with fake provider clients that replay the
//! output shapes real models produce: clean contract objects, fenced JSON,
//! prose-wrapped arrays, truncated garbage, and outright transport failure.

use async_trait::async_trait;
use tash_common::catalog::default_catalog;
use tash_common::error::{Result, TashError};
use tash_common::matcher::{hydrate_candidates, match_narrative, InferenceProvider};
use tash_common::rules::RuleIndex;
use tash_common::schema::SoldierProfile;

/// Replays one canned response, recording the prompt it was given.
struct ReplayProvider {
    response: std::result::Result<String, String>,
    seen_prompt: std::sync::Mutex<Option<String>>,
}

impl ReplayProvider {
    fn ok(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
            seen_prompt: std::sync::Mutex::new(None),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            seen_prompt: std::sync::Mutex::new(None),
        }
    }

    fn prompt(&self) -> String {
        self.seen_prompt.lock().unwrap().clone().unwrap_or_default()
    }
}

#[async_trait]
impl InferenceProvider for ReplayProvider {
    async fn infer(&self, prompt: &str) -> Result<String> {
        *self.seen_prompt.lock().unwrap() = Some(prompt.to_string());
        self.response.clone().map_err(TashError::Provider)
    }
}

#[tokio::test]
async fn test_clean_contract_response() {
    let corpus = default_catalog();
    let rules = RuleIndex::builtin();
    let provider = ReplayProvider::ok(
        r#"{"recommendedIds": ["lone-soldier-hame", "bzack-grant"],
            "explanation": "Estranged from parents and in acute debt.",
            "nextSteps": {
                "soldierNeeds": ["Social worker report", "Bank statements for 6 months"],
                "mashakNeeds": ["Home visit", "Committee file"]
            }}"#,
    );

    let outcome = match_narrative(
        &provider,
        &rules,
        "no contact with parents, foreclosure notices arriving",
        None,
        &corpus,
    )
    .await;

    assert_eq!(outcome.candidate_ids, vec!["lone-soldier-hame", "bzack-grant"]);
    assert_eq!(outcome.soldier_needs.len(), 2);
    assert_eq!(outcome.mashak_needs.len(), 2);

    let suggestions = hydrate_candidates(&outcome.candidate_ids, &corpus);
    assert_eq!(suggestions[0].id, "lone-soldier-hame");
    assert_eq!(suggestions[1].id, "bzack-grant");
}

#[tokio::test]
async fn test_fenced_bare_array_response() {
    let corpus = default_catalog();
    let rules = RuleIndex::builtin();
    let provider = ReplayProvider::ok("```json\n[\"rent-participation\"]\n```");

    let outcome = match_narrative(&provider, &rules, "needs rent help", None, &corpus).await;
    assert_eq!(outcome.candidate_ids, vec!["rent-participation"]);
    assert!(outcome.rationale.is_empty());
}

#[tokio::test]
async fn test_prose_wrapped_array_falls_back() {
    let corpus = default_catalog();
    let rules = RuleIndex::builtin();
    let provider = ReplayProvider::ok(
        r#"Given the protocols, I recommend ["work-permit", "bzack-grant"] as the tracks."#,
    );

    let outcome = match_narrative(&provider, &rules, "debts", None, &corpus).await;
    assert_eq!(outcome.candidate_ids, vec!["work-permit", "bzack-grant"]);
}

#[tokio::test]
async fn test_garbage_degrades_without_panic() {
    let corpus = default_catalog();
    let rules = RuleIndex::builtin();
    let provider = ReplayProvider::ok("Sorry, I can't help with that request today.");

    let outcome = match_narrative(&provider, &rules, "anything", None, &corpus).await;
    assert!(outcome.candidate_ids.is_empty());
    assert!(hydrate_candidates(&outcome.candidate_ids, &corpus).is_empty());
    assert_eq!(outcome.raw_output, "Sorry, I can't help with that request today.");
}

#[tokio::test]
async fn test_transport_failure_keeps_error_for_audit() {
    let corpus = default_catalog();
    let rules = RuleIndex::builtin();
    let provider = ReplayProvider::failing("timeout after 20s");

    let outcome = match_narrative(&provider, &rules, "anything", None, &corpus).await;
    assert!(outcome.candidate_ids.is_empty());
    assert!(outcome.raw_output.contains("timeout after 20s"));
}

#[tokio::test]
async fn test_unknown_ids_silently_dropped() {
    let corpus = default_catalog();
    let rules = RuleIndex::builtin();
    let provider = ReplayProvider::ok(
        r#"{"recommendedIds": ["retired-template", "tashmash-pregnancy"], "explanation": "x"}"#,
    );

    let outcome = match_narrative(&provider, &rules, "pregnant, week 16", None, &corpus).await;
    assert_eq!(outcome.candidate_ids, vec!["tashmash-pregnancy"]);
}

#[tokio::test]
async fn test_prompt_carries_rules_profile_and_corpus() {
    let corpus = default_catalog();
    let rules = RuleIndex::builtin();
    let provider = ReplayProvider::ok("[]");
    let profile = SoldierProfile {
        full_name: "Avi Cohen".to_string(),
        unit: Some("Golani".to_string()),
        is_lone_soldier: true,
        ..Default::default()
    };

    let _ = match_narrative(&provider, &rules, "rent is overdue", Some(&profile), &corpus).await;

    let prompt = provider.prompt();
    assert!(prompt.contains("Avi Cohen"));
    assert!(prompt.contains("recognized lone soldier"));
    assert!(prompt.contains("rent is overdue"));
    assert!(prompt.contains("\"recommendedIds\""));
    for template in &corpus {
        assert!(prompt.contains(&template.id));
    }
}

#[test]
fn test_rule_index_regression_without_model() {
    // The deterministic pre-filter answers protocol questions with no model.
    let rules = RuleIndex::builtin();
    assert_eq!(
        rules.deterministic_match("his parents abroad since 2020"),
        vec!["lone-soldier-muvhak"]
    );
    assert_eq!(
        rules.deterministic_match("married, and the family is in overdraft"),
        vec!["tashmash-parents", "tashmash-married"]
    );
}
