//! Eligibility matching: rule priors + one generative call, parsed defensively.
//!
//! The provider is a capability interface so the matching pipeline can be
//! exercised with fake clients; the network client lives in the daemon.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;
use crate::parser::parse_consult_output;
use crate::prompt::build_consult_prompt;
use crate::rules::RuleIndex;
use crate::schema::{RequestTemplate, SoldierProfile};

/// Opaque generative-model boundary: one prompt in, raw text out.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn infer(&self, prompt: &str) -> Result<String>;
}

/// Result of one match. `candidate_ids` is corpus-filtered and keeps the
/// model's order (taken as ranked by relevance). Always returned, never an
/// error: failures show up as an empty candidate list with the raw text (or
/// the provider error) preserved for audit.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub candidate_ids: Vec<String>,
    pub rationale: String,
    pub soldier_needs: Vec<String>,
    pub mashak_needs: Vec<String>,
    pub raw_output: String,
}

/// Match a narrative against the template corpus.
pub async fn match_narrative(
    provider: &dyn InferenceProvider,
    rules: &RuleIndex,
    narrative: &str,
    profile: Option<&SoldierProfile>,
    corpus: &[RequestTemplate],
) -> MatchOutcome {
    let prompt = build_consult_prompt(narrative, profile, corpus, rules);
    info!("Consult prompt built ({} chars, {} templates)", prompt.len(), corpus.len());

    let raw = match provider.infer(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            // Transport failure, timeout, anything: degrade to an empty result
            // and keep the error text where the raw output would have been.
            warn!("Provider call failed, returning empty match: {}", e);
            return MatchOutcome {
                raw_output: format!("provider error: {}", e),
                ..Default::default()
            };
        }
    };

    let parsed = parse_consult_output(&raw);
    let candidate_ids = filter_known_ids(parsed.recommended_ids, corpus);

    info!(
        "Match produced {} candidate(s){}",
        candidate_ids.len(),
        if candidate_ids.is_empty() { " (manual selection)" } else { "" }
    );

    MatchOutcome {
        candidate_ids,
        rationale: parsed.explanation,
        soldier_needs: parsed.soldier_needs,
        mashak_needs: parsed.mashak_needs,
        raw_output: raw,
    }
}

/// Drop ids the corpus does not know, silently, preserving order.
fn filter_known_ids(ids: Vec<String>, corpus: &[RequestTemplate]) -> Vec<String> {
    ids.into_iter()
        .filter(|id| corpus.iter().any(|t| &t.id == id))
        .collect()
}

/// Hydrate candidate ids into full templates, keeping the ranked order.
pub fn hydrate_candidates(ids: &[String], corpus: &[RequestTemplate]) -> Vec<RequestTemplate> {
    ids.iter()
        .filter_map(|id| corpus.iter().find(|t| &t.id == id).cloned())
        .collect()
}
