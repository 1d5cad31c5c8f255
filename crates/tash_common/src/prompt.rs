//! Consult prompt building.
//!
//! One request carries everything the model needs: the decision rules as
//! structured priors, the narrative, the optional profile, a compact
//! projection of the template corpus, and a strict output contract.

use serde::Serialize;

use crate::rules::RuleIndex;
use crate::schema::{RequestTemplate, SoldierProfile};

/// Compact per-template projection sent to the model. Keeps the prompt small
/// while still showing the "cost" of each request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchingContext<'a> {
    id: &'a str,
    title: &'a str,
    category: &'a str,
    description: &'a str,
    eligibility_criteria: &'a [String],
    keywords: &'a [String],
    approving_authority: &'a str,
    requires_home_visit: bool,
    /// Requirement titles annotated with who must supply each one.
    requirements: String,
}

fn project(template: &RequestTemplate) -> MatchingContext<'_> {
    let requirements = template
        .requirements
        .iter()
        .map(|r| {
            let who = match r.assigned_to {
                Some(a) => format!("{:?}", a).to_lowercase(),
                None => "soldier".to_string(),
            };
            format!("{} ({})", r.title, who)
        })
        .collect::<Vec<_>>()
        .join(", ");

    MatchingContext {
        id: &template.id,
        title: &template.title,
        category: &template.category,
        description: &template.short_description,
        eligibility_criteria: &template.eligibility_criteria,
        keywords: &template.ai_keywords,
        approving_authority: &template.approving_authority,
        requires_home_visit: template.requires_home_visit,
        requirements,
    }
}

const OUTPUT_CONTRACT: &str = r#"### Output instructions:
Return a single JSON object and nothing else, with exactly these fields:
{
  "recommendedIds": ["template-id", ...],
  "explanation": "short reasoning in plain language",
  "nextSteps": {
    "soldierNeeds": ["document or action the soldier must supply", ...],
    "mashakNeeds": ["action the caseworker must take", ...]
  }
}
Order recommendedIds from most to least relevant. Use only ids from the
catalog above. When in doubt, return the single most relevant option."#;

/// Build the full consult prompt.
pub fn build_consult_prompt(
    narrative: &str,
    profile: Option<&SoldierProfile>,
    corpus: &[RequestTemplate],
    rules: &RuleIndex,
) -> String {
    let context: Vec<MatchingContext<'_>> = corpus.iter().map(project).collect();
    let context_json =
        serde_json::to_string(&context).unwrap_or_else(|_| "[]".to_string());

    let mut prompt = format!(
        r#"You are a senior military welfare officer. Analyze the soldier's case and
recommend the most precise handling tracks from the closed catalog below.

### Decision rules (protocol priors):
{}"#,
        rules.render_for_prompt()
    );

    prompt.push_str(&format!("\n### Case narrative:\n\"{}\"\n", narrative));

    if let Some(p) = profile {
        prompt.push_str("\n### Soldier profile:\n");
        prompt.push_str(&format!("- name: {}\n", p.full_name));
        if let Some(unit) = &p.unit {
            prompt.push_str(&format!("- unit: {}\n", unit));
        }
        if p.is_lone_soldier {
            prompt.push_str("- recognized lone soldier\n");
        }
        if p.is_tashmash {
            prompt.push_str("- receives family support payments\n");
        }
        if p.is_or_population {
            prompt.push_str("- special-population track\n");
        }
    }

    prompt.push_str(&format!("\n### Template catalog:\n{}\n\n", context_json));
    prompt.push_str(OUTPUT_CONTRACT);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    #[test]
    fn test_prompt_contains_all_sections() {
        let corpus = default_catalog();
        let rules = RuleIndex::builtin();
        let prompt = build_consult_prompt("soldier is in debt", None, &corpus, &rules);

        assert!(prompt.contains("Decision rules"));
        assert!(prompt.contains("soldier is in debt"));
        assert!(prompt.contains("\"recommendedIds\""));
        // Every template id must be visible to the model.
        for template in &corpus {
            assert!(prompt.contains(&template.id), "missing {}", template.id);
        }
    }

    #[test]
    fn test_profile_flags_rendered() {
        let corpus = default_catalog();
        let rules = RuleIndex::builtin();
        let profile = SoldierProfile {
            full_name: "Dana Levi".to_string(),
            unit: Some("8200".to_string()),
            is_lone_soldier: true,
            ..Default::default()
        };
        let prompt = build_consult_prompt("needs rent help", Some(&profile), &corpus, &rules);
        assert!(prompt.contains("Dana Levi"));
        assert!(prompt.contains("8200"));
        assert!(prompt.contains("recognized lone soldier"));
        assert!(!prompt.contains("special-population"));
    }

    #[test]
    fn test_requirement_annotation_names_supplier() {
        let corpus = default_catalog();
        let rules = RuleIndex::builtin();
        let prompt = build_consult_prompt("x", None, &corpus, &rules);
        assert!(prompt.contains("Home-visit report (mashak)"));
    }
}
