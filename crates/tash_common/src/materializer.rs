//! Case materialization: template -> fresh two-track checklist snapshot.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{
    Assignee, CaseStatus, ChecklistItem, ConsultationCase, ItemOrigin, RequestTemplate,
    Responsible, Track,
};

/// How template items are routed into the two tracks.
///
/// The fixed policy mirrors the desk's working practice: the soldier track is
/// the document list shown to the soldier, the mashak track is the handling
/// workflow, and per-item responsibility tags only annotate the UI. The
/// by-assignee policy routes strictly on the tags instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingPolicy {
    #[default]
    FixedTwoTrack,
    ByAssignee,
}

/// Build a new case from a chosen template.
///
/// The checklists are value copies: the template can be edited or deleted
/// afterwards without touching this case. Requirement and step order is
/// preserved within each track.
pub fn materialize(
    template: &RequestTemplate,
    soldier_id: &str,
    soldier_name: &str,
    narrative: &str,
    policy: RoutingPolicy,
) -> ConsultationCase {
    let mut soldier_checklist = Vec::new();
    let mut mashak_checklist = Vec::new();

    for requirement in &template.requirements {
        let track = match policy {
            RoutingPolicy::FixedTwoTrack => Track::Soldier,
            RoutingPolicy::ByAssignee => match requirement.assigned_to {
                Some(Assignee::Mashak) => Track::Mashak,
                _ => Track::Soldier,
            },
        };
        let item = ChecklistItem {
            id: requirement.id.clone(),
            text: requirement.title.clone(),
            checked: false,
            origin: ItemOrigin::Template,
        };
        match track {
            Track::Soldier => soldier_checklist.push(item),
            Track::Mashak => mashak_checklist.push(item),
        }
    }

    for step in &template.workflow {
        let track = match policy {
            RoutingPolicy::FixedTwoTrack => Track::Mashak,
            RoutingPolicy::ByAssignee => match step.responsible {
                Some(Responsible::Soldier) => Track::Soldier,
                _ => Track::Mashak,
            },
        };
        let item = ChecklistItem {
            id: format!("step_{}", step.order),
            text: step.title.clone(),
            checked: false,
            origin: ItemOrigin::Template,
        };
        match track {
            Track::Soldier => soldier_checklist.push(item),
            Track::Mashak => mashak_checklist.push(item),
        }
    }

    let now = Utc::now();
    ConsultationCase {
        id: format!("case-{}", Uuid::new_v4().simple()),
        soldier_id: soldier_id.to_string(),
        soldier_name: soldier_name.to_string(),
        narrative: narrative.to_string(),
        template_id: template.id.clone(),
        template_title: template.title.clone(),
        soldier_checklist,
        mashak_checklist,
        status: CaseStatus::Active,
        matched_keywords: matched_keywords(template, narrative),
        ai_recommendation: None,
        rev: 0,
        created_at: now,
        updated_at: now,
    }
}

/// Template keywords that actually appear in the narrative, for audit.
pub fn matched_keywords(template: &RequestTemplate, narrative: &str) -> Vec<String> {
    let text = narrative.to_lowercase();
    template
        .ai_keywords
        .iter()
        .filter(|k| text.contains(&k.to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    #[test]
    fn test_fixed_policy_lengths_match_template() {
        for template in default_catalog() {
            let case = materialize(&template, "s-1", "Dana", "opened manually", RoutingPolicy::FixedTwoTrack);
            assert_eq!(case.soldier_checklist.len(), template.requirements.len());
            assert_eq!(case.mashak_checklist.len(), template.workflow.len());
            assert!(case
                .soldier_checklist
                .iter()
                .chain(case.mashak_checklist.iter())
                .all(|i| !i.checked && i.origin == ItemOrigin::Template));
        }
    }

    #[test]
    fn test_fixed_policy_preserves_order() {
        let catalog = default_catalog();
        let template = catalog.iter().find(|t| t.id == "tashmash-parents").unwrap();
        let case = materialize(template, "s-1", "Dana", "debts", RoutingPolicy::FixedTwoTrack);

        let ids: Vec<&str> = case.soldier_checklist.iter().map(|i| i.id.as_str()).collect();
        let expected: Vec<&str> = template.requirements.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, expected);

        assert_eq!(case.mashak_checklist[0].id, "step_1");
        assert_eq!(
            case.mashak_checklist.last().unwrap().id,
            format!("step_{}", template.workflow.len())
        );
    }

    #[test]
    fn test_by_assignee_routes_mashak_requirements() {
        let catalog = default_catalog();
        let template = catalog.iter().find(|t| t.id == "rent-participation").unwrap();

        let fixed = materialize(template, "s-1", "Dana", "rent", RoutingPolicy::FixedTwoTrack);
        assert!(fixed.soldier_checklist.iter().any(|i| i.id == "home_visit"));

        let routed = materialize(template, "s-1", "Dana", "rent", RoutingPolicy::ByAssignee);
        assert!(routed.mashak_checklist.iter().any(|i| i.id == "home_visit"));
        assert!(!routed.soldier_checklist.iter().any(|i| i.id == "home_visit"));
        // Workflow steps still land in the mashak track (none are soldier-run).
        assert!(routed.mashak_checklist.iter().any(|i| i.id == "step_1"));
    }

    #[test]
    fn test_snapshot_isolation_from_template_edits() {
        let catalog = default_catalog();
        let mut template = catalog.into_iter().find(|t| t.id == "work-permit").unwrap();
        let case = materialize(&template, "s-1", "Dana", "debts", RoutingPolicy::FixedTwoTrack);
        let before = case.soldier_checklist.len();

        template.requirements.clear();
        template.workflow.clear();

        assert_eq!(case.soldier_checklist.len(), before);
        assert_eq!(case.template_id, "work-permit");
    }

    #[test]
    fn test_matched_keywords_case_insensitive() {
        let catalog = default_catalog();
        let template = catalog.iter().find(|t| t.id == "bzack-grant").unwrap();
        let keywords = matched_keywords(template, "URGENT: the Electricity Cut happened");
        assert!(keywords.contains(&"electricity cut".to_string()));
        assert!(keywords.contains(&"urgent".to_string()));
        assert!(!keywords.contains(&"foreclosure".to_string()));
    }

    #[test]
    fn test_fresh_case_ids_differ() {
        let catalog = default_catalog();
        let template = &catalog[0];
        let a = materialize(template, "s-1", "Dana", "x", RoutingPolicy::FixedTwoTrack);
        let b = materialize(template, "s-1", "Dana", "x", RoutingPolicy::FixedTwoTrack);
        assert_ne!(a.id, b.id);
        assert_eq!(a.rev, 0);
    }
}
