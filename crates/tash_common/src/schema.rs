//! Shared schema for templates, cases, and the consult wire contract.
//!
//! Templates are authored externally and read-only here. A case takes a
//! value copy of the template's requirements and workflow at materialization
//! time, so later template edits never touch an open case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Template catalog
// ============================================================================

/// Input kind a requirement expects from the soldier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Boolean,
    File,
}

/// Who must supply a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assignee {
    Soldier,
    Mashak,
    Commander,
}

/// Who executes a workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Responsible {
    Soldier,
    Mashak,
    Commander,
    System,
}

/// One document or field the request needs before it can be approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub required: bool,
    #[serde(default)]
    pub allow_multiple: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Assignee>,
}

/// One step of the handling workflow, in execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStep {
    pub order: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub is_automated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible: Option<Responsible>,
}

/// A welfare request template: eligibility metadata for matching plus the
/// requirement/workflow lists a case is materialized from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTemplate {
    /// Stable identifier, assigned at creation and never reassigned.
    pub id: String,
    pub title: String,
    pub category: String,
    pub short_description: String,

    /// Free-text eligibility conditions, in priority order.
    pub eligibility_criteria: Vec<String>,
    /// Keywords the matcher looks for in the narrative.
    pub ai_keywords: Vec<String>,
    pub approving_authority: String,
    pub requires_home_visit: bool,
    pub requires_declaration: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_benefits: Vec<String>,

    pub requirements: Vec<Requirement>,
    pub workflow: Vec<ProcessStep>,

    /// Plain-language action lists shown to each side of the desk.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub soldier_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mashak_actions: Vec<String>,

    /// Target handling time in hours.
    pub sla_hours: u32,
    pub last_updated: DateTime<Utc>,
}

// ============================================================================
// Soldier registry
// ============================================================================

/// A soldier known to this caseworker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Soldier {
    pub id: String,
    pub personal_id: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub is_lone_soldier: bool,
    #[serde(default)]
    pub is_tashmash: bool,
    #[serde(default)]
    pub is_or_population: bool,

    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Cases and checklists
// ============================================================================

/// Which of the two checklists an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Soldier,
    Mashak,
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Track::Soldier => write!(f, "soldier"),
            Track::Mashak => write!(f, "mashak"),
        }
    }
}

/// Where a checklist item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemOrigin {
    Template,
    Manual,
}

/// One row of a case checklist. Item ids are never reused: re-adding the same
/// text after a delete yields a fresh id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub checked: bool,
    pub origin: ItemOrigin,
}

/// Case lifecycle status. Transitions are a human decision; this core only
/// stores the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Active,
    Completed,
    Archived,
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseStatus::Active => write!(f, "active"),
            CaseStatus::Completed => write!(f, "completed"),
            CaseStatus::Archived => write!(f, "archived"),
        }
    }
}

/// One instantiated request for one soldier, with its two checklists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationCase {
    pub id: String,
    pub soldier_id: String,
    pub soldier_name: String,
    /// Free text that led to the match, or a manual-selection marker.
    pub narrative: String,

    /// Back-reference for audit only; the checklists below are value copies
    /// and are never re-synced from the template.
    pub template_id: String,
    pub template_title: String,

    pub soldier_checklist: Vec<ChecklistItem>,
    pub mashak_checklist: Vec<ChecklistItem>,

    pub status: CaseStatus,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_recommendation: Option<String>,

    /// Revision counter for optimistic concurrency. Bumped by the store on
    /// every successful write; a stale rev is rejected as a conflict.
    pub rev: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConsultationCase {
    pub fn checklist(&self, track: Track) -> &[ChecklistItem] {
        match track {
            Track::Soldier => &self.soldier_checklist,
            Track::Mashak => &self.mashak_checklist,
        }
    }

    pub fn checklist_mut(&mut self, track: Track) -> &mut Vec<ChecklistItem> {
        match track {
            Track::Soldier => &mut self.soldier_checklist,
            Track::Mashak => &mut self.mashak_checklist,
        }
    }
}

// ============================================================================
// Consult wire contract
// ============================================================================

/// Profile facts attached to a consult request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoldierProfile {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub is_lone_soldier: bool,
    #[serde(default)]
    pub is_tashmash: bool,
    #[serde(default)]
    pub is_or_population: bool,
}

impl SoldierProfile {
    pub fn from_soldier(s: &Soldier) -> Self {
        Self {
            full_name: s.full_name.clone(),
            unit: s.unit.clone(),
            is_lone_soldier: s.is_lone_soldier,
            is_tashmash: s.is_tashmash,
            is_or_population: s.is_or_population,
        }
    }
}

/// Request body for `POST /v1/consult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soldier_profile: Option<SoldierProfile>,
}

/// Split action list returned alongside suggestions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextSteps {
    pub soldier_needs: Vec<String>,
    pub mashak_needs: Vec<String>,
}

/// Response body for `POST /v1/consult`. Suggestions are fully hydrated
/// templates in ranked order, never bare ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultResponse {
    pub suggestions: Vec<RequestTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<NextSteps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

// ============================================================================
// Daemon wire contract
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub templates_available: usize,
    pub provider_configured: bool,
}

/// Request to materialize a case from a chosen template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseRequest {
    pub template_id: String,
    pub soldier_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soldier_name: Option<String>,
    /// The narrative that led here; absent for manual selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    /// Match explanation captured on the case for audit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Checklist mutation. `rev` is the revision the caller last saw; a stale
/// value is rejected with a conflict so the caller re-fetches instead of
/// clobbering someone else's edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistMutation {
    pub track: Track,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub rev: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: CaseStatus,
    pub rev: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub soldier: u8,
    pub mashak: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_wire_names() {
        let req = Requirement {
            id: "rent_contract".to_string(),
            title: "Signed rent contract".to_string(),
            description: None,
            kind: FieldKind::File,
            required: true,
            allow_multiple: false,
            assigned_to: Some(Assignee::Soldier),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"type\":\"file\""));
        assert!(json.contains("\"assignedTo\":\"soldier\""));
        assert!(json.contains("\"allowMultiple\":false"));
    }

    #[test]
    fn test_consult_request_profile_optional() {
        let req: ConsultRequest =
            serde_json::from_str(r#"{"text":"soldier is in debt"}"#).unwrap();
        assert!(req.soldier_profile.is_none());

        let req: ConsultRequest = serde_json::from_str(
            r#"{"text":"x","soldierProfile":{"fullName":"Dana Levi","isLoneSoldier":true}}"#,
        )
        .unwrap();
        let profile = req.soldier_profile.unwrap();
        assert_eq!(profile.full_name, "Dana Levi");
        assert!(profile.is_lone_soldier);
        assert!(!profile.is_tashmash);
    }

    #[test]
    fn test_case_checklist_selector() {
        let mut case = ConsultationCase {
            id: "case-1".to_string(),
            soldier_id: "s-1".to_string(),
            soldier_name: "Dana Levi".to_string(),
            narrative: "test".to_string(),
            template_id: "work-permit".to_string(),
            template_title: "Private work permit".to_string(),
            soldier_checklist: vec![],
            mashak_checklist: vec![],
            status: CaseStatus::Active,
            matched_keywords: vec![],
            ai_recommendation: None,
            rev: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        case.checklist_mut(Track::Mashak).push(ChecklistItem {
            id: "step_1".to_string(),
            text: "Open the request".to_string(),
            checked: false,
            origin: ItemOrigin::Template,
        });
        assert_eq!(case.checklist(Track::Mashak).len(), 1);
        assert!(case.checklist(Track::Soldier).is_empty());
    }
}
