//! Built-in request template catalog.
//!
//! Seeded into the document store on first run so a fresh install can match
//! and open cases immediately. Templates edited through the store are never
//! overwritten by this list.

use chrono::Utc;

use crate::schema::{
    Assignee, FieldKind, ProcessStep, Requirement, RequestTemplate, Responsible,
};

fn req(id: &str, title: &str, kind: FieldKind, required: bool) -> Requirement {
    Requirement {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        kind,
        required,
        allow_multiple: false,
        assigned_to: Some(Assignee::Soldier),
    }
}

fn req_for(
    id: &str,
    title: &str,
    kind: FieldKind,
    required: bool,
    assigned_to: Assignee,
) -> Requirement {
    Requirement {
        assigned_to: Some(assigned_to),
        ..req(id, title, kind, required)
    }
}

fn step(order: u32, title: &str, responsible: Responsible, automated: bool) -> ProcessStep {
    ProcessStep {
        order,
        title: title.to_string(),
        description: String::new(),
        is_automated: automated,
        responsible: Some(responsible),
    }
}

/// The default template corpus.
pub fn default_catalog() -> Vec<RequestTemplate> {
    let now = Utc::now();
    vec![
        RequestTemplate {
            id: "tashmash-parents".to_string(),
            title: "Family support - parents".to_string(),
            category: "tashmash".to_string(),
            short_description: "Monthly support for a soldier whose parents are in economic distress.".to_string(),
            eligibility_criteria: vec![
                "The soldier's parents are in economic distress".to_string(),
                "Household income is below the entitlement threshold".to_string(),
                "The soldier is not married".to_string(),
            ],
            ai_keywords: vec![
                "parents".to_string(), "debt".to_string(), "overdraft".to_string(),
                "low income".to_string(), "poverty".to_string(), "no food".to_string(),
            ],
            approving_authority: "Unit welfare officer".to_string(),
            requires_home_visit: false,
            requires_declaration: true,
            procedure_days: Some(30),
            related_benefits: vec!["bzack-grant".to_string(), "vouchers".to_string()],
            requirements: vec![
                req("declaration", "Signed income declaration", FieldKind::File, true),
                req("confidentiality", "Confidentiality waiver signed by the parents", FieldKind::File, true),
                req("parents_id", "Copies of both parents' ID cards", FieldKind::File, true),
                req("parents_bank_3m", "Parents' bank statements (last 3 months)", FieldKind::File, true),
                req("parents_salary", "Parents' pay slips or unemployment confirmation", FieldKind::File, true),
                req("debts", "Debt notices, if any", FieldKind::File, false),
            ],
            workflow: vec![
                step(1, "Open the request in the personnel system", Responsible::Mashak, false),
                step(2, "Have the soldier sign the declaration", Responsible::Mashak, false),
                step(3, "Verify all economic documents are present", Responsible::Mashak, false),
                step(4, "Compute income per capita against the thresholds", Responsible::System, true),
                step(5, "Enter a recommendation", Responsible::Mashak, false),
            ],
            soldier_actions: vec![
                "Bring the parents' ID cards".to_string(),
                "Bring the parents' bank statements for 3 months".to_string(),
                "Obtain a signed confidentiality waiver from the parents".to_string(),
            ],
            mashak_actions: vec![
                "Open the request".to_string(),
                "Verify the economic documents".to_string(),
                "Enter a recommendation".to_string(),
            ],
            sla_hours: 336,
            last_updated: now,
        },
        RequestTemplate {
            id: "tashmash-married".to_string(),
            title: "Family support - married".to_string(),
            category: "tashmash".to_string(),
            short_description: "Support for a married soldier living with a spouse.".to_string(),
            eligibility_criteria: vec![
                "The soldier is married or in a recognized partnership".to_string(),
                "The couple lives together".to_string(),
                "Spouse income is below the ceiling".to_string(),
            ],
            ai_keywords: vec![
                "married".to_string(), "spouse".to_string(), "wife".to_string(),
                "husband".to_string(), "wedding".to_string(),
            ],
            approving_authority: "Unit welfare officer".to_string(),
            requires_home_visit: false,
            requires_declaration: true,
            procedure_days: Some(30),
            related_benefits: vec!["rent-participation".to_string()],
            requirements: vec![
                req("declaration", "Signed income declaration", FieldKind::File, true),
                req("marriage_cert", "Marriage certificate", FieldKind::File, true),
                req("rent_contract", "Rent contract in both names", FieldKind::File, true),
                req("spouse_salary", "Spouse pay slips (last 3 months)", FieldKind::File, true),
            ],
            workflow: vec![
                step(1, "Open the request in the personnel system", Responsible::Mashak, false),
                step(2, "Verify document completeness", Responsible::Mashak, false),
                step(3, "Compute income per capita", Responsible::System, true),
                step(4, "Enter a recommendation", Responsible::Mashak, false),
            ],
            soldier_actions: vec![
                "Bring the marriage certificate".to_string(),
                "Bring the rent contract".to_string(),
                "Bring the spouse's pay slips".to_string(),
            ],
            mashak_actions: vec![
                "Open the request".to_string(),
                "Verify documents".to_string(),
                "Enter a recommendation".to_string(),
            ],
            sla_hours: 336,
            last_updated: now,
        },
        RequestTemplate {
            id: "tashmash-pregnancy".to_string(),
            title: "Family support - pregnancy".to_string(),
            category: "tashmash".to_string(),
            short_description: "Recognition from week 14 of pregnancy for birth grants and equipment.".to_string(),
            eligibility_criteria: vec![
                "The soldier is pregnant, week 14 or later".to_string(),
                "A medical certificate states the week and due date".to_string(),
            ],
            ai_keywords: vec![
                "pregnant".to_string(), "pregnancy".to_string(), "birth".to_string(),
                "baby".to_string(),
            ],
            approving_authority: "Unit welfare officer".to_string(),
            requires_home_visit: false,
            requires_declaration: true,
            procedure_days: Some(30),
            related_benefits: vec![],
            requirements: vec![
                req("declaration", "Signed income declaration", FieldKind::File, true),
                req("pregnancy_cert", "Medical certificate with week and due date", FieldKind::File, true),
                req("marriage_cert", "Marriage certificate, if married", FieldKind::File, false),
            ],
            workflow: vec![
                step(1, "Open the request in the personnel system", Responsible::Mashak, false),
                step(2, "Verify week 14+ on the certificate", Responsible::Mashak, false),
                step(3, "Enter a recommendation", Responsible::Mashak, false),
            ],
            soldier_actions: vec![
                "Bring a medical certificate stating the pregnancy week".to_string(),
            ],
            mashak_actions: vec![
                "Verify week 14+".to_string(),
                "Enter a recommendation".to_string(),
            ],
            sla_hours: 168,
            last_updated: now,
        },
        RequestTemplate {
            id: "lone-soldier-muvhak".to_string(),
            title: "Lone soldier - parents abroad".to_string(),
            category: "lone_soldier".to_string(),
            short_description: "Recognition as a lone soldier whose parents live permanently abroad.".to_string(),
            eligibility_criteria: vec![
                "The soldier's parents live permanently abroad".to_string(),
                "The soldier immigrated alone or with family that returned abroad".to_string(),
                "No first-degree relatives in the country able to support".to_string(),
            ],
            ai_keywords: vec![
                "abroad".to_string(), "overseas".to_string(), "immigrated".to_string(),
                "alone".to_string(), "parents abroad".to_string(),
            ],
            approving_authority: "Personnel branch head".to_string(),
            requires_home_visit: true,
            requires_declaration: true,
            procedure_days: Some(60),
            related_benefits: vec!["rent-participation".to_string(), "flight-funding".to_string()],
            requirements: vec![
                req("declaration", "Signed income declaration", FieldKind::File, true),
                req("border_log", "Border-crossing extract for the soldier and parents", FieldKind::File, true),
                req("parents_abroad_proof", "Proof of the parents' residence abroad", FieldKind::File, true),
                req("personal_letter", "Personal letter describing the situation", FieldKind::File, true),
                req_for("home_visit", "Home-visit report", FieldKind::File, true, Assignee::Mashak),
            ],
            workflow: vec![
                step(1, "Open the request", Responsible::Mashak, false),
                step(2, "In-depth interview with the soldier", Responsible::Mashak, false),
                step(3, "Home visit (mandatory)", Responsible::Mashak, false),
                step(4, "Check border crossings", Responsible::System, true),
                step(5, "Enter a recommendation and forward for approval", Responsible::Mashak, false),
            ],
            soldier_actions: vec![
                "Bring the border-crossing extract".to_string(),
                "Bring proof of the parents' residence abroad".to_string(),
                "Write a personal letter".to_string(),
            ],
            mashak_actions: vec![
                "Conduct an in-depth interview".to_string(),
                "Perform the home visit".to_string(),
                "Forward for approval".to_string(),
            ],
            sla_hours: 504,
            last_updated: now,
        },
        RequestTemplate {
            id: "lone-soldier-hame".to_string(),
            title: "Lone soldier - no family backing".to_string(),
            category: "lone_soldier".to_string(),
            short_description: "Recognition for a soldier estranged from parents living in the country.".to_string(),
            eligibility_criteria: vec![
                "The parents live in the country".to_string(),
                "There is no contact, or only minimal contact, with the parents".to_string(),
                "The situation is attested by professionals".to_string(),
            ],
            ai_keywords: vec![
                "estranged".to_string(), "no contact".to_string(), "cut off".to_string(),
                "left home".to_string(), "family conflict".to_string(),
            ],
            approving_authority: "Lone-soldier committee".to_string(),
            requires_home_visit: true,
            requires_declaration: true,
            procedure_days: Some(60),
            related_benefits: vec!["rent-participation".to_string()],
            requirements: vec![
                req("declaration", "Signed income declaration", FieldKind::File, true),
                req("social_worker_report", "Municipal social worker report", FieldKind::File, true),
                req("affidavit", "Notarized affidavit from the soldier", FieldKind::File, true),
                req("bank_6m", "Bank statements for 6 months", FieldKind::File, true),
                req_for("home_visit", "Home-visit report", FieldKind::File, true, Assignee::Mashak),
                req_for("mashak_report", "Detailed caseworker report", FieldKind::File, true, Assignee::Mashak),
            ],
            workflow: vec![
                step(1, "Open the request", Responsible::Mashak, false),
                step(2, "Comprehensive interview", Responsible::Mashak, false),
                step(3, "Home visit (mandatory)", Responsible::Mashak, false),
                step(4, "Coordinate with the community social worker", Responsible::Mashak, false),
                step(5, "Prepare the committee file", Responsible::Mashak, false),
                step(6, "Accompany the soldier to the committee", Responsible::Mashak, false),
            ],
            soldier_actions: vec![
                "Obtain a social worker report".to_string(),
                "Prepare a notarized affidavit".to_string(),
                "Bring 6 months of bank statements".to_string(),
            ],
            mashak_actions: vec![
                "Conduct a comprehensive interview".to_string(),
                "Perform the home visit".to_string(),
                "Prepare the committee file".to_string(),
            ],
            sla_hours: 720,
            last_updated: now,
        },
        RequestTemplate {
            id: "rent-participation".to_string(),
            title: "Rent participation".to_string(),
            category: "housing".to_string(),
            short_description: "Rent funding assistance for recognized lone soldiers.".to_string(),
            eligibility_criteria: vec![
                "Recognized lone soldier or aid-entitled soldier".to_string(),
                "Rents privately with a contract in their own name".to_string(),
            ],
            ai_keywords: vec![
                "rent".to_string(), "apartment".to_string(), "landlord".to_string(),
                "lease".to_string(), "housing".to_string(),
            ],
            approving_authority: "Unit welfare officer".to_string(),
            requires_home_visit: true,
            requires_declaration: false,
            procedure_days: Some(30),
            related_benefits: vec![],
            requirements: vec![
                req("rent_contract", "Original rent contract, valid for at least a year", FieldKind::File, true),
                req("landlord_id", "Copy of the landlord's ID", FieldKind::File, true),
                req("landlord_bank", "Landlord's bank details for the transfer", FieldKind::File, true),
                req("bank_ownership", "Proof of the soldier's bank account ownership", FieldKind::File, true),
                req_for("home_visit", "Home-visit report", FieldKind::File, true, Assignee::Mashak),
            ],
            workflow: vec![
                step(1, "Check the rent contract", Responsible::Mashak, false),
                step(2, "Home visit", Responsible::Mashak, false),
                step(3, "Compute the assistance amount", Responsible::System, true),
                step(4, "Enter bank details and a recommendation", Responsible::Mashak, false),
            ],
            soldier_actions: vec![
                "Bring the original rent contract".to_string(),
                "Bring the landlord's ID and bank details".to_string(),
            ],
            mashak_actions: vec![
                "Check the contract".to_string(),
                "Perform the home visit".to_string(),
                "Enter a recommendation".to_string(),
            ],
            sla_hours: 168,
            last_updated: now,
        },
        RequestTemplate {
            id: "work-permit".to_string(),
            title: "Private work permit".to_string(),
            category: "economic".to_string(),
            short_description: "Permission to work during off-duty hours for proven economic need.".to_string(),
            eligibility_criteria: vec![
                "Proven economic need".to_string(),
                "The work will not impair the service".to_string(),
                "Commander approval".to_string(),
            ],
            ai_keywords: vec![
                "work".to_string(), "job".to_string(), "income".to_string(),
                "support the family".to_string(), "overdraft".to_string(),
            ],
            approving_authority: "Unit commander".to_string(),
            requires_home_visit: false,
            requires_declaration: false,
            procedure_days: Some(14),
            related_benefits: vec![],
            requirements: vec![
                req("bank_3m", "Bank statements (last 3 months)", FieldKind::File, true),
                req("balance_sum", "Summary of balances across accounts", FieldKind::File, true),
                req_for("commander_approval", "Direct commander approval", FieldKind::File, true, Assignee::Commander),
                req("employer_letter", "Letter from the employer with terms and hours", FieldKind::File, false),
            ],
            workflow: vec![
                step(1, "Assess the economic need", Responsible::Mashak, false),
                step(2, "Assess the impact on the service", Responsible::Mashak, false),
                step(3, "Enter a recommendation", Responsible::Mashak, false),
                step(4, "Forward to the unit commander", Responsible::Mashak, false),
            ],
            soldier_actions: vec![
                "Bring bank statements for 3 months".to_string(),
                "Bring a letter from the employer".to_string(),
                "Obtain commander approval".to_string(),
            ],
            mashak_actions: vec![
                "Assess the economic need".to_string(),
                "Forward to the unit commander".to_string(),
            ],
            sla_hours: 72,
            last_updated: now,
        },
        RequestTemplate {
            id: "bzack-grant".to_string(),
            title: "Emergency grant".to_string(),
            category: "economic".to_string(),
            short_description: "Immediate financial aid for acute distress.".to_string(),
            eligibility_criteria: vec![
                "Acute, immediate economic distress".to_string(),
                "No ability to cope without aid".to_string(),
            ],
            ai_keywords: vec![
                "foreclosure".to_string(), "eviction".to_string(), "electricity cut".to_string(),
                "emergency".to_string(), "urgent".to_string(), "no food".to_string(),
            ],
            approving_authority: "Unit commander".to_string(),
            requires_home_visit: false,
            requires_declaration: false,
            procedure_days: Some(7),
            related_benefits: vec!["vouchers".to_string()],
            requirements: vec![
                req("bank_3m", "Bank statements (last 3 months)", FieldKind::File, true),
                req("debts", "Debt or foreclosure notices", FieldKind::File, true),
                req_for("mashak_report", "Caseworker report", FieldKind::File, true, Assignee::Mashak),
            ],
            workflow: vec![
                step(1, "Urgent interview", Responsible::Mashak, false),
                step(2, "Verify the distress and the documents", Responsible::Mashak, false),
                step(3, "Enter an urgent recommendation", Responsible::Mashak, false),
                step(4, "Commander approval", Responsible::Commander, false),
            ],
            soldier_actions: vec![
                "Bring bank statements".to_string(),
                "Bring the debt notices".to_string(),
            ],
            mashak_actions: vec![
                "Hold an urgent interview".to_string(),
                "Write the report".to_string(),
                "Enter an urgent recommendation".to_string(),
            ],
            sla_hours: 24,
            last_updated: now,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        let catalog = default_catalog();
        let mut ids: Vec<&str> = catalog.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_catalog_covers_rule_targets() {
        use crate::rules::RuleIndex;
        let catalog = default_catalog();
        let rules = RuleIndex::builtin();
        for entry in rules.entries() {
            for id in entry.template_ids {
                assert!(
                    catalog.iter().any(|t| t.id == *id),
                    "rule targets unknown template {}",
                    id
                );
            }
        }
    }

    #[test]
    fn test_workflow_orders_are_sequential() {
        for template in default_catalog() {
            for (i, step) in template.workflow.iter().enumerate() {
                assert_eq!(step.order as usize, i + 1, "template {}", template.id);
            }
        }
    }

    #[test]
    fn test_every_template_has_requirements_and_workflow() {
        for template in default_catalog() {
            assert!(!template.requirements.is_empty(), "template {}", template.id);
            assert!(!template.workflow.is_empty(), "template {}", template.id);
            assert!(!template.ai_keywords.is_empty(), "template {}", template.id);
        }
    }
}
