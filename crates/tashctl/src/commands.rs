//! Command handlers for tashctl.

use anyhow::{anyhow, Result};
use console::style;
use tash_common::schema::{
    CaseStatus, ChecklistItem, ConsultationCase, CreateCaseRequest, SoldierProfile, StatusChange,
    Track,
};

use crate::http_client::DaemonClient;

pub fn parse_track(value: &str) -> Result<Track> {
    match value.to_lowercase().as_str() {
        "soldier" => Ok(Track::Soldier),
        "mashak" => Ok(Track::Mashak),
        other => Err(anyhow!("Unknown track '{}' (expected soldier|mashak)", other)),
    }
}

pub fn parse_status(value: &str) -> Result<CaseStatus> {
    match value.to_lowercase().as_str() {
        "active" => Ok(CaseStatus::Active),
        "completed" => Ok(CaseStatus::Completed),
        "archived" => Ok(CaseStatus::Archived),
        other => Err(anyhow!(
            "Unknown status '{}' (expected active|completed|archived)",
            other
        )),
    }
}

/// Show daemon health
pub async fn status() -> Result<()> {
    let client = DaemonClient::new()?;
    let health = client.health().await?;

    println!();
    println!("{}", style(format!("tashctl v{}", health.version)).bold());
    println!("daemon      {}", style(&health.status).green());
    println!("uptime      {}s", health.uptime_seconds);
    println!("templates   {}", health.templates_available);
    println!(
        "provider    {}",
        if health.provider_configured {
            style("configured").green()
        } else {
            style("not configured (manual selection only)").yellow()
        }
    );
    Ok(())
}

/// Run a consult and print the ranked suggestions
pub async fn consult(text: String, soldier_id: Option<String>) -> Result<()> {
    let client = DaemonClient::new()?;

    let profile = match soldier_id {
        Some(id) => match client.get_soldier(&id).await {
            Ok(soldier) => Some(SoldierProfile::from_soldier(&soldier)),
            Err(e) => {
                eprintln!("{} {}", style("note:").yellow(), e);
                None
            }
        },
        None => None,
    };

    println!("{}", style("Analyzing the case...").dim());
    let response = client.consult(&text, profile).await?;

    if response.suggestions.is_empty() {
        println!(
            "{}",
            style("No suggestions found. Pick a template manually with `tashctl templates`.")
                .yellow()
        );
        return Ok(());
    }

    println!();
    println!("{}", style("Suggested tracks:").bold());
    for (rank, template) in response.suggestions.iter().enumerate() {
        println!(
            "  {}. {}  {}",
            rank + 1,
            style(&template.title).bold(),
            style(format!("[{}]", template.id)).dim()
        );
        println!("     {}", template.short_description);
    }

    if let Some(explanation) = &response.explanation {
        println!();
        println!("{} {}", style("Why:").bold(), explanation);
    }

    if let Some(steps) = &response.next_steps {
        if !steps.soldier_needs.is_empty() {
            println!();
            println!("{}", style("The soldier needs to bring:").bold());
            for need in &steps.soldier_needs {
                println!("  - {}", need);
            }
        }
        if !steps.mashak_needs.is_empty() {
            println!();
            println!("{}", style("On your side:").bold());
            for need in &steps.mashak_needs {
                println!("  - {}", need);
            }
        }
    }
    Ok(())
}

/// List or search templates, grouped by category
pub async fn templates(search: Option<String>) -> Result<()> {
    let client = DaemonClient::new()?;
    let templates = match &search {
        Some(query) => client.search_templates(query).await?,
        None => client.list_templates().await?,
    };

    if templates.is_empty() {
        println!("No templates found.");
        return Ok(());
    }

    let mut current_category = String::new();
    for template in &templates {
        if template.category != current_category {
            current_category = template.category.clone();
            println!();
            println!("{}", style(&current_category).bold().underlined());
        }
        println!(
            "  {}  {}",
            style(format!("{:24}", template.id)).cyan(),
            template.title
        );
    }
    Ok(())
}

/// Show one template in full
pub async fn template(id: String) -> Result<()> {
    let client = DaemonClient::new()?;
    let template = client.get_template(&id).await?;

    println!();
    println!("{}  {}", style(&template.title).bold(), style(format!("[{}]", template.id)).dim());
    println!("{}", template.short_description);
    println!();
    println!("authority     {}", template.approving_authority);
    println!("home visit    {}", if template.requires_home_visit { "required" } else { "no" });
    println!("declaration   {}", if template.requires_declaration { "required" } else { "no" });
    println!("sla           {}h", template.sla_hours);

    println!();
    println!("{}", style("Eligibility:").bold());
    for criterion in &template.eligibility_criteria {
        println!("  - {}", criterion);
    }

    println!();
    println!("{}", style("Required documents:").bold());
    for requirement in &template.requirements {
        println!(
            "  [{}] {}{}",
            if requirement.required { "required" } else { "optional" },
            requirement.title,
            match requirement.assigned_to {
                Some(a) => format!("  ({:?})", a).to_lowercase(),
                None => String::new(),
            }
        );
    }

    println!();
    println!("{}", style("Workflow:").bold());
    for step in &template.workflow {
        println!("  {}. {}", step.order, step.title);
    }
    Ok(())
}

/// Materialize a case from a template
pub async fn open_case(
    template_id: String,
    soldier_id: String,
    soldier_name: Option<String>,
    narrative: Option<String>,
) -> Result<()> {
    let client = DaemonClient::new()?;
    let case = client
        .create_case(&CreateCaseRequest {
            template_id,
            soldier_id,
            soldier_name,
            narrative,
            explanation: None,
        })
        .await?;

    println!(
        "{} {} ({} soldier items, {} mashak items)",
        style("Opened case").green(),
        style(&case.id).bold(),
        case.soldier_checklist.len(),
        case.mashak_checklist.len()
    );
    Ok(())
}

/// List cases, newest first
pub async fn cases(soldier_id: Option<String>, all: bool) -> Result<()> {
    let client = DaemonClient::new()?;
    let cases = client.list_cases(soldier_id.as_deref(), !all).await?;

    if cases.is_empty() {
        println!("No open cases.");
        return Ok(());
    }

    for case in &cases {
        let checked = case.soldier_checklist.iter().filter(|i| i.checked).count();
        println!(
            "{}  {:9}  {}  {} ({}/{} docs)",
            style(&case.id).cyan(),
            case.status.to_string(),
            case.created_at.format("%Y-%m-%d"),
            style(&case.template_title).bold(),
            checked,
            case.soldier_checklist.len(),
        );
    }
    Ok(())
}

fn print_checklist(title: &str, items: &[ChecklistItem]) {
    println!();
    println!("{}", style(title).bold());
    if items.is_empty() {
        println!("  (empty)");
        return;
    }
    for item in items {
        println!(
            "  [{}] {}  {}",
            if item.checked { style("x").green() } else { style(" ").dim() },
            item.text,
            style(format!("({})", item.id)).dim()
        );
    }
}

fn print_case(case: &ConsultationCase) {
    println!();
    println!(
        "{}  {}  rev {}",
        style(&case.id).bold(),
        style(case.status.to_string()).cyan(),
        case.rev
    );
    println!("{} - {}", case.soldier_name, case.template_title);
    println!("\"{}\"", case.narrative);
    print_checklist("Soldier documents:", &case.soldier_checklist);
    print_checklist("Mashak tasks:", &case.mashak_checklist);
}

/// Show one case with both checklists and progress
pub async fn show_case(id: String) -> Result<()> {
    let client = DaemonClient::new()?;
    let case = client.get_case(&id).await?;
    let progress = client.progress(&id).await?;

    print_case(&case);
    println!();
    println!(
        "progress    soldier {}%   mashak {}%",
        progress.soldier, progress.mashak
    );
    Ok(())
}

/// Toggle a checklist item, retrying against the current revision
pub async fn toggle(case_id: String, track: String, item_id: String) -> Result<()> {
    let client = DaemonClient::new()?;
    let track = parse_track(&track)?;
    let case = client.get_case(&case_id).await?;
    let updated = client.toggle_item(&case_id, track, &item_id, case.rev).await?;
    print_case(&updated);
    Ok(())
}

/// Append a manual item
pub async fn add(case_id: String, track: String, text: String) -> Result<()> {
    let client = DaemonClient::new()?;
    let track = parse_track(&track)?;
    let case = client.get_case(&case_id).await?;
    let updated = client.add_item(&case_id, track, &text, case.rev).await?;
    print_case(&updated);
    Ok(())
}

/// Delete an item permanently
pub async fn remove(case_id: String, track: String, item_id: String) -> Result<()> {
    let client = DaemonClient::new()?;
    let track = parse_track(&track)?;
    let case = client.get_case(&case_id).await?;
    let updated = client.delete_item(&case_id, track, &item_id, case.rev).await?;
    print_case(&updated);
    Ok(())
}

/// Change case status
pub async fn set_status(case_id: String, status: String) -> Result<()> {
    let client = DaemonClient::new()?;
    let status = parse_status(&status)?;
    let case = client.get_case(&case_id).await?;
    let updated = client
        .set_status(&case_id, &StatusChange { status, rev: case.rev })
        .await?;
    println!(
        "{} {} is now {}",
        style("Case").green(),
        updated.id,
        style(updated.status.to_string()).bold()
    );
    Ok(())
}
