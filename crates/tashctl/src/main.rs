//! Tash Control - CLI client for the Tash Desk daemon
//!
//! Caseworker interface: consult on a narrative, browse templates, open
//! cases, and work the checklists.

mod commands;
mod http_client;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tashctl")]
#[command(about = "Tash Desk - welfare request matching and case tracking", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show daemon health
    Status,

    /// Match a narrative against the template catalog
    Consult {
        /// Free-text description of the soldier's situation
        text: String,

        /// Enrich the prompt with a registered soldier's profile
        #[arg(long)]
        soldier: Option<String>,
    },

    /// List templates, or search them by keyword
    Templates {
        /// Keyword search over titles, descriptions, and keywords
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one template in full
    Template {
        /// Template id
        id: String,
    },

    /// Open a case from a chosen template
    Open {
        /// Template id to materialize
        #[arg(long)]
        template: String,

        /// Soldier id the case belongs to
        #[arg(long)]
        soldier: String,

        /// Display name override
        #[arg(long)]
        name: Option<String>,

        /// The narrative that led to this choice
        #[arg(long)]
        narrative: Option<String>,
    },

    /// List cases, newest first (active only by default)
    Cases {
        /// Only this soldier's cases
        #[arg(long)]
        soldier: Option<String>,

        /// Include completed and archived cases
        #[arg(long)]
        all: bool,
    },

    /// Show one case with checklists and progress
    Case {
        /// Case id
        id: String,
    },

    /// Toggle a checklist item
    Toggle {
        /// Case id
        case: String,
        /// Which checklist: soldier | mashak
        track: String,
        /// Item id
        item: String,
    },

    /// Add a manual checklist item
    Add {
        /// Case id
        case: String,
        /// Which checklist: soldier | mashak
        track: String,
        /// Item text
        text: String,
    },

    /// Delete a checklist item permanently
    Remove {
        /// Case id
        case: String,
        /// Which checklist: soldier | mashak
        track: String,
        /// Item id
        item: String,
    },

    /// Change a case's status: active | completed | archived
    SetStatus {
        /// Case id
        case: String,
        /// New status
        status: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => commands::status().await,
        Commands::Consult { text, soldier } => commands::consult(text, soldier).await,
        Commands::Templates { search } => commands::templates(search).await,
        Commands::Template { id } => commands::template(id).await,
        Commands::Open {
            template,
            soldier,
            name,
            narrative,
        } => commands::open_case(template, soldier, name, narrative).await,
        Commands::Cases { soldier, all } => commands::cases(soldier, all).await,
        Commands::Case { id } => commands::show_case(id).await,
        Commands::Toggle { case, track, item } => commands::toggle(case, track, item).await,
        Commands::Add { case, track, text } => commands::add(case, track, text).await,
        Commands::Remove { case, track, item } => commands::remove(case, track, item).await,
        Commands::SetStatus { case, status } => commands::set_status(case, status).await,
    }
}
