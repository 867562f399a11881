use clap::{Parser, Subcommand};

pub mod commands;

#[derive(Parser)]
#[command(name = "freigabe")]
#[command(about = "Manufacturing project approval workflow")]
#[command(long_about = "Freigabe drives production requests through the review chain: \
                       sales submits, supply chain reviews, planning approves per location. \
                       Every transition lands in the audit history.")]
pub struct Cli {
    /// Override the configured role for this invocation
    #[arg(long, global = true, help = "Act as this role (vertrieb, supply_chain, planung, planung_<site>, admin)")]
    pub role: Option<String>,
    /// Override the configured actor identity (uuid)
    #[arg(long, global = true, help = "Act as this actor identity")]
    pub actor_id: Option<String>,
    /// Override the configured actor display name
    #[arg(long, global = true, help = "Display name recorded in history entries")]
    pub actor_name: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a new production request (sales; lands in supply-chain review)
    Submit {
        /// Customer reference
        #[arg(long)]
        customer: String,
        /// Article reference
        #[arg(long)]
        article: String,
        /// Total requested quantity
        #[arg(long)]
        quantity: f64,
        /// Mark the total quantity as fixed
        #[arg(long, help = "Total quantity is not open for renegotiation")]
        fixed: bool,
        /// First delivery date (YYYY-MM-DD)
        #[arg(long)]
        first_delivery: Option<String>,
        /// Last delivery date (YYYY-MM-DD)
        #[arg(long)]
        last_delivery: Option<String>,
        /// Per-location share, repeatable: --dist "Storkow=300"
        #[arg(long = "dist", help = "Location share as SITE=QUANTITY, repeatable")]
        distribution: Vec<String>,
    },
    /// Approve a project: forwards supply-chain review, records a planning site response
    Approve {
        /// Human-facing project number
        number: i64,
        /// Planning site to respond for (unscoped planners and admins)
        #[arg(long, help = "Site name when approving in planning review")]
        location: Option<String>,
    },
    /// Reject a project in supply-chain review, or cancel an approved project as its creator
    Reject {
        /// Human-facing project number
        number: i64,
        /// Reason (required)
        #[arg(long)]
        reason: String,
    },
    /// Correct quantity/distribution and roll the project back one review stage
    Correct {
        /// Human-facing project number
        number: i64,
        /// New total quantity
        #[arg(long)]
        quantity: Option<f64>,
        /// New per-location share, repeatable: --dist "Storkow=300"
        #[arg(long = "dist")]
        distribution: Vec<String>,
        /// Reason (required)
        #[arg(long)]
        reason: String,
        /// Idempotency key; replaying the same id is a no-op
        #[arg(long, help = "Client-supplied operation id (uuid)")]
        operation_id: Option<String>,
    },
    /// Resubmit a corrected project from sales review back to supply chain
    Resubmit {
        /// Human-facing project number
        number: i64,
        /// Adjusted total quantity
        #[arg(long)]
        quantity: Option<f64>,
        /// Adjusted per-location share, repeatable
        #[arg(long = "dist")]
        distribution: Vec<String>,
        /// Optional note recorded in history
        #[arg(long)]
        reason: Option<String>,
    },
    /// Archive a terminal project (creator only; status value is untouched)
    Archive {
        /// Human-facing project number
        number: i64,
    },
    /// Run the auto-completion sweep over approved projects past delivery
    Sweep {
        /// Treat this date as today (YYYY-MM-DD); defaults to the current date
        #[arg(long)]
        date: Option<String>,
    },
    /// List projects visible to the acting role
    List {
        /// Show the archive partition instead of the workable list
        #[arg(long)]
        archived: bool,
        /// Archive filter: approved | rejected
        #[arg(long, help = "Restrict the archive to one preceding terminal status")]
        terminal: Option<String>,
    },
    /// Show one project's detail and audit trail
    Status {
        /// Human-facing project number
        number: i64,
    },
    /// Show history entries: a project's trail or an actor's activity
    History {
        /// Human-facing project number
        #[arg(long)]
        number: Option<i64>,
        /// Actor to audit (admins only; defaults to yourself)
        #[arg(long)]
        actor: Option<String>,
        /// Oldest-first replay order instead of newest-first display order
        #[arg(long)]
        replay: bool,
    },
}
