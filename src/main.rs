use anyhow::Result;
use clap::Parser;

use freigabe::cli::commands::{
    archive::ArchiveCommand,
    history::HistoryCommand,
    list::ListCommand,
    resolve_actor,
    review::{ApproveCommand, CorrectCommand, RejectCommand, ResubmitCommand},
    show_overview,
    status::StatusCommand,
    submit::SubmitCommand,
    sweep::SweepCommand,
};
use freigabe::cli::{Cli, Commands};

fn main() -> Result<()> {
    let _ = freigabe::FreigabeConfig::load_env_file();
    freigabe::init_telemetry()?;

    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(cli));
    freigabe::shutdown_telemetry();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let actor = || {
        resolve_actor(
            cli.role.as_deref(),
            cli.actor_id.as_deref(),
            cli.actor_name.as_deref(),
        )
    };

    match cli.command {
        None => show_overview().await,
        Some(Commands::Submit {
            customer,
            article,
            quantity,
            fixed,
            first_delivery,
            last_delivery,
            distribution,
        }) => {
            SubmitCommand {
                actor: actor()?,
                customer,
                article,
                quantity,
                fixed,
                first_delivery,
                last_delivery,
                distribution,
            }
            .execute()
            .await
        }
        Some(Commands::Approve { number, location }) => {
            ApproveCommand {
                actor: actor()?,
                number,
                location,
            }
            .execute()
            .await
        }
        Some(Commands::Reject { number, reason }) => {
            RejectCommand {
                actor: actor()?,
                number,
                reason,
            }
            .execute()
            .await
        }
        Some(Commands::Correct {
            number,
            quantity,
            distribution,
            reason,
            operation_id,
        }) => {
            CorrectCommand {
                actor: actor()?,
                number,
                quantity,
                distribution,
                reason,
                operation_id,
            }
            .execute()
            .await
        }
        Some(Commands::Resubmit {
            number,
            quantity,
            distribution,
            reason,
        }) => {
            ResubmitCommand {
                actor: actor()?,
                number,
                quantity,
                distribution,
                reason,
            }
            .execute()
            .await
        }
        Some(Commands::Archive { number }) => {
            ArchiveCommand {
                actor: actor()?,
                number,
            }
            .execute()
            .await
        }
        Some(Commands::Sweep { date }) => SweepCommand { date }.execute().await,
        Some(Commands::List { archived, terminal }) => {
            ListCommand {
                actor: actor()?,
                archived,
                terminal,
            }
            .execute()
            .await
        }
        Some(Commands::Status { number }) => StatusCommand { number }.execute().await,
        Some(Commands::History {
            number,
            actor: subject,
            replay,
        }) => {
            HistoryCommand {
                actor: actor()?,
                number,
                subject,
                replay,
            }
            .execute()
            .await
        }
    }
}
