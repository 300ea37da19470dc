//! `redflag`: command-line client for the Report Service.
//!
//! Every report command logs in with `REDFLAG_EMAIL` / `REDFLAG_PASSWORD`,
//! mounts a view for the session's role and drives it through the sync
//! controller, so the same policy and validation apply as in any other view.

use anyhow::{anyhow, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use redflag_core::environment::SystemClock;
use redflag_reports::geolocation::{FixedLocation, LocationProvider, NoGeolocation};
use redflag_reports::{
    mount_and_fetch, Config, Credentials, HttpReportService, IdentityClient, NotificationLevel,
    Registration, ReportChanges, ReportDraft, ReportId, ReportStatus, ReportType, ReportsAction,
    ReportsEnvironment, StatusFacet, SyncController,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Red-flag and intervention reports from the terminal
#[derive(Debug, Parser)]
#[command(name = "redflag", version)]
#[command(about = "Submit, review and manage red-flag and intervention reports", long_about = None)]
#[command(after_help = "Report commands log in with REDFLAG_EMAIL and REDFLAG_PASSWORD.")]
struct Cli {
    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, env = "REDFLAG_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and print the issued session
    Login {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },

    /// Create an account
    Register {
        /// Display name
        name: String,
        /// Account email
        email: String,
        /// Account password
        password: String,
    },

    /// List the reports visible to the logged-in user
    List {
        /// Only titles containing this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,
        /// `all` or one status, e.g. `pending`, `under-investigation`
        #[arg(long)]
        status: Option<StatusFacet>,
    },

    /// File a new report
    Submit {
        /// `red-flag` or `intervention`
        #[arg(long = "type", default_value = "red-flag")]
        report_type: ReportType,
        /// Short summary
        #[arg(long)]
        title: String,
        /// Full account
        #[arg(long)]
        description: String,
        /// Incident date, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Attach the position from REDFLAG_LATITUDE / REDFLAG_LONGITUDE
        #[arg(long)]
        locate: bool,
    },

    /// Change fields of a draft or pending report
    Edit {
        /// Report id
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New incident date, YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Delete a draft or pending report
    Delete {
        /// Report id
        id: String,
    },

    /// Move a report along the review workflow (administrators)
    SetStatus {
        /// Report id
        id: String,
        /// Target status, e.g. `under-investigation`, `resolved`
        status: ReportStatus,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let identity = IdentityClient::with_timeout(&config.api.url, config.api.request_timeout())?;

    match cli.command {
        Command::Login { email, password } => {
            let session = identity.login(&Credentials { email, password }).await?;
            println!("Logged in as user {} ({})", session.user_id, session.role);
            println!("token: {}", session.token);
        },
        Command::Register {
            name,
            email,
            password,
        } => {
            identity
                .register(&Registration {
                    name,
                    email,
                    password,
                })
                .await?;
            println!("Registration successful. Please log in.");
        },
        command => {
            let view = open_view(&config, &identity).await?;
            let outcome = run_report_command(&config, &view, command).await;
            view.shutdown(config.cli.effect_timeout()).await?;
            outcome?;
        },
    }

    Ok(())
}

/// Log in and mount a view for the session's role
async fn open_view(config: &Config, identity: &IdentityClient) -> anyhow::Result<SyncController> {
    let credentials = config
        .cli
        .credentials
        .as_ref()
        .ok_or_else(|| anyhow!("set REDFLAG_EMAIL and REDFLAG_PASSWORD to use report commands"))?;
    let session = identity.login(credentials).await?;

    let service = HttpReportService::with_timeout(&config.api.url, config.api.request_timeout())?
        .with_token(&session.token);
    let locator: Arc<dyn LocationProvider> = match config.cli.location {
        Some(location) => Arc::new(FixedLocation(location)),
        None => Arc::new(NoGeolocation),
    };
    let env = ReportsEnvironment::new(Arc::new(service), Arc::new(SystemClock), session)
        .with_locator(locator)
        .with_transitions(config.policy.admin_transitions);

    let view = mount_and_fetch(env, config.cli.effect_timeout()).await?;
    if let Some(error) = view.state(|s| s.load_error.clone()).await {
        bail!(error);
    }
    Ok(view)
}

/// Send one action, wait for its remote call and report the outcome
///
/// Fails with the message of any error notification the action produced.
async fn dispatch(config: &Config, view: &SyncController, action: ReportsAction) -> anyhow::Result<()> {
    let seen = view.state(|s| s.notifications.len()).await;
    let mut handle = view.send(action).await?;
    handle.wait_with_timeout(config.cli.effect_timeout()).await?;

    let fresh = view
        .state(|s| s.notifications.iter().skip(seen).cloned().collect::<Vec<_>>())
        .await;
    for notification in &fresh {
        if notification.level == NotificationLevel::Error {
            bail!(notification.message.clone());
        }
        println!("{}", notification.message);
    }
    Ok(())
}

async fn run_report_command(config: &Config, view: &SyncController, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List { search, status } => {
            if let Some(term) = search {
                dispatch(config, view, ReportsAction::SetSearchTerm { term }).await?;
            }
            if let Some(facet) = status {
                dispatch(config, view, ReportsAction::SetStatusFacet { facet }).await?;
            }
            let rows = view
                .state(|s| {
                    s.visible_reports()
                        .into_iter()
                        .map(|r| {
                            format!(
                                "{}\t{:<19}\t{:<12}\t{}\t{}",
                                r.id,
                                r.status.label(),
                                r.report_type,
                                r.incident_date,
                                r.title
                            )
                        })
                        .collect::<Vec<_>>()
                })
                .await;
            if rows.is_empty() {
                println!("No reports found");
            }
            for row in rows {
                println!("{row}");
            }
        },
        Command::Submit {
            report_type,
            title,
            description,
            date,
            locate,
        } => {
            let draft = ReportDraft::new(report_type)
                .title(title)
                .description(description)
                .incident_date(date);
            dispatch(config, view, ReportsAction::SetDraft { draft }).await?;

            if locate {
                if let Err(error) = dispatch(config, view, ReportsAction::RequestLocation).await {
                    eprintln!("{error}; submitting without a location");
                }
            }
            dispatch(config, view, ReportsAction::SubmitDraft).await?;
        },
        Command::Edit {
            id,
            title,
            description,
            date,
        } => {
            let changes = ReportChanges {
                title,
                description,
                incident_date: date,
                ..ReportChanges::default()
            };
            let id = ReportId::new(id);
            dispatch(config, view, ReportsAction::UpdateReport { id, changes }).await?;
        },
        Command::Delete { id } => {
            let id = ReportId::new(id);
            dispatch(config, view, ReportsAction::DeleteReport { id }).await?;
        },
        Command::SetStatus { id, status } => {
            let id = ReportId::new(id);
            dispatch(config, view, ReportsAction::ChangeStatus { id, status }).await?;
        },
        Command::Login { .. } | Command::Register { .. } => {
            bail!("{command:?} does not operate on reports")
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)] // Test code can use unwrap/panic
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_submit_parses_typed_fields() {
        let cli = Cli::try_parse_from([
            "redflag",
            "submit",
            "--type",
            "intervention",
            "--title",
            "Broken pipe",
            "--description",
            "Water everywhere",
            "--date",
            "2024-12-30",
            "--locate",
        ])
        .unwrap();

        let Command::Submit {
            report_type,
            date,
            locate,
            ..
        } = cli.command
        else {
            panic!("expected submit");
        };
        assert_eq!(report_type, ReportType::Intervention);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 12, 30).unwrap());
        assert!(locate);
    }

    #[test]
    fn test_submit_defaults_to_red_flag() {
        let cli = Cli::try_parse_from([
            "redflag",
            "submit",
            "--title",
            "Bribe",
            "--description",
            "At the office",
            "--date",
            "2024-12-30",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Submit {
                report_type: ReportType::RedFlag,
                locate: false,
                ..
            }
        ));
    }

    #[test]
    fn test_set_status_accepts_hyphenated_status() {
        let cli = Cli::try_parse_from(["redflag", "set-status", "7", "under-investigation"]).unwrap();
        let Command::SetStatus { id, status } = cli.command else {
            panic!("expected set-status");
        };
        assert_eq!(id, "7");
        assert_eq!(status, ReportStatus::UnderInvestigation);
    }

    #[test]
    fn test_list_status_facet() {
        let cli = Cli::try_parse_from(["redflag", "list", "--search", "pothole", "--status", "resolved"]).unwrap();
        let Command::List { search, status } = cli.command else {
            panic!("expected list");
        };
        assert_eq!(search.as_deref(), Some("pothole"));
        assert_eq!(status, Some(StatusFacet::Only(ReportStatus::Resolved)));
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert!(Cli::try_parse_from(["redflag", "set-status", "7", "closed"]).is_err());
        assert!(Cli::try_parse_from(["redflag", "edit", "7", "--date", "30/12/2024"]).is_err());
        assert!(Cli::try_parse_from(["redflag", "submit", "--title", "No date", "--description", "x"]).is_err());
    }

    #[test]
    fn test_edit_fields_are_optional() {
        let cli = Cli::try_parse_from(["redflag", "edit", "3", "--title", "Crater"]).unwrap();
        let Command::Edit {
            id,
            title,
            description,
            date,
        } = cli.command
        else {
            panic!("expected edit");
        };
        assert_eq!(id, "3");
        assert_eq!(title.as_deref(), Some("Crater"));
        assert_eq!(description, None);
        assert_eq!(date, None);
    }
}
