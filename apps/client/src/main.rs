mod api;
mod error;
mod feedback;
mod resume;
mod view;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::api::{ApplyForm, PortalClient};
use crate::error::ClientError;
use crate::view::{JobDetailView, ViewAction};

#[derive(Parser, Debug)]
#[command(
    name = "jobboard-client",
    about = "Browse a job and apply to it from the command line",
    version
)]
struct Cli {
    /// Base URL of the job board API
    #[arg(long, env = "JOBBOARD_API_URL", default_value = "http://localhost:8080")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a job; signing in shows the action available to you
    Show {
        id: Uuid,
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Apply to a job as a signed-in applicant
    Apply {
        id: Uuid,
        #[command(flatten)]
        credentials: Credentials,
        /// PDF, DOC or DOCX file to attach
        #[arg(long)]
        resume: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct Credentials {
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
}

/// Signs in when both credentials are given.
async fn sign_in(
    client: &PortalClient,
    credentials: &Credentials,
) -> Result<Option<api::Viewer>, ClientError> {
    match (&credentials.email, &credentials.password) {
        (Some(email), Some(password)) => client.login(email, password).await.map(Some),
        _ => Ok(None),
    }
}

async fn show(client: &PortalClient, id: Uuid, credentials: &Credentials) -> Result<(), ClientError> {
    let viewer = sign_in(client, credentials).await?;
    let view = JobDetailView::new(client.get_job(id).await?, viewer);
    print!("{view}");
    Ok(())
}

async fn apply(
    client: &PortalClient,
    id: Uuid,
    credentials: &Credentials,
    resume: Option<PathBuf>,
) -> Result<bool, ClientError> {
    let viewer = sign_in(client, credentials)
        .await?
        .ok_or(ClientError::NotSignedIn)?;
    // confirms the cookie was accepted
    let viewer = match client.me().await {
        Ok(current) => current,
        Err(ClientError::NotSignedIn) => return Err(ClientError::NotSignedIn),
        Err(_) => viewer,
    };

    let view = JobDetailView::new(client.get_job(id).await?, Some(viewer.clone()));
    if let ViewAction::SendResume { contact } = view.action() {
        println!("Only applicants can apply here. Send your cv/resume to: {contact}");
        return Ok(false);
    }

    let resume = match resume {
        Some(path) => Some(resume::load(&path).await?),
        None => None,
    };
    let outcome = client
        .apply(ApplyForm {
            applicant_id: viewer.id,
            recruiter_id: view.job.created_by,
            job_id: view.job.id,
            date_of_application: Utc::now().date_naive(),
            resume,
        })
        .await?;
    println!("{}", outcome.message());
    Ok(outcome.is_success())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = PortalClient::new(&cli.base_url)?;

    let result = match cli.command {
        Command::Show { id, credentials } => show(&client, id, &credentials).await.map(|_| true),
        Command::Apply {
            id,
            credentials,
            resume,
        } => apply(&client, id, &credentials, resume).await,
    };

    match result {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::FAILURE),
        Err(e) => {
            eprintln!("{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
