//! Command-line client for the candidate-screening API.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs the same session manager as the browser app, backed by a JSON file
//! instead of `localStorage` and by `reqwest` instead of `fetch`. `login`
//! persists the session; every other command reuses it until `logout` or
//! until the server rejects the token.


mod store;
mod transport;

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use session::models::{
    ApplicationQuery, CvUpload, EvaluationQuery, HrDecision, HrReview, JobDraft, JobProfileDraft, JobProfileUpdate,
    NewApplication, SheetsImportRequest,
};
use session::types::{AccountFields, Credentials, HrRegistration, Registration};
use session::{ApiConfig, ApiError, ScreeningClient, SessionError, SessionManager};

use crate::store::FileStore;
use crate::transport::ReqwestTransport;

type CliSession = SessionManager<FileStore, ScreeningClient<ReqwestTransport>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("not signed in; run `screening login` first")]
    NotSignedIn,
    #[error("cannot locate a home directory; pass --session-file or set SCREENING_SESSION_FILE")]
    NoSessionPath,
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Parser, Debug)]
#[command(name = "screening", about = "Candidate screening API CLI")]
struct Cli {
    #[arg(long, env = "SCREENING_API_URL", default_value = session::client::DEFAULT_API_BASE_URL)]
    base_url: String,

    /// Where the signed-in session is kept between runs.
    #[arg(long, env = "SCREENING_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[arg(long, default_value_t = 30, help = "Request timeout in seconds")]
    timeout: u64,

    #[arg(short, long, help = "Log debug output to stderr")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session.
    Login(LoginArgs),
    /// Create an account and sign in with it.
    Register(RegisterCommand),
    /// Forget the persisted session.
    Logout,
    /// Show the signed-in identity.
    Whoami {
        #[arg(long, help = "Re-fetch the identity from the server")]
        refresh: bool,
    },
    /// List open jobs.
    Jobs {
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
    /// Submit an application with a CV file.
    Apply(ApplyArgs),
    Applications(ApplicationsCommand),
    /// HR dashboard totals.
    Dashboard,
    Hr(HrCommand),
}

#[derive(Args, Debug)]
struct LoginArgs {
    /// Email address or username.
    login: String,

    #[arg(long, env = "SCREENING_PASSWORD", hide_env_values = true, help = "Read from stdin when omitted")]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct RegisterCommand {
    #[command(subcommand)]
    command: RegisterSubcommand,
}

#[derive(Subcommand, Debug)]
enum RegisterSubcommand {
    Candidate(AccountArgs),
    Hr(HrAccountArgs),
}

#[derive(Args, Debug)]
struct AccountArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: String,
    #[arg(long, env = "SCREENING_PASSWORD", hide_env_values = true, help = "Read from stdin when omitted")]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct HrAccountArgs {
    #[command(flatten)]
    account: AccountArgs,
    #[arg(long)]
    company_name: String,
    #[arg(long)]
    position: String,
    #[arg(long)]
    street_number: String,
    #[arg(long)]
    street_name: String,
    #[arg(long)]
    postal_code: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    country: String,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    job_role: String,
    #[arg(long, help = "Path to a PDF or DOCX file")]
    cv: PathBuf,
}

#[derive(Args, Debug)]
struct ApplicationsCommand {
    #[command(subcommand)]
    command: ApplicationsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ApplicationsSubcommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        job_role: Option<String>,
    },
    Show {
        id: i64,
    },
    Evaluation {
        id: i64,
    },
    Review {
        id: i64,
        #[arg(long)]
        score: f64,
        #[arg(long, help = "accept, reject, interview or pending")]
        decision: HrDecision,
        #[arg(long)]
        notes: Option<String>,
    },
    Reprocess {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct HrCommand {
    #[command(subcommand)]
    command: HrSubcommand,
}

#[derive(Subcommand, Debug)]
enum HrSubcommand {
    Jobs(HrJobsCommand),
    Profiles(ProfilesCommand),
    /// Every candidate evaluation, a page at a time.
    Evaluations {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
        #[arg(long)]
        status: Option<String>,
    },
    /// Create a Google Sheets spreadsheet for screening results.
    ExportResults {
        #[arg(long, help = "Spreadsheet title; the server picks one when omitted")]
        name: Option<String>,
    },
}

#[derive(Args, Debug)]
struct SheetArgs {
    url: String,
    #[arg(long, default_value = "Sheet1")]
    sheet: String,
    #[arg(long, default_value = "Role")]
    role_column: String,
    #[arg(long, default_value = "Profile Wanted")]
    profile_column: String,
}

impl From<SheetArgs> for SheetsImportRequest {
    fn from(args: SheetArgs) -> Self {
        Self {
            sheet_name: args.sheet,
            role_column: args.role_column,
            profile_column: args.profile_column,
            ..SheetsImportRequest::new(args.url)
        }
    }
}

#[derive(Args, Debug)]
struct HrJobsCommand {
    #[command(subcommand)]
    command: HrJobsSubcommand,
}

#[derive(Subcommand, Debug)]
enum HrJobsSubcommand {
    List,
    Show {
        id: i64,
    },
    Create {
        #[arg(long, help = "Job posting as JSON, or @path to read it from a file")]
        data: String,
    },
    /// Replace every field of a job posting.
    Update {
        id: i64,
        #[arg(long, help = "Job posting as JSON, or @path to read it from a file")]
        data: String,
    },
    Delete {
        id: i64,
    },
    /// Import job postings from a Google Sheet.
    Import(SheetArgs),
}

#[derive(Args, Debug)]
struct ProfilesCommand {
    #[command(subcommand)]
    command: ProfilesSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfilesSubcommand {
    List,
    Create {
        #[arg(long, help = "Job profile as JSON, or @path to read it from a file")]
        data: String,
    },
    /// Show the profile for one job role.
    Show {
        role: String,
    },
    /// Change the fields present in the JSON payload.
    Update {
        id: i64,
        #[arg(long, help = "Profile fields as JSON, or @path to read them from a file")]
        data: String,
    },
    Delete {
        id: i64,
    },
    /// Import profiles from a Google Sheet.
    Import(SheetArgs),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt().with_writer(io::stderr).with_max_level(level).init();

    let session_path = match cli.session_file {
        Some(path) => path,
        None => default_session_path(std::env::var_os("HOME").map(PathBuf::from)).ok_or(CliError::NoSessionPath)?,
    };
    let transport = ReqwestTransport::new(Duration::from_secs(cli.timeout))?;
    let manager = CliSession::new(
        FileStore::new(session_path),
        ScreeningClient::new(transport, ApiConfig::new(&cli.base_url)),
    );
    manager.on_unauthorized(|| eprintln!("session expired; run `screening login` again"));
    manager.init();

    let result = run(&manager, cli.command).await;
    manager.teardown();
    result
}

async fn run(manager: &CliSession, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login(args) => {
            let password = password_or_stdin(args.password)?;
            manager.establish(&Credentials::new(args.login, password)).await?;
            print_identity(manager)
        }
        Command::Register(register) => {
            let registration = build_registration(register.command)?;
            manager.register_then_establish(&registration).await?;
            print_identity(manager)
        }
        Command::Logout => {
            manager.clear();
            eprintln!("signed out");
            Ok(())
        }
        Command::Whoami { refresh } => {
            require_session(manager)?;
            if refresh {
                manager.refresh_identity().await?;
            }
            print_identity(manager)
        }
        Command::Jobs { city, role } => {
            require_session(manager)?;
            let filter = session::models::JobFilter { city, job_role: role };
            let api = manager.api();
            let jobs = manager.authorized(|token| async move { api.list_jobs(&token, &filter).await }).await?;
            print_json(&jobs)
        }
        Command::Apply(args) => run_apply(manager, args).await,
        Command::Applications(applications) => run_applications(manager, applications.command).await,
        Command::Dashboard => {
            require_session(manager)?;
            let api = manager.api();
            let stats = manager.authorized(|token| async move { api.dashboard(&token).await }).await?;
            print_json(&stats)
        }
        Command::Hr(hr) => match hr.command {
            HrSubcommand::Jobs(jobs) => run_hr_jobs(manager, jobs.command).await,
            HrSubcommand::Profiles(profiles) => run_profiles(manager, profiles.command).await,
            HrSubcommand::Evaluations { page, per_page, status } => {
                require_session(manager)?;
                let query = EvaluationQuery { page, per_page, status };
                let api = manager.api();
                let found = manager
                    .authorized(|token| async move { api.hr_evaluations(&token, &query).await })
                    .await?;
                print_json(&found)
            }
            HrSubcommand::ExportResults { name } => {
                require_session(manager)?;
                let api = manager.api();
                let created = manager
                    .authorized(|token| async move { api.create_results_spreadsheet(&token, name.as_deref()).await })
                    .await?;
                print_json(&created)
            }
        },
    }
}

async fn run_apply(manager: &CliSession, args: ApplyArgs) -> Result<(), CliError> {
    require_session(manager)?;
    let bytes = std::fs::read(&args.cv).map_err(|source| CliError::Io { path: args.cv.clone(), source })?;
    let filename = args
        .cv
        .file_name()
        .map_or_else(|| "cv".to_owned(), |name| name.to_string_lossy().into_owned());
    let application = NewApplication {
        name: args.name,
        email: args.email,
        phone: args.phone,
        job_role: args.job_role,
        cv: CvUpload { content_type: content_type_for(&args.cv).to_owned(), filename, bytes },
    };
    let api = manager.api();
    let created = manager.authorized(|token| async move { api.apply(&token, &application).await }).await?;
    print_json(&created)
}

async fn run_applications(manager: &CliSession, command: ApplicationsSubcommand) -> Result<(), CliError> {
    require_session(manager)?;
    let api = manager.api();
    match command {
        ApplicationsSubcommand::List { page, per_page, status, job_role } => {
            let query = ApplicationQuery { page, per_page, status, job_role };
            let found = manager
                .authorized(|token| async move { api.list_applications(&token, &query).await })
                .await?;
            print_json(&found)
        }
        ApplicationsSubcommand::Show { id } => {
            let found = manager.authorized(|token| async move { api.application(&token, id).await }).await?;
            print_json(&found)
        }
        ApplicationsSubcommand::Evaluation { id } => {
            let found = manager.authorized(|token| async move { api.evaluation(&token, id).await }).await?;
            print_json(&found)
        }
        ApplicationsSubcommand::Review { id, score, decision, notes } => {
            let review = HrReview { hr_score: score, hr_notes: notes, hr_decision: decision };
            let ack = manager
                .authorized(|token| async move { api.submit_review(&token, id, &review).await })
                .await?;
            print_json(&ack)
        }
        ApplicationsSubcommand::Reprocess { id } => {
            let ack = manager
                .authorized(|token| async move { api.reprocess_application(&token, id).await })
                .await?;
            print_json(&ack)
        }
    }
}

async fn run_hr_jobs(manager: &CliSession, command: HrJobsSubcommand) -> Result<(), CliError> {
    require_session(manager)?;
    let api = manager.api();
    match command {
        HrJobsSubcommand::List => {
            let jobs = manager.authorized(|token| async move { api.hr_jobs(&token).await }).await?;
            print_json(&jobs)
        }
        HrJobsSubcommand::Show { id } => {
            let job = manager.authorized(|token| async move { api.hr_job(&token, id).await }).await?;
            print_json(&job)
        }
        HrJobsSubcommand::Create { data } => {
            let draft: JobDraft = serde_json::from_str(&read_payload(&data)?)?;
            let job = manager.authorized(|token| async move { api.create_job(&token, &draft).await }).await?;
            print_json(&job)
        }
        HrJobsSubcommand::Update { id, data } => {
            let draft: JobDraft = serde_json::from_str(&read_payload(&data)?)?;
            let job = manager.authorized(|token| async move { api.update_job(&token, id, &draft).await }).await?;
            print_json(&job)
        }
        HrJobsSubcommand::Delete { id } => {
            let ack = manager.authorized(|token| async move { api.delete_job(&token, id).await }).await?;
            print_json(&ack)
        }
        HrJobsSubcommand::Import(sheet) => {
            let request = SheetsImportRequest::from(sheet);
            let notice = manager.authorized(|token| async move { api.import_jobs(&token, &request).await }).await?;
            print_json(&notice)
        }
    }
}

async fn run_profiles(manager: &CliSession, command: ProfilesSubcommand) -> Result<(), CliError> {
    require_session(manager)?;
    let api = manager.api();
    match command {
        ProfilesSubcommand::List => {
            let profiles = manager.authorized(|token| async move { api.job_profiles(&token).await }).await?;
            print_json(&profiles)
        }
        ProfilesSubcommand::Create { data } => {
            let draft: JobProfileDraft = serde_json::from_str(&read_payload(&data)?)?;
            let profile = manager
                .authorized(|token| async move { api.create_job_profile(&token, &draft).await })
                .await?;
            print_json(&profile)
        }
        ProfilesSubcommand::Show { role } => {
            let profile = manager.authorized(|token| async move { api.job_profile(&token, &role).await }).await?;
            print_json(&profile)
        }
        ProfilesSubcommand::Update { id, data } => {
            let update: JobProfileUpdate = serde_json::from_str(&read_payload(&data)?)?;
            let profile = manager
                .authorized(|token| async move { api.update_job_profile(&token, id, &update).await })
                .await?;
            print_json(&profile)
        }
        ProfilesSubcommand::Delete { id } => {
            let ack = manager.authorized(|token| async move { api.delete_job_profile(&token, id).await }).await?;
            print_json(&ack)
        }
        ProfilesSubcommand::Import(sheet) => {
            let request = SheetsImportRequest::from(sheet);
            let summary = manager
                .authorized(|token| async move { api.import_job_profiles(&token, &request).await })
                .await?;
            print_json(&summary)
        }
    }
}

fn require_session(manager: &CliSession) -> Result<(), CliError> {
    if manager.token().is_some() { Ok(()) } else { Err(CliError::NotSignedIn) }
}

fn print_identity(manager: &CliSession) -> Result<(), CliError> {
    let identity = manager.identity().ok_or(CliError::NotSignedIn)?;
    print_json(&identity)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

fn build_registration(command: RegisterSubcommand) -> Result<Registration, CliError> {
    Ok(match command {
        RegisterSubcommand::Candidate(account) => Registration::Candidate(account_fields(account)?),
        RegisterSubcommand::Hr(hr) => Registration::Hr(HrRegistration {
            account: account_fields(hr.account)?,
            company_name: hr.company_name,
            position: hr.position,
            street_number: hr.street_number,
            street_name: hr.street_name,
            postal_code: hr.postal_code,
            city: hr.city,
            country: hr.country,
        }),
    })
}

fn account_fields(args: AccountArgs) -> Result<AccountFields, CliError> {
    Ok(AccountFields {
        username: args.username,
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        password: password_or_stdin(args.password)?,
    })
}

fn password_or_stdin(password: Option<String>) -> Result<String, CliError> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("password: ");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|source| CliError::Io { path: PathBuf::from("<stdin>"), source })?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

/// Inline JSON, or the contents of the file named after a leading `@`.
fn read_payload(data: &str) -> Result<String, CliError> {
    match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Io { path: PathBuf::from(path), source }),
        None if data.trim().is_empty() => Err(CliError::InvalidArgument("--data is empty".to_owned())),
        None => Ok(data.to_owned()),
    }
}

fn default_session_path(home: Option<PathBuf>) -> Option<PathBuf> {
    home.filter(|h| !h.as_os_str().is_empty())
        .map(|h| h.join(".screening").join("session.json"))
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("doc") => "application/msword",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
