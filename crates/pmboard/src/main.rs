//! pmboard - project management dashboard CLI and web host

mod cli;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cli::Output;
use indicatif::{ProgressBar, ProgressStyle};
use pmboard_core::access::{gate_path, public_gate};
use chrono::NaiveDate;
use pmboard_core::analytics::{DashboardSummary, Window, normalize_status};
use pmboard_core::client::ProgressFn;
use pmboard_core::list::resources::{
    assignment_spec, notification_spec, project_spec, team_update_spec, ticket_spec, user_spec,
};
use pmboard_core::types::{Credentials, ListResponse, NewAssignment, NewComment, NewPhase, NewTeamUpdate, UpdateKind};
use pmboard_core::{
    ApiClient, CoreError, FetchParams, FileSessionStore, ListController, ListSpec, LogNotifier, Notice, Notifier,
    PmboardConfig, SessionStore,
};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pmboard",
    version,
    about = "Project management dashboard",
    long_about = "Command-line client and web host for the pmboard project management dashboard.\n\
                  \n\
                  Examples:\n\
                    pmboard login --email ana@example.com --password ...\n\
                    pmboard tickets --status OPEN --page 2\n\
                    pmboard phases add p1 --name Build --start 2026-04-01 --end 2026-04-30\n\
                    pmboard attach t42 ./screenshot.png\n\
                    pmboard gate /admin/dashboard/users\n\
                    pmboard summary --months 6\n\
                    pmboard web --port 3333\n\
                  \n\
                  Environment Variables:\n\
                    PMBOARD_API_URL                  # REST backend root\n\
                    PMBOARD_CONFIG_DIR               # Config and session directory\n\
                    PMBOARD_FORMAT                   # Force output format: json|table\n\
                    PMBOARD_NO_COLOR                 # Disable ANSI colors\n\
                    RUST_LOG                         # Log filter (default: pmboard=info)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// REST backend root (overrides config.toml)
    #[arg(long, global = true, env = "PMBOARD_API_URL")]
    api_url: Option<String>,

    /// Directory holding config.toml and session.json
    #[arg(long, global = true, env = "PMBOARD_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Force output format (json|table)
    #[arg(long, global = true, env = "PMBOARD_FORMAT", value_parser = ["json", "table"])]
    format: Option<String>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, global = true, env = "PMBOARD_NO_COLOR")]
    no_color: bool,
}

/// Search, filter and paging flags shared by the list commands
#[derive(clap::Args, Debug, Clone)]
struct ListArgs {
    /// Case-insensitive text search
    #[arg(long, short = 's')]
    search: Option<String>,
    /// Exact status filter (e.g. OPEN, IN_PROGRESS)
    #[arg(long)]
    status: Option<String>,
    /// 1-based page
    #[arg(long, default_value = "1")]
    page: u64,
    /// Rows per page (default from config)
    #[arg(long)]
    page_size: Option<u64>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PMBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the stored session
    Whoami,
    /// Run the route gate for the stored session
    Gate {
        /// Screen path, e.g. /admin/dashboard/users
        path: String,
    },
    /// List projects
    Projects(ListArgs),
    /// List tickets
    Tickets {
        #[command(flatten)]
        list: ListArgs,
        /// ISSUE or TASK
        #[arg(long = "type")]
        ticket_type: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        project: Option<String>,
    },
    /// List users
    Users {
        #[command(flatten)]
        list: ListArgs,
        /// admin, project_manager or developer
        #[arg(long)]
        role: Option<String>,
    },
    /// List notifications, or mark them read
    Notifications {
        #[command(subcommand)]
        action: Option<NotificationAction>,
        #[command(flatten)]
        list: ListArgs,
        /// Only unread ones
        #[arg(long)]
        unread: bool,
    },
    /// List daily and project updates, or post one
    Updates {
        #[command(subcommand)]
        action: Option<UpdateAction>,
        #[command(flatten)]
        list: ListArgs,
        /// DAILY or PROJECT
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        project: Option<String>,
    },
    /// Project phases
    Phases {
        #[command(subcommand)]
        action: PhaseAction,
    },
    /// Project membership
    Assignments {
        #[command(subcommand)]
        action: Option<AssignmentAction>,
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        project: Option<String>,
    },
    /// A ticket's comments, or add one
    Comments {
        ticket: String,
        /// Post this comment instead of listing
        #[arg(long)]
        add: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Upload a file to a ticket
    Attach {
        ticket: String,
        file: PathBuf,
        /// MIME type (guessed from the extension when omitted)
        #[arg(long)]
        mime: Option<String>,
    },
    /// Status, priority and trend summary
    Summary {
        /// Months of trend history
        #[arg(long, default_value = "6")]
        months: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Serve the built web app
    Web {
        /// Port for web server
        #[arg(long, default_value = "3333")]
        port: u16,
        /// Directory with the Trunk build
        #[arg(long, default_value = "crates/pmboard-web/dist")]
        dist: PathBuf,
    },
}

#[derive(Subcommand)]
enum PhaseAction {
    /// Phases of a project
    List {
        project: String,
        #[arg(long)]
        json: bool,
    },
    /// Add a phase inside the project's timeline
    Add {
        project: String,
        #[arg(long)]
        name: String,
        /// YYYY-MM-DD
        #[arg(long)]
        start: NaiveDate,
        /// YYYY-MM-DD
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a phase
    Delete { id: String },
}

#[derive(Subcommand)]
enum AssignmentAction {
    /// Add a member to a project
    Add {
        #[arg(long)]
        project: String,
        #[arg(long)]
        user: String,
        /// Role on the project, e.g. Backend
        #[arg(long)]
        role: Option<String>,
    },
    /// Remove an assignment
    Remove { id: String },
}

#[derive(Subcommand)]
enum UpdateAction {
    /// Post a daily or project update
    Post {
        #[arg(long)]
        project: String,
        /// daily or project
        #[arg(long = "type", default_value = "daily")]
        kind: String,
        #[arg(long)]
        blockers: Option<String>,
        content: String,
    },
}

#[derive(Subcommand)]
enum NotificationAction {
    /// Mark one notification read
    Read { id: String },
    /// Mark every notification read
    ReadAll,
}

/// Everything a command needs
struct AppContext {
    config: PmboardConfig,
    session: Arc<dyn SessionStore>,
    client: ApiClient,
    format: Option<String>,
    no_color: bool,
}

impl AppContext {
    fn load(cli: &Cli) -> Result<Self> {
        let dir = match &cli.config_dir {
            Some(dir) => dir.clone(),
            None => PmboardConfig::default_dir().context("Could not determine config directory")?,
        };
        let mut config = PmboardConfig::load(&dir)
            .with_context(|| format!("Failed to load config from {}", dir.display()))?;
        if let Some(url) = &cli.api_url {
            config.api_base_url = url.clone();
        }

        let session: Arc<dyn SessionStore> = Arc::new(FileSessionStore::in_dir(&dir));
        let client = ApiClient::new(&config, Arc::clone(&session)).context("Invalid client configuration")?;

        Ok(Self {
            config,
            session,
            client,
            format: cli.format.clone(),
            no_color: cli.no_color,
        })
    }

    fn output(&self, json: bool) -> Output {
        if json || self.format.as_deref() == Some("json") {
            Output::Json
        } else {
            Output::Table { color: !self.no_color }
        }
    }

    fn page_size(&self, args: &ListArgs) -> u64 {
        args.page_size.unwrap_or(self.config.default_page_size).max(1)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pmboard=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let ctx = &AppContext::load(&cli)?;

    match cli.mode {
        Mode::Login { email, password } => run_login(&ctx, email, password).await,
        Mode::Logout => run_logout(&ctx),
        Mode::Whoami => {
            println!("{}", cli::format_session(&ctx.session.get(), ctx.output(false)));
            Ok(())
        }
        Mode::Gate { path } => {
            let session = ctx.session.get();
            println!("{}", cli::format_gate(&path, gate_path(&session, &path), public_gate(&session)));
            Ok(())
        }
        Mode::Projects(args) => {
            let controller = list_controller(&ctx, project_spec(), &args, &[]);
            let (items, meta) = load_list(&controller, |params| async move { ctx.client.projects(&params).await }).await?;
            println!("{}", cli::format_projects(&items, &meta, ctx.output(args.json)));
            Ok(())
        }
        Mode::Tickets {
            list,
            ticket_type,
            priority,
            project,
        } => {
            let filters = [("type", ticket_type), ("priority", priority), ("projectId", project)];
            let controller = list_controller(&ctx, ticket_spec(), &list, &filters);
            let (items, meta) = load_list(&controller, |params| async move { ctx.client.tickets(&params).await }).await?;
            println!("{}", cli::format_tickets(&items, &meta, ctx.output(list.json)));
            Ok(())
        }
        Mode::Users { list, role } => {
            let controller = list_controller(&ctx, user_spec(), &list, &[("role", role)]);
            let (items, meta) = load_list(&controller, |params| async move { ctx.client.users(&params).await }).await?;
            println!("{}", cli::format_users(&items, &meta, ctx.output(list.json)));
            Ok(())
        }
        Mode::Notifications { action, list, unread } => match action {
            Some(NotificationAction::Read { id }) => {
                ctx.client
                    .mark_notification_read(&id)
                    .await
                    .with_context(|| format!("Failed to mark notification {} read", id))?;
                LogNotifier.notify(Notice::success(format!("Notification {} marked read", id)));
                Ok(())
            }
            Some(NotificationAction::ReadAll) => {
                ctx.client
                    .mark_all_notifications_read()
                    .await
                    .context("Failed to mark notifications read")?;
                LogNotifier.notify(Notice::success("All notifications marked read"));
                Ok(())
            }
            None => {
                let state = unread.then(|| "unread".to_string());
                let controller = list_controller(&ctx, notification_spec(), &list, &[("state", state)]);
                let (items, meta) =
                    load_list(&controller, |params| async move { ctx.client.notifications(&params).await }).await?;
                println!("{}", cli::format_notifications(&items, &meta, ctx.output(list.json)));
                Ok(())
            }
        },
        Mode::Updates {
            action: Some(UpdateAction::Post {
                project,
                kind,
                blockers,
                content,
            }),
            ..
        } => run_post_update(&ctx, project, &kind, blockers, content).await,
        Mode::Updates { list, kind, project, .. } => {
            let filters = [("type", kind.map(|k| k.to_uppercase())), ("projectId", project)];
            let controller = list_controller(&ctx, team_update_spec(), &list, &filters);
            let (items, meta) =
                load_list(&controller, |params| async move { ctx.client.team_updates(&params).await }).await?;
            println!("{}", cli::format_updates(&items, &meta, ctx.output(list.json)));
            Ok(())
        }
        Mode::Phases { action } => run_phases(&ctx, action).await,
        Mode::Assignments {
            action: Some(action),
            ..
        } => run_assignment_action(&ctx, action).await,
        Mode::Assignments { list, project, .. } => {
            let controller = list_controller(&ctx, assignment_spec(), &list, &[("projectId", project)]);
            let (items, meta) =
                load_list(&controller, |params| async move { ctx.client.assignments(&params).await }).await?;
            let names: HashMap<String, String> = match ctx.client.project_options().await {
                Ok(projects) => projects.into_iter().map(|p| (p.id, p.name)).collect(),
                Err(e) => {
                    tracing::debug!(error = %e, "Project names unavailable");
                    HashMap::new()
                }
            };
            println!("{}", cli::format_assignments(&items, &names, &meta, ctx.output(list.json)));
            Ok(())
        }
        Mode::Comments { ticket, add, json } => run_comments(&ctx, &ticket, add, json).await,
        Mode::Attach { ticket, file, mime } => run_attach(&ctx, &ticket, &file, mime).await,
        Mode::Summary { months, json } => run_summary(&ctx, months, json).await,
        Mode::Web { port, dist } => pmboard_web::run(&ctx.config, &dist, port).await,
    }
}

async fn run_login(ctx: &AppContext, email: String, password: String) -> Result<()> {
    let credentials = Credentials { email, password };
    let session = with_spinner("Signing in...", ctx.client.sign_in(&credentials))
        .await
        .map_err(report)?;

    let role = session.role().map(|r| r.label()).unwrap_or("unknown role");
    LogNotifier.notify(Notice::success(format!("Signed in as {}", role)));
    Ok(())
}

fn run_logout(ctx: &AppContext) -> Result<()> {
    ctx.client.sign_out().context("Failed to clear session")?;
    LogNotifier.notify(Notice::info("Signed out"));
    Ok(())
}

async fn run_summary(ctx: &AppContext, months: u32, json: bool) -> Result<()> {
    let data = with_spinner("Loading projects and tickets...", ctx.client.dashboard_data())
        .await
        .map_err(report)?;

    let summary = DashboardSummary::compute(
        &data.projects,
        &data.tickets,
        Window::Months(months.max(1)),
        chrono::Utc::now(),
    );
    println!("{}", cli::format_summary(&summary, ctx.output(json)));
    Ok(())
}

async fn run_phases(ctx: &AppContext, action: PhaseAction) -> Result<()> {
    match action {
        PhaseAction::List { project, json } => {
            let phases = with_spinner("Loading phases...", ctx.client.phases(&project))
                .await
                .map_err(report)?;
            println!("{}", cli::format_phases(&phases.into_parts().0, ctx.output(json)));
        }
        PhaseAction::Add {
            project,
            name,
            start,
            end,
            description,
        } => {
            let project = ctx.client.project(&project).await.map_err(report)?;
            let phase = NewPhase {
                name,
                description,
                start_date: Some(start),
                end_date: Some(end),
            };
            let created = ctx.client.create_phase(&project, &phase).await.map_err(report)?;
            LogNotifier.notify(Notice::success(format!(
                "Phase '{}' added to {}",
                created.name, project.name
            )));
        }
        PhaseAction::Delete { id } => {
            ctx.client.delete_phase(&id).await.map_err(report)?;
            LogNotifier.notify(Notice::success(format!("Phase {} deleted", id)));
        }
    }
    Ok(())
}

async fn run_assignment_action(ctx: &AppContext, action: AssignmentAction) -> Result<()> {
    match action {
        AssignmentAction::Add { project, user, role } => {
            let assignment = NewAssignment {
                project_id: project,
                user_id: user,
                project_role: role,
            };
            let created = ctx.client.create_assignment(&assignment).await.map_err(report)?;
            LogNotifier.notify(Notice::success(format!(
                "{} assigned to {}",
                created.user_name.as_deref().unwrap_or(&created.user_id),
                created.project_id
            )));
        }
        AssignmentAction::Remove { id } => {
            ctx.client.delete_assignment(&id).await.map_err(report)?;
            LogNotifier.notify(Notice::success(format!("Assignment {} removed", id)));
        }
    }
    Ok(())
}

async fn run_comments(ctx: &AppContext, ticket: &str, add: Option<String>, json: bool) -> Result<()> {
    if let Some(content) = add {
        ctx.client
            .add_comment(ticket, &NewComment { content })
            .await
            .map_err(report)?;
        LogNotifier.notify(Notice::success("Comment added"));
        return Ok(());
    }
    let comments = with_spinner("Loading comments...", ctx.client.comments(ticket))
        .await
        .map_err(report)?;
    println!("{}", cli::format_comments(&comments.into_parts().0, ctx.output(json)));
    Ok(())
}

async fn run_post_update(
    ctx: &AppContext,
    project: String,
    kind: &str,
    blockers: Option<String>,
    content: String,
) -> Result<()> {
    let kind = match kind.to_ascii_lowercase().as_str() {
        "daily" => UpdateKind::Daily,
        "project" => UpdateKind::Project,
        other => bail!("Unknown update type '{}' (expected daily or project)", other),
    };
    let update = NewTeamUpdate {
        kind,
        project_id: project,
        content,
        blockers,
    };
    ctx.client.create_team_update(&update).await.map_err(report)?;
    LogNotifier.notify(Notice::success("Update posted"));
    Ok(())
}

/// Upload with a byte progress bar on stderr
async fn run_attach(ctx: &AppContext, ticket: &str, file: &Path, mime: Option<String>) -> Result<()> {
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("File path has no file name")?;
    let mime = mime.unwrap_or_else(|| guess_mime(file).to_string());

    let bar = ProgressBar::new(data.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{bar:30.cyan} {bytes}/{total_bytes} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(file_name.clone());
    let progress: ProgressFn = {
        let bar = bar.clone();
        Arc::new(move |sent, _total| bar.set_position(sent))
    };

    let result = ctx
        .client
        .upload_attachment(ticket, &file_name, &mime, data, Some(progress))
        .await;
    bar.finish_and_clear();
    let attachment = result.map_err(report)?;
    println!("{}", cli::format_attachment(&attachment, ctx.output(false)));
    Ok(())
}

/// MIME type from the file extension
fn guess_mime(file: &Path) -> &'static str {
    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Controller seeded from the shared list flags plus command-specific filters
fn list_controller<T: Clone>(
    ctx: &AppContext,
    spec: ListSpec<T>,
    args: &ListArgs,
    filters: &[(&'static str, Option<String>)],
) -> ListController<T> {
    let controller = ListController::new(spec, ctx.page_size(args));
    if let Some(search) = &args.search {
        controller.set_search(search.clone());
    }
    if let Some(status) = &args.status {
        controller.set_filter("status", normalize_status(status));
    }
    for (name, value) in filters {
        if let Some(value) = value {
            controller.set_filter(*name, value.clone());
        }
    }
    controller.set_page(args.page.max(1));
    controller
}

/// One fetch through the controller, returning the visible page
async fn load_list<T, F, Fut>(
    controller: &ListController<T>,
    fetch: F,
) -> Result<(Vec<T>, pmboard_core::types::PaginationMeta)>
where
    T: Clone,
    F: FnOnce(FetchParams) -> Fut,
    Fut: Future<Output = Result<ListResponse<T>, CoreError>>,
{
    with_spinner("Loading...", controller.load(fetch)).await;
    if let Some(message) = controller.error() {
        bail!(message);
    }
    let view = controller.view();
    Ok((view.items, view.pagination))
}

/// Spinner on stderr while `fut` runs
async fn with_spinner<T>(message: &'static str, fut: impl Future<Output = T>) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));

    let value = fut.await;
    spinner.finish_and_clear();
    value
}

/// Turn a core error into the user-facing message
fn report(error: CoreError) -> anyhow::Error {
    if error.requires_sign_in() {
        anyhow::anyhow!("{} Run `pmboard login`.", error.user_message())
    } else {
        anyhow::anyhow!(error.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(status: Option<&str>) -> ListArgs {
        ListArgs {
            search: None,
            status: status.map(String::from),
            page: 1,
            page_size: Some(10),
            json: false,
        }
    }

    fn context(dir: &Path) -> AppContext {
        let dir = dir.to_string_lossy().into_owned();
        let cli = Cli::parse_from(["pmboard", "--config-dir", dir.as_str(), "whoami"]);
        AppContext::load(&cli).unwrap()
    }

    #[test]
    fn test_status_flag_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let controller = list_controller(&ctx, ticket_spec(), &args(Some("in progress")), &[]);
        assert_eq!(
            controller.query().filters.get("status").map(String::as_str),
            Some("IN_PROGRESS")
        );
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("shot.PNG")), "image/png");
        assert_eq!(guess_mime(Path::new("notes")), "application/octet-stream");
    }

    #[test]
    fn test_phase_add_parses_dates() {
        let cli = Cli::parse_from([
            "pmboard", "phases", "add", "p1", "--name", "Build", "--start", "2026-04-01", "--end", "2026-04-30",
        ]);
        match cli.mode {
            Mode::Phases {
                action: PhaseAction::Add { start, end, .. },
            } => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
                assert_eq!(end, NaiveDate::from_ymd_opt(2026, 4, 30).unwrap());
            }
            _ => panic!("expected phases add"),
        }
    }
}
