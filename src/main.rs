//! Troika CLI
//!
//! Command-line front end for the Troika dashboard:
//! - Log in and out, inspect the stored session
//! - Manage companies, chatbots and administrators
//! - Browse the signed-in user's message history
//! - Upload chatbot context and download reports

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use troika::api::dto::NewCompany;
use troika::config::{generate_default_config, Config, LoggingConfig};
use troika::export;
use troika::feed::{FeedConfig, FeedSnapshot, MessageFeed};
use troika::forms::{self, ClientConfigForm, NewAdminForm, NewCompanyForm};
use troika::{
    navigate, ApiClient, ClientResult, ContextUploader, FileStorage, FilterKind,
    FilterState, Message, MessageQuery, Notification, PlanHealth, Role, Route, SessionStore,
    SharedSession, Subscription,
};

#[derive(Parser)]
#[command(name = "troika")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line dashboard for the Troika chatbot platform")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Config file (default: ~/.config/troika/config.toml or ./troika.toml)
    #[arg(long, env = "TROIKA_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in as an administrator
    Login {
        #[arg(short, long)]
        email: String,
        /// Prompted for when omitted
        #[arg(short, long, env = "TROIKA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Install a token issued elsewhere (end-user sessions)
    UseToken {
        token: String,
        #[arg(long, default_value = "user")]
        role: Role,
    },

    /// Clear every stored session key
    Logout,

    /// Show the active session
    Whoami,

    /// Platform overview counters
    Stats,

    /// Manage administrators
    #[command(subcommand)]
    Admins(AdminCommands),

    /// Manage companies
    #[command(subcommand)]
    Companies(CompanyCommands),

    /// Manage chatbots
    #[command(subcommand)]
    Chatbots(ChatbotCommands),

    /// List renewal plans
    Plans,

    /// Upload a context file (.txt, .pdf, .docx) for a chatbot
    Upload {
        chatbot_id: String,
        file: PathBuf,
    },

    /// End-user views
    #[command(subcommand)]
    User(UserCommands),

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// List administrators
    List,
    /// Create an administrator
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Prompted for (twice) when omitted
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CompanyCommands {
    /// List companies and their chatbots
    List {
        /// Case-insensitive name filter
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Register a company with its login credentials
    Create {
        #[arg(long)]
        name: String,
        /// Company domain
        #[arg(long)]
        url: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete a company and all of its chatbots
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Create a chatbot for a company
    AddChatbot {
        company_id: String,
        /// Defaults to "<company> Bot"
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ChatbotCommands {
    /// List chatbots with token usage
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Delete a chatbot
    Delete {
        id: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// Set the monthly token limit
    SetLimit { id: String, limit: String },
    /// Show the subscription
    Subscription { id: String },
    /// Renew the subscription with a plan
    Renew {
        id: String,
        /// Plan id (see `troika plans`)
        #[arg(long)]
        plan: Option<String>,
    },
    /// Show the widget configuration
    Config { id: String },
    /// Update the widget configuration; omitted fields are kept
    SetConfig {
        id: String,
        #[arg(long)]
        demo_message: Option<String>,
        #[arg(long)]
        demo_link: Option<String>,
        /// Comma-separated
        #[arg(long)]
        suggestions: Option<String>,
        /// Comma-separated
        #[arg(long)]
        keywords: Option<String>,
    },
    /// Show message history
    Messages {
        id: String,
        /// Export question/answer pairs as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Download the PDF report
    Report {
        id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Company, usage and plan health
    Dashboard,
    /// List chat sessions
    Sessions,
    /// List unique visitor emails
    Emails,
    /// Show one page of message history
    Messages {
        #[arg(long, default_value = "1")]
        page: u32,
        /// Filter by visitor email
        #[arg(long, conflicts_with = "session")]
        email: Option<String>,
        /// Filter by session id
        #[arg(long)]
        session: Option<String>,
    },
    /// Show a whole conversation
    Conversation {
        /// Session id (or email with --email)
        id: String,
        #[arg(long)]
        email: bool,
    },
    /// Download a visitor's conversation as PDF
    ChatPdf {
        email: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Download the usage report
    Report {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Interactive message history browser
    Browse,
}

/// Everything a command needs
struct Ctx {
    client: Arc<ApiClient>,
    session: SharedSession,
    format: OutputFormat,
    feed: FeedConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_logging(&config.logging)?;

    if let Err(e) = run(cli, config).await {
        eprintln!("{}", Notification::error(format!("{:#}", e)));
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::fmt::writer::BoxMakeWriter;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("troika={}", config.level)));

    let writer = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let layer = tracing_subscriber::fmt::layer().with_writer(writer);
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer).init();
    }
    Ok(())
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    if let Commands::Config { output } = &cli.command {
        return write_default_config(output.as_deref());
    }

    let storage = FileStorage::open(config.session.path())?;
    let session: SharedSession = Arc::new(SessionStore::boxed(storage));
    let client = Arc::new(ApiClient::new(config.api.base_url.clone(), session.clone())?);

    tracing::debug!(base_url = %client.base_url(), "Client ready");

    let ctx = Ctx {
        client,
        session,
        format: cli.format,
        feed: config.messages.feed_config(),
    };

    match cli.command {
        Commands::Login { email, password } => login(&ctx, &email, password).await,
        Commands::UseToken { token, role } => {
            if token.trim().is_empty() {
                anyhow::bail!("Token must not be empty.");
            }
            ctx.session.set_session(token.trim(), role)?;
            announce(Notification::success(format!("Signed in as {}.", role)));
            Ok(())
        }
        Commands::Logout => {
            ctx.session.clear_session()?;
            announce(Notification::success("Logged out."));
            Ok(())
        }
        Commands::Whoami => whoami(&ctx),
        Commands::Stats => stats(&ctx).await,
        Commands::Admins(cmd) => admins(&ctx, cmd).await,
        Commands::Companies(cmd) => companies(&ctx, cmd).await,
        Commands::Chatbots(cmd) => chatbots(&ctx, cmd).await,
        Commands::Plans => plans(&ctx).await,
        Commands::Upload { chatbot_id, file } => upload(&ctx, &chatbot_id, &file).await,
        Commands::User(cmd) => user(&ctx, cmd).await,
        Commands::Config { .. } => Ok(()),
    }
}

// ============================================
// HELPERS
// ============================================

/// Turns a client failure into the text of an error notification
trait OrNotify<T> {
    fn or_notify(self, ctx: &Ctx, fallback: &str) -> anyhow::Result<T>;
}

impl<T> OrNotify<T> for ClientResult<T> {
    fn or_notify(self, ctx: &Ctx, fallback: &str) -> anyhow::Result<T> {
        self.map_err(|err| {
            tracing::debug!(error = %err, "Command failed");
            if err.requires_login() {
                if let Err(e) = ctx.session.clear_session() {
                    tracing::warn!(error = %e, "Failed to clear expired session");
                }
            }
            anyhow::anyhow!(Notification::from_error(&err, fallback).message)
        })
    }
}

/// Run the navigation guard for the view `route` stands for
fn enter(ctx: &Ctx, route: Route) -> anyhow::Result<()> {
    let session = ctx.session.session();
    let nav = navigate(route.path(), session.as_ref());
    if nav.route() == route {
        return Ok(());
    }

    match route.required_role() {
        Some(Role::Admin) => anyhow::bail!("Admin session required. Run `troika login --email <email>` first."),
        Some(Role::User) => anyhow::bail!("User session required. Run `troika use-token <token>` first."),
        None => Ok(()),
    }
}

fn announce(notification: Notification) {
    if notification.is_error() {
        eprintln!("{}", notification);
    } else {
        println!("{}", notification);
    }
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}: ", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt(&format!("{} [y/N]", question))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn save(bytes: &[u8], output: Option<&Path>, default_name: String) -> anyhow::Result<()> {
    let path = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(default_name));
    std::fs::write(&path, bytes).with_context(|| format!("Failed to write {:?}", path))?;
    announce(Notification::success(format!("Saved {:?} ({} bytes)", path, bytes.len())));
    Ok(())
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let cut: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn write_default_config(output: Option<&Path>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }
    Ok(())
}

// ============================================
// SESSION
// ============================================

async fn login(ctx: &Ctx, email: &str, password: Option<String>) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt("Password")?,
    };
    if email.trim().is_empty() || password.is_empty() {
        anyhow::bail!("Email and password are required.");
    }

    ctx.client
        .login(email, &password)
        .await
        .or_notify(ctx, "Login failed. Please try again.")?;

    let landing = navigate(Route::Overview.path(), ctx.session.session().as_ref());
    announce(Notification::success(format!(
        "Logged in. Landing view: {}",
        landing.route().title()
    )));
    Ok(())
}

fn whoami(ctx: &Ctx) -> anyhow::Result<()> {
    #[derive(Serialize)]
    struct WhoAmI<'a> {
        role: Option<Role>,
        home: Option<&'a str>,
        api_url: &'a str,
    }

    let session = ctx.session.session();
    let info = WhoAmI {
        role: session.as_ref().map(|s| s.role),
        home: session.as_ref().map(|s| Route::home(s.role).path()),
        api_url: ctx.client.base_url(),
    };

    match ctx.format {
        OutputFormat::Json => print_json(&info),
        OutputFormat::Table => {
            match session {
                Some(s) => {
                    println!("Role:    {}", s.role);
                    println!("Home:    {}", Route::home(s.role).path());
                    let menu: Vec<&str> = Route::menu(s.role).iter().map(|r| r.title()).collect();
                    println!("Views:   {}", menu.join(", "));
                }
                None => println!("Not logged in."),
            }
            println!("API:     {}", info.api_url);
            Ok(())
        }
    }
}

// ============================================
// ADMIN VIEWS
// ============================================

async fn stats(ctx: &Ctx) -> anyhow::Result<()> {
    enter(ctx, Route::Overview)?;
    let stats = ctx
        .client
        .admin_stats()
        .await
        .or_notify(ctx, "Failed to load stats")?;

    match ctx.format {
        OutputFormat::Json => print_json(&stats),
        OutputFormat::Table => {
            println!("Total Chatbots:       {}", stats.total_chatbots);
            println!("Total Companies:      {}", stats.total_companies);
            println!("Unique Users:         {}", stats.unique_users);
            println!("Total Messages:       {}", stats.total_messages);
            println!("Monthly Token Usage:  {}", stats.monthly_token_usage);
            Ok(())
        }
    }
}

async fn admins(ctx: &Ctx, cmd: AdminCommands) -> anyhow::Result<()> {
    enter(ctx, Route::AddAdmin)?;

    match cmd {
        AdminCommands::List => {
            let admins = ctx
                .client
                .admins()
                .await
                .or_notify(ctx, "Failed to fetch admins.")?;

            if ctx.format == OutputFormat::Json {
                return print_json(&admins);
            }
            if admins.is_empty() {
                println!("No admins found.");
                return Ok(());
            }
            println!("{:<24} {:<32} {}", "Name", "Email", "Created");
            println!("{}", "-".repeat(72));
            for admin in admins {
                let created = admin
                    .created_at
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<24} {:<32} {}", truncate(&admin.name, 24), truncate(&admin.email, 32), created);
            }
            Ok(())
        }
        AdminCommands::Create { name, email, password } => {
            let (password, confirm_password) = match password {
                Some(p) => (p.clone(), p),
                None => (prompt("Password")?, prompt("Confirm password")?),
            };
            let admin = NewAdminForm {
                name,
                email,
                password,
                confirm_password,
            }
            .validate()?;

            ctx.client
                .create_admin(&admin)
                .await
                .or_notify(ctx, "Failed to create admin.")?;
            announce(Notification::success("Admin created successfully."));
            Ok(())
        }
    }
}

async fn companies(ctx: &Ctx, cmd: CompanyCommands) -> anyhow::Result<()> {
    enter(ctx, Route::Companies)?;

    match cmd {
        CompanyCommands::List { search } => {
            let mut companies = ctx
                .client
                .companies()
                .await
                .or_notify(ctx, "Failed to fetch companies")?;
            if let Some(search) = search {
                companies.retain(|c| c.matches(&search));
            }

            if ctx.format == OutputFormat::Json {
                return print_json(&companies);
            }
            if companies.is_empty() {
                println!("No companies found.");
                return Ok(());
            }
            println!("{:<24} {:<24} {:<28} {:<20} {}", "Name", "Domain", "Email", "Chatbot", "ID");
            println!("{}", "-".repeat(120));
            for company in companies {
                let chatbot = company
                    .primary_chatbot()
                    .map(|b| b.name.clone())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<24} {:<24} {:<28} {:<20} {}",
                    truncate(&company.name, 24),
                    truncate(&company.url, 24),
                    truncate(&company.email, 28),
                    truncate(&chatbot, 20),
                    company.id
                );
            }
            Ok(())
        }
        CompanyCommands::Create { name, url, email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt("Password")?,
            };
            let company: NewCompany = NewCompanyForm {
                name,
                url,
                email,
                password,
            }
            .validate()?;

            ctx.client
                .create_company(&company)
                .await
                .or_notify(ctx, "Failed to add company.")?;
            announce(Notification::success("Company added successfully."));
            Ok(())
        }
        CompanyCommands::Delete { id, yes } => {
            if !yes && !confirm("Delete this company and all its chatbots?")? {
                println!("Cancelled.");
                return Ok(());
            }
            ctx.client
                .delete_company(&id)
                .await
                .or_notify(ctx, "Failed to delete company.")?;
            announce(Notification::success("Company deleted."));
            Ok(())
        }
        CompanyCommands::AddChatbot { company_id, name } => {
            let companies = ctx
                .client
                .companies()
                .await
                .or_notify(ctx, "Failed to fetch companies")?;
            let company = companies
                .iter()
                .find(|c| c.id == company_id)
                .ok_or_else(|| anyhow::anyhow!("Company not found: {}", company_id))?;
            let chatbot = forms::new_chatbot(company, name.as_deref())?;

            ctx.client
                .create_chatbot(&chatbot)
                .await
                .or_notify(ctx, "Failed to create chatbot.")?;
            announce(Notification::success(format!("Chatbot \"{}\" created.", chatbot.name)));
            Ok(())
        }
    }
}

async fn chatbots(ctx: &Ctx, cmd: ChatbotCommands) -> anyhow::Result<()> {
    enter(ctx, Route::Chatbots)?;

    match cmd {
        ChatbotCommands::List { search } => {
            let mut chatbots = ctx
                .client
                .chatbots()
                .await
                .or_notify(ctx, "Failed to fetch chatbots")?;
            if let Some(search) = search {
                chatbots.retain(|b| b.matches(&search));
            }

            if ctx.format == OutputFormat::Json {
                return print_json(&chatbots);
            }
            if chatbots.is_empty() {
                println!("No chatbots found.");
                return Ok(());
            }
            println!(
                "{:<22} {:<20} {:>10} {:>10} {:>10} {:>9} {}",
                "Name", "Company", "Limit", "Used", "Remaining", "Messages", "ID"
            );
            println!("{}", "-".repeat(120));
            for bot in chatbots {
                println!(
                    "{:<22} {:<20} {:>10} {:>10} {:>10} {:>9} {}",
                    truncate(&bot.name, 22),
                    truncate(bot.company_name.as_deref().unwrap_or("-"), 20),
                    bot.token_limit_label(),
                    bot.used_tokens.unwrap_or(0),
                    bot.remaining_tokens(),
                    bot.total_messages.unwrap_or(0),
                    bot.id
                );
            }
            Ok(())
        }
        ChatbotCommands::Delete { id, yes } => {
            if !yes && !confirm("Delete this chatbot?")? {
                println!("Cancelled.");
                return Ok(());
            }
            ctx.client
                .delete_chatbot(&id)
                .await
                .or_notify(ctx, "Failed to delete chatbot.")?;
            announce(Notification::success("Chatbot deleted."));
            Ok(())
        }
        ChatbotCommands::SetLimit { id, limit } => {
            let limit = forms::parse_token_limit(&limit)?;
            ctx.client
                .update_token_limit(&id, limit)
                .await
                .or_notify(ctx, "Failed to update token limit")?;
            announce(Notification::success(format!("Token limit set to {}.", limit)));
            Ok(())
        }
        ChatbotCommands::Subscription { id } => {
            let subscription = ctx
                .client
                .subscription(&id)
                .await
                .or_notify(ctx, "Failed to fetch subscription")?;
            show_subscription(ctx, subscription.as_ref())
        }
        ChatbotCommands::Renew { id, plan } => {
            let plans = ctx
                .client
                .plans()
                .await
                .or_notify(ctx, "Failed to fetch plans")?;
            let request = forms::renewal_request(&plans, plan.as_deref())?;

            ctx.client
                .renew(&id, &request)
                .await
                .or_notify(ctx, "Renewal failed")?;
            announce(Notification::success(format!(
                "Plan renewed successfully ({} month{}).",
                request.months,
                if request.months == 1 { "" } else { "s" }
            )));
            Ok(())
        }
        ChatbotCommands::Config { id } => {
            let config = ctx
                .client
                .client_config(&id)
                .await
                .or_notify(ctx, "Failed to fetch config")?;

            match ctx.format {
                OutputFormat::Json => print_json(&config),
                OutputFormat::Table => {
                    let form = ClientConfigForm::from(&config);
                    println!("Demo message:  {}", form.demo_message);
                    println!("Demo link:     {}", form.demo_link);
                    println!("Suggestions:   {}", form.default_suggestions);
                    println!("Keywords:      {}", form.demo_keywords);
                    Ok(())
                }
            }
        }
        ChatbotCommands::SetConfig {
            id,
            demo_message,
            demo_link,
            suggestions,
            keywords,
        } => {
            let current = ctx
                .client
                .client_config(&id)
                .await
                .or_notify(ctx, "Failed to fetch config")?;
            let mut form = ClientConfigForm::from(&current);
            if let Some(v) = demo_message {
                form.demo_message = v;
            }
            if let Some(v) = demo_link {
                form.demo_link = v;
            }
            if let Some(v) = suggestions {
                form.default_suggestions = v;
            }
            if let Some(v) = keywords {
                form.demo_keywords = v;
            }

            ctx.client
                .update_client_config(&id, &form.to_config())
                .await
                .or_notify(ctx, "Failed to update config")?;
            announce(Notification::success("Config updated successfully"));
            Ok(())
        }
        ChatbotCommands::Messages { id, csv } => {
            let messages = ctx
                .client
                .chatbot_messages(&id)
                .await
                .or_notify(ctx, "Failed to fetch messages")?;

            if let Some(path) = csv {
                let content = export::messages_to_csv(&messages)?;
                return save(content.as_bytes(), Some(&path), export::MESSAGES_CSV_FILENAME.to_string());
            }
            show_messages(ctx, &messages)
        }
        ChatbotCommands::Report { id, output } => {
            let bytes = ctx
                .client
                .chatbot_report(&id)
                .await
                .or_notify(ctx, "Failed to download report")?;
            save(&bytes, output.as_deref(), export::chatbot_report_filename(&id))
        }
    }
}

async fn plans(ctx: &Ctx) -> anyhow::Result<()> {
    enter(ctx, Route::Chatbots)?;
    let plans = ctx
        .client
        .plans()
        .await
        .or_notify(ctx, "Failed to fetch plans")?;

    if ctx.format == OutputFormat::Json {
        return print_json(&plans);
    }
    if plans.is_empty() {
        println!("No plans available.");
        return Ok(());
    }
    println!("{:<26} {}", "ID", "Plan");
    println!("{}", "-".repeat(72));
    for plan in plans {
        println!("{:<26} {}", plan.id, plan.label());
    }
    Ok(())
}

async fn upload(ctx: &Ctx, chatbot_id: &str, file: &Path) -> anyhow::Result<()> {
    enter(ctx, Route::Chatbots)?;

    let uploader = ContextUploader::new(ctx.client.clone());
    let result = uploader
        .upload(file, chatbot_id)
        .await
        .map(|report| report.chunks_stored);
    let notification = Notification::upload_outcome(&result);

    if let Err(err) = &result {
        tracing::debug!(error = %err, "Upload failed");
        if err.requires_login() {
            ctx.session.clear_session()?;
        }
        anyhow::bail!(notification.message);
    }
    announce(notification);
    Ok(())
}

fn show_subscription(ctx: &Ctx, subscription: Option<&Subscription>) -> anyhow::Result<()> {
    if ctx.format == OutputFormat::Json {
        return print_json(&subscription);
    }
    let Some(sub) = subscription else {
        println!("No active plan.");
        return Ok(());
    };

    let now = Utc::now();
    println!("Plan:        {}", sub.plan_name().unwrap_or("-"));
    if let Some(price) = sub.price() {
        println!("Price:       ₹{}", price);
    }
    if let Some(users) = sub.max_users() {
        println!("Max users:   {}", users);
    }
    if let Some(start) = sub.start_date {
        println!("Started:     {}", start.format("%Y-%m-%d"));
    }
    if let Some(end) = sub.end_date {
        println!("Expires:     {}", end.format("%Y-%m-%d"));
    }
    if let Some(days) = sub.days_remaining_at(now) {
        println!("Days left:   {}", days);
    }
    if let (Some(ratio), Some(health)) = (sub.remaining_ratio_at(now), sub.health_at(now)) {
        println!("Health:      {}", health_bar(ratio, health));
    }
    Ok(())
}

fn health_bar(ratio: f64, health: PlanHealth) -> String {
    let filled = (ratio * 20.0).round() as usize;
    let label = match health {
        PlanHealth::Healthy => "healthy",
        PlanHealth::Warning => "expiring soon",
        PlanHealth::Critical => "critical",
    };
    format!(
        "[{}{}] {:.0}% {}",
        "#".repeat(filled),
        "-".repeat(20 - filled.min(20)),
        ratio * 100.0,
        label
    )
}

fn show_messages(ctx: &Ctx, messages: &[Message]) -> anyhow::Result<()> {
    if ctx.format == OutputFormat::Json {
        return print_json(messages);
    }
    if messages.is_empty() {
        println!("No messages found.");
        return Ok(());
    }
    for msg in messages {
        println!(
            "{}  {:<4} {}",
            msg.timestamp.format("%Y-%m-%d %H:%M"),
            msg.sender.as_str(),
            msg.content
        );
    }
    Ok(())
}

// ============================================
// USER VIEWS
// ============================================

async fn user(ctx: &Ctx, cmd: UserCommands) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Dashboard => {
            enter(ctx, Route::UserDashboard)?;
            let (company, usage) = tokio::try_join!(ctx.client.user_company(), ctx.client.user_usage())
                .or_notify(ctx, "Failed to load dashboard data")?;

            let subscription = match company.chatbot_id.as_deref() {
                Some(id) => ctx
                    .client
                    .subscription(id)
                    .await
                    .or_notify(ctx, "Failed to fetch subscription")?,
                None => {
                    announce(Notification::error("No chatbot ID found for this user."));
                    None
                }
            };

            if ctx.format == OutputFormat::Json {
                return print_json(&serde_json::json!({
                    "company": company,
                    "usage": usage,
                    "subscription": subscription,
                }));
            }
            println!("Company:         {}", company.name);
            println!("Email:           {}", company.email);
            println!("Domain:          {}", company.url);
            println!("Total messages:  {}", usage.total_messages);
            println!("Unique users:    {}", usage.unique_users);
            println!();
            show_subscription(ctx, subscription.as_ref())
        }
        UserCommands::Sessions => {
            enter(ctx, Route::UserMessageHistory)?;
            let sessions = ctx
                .client
                .user_sessions()
                .await
                .or_notify(ctx, "Failed to fetch sessions")?;
            print_list(ctx, &sessions, "No sessions found.")
        }
        UserCommands::Emails => {
            enter(ctx, Route::UserMessageHistory)?;
            let emails = ctx
                .client
                .unique_emails()
                .await
                .or_notify(ctx, "Failed to fetch emails")?;
            print_list(ctx, &emails, "No emails found.")
        }
        UserCommands::Messages { page, email, session } => {
            enter(ctx, Route::UserMessageHistory)?;
            let mut state = FilterState::new();
            match (email, session) {
                (Some(email), _) => state.set_filter(email),
                (None, Some(session)) => {
                    state.set_kind(FilterKind::Session);
                    state.set_filter(session);
                }
                (None, None) => {}
            }
            state.set_page(page);

            let query = state.query(ctx.feed.page_size);
            let result = ctx
                .client
                .user_messages(&query)
                .await
                .or_notify(ctx, troika::feed::FETCH_FAILED)?;
            let info = troika::PageInfo::new(page, result.total_pages.unwrap_or(1));

            show_messages(ctx, &result.messages)?;
            if ctx.format == OutputFormat::Table {
                println!();
                println!("{}", info.label());
            }
            Ok(())
        }
        UserCommands::Conversation { id, email } => {
            enter(ctx, Route::UserMessageHistory)?;
            let query = if email {
                MessageQuery::conversation_for_email(id)
            } else {
                MessageQuery::conversation_for_session(id)
            };
            let page = ctx
                .client
                .user_messages(&query)
                .await
                .or_notify(ctx, "Failed to load chat history")?;
            show_messages(ctx, &page.messages)
        }
        UserCommands::ChatPdf { email, output } => {
            enter(ctx, Route::UserMessageHistory)?;
            let bytes = ctx
                .client
                .email_pdf(&email)
                .await
                .or_notify(ctx, "Failed to download chat PDF")?;
            save(&bytes, output.as_deref(), export::chat_pdf_filename(&email))
        }
        UserCommands::Report { output } => {
            enter(ctx, Route::UserDashboard)?;
            let bytes = ctx
                .client
                .user_report()
                .await
                .or_notify(ctx, "Failed to download report")?;
            save(
                &bytes,
                output.as_deref(),
                export::user_report_filename(Utc::now().timestamp_millis()),
            )
        }
        UserCommands::Browse => {
            enter(ctx, Route::UserMessageHistory)?;
            browse(ctx).await
        }
    }
}

fn print_list(ctx: &Ctx, items: &[String], empty: &str) -> anyhow::Result<()> {
    if ctx.format == OutputFormat::Json {
        return print_json(items);
    }
    if items.is_empty() {
        println!("{}", empty);
    }
    for item in items {
        println!("{}", item);
    }
    Ok(())
}

/// One line of input in the interactive browser
#[derive(Debug, PartialEq, Eq)]
enum BrowseInput {
    Next,
    Prev,
    Page(u32),
    Filter(FilterKind, String),
    Kind(FilterKind),
    All,
    Help,
    Quit,
    Unknown(String),
}

fn parse_browse(line: &str) -> BrowseInput {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match word.to_lowercase().as_str() {
        "n" | "next" => BrowseInput::Next,
        "p" | "prev" => BrowseInput::Prev,
        "page" => match rest.parse() {
            Ok(page) => BrowseInput::Page(page),
            Err(_) => BrowseInput::Unknown(line.to_string()),
        },
        "email" if !rest.is_empty() => BrowseInput::Filter(FilterKind::Email, rest.to_string()),
        "session" if !rest.is_empty() => BrowseInput::Filter(FilterKind::Session, rest.to_string()),
        "kind" => match rest.parse() {
            Ok(kind) => BrowseInput::Kind(kind),
            Err(_) => BrowseInput::Unknown(line.to_string()),
        },
        "all" => BrowseInput::All,
        "h" | "help" | "?" => BrowseInput::Help,
        "q" | "quit" | "exit" => BrowseInput::Quit,
        _ => BrowseInput::Unknown(line.to_string()),
    }
}

fn print_browse_help() {
    println!("Commands: n(ext), p(rev), page <n>, email <addr>, session <id>,");
    println!("          kind email|session, all, help, q(uit)");
}

fn render_snapshot(ctx: &Ctx, snapshot: &FeedSnapshot, filter: &FilterState) -> anyhow::Result<()> {
    if let Some(error) = &snapshot.error {
        announce(Notification::error(error.clone()));
        return Ok(());
    }
    println!();
    show_messages(ctx, &snapshot.messages)?;
    let filter_label = if filter.filter().trim().is_empty() {
        "All".to_string()
    } else {
        format!("{} = {}", filter.kind().as_str(), filter.filter())
    };
    println!(
        "{}  [filter: {}]{}{}",
        snapshot.page.label(),
        filter_label,
        if snapshot.page.prev_disabled() { "" } else { "  p: previous" },
        if snapshot.page.next_disabled() { "" } else { "  n: next" }
    );
    Ok(())
}

async fn browse(ctx: &Ctx) -> anyhow::Result<()> {
    let feed = MessageFeed::spawn(ctx.client.clone(), ctx.feed.clone());
    let mut updates = feed.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_browse_help();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if !snapshot.loading {
                    render_snapshot(ctx, &snapshot, &feed.filter())?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_browse(&line) {
                    BrowseInput::Next => {
                        if !feed.next_page() {
                            println!("Already on the last page.");
                        }
                    }
                    BrowseInput::Prev => {
                        if !feed.prev_page() {
                            println!("Already on the first page.");
                        }
                    }
                    BrowseInput::Page(page) => feed.set_page(page),
                    BrowseInput::Filter(kind, value) => {
                        feed.set_kind(kind);
                        feed.set_filter(value);
                    }
                    BrowseInput::Kind(kind) => feed.set_kind(kind),
                    BrowseInput::All => feed.clear_filter(),
                    BrowseInput::Help => print_browse_help(),
                    BrowseInput::Quit => break,
                    BrowseInput::Unknown(input) if input.is_empty() => {}
                    BrowseInput::Unknown(input) => println!("Unknown command: {}", input),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_browse() {
        assert_eq!(parse_browse("n"), BrowseInput::Next);
        assert_eq!(parse_browse(" page 3 "), BrowseInput::Page(3));
        assert_eq!(
            parse_browse("email a@b.com"),
            BrowseInput::Filter(FilterKind::Email, "a@b.com".into())
        );
        assert_eq!(parse_browse("kind session"), BrowseInput::Kind(FilterKind::Session));
        assert_eq!(parse_browse("page x"), BrowseInput::Unknown("page x".into()));
        assert_eq!(parse_browse("email"), BrowseInput::Unknown("email".into()));
        assert_eq!(parse_browse("q"), BrowseInput::Quit);
    }

    #[test]
    fn test_health_bar() {
        assert_eq!(
            health_bar(0.5, PlanHealth::Healthy),
            "[##########----------] 50% healthy"
        );
        assert!(health_bar(0.0, PlanHealth::Critical).starts_with("[--------------------]"));
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["troika", "--format", "json", "chatbots", "set-limit", "cb1", "5000"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Commands::Chatbots(ChatbotCommands::SetLimit { ref id, ref limit }) if id == "cb1" && limit == "5000"
        ));

        let cli = Cli::try_parse_from(["troika", "use-token", "t0k", "--role", "admin"]).unwrap();
        assert!(matches!(cli.command, Commands::UseToken { role: Role::Admin, .. }));
    }
}
