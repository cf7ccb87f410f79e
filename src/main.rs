// src/main.rs
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use profile_extractor::extractors::{Company, Person, ScrapeReport, Strategy};
use profile_extractor::session::{ChromeSession, PageSession};
use profile_extractor::storage::StorageManager;
use profile_extractor::utils::{self, AppError};
use profile_extractor::{BrowserSettings, ScrapeConfig};

/// Command Line Interface for profile and company page extraction
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output directory for exported records
    #[arg(short, long, default_value = "./output", global = true)]
    output_dir: PathBuf,

    /// Debug mode - save annotated HTML snapshots of every section
    #[arg(short, long, global = true)]
    debug: bool,

    /// Site root used for pages outside the target entity (connections)
    #[arg(long, default_value = profile_extractor::config::DEFAULT_BASE_URL, global = true)]
    base_url: String,

    #[command(flatten)]
    timing: TimingArgs,

    #[command(flatten)]
    browser: BrowserArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a member profile (requires a signed-in browser profile)
    Person {
        /// Profile URL, e.g. https://www.linkedin.com/in/<id>/
        url: String,

        /// Do not visit the connections page
        #[arg(long)]
        no_contacts: bool,
    },
    /// Extract a company page
    Company {
        /// Company URL, e.g. https://www.linkedin.com/company/<id>/
        url: String,

        /// Do not page through the employee roster
        #[arg(long)]
        no_employees: bool,
    },
}

#[derive(Args, Debug)]
struct TimingArgs {
    /// Seconds to wait for a section's anchor element
    #[arg(long, default_value_t = 5, global = true)]
    wait_timeout: u64,

    /// Seconds to wait for company page anchors
    #[arg(long, default_value_t = 3, global = true)]
    company_wait: u64,

    /// Seconds to wait for the employee roster after each page turn
    #[arg(long, default_value_t = 10, global = true)]
    employee_wait: u64,

    /// Seconds to let the profile top card settle
    #[arg(long, default_value_t = 5, global = true)]
    settle: u64,

    /// Scroll attempts without new roster items before pagination stops
    #[arg(long, default_value_t = 5, global = true)]
    page_retries: u32,

    /// Milliseconds between pagination attempts
    #[arg(long, default_value_t = 1000, global = true)]
    page_delay_ms: u64,

    /// Hard cap on pagination rounds
    #[arg(long, default_value_t = 200, global = true)]
    max_pages: u32,
}

#[derive(Args, Debug)]
struct BrowserArgs {
    /// Browser executable (falls back to the legacy CHROMEDRIVER variable)
    #[arg(long, env = "CHROME_PATH", global = true)]
    chrome_path: Option<PathBuf>,

    /// Browser profile directory holding a signed-in session
    #[arg(long, env = "PROFILE_EXTRACTOR_USER_DATA_DIR", global = true)]
    user_data_dir: Option<PathBuf>,

    /// Attach to a running browser instead of launching one (e.g. ws://localhost:9222)
    #[arg(long, global = true)]
    remote_url: Option<String>,

    /// Show the browser window
    #[arg(long, global = true)]
    headful: bool,

    /// Extra browser command-line arguments
    #[arg(long = "chrome-arg", global = true)]
    chrome_args: Vec<String>,

    /// DevTools request timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    request_timeout: u64,
}

impl BrowserArgs {
    fn settings(&self) -> BrowserSettings {
        let chrome_path = self
            .chrome_path
            .clone()
            .or_else(|| std::env::var_os("CHROMEDRIVER").map(PathBuf::from));
        BrowserSettings {
            chrome_path,
            headless: !self.headful,
            user_data_dir: self.user_data_dir.clone(),
            remote_url: self.remote_url.clone(),
            chrome_args: self.chrome_args.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

/// Rejects anything that is not an absolute http(s) URL.
fn validate_url(raw: &str) -> Result<String, AppError> {
    let parsed = url::Url::parse(raw).map_err(|e| AppError::Config(format!("Invalid URL '{}': {}", raw, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        other => Err(AppError::Config(format!("Unsupported URL scheme '{}' in {}", other, raw))),
    }
}

fn summarize(report: &ScrapeReport) {
    for section in &report.sections {
        tracing::debug!("{} -> {:?}", section.section, section.outcome);
    }
    tracing::info!(
        "Strategy {:?}: {} sections, {} failed",
        report.strategy,
        report.sections.len(),
        report.failures()
    );
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let cli = Cli::parse();
    tracing::info!("Starting processing for args: {:?}", cli);

    // 3. Initialize storage and scrape configuration
    let storage = StorageManager::new(&cli.output_dir)?;
    let mut config = ScrapeConfig {
        wait_timeout: Duration::from_secs(cli.timing.wait_timeout),
        company_wait: Duration::from_secs(cli.timing.company_wait),
        employee_wait: Duration::from_secs(cli.timing.employee_wait),
        settle: Duration::from_secs(cli.timing.settle),
        base_url: validate_url(&cli.base_url)?,
        ..ScrapeConfig::default()
    };
    config.pagination.retries = cli.timing.page_retries;
    config.pagination.delay = Duration::from_millis(cli.timing.page_delay_ms);
    config.pagination.max_pages = cli.timing.max_pages;
    if cli.debug {
        config.debug_dir = Some(storage.debug_dir());
    }

    let target = match &cli.command {
        Command::Person { url, no_contacts } => {
            config.include_contacts = !no_contacts;
            validate_url(url)?
        }
        Command::Company { url, no_employees } => {
            config.include_employees = !no_employees;
            validate_url(url)?
        }
    };

    // 4. Open the browser session
    let mut session = ChromeSession::open(&cli.browser.settings()).await?;

    // 5. Run the requested pass and export it
    let result = match &cli.command {
        Command::Person { .. } => {
            let mut person = Person::new(target, config);
            let report = person.scrape(&mut session).await;
            summarize(&report);
            if report.strategy == Strategy::Refused {
                Err(AppError::AuthRequired(
                    "profile pages need a signed-in browser profile (--user-data-dir or --remote-url)".to_string(),
                ))
            } else {
                storage
                    .save_person(person.profile(), &report)
                    .map(|path| {
                        tracing::info!("Saved profile to: {}", path.display());
                        println!("{}", person.profile());
                    })
                    .map_err(AppError::from)
            }
        }
        Command::Company { .. } => {
            let mut company = Company::new(target, config);
            let report = company.scrape(&mut session).await;
            summarize(&report);
            storage
                .save_company(company.profile(), &report)
                .map(|path| {
                    tracing::info!("Saved company to: {}", path.display());
                    println!("{}", company.profile());
                })
                .map_err(AppError::from)
        }
    };

    // 6. Release the browser whatever happened
    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close browser session: {}", e);
    }
    result
}
