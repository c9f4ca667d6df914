//! AWS Access Insight CLI
//!
//! This is the main entry point for the aws-access-insight command-line tool.
//!
//! # Exit Codes
//!
//! The CLI uses the `ExitCode` enum which maps to the following exit codes:
//!
//! - `ExitCode::Success` (0): Operation completed successfully; for access
//!   queries, at least the requested access is allowed
//! - `ExitCode::Denied` (1): Operation completed and the answer is "not
//!   allowed" (check-access) or "nobody is allowed" (search-access)
//! - `ExitCode::Error` (2): Validation failure, configuration problem, or
//!   provider error
//!
//! See `types::ExitCode` for the enum definition.

use std::process;

use anyhow::Result;
use aws_access_insight_query::{
    resolve_principal, AccessDecision, AccessInsightService, AccessQuery, AwsSettings, CostQuery,
    CredentialSource, IdentityAccessQuery, TagFilter,
};
use clap::{Args, Parser, Subcommand};
use log::info;

mod output;
mod types;

use aws_access_insight_mcp_server::{start_mcp_server, McpTransport};
use output::OutputFormat;
use types::ExitCode;

/// Default port for the MCP server with the HTTP transport
static MCP_HTTP_DEFAULT_PORT: u16 = 8001;

/// Connection settings shared by every subcommand
#[derive(Args, Debug, Clone)]
struct ConnectionArgs {
    /// AWS region override
    #[arg(
        long,
        global = true,
        long_help = "AWS region to use for all API calls. When omitted, the SDK's \
default resolution applies (environment, shared config, instance metadata)."
    )]
    region: Option<String>,

    /// Named profile from the shared AWS config files
    #[arg(
        long,
        global = true,
        long_help = "Name of the AWS credentials profile to use. Mutually exclusive \
with --access-key-id/--secret-access-key."
    )]
    profile: Option<String>,

    /// Explicit AWS access key ID
    #[arg(long = "access-key-id", global = true)]
    access_key_id: Option<String>,

    /// Explicit AWS secret access key
    #[arg(long = "secret-access-key", global = true)]
    secret_access_key: Option<String>,

    /// Session token for temporary credentials
    #[arg(long = "session-token", global = true)]
    session_token: Option<String>,

    /// Custom endpoint URL, e.g. for a local AWS-compatible stack
    #[arg(long = "endpoint-url", global = true)]
    endpoint_url: Option<String>,
}

impl ConnectionArgs {
    /// Resolve the flags into settings, failing fast on conflicting or
    /// incomplete credential combinations.
    fn to_settings(&self) -> Result<AwsSettings> {
        let credentials = CredentialSource::resolve(
            self.profile.clone(),
            self.access_key_id.clone(),
            self.secret_access_key.clone(),
            self.session_token.clone(),
        )?;
        Ok(AwsSettings {
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            credentials,
        })
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "aws-access-insight",
    author,
    version,
    about = "Inspect IAM access and AWS spend",
    long_about = "Inspect who can do what in an AWS account and where the money goes. \
Supports four main operations:\n\n\
• search-access: find every user and role that can perform an action on a resource\n\
• check-access: verify one identity's permission for an action\n\
• cost-analysis: daily and per-service cost breakdown over a trailing window\n\
• whoami / account-summary: inspect the calling identity and the account\n\n\
aws-access-insight search-access s3:ListBucket 'arn:aws:s3:::my-bucket'\n  \
aws-access-insight check-access arn:aws:iam::123456789012:user/alice s3:GetObject 'arn:aws:s3:::my-bucket/*'\n  \
aws-access-insight cost-analysis --days 7 --tag-key team --tag-value analytics\n  \
aws-access-insight mcp-server --transport http --port 8001"
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Output format for reports
    #[arg(short = 'o', long = "output", global = true, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Format JSON output with indentation for readability
    #[arg(long = "pretty", global = true)]
    pretty: bool,

    /// Enable debug logging output to stderr
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search which users and roles can perform an action on a resource
    #[command(
        long_about = "Enumerates every IAM user and role in the account and runs the IAM \
policy simulator for each, reporting the principals whose simulated decision is Allowed. \
Principals whose simulation fails or times out are reported with an Unknown decision \
instead of aborting the search."
    )]
    SearchAccess {
        /// Action to evaluate, e.g. 's3:ListBucket'
        action: String,

        /// Resource ARN pattern; defaults to '*' (all resources)
        #[arg(default_value = "*")]
        resource: String,
    },

    /// Check whether one identity can perform an action on a resource
    #[command(
        long_about = "Runs the IAM policy simulator for a single identity. The identity \
must be an IAM user ARN, an IAM role ARN, or an STS assumed-role ARN (which is checked \
against its underlying role). Exits 0 when allowed, 1 when denied."
    )]
    CheckAccess {
        /// Principal ARN to check
        identity: String,

        /// Action to evaluate, e.g. 's3:GetObject'
        action: String,

        /// Resource ARN pattern; defaults to '*' (all resources)
        #[arg(default_value = "*")]
        resource: String,
    },

    /// Break down AWS costs over a trailing window of days
    #[command(
        long_about = "Queries the billing API for the trailing window, grouped by day and \
by service, and prints the breakdown plus the total. Optionally restricts the analysis \
to resources carrying a tag key/value pair."
    )]
    CostAnalysis {
        /// Trailing window length in days
        #[arg(long, default_value_t = 30)]
        days: i64,

        /// Restrict costs to resources carrying this tag key
        #[arg(long = "tag-key", requires = "tag_value")]
        tag_key: Option<String>,

        /// Tag value to match
        #[arg(long = "tag-value", requires = "tag_key")]
        tag_value: Option<String>,
    },

    /// Show the identity behind the current credentials
    Whoami {
        /// Include policies, groups, MFA status, and trust policy
        #[arg(long)]
        detailed: bool,
    },

    /// Show IAM entity counters for the account
    AccountSummary,

    /// Start MCP server
    #[command(
        long_about = "Starts an MCP server that exposes the access and cost operations \
as tools. The server can run in stdio mode for direct integration or HTTP mode for \
network-based communication."
    )]
    McpServer {
        /// Transport mechanism for MCP communication
        #[arg(short = 't', long = "transport", default_value_t = McpTransport::Stdio)]
        transport: McpTransport,

        /// Port number for HTTP transport (ignored for stdio transport)
        #[arg(short = 'p', long = "port", default_value_t = MCP_HTTP_DEFAULT_PORT)]
        port: u16,
    },
}

/// Initialize logging based on configuration
fn init_logging(debug: bool) {
    let log_level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Error
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_target(false)
        .format_timestamp_secs()
        .init();
}

async fn build_service(connection: &ConnectionArgs) -> Result<AccessInsightService> {
    let settings = connection.to_settings()?;
    let service = AccessInsightService::new(&settings).await?;
    Ok(service)
}

async fn run_search_access(
    connection: &ConnectionArgs,
    action: String,
    resource: String,
    format: OutputFormat,
    pretty: bool,
) -> Result<ExitCode> {
    let query = AccessQuery::new(action, resource);
    // Reject malformed input before any client is built
    query.validate()?;

    info!("Searching access for {} on {}", query.action, query.resource);
    let service = build_service(connection).await?;
    let report = service.search_access(&query).await?;

    output::print_access_report(&report, format, pretty)?;
    Ok(if report.allowed().count() > 0 {
        ExitCode::Success
    } else {
        ExitCode::Denied
    })
}

async fn run_check_access(
    connection: &ConnectionArgs,
    identity: String,
    action: String,
    resource: String,
    format: OutputFormat,
    pretty: bool,
) -> Result<ExitCode> {
    let query = IdentityAccessQuery::new(identity, action, resource);
    query.validate()?;
    resolve_principal(&query.identity)?;

    let service = build_service(connection).await?;
    let entry = service.check_access(&query).await?;

    output::print_access_entry(&entry, format, pretty)?;
    Ok(if entry.decision == AccessDecision::Allowed {
        ExitCode::Success
    } else {
        ExitCode::Denied
    })
}

async fn run_cost_analysis(
    connection: &ConnectionArgs,
    days: i64,
    tag_key: Option<String>,
    tag_value: Option<String>,
    format: OutputFormat,
    pretty: bool,
) -> Result<ExitCode> {
    let tag_filter = TagFilter::from_parts(tag_key, tag_value)?;
    let query = CostQuery::new(days, tag_filter);
    query.validate()?;

    let service = build_service(connection).await?;
    let report = service.get_cost_analysis(&query).await?;

    output::print_cost_report(&report, format, pretty)?;
    Ok(ExitCode::Success)
}

async fn run_whoami(
    connection: &ConnectionArgs,
    detailed: bool,
    format: OutputFormat,
    pretty: bool,
) -> Result<ExitCode> {
    let service = build_service(connection).await?;
    if detailed {
        let detail = service.describe_caller().await?;
        output::print_caller_detail(&detail, format, pretty)?;
    } else {
        let profile = service.whoami().await?;
        output::print_caller_profile(&profile, format, pretty)?;
    }
    Ok(ExitCode::Success)
}

async fn run_account_summary(
    connection: &ConnectionArgs,
    format: OutputFormat,
    pretty: bool,
) -> Result<ExitCode> {
    let service = build_service(connection).await?;
    let summary = service.account_summary().await?;
    output::print_account_summary(&summary, format, pretty)?;
    Ok(ExitCode::Success)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::McpServer { transport, port } => {
            // The MCP server installs its own logger (stdout belongs to the
            // protocol in stdio mode), so no init_logging here.
            match start_mcp_server(transport, port).await {
                Ok(()) => ExitCode::Success,
                Err(e) => {
                    print_cli_command_error(&e);
                    ExitCode::Error
                }
            }
        }

        command => {
            init_logging(cli.debug);

            let result = match command {
                Commands::SearchAccess { action, resource } => {
                    run_search_access(&cli.connection, action, resource, cli.output, cli.pretty)
                        .await
                }
                Commands::CheckAccess {
                    identity,
                    action,
                    resource,
                } => {
                    run_check_access(
                        &cli.connection,
                        identity,
                        action,
                        resource,
                        cli.output,
                        cli.pretty,
                    )
                    .await
                }
                Commands::CostAnalysis {
                    days,
                    tag_key,
                    tag_value,
                } => {
                    run_cost_analysis(
                        &cli.connection,
                        days,
                        tag_key,
                        tag_value,
                        cli.output,
                        cli.pretty,
                    )
                    .await
                }
                Commands::Whoami { detailed } => {
                    run_whoami(&cli.connection, detailed, cli.output, cli.pretty).await
                }
                Commands::AccountSummary => {
                    run_account_summary(&cli.connection, cli.output, cli.pretty).await
                }
                Commands::McpServer { .. } => unreachable!("handled above"),
            };

            match result {
                Ok(code) => code,
                Err(e) => {
                    print_cli_command_error(&e);
                    ExitCode::Error
                }
            }
        }
    };

    process::exit(code.into());
}

fn print_cli_command_error(e: &anyhow::Error) {
    eprintln!("Error: {e}");
    let mut source = e.source();
    while let Some(err) = source {
        eprintln!("  Caused by: {err}");
        source = err.source();
    }
}
