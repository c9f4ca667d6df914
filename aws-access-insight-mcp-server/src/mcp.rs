use anyhow;
use log::{error, info, trace};
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{ErrorCode, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::{
        self, streamable_http_server::session::local::LocalSessionManager, StreamableHttpService,
    },
    ErrorData as McpError, Json, RoleServer, ServerHandler, ServiceExt,
};

use crate::tools::{
    account_summary, analyze_costs, check_access, describe_caller_identity, search_access,
    AccountSummaryInput, AccountSummaryOutput, AnalyzeCostsInput, AnalyzeCostsOutput,
    CheckAccessInput, CheckAccessOutput, DescribeCallerInput, DescribeCallerOutput,
    SearchAccessInput, SearchAccessOutput,
};

// Define the server struct
#[derive(Clone)]
struct AccessInsightMcpServer {
    tool_router: ToolRouter<Self>,
    log_file: Option<String>,
}

#[tool_router]
impl AccessInsightMcpServer {
    pub fn new(log_file: Option<String>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            log_file,
        }
    }

    fn format_mcp_error(&self, msg: &str, e: anyhow::Error) -> McpError {
        let log_file_suffix = match &self.log_file {
            Some(file) => format!(" Full error details logged to {file}."),
            None => String::new(),
        };

        McpError {
            code: ErrorCode::INTERNAL_ERROR,
            message: format!("{msg}: {e:#}.{log_file_suffix}").into(),
            data: None,
        }
    }

    #[tool(
        description = "Search which IAM users and roles in the AWS account can perform an action \
        on a resource. The IAM policy simulator is evaluated for every principal in the account, \
        so this answers questions like 'who can read this bucket?' or 'which roles can delete \
        this table?'. \
        \
        INSTRUCTIONS: \
        1. Pass the action as 'service:Operation', e.g. 's3:ListBucket' \
        2. Pass the resource as an ARN pattern, or omit it to mean all resources \
        3. Entries marked Unknown could not be evaluated (simulation failed or timed out); \
        tell the user about them instead of treating them as denied"
    )]
    async fn search_access(
        &self,
        params: Parameters<SearchAccessInput>,
    ) -> Result<Json<SearchAccessOutput>, McpError> {
        trace!("search_access input: {:#?}", params.0);

        let output = search_access(params.0).await.map_err(|e| {
            error!("{e:#?}");
            self.format_mcp_error("Failed to search access", e)
        })?;

        trace!("search_access output: {output:#?}");

        Ok(Json(output))
    }

    #[tool(
        description = "Check whether one IAM identity (user, role, or assumed-role ARN) is \
        allowed to perform an action on a resource, using the IAM policy simulator. \
        \
        INSTRUCTIONS: \
        1. The identity must be a full ARN; an assumed-role ARN is checked against its \
        underlying IAM role \
        2. Pass the action as 'service:Operation' and the resource as an ARN pattern \
        (omit for all resources)"
    )]
    async fn check_access(
        &self,
        params: Parameters<CheckAccessInput>,
    ) -> Result<Json<CheckAccessOutput>, McpError> {
        trace!("check_access input: {:#?}", params.0);

        let output = check_access(params.0).await.map_err(|e| {
            error!("{e:#?}");
            self.format_mcp_error("Failed to check access", e)
        })?;

        trace!("check_access output: {output:#?}");

        Ok(Json(output))
    }

    #[tool(
        description = "Analyze AWS costs over a trailing window of days: daily breakdown, \
        per-service totals, and the overall total. Optionally restrict the analysis to \
        resources carrying a specific tag key/value pair. \
        \
        INSTRUCTIONS: \
        1. LookbackDays defaults to 30 when omitted \
        2. TagKey and TagValue must be provided together \
        3. The total always equals the sum of the daily amounts"
    )]
    async fn analyze_costs(
        &self,
        params: Parameters<AnalyzeCostsInput>,
    ) -> Result<Json<AnalyzeCostsOutput>, McpError> {
        trace!("analyze_costs input: {:#?}", params.0);

        let output = analyze_costs(params.0).await.map_err(|e| {
            error!("{e:#?}");
            self.format_mcp_error("Failed to analyze costs", e)
        })?;

        trace!("analyze_costs output: {output:#?}");

        Ok(Json(output))
    }

    #[tool(
        description = "Describe the AWS identity behind the current credentials: account id, \
        ARN, whether it is a user or a role, attached and inline policies, group membership \
        and MFA status (users), or the trust policy (roles). Takes no input."
    )]
    async fn describe_caller_identity(
        &self,
        params: Parameters<DescribeCallerInput>,
    ) -> Result<Json<DescribeCallerOutput>, McpError> {
        let output = describe_caller_identity(params.0).await.map_err(|e| {
            error!("{e:#?}");
            self.format_mcp_error("Failed to describe the calling identity", e)
        })?;

        trace!("describe_caller_identity output: {output:#?}");

        Ok(Json(output))
    }

    #[tool(
        description = "Retrieve the IAM account summary: counts of users, roles, groups, \
        policies, and related quota usage for the current AWS account. Takes no input."
    )]
    async fn account_summary(
        &self,
        params: Parameters<AccountSummaryInput>,
    ) -> Result<Json<AccountSummaryOutput>, McpError> {
        let output = account_summary(params.0).await.map_err(|e| {
            error!("{e:#?}");
            self.format_mcp_error("Failed to retrieve the account summary", e)
        })?;

        trace!("account_summary output: {output:#?}");

        Ok(Json(output))
    }
}

#[tool_handler]
impl ServerHandler for AccessInsightMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "AWS Access Insight inspects IAM access and AWS spend for the configured \
                account. \
                \
                Key capabilities: \
                1. search_access: find every user and role that can perform an action on a \
                resource (policy simulation across the whole account) \
                2. check_access: verify a single identity's permission for an action \
                3. analyze_costs: daily and per-service cost breakdown over a trailing window, \
                optionally filtered by tag \
                4. describe_caller_identity / account_summary: identity and account inspection \
                \
                Use search_access for 'who can ...' questions and check_access for 'can X ...' \
                questions. Results marked Unknown or incomplete are partial; say so when \
                summarizing them."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

pub async fn begin_http_transport(
    bind_address: &str,
    log_file: Option<String>,
) -> anyhow::Result<()> {
    let service = StreamableHttpService::new(
        move || Ok(AccessInsightMcpServer::new(log_file.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    info!("Listening on {bind_address}/mcp");

    // Fine to print with http
    println!("Listening on {bind_address}/mcp");
    let router = axum::Router::new().nest_service("/mcp", service);
    let tcp_listener = tokio::net::TcpListener::bind(bind_address).await?;

    // Serve on a separate task so the main thread stays free to receive
    // SIGINT while a connection is active.
    tokio::spawn(async move {
        let _ = axum::serve(tcp_listener, router)
            .with_graceful_shutdown(async {
                tokio::signal::ctrl_c()
                    .await
                    .expect("Failed to listen for CTRL+C signal");
            })
            .await;
    });

    // Handle graceful shutdown
    async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        log::info!("Received shutdown signal");
    }
    .await;

    Ok(())
}

pub async fn begin_stdio_transport(log_file: Option<String>) -> anyhow::Result<()> {
    let server = AccessInsightMcpServer::new(log_file);
    let service = server.serve(transport::stdio()).await?;
    service.waiting().await?;
    Ok(())
}
