use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lawpipe::local::egov::{api_base_from_env, timeout_ms_from_env, DEFAULT_API_BASE};
use lawpipe::tools::TOOL_NAMES;
use lawpipe::LawTools;

#[derive(Parser, Debug)]
#[command(name = "lawpipe")]
#[command(about = "e-Gov law search tools for AI agents (MCP stdio server)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as an MCP stdio server (for Claude Desktop / Cursor / other MCP clients).
    #[cfg(feature = "stdio")]
    McpStdio,
    /// Run a single tool in-process and print its JSON output.
    Call(CallCmd),
    /// Print the search guidance text.
    Guidance,
    /// Print configuration and self-checks as JSON.
    Doctor(DoctorCmd),
    /// Print version info as JSON.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct CallCmd {
    /// Tool name, e.g. `search_laws_by_keyword`.
    #[arg(long)]
    tool: String,
    /// Tool arguments as a JSON object. Omit for defaults.
    #[arg(long)]
    args_json: Option<String>,
}

#[derive(clap::Args, Debug)]
struct DoctorCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
    /// Spawn a child `lawpipe mcp-stdio` and call `list_tools`.
    ///
    /// No gateway request is made.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    check_stdio: bool,
    /// Timeout for the child's tool listing (ms).
    #[arg(long, default_value_t = 3000)]
    timeout_ms: u64,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

/// Loads `KEY=VALUE` lines from `LAWPIPE_ENV_FILE` without overriding the
/// process environment. Values are never logged.
fn load_env_file() {
    let Ok(p) = std::env::var("LAWPIPE_ENV_FILE") else {
        return;
    };
    let p = p.trim();
    if p.is_empty() {
        return;
    }
    let Ok(txt) = std::fs::read_to_string(p) else {
        return;
    };
    for raw in txt.lines() {
        let s = raw.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        let Some((k, v)) = s.split_once('=') else {
            continue;
        };
        let k = k.trim();
        if k.is_empty() {
            continue;
        }
        if std::env::var_os(k).is_none() {
            std::env::set_var(k, v.trim());
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter =
        EnvFilter::try_from_env("LAWPIPE_LOG").unwrap_or_else(|_| EnvFilter::new("lawpipe=info"));
    // stdout carries MCP frames; logs must never go there.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

/// What a child `lawpipe mcp-stdio` reported for `list_tools`.
#[derive(Debug)]
enum StdioListing {
    Skipped,
    Listed(Vec<String>),
    Failed(String),
}

#[cfg(feature = "stdio")]
async fn list_stdio_tools(timeout_ms: u64) -> StdioListing {
    use rmcp::service::ServiceExt;
    use rmcp::transport::{ConfigureCommandExt, TokioChildProcess};
    use tokio::process::Command;

    let exe = std::env::current_exe().unwrap_or_else(|_| std::path::PathBuf::from("lawpipe"));
    let child = match TokioChildProcess::new(Command::new(exe).configure(|cmd| {
        cmd.arg("mcp-stdio");
        cmd.env("LAWPIPE_LOG", "error");
    })) {
        Ok(c) => c,
        Err(e) => return StdioListing::Failed(format!("spawn failed: {e}")),
    };
    let service = match ().serve(child).await {
        Ok(s) => s,
        Err(e) => return StdioListing::Failed(format!("initialize failed: {e}")),
    };
    let res = tokio::time::timeout(
        std::time::Duration::from_millis(timeout_ms),
        service.list_tools(Default::default()),
    )
    .await;
    let _ = service.cancel().await;

    match res {
        Ok(Ok(r)) => StdioListing::Listed(r.tools.into_iter().map(|t| t.name.into_owned()).collect()),
        Ok(Err(e)) => StdioListing::Failed(format!("list_tools failed: {e}")),
        Err(_) => StdioListing::Failed(format!("no tool list within {timeout_ms}ms")),
    }
}

#[cfg(not(feature = "stdio"))]
async fn list_stdio_tools(_timeout_ms: u64) -> StdioListing {
    StdioListing::Failed("built without feature `stdio`".to_string())
}

/// The server must list exactly the tools `lawpipe call` dispatches.
fn stdio_tools_check(listing: &StdioListing) -> serde_json::Value {
    match listing {
        StdioListing::Skipped => serde_json::json!({
            "name": "mcp_stdio_tools",
            "ok": true,
            "skipped": true,
            "message": "stdio tool listing skipped",
        }),
        StdioListing::Failed(msg) => serde_json::json!({
            "name": "mcp_stdio_tools",
            "ok": false,
            "skipped": false,
            "message": msg,
            "hint": "Run `lawpipe mcp-stdio` by hand; nothing but MCP frames may reach stdout.",
        }),
        StdioListing::Listed(names) => {
            let missing: Vec<&str> = TOOL_NAMES
                .iter()
                .copied()
                .filter(|t| !names.iter().any(|n| n == t))
                .collect();
            let unexpected: Vec<&str> = names
                .iter()
                .map(String::as_str)
                .filter(|n| !TOOL_NAMES.contains(n))
                .collect();
            let ok = missing.is_empty() && unexpected.is_empty();
            serde_json::json!({
                "name": "mcp_stdio_tools",
                "ok": ok,
                "skipped": false,
                "message": if ok {
                    format!("{} tools listed over stdio", names.len())
                } else {
                    "stdio tool list differs from `lawpipe call`".to_string()
                },
                "missing": missing,
                "unexpected": unexpected,
            })
        }
    }
}

#[cfg(feature = "stdio")]
mod mcp {
    use lawpipe::tools::{
        AgeCategoryArgs, AnalyzeArgs, GuidanceArgs, KeywordSearchArgs, LawContentArgs,
        SmartSearchArgs, TitleSearchArgs, TranslateTermsArgs,
    };
    use lawpipe::LawTools;
    use rmcp::{
        handler::server::router::tool::ToolRouter as RmcpToolRouter,
        handler::server::wrapper::Parameters,
        model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
        tool, tool_handler, tool_router,
        transport::stdio,
        ErrorData as McpError, ServiceExt,
    };
    use std::sync::Arc;

    fn text_result(s: String) -> CallToolResult {
        CallToolResult::success(vec![Content::text(s)])
    }

    #[derive(Clone)]
    pub(crate) struct LawpipeMcp {
        tool_router: RmcpToolRouter<Self>,
        tools: Arc<LawTools>,
    }

    #[tool_router]
    impl LawpipeMcp {
        pub(crate) fn new() -> Result<Self, McpError> {
            let tools =
                LawTools::from_env().map_err(|e| McpError::internal_error(e.to_string(), None))?;
            Ok(Self {
                tool_router: Self::tool_router(),
                tools: Arc::new(tools),
            })
        }

        #[tool(
            description = "キーワードで法令本文を検索 (search law bodies by keywords, AND). Returns total_count, sentence-level items and search_hints. Call get_search_guidance first if you are new to this API."
        )]
        async fn search_laws_by_keyword(
            &self,
            params: Parameters<Option<KeywordSearchArgs>>,
        ) -> Result<CallToolResult, McpError> {
            let args = params.0.unwrap_or_default();
            Ok(text_result(self.tools.search_laws_by_keyword(args).await))
        }

        #[tool(
            description = "日常語で法令を検索 (expand an everyday query such as チャイルドシート into statutory terms via the term dictionary, then keyword-search them). Returns expanded_terms, recommendations and the keyword results."
        )]
        async fn smart_search_laws(
            &self,
            params: Parameters<Option<SmartSearchArgs>>,
        ) -> Result<CallToolResult, McpError> {
            let args = params.0.unwrap_or_default();
            Ok(text_result(self.tools.smart_search_laws(args).await))
        }

        #[tool(description = "法令名で法令を検索 (search laws by title words). Repealed laws are excluded unless include_repealed=true.")]
        async fn search_laws_by_title(
            &self,
            params: Parameters<Option<TitleSearchArgs>>,
        ) -> Result<CallToolResult, McpError> {
            let args = params.0.unwrap_or_default();
            Ok(text_result(self.tools.search_laws_by_title(args).await))
        }

        #[tool(description = "法令IDから法令本文を取得 (fetch one law). Returns structured articles by default, or the raw tree with extract_articles=false.")]
        async fn get_law_content(
            &self,
            params: Parameters<Option<LawContentArgs>>,
        ) -> Result<CallToolResult, McpError> {
            let args = params.0.unwrap_or_default();
            Ok(text_result(self.tools.get_law_content(args).await))
        }

        #[tool(description = "法令検索のガイダンスを取得 (step-by-step search strategy). Strongly recommended before the first search.")]
        async fn get_search_guidance(
            &self,
            _params: Parameters<Option<GuidanceArgs>>,
        ) -> Result<CallToolResult, McpError> {
            Ok(text_result(self.tools.get_search_guidance()))
        }

        #[tool(description = "検索結果を分析し次のアクションを提案 (analyze keyword search items against the original question: law distribution, undefined age terms, referenced laws, suggested follow-ups).")]
        async fn analyze_search_results(
            &self,
            params: Parameters<Option<AnalyzeArgs>>,
        ) -> Result<CallToolResult, McpError> {
            let args = params.0.unwrap_or_default();
            Ok(text_result(self.tools.analyze_search_results(args)))
        }

        #[tool(description = "一般用語を法令用語に変換 (map everyday words to statutory wording, e.g. シートベルト → 座席ベルト).")]
        async fn translate_legal_terms(
            &self,
            params: Parameters<Option<TranslateTermsArgs>>,
        ) -> Result<CallToolResult, McpError> {
            let args = params.0.unwrap_or_default();
            Ok(text_result(self.tools.translate_legal_terms(args)))
        }

        #[tool(description = "年齢から法令上の年齢区分を取得 (age brackets such as 幼児 / 児童 / 未成年者 that contain the given age, with the laws defining them).")]
        async fn lookup_age_category(
            &self,
            params: Parameters<Option<AgeCategoryArgs>>,
        ) -> Result<CallToolResult, McpError> {
            let args = params.0.unwrap_or_default();
            Ok(text_result(self.tools.lookup_age_category(args)))
        }
    }

    #[tool_handler]
    impl rmcp::ServerHandler for LawpipeMcp {
        fn get_info(&self) -> ServerInfo {
            ServerInfo {
                instructions: Some(
                    "Search Japanese statutes through the e-Gov 法令API v2. Outputs are JSON strings; start with get_search_guidance."
                        .to_string(),
                ),
                capabilities: ServerCapabilities::builder().enable_tools().build(),
                ..Default::default()
            }
        }
    }

    pub(crate) async fn serve_stdio() -> Result<(), McpError> {
        let svc = LawpipeMcp::new()?;
        tracing::info!(gateway = svc.tools.gateway_name(), "mcp stdio server starting");
        let running = svc
            .serve(stdio())
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        running
            .waiting()
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn p<T>(v: T) -> Parameters<Option<T>> {
            Parameters(Some(v))
        }

        fn text(r: &CallToolResult) -> String {
            r.content
                .first()
                .and_then(|c| c.as_text())
                .map(|t| t.text.clone())
                .unwrap_or_default()
        }

        #[test]
        fn router_exposes_every_tool() {
            let svc = LawpipeMcp::new().unwrap();
            let mut names: Vec<String> = svc
                .tool_router
                .list_all()
                .into_iter()
                .map(|t| t.name.into_owned())
                .collect();
            names.sort();
            let mut want: Vec<String> =
                lawpipe::tools::TOOL_NAMES.iter().map(|s| s.to_string()).collect();
            want.sort();
            assert_eq!(names, want);
        }

        #[tokio::test]
        async fn offline_tools_answer_without_a_gateway() {
            let svc = LawpipeMcp::new().unwrap();

            let r = svc
                .lookup_age_category(p(AgeCategoryArgs { age: Some(3) }))
                .await
                .unwrap();
            let v: serde_json::Value = serde_json::from_str(&text(&r)).unwrap();
            assert_eq!(v["categories"][0]["category"], "幼児");
            assert!(v["summary"].as_str().unwrap().starts_with("未成年者"));

            let r = svc.smart_search_laws(Parameters(None)).await.unwrap();
            let v: serde_json::Value = serde_json::from_str(&text(&r)).unwrap();
            assert_eq!(v["error"], "invalid_params");

            let r = svc.get_search_guidance(Parameters(None)).await.unwrap();
            assert!(text(&r).contains("表記揺れ"));

            let r = svc.analyze_search_results(Parameters(None)).await.unwrap();
            let v: serde_json::Value = serde_json::from_str(&text(&r)).unwrap();
            assert_eq!(v["total_results"], 0);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env_file();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        #[cfg(feature = "stdio")]
        Commands::McpStdio => {
            mcp::serve_stdio()
                .await
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        }
        Commands::Call(args) => {
            let tool_args = match args.args_json.as_deref().map(str::trim) {
                Some(s) if !s.is_empty() => {
                    serde_json::from_str(s).context("--args-json is not valid JSON")?
                }
                _ => serde_json::Value::Null,
            };
            let tools = LawTools::from_env()?;
            println!("{}", tools.call(&args.tool, tool_args).await);
        }
        Commands::Guidance => {
            print!("{}", lawpipe::guidance::SEARCH_GUIDANCE);
        }
        Commands::Doctor(args) => {
            let t0 = std::time::Instant::now();
            let overridden = api_base_from_env();
            let api_base = overridden
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

            let mut checks: Vec<serde_json::Value> = Vec::new();

            let base_ok = reqwest::Url::parse(&api_base)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false);
            checks.push(serde_json::json!({
                "name": "api_base_valid",
                "ok": base_ok,
                "message": if base_ok { "api base is a valid http(s) url" } else { "api base is not a valid http(s) url" },
                "hint": if base_ok { "" } else { "Fix or unset LAWPIPE_API_BASE." },
            }));

            let tools_err = LawTools::from_env().err().map(|e| e.to_string());
            checks.push(serde_json::json!({
                "name": "tools_init",
                "ok": tools_err.is_none(),
                "message": tools_err.clone().unwrap_or_else(|| "tool surface initialized".to_string()),
            }));

            let listing = if args.check_stdio {
                list_stdio_tools(args.timeout_ms).await
            } else {
                StdioListing::Skipped
            };
            checks.push(stdio_tools_check(&listing));

            let ok = checks.iter().all(|c| c["ok"].as_bool().unwrap_or(false));
            let payload = serde_json::json!({
                "schema_version": 1,
                "kind": "doctor",
                "ok": ok,
                "name": "lawpipe",
                "version": env!("CARGO_PKG_VERSION"),
                "elapsed_ms": t0.elapsed().as_millis(),
                "features": { "stdio": cfg!(feature = "stdio") },
                "configured": {
                    "api_base": api_base,
                    "api_base_overridden": overridden.is_some(),
                    "timeout_ms": timeout_ms_from_env(),
                },
                "tools": TOOL_NAMES,
                "checks": checks,
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => {
                    println!("lawpipe {} ok={}", env!("CARGO_PKG_VERSION"), ok);
                    println!("api_base: {api_base}");
                    for c in &checks {
                        println!(
                            "- {}: {}",
                            c["name"].as_str().unwrap_or_default(),
                            if c["ok"].as_bool().unwrap_or(false) { "ok" } else { "FAIL" }
                        );
                    }
                }
                _ => println!("{}", payload),
            }
        }
        Commands::Version(args) => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "version",
                "ok": true,
                "name": "lawpipe",
                "version": env!("CARGO_PKG_VERSION"),
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => println!("lawpipe {}", env!("CARGO_PKG_VERSION")),
                _ => println!("{}", v),
            }
        }
    }

    Ok(())
}
