//! `dataforseo`: one DataForSEO API call per invocation.
//!
//! Reads an optional JSON body from stdin, sends it to `--endpoint`, and
//! prints `{"status":"ok","result":...}` or `{"status":"error","message":...}`
//! on stdout. Exits non-zero only when credentials are missing or the stdin
//! body is not valid JSON.
//!
//! ```text
//! echo '{"target": "example.com"}' | dataforseo \
//!     --endpoint /v3/backlinks/summary/live \
//!     --fields "items.*.backlinks,items.*.rank"
//! ```

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde_json::Value;
use seo_core::{
    Config, ConfigError, FieldConfig, FieldSpec, HttpMethod, Outcome, RequestOptions, SeoClient,
    Transport,
};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod transport;

use transport::UreqTransport;

/// DataForSEO API client
#[derive(Parser, Debug)]
#[command(name = "dataforseo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// API endpoint path, e.g. /v3/serp/google/organic/live/advanced
    #[arg(long, value_name = "PATH")]
    endpoint: String,

    /// HTTP method
    #[arg(long, value_enum, ignore_case = true, default_value_t = Method::Post)]
    method: Method,

    /// Force full response mode (skip the .ai suffix)
    #[arg(long)]
    full_response: bool,

    /// Comma-separated field filter (dot-notation, supports wildcards)
    #[arg(long, value_name = "SPEC")]
    fields: Option<String>,

    /// Path to field configuration JSON file (falls back to FIELD_CONFIG_PATH)
    #[arg(long, value_name = "FILE")]
    field_config: Option<PathBuf>,

    /// Tool name whose configured fields apply when --fields is absent
    #[arg(long, value_name = "NAME")]
    tool: Option<String>,

    /// Enable debug output to stderr
    #[arg(long)]
    debug: bool,

    /// Don't auto-wrap a POST body in [{...}]
    #[arg(long)]
    no_wrap_array: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
enum Method {
    Get,
    Post,
}

impl From<Method> for HttpMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => HttpMethod::Get,
            Method::Post => HttpMethod::Post,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::from_env();
    if let Ok(config) = &config {
        init_tracing(cli.debug || config.debug);
    }

    let stdin = (!io::stdin().is_terminal()).then(io::stdin);
    let (outcome, code) = run(&cli, config, stdin, &UreqTransport::new());
    print_outcome(&outcome);
    code
}

/// One invocation minus process I/O. `stdin` is `None` when nothing is piped
/// in; it is only read for POST.
fn run<R, T>(
    cli: &Cli,
    config: Result<Config, ConfigError>,
    stdin: Option<R>,
    transport: &T,
) -> (Outcome, ExitCode)
where
    R: Read,
    T: Transport + ?Sized,
{
    let config = match config {
        Ok(config) => config,
        Err(err) => return (Outcome::error(err.to_string()), ExitCode::FAILURE),
    };

    let body = match stdin.filter(|_| cli.method == Method::Post) {
        Some(reader) => match io::read_to_string(reader) {
            Ok(raw) => match parse_body(&raw) {
                Ok(body) => body,
                Err(err) => {
                    return (
                        Outcome::error(format!("Invalid JSON input: {err}")),
                        ExitCode::FAILURE,
                    )
                }
            },
            Err(err) => {
                return (
                    Outcome::error(format!("Failed to read input: {err}")),
                    ExitCode::FAILURE,
                )
            }
        },
        None => None,
    };

    let field_config = cli
        .field_config
        .as_ref()
        .or(config.field_config_path.as_ref())
        .and_then(|path| FieldConfig::load(path));
    let fields = select_fields(cli, field_config.as_ref());
    let options = request_options(cli, &config, body, fields);

    let client = SeoClient::from_config(&config);
    (client.execute(transport, &options), ExitCode::SUCCESS)
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

/// Empty input means no body.
fn parse_body(raw: &str) -> Result<Option<Value>, serde_json::Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw).map(Some)
}

/// `--fields` wins; otherwise the configured fields for `--tool`, if any.
fn select_fields(cli: &Cli, field_config: Option<&FieldConfig>) -> Option<FieldSpec> {
    if let Some(fields) = &cli.fields {
        return Some(FieldSpec::parse(fields));
    }
    let tool = cli.tool.as_deref()?;
    let spec = field_config?.field_spec_for(tool);
    if spec.is_none() {
        debug!(tool, "no configured fields for tool");
    }
    spec
}

fn request_options(
    cli: &Cli,
    config: &Config,
    body: Option<Value>,
    fields: Option<FieldSpec>,
) -> RequestOptions {
    RequestOptions {
        endpoint: cli.endpoint.clone(),
        method: cli.method.into(),
        body,
        full_response: cli.full_response || config.full_response,
        force_full: cli.full_response,
        wrap_array: !cli.no_wrap_array,
        simple_filter: config.simple_filter,
        fields,
    }
}

fn print_outcome(outcome: &Outcome) {
    match serde_json::to_string_pretty(outcome) {
        Ok(text) => println!("{text}"),
        Err(err) => error!(%err, "failed to render outcome"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use std::cell::RefCell;

    use serde_json::json;
    use seo_core::{ApiError, HttpRequest, HttpResponse, ResponseMode};

    use super::*;

    fn config(extra: &[(&str, &str)]) -> Config {
        let mut vars = vec![("DATAFORSEO_USERNAME", "u"), ("DATAFORSEO_PASSWORD", "p")];
        vars.extend_from_slice(extra);
        Config::from_lookup(|name: &str| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        })
        .unwrap()
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dataforseo").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn endpoint_is_required() {
        assert!(Cli::try_parse_from(["dataforseo"]).is_err());
    }

    #[test]
    fn defaults() {
        let cli = parse(&["--endpoint", "/v3/backlinks/summary/live"]);
        assert_eq!(cli.method, Method::Post);
        assert!(!cli.full_response);
        assert!(!cli.debug);
        assert!(!cli.no_wrap_array);
        assert!(cli.fields.is_none());

        let options = request_options(&cli, &config(&[]), None, None);
        assert_eq!(options.method, HttpMethod::Post);
        assert!(options.wrap_array);
        assert_eq!(options.mode(), ResponseMode::Condensed);
    }

    #[test]
    fn method_accepts_either_case() {
        assert_eq!(parse(&["--endpoint", "/x", "--method", "GET"]).method, Method::Get);
        assert_eq!(parse(&["--endpoint", "/x", "--method", "get"]).method, Method::Get);
        assert!(Cli::try_parse_from(["dataforseo", "--endpoint", "/x", "--method", "PUT"]).is_err());
    }

    #[test]
    fn full_response_flag_forces_full() {
        let cli = parse(&["--endpoint", "/x", "--full-response", "--no-wrap-array"]);
        let options = request_options(&cli, &config(&[]), None, None);
        assert!(options.force_full);
        assert!(options.full_response);
        assert!(!options.wrap_array);
    }

    #[test]
    fn env_full_response_without_flag() {
        let cli = parse(&["--endpoint", "/x"]);
        let options = request_options(
            &cli,
            &config(&[("DATAFORSEO_FULL_RESPONSE", "true"), ("DATAFORSEO_SIMPLE_FILTER", "1")]),
            None,
            None,
        );
        assert!(options.full_response);
        assert!(!options.force_full);
        assert!(options.simple_filter);
        assert_eq!(options.mode(), ResponseMode::Full);
    }

    #[test]
    fn parse_body_variants() {
        assert_eq!(parse_body("  \n").unwrap(), None);
        assert_eq!(parse_body(r#"{"keyword": "seo"}"#).unwrap(), Some(json!({"keyword": "seo"})));
        assert!(parse_body("{not json").is_err());
    }

    #[test]
    fn explicit_fields_win_over_tool_preset() {
        let mut file = tempfile_with(r#"{"supported_fields": {"summary": ["items.*.rank"]}}"#);
        file.flush().unwrap();
        let field_config = FieldConfig::load(file.path());

        let cli = parse(&["--endpoint", "/x", "--tool", "summary", "--fields", "items.*.url"]);
        assert_eq!(
            select_fields(&cli, field_config.as_ref()),
            Some(FieldSpec::parse("items.*.url"))
        );

        let cli = parse(&["--endpoint", "/x", "--tool", "summary"]);
        assert_eq!(
            select_fields(&cli, field_config.as_ref()),
            Some(FieldSpec::parse("items.*.rank"))
        );

        let cli = parse(&["--endpoint", "/x", "--tool", "other"]);
        assert_eq!(select_fields(&cli, field_config.as_ref()), None);
        assert_eq!(select_fields(&parse(&["--endpoint", "/x"]), field_config.as_ref()), None);
    }

    fn reply(body: Value) -> Result<HttpResponse, ApiError> {
        Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        })
    }

    fn message(outcome: &Outcome) -> &str {
        match outcome {
            Outcome::Error { message } => message,
            Outcome::Ok { result } => panic!("expected error, got {result}"),
        }
    }

    #[test]
    fn missing_credentials_exit_with_failure() {
        let transport = |_: &HttpRequest| -> Result<HttpResponse, ApiError> { panic!("no request expected") };
        let cli = parse(&["--endpoint", "/v3/backlinks/summary/live"]);
        let (outcome, code) = run(&cli, Err(ConfigError::MissingCredentials), None::<&[u8]>, &transport);
        assert_eq!(message(&outcome), "DATAFORSEO_USERNAME and DATAFORSEO_PASSWORD must be set");
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn invalid_stdin_exits_with_failure() {
        let transport = |_: &HttpRequest| -> Result<HttpResponse, ApiError> { panic!("no request expected") };
        let cli = parse(&["--endpoint", "/v3/backlinks/summary/live"]);
        let (outcome, code) = run(&cli, Ok(config(&[])), Some("{not json".as_bytes()), &transport);
        assert!(message(&outcome).starts_with("Invalid JSON input: "));
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn stdin_body_is_sent_and_result_printed() {
        let sent = RefCell::new(None);
        let transport = |request: &HttpRequest| -> Result<HttpResponse, ApiError> {
            *sent.borrow_mut() = request.body.clone();
            reply(json!({"status_code": 20000, "items": [{"rank": 1, "url": "a.com"}]}))
        };
        let cli = parse(&["--endpoint", "/v3/backlinks/summary/live", "--fields", "items.*.rank"]);
        let (outcome, code) = run(&cli, Ok(config(&[])), Some(r#"{"target": "a.com"}"#.as_bytes()), &transport);
        assert_eq!(outcome, Outcome::Ok { result: json!({"items": [{"rank": 1}]}) });
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(sent.into_inner().as_deref(), Some(r#"[{"target":"a.com"}]"#));
    }

    #[test]
    fn get_ignores_stdin() {
        let transport = |request: &HttpRequest| -> Result<HttpResponse, ApiError> {
            assert!(request.body.is_none());
            reply(json!({"status_code": 20000}))
        };
        let cli = parse(&["--endpoint", "/v3/x", "--method", "GET"]);
        let (outcome, code) = run(&cli, Ok(config(&[])), Some("{not json".as_bytes()), &transport);
        assert!(outcome.is_ok());
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn api_and_transport_failures_exit_with_success() {
        let cli = parse(&["--endpoint", "/v3/backlinks/summary/live"]);

        let rejected = |_: &HttpRequest| -> Result<HttpResponse, ApiError> {
            reply(json!({"status_code": 40000, "status_message": "Bad Request."}))
        };
        let (outcome, code) = run(&cli, Ok(config(&[])), None::<&[u8]>, &rejected);
        assert_eq!(message(&outcome), "API Error: Bad Request. (Code: 40000)");
        assert_eq!(code, ExitCode::SUCCESS);

        let unreachable = |_: &HttpRequest| -> Result<HttpResponse, ApiError> {
            Err(ApiError::Transport("connection refused".to_string()))
        };
        let (outcome, code) = run(&cli, Ok(config(&[])), None::<&[u8]>, &unreachable);
        assert_eq!(message(&outcome), "connection refused");
        assert_eq!(code, ExitCode::SUCCESS);
    }

    fn tempfile_with(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }
}
