use clap::{Arg, ArgAction, Command};
use okta_client::{Response, Result};
use serde_json::{json, Value};

pub fn build_cli() -> Command {
    Command::new("okta-client")
        .about("Send one request to the Okta API and print the result as JSON")
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .num_args(1)
                .help("Override RUST_LOG level (e.g., info, debug)"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print version and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("category")
                .long("category")
                .num_args(1)
                .default_value("core")
                .help("Rate-limit category the call counts against"),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .num_args(1)
                .help("JSON request body"),
        )
        .arg(
            Arg::new("method")
                .help("HTTP method: GET, POST, PUT or DELETE")
                .required_unless_present("version"),
        )
        .arg(
            Arg::new("path")
                .help("Path relative to OKTA_BASE_URL, e.g. users/me")
                .required_unless_present("version"),
        )
}

pub fn init_logging(level: Option<&str>) {
    // Respect explicit level, else default to info, allow env override via RUST_LOG
    if let Some(lvl) = level {
        std::env::set_var("RUST_LOG", lvl);
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

fn meta(resp: &Response) -> Value {
    json!({
        "status": resp.status.as_u16(),
        "rate": resp.rate,
        "pagination": resp.pagination,
        "request_id": resp.request_id,
    })
}

/// Renders a call outcome as the JSON printed on stdout.
pub fn envelope(result: &Result<(Option<Value>, Response)>) -> Value {
    match result {
        Ok((value, resp)) => json!({
            "status": resp.status.as_u16(),
            "value": value,
            "meta": meta(resp),
        }),
        Err(e) => json!({
            "error": { "kind": e.kind(), "message": e.to_string() },
            "meta": e.response().map(meta),
        }),
    }
}
