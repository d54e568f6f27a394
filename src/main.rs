mod cli;

use anyhow::Context;
use okta_client::{CallContext, Category, Client, Config};
use reqwest::Method;
use serde_json::Value;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::build_cli();
    let matches = cmd.get_matches();
    let log_level = matches.get_one::<String>("log-level").cloned();
    let version_flag = matches.get_flag("version");

    cli::init_logging(log_level.as_deref());

    if version_flag {
        println!("okta-client {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let method = match matches.get_one::<String>("method").map(|m| m.to_ascii_uppercase()) {
        Some(m) if matches!(m.as_str(), "GET" | "POST" | "PUT" | "DELETE") => {
            Method::from_bytes(m.as_bytes())?
        }
        other => anyhow::bail!("unsupported method: {:?}", other),
    };
    let path = matches
        .get_one::<String>("path")
        .cloned()
        .unwrap_or_default();
    let category: Category = matches
        .get_one::<String>("category")
        .context("missing --category")?
        .parse()
        .map_err(anyhow::Error::msg)?;
    let data: Option<Value> = matches
        .get_one::<String>("data")
        .map(|d| serde_json::from_str(d))
        .transpose()
        .context("--data is not valid JSON")?;

    let cfg = Config::from_env()?;
    let client = Client::from_config(&cfg)?;
    let result = client
        .execute::<Value, Value>(method, &path, data.as_ref(), category, &CallContext::background())
        .await;

    println!("{}", serde_json::to_string(&cli::envelope(&result))?);
    if result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}
