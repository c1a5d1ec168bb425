use anyhow::{bail, Context, Result};
use rave_gateway::RaveClient;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: rave-gateway <verify TX_REF | refund FLW_REF>";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let command = args.next().context(USAGE)?;
    let reference = args.next().context(USAGE)?;

    let client = RaveClient::from_env().context("Failed to configure the Rave client")?;

    let output = match command.as_str() {
        "verify" => serde_json::to_string_pretty(&client.verify(&reference).await?)?,
        "refund" => serde_json::to_string_pretty(&client.refund_transaction(&reference).await?)?,
        other => bail!("unknown command {}\n{}", other, USAGE),
    };

    println!("{}", output);
    Ok(())
}
