use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Operator CLI for the Ethereum transfer relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Liveness probe
    Health,
    /// Service identity and wallet balance
    Status,
    /// Signer address, balance and treasury
    Balance,
    /// Request a transfer and wait for the confirmed result
    Send {
        /// Amount in ETH (relay default when omitted)
        #[arg(short, long)]
        amount: Option<String>,
        /// Destination address (treasury when omitted)
        #[arg(short, long)]
        to: Option<String>,
        /// Transfer route to call
        #[arg(short, long, default_value = "/convert")]
        route: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{base}/health")).send().await?,
        Commands::Status => client.get(format!("{base}/status")).send().await?,
        Commands::Balance => client.get(format!("{base}/balance")).send().await?,
        Commands::Send { amount, to, route } => {
            let mut body = Map::new();
            if let Some(amount) = amount {
                body.insert("amount".to_string(), Value::String(amount));
            }
            if let Some(to) = to {
                body.insert("to".to_string(), Value::String(to));
            }

            let route = if route.starts_with('/') { route } else { format!("/{route}") };
            client
                .post(format!("{base}{route}"))
                .json(&Value::Object(body))
                .send()
                .await?
        }
    };

    print_response(res).await
}

/// Pretty-print the response body. Non-2xx responses go to stderr and
/// turn into a failing exit code.
async fn print_response(res: reqwest::Response) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(ExitCode::FAILURE);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(ExitCode::SUCCESS)
}
