//! svcbind CLI - Command-line interface for services exposed through svcbind

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:2000";
const DEFAULT_SIGNATURE_METHOD: &str = "get_signature";

#[derive(Parser)]
#[command(name = "svcbind")]
#[command(about = "Inspect and call svcbind services", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "SVCBIND_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Wire name of the signature method
    #[arg(long, env = "SVCBIND_SIGNATURE_METHOD", default_value = DEFAULT_SIGNATURE_METHOD)]
    signature_method: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the service signature document (YAML)
    Signature,

    /// List methods with their input and output fields
    Methods,

    /// Call a method
    Call {
        /// Wire name (e.g., get_login_kind)
        method: String,

        /// Argument as JSON string
        #[arg(short, long, default_value = "{}")]
        params: String,
    },

    /// Show service status
    Status,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    data: Option<serde_json::Value>,
}

#[derive(Debug, PartialEq, Tabled)]
struct MethodRow {
    #[tabled(rename = "Method")]
    name: String,
    #[tabled(rename = "In")]
    input: String,
    #[tabled(rename = "Out")]
    output: String,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to service")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        match error.data {
            Some(data) => anyhow::bail!("RPC error ({}): {}\n{}", error.code, error.message, data),
            None => anyhow::bail!("RPC error ({}): {}", error.code, error.message),
        }
    }

    // void methods answer with a null result
    Ok(response.result.unwrap_or(serde_json::Value::Null))
}

async fn fetch_signature(cli: &Cli) -> Result<String> {
    let result = call_rpc(&cli.rpc_url, &cli.signature_method, json!([])).await?;
    result
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Signature is not a text document"))
}

/// One table row per method of a signature document
fn method_rows(document: &str) -> Result<Vec<MethodRow>> {
    let signature: serde_yaml::Value =
        serde_yaml::from_str(document).context("Invalid signature document")?;

    let rows = signature["spec"]
        .as_sequence()
        .map(|spec| {
            spec.iter()
                .map(|method| MethodRow {
                    name: method["name"].as_str().unwrap_or_default().to_string(),
                    input: field_names(&method["in"]),
                    output: field_names(&method["out"]),
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(rows)
}

fn field_names(fields: &serde_yaml::Value) -> String {
    let names: Vec<String> = fields
        .as_sequence()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|field| field.as_mapping())
                .flat_map(|field| field.keys())
                .filter_map(|key| key.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Signature => {
            let document = fetch_signature(&cli).await?;
            print!("{}", document);
        }

        Commands::Methods => {
            let document = fetch_signature(&cli).await?;
            let rows = method_rows(&document)?;

            println!("{}", format!("{} methods", rows.len()).cyan().bold());
            println!();
            println!("{}", Table::new(rows));
        }

        Commands::Call { method, params } => {
            let argument: serde_json::Value =
                serde_json::from_str(params).context("Invalid JSON params")?;

            let result = call_rpc(&cli.rpc_url, method, json!([argument])).await?;

            if result.is_null() {
                println!("{}", format!("✓ {} succeeded", method).green().bold());
            } else {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }

        Commands::Status => {
            println!("{}", "Service Status".cyan().bold());
            println!();

            match fetch_signature(&cli).await {
                Ok(document) => {
                    let service = serde_yaml::from_str::<serde_yaml::Value>(&document)
                        .ok()
                        .and_then(|s| s["apiVersion"].as_str().map(str::to_string))
                        .unwrap_or_default();
                    let methods = method_rows(&document)?.len();

                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!("  {} {}", "Service:".bold(), service);
                    println!("  {} {}", "Methods:".bold(), methods);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}
