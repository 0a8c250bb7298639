use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Command-line client for the image relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check relay health
    Health,
    /// Fetch an image through /proxy-image and save the bytes
    Proxy {
        /// Upstream image URL
        image_url: String,
        /// File to write the image to
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Fetch an image through /download-image and print the JSON envelope
    Download {
        /// Upstream image URL
        image_url: String,
        /// Print the full data URI instead of a truncated one
        #[arg(long)]
        full: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_response(res, false).await?;
        }
        Commands::Proxy { image_url, output } => {
            let res = client
                .get(format!("{}/proxy-image", base))
                .query(&[("url", image_url.as_str())])
                .send()
                .await?;
            if !res.status().is_success() {
                return print_response(res, false).await;
            }
            let content_type = res
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string();
            let bytes = res.bytes().await?;
            tokio::fs::write(&output, &bytes).await?;
            println!("Wrote {} bytes ({}) to {}", bytes.len(), content_type, output.display());
        }
        Commands::Download { image_url, full } => {
            let res = client
                .post(format!("{}/download-image", base))
                .json(&json!({ "imageUrl": image_url }))
                .send()
                .await?;
            print_response(res, full).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response, full: bool) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let mut json: Value = res.json().await?;
    if !full {
        if let Some(Value::String(uri)) = json.get_mut("dataUri") {
            if uri.len() > 80 {
                uri.truncate(80);
                uri.push_str("...");
            }
        }
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
