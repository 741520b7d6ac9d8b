use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "carpool-cli")]
#[command(about = "Operator CLI for the car pooling service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9091")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Liveness probe
    Status,
    /// Replace the fleet with the cars in a JSON file
    Cars { file: PathBuf },
    /// Request a journey for a group
    Journey { id: i64, people: i64 },
    /// Drop off a journey
    Dropoff { id: i64 },
    /// Show the car a journey rides in
    Locate { id: i64 },
    /// List every car
    Fleet,
    /// List every journey
    Journeys,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let url = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/status", url)).send().await?,
        Commands::Cars { file } => {
            let cars: Value = serde_json::from_str(&std::fs::read_to_string(file)?)?;
            client.put(format!("{}/cars", url)).json(&cars).send().await?
        }
        Commands::Journey { id, people } => {
            client
                .post(format!("{}/journey", url))
                .json(&serde_json::json!({ "id": id, "people": people }))
                .send()
                .await?
        }
        Commands::Dropoff { id } => {
            client
                .post(format!("{}/dropoff", url))
                .form(&[("ID", id)])
                .send()
                .await?
        }
        Commands::Locate { id } => {
            client
                .post(format!("{}/locate", url))
                .form(&[("ID", id)])
                .send()
                .await?
        }
        Commands::Fleet => client.get(format!("{}/admin/fleet", url)).send().await?,
        Commands::Journeys => client.get(format!("{}/admin/journeys", url)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    println!("{}", status);

    let text = res.text().await?;
    if text.is_empty() {
        return Ok(());
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
