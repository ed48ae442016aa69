//! Command-line client for the local energy gateway API.

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the energy trading gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3001", env = "ENERGY_GATEWAY_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway health
    Health,
    /// Show ledger network status
    Network,
    /// Create a demo wallet
    CreateWallet { user_id: String },
    /// Energy credit balance of a wallet
    Balance { wallet_address: String },
    /// Wallet details
    Info { wallet_address: String },
    /// Transaction history of a wallet
    History {
        wallet_address: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Send energy credits
    Send { from: String, to: String, amount: f64 },
    /// Buy energy from an offer
    Trade {
        offer_id: String,
        buyer_wallet: String,
        amount: f64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)),
        Commands::Network => client.get(format!("{}/api/wallet/network-status", base)),
        Commands::CreateWallet { user_id } => client
            .post(format!("{}/api/wallet/create-demo", base))
            .json(&json!({ "userId": user_id })),
        Commands::Balance { wallet_address } => client
            .post(format!("{}/api/wallet/balance", base))
            .json(&json!({ "walletAddress": wallet_address })),
        Commands::Info { wallet_address } => {
            client.get(format!("{}/api/wallet/info/{}", base, wallet_address))
        }
        Commands::History {
            wallet_address,
            limit,
            offset,
        } => client
            .get(format!("{}/api/wallet/transactions/{}", base, wallet_address))
            .query(&[("limit", limit), ("offset", offset)]),
        Commands::Send { from, to, amount } => client
            .post(format!("{}/api/wallet/send", base))
            .json(&json!({ "from": from, "to": to, "amount": amount })),
        Commands::Trade {
            offer_id,
            buyer_wallet,
            amount,
        } => client
            .post(format!("{}/api/wallet/trade", base))
            .json(&json!({ "offerId": offer_id, "buyerWallet": buyer_wallet, "amount": amount })),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
