use clap::Parser;
use studio_cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.run().await {
        eprintln!("❌ Error: {e}");
        if e.is_rate_limited() {
            eprintln!("   The LLM provider is rate limiting requests; retry later.");
        }
        std::process::exit(1);
    }
}
