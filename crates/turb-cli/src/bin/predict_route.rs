//! Request a turbulence prediction for a route and print a summary.

use clap::Parser;
use turb_cli::{format_summary, request_prediction, Prediction};

/// Predict turbulence between two airports
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Turb Server URL
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,

    /// Departure IATA code
    departure: String,

    /// Arrival IATA code
    arrival: String,

    /// Print the raw JSON response
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let body = request_prediction(&args.server, &args.departure, &args.arrival)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let prediction: Prediction = serde_json::from_value(body)?;
    print!("{}", format_summary(&prediction));
    Ok(())
}
