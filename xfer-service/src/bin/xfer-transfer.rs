//! Demo client: starts one transfer saga, approves it after a pause, then waits for the outcome.

use clap::Parser;
use log::{info, warn};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use xfer_core::foundation::SagaError;

#[derive(Parser, Debug)]
#[command(name = "xfer-transfer")]
#[command(about = "Start a transfer saga, approve it and print the result", long_about = None)]
struct Cli {
    /// Base URL of the saga API
    #[arg(long, default_value = "http://127.0.0.1:8088")]
    api_url: String,

    #[arg(long, default_value = "12345")]
    reference_id: String,

    #[arg(long, default_value = "0x11001")]
    source_wallet_id: String,

    #[arg(long, default_value = "0x00100")]
    destination_wallet_id: String,

    #[arg(long, default_value = "1234567890123456")]
    card_number: String,

    /// Decimal amount, up to 8 fractional digits
    #[arg(long, default_value = "250")]
    amount: String,

    /// Approver identity sent with the approval signal
    #[arg(long, default_value = "Card XXX")]
    approver: String,

    /// Pause before the approval, standing in for an external webhook
    #[arg(long, default_value_t = 5)]
    approve_after_secs: u64,

    /// Start the saga but never approve it
    #[arg(long)]
    skip_approval: bool,

    /// Long-poll window per result request
    #[arg(long, default_value_t = 10_000)]
    poll_wait_ms: u64,

    /// Give up after this many result polls
    #[arg(long, default_value_t = 30)]
    max_polls: u32,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

async fn read_json(response: reqwest::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn start(client: &Client, args: &Cli) -> Result<(), SagaError> {
    let payload = json!({
        "source_wallet_id": args.source_wallet_id,
        "destination_wallet_id": args.destination_wallet_id,
        "card_number": args.card_number,
        "amount": args.amount,
        "reference_id": args.reference_id,
    });
    let response = client.post(format!("{}/sagas", args.api_url)).json(&payload).send().await?;
    let (status, body) = read_json(response).await;
    if !status.is_success() {
        return Err(SagaError::Message(format!("start failed status={} body={}", status, body)));
    }
    println!("Started saga. Reference ID: {} ({})", args.reference_id, body["disposition"].as_str().unwrap_or("unknown"));
    Ok(())
}

async fn approve(client: &Client, args: &Cli) -> Result<(), SagaError> {
    let url = format!("{}/sagas/{}/approve", args.api_url, args.reference_id);
    let response = client.post(url).json(&json!({ "approver": args.approver })).send().await?;
    let (status, body) = read_json(response).await;
    info!("approval delivered reference_id={} status={} ack={}", args.reference_id, status, body["ack"]);
    if status == StatusCode::NOT_FOUND {
        return Err(SagaError::UnknownSaga(args.reference_id.clone()));
    }
    Ok(())
}

async fn poll_result(client: &Client, args: &Cli) -> Result<Value, SagaError> {
    let url = format!("{}/sagas/{}/result", args.api_url, args.reference_id);
    for poll in 1..=args.max_polls {
        let response = client.get(&url).query(&[("wait_ms", args.poll_wait_ms)]).send().await?;
        let (status, body) = read_json(response).await;
        match status {
            StatusCode::OK => return Ok(body),
            StatusCode::ACCEPTED => info!("saga still running reference_id={} poll={} phase={}", args.reference_id, poll, body["phase"]),
            other => return Err(SagaError::Message(format!("result request failed status={} body={}", other, body))),
        }
    }
    Err(SagaError::Message(format!("no result after {} polls", args.max_polls)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    xfer_core::infrastructure::logging::init_logger(None, &args.log_level)?;
    let client = Client::builder().timeout(Duration::from_millis(args.poll_wait_ms + 5_000)).build()?;

    start(&client, &args).await?;
    if args.skip_approval {
        warn!("approval skipped; saga stays parked reference_id={}", args.reference_id);
        return Ok(());
    }

    println!("Waiting for incoming simulated webhook");
    tokio::time::sleep(Duration::from_secs(args.approve_after_secs)).await;
    approve(&client, &args).await?;

    let outcome = poll_result(&client, &args).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
