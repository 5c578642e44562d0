//! Send an SMS through whichever provider the configuration selects.
//!
//! ```text
//! SMSGATE__SMS__PROVIDERS__SMSIR__API_KEY=... \
//! SMSGATE__SMS__PROVIDERS__SMSIR__LINE_NUMBER=30004505 \
//! cargo run --example send_smsir -- --to 989121234567 --text "hello"
//! ```
use smsgate::prelude::*;

use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    smsgate::logging::init(&config.logging)?;

    let to = arg_or_env("--to", "SMS_TO")?;
    let text = arg_or_env("--text", "SMS_TEXT")?;

    let connector = driver(&config.sms)?;
    let envelope = connector.send(&Message::text([to], text)?).await?;
    println!(
        "Sent via {} ({}: {})\nData: {}",
        connector.provider(),
        envelope.status,
        envelope.message,
        serde_json::to_string_pretty(&envelope.data)?
    );

    let credit = connector.account().await?;
    println!("Remaining credit: {}", credit.balance);
    Ok(())
}

fn arg_or_env(flag: &str, env_key: &str) -> Result<String, String> {
    let args: Vec<String> = env::args().collect();
    if let Some(idx) = args.iter().position(|a| a == flag) {
        if idx + 1 < args.len() {
            return Ok(args[idx + 1].clone());
        }
    }
    env::var(env_key).map_err(|_| format!("missing {flag} (arg {flag} or env {env_key})"))
}
