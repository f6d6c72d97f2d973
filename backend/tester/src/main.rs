use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{Context, Error};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use schema::form::{FormValues, validate_form};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Form values as JSON, same keys as the browser form posts
    payload: PathBuf,

    #[arg(long, default_value = "http://localhost:3002")]
    url: String,

    /// Number of times to submit the same payload
    #[arg(long, default_value_t = 1)]
    count: u32,

    /// Post even if the advisory checks fail, the server decides anyway
    #[arg(long)]
    skip_validation: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Error> {
    let args = Args::parse();

    let raw = fs::read_to_string(&args.payload)
        .with_context(|| format!("Failed to read {}", args.payload.display()))?;
    let values: FormValues = serde_json::from_str(&raw).context("Payload is not valid form JSON")?;

    let report = validate_form(&values);
    if let Some(first) = report.first_error() {
        for status in report.errors() {
            println!(
                "Invalid {}: {}",
                status.field,
                status.message.unwrap_or_default()
            );
        }

        if !args.skip_validation {
            println!("\nNot submitted, first error at {}", first.field);
            return Ok(ExitCode::FAILURE);
        }
        println!("\nSubmitting anyway\n");
    }

    let endpoint = format!("{}/api/v1/survey", args.url.trim_end_matches('/'));
    let payload = values.payload();
    let client = Client::new();

    let pb = ProgressBar::new(args.count as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut saved = 0;
    for attempt in 1..=args.count {
        pb.set_message(format!("Submitting #{attempt}"));

        let response = client
            .post(&endpoint)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to reach {endpoint}"))?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        pb.println(format!("#{attempt} {status} {body}"));
        if status.is_success() {
            saved += 1;
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!("Saved: {saved}/{}", args.count);

    Ok(if saved == args.count {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
