mod cli;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use docqa_core::config::{load_dotenv, Config};
use docqa_ingest::embedding::create_embedder;
use docqa_llm::create_generator;
use docqa_pipeline::{handle_ask, handle_status, Pipeline};

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut config = match args.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    if let Some(pdf) = args.pdf.clone() {
        config.document.pdf_path = pdf;
    }
    config.log_summary();

    let embedder = create_embedder(&config.embedding).context("failed to create embedding backend")?;
    let generator = create_generator(&config.llm).context("failed to create generation backend")?;

    let pipeline = Pipeline::initialize(config, embedder, generator).await;

    if args.status {
        let response = handle_status(&pipeline);
        println!("{}", serde_json::to_string_pretty(&response.body)?);
        return Ok(());
    }

    if let Some(question) = args.question.as_deref() {
        return ask_once(&pipeline, question, args.json).await;
    }

    if !pipeline.is_ready() {
        let message = pipeline.status().message.unwrap_or_default();
        anyhow::bail!("system not ready: {message}");
    }

    info!("Ready. Type a question, or 'quit' to exit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\nQuestion: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("quit") || question.eq_ignore_ascii_case("exit") {
            break;
        }
        if let Err(e) = ask_once(&pipeline, question, args.json).await {
            eprintln!("Error: {:#}", e);
        }
    }

    Ok(())
}

async fn ask_once(pipeline: &Pipeline, question: &str, as_json: bool) -> Result<()> {
    let response = handle_ask(pipeline, &json!({ "question": question })).await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if !response.is_success() {
        let error = response.body["error"].as_str().unwrap_or("request failed");
        match response.body["details"].as_str() {
            Some(details) => anyhow::bail!("{error}: {details}"),
            None => anyhow::bail!("{error}"),
        }
    }

    println!("Answer: {}", response.body["answer"].as_str().unwrap_or_default());
    if let Some(context) = response.body["context"].as_array() {
        println!("\nContext ({} chunks):", context.len());
        for (i, chunk) in context.iter().enumerate() {
            println!("  [{}] {}", i + 1, chunk.as_str().unwrap_or_default());
        }
    }
    Ok(())
}
