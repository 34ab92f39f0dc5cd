use anyhow::Result;
use kling_draw::{
    api::HttpKlingApi,
    config,
    generator::{Generator, request_from_prompt},
};
use std::sync::Arc;
use tracing::info;

/// Validates that a log level string is valid
fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            )
        })?;
    Ok(())
}

fn usage() -> ! {
    eprintln!("Usage: kling-draw <prompt text> [--ar W:H] [--iw 0..1] [--image <path>]");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (before logging setup)
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Determine log level: environment variable overrides config
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logs.level.clone());

    // Validate log level
    if let Err(e) = validate_log_level(&log_level) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    // Initialize tracing with the determined log level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.parse().unwrap()),
        )
        .init();

    // Split off our own --image flag; everything else stays prompt text for
    // the inline --ar/--iw options.
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut prompt_parts: Vec<String> = Vec::new();
    let mut image_path: Option<String> = None;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--image" {
            image_path = iter.next();
            if image_path.is_none() {
                usage();
            }
        } else {
            prompt_parts.push(arg);
        }
    }
    if prompt_parts.is_empty() {
        usage();
    }
    let prompt_text = prompt_parts.join(" ");

    let reference_image = match &image_path {
        Some(path) => Some(tokio::fs::read(path).await?),
        None => None,
    };

    let request = request_from_prompt(&prompt_text, &config.generation, reference_image)?;

    info!(
        "Generating image on {:?} deployment",
        config.service.deployment
    );

    let api = Arc::new(HttpKlingApi::new(&config.service));
    let generator = Generator::new(api, config);

    let result = generator.generate(&request).await?;

    info!("Task ID: {} | Done", result.task_id);
    println!("{}", result.image_url);

    Ok(())
}
