//! rpy-translate - Machine translation for Ren'Py scripts
//!
//! Entry point: sets up logging, loads configuration and either runs the
//! requested command or walks the user through the interactive menu.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use rpy_translate::cli::{Args, Commands};
use rpy_translate::config::{Config, DEFAULT_CONFIG_FILE};
use rpy_translate::language::TargetLanguage;
use rpy_translate::prompt::{self, MenuMode};
use rpy_translate::script::TranslationStats;
use rpy_translate::translate::TranslatorFactory;
use rpy_translate::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Some(Commands::Languages) => {
            println!("{:<5} {:<12} {:<6}", "Key", "Language", "Code");
            println!("{}", "-".repeat(25));
            for lang in TargetLanguage::ALL {
                println!("{:<5} {:<12} {:<6}", lang.menu_key(), lang.identifier(), lang.code());
            }
        }
        Some(Commands::File { input, lang, replace_translate, output }) => {
            let target = lang.unwrap_or(config.output.default_language);
            let workflow = prepare_workflow(config).await?;
            let output = output.unwrap_or_else(|| workflow.single_output_path(target));
            run_single(&workflow, &input, &output, target, replace_translate).await?;
        }
        Some(Commands::Batch { input_dir, lang, replace_translate, output_dir }) => {
            let target = lang.unwrap_or(config.output.default_language);
            let output_root = output_dir.unwrap_or_else(|| config.output.directory.clone());
            let workflow = prepare_workflow(config).await?;
            run_batch(&workflow, &input_dir, &output_root, target, replace_translate).await?;
        }
        None => {
            let choices = {
                let stdin = std::io::stdin();
                let mut reader = stdin.lock();
                let mut writer = std::io::stdout();
                prompt::run_menu(&mut reader, &mut writer, config.output.default_language)?
            };

            let output_root = config.output.directory.clone();
            let workflow = prepare_workflow(config).await?;
            match choices.mode {
                MenuMode::Batch => {
                    run_batch(&workflow, Path::new("."), &output_root, choices.target, choices.rewrite_directive).await?;
                }
                MenuMode::SingleFile(input) => {
                    let output = workflow.single_output_path(choices.target);
                    run_single(&workflow, &input, &output, choices.target, choices.rewrite_directive).await?;
                }
            }
        }
    }

    Ok(())
}

async fn prepare_workflow(config: Config) -> Result<Workflow> {
    TranslatorFactory::check_availability(&config.translate).await?;
    Ok(Workflow::new(config)?)
}

async fn run_single(
    workflow: &Workflow,
    input: &Path,
    output: &Path,
    target: TargetLanguage,
    rewrite_directive: bool,
) -> Result<()> {
    let started = Instant::now();
    let stats = workflow.process_file(input, output, target, rewrite_directive).await?;

    println!("\nTranslation finished in {:.2} seconds", started.elapsed().as_secs_f64());
    print_summary(&stats);
    if input.is_file() {
        println!("Output: {}", output.display());
    }
    Ok(())
}

async fn run_batch(
    workflow: &Workflow,
    input_dir: &Path,
    output_root: &Path,
    target: TargetLanguage,
    rewrite_directive: bool,
) -> Result<()> {
    let started = Instant::now();
    let stats = workflow.process_directory(input_dir, output_root, target, rewrite_directive).await?;

    println!("\nBatch translation finished in {:.2} seconds", started.elapsed().as_secs_f64());
    print_summary(&stats);
    println!("Output directory: {}", output_root.join(target.identifier()).display());
    Ok(())
}

fn print_summary(stats: &TranslationStats) {
    println!("Translated lines:             {}", stats.translated_lines);
    println!("Characters in source text:    {}", stats.source_chars);
    println!("Characters in translations:   {}", stats.translated_chars);
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".rpy-translate").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "rpy-translate.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("rpy-translate.log").display());

    Ok(())
}
