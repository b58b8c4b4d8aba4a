mod cli;
mod config;
mod domain;
mod infra;
mod input;
mod workflows;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use infra::imdb::ImdbClient;
use infra::progress::ProgressStore;
use workflows::export::ReportWriter;
use workflows::pipeline::{self, PipelineOptions};
use workflows::prompt;

fn main() {
    let cli = Cli::parse();

    let mut clog = colog::default_builder();
    clog.filter(
        None,
        if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        },
    );
    clog.init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = config::load_settings()?;

    let entries = input::load_titles(&cli.input)?;
    println!("Found {} TV shows to process", entries.len());

    let opts = PipelineOptions {
        delay: cli.delay.or(settings.delay).unwrap_or(0.0),
        max_retries: cli.max_retries.or(settings.max_retries).unwrap_or(3),
        ..PipelineOptions::default()
    };
    if opts.delay > 0.0 {
        println!("Using {}s delay between requests", opts.delay);
    }

    let mut client = ImdbClient::new();
    let writer = ReportWriter::new(&cli.output);
    let store = ProgressStore::new(&cli.output);

    let auto_resume = cli.resume;
    let auto_restart = cli.restart;
    let mut decide = move |position: u64| {
        if auto_resume {
            true
        } else if auto_restart {
            false
        } else {
            prompt::confirm_resume(position)
        }
    };

    let summary = pipeline::run(&entries, &mut client, &writer, &store, &mut decide, &opts)?;

    println!();
    println!(
        "Done: {}/{} shows exported, {} failed",
        summary.succeeded, summary.total, summary.failed
    );
    println!("Output CSV: {}", cli.output.display());
    if summary.failed > 0 {
        println!(
            "Failure details: {}",
            config::failed_path(&cli.output).display()
        );
        println!(
            "Failed titles: {}",
            config::failed_list_path(&cli.output).display()
        );
    }

    Ok(())
}
