//! litmin - minify HTML and CSS inside tagged template literals

mod config;
mod run;

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use eyre::Result;
use facet::Facet;
use facet_args as args;
use litmin::Transformer;
use owo_colors::OwoColorize;

/// Minify `html` and `css` tagged templates in JavaScript and TypeScript files
#[derive(Facet, Debug)]
struct Args {
    /// Options file (defaults to `.config/litmin.yaml` in the nearest ancestor)
    #[facet(args::named, default)]
    config: Option<String>,

    /// Write results back to the files, with a `.map` next to each
    #[facet(args::named, args::short = 'w')]
    write: bool,

    /// Files or directories to process
    #[facet(args::positional, default)]
    paths: Vec<String>,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let args_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    facet_args::from_slice(&args_refs).map_err(|e| {
        eprintln!("{:?}", miette::Report::new(e));
        "Failed to parse arguments".to_string()
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("litmin=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            return Ok(ExitCode::FAILURE);
        }
    };
    if args.paths.is_empty() {
        args.paths.push(".".to_string());
    }

    let options = config::load_options(args.config.as_deref())?;
    let transformer = Arc::new(Transformer::new(options));

    let files = run::collect_files(&args.paths, &transformer);
    tracing::debug!("Processing {} files", files.len());

    let results = run::process_files(transformer, files, args.write).await;

    let mut failed = 0usize;
    let mut rewritten = 0usize;
    let mut saved = 0usize;
    for result in &results {
        match result {
            Ok(report) => {
                let Some(after) = report.after else {
                    continue;
                };
                rewritten += 1;
                saved += report.before - after;
                println!(
                    "{} {} ({} -> {} bytes)",
                    "minified".green(),
                    report.path,
                    report.before,
                    after
                );
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: {:?}", "error".red().bold(), e);
            }
        }
    }

    let verb = if args.write { "rewrote" } else { "would rewrite" };
    println!(
        "{} {} of {} files, {} bytes saved",
        verb.bold(),
        rewritten,
        results.len(),
        saved
    );

    if failed > 0 {
        eprintln!("{}", format!("{failed} files failed").red());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
