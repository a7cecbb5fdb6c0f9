use clap::{CommandFactory, Parser};
use htmlshot::cli::Cli;
use htmlshot::{RenderJob, Renderer};
use log::LevelFilter;

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .filter_module("headless_chrome", LevelFilter::Warn)
        .format_target(false)
        .init();
}

async fn run(job: RenderJob) -> htmlshot::Result<()> {
    let renderer = Renderer::new(job.options.clone()).await?;
    let rendered = renderer.render(job).await;
    let closed = renderer.close().await;
    let report = rendered?;
    closed?;

    println!("\nSuccessfully exported!");
    println!("   File: {}", report.path.display());
    println!("   Size: {}", report.human_size());
    println!(
        "   Resolution: {}x ({}px effective width)",
        report.scale, report.effective_width
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let request = match cli.into_request() {
        Ok(r) => r,
        Err(e) => {
            let _ = Cli::command().print_help();
            eprintln!("\nError: {}", e);
            std::process::exit(1);
        }
    };

    let job = match request.resolve() {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("Input:  {}", job.source.display());
    println!("Output: {}", job.destination.display());
    println!(
        "Scale:  {}x | Width: {}px",
        job.options.scale, job.options.width
    );

    if let Err(e) = run(job).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
