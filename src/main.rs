use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use branch_rotator::cancel::{self, CancelToken};
use branch_rotator::config::{self, Config};
use branch_rotator::preflight;
use branch_rotator::publish::ScriptPublisher;
use branch_rotator::{ui, Rotator};

#[derive(clap::Parser)]
#[command(
    name = "branch-rotator",
    version,
    about = "Switch a checkout to a randomly chosen branch and run its publish step"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Show the configured branches and exit")]
    list: bool,

    #[arg(
        long,
        help = "Pick a branch and report what would happen without changing anything"
    )]
    dry_run: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity (-v, -vv)")]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let cancel = CancelToken::new();
    cancel::install_ctrlc_handler(cancel.clone())?;

    if let Err(e) = run(&args, &cancel) {
        ui::display_error(&e.to_string());
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(args: &Args, cancel: &CancelToken) -> branch_rotator::Result<()> {
    let config = config::load_config(args.config.as_deref())?;

    if args.list {
        let branches = config.branch_list()?;
        ui::display_available_branches(branches.names());
        return Ok(());
    }

    if args.dry_run {
        return dry_run(&config);
    }

    let rotator = Rotator::from_config(&config, cancel.clone())?;
    let report = rotator.run()?;
    log::info!(
        "rotation finished: branch '{}', publish exit code {}",
        report.branch,
        report.publish_code
    );

    Ok(())
}

fn dry_run(config: &Config) -> branch_rotator::Result<()> {
    config.validate()?;
    let branches = config.branch_list()?;
    let workdir = config.resolved_checkout_path()?;
    let branch = branches.select(&mut rand::thread_rng());
    let publisher = ScriptPublisher::new(config.publish.command.as_str(), &workdir);

    ui::display_status("Dry run: nothing will be changed");
    ui::display_status(&format!(
        "Would switch {} to branch: {}",
        workdir.display(),
        branch
    ));

    let warnings = preflight::check(&workdir, branch, &publisher);
    for warning in &warnings {
        ui::display_preflight_warning(warning);
    }

    ui::display_status(&format!(
        "Would wait {} ms, then run {}",
        config.publish.settle_delay_ms,
        publisher.program().display()
    ));

    if warnings.is_empty() {
        ui::display_success("Preflight checks passed");
    }

    Ok(())
}
