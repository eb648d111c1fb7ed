use clap::Parser;
use miette::Result;
use tracing_subscriber::{fmt, EnvFilter};

use inspcalc::cli::{commands, Cli, Commands};

/// Diagnostics go to stderr; RUST_LOG overrides the level from `-v`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "inspcalc=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time()
        .try_init();
}

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(global.verbose);

    match cli.command {
        Commands::Calc(args) => commands::calc::run(args, &global),
        Commands::Plan(cmd) => commands::plan::run(cmd, &global),
        Commands::History(cmd) => commands::history::run(cmd, &global),
        Commands::Access(args) => commands::access::run(args, &global),
        Commands::Tables(args) => commands::tables::run(args, &global),
        Commands::Config(cmd) => commands::config::run(cmd, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
