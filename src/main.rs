use clap::Parser;
use miette::Result;
use qf::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Terminate quietly on a closed pipe (`qf list | head`)
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
        Commands::Init(args) => qf::cli::commands::init::run(args),
        Commands::Extract(args) => qf::cli::commands::extract::run(args, &global),
        Commands::Quote(args) => qf::cli::commands::quote::run(args, &global),
        Commands::Estimate(args) => qf::cli::commands::estimate::run(args, &global),
        Commands::List(args) => qf::cli::commands::list::run(args, &global),
        Commands::Show(args) => qf::cli::commands::show::run(args, &global),
        Commands::Refs(cmd) => qf::cli::commands::refs::run(cmd, &global),
        Commands::Config(cmd) => qf::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => qf::cli::commands::completions::run(args),
    }
}

/// RUST_LOG wins; otherwise `--verbose` means debug and the default is warn
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}
