use clap::Parser;
use miette::Result;
use rfp::cli::{Cli, Commands, GlobalOpts};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
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
    init_tracing(&global);

    match cli.command {
        Commands::New(args) => rfp::cli::commands::new::run(args, &global),
        Commands::List(args) => rfp::cli::commands::list::run(args, &global),
        Commands::Show(args) => rfp::cli::commands::show::run(args, &global),
        Commands::Edit(args) => rfp::cli::commands::edit::run(args, &global),
        Commands::Delete(args) => rfp::cli::commands::delete::run(args, &global),
        Commands::Doc(args) => rfp::cli::commands::doc::run(args, &global),
        Commands::Export(args) => rfp::cli::commands::export::run(args, &global),
        Commands::Import(args) => rfp::cli::commands::import::run(args, &global),
        Commands::Share(args) => rfp::cli::commands::share::run_share(args, &global),
        Commands::Open(args) => rfp::cli::commands::share::run_open(args, &global),
        Commands::Completions(args) => rfp::cli::commands::completions::run(args),
    }
}

/// Diagnostics go to stderr; `RFP_LOG` overrides the level picked by flags
fn init_tracing(global: &GlobalOpts) {
    let default_level = if global.verbose {
        "rfp=debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RFP_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
