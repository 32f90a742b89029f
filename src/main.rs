use clap::Parser;
use passlock::cli::commands::add::AddArgs;
use passlock::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    passlock::cli::init_tracing();

    let result = match cli.command {
        Commands::Init => passlock::cli::commands::init::execute(&cli),
        Commands::Info => passlock::cli::commands::info::execute(&cli),
        Commands::List { ref tag } => passlock::cli::commands::list::execute(&cli, tag.as_deref()),
        Commands::Search { ref query } => passlock::cli::commands::search::execute(&cli, query),
        Commands::Show {
            ref id,
            reveal,
            copy,
        } => passlock::cli::commands::show::execute(&cli, id, reveal, copy),
        Commands::Add {
            ref name,
            ref username,
            ref password,
            generate,
            ref url,
            ref notes,
            ref tags,
        } => passlock::cli::commands::add::execute(
            &cli,
            &AddArgs {
                name,
                username,
                password: password.as_deref(),
                generate,
                url: url.as_deref(),
                notes: notes.as_deref(),
                tags,
            },
        ),
        Commands::Delete { ref id, force } => {
            passlock::cli::commands::delete::execute(&cli, id, force)
        }
        Commands::Shell => passlock::cli::commands::shell::execute(&cli),
        Commands::Generate { length } => passlock::cli::commands::generate::execute(length),
        Commands::Strength { ref password } => {
            passlock::cli::commands::strength::execute(password.as_deref())
        }
        #[cfg(feature = "audit-log")]
        Commands::Audit { last } => passlock::cli::commands::audit_cmd::execute(&cli, last),
        #[cfg(not(feature = "audit-log"))]
        Commands::Audit { .. } => Err(passlock::errors::PasslockError::AuditError(
            "this build has no audit log (enable the `audit-log` feature)".into(),
        )),
        Commands::Completions { ref shell } => {
            passlock::cli::commands::completions::execute(shell)
        }
    };

    if let Err(e) = result {
        passlock::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
