mod cmd;
mod output;
mod root;
mod templates;

use clap::{Parser, Subcommand};
use cmd::StepOpts;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "handoff",
    about = "Plan, execute, commit, and fix in steps that hand off through Markdown artifacts",
    version,
    propagate_version = true
)]
struct Cli {
    /// Repository root (default: auto-detect from .handoff/ or .git/)
    #[arg(long, global = true, env = "HANDOFF_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log subprocess calls and ledger writes
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .handoff/, artifact directories, and slash-command templates
    Init {
        /// Overwrite existing slash-command templates
        #[arg(long)]
        force: bool,

        /// Also install the templates into ~/.claude/commands
        #[arg(long)]
        user: bool,
    },

    /// Summarize the repository for an agent starting a session
    Prime,

    /// Write plans/<feature>.md
    Planning {
        feature: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Ordered implementation task (repeatable)
        #[arg(long = "task", value_name = "TASK")]
        tasks: Vec<String>,

        /// Validation shell command (repeatable)
        #[arg(long = "validate", value_name = "COMMAND")]
        validation: Vec<String>,
    },

    /// Load a plan, optionally validate, and record the execution
    Execute {
        feature: String,

        #[command(flatten)]
        opts: StepOpts,
    },

    /// Stage and commit changes with a derived conventional message
    Commit {
        /// Paths to commit (default: every change)
        files: Vec<String>,

        /// Use this message instead of deriving one
        #[arg(long, short = 'm')]
        message: Option<String>,
    },

    /// Fetch an issue and write docs/rca/issue-<id>.md
    Rca {
        /// Issue number, with or without a leading '#'
        issue: String,
    },

    /// Load an RCA, optionally validate, and record the fix
    ImplementFix {
        /// Issue number, with or without a leading '#'
        issue: String,

        #[command(flatten)]
        opts: StepOpts,
    },

    /// Show every plan and RCA with its pipeline position
    Status,

    /// Print a step's slash-command template with $ARGUMENTS filled in
    Prompt {
        /// prime, planning, execute, commit, rca, or implement-fix
        step: String,

        argument: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    tracing::debug!(root = %root.display(), "resolved root");

    let result = match cli.command {
        Commands::Init { force, user } => cmd::init::run(&root, force, user, cli.json),
        Commands::Prime => cmd::prime::run(&root, cli.json),
        Commands::Planning {
            feature,
            title,
            description,
            tasks,
            validation,
        } => cmd::planning::run(
            &root,
            &feature,
            cmd::planning::PlanningArgs {
                title,
                description,
                tasks,
                validation,
            },
            cli.json,
        ),
        Commands::Execute { feature, opts } => cmd::execute::run(&root, &feature, opts, cli.json),
        Commands::Commit { files, message } => cmd::commit::run(&root, files, message, cli.json),
        Commands::Rca { issue } => cmd::rca::run(&root, &issue, cli.json),
        Commands::ImplementFix { issue, opts } => {
            cmd::implement_fix::run(&root, &issue, opts, cli.json)
        }
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Prompt { step, argument } => {
            cmd::prompt::run(&step, argument.as_deref(), cli.json)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
