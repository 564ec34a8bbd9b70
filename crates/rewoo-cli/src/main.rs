mod config;
mod run_cmd;

use clap::{Parser, Subcommand};

use config::{CliOverrides, RewooConfig};
use run_cmd::RunOptions;

#[derive(Parser)]
#[command(
    name = "rewoo",
    about = "Answer a task by planning tool calls, running them, and synthesizing the evidence"
)]
struct Cli {
    /// Model name (overrides REWOO_MODEL env var and config file)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Chat-completions base URL (overrides REWOO_BASE_URL env var and config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a rewoo config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Plan, execute and answer a task
    Run {
        /// The task to answer (remaining words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,
        /// Print the raw plan and the evidence transcript to stderr
        #[arg(long)]
        show_plan: bool,
        /// Do not print progress lines
        #[arg(long, conflicts_with = "json")]
        quiet: bool,
        /// Print progress events as JSON lines on stderr
        #[arg(long)]
        json: bool,
    },
    /// Ask the planner for a plan and print the parsed steps without running them
    Plan {
        /// The task to plan (remaining words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,
    },
    /// List the capabilities available to plans
    Capabilities,
}

/// Execute the `rewoo init` command: write config file.
fn cmd_init(cli: &CliOverrides, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        llm: config::LlmSection {
            model: cli.model.clone(),
            base_url: cli.base_url.clone(),
            ..Default::default()
        },
        ..Default::default()
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    if let Some(model) = &cfg.llm.model {
        println!("  llm.model = {model}");
    }
    if let Some(base_url) = &cfg.llm.base_url {
        println!("  llm.base_url = {base_url}");
    }
    println!();
    println!("Set OPENAI_API_KEY (and TAVILY_API_KEY to enable search), or add the keys to the file.");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let overrides = CliOverrides {
        model: cli.model,
        base_url: cli.base_url,
    };

    match cli.command {
        Commands::Init { force } => cmd_init(&overrides, force),
        Commands::Run {
            task,
            show_plan,
            quiet,
            json,
        } => {
            let resolved = RewooConfig::resolve(&overrides)?;
            let orchestrator = run_cmd::build_orchestrator(&resolved)?;
            let options = RunOptions {
                show_plan,
                quiet,
                json,
            };
            run_cmd::run_task(orchestrator, &task.join(" "), options).await
        }
        Commands::Plan { task } => {
            let resolved = RewooConfig::resolve(&overrides)?;
            let orchestrator = run_cmd::build_orchestrator(&resolved)?;
            run_cmd::run_plan(&orchestrator, &task.join(" ")).await
        }
        Commands::Capabilities => {
            let resolved = RewooConfig::resolve(&overrides)?;
            let orchestrator = run_cmd::build_orchestrator(&resolved)?;
            run_cmd::run_capabilities(&orchestrator);
            Ok(())
        }
    }
}
