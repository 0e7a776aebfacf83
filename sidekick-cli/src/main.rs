//! `sidekick` — chat with an agent that can reach Jira/Confluence, OCI,
//! and local code repositories through MCP tools.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sidekick_agent::{Agent, AgentConfig};
use sidekick_provider_anthropic::Anthropic;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sidekick", version, about = "AI assistant for Jira, Confluence, OCI, and code")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a chat session (interactive unless --message is given).
    Chat {
        /// Send a single message and exit.
        #[arg(long)]
        message: Option<String>,
        /// Disable every MCP server (Jira/Confluence, OCI, custom).
        #[arg(long)]
        no_mcp: bool,
        /// Disable only the Jira/Confluence group.
        #[arg(long)]
        no_atlassian: bool,
        /// Disable only the OCI group.
        #[arg(long)]
        no_oci: bool,
        /// Do not append skills to the system prompt.
        #[arg(long)]
        no_skills: bool,
        /// Disable filesystem and exploration tools.
        #[arg(long)]
        no_fs: bool,
        /// Allowed code repository root (repeatable; overrides the
        /// CODE_REPOSITORY_PATHS environment variable).
        #[arg(long = "repo-path")]
        repo_paths: Vec<PathBuf>,
        /// Model override.
        #[arg(long)]
        model: Option<String>,
        /// Override the per-message tool-iteration bound.
        #[arg(long)]
        max_iterations: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Chat {
            message,
            no_mcp,
            no_atlassian,
            no_oci,
            no_skills,
            no_fs,
            repo_paths,
            model,
            max_iterations,
        } => {
            let mut config = AgentConfig::from_env();
            if no_mcp {
                config.atlassian_enabled = false;
                config.oci_enabled = false;
                config.custom_servers.clear();
            }
            if no_atlassian {
                config.atlassian_enabled = false;
            }
            if no_oci {
                config.oci_enabled = false;
            }
            if no_skills {
                config.skills_enabled = false;
            }
            if no_fs {
                config.code_repository_paths.clear();
            } else if !repo_paths.is_empty() {
                config.code_repository_paths = repo_paths;
            }
            if let Some(model) = model {
                config.model_name = Some(model);
            }
            if let Some(max) = max_iterations {
                config.max_iterations = max;
            }

            run_chat(config, message).await
        }
    }
}

async fn run_chat(config: AgentConfig, message: Option<String>) -> ExitCode {
    for warning in config.validate() {
        eprintln!("configuration warning: {warning}");
    }
    if let Err(e) = config.provider_ready() {
        eprintln!("\nConfiguration error: {e}");
        eprintln!("\nPlease ensure you have:");
        eprintln!("1. Set ANTHROPIC_API_KEY (or chosen a supported MODEL_PROVIDER)");
        eprintln!("2. Exported the credentials for each capability you enabled");
        return ExitCode::FAILURE;
    }

    let mut provider = Anthropic::new(config.anthropic_api_key.clone());
    if let Some(model) = &config.model_name {
        provider = provider.model(model.clone());
    }

    let mut agent = match Agent::initialize(config, provider).await {
        Ok(agent) => agent,
        Err(e) => {
            eprintln!("failed to initialize agent: {e}");
            return ExitCode::FAILURE;
        }
    };

    let code = if let Some(message) = message {
        match agent.chat(&message).await {
            Ok(result) => {
                println!("{}", result.response);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        }
    } else {
        interactive_loop(&mut agent).await
    };

    agent.shutdown().await;
    code
}

async fn interactive_loop(agent: &mut Agent<Anthropic>) -> ExitCode {
    println!("sidekick — type a question, 'help' for examples, 'quit' to exit\n");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("input error: {e}");
                break;
            }
        }
        let input = line.trim();

        match input.to_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" | "q" => {
                println!("Goodbye!");
                break;
            }
            "help" => {
                print_help();
                continue;
            }
            _ => {}
        }

        match agent.chat(input).await {
            Ok(result) => {
                println!("\n{}\n", result.response);
                if result.hit_iteration_limit {
                    println!("(stopped at the tool-iteration limit)\n");
                }
            }
            Err(e) => eprintln!("\nerror: {e}\n"),
        }
    }
    ExitCode::SUCCESS
}

fn print_help() {
    println!(
        "\nExamples:\n\
         - Show me my sprint tasks\n\
         - What are my high priority bugs?\n\
         - Search Confluence for the deployment guide\n\
         - What does this repository do?\n\
         - Where is the retry logic implemented?\n\
         - List the compute instances in my compartment\n"
    );
}
