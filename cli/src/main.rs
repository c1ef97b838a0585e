//! xagent binary: plan, research, draw and post from the command line.
//!
//! Subcommands: `post` (full workflow), `ask` (function-calling question), `plan` (planner
//! only), `tools` (list tool specs).

mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use env_config::{AgentRole, AppConfig};
use xagent::{WorkflowPrompts, WorkflowRunner};

#[derive(Parser, Debug)]
#[command(name = "xagent")]
#[command(about = "xagent: plan, research, draw and post to X from the command line")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Thread id for an in-memory checkpoint; it lasts only for this process, so every invocation starts fresh
    #[arg(long, value_name = "ID", global = true)]
    thread_id: Option<String>,

    /// Never post; log the composed text and return a dry-run id
    #[arg(long, global = true)]
    dry_run: bool,

    /// Directory with a workflow.yaml overriding the built-in prompts (default: PROMPTS_DIR)
    #[arg(long, value_name = "DIR", global = true)]
    prompts_dir: Option<PathBuf>,

    /// Verbose logging (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Run coordinator → planner → research_team → poster and print the outcome
    Post {
        /// What to post about
        #[arg(required = true, num_args = 1..)]
        request: Vec<String>,
        /// Also print the composed text and the plan
        #[arg(long)]
        show_text: bool,
    },
    /// Answer one question, calling weather, cylinder or search tools as needed
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Print the plan for a request as JSON
    Plan {
        #[arg(required = true, num_args = 1..)]
        request: Vec<String>,
    },
    /// List the tools bound to the model
    Tools {
        /// JSON array of full specs instead of a table
        #[arg(long)]
        json: bool,
    },
}

async fn runner(
    args: &Args,
    config: &AppConfig,
    prompts: WorkflowPrompts,
) -> Result<WorkflowRunner, cli::BuildError> {
    cli::workflow_runner(config, prompts, args.dry_run, args.thread_id.is_some()).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if let Err(e) = env_config::load_and_apply("xagent", None) {
        eprintln!("warning: {}", e);
    }
    logging::init(args.verbose)?;

    let config = AppConfig::from_env()?;
    let prompts = WorkflowPrompts::load(args.prompts_dir.as_deref())?;

    match &args.cmd {
        Command::Post { request, show_text } => {
            let request = request.join(" ");
            let runner = runner(&args, &config, prompts).await?;
            let state = runner.run(&request, args.thread_id.as_deref()).await?;
            if *show_text {
                if let Some(plan) = &state.plan {
                    eprintln!("{}", serde_json::to_string_pretty(plan)?);
                }
                if let Some(text) = &state.composed {
                    eprintln!("---\n{}\n---", text);
                }
            }
            let output = state.final_output.unwrap_or_default();
            println!("{}", output);
            if state.publish_id.is_none() {
                std::process::exit(1);
            }
        }
        Command::Ask { question } => {
            let agent = cli::ask_agent(&config, &prompts).await?;
            let outcome = agent.answer_with_tools(&question.join(" ")).await;
            if outcome.exhausted {
                tracing::warn!(rounds = outcome.rounds, "answer is best effort");
            }
            println!("{}", outcome.text);
        }
        Command::Plan { request } => {
            // planner only; no tool model needed
            let llm = cli::plain_llm(&config, AgentRole::Planner)?;
            let planner = xagent::workflow::PlannerNode::new(
                llm,
                prompts.planner.clone(),
                config.timeouts.model,
            );
            let plan = planner.plan(request.join(" ").trim()).await;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Tools { json } => {
            let specs = cli::tool_specs(&config).await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&specs)?);
            } else {
                print!("{}", cli::format_table(&specs));
            }
        }
    }
    Ok(())
}
