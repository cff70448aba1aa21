//! CLI entry point: wire the collaborators together, run one task and
//! print the result.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use browser_agent::chrome::ChromeSession;
use browser_agent::llm::LlmPlanner;
use browser_agent::page::PagePerception;
use browser_agent::{AgentConfig, Task, TaskOrchestrator};

#[derive(Parser, Debug)]
#[command(name = "browser-agent", about = "AI browser automation agent")]
struct Cli {
    /// The task to perform, in natural language.
    task: Vec<String>,

    /// Step budget before forced termination.
    #[arg(long, default_value_t = 50)]
    max_steps: u32,

    /// Enable periodic vision analysis of screenshots.
    #[arg(long)]
    vision: bool,

    /// Run the browser headless.
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let goal = cli.task.join(" ");
    if goal.trim().is_empty() {
        anyhow::bail!("no task given; try: browser-agent \"search for rust tutorials\"");
    }

    let config = AgentConfig::new().max_steps(cli.max_steps).vision(cli.vision);

    let planner = Arc::new(LlmPlanner::from_env().context("planner setup failed")?);

    // Launching Chrome can take a while; keep it off the async runtime.
    let headless = cli.headless;
    let session = tokio::task::spawn_blocking(move || ChromeSession::launch(headless))
        .await
        .context("browser launch panicked")??;

    let driver = Arc::new(session.driver(config.timeout_ms));
    let perception = Arc::new(PagePerception::new(driver.clone()));

    let orchestrator = TaskOrchestrator::new(config, driver, perception, planner);
    let result = orchestrator.run(Task::new(goal)).await?;

    println!("\n{}", "=".repeat(50));
    println!("TASK EXECUTION RESULT");
    println!("{}", "=".repeat(50));
    println!("Task: {}", result.task.goal);
    println!("Completed: {}", result.completed);
    println!("Steps: {}", result.steps_taken);
    println!("Final URL: {}", result.final_url);
    println!("Confidence: {}", result.verification.confidence);
    println!("{}", "=".repeat(50));

    // The Chrome session closes when `session` drops here.
    Ok(())
}
