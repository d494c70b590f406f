//! Interactive shell entry point
//!
//! Reads user turns from stdin, forwards them to the agent, and prints the
//! replies. Exits on case-insensitive "exit"/"quit" or end of input.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use support_agent::context::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let ctx = AppContext::from_env()
        .context("LLM is not configured. Set up LLM_API_KEY and try again.")?;

    let mut agent = ctx.assemble_agent();

    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("User: ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        match agent.run(input).await {
            Ok(reply) => println!("Agent: {}", reply),
            Err(e) => warn!("Turn failed: {}", e),
        }
    }

    Ok(())
}
