mod commands;
mod state;

use commands::MailCommand;
use state::AppState;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn prompt() {
    print!("mailsort> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let state = AppState::initialize().await?;
    let reminder_task = state.spawn_reminder();
    tracing::info!("Mailsort started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            prompt();
            continue;
        }

        match commands::parse(&line) {
            Ok(MailCommand::Quit) => break,
            Ok(command) => match commands::execute(&state, command).await {
                Ok(output) if output.is_empty() => {}
                Ok(output) => println!("{}", output.trim_end()),
                Err(error) => eprintln!("error: {error:#}"),
            },
            Err(error) => {
                let _ = error.print();
            }
        }
        prompt();
    }

    if let Some(task) = reminder_task {
        task.abort();
    }
    tracing::info!("Mailsort stopped");
    Ok(())
}
