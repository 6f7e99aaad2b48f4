use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use mentora_backend::core::config::AppPaths;
use mentora_backend::extract::UploadedDocument;
use mentora_backend::logging;
use mentora_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths);
    let state = AppState::initialize(paths).await?;

    let session_id = uuid::Uuid::new_v4().to_string();
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    tracing::info!("session {} started", session_id);

    println!("Mentora ready. Ask anything; :help lists commands.");

    let recent = state.history.recent(&today, 3).await.unwrap_or_default();
    for turn in &recent {
        println!("You: {}", turn.question);
        println!("Mentora: {}\n", turn.answer);
    }

    let stdin = io::stdin();
    let mut attached: Option<UploadedDocument> = None;

    loop {
        match &attached {
            Some(doc) => print!("[{}] > ", doc.name),
            None => print!("> "),
        }
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        match line {
            "" => continue,
            ":q" | ":quit" => break,
            ":help" => {
                println!(":attach <path>  use a file as context for following questions");
                println!(":detach         drop the attached file");
                println!(":clear          delete today's history");
                println!(":quit           exit");
            }
            ":detach" => {
                attached = None;
                println!("attachment dropped");
            }
            ":clear" => {
                let cleared = state.history.clear_day(&today).await?;
                println!("cleared {} turns", cleared);
            }
            line if line.starts_with(":attach ") => {
                let path = line[":attach ".len()..].trim();
                match load_attachment(path) {
                    Ok(doc) => {
                        println!("attached {} ({:?})", doc.name, doc.format);
                        attached = Some(doc);
                    }
                    Err(err) => println!("could not attach: {:#}", err),
                }
            }
            question => {
                let turn = state
                    .orchestrator
                    .answer(question, attached.as_ref())
                    .await;
                println!("\n{}\n", turn.answer);

                if let Err(err) = state.history.record(&today, &session_id, &turn).await {
                    tracing::warn!("failed to record turn: {}", err);
                }
            }
        }
    }

    Ok(())
}

fn load_attachment(path: &str) -> anyhow::Result<UploadedDocument> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path))?;
    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string();
    Ok(UploadedDocument::from_bytes(name, bytes))
}
