//! Terminal chat loop — Lingo Tutor.
//!
//! A thin interactive front end over the library, used for manual testing:
//!
//! 1. Initialise logging.
//! 2. Load [`TutorConfig`] from disk (returns default on first run).
//! 3. Build the [`TutorOrchestrator`].
//! 4. Read lines from stdin: `:check <sentence>` runs a grammar check,
//!    anything else is a tutor turn.  Recent inputs feed the next turn's
//!    learning context.

use std::io::{BufRead, Write};

use lingo_tutor::config::TutorConfig;
use lingo_tutor::tutor::{is_error_reply, TutorOrchestrator};

const CONTEXT_WINDOW: usize = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = TutorConfig::load()?;
    log::info!(
        "loaded {} provider(s), primary '{}'",
        config.providers.len(),
        config
            .providers
            .first()
            .map(|p| p.name.as_str())
            .unwrap_or("<none>")
    );

    let tutor = TutorOrchestrator::from_config(&config);
    let mut context: Vec<String> = Vec::new();

    println!("Lingo Tutor — type a message, ':check <sentence>' to check grammar, ':quit' to exit.");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ":quit" {
            break;
        }

        if let Some(sentence) = line.strip_prefix(":check ") {
            let check = tutor.check_grammar(sentence).await;
            if check.spans.is_empty() {
                println!("No corrections found.");
            } else {
                for span in &check.spans {
                    println!("  '{}' -> '{}'", span.token, span.suggestion);
                }
                println!("Corrected: {}", check.corrected);
            }
            continue;
        }

        let reply = tutor.ask(line, &context, None).await;
        if is_error_reply(&reply) {
            eprintln!("{reply}");
            continue;
        }
        println!("{reply}");

        context.push(line.to_string());
        if context.len() > CONTEXT_WINDOW {
            context.remove(0);
        }
    }

    Ok(())
}
