use clap::Args;
use physfocus_core::chat::top_sources;
use physfocus_core::{Config, DoubtClient};

/// Sources printed under an answer.
pub const SHOWN_SOURCES: usize = 3;

#[derive(Args)]
pub struct AskArgs {
    /// The question, e.g. "Formula for angular momentum?"
    #[arg(required = true, num_args = 1..)]
    question: Vec<String>,
    /// Print the reply as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: AskArgs) -> Result<(), Box<dyn std::error::Error>> {
    let question = args.question.join(" ");
    let question = question.trim();
    if question.is_empty() {
        return Err("question is empty".into());
    }

    let config = Config::load()?;
    let client = DoubtClient::from_config(&config.chat);
    let reply = client.ask(question, &[]).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        println!("{}", reply.answer);
        for source in top_sources(&reply.sources, SHOWN_SOURCES) {
            println!("  - {} <{}>", source.title, source.uri);
        }
    }

    if !reply.ok {
        return Err("the doubt solver could not answer".into());
    }
    Ok(())
}
