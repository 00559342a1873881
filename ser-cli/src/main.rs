//! SER CLI - Emotion recognition and gait generation from the command line

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use ser_core::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "ser")]
#[command(about = "Text emotion recognition and robot gait generation", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ser.toml and SER_* environment variables)
    #[arg(short, long, global = true, env = "SER_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Override the model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Stream replies from the model
    #[arg(short, long, global = true)]
    stream: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognise the emotion of an utterance
    Emotion {
        /// Utterance text
        text: String,
    },
    /// Generate motion parameters for an utterance
    Motion {
        /// Utterance text
        text: String,
        /// Emotion name or label (defaults to normal)
        #[arg(short, long)]
        emotion: Option<Emotion>,
    },
    /// Recognise emotion, then generate a full gait command
    Gait {
        /// Utterance text
        text: String,
    },
    /// Interactive chat with the emotion recognizer
    Chat,
    /// Version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("ser {}", env!("CARGO_PKG_VERSION"));
        println!("ser-core {}", ser_core::VERSION);
        return Ok(());
    }

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Emotion { text } => {
            let mut recognizer = TextEmotionRecognizer::from_config(&config)?;
            let result = recognizer.recognize(&text, cli.stream).await?;
            print_json(&serde_json::json!({
                "emotion": result.label(),
                "name": result.emotion,
                "response": result.text,
            }))?;
        }
        Commands::Motion { text, emotion } => {
            let mut generator = MotionGenerator::from_config(&config)?;
            let motion = generator.generate(&text, emotion, cli.stream).await?;
            print_json(&motion)?;
        }
        Commands::Gait { text } => {
            let mut generator = GaitGenerator::from_config(&config)?;
            let gait = generator.generate(&text, cli.stream).await?;
            print_json(&gait)?;
        }
        Commands::Chat => chat(&config).await?,
        Commands::Version => {}
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<SerConfig> {
    let mut config = match &cli.config {
        Some(path) => SerConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SerConfig::load().context("failed to load configuration")?,
    };
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    Ok(config)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Line-oriented REPL. Replies are streamed as they arrive; the emotion tag
/// is parsed once the reply is complete.
async fn chat(config: &SerConfig) -> Result<()> {
    let mut recognizer = TextEmotionRecognizer::from_config(config)?;
    let parser = EmotionParser::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Commands: /reset, /history, /quit");
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                recognizer.reset_history();
                println!("history cleared");
                continue;
            }
            "/history" => {
                print_json(&recognizer.history())?;
                continue;
            }
            _ => {}
        }

        let client = recognizer.client_mut();
        let mut stream = client.send_stream(vec![ContentPart::text(line)]).await?;
        while let Some(chunk) = stream.next().await {
            if let Some(delta) = chunk?.delta {
                print!("{delta}");
                std::io::stdout().flush()?;
            }
        }
        let reply = stream.finish();
        println!();

        let result = parser.parse(&reply);
        println!("[{}: {}]", result.label(), result.emotion);
    }

    Ok(())
}
