use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parley::{ApiServerBuilder, Config, RequestLocale, TurnHandler, TurnInput, TurnRequest};

/// Parley - voice turn gateway for English conversation practice
#[derive(Parser)]
#[command(name = "parley", version, about)]
struct Cli {
    /// Port to listen on (overrides config)
    #[arg(long, env = "PARLEY_PORT")]
    port: Option<u16>,

    /// Path to a TOML config file
    #[arg(short, long, env = "PARLEY_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Synthesize text with the configured voice
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
        /// Output WAV file
        #[arg(short, long, default_value = "tts-test.wav")]
        output: PathBuf,
    },
    /// Run one text turn through the full pipeline
    Turn {
        /// What the user says
        text: String,
        /// Output WAV file for the spoken reply
        #[arg(short, long, default_value = "reply.wav")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,parley=info",
        1 => "info,parley=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Some(Command::TestTts { text, output }) => test_tts(&config, &text, &output).await,
        Some(Command::Turn { text, output }) => one_turn(&config, text, &output).await,
        None => serve(config).await,
    }
}

/// Build the turn handler from configured collaborators
fn turn_handler(config: &Config) -> anyhow::Result<TurnHandler> {
    Ok(TurnHandler::new(
        config.speech_recognizer()?,
        config.chat_model()?,
        config.speech_synthesizer()?,
    ))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let turn = Arc::new(turn_handler(&config)?);
    let (stt, llm, tts) = turn.backends();
    tracing::info!(stt, llm, tts, port = config.server.port, "starting parley gateway");

    ApiServerBuilder::new(turn)
        .host(config.server.host)
        .port(config.server.port)
        .rate_limit(config.server.rate_limit_rpm)
        .max_upload_bytes(config.server.max_upload_bytes)
        .build()
        .run()
        .await?;

    Ok(())
}

/// Synthesize `text` and write it to `output`
async fn test_tts(config: &Config, text: &str, output: &std::path::Path) -> anyhow::Result<()> {
    let tts = config.speech_synthesizer()?;
    println!("Synthesizing with {}: \"{text}\"", tts.name());

    let audio = tts.synthesize(text).await?;
    tokio::fs::write(output, &audio).await?;

    println!("Wrote {} bytes to {}", audio.len(), output.display());
    Ok(())
}

/// Run a single text turn with no history and write the reply audio
async fn one_turn(config: &Config, text: String, output: &std::path::Path) -> anyhow::Result<()> {
    let handler = turn_handler(config)?;

    let reply = handler
        .run(TurnRequest {
            input: TurnInput::Text(text),
            history: Vec::new(),
            locale: RequestLocale::default(),
        })
        .await?;

    tokio::fs::write(output, &reply.audio).await?;

    println!("You:       {}", reply.transcript);
    println!("Assistant: {}", reply.reply);
    println!("Wrote {} bytes to {}", reply.audio.len(), output.display());
    Ok(())
}
