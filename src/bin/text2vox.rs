//! text2vox — terminal front end for the speech request controller
//!
//! Usage:
//!   text2vox models                                   List voice models
//!   text2vox speak [--model <sel>] [--out <path>] TEXT Synthesize once and save
//!   text2vox interactive                              Line-by-line session

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};

use text2vox::config::MODELS_FILE_VAR;
use text2vox::{backdrop, Config, ErrorKind, ModelRegistry, RequestState, SpeechController};

#[derive(Parser)]
#[command(name = "text2vox", version, about = "Convert text to speech with hosted TTS models")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available voice models
    Models,
    /// Convert TEXT (or stdin when TEXT is "-") and save the audio
    Speak {
        /// Model by 1-based index, name, or endpoint
        #[arg(short, long)]
        model: Option<String>,
        /// Output file (default: ./text2vox-audio.wav)
        #[arg(short, long)]
        out: Option<PathBuf>,
        text: String,
    },
    /// Type lines to convert; `:help` lists commands
    Interactive,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            if let Some(err) = e.downcast_ref::<text2vox::Error>() {
                if err.kind() == ErrorKind::Configuration {
                    eprintln!("{}", err.user_message());
                    eprintln!("  {}", err);
                    return ExitCode::from(2);
                }
            }
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Models => {
            list_models(&load_registry()?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Speak { model, out, text } => {
            let controller = SpeechController::new(&Config::from_env()?)?;
            if let Some(selector) = model {
                controller.select(&selector)?;
            }
            let text = if text == "-" {
                let mut buf = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut buf)
                    .await
                    .context("reading text from stdin")?;
                buf
            } else {
                text
            };

            let state = submit_with_indicator(&controller, &text).await;
            if !report(&state) {
                return Ok(ExitCode::from(1));
            }
            let saved = match out {
                Some(path) => controller.download_to(path).await?,
                None => controller.download(".").await?,
            };
            if let Some(path) = saved {
                println!("Saved {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Interactive => {
            let controller = SpeechController::new(&Config::from_env()?)?;
            interactive(&controller).await?;
            controller.close();
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Model list without requiring a credential.
fn load_registry() -> text2vox::Result<ModelRegistry> {
    match std::env::var(MODELS_FILE_VAR) {
        Ok(path) if !path.trim().is_empty() => ModelRegistry::from_path(path.trim()),
        _ => Ok(ModelRegistry::builtin()),
    }
}

fn list_models(models: &ModelRegistry) {
    for (i, model) in models.iter().enumerate() {
        println!("{:>2}. {} [{}]", i + 1, model.name, model.language);
        println!("    {}", model.description);
        println!("    {}", model.endpoint);
    }
}

const HELP: &str = r#"Type text and press enter to convert it.
Commands:
    :models              List voice models
    :model <n|name>      Select a voice model
    :download [dir]      Save the last audio as text2vox-audio.wav
    :state               Show the current request state
    :quit                Leave"#;

async fn interactive(controller: &SpeechController) -> anyhow::Result<()> {
    println!("text2vox {} (model: {})", env!("CARGO_PKG_VERSION"), controller.selected_model().name);
    println!(":help for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let Some(command) = line.strip_prefix(':') else {
            let state = submit_with_indicator(controller, &line).await;
            report(&state);
            continue;
        };

        let (name, arg) = match command.trim().split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command.trim(), ""),
        };
        match name {
            "quit" | "q" | "exit" => break,
            "help" | "h" => println!("{}", HELP),
            "models" => list_models(controller.models()),
            "model" => match controller.select(arg) {
                Ok(model) => println!("Selected {}", model.name),
                Err(_) => println!("No model matches '{}'. Try :models", arg),
            },
            "download" => {
                let dir = if arg.is_empty() { "." } else { arg };
                match controller.download(dir).await {
                    Ok(Some(path)) => println!("Saved {}", path.display()),
                    Ok(None) => println!("Nothing to download yet."),
                    Err(e) => println!("Could not save audio: {}", e),
                }
            }
            "state" => println!("{}", describe(&controller.state())),
            other => println!("Unknown command :{}. Try :help", other),
        }
    }
    Ok(())
}

/// Awaits the submission, animating the backdrop bars on a terminal.
async fn submit_with_indicator(controller: &SpeechController, text: &str) -> RequestState {
    let submit = controller.submit(text);
    if !std::io::stderr().is_terminal() {
        return submit.await;
    }

    tokio::pin!(submit);
    let started = Instant::now();
    let mut tick = tokio::time::interval(Duration::from_millis(80));
    let state = loop {
        tokio::select! {
            state = &mut submit => break state,
            _ = tick.tick() => {
                let frame = backdrop::frame_at(started.elapsed());
                eprint!("\r{} Converting...", backdrop::render_bars(&frame, 32));
            }
        }
    };
    eprint!("\r\x1b[2K");
    state
}

/// Prints the outcome; true on success.
fn report(state: &RequestState) -> bool {
    match state {
        RequestState::Succeeded(_) => {
            println!("{}", describe(state));
            true
        }
        _ => {
            eprintln!("{}", describe(state));
            false
        }
    }
}

fn describe(state: &RequestState) -> String {
    match state {
        RequestState::Idle => "Idle".to_string(),
        RequestState::InFlight { model, .. } => format!("Converting with {}...", model),
        RequestState::Succeeded(audio) => format!(
            "Audio ready: {} bytes ({}) at {}",
            audio.byte_len(),
            audio.format().mime_type(),
            audio.locator()
        ),
        RequestState::Failed(failure) => failure.message().to_string(),
    }
}
