use aitools::conversation::{SlashCommand, get_help_text, parse_slash_command};
use aitools::{Config, ConversationController, ConversationUpdate, GeminiClient, Session, ToolKind};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aitools")]
#[command(version)]
#[command(about = "Calorie estimates, translations and document summaries from Gemini", long_about = None)]
struct Cli {
    /// Use this config file instead of ~/.aitools/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate calories for a meal or list of ingredients
    Calories { ingredients: Vec<String> },
    /// Detect the language of a text and translate it into English
    Translate { text: Vec<String> },
    /// Summarize a plain-text document ("-" reads stdin)
    Summarize { file: PathBuf },
    /// Interactive chat with one tool at a time
    Chat {
        /// Tool to start with (calorie, translator, pdf)
        #[arg(long, short)]
        tool: Option<ToolKind>,
    },
    /// Show the effective configuration
    Config,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "aitools=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(Commands::Config) = cli.command {
        show_config(&config);
        return Ok(());
    }

    if !config.has_api_key() {
        eprintln!(
            "⚠️  No API key configured. Set GEMINI_API_KEY or add gemini_api_key to {}",
            config.config_path().display()
        );
    }

    let generator = Arc::new(GeminiClient::new(config.clone())?);
    let mut session = Session::new(config, generator);

    match cli.command {
        None => run_chat(&mut session, None).await,
        Some(Commands::Chat { tool }) => run_chat(&mut session, tool).await,
        Some(Commands::Calories { ingredients }) => {
            session.switch_tool(ToolKind::Calorie);
            run_once(&mut session, &ingredients.join(" ")).await
        }
        Some(Commands::Translate { text }) => {
            session.switch_tool(ToolKind::Translator);
            run_once(&mut session, &text.join(" ")).await
        }
        Some(Commands::Summarize { file }) => {
            let (name, text) = read_document(&file).await?;
            println!("📄 {name}");
            if !session.submit_document(&name, &text) {
                println!("📭 The document is empty.");
                return Ok(());
            }
            render_reply(session.controller_mut()).await
        }
        Some(Commands::Config) => Ok(()),
    }
}

async fn run_once(session: &mut Session, input: &str) -> Result<()> {
    if !session.submit(input) {
        println!("📭 Nothing to send. {}", session.active_tool().placeholder());
        return Ok(());
    }
    render_reply(session.controller_mut()).await
}

/// Print the reveal as it happens, then the exchange metadata
async fn render_reply(controller: &mut ConversationController) -> Result<()> {
    let mut stdout = io::stdout();
    let mut printed = 0;

    while let Some(update) = controller.next_update().await {
        match update {
            ConversationUpdate::RevealProgress { .. } => {
                let text = controller.displayed_text();
                if text.len() > printed {
                    write!(stdout, "{}", &text[printed..])?;
                    stdout.flush()?;
                    printed = text.len();
                }
            }
            ConversationUpdate::Completed { response, metadata } => {
                if response.len() > printed {
                    write!(stdout, "{}", &response[printed..])?;
                }
                writeln!(stdout)?;
                if let (ToolKind::Translator, Some(language)) = (controller.kind(), metadata) {
                    writeln!(stdout, "🌐 Detected language: {language}")?;
                }
            }
            ConversationUpdate::Failed { response, .. } => {
                writeln!(stdout, "❌ {response}")?;
            }
        }
    }

    Ok(())
}

async fn run_chat(session: &mut Session, tool: Option<ToolKind>) -> Result<()> {
    if let Some(tool) = tool {
        session.switch_tool(tool);
    }

    println!("🚀 aitools chat. Type /help for commands.");
    announce_tool(session.active_tool());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} › ", session.active_tool().as_ref());
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        if let Some(command) = parse_slash_command(&line) {
            match command.command {
                SlashCommand::Bye => break,
                SlashCommand::Help => println!("{}", get_help_text()),
                SlashCommand::New => {
                    session.new_chat();
                    println!("✨ New chat started.");
                }
                SlashCommand::Tool => {
                    let target = match command.tool_target() {
                        Some(target) => target,
                        None if command.argument().is_some() => {
                            println!("❓ Unknown tool. Try calorie, translator or pdf.");
                            continue;
                        }
                        None => session.active_tool().next_tool(),
                    };
                    if session.switch_tool(target) {
                        announce_tool(target);
                    }
                }
                SlashCommand::History => {
                    let conversation = session.controller().conversation();
                    if conversation.is_empty() {
                        println!("📭 Nothing here yet.");
                    } else {
                        print!("{}", conversation.transcript());
                    }
                }
                SlashCommand::File => {
                    let Some(path) = command.argument() else {
                        println!("Usage: /file <path>");
                        continue;
                    };
                    match read_document(Path::new(path)).await {
                        Ok((name, text)) => {
                            if session.submit_document(&name, &text) {
                                println!("📄 {name}");
                                render_interruptible(session).await?;
                            } else {
                                println!("📭 {name} is empty.");
                            }
                        }
                        Err(e) => println!("❌ {e:#}"),
                    }
                }
            }
            continue;
        }

        if session.submit(&line) {
            render_interruptible(session).await?;
        }
    }

    println!("👋 Bye!");
    Ok(())
}

/// Render the pending reply; Ctrl-C abandons it and starts a new chat
async fn render_interruptible(session: &mut Session) -> Result<()> {
    let interrupted = tokio::select! {
        result = render_reply(session.controller_mut()) => {
            result?;
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };

    if interrupted {
        session.new_chat();
        println!("\n⏹️  Cancelled. New chat started.");
    }
    Ok(())
}

fn announce_tool(tool: ToolKind) {
    println!("🔧 {}: {}", tool.display_name(), tool.description());
    println!("   {}", tool.placeholder());
}

/// Read an already-extracted document; `-` means stdin
async fn read_document(path: &Path) -> Result<(String, String)> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read document from stdin")?;
        return Ok(("stdin".to_string(), text));
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Uploaded document".to_string());
    Ok((name, text))
}

fn show_config(config: &Config) {
    println!("⚙️  aitools configuration");
    println!("{}", "=".repeat(40));
    println!("  File:         {}", config.config_path().display());
    println!("  API URL:      {}", config.gemini_api_url);
    println!("  Model:        {}", config.gemini_model);
    println!("  API key:      {}", config.masked_api_key());
    println!("  Timeout:      {}s", config.request_timeout_secs);
    println!("  Default tool: {}", config.default_tool.as_ref());
    println!(
        "  Reveal (ms):  calorie {} / translator {} / pdf {}",
        config.reveal.calorie_ms, config.reveal.translator_ms, config.reveal.pdf_ms
    );
}
