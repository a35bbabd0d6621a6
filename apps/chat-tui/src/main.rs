//! Terminal chat client for the appointment scheduling agent.
//!
//! Run with: cargo run -p chat-tui -- --base-url http://localhost:8002/api

use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Context;
use appointment_chat_gateway::{
    GatewayConfig, HttpGateway,
    config::{BASE_URL_ENV, DEFAULT_BASE_URL, TIMEOUT_ENV},
};
use appointment_chat_session::ExchangeController;
use appointment_chat_tui::{ChatAction, MessageScroll, draw, prompts};
use clap::Parser;
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type Controller = Arc<ExchangeController<HttpGateway>>;

#[derive(Debug, Parser)]
#[command(version, about = "Chat with the doctor appointment scheduling agent")]
struct Cli {
    /// Agent API root.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Give up on a request after this many seconds (default: wait forever).
    #[arg(long, env = TIMEOUT_ENV)]
    timeout_secs: Option<u64>,

    /// Write logs here; the terminal is owned by the UI.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let mut config = GatewayConfig::new(cli.base_url);
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let gateway = HttpGateway::new(config).context("invalid agent configuration")?;
    let controller = Arc::new(ExchangeController::new(gateway));
    tracing::info!(
        session_id = %controller.session_id(),
        base_url = %controller.gateway().config().base_url,
        "chat started"
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &controller);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("chat closed");
    result
}

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &Controller,
) -> anyhow::Result<()> {
    let mut scroll = MessageScroll::default();
    let mut changes = controller.subscribe();

    loop {
        // New entries pull the view back to the bottom.
        loop {
            match changes.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => scroll.follow(),
                Err(_) => break,
            }
        }

        let view = controller.view();
        terminal.draw(|f| draw(f, &view, &mut scroll))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Some(action) = ChatAction::from_event(&event::read()?) else {
            continue;
        };

        match action {
            ChatAction::Quit => return Ok(()),
            ChatAction::Insert(c) => {
                controller.push_input(c);
            }
            ChatAction::Newline => {
                controller.push_input('\n');
            }
            ChatAction::Backspace => {
                controller.pop_input();
            }
            ChatAction::Submit => spawn_exchange(controller, |c| async move {
                c.submit_pending().await;
            }),
            ChatAction::Suggest(index) => {
                if let Some(prompt) = prompts::suggested(index) {
                    spawn_exchange(controller, move |c| async move {
                        c.submit_suggested(prompt).await;
                    });
                }
            }
            ChatAction::Report => spawn_exchange(controller, |c| async move {
                c.request_report().await;
            }),
            ChatAction::Clear => spawn_exchange(controller, |c| async move {
                c.clear().await;
            }),
            ChatAction::ScrollUp(n) => scroll.up(n),
            ChatAction::ScrollDown(n) => scroll.down(n),
        }
    }
}

/// Run a controller operation off the UI loop so the screen keeps drawing
/// while the agent answers.
fn spawn_exchange<F, Fut>(controller: &Controller, op: F)
where
    F: FnOnce(Controller) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(op(Arc::clone(controller)));
}
