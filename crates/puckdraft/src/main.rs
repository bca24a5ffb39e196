// Puckdraft entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Fetch season player data and build the draftable pool
// 4. Initialize the league
// 5. Create mpsc channels and spawn the app logic task
// 6. Run the console loop until quit or end of input
// 7. Cleanup on exit

use puckdraft::app;
use puckdraft::config;
use puckdraft::console::{self, Console, ConsoleAction};
use puckdraft::players::{self, CsvStatsProvider, StatsProvider};
use puckdraft::protocol::UserCommand;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Puckdraft starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, season={}, {} teams, drafting #{}",
        config.league.name,
        config.league.season,
        config.league.num_teams,
        config.league.draft_position
    );

    // 3. Fetch player data and build the pool
    let provider = CsvStatsProvider::new(config.data_paths.players.clone());
    let records = provider
        .fetch_players(&config.league.season)
        .await
        .context("failed to load player data")?;
    let pool = players::build_draft_pool(records, config.strategy.pool.max_players);
    info!("Draftable pool: {} players", pool.len());

    // 4. Initialize the league
    let mut app_state = app::AppState::new(config, pool);
    if let Err(e) = app_state.initialize_league() {
        warn!("League initialization failed: {:#}", e);
        println!("Could not initialize league: {e:#}");
    }

    // 5. Channels and app task
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, mut ui_rx) = mpsc::channel(256);

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 6. Console loop
    println!("{}", console::HELP);
    let mut console = Console::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => match console.handle_line(&line) {
                        ConsoleAction::Send(cmd) => {
                            let quit = cmd == UserCommand::Quit;
                            if cmd_tx.send(cmd).await.is_err() || quit {
                                break;
                            }
                        }
                        ConsoleAction::Print(msg) => println!("{msg}"),
                        ConsoleAction::Nothing => {}
                    },
                    Ok(None) => {
                        info!("End of input, shutting down");
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read from stdin: {}", e);
                        break;
                    }
                }
            }

            update = ui_rx.recv() => {
                match update {
                    Some(update) => {
                        if let Some(text) = console.render(update) {
                            println!("{text}");
                        }
                    }
                    None => break,
                }
            }
        }
    }

    // 7. Cleanup: closing the command channel stops the app task
    drop(cmd_tx);
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), app_handle).await;

    info!("Puckdraft shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (the terminal belongs to the console).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("puckdraft.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("puckdraft=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
