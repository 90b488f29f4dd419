use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use chrono::Local;
use pilot_logging::{pilot_info, pilot_warn};
use searchpilot_core::{update, AppState, Msg, Notice, Severity};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui::input::{Command, LineReader, HELP};
use super::ui::render;
use super::{logging, persistence};

/// Everything the console loop reacts to, from stdin or from the engine.
#[derive(Debug)]
pub enum ConsoleEvent {
    Dispatch(Msg),
    Show,
    Help,
    /// Text for the user that does not go through state (parse errors, hints).
    Print(String),
    Quit,
}

pub fn run_console() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    logging::initialize(config.log_destination, &config.state_dir);
    pilot_info!("SearchPilot console starting against {}", config.client.base_url);

    let (event_tx, event_rx) = mpsc::channel::<ConsoleEvent>();
    let runner = EffectRunner::new(&config.client, config.state_dir.clone(), event_tx.clone())
        .context("failed to start the engine")?;
    spawn_input_thread(event_tx).context("failed to start the input reader")?;

    println!(
        "SearchPilot console, executor at {}. Type 'help' for commands.",
        config.client.base_url
    );

    let mut console = Console::new(runner);
    console.dispatch(Msg::RestorePreferences(persistence::load_preferences(
        &config.state_dir,
    )));
    console.dispatch(Msg::Opened);

    while let Ok(event) = event_rx.recv() {
        match event {
            ConsoleEvent::Dispatch(msg) => console.dispatch(msg),
            ConsoleEvent::Show => print!("{}", render::full(&console.state.view())),
            ConsoleEvent::Help => println!("{HELP}"),
            ConsoleEvent::Print(text) => println!("{text}"),
            ConsoleEvent::Quit => break,
        }
        let _ = io::stdout().flush();
    }

    pilot_info!("SearchPilot console exiting");
    Ok(())
}

struct Console {
    state: AppState,
    runner: EffectRunner,
    last_summary: String,
}

impl Console {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            last_summary: String::new(),
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.run(effects);

        if let Some(notice) = state.take_notice() {
            print_notice(&notice);
        }
        if state.consume_dirty() {
            let line = render::summary(&state.view());
            if line != self.last_summary {
                println!("{line}");
                self.last_summary = line;
            }
        }
        self.state = state;
    }
}

fn print_notice(notice: &Notice) {
    let stamp = Local::now().format("%H:%M:%S");
    match notice.severity {
        Severity::Info => println!("{stamp} {}", notice.text),
        Severity::Error => println!("{stamp} error: {}", notice.text),
    }
}

fn spawn_input_thread(events: mpsc::Sender<ConsoleEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("searchpilot-input".to_string())
        .spawn(move || {
            let mut reader = LineReader::default();
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        pilot_warn!("stdin read failed: {}", err);
                        break;
                    }
                };
                let event = match reader.feed(&line) {
                    None => continue,
                    Some(Ok(Command::Dispatch(msg))) => ConsoleEvent::Dispatch(msg),
                    Some(Ok(Command::BeginEdit)) => ConsoleEvent::Print(
                        "Enter one query per line; finish with a single '.'".to_string(),
                    ),
                    Some(Ok(Command::Show)) => ConsoleEvent::Show,
                    Some(Ok(Command::Help)) => ConsoleEvent::Help,
                    Some(Ok(Command::Quit)) => ConsoleEvent::Quit,
                    Some(Err(message)) => ConsoleEvent::Print(message),
                };
                if events.send(event).is_err() {
                    return;
                }
            }
            // End of input behaves like `quit`.
            let _ = events.send(ConsoleEvent::Quit);
        })?;
    Ok(())
}
