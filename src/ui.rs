// UI layer: the interactive terminal flow. Screens come from `view`, the
// menu is a `dialoguer::Select` over the actions the screen exposes, and
// the analysis runs on a worker thread while an `indicatif` spinner runs.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::{cursor, execute, terminal};
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::image::{image_extensions, SelectedImage};
use crate::session::Session;
use crate::typewriter::TypewriterPresenter;
use crate::view::{render, Action, Screen};
use crate::worker::{AnalysisOutcome, AnalysisWorker};

/// Main interactive loop. Runs until the user picks "Keluar".
pub fn main_menu(api: ApiClient, config: &AppConfig) -> Result<()> {
    let mut session = Session::new();
    let mut presenter = TypewriterPresenter::new(config.reveal_interval);
    // One channel for every request so a late reply for an abandoned
    // image still reaches the session's staleness check.
    let (outcomes_tx, outcomes_rx) = mpsc::channel::<AnalysisOutcome>();
    let mut notice: Option<String> = None;

    loop {
        draw(&session, presenter.revealed())?;
        if let Some(message) = notice.take() {
            println!("{message}");
        }

        let screen = Screen::from_session(&session, presenter.revealed());
        let actions = screen.actions();
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        // `Select` shows a keyboard-navigable list in the terminal.
        let selection = Select::new().items(&labels).default(0).interact()?;

        match actions[selection] {
            Action::Scan | Action::ChangePhoto => {
                notice = pick_image(&mut session)?;
                presenter.clear();
            }
            Action::Analyze => {
                run_analysis(&api, &mut session, &outcomes_tx, &outcomes_rx)?;
                play_reveal(&session, &mut presenter, config.animate)?;
            }
            Action::Cancel | Action::ScanAnother => {
                session.reset();
                presenter.clear();
            }
            Action::Quit => break,
        }
    }
    Ok(())
}

/// Analyze a single photo without the menu and print the result screen.
pub fn analyze_once(api: &ApiClient, config: &AppConfig, path: &Path) -> Result<()> {
    let mut session = Session::new();
    let image = SelectedImage::open(path)?;
    session.select_image(image);

    let spinner = spinner("Sedang Menganalisis...");
    session.start_analysis(api);
    spinner.finish_and_clear();

    if let Some(message) = session.error() {
        anyhow::bail!("{message}");
    }

    let mut presenter = TypewriterPresenter::new(config.reveal_interval);
    play_reveal(&session, &mut presenter, config.animate)
}

/// Clear the terminal and print the frame for the current state.
fn draw(session: &Session, revealed: &str) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )?;
    let frame = render(&Screen::from_session(session, revealed));
    stdout.write_all(frame.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Ask for a photo, via the native dialog or a typed path. Returns a
/// message to show when the chosen file was refused.
fn pick_image(session: &mut Session) -> Result<Option<String>> {
    let sources = ["Pilih dari folder", "Ketik path file", "Kembali"];
    let source = Select::new().items(&sources).default(0).interact()?;
    let path = match source {
        0 => {
            let start = dirs::picture_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."));
            rfd::FileDialog::new()
                .set_title("Pilih foto struk")
                .add_filter("Gambar", image_extensions())
                .set_directory(start)
                .pick_file()
        }
        1 => {
            let typed: String = Input::new()
                .with_prompt("Path foto struk")
                .allow_empty(true)
                .interact_text()?;
            let typed = typed.trim();
            (!typed.is_empty()).then(|| PathBuf::from(typed))
        }
        _ => None,
    };

    // No file chosen: nothing changes.
    let Some(path) = path else {
        return Ok(None);
    };
    match SelectedImage::open(&path) {
        Ok(image) => {
            session.select_image(image);
            Ok(None)
        }
        Err(err) => {
            log::warn!("refused selection: {err}");
            Ok(Some(format!("File tidak bisa dipakai: {err}")))
        }
    }
}

/// Run one analysis on a worker thread. `Esc` abandons it and resets the
/// session; the worker's eventual reply is then discarded as stale.
fn run_analysis(
    api: &ApiClient,
    session: &mut Session,
    outcomes_tx: &Sender<AnalysisOutcome>,
    outcomes_rx: &Receiver<AnalysisOutcome>,
) -> Result<()> {
    let Some(ticket) = session.begin_analysis() else {
        return Ok(());
    };
    draw(session, "")?;

    let worker = AnalysisWorker::spawn(api.clone(), ticket, outcomes_tx.clone());

    let spinner = spinner("Sedang Menganalisis... (Esc untuk batal)");
    let raw = RawMode::enable()?;
    loop {
        if worker.settle(session, outcomes_rx, Duration::from_millis(50)) {
            break;
        }

        if event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && key.code == KeyCode::Esc {
                    log::info!("analysis {} abandoned by user", worker.request());
                    session.reset();
                    break;
                }
            }
        }
    }
    drop(raw);
    spinner.finish_and_clear();
    Ok(())
}

/// Present the session's result, redrawing on every revealed character.
fn play_reveal(session: &Session, presenter: &mut TypewriterPresenter, animate: bool) -> Result<()> {
    let (Some(result), Some(request)) = (session.result(), session.result_request()) else {
        return Ok(());
    };

    if !animate {
        print!("{}", render(&Screen::from_session(session, &result.comparison)));
        io::stdout().flush().context("flushing result")?;
        return Ok(());
    }

    if presenter.current() != Some(request) {
        presenter.present(request, &result.comparison);
    }
    draw(session, presenter.revealed())?;
    while !presenter.is_done() {
        if presenter.wait(Duration::from_millis(100)) {
            draw(session, presenter.revealed())?;
        }
    }
    draw(session, presenter.revealed())
}

fn spinner(message: &'static str) -> ProgressBar {
    // indicatif's spinner ticks on its own thread while we wait.
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Keeps the terminal in raw mode (needed to read `Esc`) until dropped.
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("enabling raw mode")?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            log::error!("failed to leave raw mode: {err}");
        }
    }
}
