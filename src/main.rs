//! lapwatch: terminal stopwatch with lap splits and CSV export.

mod config;
mod export;
mod notices;
mod stopwatch;
mod ui;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::{cursor, execute, terminal};
use timer_core::{Clock, ExportError, MonotonicClock};

use crate::config::{Settings, DEFAULT_REFRESH_MS};
use crate::export::LapExporter;
use crate::notices::{fire_notice, Notice, NoticeKind};
use crate::stopwatch::StopwatchState;

const APP_NAME: &str = "lapwatch";

const HELP_TEXT: &str = "STOPWATCH HELP\n\n\
                         Space  Start/Pause (also Enter, F2)\n\
                         l      Record lap\n\
                         r      Reset (also F3)\n\
                         c      Clear laps\n\
                         e      Export laps to CSV\n\
                         Up/Dn  Scroll laps (also k/j)\n\
                         h      Help (also ?, F1)\n\
                         q      Quit (also Esc, F4)";

/// Terminal stopwatch with lap splits and CSV export
#[derive(Parser, Debug)]
#[command(name = "lapwatch")]
#[command(about = "Terminal stopwatch with lap splits and CSV export", long_about = None)]
#[command(version)]
struct Args {
    /// Path to settings file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// CSV export destination (overrides the settings file)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Display refresh interval while running, in milliseconds
    #[arg(long, value_name = "MS")]
    refresh_ms: Option<u64>,

    /// Write log records to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug)]
enum AppOp {
    Redraw,
    Key(KeyEvent),
    FocusChange(FocusState),
    Resize(u16, u16),
    Pump,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum FocusState {
    Foreground,
    Background,
}

#[derive(Debug, PartialEq)]
enum PumpCtl {
    Start(Duration),
    Stop,
    Quit,
}

struct LapwatchApp<W: Write, C: Clock> {
    out: W,
    clock: C,
    screensize: (u16, u16),
    settings: Settings,
    exporter: LapExporter,

    stopwatch: StopwatchState,
    notice: Option<Notice>,

    pump_ctl: Sender<PumpCtl>,
    pump_running: bool,
    allow_redraw: bool,
    help_visible: bool,
    confirm_clear: bool,
    confirm_exit: bool,
    quit: bool,
}

impl<W: Write, C: Clock> LapwatchApp<W, C> {
    fn new(
        out: W,
        clock: C,
        screensize: (u16, u16),
        settings: Settings,
        pump_ctl: Sender<PumpCtl>,
    ) -> Self {
        let exporter = LapExporter::new(settings.export_path.clone());
        Self {
            out,
            clock,
            screensize,
            settings,
            exporter,
            stopwatch: StopwatchState::new(),
            notice: None,
            pump_ctl,
            pump_running: false,
            allow_redraw: true,
            help_visible: false,
            confirm_clear: false,
            confirm_exit: false,
            quit: false,
        }
    }

    fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    fn redraw(&mut self) {
        if !self.allow_redraw {
            return;
        }
        let now = self.now_ms();
        let expired = self
            .notice
            .as_ref()
            .is_some_and(|n| !n.is_visible(&self.settings.notices, now));
        if expired {
            self.notice = None;
        }

        let result = if self.help_visible {
            ui::draw_help(&mut self.out, self.screensize, HELP_TEXT)
        } else if self.confirm_exit {
            ui::draw_confirm(
                &mut self.out,
                self.screensize,
                "Timer Running",
                "The stopwatch is still running.\nQuit anyway?",
            )
        } else if self.confirm_clear {
            let message = format!("Discard {} recorded laps?", self.stopwatch.timer.lap_count());
            ui::draw_confirm(&mut self.out, self.screensize, "Clear Laps", &message)
        } else {
            ui::draw_stopwatch(
                &mut self.out,
                self.screensize,
                &self.stopwatch,
                now,
                self.notice.as_ref(),
            )
        };
        if let Err(e) = result {
            log::error!("redraw failed: {}", e);
        }
    }

    fn start_pump(&mut self) {
        if !self.pump_running {
            self.pump_running = true;
            let interval = Duration::from_millis(self.settings.refresh_ms);
            self.pump_ctl.send(PumpCtl::Start(interval)).ok();
        }
    }

    fn stop_pump(&mut self) {
        if self.pump_running {
            self.pump_running = false;
            self.pump_ctl.send(PumpCtl::Stop).ok();
        }
    }

    fn shutdown(&mut self) {
        self.stop_pump();
        self.pump_ctl.send(PumpCtl::Quit).ok();
    }

    fn handle_pump(&mut self) {
        if self.stopwatch.timer.is_running() {
            self.redraw();
        } else {
            self.stop_pump();
        }
    }

    fn handle_focus(&mut self, state: FocusState) {
        match state {
            FocusState::Background => {
                self.allow_redraw = false;
                if self.settings.pause_on_focus_loss && self.stopwatch.timer.is_running() {
                    let now = self.now_ms();
                    self.stopwatch.timer.pause(now);
                    // Nothing left running to warn about.
                    self.confirm_exit = false;
                    log::debug!("paused on focus loss");
                }
                self.stop_pump();
            }
            FocusState::Foreground => {
                self.allow_redraw = true;
                if self.stopwatch.timer.is_running() {
                    self.start_pump();
                }
                self.redraw();
            }
        }
    }

    fn handle_resize(&mut self, width: u16, height: u16) {
        self.screensize = (width, height);
        self.redraw();
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.request_quit();
            return;
        }

        // If help screen is showing, any key dismisses it
        if self.help_visible {
            self.help_visible = false;
            self.redraw();
            return;
        }

        if self.confirm_exit {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.stop_timer();
                    self.confirm_exit = false;
                    self.quit = true;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::F(4) => {
                    self.confirm_exit = false;
                    self.redraw();
                }
                _ => {}
            }
            return;
        }

        if self.confirm_clear {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm_clear = false;
                    self.stopwatch.clear_laps();
                    self.redraw();
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_clear = false;
                    self.redraw();
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter | KeyCode::F(2) => self.toggle(),
            KeyCode::Char('l') | KeyCode::Char('L') => self.record_lap(),
            KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::F(3) => self.reset(),
            KeyCode::Char('c') | KeyCode::Char('C') => self.request_clear_laps(),
            KeyCode::Char('e') | KeyCode::Char('E') => self.export(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.stopwatch.scroll_up();
                self.redraw();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.stopwatch.scroll_down();
                self.redraw();
            }
            KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::F(1) => {
                self.help_visible = true;
                self.redraw();
            }
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::F(4) => self.request_quit(),
            _ => {}
        }
    }

    fn toggle(&mut self) {
        let now = self.now_ms();
        self.stopwatch.timer.toggle(now);
        if self.stopwatch.timer.is_running() {
            self.start_pump();
        } else {
            self.stop_pump();
        }
        self.redraw();
    }

    fn record_lap(&mut self) {
        let now = self.now_ms();
        if self.stopwatch.record_lap(now).is_some() {
            self.redraw();
        }
    }

    fn reset(&mut self) {
        if self.stopwatch.timer.is_pristine() {
            return;
        }
        let now = self.now_ms();
        self.stopwatch.reset(now);
        self.stop_pump();
        self.redraw();
    }

    fn request_clear_laps(&mut self) {
        if self.stopwatch.timer.lap_count() == 0 {
            return;
        }
        if self.settings.confirm_clear {
            self.confirm_clear = true;
        } else {
            self.stopwatch.clear_laps();
        }
        self.redraw();
    }

    fn export(&mut self) {
        let (kind, message) = match self.exporter.export(self.stopwatch.timer.laps()) {
            Ok(count) => (
                NoticeKind::Info,
                format!("Exported {} laps to {}", count, self.exporter.path().display()),
            ),
            Err(ExportError::NoLaps) => (NoticeKind::Info, "No laps to export".to_string()),
            Err(e) => (NoticeKind::Error, format!("Export failed: {}", e)),
        };
        let now = self.now_ms();
        self.notice = Some(fire_notice(&self.settings.notices, &mut self.out, kind, &message, now));
        self.redraw();
    }

    fn request_quit(&mut self) {
        if self.stopwatch.timer.is_running() {
            self.help_visible = false;
            self.confirm_clear = false;
            self.confirm_exit = true;
            self.redraw();
        } else {
            self.quit = true;
        }
    }

    fn stop_timer(&mut self) {
        if self.stopwatch.timer.is_running() {
            let now = self.now_ms();
            self.stopwatch.timer.pause(now);
        }
        self.stop_pump();
    }
}

fn pump_thread(ctl: Receiver<PumpCtl>, main: Sender<AppOp>) {
    let mut interval = Duration::from_millis(DEFAULT_REFRESH_MS);
    let mut running = false;

    loop {
        // Tick on timeout while running, block-wait when stopped
        let msg = if running {
            match ctl.recv_timeout(interval) {
                Ok(msg) => Some(msg),
                Err(RecvTimeoutError::Timeout) => {
                    if main.send(AppOp::Pump).is_err() {
                        break;
                    }
                    None
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match ctl.recv() {
                Ok(msg) => Some(msg),
                Err(_) => break,
            }
        };

        match msg {
            Some(PumpCtl::Start(every)) => {
                interval = if every.is_zero() {
                    Duration::from_millis(DEFAULT_REFRESH_MS)
                } else {
                    every
                };
                running = true;
            }
            Some(PumpCtl::Stop) => running = false,
            Some(PumpCtl::Quit) => break,
            None => {}
        }
    }
    log::debug!("pump thread exiting");
}

fn input_thread(main: Sender<AppOp>) {
    loop {
        let op = match event::read() {
            Ok(Event::Key(key)) => AppOp::Key(key),
            Ok(Event::FocusGained) => AppOp::FocusChange(FocusState::Foreground),
            Ok(Event::FocusLost) => AppOp::FocusChange(FocusState::Background),
            Ok(Event::Resize(width, height)) => AppOp::Resize(width, height),
            Ok(_) => continue,
            Err(e) => {
                log::error!("terminal input failed: {}", e);
                main.send(AppOp::Quit).ok();
                break;
            }
        };
        if main.send(op).is_err() {
            break;
        }
    }
}

/// Raw mode + alternate screen for the lifetime of the UI.
struct TerminalGuard;

impl TerminalGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableFocusChange
        )?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            DisableFocusChange,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

fn run(settings: Settings) -> Result<()> {
    let (main_tx, main_rx) = mpsc::channel();
    let (pump_tx, pump_rx) = mpsc::channel();

    let pump_main = main_tx.clone();
    let pump_handle = thread::spawn(move || pump_thread(pump_rx, pump_main));

    let _terminal = TerminalGuard::enable().context("Failed to set up terminal")?;

    let input_main = main_tx.clone();
    thread::spawn(move || input_thread(input_main));

    let screensize = terminal::size().unwrap_or((80, 24));
    let mut app = LapwatchApp::new(
        io::stdout(),
        MonotonicClock::new(),
        screensize,
        settings,
        pump_tx,
    );
    main_tx.send(AppOp::Redraw).ok();

    while let Ok(op) = main_rx.recv() {
        match op {
            AppOp::Redraw => app.redraw(),
            AppOp::Key(key) => app.handle_key(key),
            AppOp::FocusChange(state) => app.handle_focus(state),
            AppOp::Resize(width, height) => app.handle_resize(width, height),
            AppOp::Pump => app.handle_pump(),
            AppOp::Quit => break,
        }
        if app.quit {
            break;
        }
    }

    app.shutdown();
    pump_handle.join().ok();
    log::info!("{} exiting", APP_NAME);
    Ok(())
}

/// The UI owns the terminal while it runs, so nothing is logged unless a log
/// file takes the records.
fn log_level(verbose: u8, quiet: bool, to_file: bool) -> log::LevelFilter {
    use log::LevelFilter;

    if !to_file {
        return LevelFilter::Off;
    }
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    use env_logger::{Builder, Target};

    let mut builder = Builder::new();
    builder
        .filter_level(log_level(verbose, quiet, log_file.is_some()))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        });

    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("Failed to initialize logging")
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet, args.log_file.as_deref())?;

    let settings = config::load_settings(args.config.as_deref())?
        .with_overrides(args.output, args.refresh_ms);
    log::info!(
        "{} starting: refresh {} ms, exports to {}",
        APP_NAME,
        settings.refresh_ms,
        settings.export_path.display()
    );

    run(settings)
}
