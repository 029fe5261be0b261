use oiltype::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    error::WordListError,
    mode::Mode,
    runtime::{command_for_key, AppEvent, Command, CrosstermEventSource, EventSource, Runner},
    session::{Session, SessionState},
    stats::Summary,
    timer::{tick_interval, ChannelTicker},
    trace_init::init_tracing,
    word::{builtin_sets, load_builtin, WordRecord},
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor::MoveToColumn,
    execute, queue,
    style::{Print, PrintStyledContent, Stylize},
    terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType},
    tty::IsTty,
};
use itertools::Itertools;
use rand::seq::SliceRandom;
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
};
use tracing::info;
use unicode_width::UnicodeWidthStr;

/// japanese romaji typing trainer
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A romaji typing trainer: type the reading of each Japanese word in any common spelling (shi or si, chi or ti, n or nn) across timed, survival, sudden-death and fixed-count modes."
)]
pub struct Cli {
    /// play mode: free, time-attack, survival, sudden-death, fixed-count, competitive (unknown names play as free)
    #[clap(short = 'm', long)]
    mode: Option<String>,

    /// word to practice, as DISPLAY=ROMAJI; repeat for several
    #[clap(short = 'w', long = "word")]
    words: Vec<String>,

    /// built-in word set to use when no --word is given
    #[clap(short = 's', long = "set")]
    word_set: Option<String>,

    /// shuffle the word order
    #[clap(long)]
    shuffle: bool,

    /// print the play modes and exit
    #[clap(long)]
    list_modes: bool,

    /// print the built-in word sets and exit
    #[clap(long)]
    list_sets: bool,

    /// print the final summary as JSON
    #[clap(long)]
    json: bool,

    /// directory for the log file
    #[clap(long)]
    log_dir: Option<PathBuf>,

    /// remember --mode, --set and --shuffle as defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    fn mode(&self, config: &Config) -> Mode {
        self.mode
            .as_deref()
            .map_or(config.mode, Mode::from_name)
    }

    /// Words from --word pairs, or else the selected built-in set.
    fn load_words(&self, config: &Config, mode: Mode) -> Result<Vec<WordRecord>, WordListError> {
        let mut words = if self.words.is_empty() {
            let set = self
                .word_set
                .as_deref()
                .unwrap_or_else(|| config.word_set_for(mode));
            load_builtin(set)?
        } else {
            self.words
                .iter()
                .enumerate()
                .map(|(i, pair)| WordRecord::parse_pair((i + 1).to_string(), pair))
                .collect::<Result<Vec<_>, _>>()?
        };

        // Competitive retries stand in for a freshly generated list.
        if self.shuffle || config.shuffle || mode.rules().refresh_words_on_retry {
            words.shuffle(&mut rand::thread_rng());
        }
        Ok(words)
    }
}

pub struct App {
    pub cli: Cli,
    pub config: Config,
    pub session: Session,
}

impl App {
    fn retry(&mut self) -> Result<(), WordListError> {
        if self.session.rules().refresh_words_on_retry {
            let words = self.cli.load_words(&self.config, self.session.mode())?;
            self.session.reinitialize_with(words);
        } else {
            self.session.reinitialize();
        }
        Ok(())
    }

    fn next_mode(&mut self) -> Result<(), WordListError> {
        let current = self.session.mode();
        let next = Mode::ALL
            .iter()
            .cycle()
            .skip_while(|m| **m != current)
            .nth(1)
            .copied()
            .unwrap_or_default();
        let words = self.cli.load_words(&self.config, next)?;
        self.session.set_mode(next);
        self.session.reinitialize_with(words);
        info!(mode = %next, "mode switched");
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_modes {
        println!(
            "{}",
            Mode::ALL
                .iter()
                .map(|m| format!("{:<13} {}", m.to_string(), m.rules().summary))
                .join("\n")
        );
        return Ok(());
    }
    if cli.list_sets {
        println!("{}", builtin_sets().join("\n"));
        return Ok(());
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    let mode = cli.mode(&config);

    if cli.save_config {
        config.mode = mode;
        if let Some(set) = &cli.word_set {
            config.word_set = set.clone();
        }
        config.shuffle |= cli.shuffle;
        store.save(&config)?;
    }

    let words = cli.load_words(&config, mode)?;

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = cli
        .log_dir
        .clone()
        .or_else(AppDirs::log_dir)
        .and_then(|dir| init_tracing(&dir));

    enable_raw_mode()?;

    let runner = Runner::new(CrosstermEventSource::new(), tick_interval());
    let ticker = ChannelTicker::new(runner.sender(), AppEvent::Tick);
    let session = Session::new(words, mode).with_scheduler(Box::new(ticker));
    let json = cli.json;
    let mut app = App {
        cli,
        config,
        session,
    };

    let mut stdout = io::stdout();
    let result = run(&mut stdout, &runner, &mut app);

    disable_raw_mode()?;
    execute!(stdout, Print("\r\n"))?;
    result?;

    if let Some(summary) = app.session.summary() {
        report(summary, json)?;
    }

    Ok(())
}

fn run<W: Write, E: EventSource>(
    out: &mut W,
    runner: &Runner<E>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    draw(out, &mut app.session)?;

    loop {
        match runner.step() {
            Some(AppEvent::Tick(generation)) => {
                app.session.on_tick(generation);
            }
            Some(AppEvent::Resize) | None => {}
            Some(AppEvent::Key(key)) => match command_for_key(&key, app.session.state()) {
                Command::Fragment(fragment) => {
                    app.session.submit(&fragment);
                }
                Command::Exit => {
                    if app.session.is_finished() {
                        break;
                    }
                    app.session.exit();
                }
                Command::Retry => app.retry()?,
                Command::NextMode => app.next_mode()?,
                Command::Quit => {
                    app.session.exit();
                    break;
                }
                Command::None => {}
            },
        }
        draw(out, &mut app.session)?;
    }

    Ok(())
}

/// Redraw the single status line.
fn draw<W: Write>(out: &mut W, session: &mut Session) -> io::Result<()> {
    let width = terminal::size().map(|(w, _)| w as usize).unwrap_or(80);
    let (position, total) = session.progress_readout();
    let mismatch = session.take_mismatch_pulse();

    queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;

    let header = match session.seconds_remaining() {
        Some(secs) => format!("[{} {}/{}] {:.1}s ", session.mode(), position, total, secs),
        None => format!("[{} {}/{}] ", session.mode(), position, total),
    };
    queue!(out, PrintStyledContent(header.as_str().dim()))?;

    match session.state() {
        SessionState::Finished => {
            if let Some(s) = session.summary() {
                let text = format!(
                    "done: {:.0} wpm, {:.0}% | [r] retry  [m] next mode  [esc] quit",
                    s.wpm, s.accuracy
                );
                queue!(out, PrintStyledContent(text.yellow().bold()))?;
            }
        }
        state => {
            let display = session
                .current_word()
                .map(|w| w.display.clone())
                .unwrap_or_default();
            let typed = session.typed_prefix().to_string();
            let remaining = session.remaining().to_string();
            let counters = session.counters();
            let tail = format!(
                "  {:.0} wpm  ok {} ng {}",
                session.current_wpm(),
                counters.correct_keystrokes,
                counters.incorrect_keystrokes
            );

            let used = header.width() + typed.width() + remaining.width() + tail.width();
            if used + display.width() + 2 < width {
                queue!(out, PrintStyledContent(display.as_str().bold()), Print("  "))?;
            }
            queue!(
                out,
                PrintStyledContent(typed.as_str().green().bold()),
                PrintStyledContent(remaining.as_str().white())
            )?;
            if state == SessionState::Playing {
                queue!(out, PrintStyledContent(tail.as_str().dim()))?;
            } else {
                queue!(
                    out,
                    PrintStyledContent("  any key to start, [tab] next mode".dim())
                )?;
            }
            if mismatch {
                queue!(out, PrintStyledContent("  ✗".red().bold()))?;
            }
            if session.composition_active() {
                queue!(out, PrintStyledContent("  IME on: switch to half-width".red()))?;
            }
        }
    }

    out.flush()
}

fn report(summary: &Summary, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("mode         {}", summary.mode);
    println!("wpm          {:.0}", summary.wpm);
    println!("accuracy     {:.0}%", summary.accuracy);
    println!("keystrokes   {}", summary.correct_keystrokes);
    println!("mistakes     {}", summary.incorrect_keystrokes);
    println!("words        {}", summary.words_completed);
    println!("elapsed      {:.1}s", summary.elapsed_secs);
    if !summary.samples.is_empty() {
        println!("peak wpm     {:.0}", summary.peak_wpm);
        println!("consistency  ±{:.1} wpm", summary.wpm_std_dev);
    }
    Ok(())
}
