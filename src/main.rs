//! Terminal shell and entry point.
//!
//! This binary is the runtime around the library's engine. It owns everything
//! the engine only describes: the worker thread, the history stack, the viewer
//! widget, the settings file and the screen.
//!
//! ```text
//! ┌──────────────────────────┐
//! │   Main Thread            │
//! │  ┌────────────────────┐  │
//! │  │ Shell (commands)   │  │  ← stdin commands, history, viewer widget
//! │  └────────────────────┘  │
//! │     ▲    │ channel       │
//! │     │    ▼               │
//! │  ┌────────────────────┐  │
//! │  │ galleria-worker    │  │  ← HTTP listing and details requests
//! │  └────────────────────┘  │
//! │  ┌────────────────────┐  │
//! │  │ galleria-stdin     │  │  ← command lines
//! │  └────────────────────┘  │
//! └──────────────────────────┘
//! ```
//!
//! # Lifecycle
//!
//! 1. **Load**: Parse flags and config file, initialize tracing
//! 2. **Start**: Open the settings store, spawn the worker, build the history
//!    from `--dir`/`--src`
//! 3. **Mount**: Send the initial `DirectoryChanged` (carrying the deep link)
//! 4. **Loop**: Wait on stdin and the worker at once. Commands and worker
//!    responses both become events; a command typed while a page is loading is
//!    handled right away, and the late page is then discarded by the engine
//!
//! # Commands
//!
//! - `ls`: Redraw
//! - `more`: Load the next page (the grid's end was reached)
//! - `cd <dir>`: Browse another directory
//! - `open <n>`: Open the viewer on tile `n`
//! - `next` / `prev`: Swipe the open viewer
//! - `close`: Close the viewer from the widget
//! - `back` / `forward`: History navigation
//! - `info`: Details page of the open image
//! - `refresh`: Reload the directory
//! - `set <key> <value>`: `thumbs`, `fill` or `recursive`
//! - `quit`

#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use galleria::domain::{DirectoryKey, Slide};
use galleria::infrastructure::history::{self, MemoryHistory};
use galleria::infrastructure::paths;
use galleria::storage::{DisplaySettings, JsonSettingsStore, SettingsStore};
use galleria::worker::{HttpListingClient, WorkerHandle};
use galleria::{handle_event, Action, AppState, Config, Event, GalleryError, Result};
use crossbeam_channel::Receiver;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use url::Url;

/// Origin of the in-memory locations; only path and query matter.
const LOCATION_ORIGIN: &str = "http://gallery.local/";

/// Screen width used by the renderer.
const SCREEN_COLUMNS: usize = 100;

/// Browse a media library served over HTTP.
#[derive(Debug, Parser)]
#[command(name = "galleria", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the content API (overrides the config file).
    #[arg(long)]
    api: Option<String>,

    /// Directory to open.
    #[arg(short, long, default_value = "")]
    dir: String,

    /// Deep link: the image to open once it is loaded.
    #[arg(short, long)]
    src: Option<String>,

    /// Tracing filter, e.g. `debug` (overrides the config file).
    #[arg(long)]
    trace_level: Option<String>,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)?,
            None => Config::default(),
        };
        if let Some(api) = &self.api {
            config.api_base.clone_from(api);
        }
        if let Some(level) = &self.trace_level {
            config.trace_level = Some(level.clone());
        }
        Ok(config)
    }
}

/// The viewer widget as the shell simulates it: a slide list and a position.
#[derive(Debug, Default)]
struct ViewerWidget {
    slides: Vec<Slide>,
    index: Option<usize>,
    fill_screen: bool,
}

impl ViewerWidget {
    fn step(&self, forward: bool) -> Option<usize> {
        let index = self.index?;
        if forward {
            (index + 1 < self.slides.len()).then_some(index + 1)
        } else {
            index.checked_sub(1)
        }
    }
}

/// A parsed shell command.
enum Command {
    Event(Event),
    Browse(DirectoryKey),
    Back,
    Forward,
    Redraw,
    Quit,
}

/// Runtime state wrapping the engine.
struct Shell {
    /// Engine state from the library layer.
    app: AppState,
    worker: WorkerHandle,
    history: MemoryHistory,
    settings_store: JsonSettingsStore,
    widget: ViewerWidget,
    input_locked: bool,
}

impl Shell {
    fn start(config: &Config, cli: &Cli) -> Result<Self> {
        let data_dir = config.data_dir();
        let settings_store = JsonSettingsStore::new(paths::settings_file(&data_dir))?;
        let settings = settings_store.load()?;

        let client = HttpListingClient::new(&config.api_base, config.request_timeout())?;
        let worker = WorkerHandle::spawn(client)?;

        let dir = DirectoryKey::new(&cli.dir);
        let start = history::with_src(
            &history::dir_url(&Url::parse(LOCATION_ORIGIN)?, &dir),
            cli.src.as_deref(),
        );
        tracing::debug!(location = %start, "starting location");

        Ok(Self {
            app: galleria::initialize(config, settings, cli.src.clone()),
            worker,
            history: MemoryHistory::new(start),
            settings_store,
            widget: ViewerWidget::default(),
            input_locked: false,
        })
    }

    /// Applies one event and executes the resulting actions. Returns `true` if
    /// the screen should be redrawn.
    fn update(&mut self, event: &Event) -> bool {
        let span = tracing::debug_span!("shell_update", event = ?event);
        let _guard = span.entered();

        match handle_event(&mut self.app, event) {
            Ok((should_render, actions)) => {
                tracing::debug!(action_count = actions.len(), should_render, "event handled");
                for action in actions {
                    self.execute_action(action);
                }
                should_render
            }
            Err(e) => {
                tracing::warn!(error = %e, "error handling event");
                false
            }
        }
    }

    /// Runs a parsed command. Returns `true` if the screen should be redrawn.
    fn run_command(&mut self, command: Command) -> bool {
        match command {
            Command::Redraw => true,
            Command::Back => self.pop(false),
            Command::Forward => self.pop(true),
            Command::Browse(dir) => self.browse(dir),
            Command::Event(event) => self.update(&event),
            Command::Quit => false,
        }
    }

    fn map_command(&self, line: &str) -> Option<Command> {
        let mut words = line.split_whitespace();
        let verb = words.next()?;
        let arg = words.next();

        let command = match (verb, arg) {
            ("ls", _) => Command::Redraw,
            ("quit" | "q", _) => Command::Quit,
            ("back", _) => Command::Back,
            ("forward", _) => Command::Forward,
            ("more", _) => Command::Event(Event::EndReached {
                dir: self.app.session.dir().clone(),
            }),
            ("refresh", _) => Command::Event(Event::Refresh),
            ("info", _) => Command::Event(Event::ShowDetails),
            ("cd", dir) => Command::Browse(DirectoryKey::new(dir.unwrap_or_default())),
            ("open", Some(n)) => Command::Event(Event::OpenAt(n.parse().ok()?)),
            ("next" | "prev", _) => Command::Event(Event::ViewerChanged(self.widget.step(verb == "next")?)),
            ("close", _) if self.widget.index.is_some() => Command::Event(Event::ViewerClosed),
            ("set", Some(key)) => {
                let settings = self.changed_settings(key, words.next()?)?;
                Command::Event(Event::SettingsChanged(settings))
            }
            _ => return None,
        };
        Some(command)
    }

    fn changed_settings(&self, key: &str, value: &str) -> Option<DisplaySettings> {
        let mut settings = self.app.settings;
        let flag = || matches!(value, "on" | "true" | "1" | "yes");
        match key {
            "thumbs" => settings.thumbnail_size = value.parse::<u32>().ok().filter(|size| *size > 0)?,
            "fill" => settings.fill_screen = flag(),
            "recursive" => settings.files_recursive = flag(),
            _ => return None,
        }
        Some(settings)
    }

    /// Enters `dir` the way a link click would: push, then route.
    fn browse(&mut self, dir: DirectoryKey) -> bool {
        self.history.push_dir(&dir);
        self.update(&Event::DirectoryChanged { dir, src: None })
    }

    /// Walks the history and tells the engine what the location became.
    fn pop(&mut self, forward: bool) -> bool {
        let previous_dir = self.history.current_dir();
        let popped = if forward { self.history.forward() } else { self.history.back() };
        let Some(location) = popped.cloned() else {
            tracing::debug!(forward, "no history entry");
            return false;
        };
        tracing::debug!(location = %location, "history popped");

        let src = history::src_of(&location);
        let Some(dir) = history::dir_of(&location) else {
            println!("(details page of {})", src.unwrap_or_default());
            return false;
        };

        let event = if previous_dir.as_ref() == Some(&dir) && self.app.details.is_none() {
            Event::LocationPopped { src }
        } else {
            Event::DirectoryChanged { dir, src }
        };
        self.update(&event)
    }

    /// Executes an action returned from event handling.
    #[tracing::instrument(level = "debug", skip(self))]
    fn execute_action(&mut self, action: Action) {
        match action {
            Action::PostToWorker(message) => {
                if let Err(e) = self.worker.post(message) {
                    tracing::error!(error = %e, "failed to post to worker");
                }
            }
            Action::PushLocation { src } => self.history.push_src(src.as_deref()),
            Action::ReplaceLocation { src } => self.history.replace_src(src.as_deref()),
            Action::OpenViewer {
                index,
                slides,
                fill_screen,
            } => {
                self.widget = ViewerWidget {
                    slides,
                    index: Some(index),
                    fill_screen,
                };
            }
            Action::ViewerGoTo { index } => {
                if self.widget.index.is_some() {
                    self.widget.index = Some(index);
                }
            }
            Action::SyncViewerSlides { slides } => self.widget.slides = slides,
            Action::CloseViewer => self.widget = ViewerWidget::default(),
            Action::LockInput => self.input_locked = true,
            Action::UnlockInput => self.input_locked = false,
            Action::ScrollToIndex(index) => println!("(scrolled to tile {index})"),
            Action::SaveSettings(settings) => {
                if let Err(e) = self.settings_store.save(&settings) {
                    tracing::warn!(error = %e, path = ?self.settings_store.path(), "failed to save settings");
                }
            }
            Action::NavigateToDetails { src, dir, index } => {
                self.widget = ViewerWidget::default();
                self.history.push_details(&src, &dir, index);
            }
        }
    }

    fn render(&self) {
        galleria::ui::render(&self.app, SCREEN_COLUMNS);
        if self.widget.index.is_some() {
            let zoom = if self.widget.fill_screen { "fill" } else { "fit" };
            let input = if self.input_locked { "locked" } else { "free" };
            println!("(viewer zoom: {zoom}, page input: {input})");
        }
        println!("location: {}", self.history.current());
    }
}

/// Forwards stdin lines to a channel from a dedicated thread, so the shell can
/// wait on commands and worker responses at the same time. The channel
/// disconnects at end of input.
fn spawn_input_reader() -> Result<Receiver<String>> {
    let (tx, rx) = crossbeam_channel::unbounded();
    std::thread::Builder::new()
        .name("galleria-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else {
                    tracing::warn!("stdin read failed, stopping input");
                    break;
                };
                if tx.send(line).is_err() {
                    break;
                }
            }
            tracing::debug!("stdin closed");
        })?;
    Ok(rx)
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    galleria::observability::init_tracing(&config);

    let span = tracing::info_span!("galleria_session", api_base = %config.api_base);
    let _guard = span.entered();

    let mut shell = Shell::start(&config, cli)?;
    let input = spawn_input_reader()?;
    let responses = shell.worker.responses().clone();

    let mount = Event::DirectoryChanged {
        dir: DirectoryKey::new(&cli.dir),
        src: cli.src.clone(),
    };
    shell.update(&mount);
    shell.render();
    prompt()?;

    loop {
        crossbeam_channel::select! {
            recv(input) -> line => {
                let Ok(line) = line else { break };
                match shell.map_command(line.trim()) {
                    Some(Command::Quit) => break,
                    Some(command) => {
                        if shell.run_command(command) {
                            shell.render();
                        }
                    }
                    None => println!("?"),
                }
                prompt()?;
            }
            recv(responses) -> response => {
                let Ok(response) = response else {
                    return Err(GalleryError::Worker("worker thread stopped".to_string()));
                };
                if shell.update(&Event::WorkerResponse(response)) {
                    println!();
                    shell.render();
                    prompt()?;
                }
            }
        }
    }

    tracing::debug!("shell exiting");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("galleria: {e}");
        let code = match e {
            GalleryError::Config(_) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}
