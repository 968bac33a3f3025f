use bannerpop::{
    app_dirs::AppDirs,
    config::{OverlayConfig, Overrides},
    deck::{load_or_empty, Deck, DeckSource, EmbeddedDeck, FileDeck, PageContent},
    input::{key_intent, mouse_input, Intent},
    logging,
    overlay::{Overlay, OverlayEvent},
    runtime::{
        Clock, CrosstermEventSource, FixedTicker, MonotonicClock, Runner, TermEvent,
        TermEventSource, Ticker,
    },
    store::{FlagStore, JsonFlagStore, MemoryFlagStore, SqliteFlagStore},
    ui::{layout::OverlayLayout, PageView},
};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{debug, info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use webbrowser::Browser;

const TICK_RATE_MS: u64 = 50;

/// timed promo banner overlay for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Shows a host page with a timed, auto-rotating slide banner on top. \
                  The banner closes itself when its time is up and, unless told \
                  otherwise, only shows once."
)]
pub struct Cli {
    /// JSON deck file to show
    #[clap(long, conflicts_with = "embedded")]
    deck: Option<PathBuf>,

    /// name of a bundled deck
    #[clap(long)]
    embedded: Option<String>,

    /// where the shown-flag is kept
    #[clap(long, value_enum, default_value_t = StoreKind::Json)]
    store: StoreKind,

    /// key of the shown-flag
    #[clap(long)]
    flag_key: Option<String>,

    /// seconds each slide stays up
    #[clap(long)]
    per_slide_secs: Option<f64>,

    /// seconds before the banner closes itself
    #[clap(long)]
    total_secs: Option<f64>,

    /// milliseconds before the banner appears
    #[clap(long)]
    delay_ms: Option<u64>,

    /// show the banner even if it was shown before
    #[clap(long)]
    always_show: bool,

    /// forget that the banner was shown
    #[clap(long)]
    reset: bool,

    /// log file (defaults to the state directory)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    Json,
    Sqlite,
    Memory,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            per_slide_secs: self.per_slide_secs,
            total_secs: self.total_secs,
            initial_delay_ms: self.delay_ms,
            flag_key: self.flag_key.clone(),
            always_show: self.always_show,
        }
    }

    fn deck_source(&self) -> Box<dyn DeckSource> {
        match (&self.deck, &self.embedded) {
            (Some(path), _) => Box::new(FileDeck::with_path(path)),
            (None, Some(name)) => Box::new(EmbeddedDeck::new(name.as_str())),
            (None, None) => Box::new(EmbeddedDeck::default()),
        }
    }
}

fn open_store(kind: StoreKind) -> Box<dyn FlagStore> {
    match kind {
        StoreKind::Json => Box::new(JsonFlagStore::new()),
        StoreKind::Memory => Box::new(MemoryFlagStore::new()),
        StoreKind::Sqlite => match SqliteFlagStore::new() {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!("flag database unavailable ({e}); flags will not persist");
                Box::new(MemoryFlagStore::new())
            }
        },
    }
}

fn overlay_config(deck: &Deck, overrides: &Overrides) -> OverlayConfig {
    match deck.overlay.clone().with_overrides(overrides) {
        Ok(config) => config,
        Err(e) => {
            warn!("ignoring command line timing: {e}");
            deck.overlay.clone()
        }
    }
}

pub struct App {
    page: PageContent,
    overlay: Overlay,
    screen: Rect,
}

impl App {
    pub fn new(cli: &Cli) -> Self {
        let source = cli.deck_source();
        let deck = load_or_empty(source.as_ref());
        info!("loaded {} with {} slides", source.describe(), deck.slides.len());

        let config = overlay_config(&deck, &cli.overrides());
        let mut store = open_store(cli.store);
        if cli.reset {
            match store.clear(&config.flag_key) {
                Ok(()) => info!("cleared shown-flag {:?}", config.flag_key),
                Err(e) => warn!("could not clear shown-flag {:?}: {e}", config.flag_key),
            }
        }

        Self {
            overlay: Overlay::new(&config, deck.slides, store),
            page: deck.page,
            screen: Rect::default(),
        }
    }

    fn tick(&mut self, now: Duration) {
        self.overlay.advance(now);
        for event in self.overlay.drain_events() {
            match event {
                OverlayEvent::Suppressed => info!("banner suppressed"),
                OverlayEvent::Shown => info!("banner shown"),
                OverlayEvent::SlideChanged(index) => debug!("slide {index}"),
                OverlayEvent::Closed(reason) => info!("banner closed: {reason}"),
            }
        }
    }

    fn footer(&self) -> String {
        if !self.overlay.visible() {
            return "(q)uit".to_string();
        }
        let mut hint = String::from("(esc) close / (←/→) slides");
        if self.overlay.current_slide().is_some_and(|s| s.href.is_some()) {
            hint.push_str(" / (enter) open");
        }
        hint.push_str(" / (q)uit");
        hint
    }

    fn open_link(&self) {
        let Some(href) = self.overlay.current_slide().and_then(|s| s.href.as_deref()) else {
            return;
        };
        if !Browser::is_available() {
            warn!("no browser available for {href}");
            return;
        }
        if let Err(e) = webbrowser::open(href) {
            warn!("could not open {href}: {e}");
        }
    }

    /// Returns false once the user asked to quit.
    fn on_event(&mut self, event: TermEvent) -> bool {
        match event {
            TermEvent::Tick | TermEvent::Resize => {}
            TermEvent::Key(key) => match key_intent(key, self.overlay.visible()) {
                Intent::Quit => return false,
                Intent::Overlay(input) => {
                    self.overlay.handle_input(input);
                }
                Intent::OpenLink => self.open_link(),
                Intent::Nothing => {}
            },
            TermEvent::Mouse(mouse) => {
                if self.overlay.visible() {
                    let layout = OverlayLayout::new(self.screen, self.overlay.slides().len());
                    if let Some(input) = mouse_input(mouse, &layout) {
                        self.overlay.handle_input(input);
                    }
                }
            }
        }
        true
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        logging::init(&path);
    }

    let mut app = App::new(&cli);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = start_tui(&mut terminal, &mut app, &runner, &MonotonicClock::start());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: TermEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
    clock: &dyn Clock,
) -> Result<(), Box<dyn Error>> {
    loop {
        app.tick(clock.elapsed());
        let frame = terminal.draw(|f| ui(app, f))?;
        app.screen = frame.area;

        let wait = app
            .overlay
            .next_deadline()
            .map(|due| due.saturating_sub(clock.elapsed()));
        let event = runner.step_within(wait);

        // input must see every timer that came due while we were blocked
        if matches!(event, TermEvent::Key(_) | TermEvent::Mouse(_)) {
            app.tick(clock.elapsed());
        }
        if !app.on_event(event) {
            return Ok(());
        }
    }
}

fn ui(app: &App, f: &mut Frame) {
    let area = f.area();
    f.render_widget(
        PageView {
            page: &app.page,
            footer: Some(app.footer()),
        },
        area,
    );
    f.render_widget(&app.overlay, area);
}
