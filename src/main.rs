use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keyrush::{
    app::{App, Control},
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{CrosstermEventSource, Runner},
    word_source::{HttpWordSource, StaticWordSource, WordSource},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::Arc,
    time::Duration,
};
use tracing::{info, warn};

const REDRAW_INTERVAL_MS: u64 = 100;

/// timed word-typing game: type the words shown before the clock runs out
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed typing game. Words are fetched from a random-word service (or a built-in list when offline) and you type them one by one until every word is done or the countdown hits zero. Results are shown in characters and words per minute."
)]
pub struct Cli {
    /// number of seconds per game
    #[clap(short = 's', long, value_parser = clap::value_parser!(u32).range(1..))]
    secs: Option<u32>,

    /// number of words to request per game
    #[clap(short = 'w', long, value_parser = clap::value_parser!(u64).range(1..))]
    words: Option<u64>,

    /// random-word service url
    #[clap(long)]
    url: Option<String>,

    /// seconds to wait for the word service
    #[clap(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// use the built-in word list instead of the word service
    #[clap(long)]
    offline: bool,

    /// write the effective settings to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Overlay the command line on top of the stored settings
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(secs) = self.secs {
            config.duration_secs = secs;
        }
        if let Some(words) = self.words {
            config.word_count = words as usize;
        }
        if let Some(url) = &self.url {
            config.word_source_url = url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.fetch_timeout_secs = timeout;
        }
        if self.offline {
            config.offline = true;
        }
        config
    }
}

fn word_source(config: &Config) -> Arc<dyn WordSource> {
    if config.offline {
        return Arc::new(StaticWordSource::fallback());
    }

    match HttpWordSource::new(config.word_source_url.clone(), config.fetch_timeout()) {
        Ok(source) => Arc::new(source),
        Err(e) => {
            warn!(error = %e, "http client unavailable, playing offline");
            Arc::new(StaticWordSource::fallback())
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    logging::init();

    let store = FileConfigStore::new();
    let config = cli.apply_to(store.load());
    if cli.save_config {
        store.save(&config)?;
    }
    info!(path = %store.path().display(), ?config, "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: Backend>(terminal: &mut Terminal<B>, config: &Config) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(REDRAW_INTERVAL_MS),
    );
    let mut app = App::new(
        config.duration_secs,
        config.word_count,
        word_source(config),
        runner.sender(),
    );

    loop {
        let snapshot = app.snapshot();
        terminal.draw(|f| f.render_widget(&snapshot, f.area()))?;

        if app.handle(runner.step()) == Control::Quit {
            break;
        }
    }

    info!("bye");
    Ok(())
}
