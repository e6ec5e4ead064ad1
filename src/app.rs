use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, error, warn};

use crate::error::{StartError, START_FAILED_MESSAGE};
use crate::game::{Game, GamePhase, Snapshot};
use crate::matcher::KeyInput;
use crate::runtime::GameEvent;
use crate::timer::{TickThread, TICK_INTERVAL};
use crate::word_source::{acquire_words, WordSource};

/// What the event loop should do after an event was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Owns the game and the workers feeding it; every event goes through `handle`.
pub struct App {
    game: Game,
    source: Arc<dyn WordSource>,
    word_count: usize,
    tx: Sender<GameEvent>,
    ticker: Option<TickThread>,
    tick_interval: Duration,
}

impl App {
    pub fn new(
        duration_secs: u32,
        word_count: usize,
        source: Arc<dyn WordSource>,
        tx: Sender<GameEvent>,
    ) -> Self {
        Self {
            game: Game::new(duration_secs),
            source,
            word_count,
            tx,
            ticker: None,
            tick_interval: TICK_INTERVAL,
        }
    }

    /// Use a shorter countdown interval; for tests.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn snapshot(&self) -> Snapshot {
        self.game.snapshot()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(TickThread::is_running)
    }

    pub fn handle(&mut self, event: GameEvent) -> Control {
        let control = match event {
            GameEvent::Key(key) => self.on_key(key),
            GameEvent::Tick { generation } => {
                self.game.on_tick(generation);
                Control::Continue
            }
            GameEvent::WordsLoaded { generation, batch } => {
                self.game.on_words_loaded(generation, batch);
                Control::Continue
            }
            GameEvent::Resize | GameEvent::Idle => Control::Continue,
        };

        if self.game.phase() != GamePhase::Playing {
            self.stop_countdown();
        }

        control
    }

    fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.kind == KeyEventKind::Release {
            return Control::Continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Char('c') if ctrl => return Control::Quit,
            KeyCode::Tab => {
                self.start();
                return Control::Continue;
            }
            _ => {}
        }

        match self.game.phase() {
            GamePhase::Idle => {
                if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
                    self.start();
                }
            }
            GamePhase::Finished => {
                if matches!(
                    key.code,
                    KeyCode::Char('r') | KeyCode::Char(' ') | KeyCode::Enter
                ) {
                    self.start();
                }
            }
            GamePhase::Playing => {
                let outcome = self.game.on_key(KeyInput::from_key_event(&key));
                debug!(?outcome, "key applied");
            }
        }

        Control::Continue
    }

    /// Start (or restart) a game: reset, fetch words in the background and
    /// start the countdown.
    pub fn start(&mut self) {
        self.stop_countdown();
        let generation = self.game.start();

        if let Err(e) = self.spawn_workers(generation) {
            error!(error = %e, "failed to start game");
            self.stop_countdown();
            self.game.abort_start(START_FAILED_MESSAGE);
        }
    }

    fn spawn_workers(&mut self, generation: u64) -> Result<(), StartError> {
        let source = Arc::clone(&self.source);
        let count = self.word_count;
        let tx = self.tx.clone();

        thread::Builder::new()
            .name(format!("word-loader-{generation}"))
            .spawn(move || {
                let batch = acquire_words(source.as_ref(), count, &mut rand::thread_rng());
                if tx.send(GameEvent::WordsLoaded { generation, batch }).is_err() {
                    warn!(generation, "event loop gone before words arrived");
                }
            })
            .map_err(StartError::SpawnLoader)?;

        let ticker = TickThread::spawn(self.tx.clone(), generation, self.tick_interval)
            .map_err(StartError::SpawnCountdown)?;
        self.ticker = Some(ticker);

        Ok(())
    }

    fn stop_countdown(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.stop_countdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word_source::{StaticWordSource, WordBatch};
    use std::sync::mpsc::{self, Receiver};

    fn key(code: KeyCode) -> GameEvent {
        GameEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app_with(words: &[&str]) -> (App, Receiver<GameEvent>) {
        let (tx, rx) = mpsc::channel();
        let source = Arc::new(StaticWordSource::new(words.iter().copied()));
        // long interval keeps the countdown out of the way
        let app = App::new(60, 20, source, tx).with_tick_interval(Duration::from_secs(3600));
        (app, rx)
    }

    fn wait_for_words(app: &mut App, rx: &Receiver<GameEvent>) {
        loop {
            let ev = rx
                .recv_timeout(Duration::from_secs(5))
                .expect("word loader should answer");
            let done = matches!(ev, GameEvent::WordsLoaded { .. });
            app.handle(ev);
            if done {
                break;
            }
        }
    }

    #[test]
    fn test_space_starts_from_idle() {
        let (mut app, rx) = app_with(&["cat"]);

        assert_eq!(app.handle(key(KeyCode::Char(' '))), Control::Continue);
        assert_eq!(app.game().phase(), GamePhase::Playing);
        assert!(app.game().is_loading());
        assert!(app.is_ticking());

        wait_for_words(&mut app, &rx);
        assert_eq!(app.snapshot().current_word, "cat");
    }

    #[test]
    fn test_other_keys_do_not_start() {
        let (mut app, _rx) = app_with(&["cat"]);

        app.handle(key(KeyCode::Char('x')));
        app.handle(key(KeyCode::Left));

        assert_eq!(app.game().phase(), GamePhase::Idle);
        assert!(!app.is_ticking());
    }

    #[test]
    fn test_escape_and_ctrl_c_quit() {
        let (mut app, _rx) = app_with(&["cat"]);

        assert_eq!(app.handle(key(KeyCode::Esc)), Control::Quit);
        assert_eq!(
            app.handle(GameEvent::Key(KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL
            ))),
            Control::Quit
        );
    }

    #[test]
    fn test_finishing_stops_countdown() {
        let (mut app, rx) = app_with(&["cat"]);
        app.handle(key(KeyCode::Enter));
        wait_for_words(&mut app, &rx);

        for c in "cat".chars() {
            app.handle(key(KeyCode::Char(c)));
        }

        assert_eq!(app.game().phase(), GamePhase::Finished);
        assert!(!app.is_ticking());
    }

    #[test]
    fn test_replay_from_finished() {
        let (mut app, rx) = app_with(&["cat"]);
        app.handle(key(KeyCode::Enter));
        wait_for_words(&mut app, &rx);
        for c in "cat".chars() {
            app.handle(key(KeyCode::Char(c)));
        }

        app.handle(key(KeyCode::Char('r')));

        assert_eq!(app.game().phase(), GamePhase::Playing);
        assert_eq!(app.game().generation(), 2);
        assert_eq!(app.game().correct_count(), 0);
        assert!(app.is_ticking());
    }

    #[test]
    fn test_tab_restarts_mid_game_and_discards_old_results() {
        let (mut app, rx) = app_with(&["cat", "dog"]);
        app.handle(key(KeyCode::Enter));
        wait_for_words(&mut app, &rx);
        app.handle(key(KeyCode::Char('c')));

        app.handle(key(KeyCode::Tab));
        assert_eq!(app.game().generation(), 2);

        // a late result from the first game must not land
        app.handle(GameEvent::WordsLoaded {
            generation: 1,
            batch: WordBatch {
                words: vec!["stale".into()],
                warning: None,
            },
        });
        assert!(app.game().is_loading());

        wait_for_words(&mut app, &rx);
        assert_ne!(app.snapshot().current_word, "stale");
        assert_eq!(app.game().correct_count(), 0);
    }

    #[test]
    fn test_countdown_expiry_finishes_game() {
        let (tx, rx) = mpsc::channel();
        let source = Arc::new(StaticWordSource::new(["cat"]));
        let mut app = App::new(2, 20, source, tx).with_tick_interval(Duration::from_millis(5));

        app.handle(key(KeyCode::Enter));
        for _ in 0..100 {
            let ev = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            app.handle(ev);
            if app.game().phase() == GamePhase::Finished {
                break;
            }
        }

        let snapshot = app.snapshot();
        assert_eq!(snapshot.phase, GamePhase::Finished);
        assert_eq!(snapshot.remaining_secs, 0);
        assert!(snapshot.final_metrics.is_some());
        assert!(!app.is_ticking());
    }

    #[test]
    fn test_modifier_keys_are_not_misses() {
        let (mut app, rx) = app_with(&["cat"]);
        app.handle(key(KeyCode::Enter));
        wait_for_words(&mut app, &rx);

        app.handle(key(KeyCode::Left));
        app.handle(key(KeyCode::Modifier(
            crossterm::event::ModifierKeyCode::LeftShift,
        )));
        app.handle(GameEvent::Key(KeyEvent::new(
            KeyCode::Char('a'),
            KeyModifiers::ALT,
        )));

        assert_eq!(app.game().miss_count(), 0);
        assert_eq!(app.game().correct_count(), 0);
    }
}
