//! Property-based invariant tests for the game state machine.
//!
//! Verifies, for arbitrary word lists and keystroke/tick interleavings:
//! 1. The typed prefix is always a prefix of the current word
//! 2. correct + misses equals the number of scored keystrokes
//! 3. Remaining time never exceeds the duration and reaching zero ends the game
//! 4. Playing with a loaded list implies the word index is in range
//! 5. Final metrics never change once the game is finished
//! 6. Typing every word in order always finishes the game

use keyrush::game::{Game, GamePhase};
use keyrush::matcher::{KeyInput, MatchOutcome};
use keyrush::word_source::WordBatch;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Step {
    Key(KeyInput),
    Tick,
}

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-e]{1,6}", 1..6)
}

fn arb_key() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        6 => prop::char::range('a', 'f').prop_map(KeyInput::Char),
        1 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Enter),
        1 => Just(KeyInput::Ignored),
    ]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        8 => arb_key().prop_map(Step::Key),
        1 => Just(Step::Tick),
    ]
}

fn loaded_game(duration_secs: u32, words: Vec<String>) -> Game {
    let mut game = Game::new(duration_secs);
    let generation = game.start();
    game.on_words_loaded(
        generation,
        WordBatch {
            words,
            warning: None,
        },
    );
    game
}

proptest! {
    #[test]
    fn invariants_hold_after_every_step(
        words in arb_words(),
        duration in 1u32..20,
        steps in prop::collection::vec(arb_step(), 0..200),
    ) {
        let mut game = loaded_game(duration, words.clone());
        let generation = game.generation();
        let mut scored = 0u32;
        let mut frozen = None;

        for step in steps {
            match step {
                Step::Key(input) => {
                    let was_playing = game.phase() == GamePhase::Playing;
                    let outcome = game.on_key(input);
                    if was_playing && matches!(outcome, MatchOutcome::Advanced | MatchOutcome::WordComplete | MatchOutcome::Miss) {
                        scored += 1;
                    }
                }
                Step::Tick => game.on_tick(generation),
            }

            prop_assert!(game.current_word().starts_with(game.typed_prefix()));
            prop_assert_eq!(game.correct_count() + game.miss_count(), scored);
            prop_assert!(game.remaining_secs() <= duration);

            match game.phase() {
                GamePhase::Playing => {
                    prop_assert!(game.word_index() < words.len());
                    prop_assert!(game.remaining_secs() > 0);
                    prop_assert!(game.final_metrics().is_none());
                }
                GamePhase::Finished => {
                    prop_assert!(game.final_metrics().is_some());
                    prop_assert_eq!(game.typed_prefix(), "");
                    match frozen {
                        None => frozen = game.final_metrics(),
                        Some(m) => prop_assert_eq!(game.final_metrics(), Some(m)),
                    }
                }
                GamePhase::Idle => prop_assert!(false, "loaded game never returns to idle"),
            }
        }
    }

    #[test]
    fn typing_every_word_finishes(words in arb_words()) {
        let mut game = loaded_game(60, words.clone());

        for word in &words {
            for c in word.chars() {
                game.on_key(KeyInput::Char(c));
            }
        }

        prop_assert_eq!(game.phase(), GamePhase::Finished);
        prop_assert_eq!(game.word_index(), words.len());
        prop_assert_eq!(game.miss_count(), 0);
        prop_assert_eq!(
            game.correct_count() as usize,
            words.iter().map(|w| w.len()).sum::<usize>()
        );
    }

    #[test]
    fn single_miss_leaves_prefix(words in arb_words(), typed in 0usize..6) {
        let mut game = loaded_game(60, words.clone());
        let first = &words[0];
        let typed = typed.min(first.len() - 1);
        for c in first.chars().take(typed) {
            game.on_key(KeyInput::Char(c));
        }
        let before = game.typed_prefix().to_string();
        let misses = game.miss_count();

        // 'z' never occurs in generated words
        prop_assert_eq!(game.on_key(KeyInput::Char('z')), MatchOutcome::Miss);

        prop_assert_eq!(game.miss_count(), misses + 1);
        prop_assert_eq!(game.typed_prefix(), before.as_str());
    }
}
