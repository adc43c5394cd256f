use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;
use type_defender::corpus::WordCorpus;
use type_defender::game::{Game, Hotspot, TickInput};
use type_defender::matcher::MatchResult;
use type_defender::runtime::{key_input, FixedTicker, GameEvent, Runner, TestEventSource};
use type_defender::session::{Phase, SessionConfig};
use type_defender::stats::{CsvStatsTable, HighScoreFile, MemoryStore, SessionStore, COLUMN_COUNT};

fn small_corpus() -> WordCorpus {
    WordCorpus::new(["cat", "dog", "owl", "fox", "elk"])
        .unwrap()
        .with_typo_probability(0.0)
}

fn key(c: char) -> GameEvent {
    GameEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Headless integration using the internal runtime + Game without a TTY.
// Verifies that typing a spawned word through Runner/TestEventSource scores it.
#[test]
fn headless_typing_flow_scores_a_word() {
    let mut game = Game::new(
        SessionConfig::default(),
        small_corpus(),
        MemoryStore::default(),
        StdRng::seed_from_u64(42),
    )
    .unwrap();

    let (tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(5));
    let runner = Runner::new(es, ticker);

    game.tick(&TickInput::new().hotspot(Hotspot::Resume)).unwrap();
    assert_eq!(game.phase(), Phase::Playing);
    let word = game.state().targets.iter().next().unwrap().text.clone();

    // Producer: the word, then Enter
    for c in word.chars() {
        tx.send(key(c)).unwrap();
    }
    tx.send(GameEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
        .unwrap();

    let mut pending = TickInput::new();
    let mut hits = Vec::new();
    for _ in 0..100u32 {
        match runner.step() {
            GameEvent::Tick => {
                let outcome = game.tick(&std::mem::take(&mut pending)).unwrap();
                hits.extend(outcome.submitted);
                if !hits.is_empty() {
                    break;
                }
            }
            GameEvent::Key(k) => pending.keys.push(key_input(&k)),
            GameEvent::Click(..) | GameEvent::Resize => {}
        }
    }

    assert_eq!(hits.len(), 1);
    let MatchResult::Hit { target, points } = &hits[0] else {
        panic!("expected a hit, got {:?}", hits[0]);
    };
    assert_eq!(target.text, word);
    assert_eq!(game.state().score, *points);
    assert!(game.state().targets.is_empty());
    assert_eq!(game.tracker().stats().correct_words, 1);
    assert_eq!(game.tracker().stats().correct_keystrokes, 3);
}

#[test]
fn headless_game_over_writes_stats_and_high_score() {
    let dir = tempdir().unwrap();
    let stats_path = dir.path().join("state").join("statistics.csv");
    let hs_file = HighScoreFile::with_path(dir.path().join("state").join("high_score.txt"));

    let config = SessionConfig {
        lives: 0,
        ..SessionConfig::default()
    };
    let mut game = Game::new(
        config,
        small_corpus(),
        CsvStatsTable::with_path(&stats_path),
        StdRng::seed_from_u64(7),
    )
    .unwrap()
    .with_high_score(0, Some(hs_file.clone()));

    game.tick(&TickInput::new().hotspot(Hotspot::Resume)).unwrap();

    // A level-1 target starts at most 2000 units away and moves at least 3 per tick.
    let mut ended = None;
    for _ in 0..1000u32 {
        let outcome = game.tick(&TickInput::new()).unwrap();
        if outcome.session_ended.is_some() {
            ended = outcome.session_ended;
            break;
        }
    }

    let summary = ended.expect("the only target should escape");
    assert_eq!(summary.words_shown, 1);
    assert_eq!(summary.words_missed, 1);
    assert_eq!(summary.score, 0);
    assert_eq!(game.phase(), Phase::Paused);
    assert_eq!(game.state().lives, 0);

    let text = std::fs::read_to_string(&stats_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].split(',').count(), COLUMN_COUNT);
    assert_eq!(game.store().load_all(), vec![summary]);
    assert_eq!(hs_file.load().unwrap(), 0);
}

#[test]
fn same_seed_plays_the_same_waves() {
    let run = |seed: u64| {
        let mut game = Game::new(
            SessionConfig::default(),
            WordCorpus::embedded().unwrap(),
            MemoryStore::default(),
            StdRng::seed_from_u64(seed),
        )
        .unwrap();
        game.tick(&TickInput::new().hotspot(Hotspot::Resume)).unwrap();
        for _ in 0..10 {
            game.tick(&TickInput::new()).unwrap();
        }
        game.state()
            .targets
            .iter()
            .map(|t| (t.text.clone(), t.speed, t.x, t.y))
            .collect::<Vec<_>>()
    };

    assert_eq!(run(99), run(99));
}
