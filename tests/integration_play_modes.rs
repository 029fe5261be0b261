use std::time::{Duration, SystemTime};

use assert_matches::assert_matches;

use oiltype::matcher::Matcher;
use oiltype::mode::FIXED_COUNT_TARGET;
use oiltype::variation::{expand, VariationCache};
use oiltype::word::load_builtin;
use oiltype::{Mode, Outcome, Session, SessionState, WordRecord};

fn words(pairs: &[(&str, &str)]) -> Vec<WordRecord> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, (display, romaji))| WordRecord::new(i.to_string(), *display, romaji))
        .collect()
}

fn type_str(session: &mut Session, text: &str, now: SystemTime) -> Vec<Outcome> {
    text.chars()
        .filter_map(|c| session.submit_at(&c.to_string(), now))
        .collect()
}

#[test]
fn every_builtin_word_completes_under_each_spelling() {
    let mut cache = VariationCache::new();
    for word in load_builtin("default").unwrap() {
        let variations = cache.get(&word.romaji);
        assert!(variations.contains(&word.romaji));

        for spelling in variations.iter() {
            // "nn" at the very end is shadowed by the single "n" completing first
            if spelling.ends_with("nn") && !word.romaji.ends_with("nn") {
                continue;
            }
            let mut m = Matcher::new(&word.romaji, variations.clone());
            let chars: Vec<char> = spelling.chars().collect();
            for (i, c) in chars.iter().enumerate() {
                let outcome = m.submit(&c.to_string());
                if i + 1 == chars.len() {
                    assert_matches!(outcome, Outcome::Complete { .. }, "{spelling} for {}", word.romaji);
                } else {
                    assert_matches!(outcome, Outcome::Correct { .. }, "{spelling} at {i}");
                }
            }
        }
    }
}

#[test]
fn whole_spelling_in_one_fragment_completes() {
    let variations = std::sync::Arc::new(expand("konnichiwa"));
    let mut m = Matcher::new("konnichiwa", variations);
    assert_eq!(
        m.submit("konitiwa"),
        Outcome::Complete {
            keystrokes: 8,
            variation: "konitiwa".into()
        }
    );
}

#[test]
fn fixed_count_finishes_at_target_on_a_short_loop() {
    let mut s = Session::new(
        words(&[("茶", "cha"), ("血", "chi"), ("津", "tsu")]),
        Mode::FixedCount,
    );
    let now = SystemTime::now();

    for i in 0..FIXED_COUNT_TARGET {
        assert!(!s.is_finished(), "finished early at word {i}");
        let romaji = s.current_word().unwrap().romaji.clone();
        type_str(&mut s, &romaji, now);
    }

    assert!(s.is_finished());
    let summary = s.summary().unwrap();
    assert_eq!(summary.words_completed, FIXED_COUNT_TARGET);
    assert_eq!(summary.samples.len(), FIXED_COUNT_TARGET as usize);

    // further input is refused
    assert_eq!(s.submit_at("c", now), None);
}

#[test]
fn sudden_death_ends_on_first_wrong_key() {
    let mut s = Session::new(words(&[("寿司", "sushi")]), Mode::SuddenDeath);
    let start = SystemTime::now();

    let outcomes = type_str(&mut s, "sux", start);
    assert_matches!(outcomes.last(), Some(Outcome::Incorrect));
    assert!(s.is_finished());

    let summary = s.summary().unwrap();
    assert_eq!(summary.correct_keystrokes, 2);
    assert_eq!(summary.incorrect_keystrokes, 1);
    assert_eq!(summary.mode, Mode::SuddenDeath);
}

#[test]
fn survival_recovers_by_canonical_length() {
    let mut s = Session::new(words(&[("茶", "cha"), ("寿司", "sushi")]), Mode::Survival);
    let now = SystemTime::now();

    // short spelling still earns the canonical three letters
    type_str(&mut s, "tya", now);
    let remaining = s.seconds_remaining().unwrap();
    assert!((remaining - 7.3).abs() < 1e-9, "remaining {remaining}");

    for _ in 0..73 {
        s.tick();
    }
    assert!(s.is_finished());
}

#[test]
fn time_attack_clock_expires_once() {
    let mut s = Session::new(words(&[("油", "abura")]), Mode::TimeAttack);
    let now = SystemTime::now();
    type_str(&mut s, "a", now);

    let mut applied = 0;
    for _ in 0..700 {
        if s.tick() {
            applied += 1;
        }
    }
    assert_eq!(applied, 600);
    assert!(s.is_finished());
    assert_eq!(s.seconds_remaining(), Some(0.0));
    assert_eq!(s.summary().unwrap().correct_keystrokes, 1);
}

#[test]
fn full_width_and_kana_input_match() {
    let mut s = Session::new(words(&[("傘", "kasa"), ("油", "abura")]), Mode::Free);
    let now = SystemTime::now();

    assert_matches!(s.submit_at("ｋ", now), Some(Outcome::Correct { .. }));
    assert!(!s.composition_active());
    assert_matches!(s.submit_at("ａ", now), Some(Outcome::Correct { .. }));
    assert_matches!(s.submit_at("さ", now), Some(Outcome::Complete { .. }));
    assert!(s.composition_active());

    assert_eq!(s.progress().total_words_completed, 1);
    assert_eq!(s.current_word().unwrap().romaji, "abura");
}

#[test]
fn exit_from_idle_reports_zeros() {
    let mut s = Session::new(words(&[("油", "abura")]), Mode::Free);
    s.exit_at(SystemTime::now());

    let summary = s.summary().unwrap();
    assert_eq!(summary.wpm, 0.0);
    assert_eq!(summary.accuracy, 100.0);
    assert_eq!(summary.words_completed, 0);
    assert!(summary.samples.is_empty());
}

#[test]
fn competitive_retry_takes_a_new_word_list() {
    let mut s = Session::new(words(&[("油", "abura")]), Mode::Competitive);
    let start = SystemTime::now();
    type_str(&mut s, "abura", start);
    s.exit_at(start + Duration::from_secs(30));
    assert!(s.rules().refresh_words_on_retry);

    let fresh = load_builtin("pro").unwrap();
    let first = fresh[0].clone();
    s.reinitialize_with(fresh);

    assert_eq!(s.state(), SessionState::Idle);
    assert_eq!(s.current_word(), Some(&first));
    assert_eq!(s.seconds_remaining(), Some(60.0));
    assert!(s.summary().is_none());
}
