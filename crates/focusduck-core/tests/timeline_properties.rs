//! Property tests over random input sequences.

use chrono::Utc;
use focusduck_core::{
    Command, Config, FocusSession, Input, MemoryStore, SessionDriver, SessionParams,
};
use proptest::prelude::*;

fn input_strategy() -> impl Strategy<Value = Input> {
    prop_oneof![
        4 => Just(Input::Activity),
        2 => Just(Input::PageClick),
        2 => any::<bool>().prop_map(|visible| Input::Visibility { visible }),
        1 => prop_oneof![
            Just(Command::StartBreak),
            Just(Command::EndBreak),
            Just(Command::ToggleBreak),
            Just(Command::StartReading),
            Just(Command::EndReading),
            Just(Command::ToggleReading),
        ]
        .prop_map(|command| Input::Command { command }),
    ]
}

/// Steps as (delay before the step in ms, input). Delays reach past the
/// idle threshold so falls and recoveries get exercised.
fn steps_strategy() -> impl Strategy<Value = Vec<(u64, Input)>> {
    prop::collection::vec((0u64..90_000, input_strategy()), 0..40)
}

fn run(steps: &[(u64, Input)]) -> SessionDriver<MemoryStore> {
    let config = Config::default();
    let session = FocusSession::new(SessionParams::new("prop", 1_500, Utc::now()), &config);
    let mut driver = SessionDriver::new(session, MemoryStore::new(), config.session.tick_ms);
    let mut t = 0;
    for (delay, input) in steps {
        t += delay;
        driver.dispatch_at(t, input.clone());
    }
    driver.advance_to(t + 20_000);
    driver
}

proptest! {
    #[test]
    fn segments_tile_the_session_axis(steps in steps_strategy()) {
        let driver = run(&steps);
        let timeline = driver.session().timeline();
        let elapsed = driver.session().clock().elapsed_secs();

        let mut cursor = 0;
        for seg in timeline.closed_segments() {
            prop_assert_eq!(seg.start_offset_secs, cursor);
            let end = seg.end_offset_secs.expect("closed segment has an end");
            prop_assert!(end > seg.start_offset_secs);
            cursor = end;
        }
        let open = timeline.open_segment();
        prop_assert!(open.is_open());
        prop_assert_eq!(open.start_offset_secs, cursor);
        prop_assert!(open.start_offset_secs <= elapsed);
    }

    #[test]
    fn every_tick_charges_exactly_one_counter(steps in steps_strategy()) {
        let driver = run(&steps);
        let clock = driver.session().clock();
        prop_assert_eq!(clock.elapsed_secs(), driver.now_ms() / 1_000);
        prop_assert_eq!(driver.store().counters("prop"), clock);
    }

    #[test]
    fn override_flags_follow_the_open_segment(steps in steps_strategy()) {
        let driver = run(&steps);
        let s = driver.session();
        prop_assert!(!(s.is_on_break() && s.is_reading()));
        let open = s.timeline().open_segment();
        prop_assert_eq!(s.is_on_break(), open.gap_reason() == Some(focusduck_core::GapReason::Break));
        prop_assert_eq!(s.is_reading(), open.gap_reason() == Some(focusduck_core::GapReason::Reading));
    }

    #[test]
    fn milestones_never_exceed_progress(steps in steps_strategy()) {
        let driver = run(&steps);
        let progress = driver.session().progress();
        for milestone in progress.fired() {
            prop_assert!(progress.percent() >= f64::from(milestone.percent()));
        }
    }
}
