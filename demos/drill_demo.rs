//! End-to-end demo of a drill run.
//!
//! Run with: `cargo run --example drill_demo`
//!
//! A simulated learner works through a small run of times-table expressions
//! and basic poker facts. They answer correctly most of the time, fumble a
//! few items, and the session queues those for a retry pass.
//!
//! ## Key concepts demonstrated
//!
//! - `DrillConfig::from_json_str` with a fixed `rngSeed`, so the run repeats.
//! - Driving the session with timestamped `SessionEvent`s; nothing sleeps.
//! - Rendering from `host_adapter::to_host_state` after each answer.
//! - Repeating the run after completion.

use numa_drill::{
    host_adapter::to_host_state, Drill, DrillConfig, QuestionBank, SessionEvent, SessionSignal,
    SessionState,
};

const CONFIG: &str = r#"{
    "generation": {
        "selectedOps": ["×", "+"],
        "selectedNums": [3, 7],
        "start": 2,
        "end": 4,
        "modes": ["Surges"]
    },
    "pokerLevels": [1],
    "chronometer": true,
    "countdownOption": 5,
    "rngSeed": 2024
}"#;

fn print_snapshot(drill: &Drill, now: u64) {
    let state = to_host_state(drill, now);
    println!(
        "  fails {}  done {}  chrono {}  countdown {}",
        state["hud"]["failCount"].as_str().unwrap_or(""),
        state["hud"]["progress"].as_str().unwrap_or(""),
        state["clock"]["chronometer"].as_str().unwrap_or(""),
        state["clock"]["countdown"].as_str().unwrap_or(""),
    );
}

/// Answer whatever is on screen; every seventh question gets a wrong answer.
fn run_through(drill: &mut Drill, now: &mut u64) {
    let mut asked = 0;
    while drill.session().state() == SessionState::AwaitingInput {
        let prompt = drill.session().current_prompt().unwrap_or_default().to_string();
        let canonical = drill.session().current_key().map(|k| k.canonical.clone()).unwrap_or_default();
        asked += 1;
        let typed = if asked % 7 == 0 { "0".repeat(canonical.len()) } else { canonical };

        *now += 1_200;
        drill.handle(SessionEvent::InputChanged { value: typed.clone(), at: *now });
        *now += 300;
        let update = drill.tick(*now);

        for signal in &update.signals {
            match signal {
                SessionSignal::Answered(record) => {
                    let mark = if record.correct { "✓" } else { "✗" };
                    println!("  {mark} {prompt}{typed}");
                }
                SessionSignal::PassStarted { pass, items } => {
                    println!();
                    println!("── retry pass {pass}: {items} item(s) ──");
                }
                SessionSignal::SessionComplete { fail_count, total } => {
                    println!();
                    println!("Session complete: {fail_count} miss(es) over {total} questions.");
                }
                _ => {}
            }
        }
        if update.signals.iter().any(|s| matches!(s, SessionSignal::Answered(r) if !r.correct)) {
            print_snapshot(drill, *now);
        }
    }
}

fn main() {
    let config = match DrillConfig::from_json_str(CONFIG) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("bad config: {e}");
            return;
        }
    };
    let bank = QuestionBank::new();

    let mut now = 0;
    let (mut drill, _) = match Drill::start(&config, &bank, now) {
        Ok(started) => started,
        Err(e) => {
            eprintln!("cannot start: {e}");
            return;
        }
    };

    let summary = drill.summary();
    println!();
    println!("══ Run: {} questions (~{}s) ══", summary.total, summary.estimated_seconds);
    println!(
        "   {} generated, {} poker facts, {} authored",
        summary.expressions, summary.poker_facts, summary.records
    );
    println!();

    now += 100;
    drill.tick(now);
    run_through(&mut drill, &mut now);
    print_snapshot(&drill, now);

    println!();
    println!("══ Repeat ══");
    now += 2_000;
    drill.handle(SessionEvent::Repeat { at: now });
    now += 50;
    drill.tick(now);
    run_through(&mut drill, &mut now);
    print_snapshot(&drill, now);

    drill.handle(SessionEvent::Exit);
}
