use anyhow::Result;
use tracing::Level;

use ar_measure::config::MeasureConfig;
use ar_measure::measure::RecordingScene;
use ar_measure::session::{AppEvent, ReferenceSpaceKind, SessionId};
use ar_measure::sim::{floor_hit, SimFrame, SimProvider};
use ar_measure::system::{CycleResult, MeasureSystem, TrackingOutcome};

/// Viewer eye height above the simulated floor, in meters.
const EYE_HEIGHT: f64 = 1.5;

/// Cycles in the scripted session.
const SESSION_CYCLES: usize = 240;

struct Args {
    config_path: Option<String>,
    verbose: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        config_path: None,
        verbose: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config_path = it.next(),
            "--verbose" | "-v" => args.verbose = true,
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
    }
    args
}

/// What the scripted user does on a given cycle.
enum Step {
    Track(SimFrame),
    TrackThenTap(SimFrame),
}

/// Sweep the view across the floor. Tap once too early, twice to measure, and
/// once more to reset; the runtime loses the hit-test source once in between.
fn script(cycle: usize) -> Step {
    let t = cycle as f64 / SESSION_CYCLES as f64;
    let pitch = 0.2 + 0.6 * t;
    let yaw = -0.4 + 0.8 * t;

    let frame = match cycle {
        // Looking at the horizon: nothing to hit.
        0..=19 => SimFrame::empty(),
        // Runtime drops the hit-test source for one cycle.
        150 => SimFrame::failing("hit-test source invalidated by runtime"),
        _ => floor_hit(EYE_HEIGHT, pitch, yaw),
    };

    match cycle {
        // The tap at cycle 10 lands before any surface is found.
        10 | 60 | 120 | 200 => Step::TrackThenTap(frame),
        _ => Step::Track(frame),
    }
}

fn log_cycle(result: &CycleResult) {
    if let Some(pose) = &result.pose {
        let p = pose.position();
        println!(
            "cycle {:>3}: reticle at [{:.2}, {:.2}, {:.2}] | {}",
            result.cycle, p.x, p.y, p.z, result.status
        );
    } else {
        println!(
            "cycle {:>3}: {:?} | {}",
            result.cycle, result.tracking, result.status
        );
    }
}

fn main() -> Result<()> {
    let args = parse_args();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let config = match &args.config_path {
        Some(path) => MeasureConfig::from_json_file(path)?,
        None => MeasureConfig::default(),
    };
    println!("Config: {}", serde_json::to_string(&config)?);

    let sim = SimProvider::immediate();
    // The first hit-test source request is rejected; the next cycle retries.
    sim.fail_next_source_requests(1);

    let mut system = MeasureSystem::new(sim.clone(), RecordingScene::new(), config);
    println!("{}", system.status());

    // A few cycles before the session exists.
    for _ in 0..3 {
        system.run_cycle::<SimFrame>(None);
    }

    system.post(AppEvent::SessionStart {
        session: SessionId(1),
        reference_space: sim.base_space(ReferenceSpaceKind::Local),
    });

    let mut last_tracking = None;
    for cycle in 0..SESSION_CYCLES {
        let (frame, tap) = match script(cycle) {
            Step::Track(frame) => (frame, false),
            Step::TrackThenTap(frame) => (frame, true),
        };

        let result = system.run_cycle(Some(&frame));
        if last_tracking != Some(result.tracking) || result.tracking == TrackingOutcome::QueryFailed
        {
            log_cycle(&result);
            last_tracking = Some(result.tracking);
        }

        if tap {
            // Input arrives between cycles and is handled before the next one.
            system.post(AppEvent::Select);
            let result = system.run_cycle(Some(&frame));
            for transition in &result.transitions {
                println!("tap -> {:?}", transition);
            }
            log_cycle(&result);
        }
    }

    system.handle_event(AppEvent::SessionEnd);
    println!("{}", system.status());

    let stats = system.source_manager().stats();
    println!(
        "Done! {} cycles, {} hit-test sources acquired, {} acquisition failures, {} invalidations",
        system.cycle_count(),
        stats.handles_acquired,
        stats.failures,
        stats.invalidations
    );
    println!(
        "Scene: {} entities allocated, {} disposed",
        system.registry().scene().allocated_count(),
        system.registry().scene().disposed().len()
    );

    Ok(())
}
