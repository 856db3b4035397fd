use super::*;
use crate::model::command::Command;
use crate::playback::interpret::TransitionKind;
use crate::playback::pacer::NoPause;
use serde_json::json;
use std::time::Duration;

// Blocks every pause until the test sends a token or drops the sender.
struct Gate(Mutex<mpsc::Receiver<()>>);

impl Pacer for Gate {
    fn pause(&self, _delay: Duration) {
        let rx = self.0.lock().unwrap();
        let _ = rx.recv();
    }
}

struct Explode;

impl Pacer for Explode {
    fn pause(&self, _delay: Duration) {
        panic!("pacer failed");
    }
}

fn instant(values: Vec<Value>) -> Engine {
    Engine::with_pacer(values, PlaybackConfig::default(), NoPause).unwrap()
}

fn ints(m: &ArrayModel) -> Vec<i64> {
    m.iter().map(|e| e.value.as_i64().unwrap()).collect()
}

#[test]
fn events_arrive_in_order_with_lines() {
    let engine = instant(vec![json!(1), json!(2), json!(3)]);
    let rx = engine.subscribe();
    let report = engine
        .run(Playlist::new(
            vec![Command::append(4), Command::Reverse, Command::pop()],
            vec![10, 11],
        ))
        .unwrap();
    assert_eq!(report.steps, 3);

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events.len(), 5);
    assert!(matches!(events[0], PlaybackEvent::RunStarted { total: 3, .. }));

    let frames: Vec<&StepFrame> = events
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::Step(f) => Some(f),
            _ => None,
        })
        .collect();
    assert_eq!(
        frames.iter().map(|f| f.step).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(frames[0].view.active_line, Some(10));
    assert_eq!(frames[1].view.active_line, Some(11));
    assert_eq!(frames[2].view.active_line, None);
    assert_eq!(ints(&frames[0].view.elements), vec![1, 2, 3, 4]);
    assert_eq!(ints(&frames[1].view.elements), vec![4, 3, 2, 1]);
    assert_eq!(ints(&frames[2].view.elements), vec![4, 3, 2]);
    assert!(frames.iter().all(|f| f.view.running));

    assert!(matches!(events[4], PlaybackEvent::Finished(ref r) if r == &report));
}

#[test]
fn run_returns_to_idle_and_clears_signals() {
    let engine = instant(vec![json!(5), json!(10)]);
    engine.run(Playlist::new(vec![Command::swap(0, 1)], vec![3])).unwrap();
    let view = engine.view();
    assert!(!view.running);
    assert_eq!(view.active_line, None);
    assert!(view.transitions.is_empty());
    assert_eq!(ints(&view.elements), vec![10, 5]);
    assert_eq!(engine.run_state(), RunState::Idle);
}

#[test]
fn transition_hints_last_one_step() {
    let engine = instant(vec![json!(5), json!(10)]);
    let ids = engine.view().elements.ids();
    let rx = engine.subscribe();
    engine
        .run(vec![Command::swap(0, 1), Command::append(1)])
        .unwrap();

    let hints: Vec<Vec<TransitionHint>> = rx
        .try_iter()
        .filter_map(|e| match e {
            PlaybackEvent::Step(f) => Some(f.view.transitions),
            _ => None,
        })
        .collect();
    assert_eq!(hints[0].len(), 2);
    assert!(hints[0].iter().all(|h| h.kind == TransitionKind::Swap));
    assert_eq!(
        hints[0].iter().map(|h| h.id).collect::<Vec<_>>(),
        ids
    );
    assert!(hints[1].is_empty());
}

#[test]
fn variables_reset_per_run_and_last_write_wins() {
    let engine = instant(vec![]);
    let report = engine
        .run(vec![Command::variable("x", 1), Command::variable("x", 2)])
        .unwrap();
    assert_eq!(report.variables.get("x"), Some(&json!(2)));
    assert_eq!(report.variables.len(), 1);

    let report = engine.run(vec![Command::variable("y", 0)]).unwrap();
    assert!(!report.variables.contains_key("x"));
}

#[test]
fn pacer_sees_scaled_delays_in_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let cfg = PlaybackConfig {
        speed: 2.0,
        ..PlaybackConfig::default()
    };
    let engine = Engine::with_pacer(vec![json!(1), json!(2)], cfg, move |d: Duration| {
        sink.lock().unwrap().push(d);
    })
    .unwrap();
    engine
        .run(vec![Command::append(3), Command::swap(0, 1), Command::delete(9)])
        .unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            Duration::from_millis(200),
            Duration::from_millis(500),
            Duration::from_millis(200),
        ]
    );
}

#[test]
fn start_while_running_is_rejected_without_side_effects() {
    let (release, gate) = mpsc::channel::<()>();
    let engine = Engine::with_pacer(
        vec![json!(1), json!(2), json!(3)],
        PlaybackConfig::default(),
        Gate(Mutex::new(gate)),
    )
    .unwrap();
    let rx = engine.subscribe();

    let handle = engine
        .start(Playlist::new(
            vec![Command::variable("x", 1), Command::append(4), Command::Reverse],
            vec![1, 2, 3],
        ))
        .unwrap()
        .into_handle()
        .unwrap();

    // Playback is now parked in the first pause.
    loop {
        if let PlaybackEvent::Step(_) = rx.recv().unwrap() {
            break;
        }
    }
    let before = engine.view();
    assert!(before.running);
    assert_eq!(before.active_line, Some(1));

    assert!(!engine.start(vec![Command::Clear]).unwrap().is_started());
    assert!(engine.run(vec![Command::Clear]).is_none());
    assert!(matches!(engine.load(vec![]), Err(PlayError::Rejected(_))));
    assert_eq!(engine.view(), before);

    drop(release);
    let report = handle.join().unwrap();
    assert_eq!(ints(&report.elements), vec![4, 3, 2, 1]);
    assert_eq!(report.variables.get("x"), Some(&json!(1)));
    assert!(!engine.is_running());

    // No second run was queued behind the first.
    let started = rx
        .try_iter()
        .filter(|e| matches!(e, PlaybackEvent::RunStarted { .. }))
        .count();
    assert_eq!(started, 0);
}

#[test]
fn load_replaces_array_with_fresh_ids() {
    let engine = instant(vec![json!(1)]);
    let old = engine.view().elements.ids();
    engine.load(vec![json!(1), json!(2)]).unwrap();
    let view = engine.view();
    assert_eq!(view.elements.len(), 2);
    assert!(!view.elements.ids().contains(&old[0]));
}

#[test]
fn expected_final_is_compared() {
    let engine = instant(vec![json!(1)]);
    let mut pl = Playlist::from(vec![Command::append(2)]);
    pl.expected_final = Some(vec![json!(1), json!(2)]);
    assert_eq!(engine.run(pl.clone()).unwrap().final_matches_expected, Some(true));
    assert_eq!(engine.run(pl).unwrap().final_matches_expected, Some(false));
}

#[test]
fn dropped_subscriber_is_pruned() {
    let engine = instant(vec![]);
    drop(engine.subscribe());
    let keep = engine.subscribe();
    engine.run(vec![Command::append(1)]).unwrap();
    assert_eq!(engine.shared.lock().subscribers.len(), 1);
    assert_eq!(keep.try_iter().count(), 3);
}

#[test]
fn rejects_invalid_config() {
    let cfg = PlaybackConfig {
        speed: 0.0,
        ..PlaybackConfig::default()
    };
    assert!(Engine::new(vec![], cfg).is_err());
}

#[test]
fn panicking_pacer_leaves_engine_idle() {
    let engine = Engine::with_pacer(vec![json!(1)], PlaybackConfig::default(), Explode).unwrap();

    let handle = engine
        .start(Playlist::new(
            vec![Command::variable("x", 1), Command::append(2)],
            vec![4, 5],
        ))
        .unwrap()
        .into_handle()
        .unwrap();
    assert!(handle.join().is_err());

    let view = engine.view();
    assert!(!engine.is_running());
    assert!(!view.running);
    assert_eq!(view.active_line, None);
    assert!(view.variables.is_empty());
    assert!(view.transitions.is_empty());

    assert!(engine.load(vec![json!(7)]).is_ok());
    let again = engine.start(vec![Command::Clear]).unwrap();
    assert!(again.is_started());
    assert!(again.into_handle().unwrap().join().is_err());
    assert!(!engine.is_running());
}

#[test]
fn begin_publishes_nothing_until_playback_starts() {
    let engine = instant(vec![json!(1)]);
    let rx = engine.subscribe();
    assert!(engine.shared.begin());
    assert!(rx.try_recv().is_err());
    assert!(engine.is_running());

    engine.shared.abort();
    assert!(!engine.is_running());
    assert!(rx.try_recv().is_err());

    engine.run(vec![Command::Clear]).unwrap();
    assert!(matches!(
        rx.try_recv(),
        Ok(PlaybackEvent::RunStarted { total: 1, .. })
    ));
}

#[test]
fn expected_final_treats_integral_floats_as_equal() {
    let engine = instant(vec![json!(1)]);
    let mut pl = Playlist::from(vec![Command::replace(0, 2)]);
    pl.expected_final = Some(vec![json!(2.0)]);
    assert_eq!(engine.run(pl).unwrap().final_matches_expected, Some(true));
}
