//! Integration tests for ControlSignals shared with interrupt handlers

use std::sync::Barrier;
use std::thread;

use poi_timeline::{ControlInput, ControlSignals};

static SIGNALS: ControlSignals = ControlSignals::new(400);

#[test]
fn concurrent_edges_in_one_window_are_accepted_once() {
    SIGNALS.arm(0);

    for round in 1..=200u32 {
        let now_ms = round * 1000;
        let barrier = Barrier::new(4);

        let accepted = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let barrier = &barrier;
                    scope.spawn(move || {
                        barrier.wait();
                        SIGNALS.raise(ControlInput::SlotSwitch, now_ms)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|accepted| *accepted)
                .count()
        });

        assert_eq!(accepted, 1, "round {}", round);
        assert!(SIGNALS.take().slot_switch);
    }
}

#[test]
fn take_reports_each_input_separately() {
    let signals = ControlSignals::new(0);

    assert!(signals.raise(ControlInput::Button, 1));
    assert!(signals.raise(ControlInput::FetchSwitch, 2));

    let pending = signals.take();
    assert!(pending.button);
    assert!(pending.fetch_switch);
    assert!(!pending.slot_switch);
    assert!(signals.take().is_empty());
}
