use pips_core::roller::ScriptedFaces;
use pips_core::{Face, HISTORY_CAPACITY, RollController, StatsSnapshot};
use proptest::prelude::*;
use std::time::{Duration, Instant};

fn arb_faces(max_len: usize) -> impl Strategy<Value = Vec<Face>> {
    prop::collection::vec(
        (1_u8..=6).prop_map(|v| Face::new(v).expect("strategy yields 1..=6")),
        1..max_len,
    )
}

fn roll_all(faces: &[Face]) -> RollController<ScriptedFaces> {
    let mut controller =
        RollController::new(ScriptedFaces::new(faces.iter().copied()), Duration::ZERO);
    let now = Instant::now();
    for _ in faces {
        controller.roll_now(now).expect("idle controller always rolls");
    }
    controller
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn ledger_keeps_newest_twenty(faces in arb_faces(60)) {
        let controller = roll_all(&faces);
        let history = controller.history();

        prop_assert!(history.len() <= HISTORY_CAPACITY);
        prop_assert_eq!(history.len(), faces.len().min(HISTORY_CAPACITY));

        let expected: Vec<Face> = faces.iter().rev().take(HISTORY_CAPACITY).copied().collect();
        let shown: Vec<Face> = history.values().collect();
        prop_assert_eq!(shown, expected);
        prop_assert_eq!(Some(controller.current()), faces.last().copied());
    }

    #[test]
    fn stats_bound_every_value(faces in arb_faces(60)) {
        let controller = roll_all(&faces);
        let stats = controller.stats().expect("non-empty history has stats");
        let values: Vec<u8> = controller.history().values().map(Face::get).collect();

        prop_assert_eq!(stats.count, values.len());
        prop_assert!(values.iter().all(|v| *v <= stats.max.get()));
        prop_assert!(values.iter().all(|v| *v >= stats.min.get()));
        prop_assert!(values.contains(&stats.max.get()));
        prop_assert!(values.contains(&stats.min.get()));

        let sum: u32 = values.iter().map(|v| u32::from(*v)).sum();
        let exact = f64::from(sum) / values.len() as f64;
        prop_assert!((stats.average.value() - exact).abs() <= 0.005 + 1e-9);
        prop_assert_eq!(format!("{:.2}", stats.average.value()), stats.average.to_string());
    }

    #[test]
    fn clear_always_empties(faces in arb_faces(30)) {
        let mut controller = roll_all(&faces);
        controller.clear_history();
        prop_assert!(controller.history().is_empty());
        prop_assert!(controller.stats().is_none());
        prop_assert!(StatsSnapshot::from_ledger(controller.history()).is_none());
    }

    #[test]
    fn requests_during_roll_never_add_history(extra in 1_usize..10) {
        let mut controller = RollController::seeded(Some(1), Duration::from_millis(600));
        let t0 = Instant::now();
        controller.request_roll(t0);
        for i in 0..extra {
            let at = t0 + Duration::from_millis(50 * i as u64);
            prop_assert_eq!(controller.request_roll(at), pips_core::RollRequest::Ignored);
            prop_assert!(controller.poll(at).is_none());
        }
        prop_assert!(controller.history().is_empty());
        let record = controller.poll(t0 + Duration::from_millis(600));
        prop_assert!(record.is_some());
        prop_assert_eq!(controller.history().len(), 1);
        prop_assert!((1..=6).contains(&controller.current().get()));
    }
}
