/// PROPERTY-BASED TESTS: replication invariants
///
/// Key invariants:
/// 1. Mirrors converge to the host after a clean round, whatever was lost before
/// 2. Applying a diff twice equals applying it once
/// 3. Any number of assignments in one window notifies the root once

use std::{cell::Cell, rc::Rc};

use naia_replica_shared::{PropertyMutate, PropertyMutator, Replicator};
use naia_replica_test::{mirror_of, Delivery, Position, TestSession, Unit};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Hp(i64),
    Name(String),
    X(i64),
    Y(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0i64..200).prop_map(Op::Hp),
        "[a-z]{0,6}".prop_map(Op::Name),
        (-5i64..5).prop_map(Op::X),
        (-5i64..5).prop_map(Op::Y),
    ]
}

fn apply_op(unit: &Unit, op: &Op) {
    match op {
        Op::Hp(hp) => unit.set_hp(*hp),
        Op::Name(name) => unit.set_name(name),
        Op::X(x) => unit.pos().set_x(*x),
        Op::Y(y) => unit.pos().set_y(*y),
    }
}

struct Count(Rc<Cell<usize>>);

impl PropertyMutate for Count {
    fn mutate(&mut self, _property: &str) -> bool {
        self.0.set(self.0.get() + 1);
        true
    }
}

proptest! {
    /// Rounds of random edits with random packet loss always end converged
    /// once a round gets through
    #[test]
    fn prop_mirrors_converge_after_loss(
        rounds in prop::collection::vec(
            (prop::collection::vec(op_strategy(), 0..5), any::<bool>()),
            1..12
        ),
        late_join in 0usize..12,
    ) {
        let mut session = TestSession::default();
        session.add_client();
        let unit = Unit::default();
        let entity = session.spawn(unit.tracker());

        for (index, (ops, delivered)) in rounds.iter().enumerate() {
            if index == late_join {
                session.add_client();
            }
            for op in ops {
                apply_op(&unit, op);
            }
            let delivery = if *delivered { Delivery::Deliver } else { Delivery::Drop };
            session.exchange_with(|_, _| delivery);
        }

        session.exchange();
        prop_assert!(session.check_converged(entity).is_ok(), "{:?}", session.check_converged(entity));
    }

    /// Applying the same diff twice leaves the mirror as applying it once
    #[test]
    fn prop_apply_is_idempotent(ops in prop::collection::vec(op_strategy(), 1..10)) {
        let unit = Unit::default();
        let mirror = mirror_of(&unit.tracker());
        let _ = unit.tracker().gen_diff(0, 1);

        for op in &ops {
            apply_op(&unit, op);
        }
        let diff = unit.tracker().gen_diff(1, 2).into_changes().unwrap_or_default();

        mirror.apply_diff(&diff);
        let once = mirror.target();
        mirror.apply_diff(&diff);

        prop_assert_eq!(mirror.target(), once);
    }

    /// The root hears about a window exactly once, however many edits it holds
    #[test]
    fn prop_one_notification_per_window(
        windows in prop::collection::vec(prop::collection::vec(op_strategy(), 1..8), 1..5)
    ) {
        let unit = Unit::new(-1, "", Position::new(-10, -10));
        let tracker = unit.tracker();
        let count = Rc::new(Cell::new(0));
        tracker.set_mutator(PropertyMutator::new(Count(count.clone())));
        let _ = tracker.gen_diff(0, 1);

        for (index, ops) in windows.iter().enumerate() {
            let before = count.get();
            for op in ops {
                apply_op(&unit, op);
            }
            prop_assert!(count.get() - before <= 1);
            prop_assert_eq!(count.get() - before, usize::from(tracker.is_dirty()));

            let version = index as u64 + 2;
            let _ = tracker.gen_diff(version - 1, version);
            prop_assert!(!tracker.has_pending_notify());
        }
    }
}
