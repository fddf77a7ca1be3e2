/// END TO END TESTS: host to client replication over an in-memory link

use naia_replica_server::ServerConfig;
use naia_replica_shared::{Replicator, Value};
use naia_replica_test::{assert_converged, Delivery, Position, TestSession, Unit};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_spawned_root_reaches_client() {
    init_logger();
    let mut session = TestSession::default();
    session.add_client();

    let unit = Unit::new(80, "scout", Position::new(3, 0));
    let entity = session.spawn(unit.tracker());

    assert_eq!(session.exchange(), 1);
    assert_converged!(session, entity);

    let mirror = session.mirror(0, entity).unwrap();
    assert_eq!(mirror.value("hp"), Some(Value::Int(80)));
    assert_eq!(mirror.child("pos").and_then(|pos| pos.value("x")), Some(Value::Int(3)));
}

#[test]
fn test_nested_change_is_replicated() {
    init_logger();
    let mut session = TestSession::default();
    session.add_client();
    let unit = Unit::default();
    let entity = session.spawn(unit.tracker());
    session.exchange();

    unit.pos().set_y(9);
    assert!(session.host.has_changes());
    session.exchange();

    assert_converged!(session, entity);
    assert_eq!(session.client(0).remote.applied_version(), session.host.round());
}

#[test]
fn test_late_client_gets_full_state() {
    init_logger();
    let mut session = TestSession::default();
    session.add_client();
    let unit = Unit::default();
    let entity = session.spawn(unit.tracker());

    unit.set_hp(50);
    session.exchange();
    unit.pos().set_x(4);
    session.exchange();
    unit.set_name("veteran");
    session.exchange();

    let late = session.add_client();
    session.exchange();

    assert_eq!(session.client(late).remote.applied_version(), 3);
    assert_converged!(session, entity);
}

#[test]
fn test_dropped_packets_are_recovered() {
    init_logger();
    let mut session = TestSession::default();
    session.add_client();
    let unit = Unit::default();
    let entity = session.spawn(unit.tracker());
    session.exchange();

    unit.set_hp(70);
    assert_eq!(session.exchange_with(|_, _| Delivery::Drop), 0);
    unit.pos().set_x(2);
    assert_eq!(session.exchange_with(|_, _| Delivery::Drop), 0);
    assert!(session.check_converged(entity).is_err());

    session.exchange();
    assert_converged!(session, entity);
}

#[test]
fn test_reordered_packets_converge() {
    init_logger();
    let mut session = TestSession::default();
    let client = session.add_client();
    let unit = Unit::default();
    let entity = session.spawn(unit.tracker());
    let observer = session.client(client).observer;

    unit.set_hp(10);
    let first = session.host.send_round();
    session.host.ack(&observer, 1);
    unit.set_hp(20);
    let second = session.host.send_round();

    let remote = &mut session.clients[client].remote;
    for (_, packet) in second {
        assert!(remote.receive_packet(packet).is_empty());
    }
    for (_, packet) in first {
        assert_eq!(remote.receive_packet(packet).len(), 2);
    }

    assert_eq!(session.client(client).remote.applied_version(), 2);
    assert_converged!(session, entity);
}

#[test]
fn test_clients_acknowledge_independently() {
    init_logger();
    let mut session = TestSession::default();
    let fast = session.add_client();
    let slow = session.add_client();
    let unit = Unit::default();
    let entity = session.spawn(unit.tracker());
    let slow_observer = session.client(slow).observer;

    for hp in 1..4 {
        unit.set_hp(hp);
        session.exchange_with(|observer, _| {
            if observer == slow_observer {
                Delivery::Drop
            } else {
                Delivery::Deliver
            }
        });
    }

    assert_eq!(session.client(fast).remote.applied_version(), 3);
    assert_eq!(session.client(slow).remote.applied_version(), 0);

    session.exchange();
    assert_converged!(session, entity);
}

#[test]
fn test_lagging_client_is_resynced() {
    init_logger();
    let mut session = TestSession::new(ServerConfig {
        advance_idle_rounds: false,
        resync_after_rounds: Some(1),
    });
    let client = session.add_client();
    let unit = Unit::default();
    let entity = session.spawn(unit.tracker());
    let observer = session.client(client).observer;

    unit.set_hp(1);
    session.exchange();
    for hp in 2..5 {
        unit.set_hp(hp);
        session.exchange_with(|_, _| Delivery::Drop);
    }
    assert_eq!(session.host.observer_acked(&observer), Some(0));

    session.exchange();
    assert_converged!(session, entity);
}

#[test]
fn test_values_set_back_to_default_reach_new_clients() {
    init_logger();
    let mut session = TestSession::default();
    session.add_client();
    let unit = Unit::default();
    let entity = session.spawn(unit.tracker());

    unit.set_hp(1);
    session.exchange();
    unit.set_hp(100);
    session.exchange();

    session.add_client();
    session.exchange();
    assert_converged!(session, entity);
    assert_eq!(unit.tracker().target().get("hp"), Some(&Value::Int(100)));
}

#[test]
fn test_moved_replica_converges_when_client_repeats_the_move() {
    init_logger();
    let mut session = TestSession::default();
    session.add_client();
    let first = Unit::default();
    let second = Unit::default();
    let a = session.spawn(first.tracker());
    let b = session.spawn(second.tracker());
    session.exchange();

    let moved = first.tracker().child("pos").expect("host pos");
    second.tracker().set("pos", &moved);

    let mirror_a = session.mirror(0, a).expect("mirror of a").clone();
    let mirror_b = session.mirror(0, b).expect("mirror of b").clone();
    let mirrored = mirror_a.child("pos").expect("mirror pos");
    mirror_b.set("pos", &mirrored);

    session.exchange();
    assert_converged!(session, a);
    assert_converged!(session, b);
    assert_eq!(first.tracker().value("pos"), Some(Value::Null));

    moved.set("x", 9);
    session.exchange();
    assert_converged!(session, b);
    assert_eq!(mirrored.value("x"), Some(Value::Int(9)));
}
