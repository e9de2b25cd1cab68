use canvas::scene::{SceneError, SceneStore};
use protocol::{Point, Ring, ServerFrame, decode_frame};

use super::*;

const GENERATE: Command = Command::Generate { width: 600, height: 600, cells_x: 40, cells_y: 10 };

fn triangle() -> Ring {
    vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)]
}

fn opened() -> (Decoder, SceneStore) {
    let mut decoder = Decoder::new(GENERATE);
    let mut store = SceneStore::new();
    let command = decoder.open(&mut store);
    assert_eq!(command, GENERATE);
    (decoder, store)
}

// =============================================================
// The happy path
// =============================================================

#[test]
fn new_decoder_is_idle_until_opened() {
    let decoder = Decoder::new(GENERATE);
    assert_eq!(decoder.phase(), Phase::Idle);
    assert!(!decoder.phase().awaiting_reply());
}

#[test]
fn generated_advances_and_requests_polygons() {
    // Scenario A: open → GENERATED ⇒ POL sent exactly once.
    let (mut decoder, mut store) = opened();
    assert_eq!(decoder.phase(), Phase::AwaitingGenerated);

    let step = decoder.handle(ServerFrame::Generated, &mut store).expect("transition");
    assert_eq!(step, Step { send: Some(Command::Polygons), render: false });
    assert_eq!(decoder.phase(), Phase::AwaitingPolygons);
}

#[test]
fn polygons_are_stored_and_centroids_requested() {
    // Scenario B: one triangle ring lands in the store; CEN goes out.
    let (mut decoder, mut store) = opened();
    decoder.handle(ServerFrame::Generated, &mut store).expect("transition");

    let step = decoder
        .handle(ServerFrame::Polygons(vec![triangle()]), &mut store)
        .expect("transition");
    assert_eq!(step, Step { send: Some(Command::Centroids), render: false });
    assert_eq!(decoder.phase(), Phase::AwaitingCentroids);
    assert_eq!(store.polygon_count(), 1);
    assert_eq!(store.scene().polygons[0], triangle());
}

#[test]
fn centroids_complete_the_cycle_and_signal_render() {
    // Scenario C: matching centroid payload ⇒ Ready, render signaled once.
    let (mut decoder, mut store) = opened();
    decoder.handle(ServerFrame::Generated, &mut store).expect("transition");
    decoder
        .handle(ServerFrame::Polygons(vec![triangle()]), &mut store)
        .expect("transition");

    let step = decoder
        .handle(ServerFrame::Centroids(vec![Point::new(10.0, 20.0)]), &mut store)
        .expect("transition");
    assert_eq!(step, Step { send: None, render: true });
    assert_eq!(decoder.phase(), Phase::Ready);

    let scene = store.scene();
    assert!(scene.is_complete());
    assert_eq!(scene.centroids, &[Point::new(10.0, 20.0)]);
}

#[test]
fn full_cycle_visits_every_phase_in_order() {
    let (mut decoder, mut store) = opened();
    let mut phases = vec![decoder.phase()];

    for frame in [
        ServerFrame::Generated,
        ServerFrame::Polygons(vec![triangle(), triangle()]),
        ServerFrame::Centroids(vec![Point::new(0.5, 0.5), Point::new(0.5, 0.5)]),
    ] {
        decoder.handle(frame, &mut store).expect("transition");
        phases.push(decoder.phase());
    }

    assert_eq!(
        phases,
        vec![
            Phase::AwaitingGenerated,
            Phase::AwaitingPolygons,
            Phase::AwaitingCentroids,
            Phase::Ready,
        ]
    );
}

// =============================================================
// Recoverable errors
// =============================================================

#[test]
fn nogame_is_surfaced_without_a_transition() {
    // Scenario D, at every phase of a cycle.
    let (mut decoder, mut store) = opened();
    let frames = [
        ServerFrame::Generated,
        ServerFrame::Polygons(vec![triangle()]),
        ServerFrame::Centroids(vec![Point::new(0.5, 0.5)]),
    ];

    for frame in frames {
        let before = decoder.phase();
        let err = decoder.handle(ServerFrame::NoGame, &mut store).expect_err("surfaced");
        assert_eq!(err, ProtocolError::SessionAbsent);
        assert!(!err.is_cycle_fatal());
        assert_eq!(decoder.phase(), before);

        decoder.handle(frame, &mut store).expect("cycle continues");
    }
}

#[test]
fn invalid_is_surfaced_without_a_transition() {
    let (mut decoder, mut store) = opened();
    let err = decoder.handle(ServerFrame::Invalid, &mut store).expect_err("surfaced");
    assert_eq!(err, ProtocolError::CommandRejected);
    assert!(!err.is_cycle_fatal());
    assert_eq!(decoder.phase(), Phase::AwaitingGenerated);
}

#[test]
fn out_of_order_frame_never_advances_the_phase() {
    // Centroids while still awaiting the generation acknowledgement.
    let (mut decoder, mut store) = opened();
    let err = decoder
        .handle(ServerFrame::Centroids(vec![Point::new(1.0, 2.0)]), &mut store)
        .expect_err("rejected");

    assert_eq!(
        err,
        ProtocolError::OutOfOrder { frame: "CENTROIDS", phase: Phase::AwaitingGenerated }
    );
    assert!(!err.is_cycle_fatal());
    assert_eq!(decoder.phase(), Phase::AwaitingGenerated);
    assert!(store.is_empty());
}

#[test]
fn duplicate_reply_is_rejected_after_the_transition() {
    let (mut decoder, mut store) = opened();
    decoder.handle(ServerFrame::Generated, &mut store).expect("transition");

    let err = decoder.handle(ServerFrame::Generated, &mut store).expect_err("rejected");
    assert_eq!(
        err,
        ProtocolError::OutOfOrder { frame: "GENERATED", phase: Phase::AwaitingPolygons }
    );
    assert_eq!(decoder.phase(), Phase::AwaitingPolygons);
}

#[test]
fn frames_after_ready_are_rejected() {
    let (mut decoder, mut store) = opened();
    decoder.handle(ServerFrame::Generated, &mut store).expect("transition");
    decoder
        .handle(ServerFrame::Polygons(vec![triangle()]), &mut store)
        .expect("transition");
    decoder
        .handle(ServerFrame::Centroids(vec![Point::new(0.5, 0.5)]), &mut store)
        .expect("transition");

    let err = decoder
        .handle(ServerFrame::Polygons(vec![triangle()]), &mut store)
        .expect_err("rejected");
    assert_eq!(err, ProtocolError::OutOfOrder { frame: "POLYGONS", phase: Phase::Ready });
    // The completed scene is untouched.
    assert!(store.scene().is_complete());
}

// =============================================================
// Cycle-fatal errors and restart
// =============================================================

#[test]
fn centroid_count_mismatch_is_cycle_fatal() {
    let (mut decoder, mut store) = opened();
    decoder.handle(ServerFrame::Generated, &mut store).expect("transition");
    decoder
        .handle(ServerFrame::Polygons(vec![triangle()]), &mut store)
        .expect("transition");

    let err = decoder
        .handle(
            ServerFrame::Centroids(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]),
            &mut store,
        )
        .expect_err("rejected");
    assert_eq!(err, ProtocolError::Scene(SceneError::CountMismatch { polygons: 1, centroids: 2 }));
    assert!(err.is_cycle_fatal());
    assert_ne!(decoder.phase(), Phase::Ready);
}

#[test]
fn aborted_decoder_swallows_every_frame() {
    // Scenario E, decoder side: after a payload error the cycle is dead.
    let (mut decoder, mut store) = opened();
    decoder.abort();
    assert_eq!(decoder.phase(), Phase::Idle);

    for frame in [
        ServerFrame::Generated,
        ServerFrame::Polygons(vec![triangle()]),
        ServerFrame::Centroids(vec![Point::new(0.5, 0.5)]),
    ] {
        let err = decoder.handle(frame, &mut store).expect_err("rejected");
        assert!(matches!(err, ProtocolError::OutOfOrder { phase: Phase::Idle, .. }));
    }
    assert!(store.is_empty());
}

#[test]
fn reopening_after_abort_restarts_the_cycle_cleanly() {
    let (mut decoder, mut store) = opened();
    decoder.handle(ServerFrame::Generated, &mut store).expect("transition");
    decoder
        .handle(ServerFrame::Polygons(vec![triangle()]), &mut store)
        .expect("transition");
    decoder.abort();

    let command = decoder.open(&mut store);
    assert_eq!(command, GENERATE);
    assert_eq!(decoder.phase(), Phase::AwaitingGenerated);
    // Geometry from the abandoned cycle is gone.
    assert!(store.is_empty());

    decoder.handle(ServerFrame::Generated, &mut store).expect("fresh cycle");
    assert_eq!(decoder.phase(), Phase::AwaitingPolygons);
}

// =============================================================
// Wire-to-decoder integration
// =============================================================

#[test]
fn decoded_wire_frames_drive_a_full_cycle() {
    let (mut decoder, mut store) = opened();

    let step = decoder
        .handle(decode_frame("GENERATED").expect("decode"), &mut store)
        .expect("transition");
    assert_eq!(step.send, Some(Command::Polygons));

    let step = decoder
        .handle(decode_frame("POLYGONS[[0,0,1,0,1,1]]").expect("decode"), &mut store)
        .expect("transition");
    assert_eq!(step.send, Some(Command::Centroids));

    let step = decoder
        .handle(decode_frame("CENTROIDS[{\"x\":10,\"y\":20}]").expect("decode"), &mut store)
        .expect("transition");
    assert!(step.render);
    assert_eq!(decoder.phase(), Phase::Ready);
}

#[test]
fn awaiting_phases_expect_a_reply() {
    assert!(Phase::AwaitingGenerated.awaiting_reply());
    assert!(Phase::AwaitingPolygons.awaiting_reply());
    assert!(Phase::AwaitingCentroids.awaiting_reply());
    assert!(!Phase::Ready.awaiting_reply());
    assert!(!Phase::Idle.awaiting_reply());
}
