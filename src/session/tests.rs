use super::*;
use crate::config::{BusyPolicy, Config};
use crate::draw::color::{BLUE, WHITE};
use crate::draw::{RasterBuffer, StrokeOutcome};
use crate::transfer::loopback::LoopbackTransport;
use crate::transfer::{
    Atom, PropertyState, ProtocolAction, SelectionRequest, TransferError, WindowId,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

const REQUESTOR: WindowId = WindowId(0x60_0001);
const OTHER: WindowId = WindowId(0x60_0002);
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn capture() -> RasterBuffer {
    RasterBuffer::new(20, 20, WHITE)
}

fn session_with(config: Config) -> Session {
    Session::with_rng(&config, capture(), StdRng::seed_from_u64(7))
}

fn session() -> Session {
    session_with(Config::default())
}

fn chunked_config(busy_policy: BusyPolicy) -> Config {
    let mut config = Config::default();
    config.transfer.chunk_size = 4;
    config.transfer.busy_policy = busy_policy;
    config
}

fn request(transport: &mut LoopbackTransport, requestor: WindowId) -> SelectionRequest {
    SelectionRequest {
        requestor,
        selection: transport.atom("CLIPBOARD"),
        target: transport.atom("image/png"),
        property: transport.atom("XSEL_DATA"),
        time: 1,
    }
}

fn protocol_actions(responses: &[Response]) -> Vec<ProtocolAction> {
    responses
        .iter()
        .filter_map(|response| match response {
            Response::Protocol(action) => Some(action.clone()),
            _ => None,
        })
        .collect()
}

/// Plays the requestor side of a chunked transfer until the terminal write.
fn drain_transfer(
    session: &mut Session,
    transport: &mut LoopbackTransport,
    requestor: WindowId,
    property: Atom,
) -> (Vec<u8>, Vec<Response>) {
    let (_, mut pending) = transport.take_property(requestor, property).unwrap();
    let mut received = Vec::new();
    while let Some(notify) = pending.take() {
        let responses = session.dispatch(transport, InputEvent::PropertyNotify(notify));
        match responses.first() {
            Some(Response::Protocol(ProtocolAction::WriteChunk { .. })) => {
                let (chunk, next) = transport.take_property(requestor, property).unwrap();
                received.extend_from_slice(&chunk.data);
                pending = next;
            }
            Some(Response::Protocol(ProtocolAction::WriteTerminal)) => {
                return (received, responses);
            }
            other => panic!("unexpected response {other:?}"),
        }
    }
    panic!("transfer ended without a terminal write");
}

#[test]
fn new_session_has_nothing_to_undo() {
    let mut session = session();
    let mut transport = LoopbackTransport::new();

    assert_eq!(session.undo_depth(), 1);
    let responses = session.dispatch(&mut transport, InputEvent::Undo);

    assert_eq!(responses, vec![Response::Undo(false)]);
    assert_eq!(session.buffer().as_bytes(), capture().as_bytes());
}

#[test]
fn paint_gesture_is_undoable() {
    let mut session = session();
    let mut transport = LoopbackTransport::new();

    session.dispatch(
        &mut transport,
        InputEvent::PointerDown {
            mode: DragMode::Paint,
            x: 2,
            y: 2,
        },
    );
    let responses = session.dispatch(&mut transport, InputEvent::PointerMotion { x: 6, y: 2 });
    session.dispatch(&mut transport, InputEvent::PointerUp { x: 6, y: 2 });

    assert!(matches!(responses.as_slice(), [Response::Redraw(regions)] if !regions.is_empty()));
    assert_eq!(session.buffer().pixel(4, 2), Some(BLUE));
    assert_eq!(session.undo_depth(), 2);
    assert_eq!(session.gesture(), GestureState::Idle);

    let responses = session.dispatch(&mut transport, InputEvent::Undo);

    assert_eq!(
        responses.last(),
        Some(&Response::Undo(true)),
        "undo should succeed after one gesture"
    );
    assert!(matches!(responses.first(), Some(Response::Redraw(_))));
    assert_eq!(session.buffer().pixel(4, 2), Some(WHITE));
    assert_eq!(session.undo_depth(), 1);
}

#[test]
fn click_without_motion_still_records_a_snapshot() {
    let mut session = session();
    let mut transport = LoopbackTransport::new();

    session.dispatch(
        &mut transport,
        InputEvent::PointerDown {
            mode: DragMode::Paint,
            x: 5,
            y: 5,
        },
    );
    session.dispatch(&mut transport, InputEvent::PointerUp { x: 5, y: 5 });

    assert_eq!(session.undo_depth(), 2);
    assert_eq!(session.buffer().as_bytes(), capture().as_bytes());
}

#[test]
fn stroke_off_canvas_aborts() {
    let mut session = session();

    let outcome = session.submit_stroke_segment(-10, -10, -5, -5);

    assert_eq!(
        outcome,
        StrokeOutcome::Aborted {
            painted: 0,
            bounds: None
        }
    );
    assert!(session.take_dirty_regions().is_empty());
}

#[test]
fn brush_size_stays_within_limits() {
    let mut config = Config::default();
    config.brush.max_size = 4;
    let mut session = session_with(config);
    let mut transport = LoopbackTransport::new();

    for _ in 0..5 {
        session.dispatch(&mut transport, InputEvent::GrowBrush);
    }
    assert_eq!(session.brush_size, 4);

    for _ in 0..5 {
        session.dispatch(&mut transport, InputEvent::ShrinkBrush);
    }
    assert_eq!(session.brush_size, 2);
}

#[test]
fn crop_exports_png_and_clears_outline() {
    let mut session = session();
    let mut transport = LoopbackTransport::new();

    session.dispatch(
        &mut transport,
        InputEvent::PointerDown {
            mode: DragMode::Crop,
            x: 2,
            y: 2,
        },
    );
    session.dispatch(&mut transport, InputEvent::PointerMotion { x: 6, y: 5 });
    assert_ne!(
        session.buffer().pixel(4, 1),
        Some(WHITE),
        "outline preview should be drawn above the selection"
    );

    let responses = session.dispatch(&mut transport, InputEvent::PointerUp { x: 6, y: 5 });

    assert!(responses.contains(&Response::TakeSelectionOwnership));
    assert_eq!(&session.clipboard_payload()[..8], &PNG_SIGNATURE);
    assert_eq!(session.buffer().as_bytes(), capture().as_bytes());
    assert_eq!(session.undo_depth(), 1);
}

#[test]
fn empty_crop_keeps_previous_payload() {
    let mut session = session();
    let mut transport = LoopbackTransport::new();
    session.set_clipboard_payload(vec![1, 2, 3]);

    session.dispatch(
        &mut transport,
        InputEvent::PointerDown {
            mode: DragMode::Crop,
            x: 3,
            y: 3,
        },
    );
    let responses = session.dispatch(&mut transport, InputEvent::PointerUp { x: 3, y: 9 });

    assert!(!responses.contains(&Response::TakeSelectionOwnership));
    assert_eq!(&session.clipboard_payload()[..], &[1, 2, 3]);
}

#[test]
fn transfer_keeps_payload_replaced_mid_transfer() {
    let mut session = session_with(chunked_config(BusyPolicy::Reject));
    let mut transport = LoopbackTransport::new();
    let original: Vec<u8> = (0..10).collect();
    session.set_clipboard_payload(original.clone());
    let req = request(&mut transport, REQUESTOR);

    let responses = session.dispatch(&mut transport, InputEvent::SelectionRequest(req));
    assert_eq!(
        protocol_actions(&responses),
        vec![ProtocolAction::BeginChunked { total: 10 }]
    );

    session.set_clipboard_payload(vec![0xee; 32]);
    let (received, _) = drain_transfer(&mut session, &mut transport, REQUESTOR, req.property);

    assert_eq!(received, original);
    assert!(session.transfer().is_idle());
}

#[test]
fn queued_request_is_served_after_terminal_write() {
    let mut session = session_with(chunked_config(BusyPolicy::Queue));
    let mut transport = LoopbackTransport::new();
    session.set_clipboard_payload((0..10).collect());
    let first = request(&mut transport, REQUESTOR);
    let second = request(&mut transport, OTHER);

    session.dispatch(&mut transport, InputEvent::SelectionRequest(first));
    let responses = session.dispatch(&mut transport, InputEvent::SelectionRequest(second));
    assert_eq!(protocol_actions(&responses), vec![ProtocolAction::Queued]);

    let (_, responses) = drain_transfer(&mut session, &mut transport, REQUESTOR, first.property);

    assert_eq!(
        protocol_actions(&responses),
        vec![
            ProtocolAction::WriteTerminal,
            ProtocolAction::BeginChunked { total: 10 },
        ]
    );
    assert_eq!(session.transfer().session().unwrap().requestor, OTHER);
}

#[test]
fn busy_request_is_refused_by_default() {
    let mut session = session_with(chunked_config(BusyPolicy::Reject));
    let mut transport = LoopbackTransport::new();
    session.set_clipboard_payload((0..10).collect());
    let first = request(&mut transport, REQUESTOR);
    let second = request(&mut transport, OTHER);

    session.dispatch(&mut transport, InputEvent::SelectionRequest(first));
    let responses = session.dispatch(&mut transport, InputEvent::SelectionRequest(second));

    assert_eq!(
        protocol_actions(&responses),
        vec![ProtocolAction::Refused(TransferError::Busy(REQUESTOR))]
    );
    assert_eq!(session.transfer().session().unwrap().requestor, REQUESTOR);
}

#[test]
fn tick_aborts_stalled_transfer() {
    let mut config = chunked_config(BusyPolicy::Reject);
    config.transfer.stall_timeout_secs = 5;
    let mut session = session_with(config);
    let mut transport = LoopbackTransport::new();
    session.set_clipboard_payload((0..10).collect());
    let req = request(&mut transport, REQUESTOR);
    session.dispatch(&mut transport, InputEvent::SelectionRequest(req));

    let later = Instant::now() + Duration::from_secs(6);
    let responses = session.dispatch(&mut transport, InputEvent::Tick(later));

    assert!(matches!(
        protocol_actions(&responses).as_slice(),
        [ProtocolAction::Aborted(TransferError::Stalled { .. })]
    ));
    assert!(session.transfer().is_idle());
}

#[test]
fn unrelated_property_notify_produces_no_response() {
    let mut session = session_with(chunked_config(BusyPolicy::Reject));
    let mut transport = LoopbackTransport::new();
    session.set_clipboard_payload((0..10).collect());
    let req = request(&mut transport, REQUESTOR);
    session.dispatch(&mut transport, InputEvent::SelectionRequest(req));

    let notify = crate::transfer::PropertyNotify {
        window: REQUESTOR,
        property: req.property,
        state: PropertyState::NewValue,
    };
    let responses = session.dispatch(&mut transport, InputEvent::PropertyNotify(notify));

    assert!(responses.is_empty());
    assert_eq!(session.transfer().session().unwrap().cursor, 0);
}

#[test]
fn quit_tears_down_session() {
    let mut session = session_with(chunked_config(BusyPolicy::Reject));
    let mut transport = LoopbackTransport::new();
    session.set_clipboard_payload((0..10).collect());
    let req = request(&mut transport, REQUESTOR);
    session.dispatch(&mut transport, InputEvent::SelectionRequest(req));

    let responses = session.dispatch(&mut transport, InputEvent::Quit);

    assert_eq!(responses, vec![Response::Quit]);
    assert!(!session.is_active());
    assert_eq!(session.undo_depth(), 0);
    assert!(session.transfer().is_idle());
    assert!(!transport.is_watching(REQUESTOR));
    assert!(session.dispatch(&mut transport, InputEvent::Undo).is_empty());
}

#[test]
fn undo_during_paint_drag_is_ignored() {
    let mut session = session();
    let mut transport = LoopbackTransport::new();

    session.dispatch(
        &mut transport,
        InputEvent::PointerDown {
            mode: DragMode::Paint,
            x: 2,
            y: 2,
        },
    );
    session.dispatch(&mut transport, InputEvent::PointerMotion { x: 6, y: 2 });
    let responses = session.dispatch(&mut transport, InputEvent::Undo);
    session.dispatch(&mut transport, InputEvent::PointerUp { x: 6, y: 2 });

    assert_eq!(responses, vec![Response::Undo(false)]);
    assert_eq!(session.undo_depth(), 2);
    assert_eq!(session.buffer().pixel(4, 2), Some(BLUE));

    assert!(session.request_undo());
    assert_eq!(session.buffer().as_bytes(), capture().as_bytes());
    assert!(!session.request_undo());
}
