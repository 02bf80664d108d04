use rand::SeedableRng;
use rand::rngs::StdRng;
use snipmark::Config;
use snipmark::draw::RasterBuffer;
use snipmark::draw::color::WHITE;
use snipmark::session::{DragMode, InputEvent, Response, Session};
use snipmark::transfer::loopback::{FetchError, LoopbackTransport, fetch};
use snipmark::transfer::{
    ProtocolAction, SelectionRequest, TransferEngine, TransferError, TransportErrorKind, WindowId,
};
use std::sync::Arc;
use std::time::Instant;

const REQUESTOR: WindowId = WindowId(0x0070_0001);

fn config_with_chunk(chunk_size: usize) -> Config {
    let mut config = Config::default();
    config.transfer.chunk_size = chunk_size;
    config
}

#[test]
fn fetch_reassembles_payload_for_any_chunk_size() {
    let payload: Arc<[u8]> = (0..=255u8).cycle().take(1000).collect::<Vec<u8>>().into();

    for chunk_size in [1, 7, 250, 999, 1000, 1001] {
        let mut engine = TransferEngine::new(config_with_chunk(chunk_size).transfer);
        let mut transport = LoopbackTransport::new();

        let transcript = fetch(&mut engine, &mut transport, &payload, REQUESTOR, "image/png")
            .unwrap_or_else(|err| panic!("chunk size {chunk_size}: {err}"));

        assert_eq!(transcript.received, payload.to_vec(), "chunk size {chunk_size}");
        let chunk_count = transcript
            .actions
            .iter()
            .filter(|action| matches!(action, ProtocolAction::WriteChunk { .. }))
            .count();
        let expected = if payload.len() <= chunk_size {
            0
        } else {
            payload.len().div_ceil(chunk_size)
        };
        assert_eq!(chunk_count, expected, "chunk size {chunk_size}");
        assert!(engine.is_idle());
        assert!(!transport.is_watching(REQUESTOR));
    }
}

#[test]
fn fetch_reports_refused_initial_write() {
    let payload: Arc<[u8]> = vec![9u8; 20].into();
    let mut engine = TransferEngine::new(config_with_chunk(8).transfer);
    let mut transport = LoopbackTransport::new();
    transport.write_failures.push_back(TransportErrorKind::BadAlloc);

    let err = fetch(&mut engine, &mut transport, &payload, REQUESTOR, "image/png").unwrap_err();

    assert!(matches!(
        err,
        FetchError::Refused(TransferError::PropertyWrite(_))
    ));
    assert!(engine.is_idle());
    assert!(!transport.is_watching(REQUESTOR));

    // The engine is reusable after a refusal.
    let transcript = fetch(&mut engine, &mut transport, &payload, REQUESTOR, "image/png").unwrap();
    assert_eq!(transcript.received, payload.to_vec());
}

#[test]
fn painted_crop_is_served_to_requestor() {
    let config = config_with_chunk(32);
    let mut session = Session::with_rng(
        &config,
        RasterBuffer::new(40, 30, WHITE),
        StdRng::seed_from_u64(1),
    );
    let mut transport = LoopbackTransport::new();

    let stroke = [
        InputEvent::PointerDown {
            mode: DragMode::Paint,
            x: 5,
            y: 5,
        },
        InputEvent::PointerMotion { x: 30, y: 20 },
        InputEvent::PointerUp { x: 30, y: 20 },
    ];
    for event in stroke {
        session.dispatch(&mut transport, event);
    }

    session.dispatch(
        &mut transport,
        InputEvent::PointerDown {
            mode: DragMode::Crop,
            x: 0,
            y: 0,
        },
    );
    session.dispatch(&mut transport, InputEvent::PointerMotion { x: 40, y: 30 });
    let responses = session.dispatch(&mut transport, InputEvent::PointerUp { x: 40, y: 30 });
    assert!(responses.contains(&Response::TakeSelectionOwnership));

    let expected = session.clipboard_payload().to_vec();
    assert!(expected.len() > 32, "whole-screen PNG should need chunking");

    let request = SelectionRequest {
        requestor: REQUESTOR,
        selection: transport.atom("CLIPBOARD"),
        target: transport.atom("image/png"),
        property: transport.atom("XSEL_DATA"),
        time: 0,
    };
    let action = session.on_selection_request(&mut transport, request, Instant::now());
    assert_eq!(
        action,
        ProtocolAction::BeginChunked {
            total: expected.len()
        }
    );

    let (_, mut pending) = transport
        .take_property(REQUESTOR, request.property)
        .unwrap();
    let mut received = Vec::new();
    while let Some(notify) = pending.take() {
        match session.on_property_delete_notification(&mut transport, notify, Instant::now()) {
            ProtocolAction::WriteChunk { .. } => {
                let (chunk, next) = transport
                    .take_property(REQUESTOR, request.property)
                    .unwrap();
                received.extend_from_slice(&chunk.data);
                pending = next;
            }
            ProtocolAction::WriteTerminal => break,
            other => panic!("unexpected action {other:?}"),
        }
    }

    assert_eq!(received, expected);
    assert!(session.transfer().is_idle());
}

#[test]
fn undo_walks_back_to_capture_and_stops() {
    let config = Config::default();
    let capture = RasterBuffer::new(16, 16, WHITE);
    let mut session = Session::with_rng(&config, capture.clone(), StdRng::seed_from_u64(3));
    let mut transport = LoopbackTransport::new();

    for y in [3, 8] {
        session.dispatch(
            &mut transport,
            InputEvent::PointerDown {
                mode: DragMode::Paint,
                x: 2,
                y,
            },
        );
        session.submit_stroke_segment(2, y, 12, y);
        session.dispatch(&mut transport, InputEvent::PointerUp { x: 12, y });
    }
    assert_eq!(session.undo_depth(), 3);
    assert_ne!(session.buffer().pixel(7, 8), Some(WHITE));

    assert!(session.request_undo());
    assert_eq!(session.buffer().pixel(7, 8), Some(WHITE));
    assert_ne!(session.buffer().pixel(7, 3), Some(WHITE));

    assert!(session.request_undo());
    assert_eq!(session.buffer().as_bytes(), capture.as_bytes());
    assert!(!session.request_undo());
}
