use flightlog_common::BlockKind;
use flightlog_grid::CellCoord;
use flightlog_log::{
    ErrorKind, LogAssembler, LogError, MapBuilder, ScriptedTransport,
    ValidationConfig, gzip, validate_log,
};
use glam::{DVec3, IVec3};

/// Eight moves from (2,1,2) with velocities summing to (-2,0,0).
const FLIGHT: &str = "TITLE belt run\n\
                      PLAYABLE /api/playing/belt.map/s3cr3t\n\
                      MAP 5 3 5\n\
                      AMz\n\
                      ENDMAP\n\
                      START 2 1 2\n\
                      ACC -1 0 0\nACC 0 0 0\nACC 1 0 0\nACC 0 0 0\n\
                      ACC 0 0 0\nACC 0 0 0\nACC 0 0 0\nACC 0 0 0\n";

#[test]
fn single_token_body() {
    let mut body = String::from("MAP 10 8 5\nAMz\nENDMAP\n");
    let scene = LogAssembler::default().decode(body.as_bytes()).unwrap();
    assert_eq!(scene.grid.len(), 1);
    let block = scene.grid.get(CellCoord::new(0, 0, 0)).unwrap();
    assert_eq!(block.kind, BlockKind::Goal);
    assert_eq!(scene.body_tokens, 1);
    assert!(scene.path.is_empty());

    // Explicit sentinels change nothing.
    body = format!("MAP 10 8 5\nAMz{}\nENDMAP\n", " AAA".repeat(399));
    let padded = LogAssembler::default().decode(body.as_bytes()).unwrap();
    assert_eq!(padded.grid, scene.grid);
    assert_eq!(padded.body_tokens, 400);
}

#[test]
fn integer_end_keeps_every_point() {
    let text = format!("{FLIGHT}END OK 8\n");
    let scene = LogAssembler::default().decode_text(&text).unwrap();
    assert_eq!(scene.path.len(), 9);
    for (i, p) in scene.path.iter().enumerate() {
        assert_eq!(p.action_index, i as f64);
    }
    assert_eq!(scene.path[8].position - scene.path[0].position, DVec3::new(-2.0, 0.0, 0.0));
    assert_eq!(scene.outcome.map(|o| o.ok), Some(true));
}

#[test]
fn fractional_end_interpolates() {
    let full = LogAssembler::default().decode_text(FLIGHT).unwrap();
    let text = format!("{FLIGHT}END KO 5.5\n");
    let scene = LogAssembler::default().decode_text(&text).unwrap();
    assert_eq!(scene.path.len(), 7);
    let last = scene.path[6];
    assert_eq!(last.action_index, 5.5);
    assert_eq!(last.position, full.path[5].position.lerp(full.path[6].position, 0.5));
    assert_eq!(scene.outcome.map(|o| o.ok), Some(false));
}

#[test]
fn gzip_matches_plain_text() {
    let text = format!("{FLIGHT}END OK 5.5\n");
    let plain = LogAssembler::default().decode(text.as_bytes()).unwrap();
    let packed = gzip(text.as_bytes()).unwrap();
    assert_eq!(&packed[..2], &[0x1F, 0x8B]);
    let unpacked = LogAssembler::default().decode(&packed).unwrap();
    assert_eq!(unpacked, plain);
    assert_eq!(unpacked.digest().unwrap(), plain.digest().unwrap());
}

#[test]
fn missing_endmap_is_format_error() {
    let mut asm = LogAssembler::default();
    let err = asm.decode(b"MAP 2 2 2\nAAA AAA\nSTART 0 0 0\n").unwrap_err();
    assert!(matches!(err, LogError::MissingEndmap { line: 1 }));
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(asm.scene().is_none());
}

#[test]
fn structural_errors_abort() {
    let cases: [&[u8]; 5] = [
        b"MAP 1 1 1\nA*A\nENDMAP\n",
        b"MAP 1 1 1\nAAA AAA\nENDMAP\n",
        b"MAP 1 1 1\nENDMAP\nACC 1 0 0\n",
        b"MAP 1 1 1\nENDMAP\nSTART 0 0\n",
        b"MAP 4294967296 4294967296 2\nAMz\nENDMAP\n",
    ];
    for bytes in cases {
        let err = LogAssembler::default().decode(bytes).unwrap_err();
        assert!(err.is_format(), "{err}");
    }
    let err = LogAssembler::default().decode(&[0xFF, 0xFE]).unwrap_err();
    assert!(matches!(err, LogError::Utf8(_)));
}

#[test]
fn replay_continues_a_playable_log() {
    let mut asm = LogAssembler::default();
    let scene = asm.decode_text(FLIGHT).unwrap();
    assert_eq!(scene.path.len(), 9);
    assert_eq!(asm.playable_url(), Some("/api/playing/belt.map/s3cr3t"));

    let mut transport = ScriptedTransport::from_script("ACC 0 1 0\n---\nACC 0 0 0\nEND OK 9.5\n");
    let path = asm.play(&mut transport, IVec3::new(0, 1, 0)).unwrap();
    assert_eq!(path.len(), 10);
    assert_eq!(path[9].position, DVec3::new(0.0, 2.0, 2.0));

    transport.push_failure("gateway timeout");
    let path = asm.play(&mut transport, IVec3::ZERO).unwrap();
    assert_eq!(path.len(), 11);
    assert_eq!(path[10].action_index, 9.5);
    assert_eq!(asm.playable_url(), None);

    let requests: Vec<&str> = transport.requests().iter().map(|(_, b)| b.as_str()).collect();
    assert_eq!(requests, ["ACC 0 1 0", "ACC 0 0 0"]);
    assert_eq!(transport.remaining(), 1);
}

#[test]
fn transport_failure_keeps_scene() {
    let mut asm = LogAssembler::default();
    asm.decode_text(FLIGHT).unwrap();
    let before = asm.scene().cloned();

    let mut transport = ScriptedTransport::new();
    transport.push_failure("connection refused");
    let err = asm.play(&mut transport, IVec3::X).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(asm.scene().cloned(), before);
    assert_eq!(asm.path_state().move_count(), 8);

    // Malformed responses are rejected whole.
    transport.push_response("ACC 1 0 0\nACC 1 0\n");
    assert!(asm.play(&mut transport, IVec3::X).unwrap_err().is_format());
    assert_eq!(asm.path_state().move_count(), 8);
}

#[test]
fn decode_file_reads_gzip() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("flight.log.gz");
    std::fs::write(&path, gzip(FLIGHT.as_bytes()).unwrap()).unwrap();

    let scene = LogAssembler::default().decode_file(&path).unwrap();
    assert_eq!(scene.directives.title.as_deref(), Some("belt run"));

    let err = LogAssembler::default()
        .decode_file(tmp.path().join("absent.log"))
        .unwrap_err();
    assert!(matches!(err, LogError::Io(_)));
}

#[test]
fn built_map_passes_validation() {
    let dims = flightlog_common::GridDimensions::new(6, 3, 3).unwrap();
    let mut builder = MapBuilder::new(dims, CellCoord::new(0, 0, 0)).unwrap();
    builder
        .add_full(BlockKind::Goal, CellCoord::new(5, 2, 2))
        .unwrap()
        .add_full(BlockKind::Asteroid, CellCoord::new(3, 1, 1))
        .unwrap();
    let text = builder.to_log_text().unwrap();
    validate_log(text.as_bytes(), &ValidationConfig::default()).unwrap();

    let scene = LogAssembler::default().decode_text(&text).unwrap();
    assert_eq!(scene.grid.len(), 2);
    assert_eq!(scene.grid.kind_counts().get(&BlockKind::Asteroid), Some(&1));
}
