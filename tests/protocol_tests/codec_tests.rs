//! Codec Tests
//!
//! Tests for framing primitives and reply classification.

use std::io::{Cursor, Read};

use filewire::protocol::{
    encode_length, expect_token, parse_length, read_frame, read_length, read_to_close,
    write_frame, Response, Status, Step, ERROR, RENAME_ERROR, UNKNOWN_COMMAND,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// Reader that hands out at most `limit` bytes per call
struct Trickle {
    data: Cursor<Vec<u8>>,
    limit: usize,
}

impl Trickle {
    fn new(data: &[u8], limit: usize) -> Self {
        Self {
            data: Cursor::new(data.to_vec()),
            limit,
        }
    }
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(self.limit);
        self.data.read(&mut buf[..n])
    }
}

// =============================================================================
// Frame Tests
// =============================================================================

#[test]
fn test_read_frame_is_bounded() {
    let mut reader = Cursor::new(b"LIST_FILES some/long/path".to_vec());

    let first = read_frame(&mut reader, 10).unwrap().unwrap();
    assert_eq!(first, b"LIST_FILES");

    let second = read_frame(&mut reader, 100).unwrap().unwrap();
    assert_eq!(second, b" some/long/path");
}

#[test]
fn test_read_frame_returns_none_on_close() {
    let mut reader = Cursor::new(Vec::new());
    assert!(read_frame(&mut reader, 4096).unwrap().is_none());
}

#[test]
fn test_read_frame_zero_max_still_reads() {
    let mut reader = Cursor::new(b"ACK".to_vec());
    let frame = read_frame(&mut reader, 0).unwrap().unwrap();
    assert_eq!(frame, b"A");
}

#[test]
fn test_write_frame_writes_everything() {
    let mut out = Vec::new();
    write_frame(&mut out, b"UPLOAD_ACK").unwrap();
    write_frame(&mut out, b"").unwrap();
    assert_eq!(out, b"UPLOAD_ACK");
}

#[test]
fn test_read_to_close_joins_frames() {
    let mut reader = Trickle::new(b"DATA_RECEIVED\nSUCCESS: ok\n", 3);
    let all = read_to_close(&mut reader, 4096).unwrap();
    assert_eq!(all, b"DATA_RECEIVED\nSUCCESS: ok\n");
}

// =============================================================================
// Token Tests
// =============================================================================

#[test]
fn test_expect_token_match() {
    let mut reader = Cursor::new(b"ACK".to_vec());
    assert_eq!(expect_token(&mut reader, 4096, "ACK").unwrap(), Step::Done(()));
}

#[test]
fn test_expect_token_tolerates_whitespace() {
    let mut reader = Cursor::new(b"  UPLOAD_ACK\r\n".to_vec());
    assert!(expect_token(&mut reader, 4096, "UPLOAD_ACK").unwrap().is_done());
}

#[test]
fn test_expect_token_is_case_sensitive() {
    let mut reader = Cursor::new(b"ack".to_vec());
    assert_eq!(
        expect_token(&mut reader, 4096, "ACK").unwrap(),
        Step::Malformed("ack".to_string())
    );
}

#[test]
fn test_expect_token_peer_closed() {
    let mut reader = Cursor::new(Vec::new());
    assert_eq!(expect_token(&mut reader, 4096, "ACK").unwrap(), Step::PeerClosed);
}

// =============================================================================
// Length Tests
// =============================================================================

#[test]
fn test_encode_length_is_decimal_ascii() {
    assert_eq!(encode_length(0), b"0");
    assert_eq!(encode_length(1048), b"1048");
    assert_eq!(encode_length(u64::MAX), u64::MAX.to_string().as_bytes());
}

#[test]
fn test_parse_length_accepts_surrounding_whitespace() {
    assert_eq!(parse_length(b"1048"), Step::Done(1048));
    assert_eq!(parse_length(b" 42\n"), Step::Done(42));
    assert_eq!(parse_length(b"0"), Step::Done(0));
}

#[test]
fn test_parse_length_rejects_non_numbers() {
    assert!(matches!(parse_length(b"ERROR"), Step::Malformed(_)));
    assert!(matches!(parse_length(b"-5"), Step::Malformed(_)));
    assert!(matches!(parse_length(b"12ab"), Step::Malformed(_)));
    assert!(matches!(parse_length(b""), Step::Malformed(_)));
}

#[test]
fn test_parse_length_keeps_rejected_text() {
    assert_eq!(
        parse_length(b"Error: no existe"),
        Step::Malformed("Error: no existe".to_string())
    );
}

#[test]
fn test_read_length_peer_closed() {
    let mut reader = Cursor::new(Vec::new());
    assert_eq!(read_length(&mut reader, 4096).unwrap(), Step::PeerClosed);
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_status_classify_errors() {
    assert_eq!(Status::classify(ERROR), Status::Error);
    assert_eq!(Status::classify(RENAME_ERROR), Status::Error);
    assert_eq!(Status::classify(UNKNOWN_COMMAND), Status::Error);
    assert_eq!(
        Status::classify("Error: el directorio 'x' no existe."),
        Status::Error
    );
}

#[test]
fn test_status_classify_ok() {
    assert_eq!(Status::classify("DELETED"), Status::Ok);
    assert_eq!(Status::classify("a.txt\nb.txt"), Status::Ok);
    assert_eq!(Status::classify("No hay archivos en la ruta."), Status::Ok);
}

#[test]
fn test_status_classify_listing_with_error_like_names() {
    assert_eq!(Status::classify("ERRORES.log\nnotes.txt"), Status::Ok);
    assert_eq!(Status::classify("Error_report.txt"), Status::Ok);
    assert_eq!(Status::classify("ERROR_LOG\nRENAME_ERROR.md"), Status::Ok);
    assert_eq!(Status::classify("Directorios en .:\nErrores"), Status::Ok);

    let response = Response::from_wire(b"ERRORES.log\nnotes.txt");
    assert!(response.is_ok());
}

#[test]
fn test_status_classify_known_error_sentences() {
    assert_eq!(Status::classify("Error: La ruta 'x' no existe."), Status::Error);
    assert_eq!(Status::classify("Error: 'x' no es un directorio."), Status::Error);
    assert_eq!(Status::classify("Error al listar 'x': boom"), Status::Error);
    assert_eq!(
        Status::classify("ERROR: Debes especificar un nombre de directorio."),
        Status::Error
    );
    assert_eq!(Status::classify("  UNKNOWN_COMMAND\n"), Status::Error);
}

#[test]
fn test_response_from_wire() {
    let response = Response::from_wire(b"SUCCESS: Directorio 'testdir' creado.");
    assert!(response.is_ok());
    assert!(response.is_success_marker());

    let response = Response::from_wire(b"RENAMED");
    assert!(response.is_success_marker());

    let response = Response::from_wire(b"RENAME_ERROR");
    assert!(!response.is_ok());
    assert!(!response.is_success_marker());
}

#[test]
fn test_response_bytes_are_verbatim() {
    let response = Response::ok("a.txt\nb.txt");
    assert_eq!(response.as_bytes(), b"a.txt\nb.txt");
    assert_eq!(Response::error("ERROR").status, Status::Error);
}
