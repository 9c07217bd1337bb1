//! End-to-end wire contract of the payload compression codec
//!
//! Simulates a sender and a receiver that only share the compression header
//! constant: whatever the outbound path produces, the inbound path must
//! reconstruct, for every header shape clients are known to send.

use broker_relay::codec::{
    decode_compressed, CompressingConverter, FrameHeaders, HeaderValue, JsonPayloadConverter,
    Payload, COMPRESSION_HEADER,
};
use serde_json::json;

fn codec() -> CompressingConverter<JsonPayloadConverter> {
    CompressingConverter::new(JsonPayloadConverter)
}

#[test]
fn test_compressed_send_receive_round_trip() {
    let codec = codec();
    let value = json!({
        "exercise_id": 9,
        "results": (0..100).collect::<Vec<u32>>(),
    });

    let headers = FrameHeaders::new().with_compression();
    let wire = codec.write_outbound(&value, &headers).unwrap();
    let received = match &wire {
        Payload::Binary(bytes) => codec
            .read_inbound(&headers, &Payload::Binary(bytes.clone()))
            .unwrap(),
        Payload::Text(_) => panic!("expected binary payload"),
    };
    assert_eq!(received, value);
}

#[test]
fn test_uncompressed_frames_unchanged_in_both_directions() {
    let codec = codec();
    let value = json!({"id": 3});
    let headers = FrameHeaders::new();

    let Payload::Binary(wire) = codec.write_outbound(&value, &headers).unwrap() else {
        panic!("expected binary payload");
    };
    assert_eq!(wire.as_ref(), serde_json::to_vec(&value).unwrap());
    assert_eq!(
        codec.read_inbound(&headers, &Payload::Binary(wire)).unwrap(),
        value
    );
}

#[test]
fn test_every_client_header_shape_decodes() {
    let codec = codec();
    let value = json!({"status": "ok"});

    let outbound_headers = FrameHeaders::new().with_compression();
    let Payload::Binary(wire) = codec.write_outbound(&value, &outbound_headers).unwrap() else {
        panic!("expected binary payload");
    };

    let shapes = [
        HeaderValue::Bool(true),
        HeaderValue::Text("true".to_string()),
        HeaderValue::Text("TRUE".to_string()),
        HeaderValue::List(vec!["true".to_string()]),
    ];
    for shape in shapes {
        let mut headers = FrameHeaders::new();
        headers.insert(COMPRESSION_HEADER, shape.clone());
        let received = codec
            .read_inbound(&headers, &Payload::Binary(wire.clone()))
            .unwrap();
        assert_eq!(received, value, "header shape {shape:?}");
    }
}

#[test]
fn test_false_flag_shapes_mean_plain_json() {
    let codec = codec();
    let value = json!({"status": "ok"});
    let plain = Payload::Binary(serde_json::to_vec(&value).unwrap().into());

    let shapes = [
        HeaderValue::Bool(false),
        HeaderValue::Text("false".to_string()),
        HeaderValue::List(vec!["false".to_string()]),
    ];
    for shape in shapes {
        let mut headers = FrameHeaders::new();
        headers.insert(COMPRESSION_HEADER, shape.clone());
        let received = codec.read_inbound(&headers, &plain).unwrap();
        assert_eq!(received, value, "header shape {shape:?}");
    }
}

#[test]
fn test_corrupted_compressed_payload_fails_conversion() {
    let codec = codec();
    let value = json!({"big": "x".repeat(1024)});

    let headers = FrameHeaders::new().with_compression();
    let Payload::Binary(wire) = codec.write_outbound(&value, &headers).unwrap() else {
        panic!("expected binary payload");
    };

    // Truncate the wire bytes: still base64, no longer a full gzip stream.
    let truncated = &wire[..wire.len() / 2 - (wire.len() / 2) % 4];
    let result = codec.read_inbound(&headers, &Payload::Binary(truncated.to_vec().into()));
    assert!(result.is_err(), "truncated payload must fail, not fall back");

    // The original bytes still decode, the failure is per-message.
    let intact = decode_compressed(&wire).unwrap();
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&intact).unwrap(),
        value
    );
}
