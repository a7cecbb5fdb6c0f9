//! Round trips through the base64 codec

use htmlshot::codec;
use htmlshot::CodecError;

/// 1x1 transparent PNG
const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8/5+hHgAHggJ/PchI7wAAAABJRU5ErkJggg==";

fn every_byte() -> Vec<u8> {
    (0..=255u8).cycle().take(4096).collect()
}

#[test]
fn encode_then_decode_reproduces_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("blob.png");
    let out = dir.path().join("restored.png");
    std::fs::write(&src, every_byte()).unwrap();

    let encoded = codec::encode(&src).expect("encode");
    let written = codec::decode(&encoded, &out).expect("decode");

    assert_eq!(written, 4096);
    assert_eq!(std::fs::read(&out).unwrap(), every_byte());
}

#[test]
fn line_wrapped_base64_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("wrapped.png");
    let out = dir.path().join("unwrapped.png");
    let original: Vec<u8> = every_byte().into_iter().take(200).collect();
    std::fs::write(&src, &original).unwrap();

    // Wrap at 76 columns the way MIME encoders and GNU base64 do
    let encoded = codec::encode(&src).expect("encode");
    let wrapped = encoded
        .as_bytes()
        .chunks(76)
        .map(|line| std::str::from_utf8(line).unwrap())
        .collect::<Vec<_>>()
        .join("\n");
    assert!(wrapped.contains('\n'));

    codec::decode(&wrapped, &out).expect("decode wrapped");
    assert_eq!(std::fs::read(&out).unwrap(), original);

    let uri = format!("data:image/png;base64,{}", wrapped);
    codec::decode(&uri, &out).expect("decode wrapped data uri");
    assert_eq!(std::fs::read(&out).unwrap(), original);
}

#[test]
fn data_uri_round_trip_strips_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("icon.svg");
    let out = dir.path().join("icon_copy.svg");
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"/>"#;
    std::fs::write(&src, svg).unwrap();

    let uri = codec::encode_with_data_uri_prefix(&src).expect("encode");
    assert!(uri.starts_with("data:image/svg+xml;base64,"));

    codec::decode(&uri, &out).expect("decode");
    assert_eq!(std::fs::read(&out).unwrap(), svg.to_vec());
}

#[test]
fn decoding_a_known_png_yields_png_magic() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("pixel.png");

    codec::decode(&format!("data:image/png;base64,{}", PIXEL_PNG), &out).expect("decode");
    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");

    // Encoding the restored file gives back the original text
    assert_eq!(codec::encode(&out).unwrap(), PIXEL_PNG);
}

#[test]
fn saved_base64_text_decodes_back() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("photo.jpg");
    let txt = dir.path().join("photo.txt");
    let out = dir.path().join("photo_restored.jpg");
    std::fs::write(&src, every_byte()).unwrap();

    codec::save_encoded_to_file(&src, &txt).expect("save");
    let text = std::fs::read_to_string(&txt).unwrap();
    codec::decode(&text, &out).expect("decode");

    assert_eq!(std::fs::read(&out).unwrap(), every_byte());
}

#[test]
fn encoding_a_missing_file_does_not_panic() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.png");

    match codec::encode(&missing) {
        Err(CodecError::NotFound(p)) => assert_eq!(p, missing),
        other => panic!("expected NotFound, got {:?}", other),
    }
}
