//! Image <-> base64 conversions
//!
//! Every function here logs its own diagnostic and returns a [`CodecError`]
//! instead of panicking, so call sites only need to check the result.

use crate::CodecError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as Base64Engine;
use log::{error, info};
use std::path::Path;

/// MIME type used when the extension is not in [`MIME_TYPES`]
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Extension (lowercase, with dot) to MIME type
pub const MIME_TYPES: &[(&str, &str)] = &[
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".png", "image/png"),
    (".gif", "image/gif"),
    (".bmp", "image/bmp"),
    (".webp", "image/webp"),
    (".svg", "image/svg+xml"),
];

const DATA_URI_SCHEME: &str = "data:";

/// Look up the MIME type for a path by its extension.
///
/// Unknown or missing extensions fall back to `image/jpeg`.
pub fn mime_type_for(path: impl AsRef<Path>) -> &'static str {
    let ext = match path.as_ref().extension().and_then(|e| e.to_str()) {
        Some(e) => format!(".{}", e.to_ascii_lowercase()),
        None => return DEFAULT_MIME_TYPE,
    };
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME_TYPE)
}

/// Read an image file and return its contents as standard base64.
pub fn encode(image_path: impl AsRef<Path>) -> Result<String, CodecError> {
    let path = image_path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| {
        let err = if source.kind() == std::io::ErrorKind::NotFound {
            CodecError::NotFound(path.to_path_buf())
        } else {
            CodecError::Read {
                path: path.to_path_buf(),
                source,
            }
        };
        error!("{}", err);
        err
    })?;
    Ok(STANDARD.encode(bytes))
}

/// Like [`encode`], formatted as `data:<mime>;base64,<payload>`.
pub fn encode_with_data_uri_prefix(image_path: impl AsRef<Path>) -> Result<String, CodecError> {
    let path = image_path.as_ref();
    let mime = mime_type_for(path);
    let payload = encode(path)?;
    Ok(format!("data:{};base64,{}", mime, payload))
}

/// Encode an image and write the bare base64 text to `output_path`.
///
/// Nothing is written when encoding fails.
pub fn save_encoded_to_file(
    image_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> Result<(), CodecError> {
    let output = output_path.as_ref();
    let encoded = encode(image_path)?;
    std::fs::write(output, encoded).map_err(|source| {
        let err = CodecError::Write {
            path: output.to_path_buf(),
            source,
        };
        error!("{}", err);
        err
    })?;
    info!("Base64 string saved to: {}", output.display());
    Ok(())
}

/// Decode base64 (or a base64 `data:` URI) and write the bytes to `output_path`.
///
/// For `data:` input everything up to and including the first comma is
/// dropped. Whitespace anywhere in the payload is ignored, so line-wrapped
/// base64 (76-column MIME output) decodes. Returns the number of bytes written.
pub fn decode(input: &str, output_path: impl AsRef<Path>) -> Result<usize, CodecError> {
    let output = output_path.as_ref();
    let payload: String = strip_data_uri(input.trim())
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD.decode(payload).map_err(|e| {
        let err = CodecError::from(e);
        error!("{}", err);
        err
    })?;

    std::fs::write(output, &bytes).map_err(|source| {
        let err = CodecError::Write {
            path: output.to_path_buf(),
            source,
        };
        error!("{}", err);
        err
    })?;
    info!("Image saved to: {}", output.display());
    Ok(bytes.len())
}

fn strip_data_uri(input: &str) -> &str {
    if !input.starts_with(DATA_URI_SCHEME) {
        return input;
    }
    match input.split_once(',') {
        Some((_, payload)) => payload,
        None => "",
    }
}
