//! Conversions between Rust strings and PDF text strings and names

use lopdf::{Object, StringFormat};

/// Encode `text` as a PDF text string
///
/// ASCII text is stored as a literal string. Anything else is stored as
/// UTF-16BE with a byte order mark so that viewers decode accents correctly.
pub fn encode_text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode the bytes of a PDF text string
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => latin1_to_string(bytes),
    }
}

/// Bytes of the PDF name designated by `identity`
///
/// A leading `/` is ignored. Identities made only of Latin-1 characters use
/// one byte per character, which is how form templates spell names such as
/// `D#E9p#F4t`. Other identities are stored as UTF-8.
pub fn name_bytes(identity: &str) -> Vec<u8> {
    let identity = identity.strip_prefix('/').unwrap_or(identity);

    if identity.chars().all(|c| (c as u32) <= 0xFF) {
        identity.chars().map(|c| c as u32 as u8).collect()
    } else {
        identity.as_bytes().to_vec()
    }
}

/// Readable form of PDF name bytes, without the leading `/`
pub fn name_to_string(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(name) => name.to_string(),
        Err(_) => latin1_to_string(bytes),
    }
}

fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
