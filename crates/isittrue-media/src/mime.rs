//! MIME type detection from file extensions and content signatures.

use std::path::Path;

/// Guess a MIME type from the file extension.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" | "opus" => "audio/ogg",
        "m4a" => "audio/mp4",
        "webm" => "audio/webm",
        "flac" => "audio/flac",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}

/// A content signature match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Signature {
    mime: &'static str,
    /// Weak signatures are short enough to occur in ordinary text and lose
    /// to a known extension.
    strong: bool,
}

impl Signature {
    fn strong(mime: &'static str) -> Option<Self> {
        Some(Self { mime, strong: true })
    }

    fn weak(mime: &'static str) -> Option<Self> {
        Some(Self {
            mime,
            strong: false,
        })
    }
}

fn signature(data: &[u8]) -> Option<Signature> {
    let starts = |sig: &[u8]| data.starts_with(sig);
    if starts(b"\x89PNG\r\n\x1a\n") {
        Signature::strong("image/png")
    } else if starts(b"\xff\xd8\xff") {
        Signature::strong("image/jpeg")
    } else if starts(b"GIF87a") || starts(b"GIF89a") {
        Signature::strong("image/gif")
    } else if starts(b"II*\0") || starts(b"MM\0*") {
        Signature::strong("image/tiff")
    } else if is_bmp(data) {
        Signature::weak("image/bmp")
    } else if starts(b"\0\0\x01\0") && data.len() >= 22 {
        Signature::weak("image/x-icon")
    } else if starts(b"RIFF") && data.get(8..12) == Some(&b"WEBP"[..]) {
        Signature::strong("image/webp")
    } else if starts(b"RIFF") && data.get(8..12) == Some(&b"WAVE"[..]) {
        Signature::strong("audio/wav")
    } else if data.get(4..8) == Some(&b"ftyp"[..]) {
        match data.get(8..12) {
            Some(b"avif" | b"avis") => Signature::strong("image/avif"),
            Some(b"heic" | b"heix" | b"mif1") => Signature::strong("image/heic"),
            Some(b"M4A ") => Signature::strong("audio/mp4"),
            _ => None,
        }
    } else if starts(b"OggS") {
        Signature::strong("audio/ogg")
    } else if starts(b"fLaC") {
        Signature::strong("audio/flac")
    } else if starts(b"ID3") || starts(b"\xff\xfb") || starts(b"\xff\xf3") {
        Signature::weak("audio/mpeg")
    } else if starts(b"\x1a\x45\xdf\xa3") {
        Signature::strong("audio/webm")
    } else if starts(b"%PDF") {
        Signature::strong("application/pdf")
    } else {
        None
    }
}

/// `BM`, a declared file size that fits the data, zeroed reserved bytes and a
/// known DIB header size.
fn is_bmp(data: &[u8]) -> bool {
    if data.len() < 26 || !data.starts_with(b"BM") {
        return false;
    }
    let le32 = |at: usize| u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);
    let declared = le32(2) as usize;
    let reserved = le32(6);
    let dib_header = le32(14);
    (26..=data.len()).contains(&declared)
        && reserved == 0
        && matches!(dib_header, 12 | 40 | 52 | 56 | 64 | 108 | 124)
}

/// Identify common image and audio formats from their leading bytes.
pub fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    signature(data).map(|sig| sig.mime)
}

/// Detect the MIME type of a file.
///
/// Strong content signatures win, then the extension, then weak signatures.
pub fn detect_mime(path: &Path, data: &[u8]) -> String {
    let sig = signature(data);
    let mime = match (sig, mime_from_extension(path)) {
        (Some(sig), _) if sig.strong => sig.mime,
        (_, Some(ext)) => ext,
        (Some(sig), None) => sig.mime,
        (None, None) => "application/octet-stream",
    };
    mime.to_string()
}
