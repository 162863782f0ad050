mod keys;
mod transcode;

pub use keys::{extension_for_mime, generate_storage_key, webp_sibling_key};
pub use transcode::{ImageRsTranscoder, ImageTranscoder};

/// Resolves the effective MIME type of an upload: the declared type when
/// present, otherwise a magic-byte sniff. Browsers occasionally send
/// `application/octet-stream` for drag-and-dropped files, so that also
/// falls through to the sniffer.
pub fn resolve_mime(declared: Option<&str>, bytes: &[u8]) -> Option<String> {
    match declared {
        Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => {
            Some(mime.to_string())
        }
        _ => infer::get(bytes).map(|kind| kind.mime_type().to_string()),
    }
}
