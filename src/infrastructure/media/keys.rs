use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

/// Derives a collision-resistant storage key: millisecond timestamp prefix,
/// random suffix, original extension. Matches the layout readers of the
/// bucket already expect.
pub fn generate_storage_key(file_name: Option<&str>, mime: &str) -> String {
    let extension = file_name
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| extension_for_mime(mime).to_string());

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();

    format!("{}-{}.{}", Utc::now().timestamp_millis(), suffix, extension)
}

/// The WebP sibling lives next to the original under the same stem.
pub fn webp_sibling_key(key: &str) -> String {
    match key.rsplit_once('.') {
        Some((stem, _)) => format!("{stem}.webp"),
        None => format!("{key}.webp"),
    }
}

pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_keeps_original_extension() {
        let key = generate_storage_key(Some("sunset.PNG"), "image/png");
        assert!(key.ends_with(".png"), "unexpected key: {key}");
    }

    #[test]
    fn key_falls_back_to_mime_extension() {
        let key = generate_storage_key(Some("noext"), "image/jpeg");
        assert!(key.ends_with(".jpg"), "unexpected key: {key}");
    }

    #[test]
    fn keys_are_unique_across_calls() {
        let a = generate_storage_key(None, "image/jpeg");
        let b = generate_storage_key(None, "image/jpeg");
        assert_ne!(a, b);
    }

    #[test]
    fn webp_sibling_swaps_extension() {
        assert_eq!(webp_sibling_key("17123-abc.jpg"), "17123-abc.webp");
        assert_eq!(webp_sibling_key("bare"), "bare.webp");
    }
}
