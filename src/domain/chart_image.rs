// Chart image domain model - base64 payload plus declared media type
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const SNIFF_PREFIX_CHARS: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    base64: String,
    media_type: String,
}

impl ChartImage {
    /// Accepts a bare base64 payload or a `data:<type>;base64,<payload>` URI.
    /// Returns `None` when there is no payload at all.
    pub fn parse(raw: &str, default_media_type: &str) -> Option<Self> {
        let raw = raw.trim();
        let (declared, payload) = match raw.strip_prefix("data:") {
            Some(uri) => match uri.split_once(',') {
                Some((meta, payload)) => (
                    meta.strip_suffix(";base64").filter(|t| !t.is_empty()),
                    payload.trim(),
                ),
                None => (None, uri),
            },
            None => (None, raw),
        };

        if payload.is_empty() {
            return None;
        }

        let media_type = declared
            .map(str::to_string)
            .or_else(|| sniff_media_type(payload).map(str::to_string))
            .unwrap_or_else(|| default_media_type.to_string());

        Some(Self {
            base64: payload.to_string(),
            media_type,
        })
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type(), self.base64())
    }

    /// Short form for logs: first 50 characters and the total length.
    pub fn redacted(&self) -> String {
        let head: String = self.base64().chars().take(50).collect();
        format!("data:{};base64, {}, {} bytes", self.media_type(), head, self.base64().len())
    }
}

/// Identify the image format from its leading magic bytes.
fn sniff_media_type(payload: &str) -> Option<&'static str> {
    let prefix = payload.get(..SNIFF_PREFIX_CHARS)?;
    let bytes = STANDARD.decode(prefix).ok()?;

    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF8") {
        Some("image/gif")
    } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
        Some("image/webp")
    } else {
        None
    }
}
