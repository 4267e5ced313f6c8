use base64::Engine;

use crate::foundation::error::{PosterError, PosterResult};

const DATA_URL_PREFIX: &str = "data:";
const DEFAULT_MEDIA_TYPE: &str = "text/plain";

/// Decoded `data:` URL payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataUrl {
    /// Media type without parameters, e.g. `image/png`.
    pub media_type: String,
    /// Decoded bytes.
    pub bytes: Vec<u8>,
}

/// Return `true` when `url` uses the `data:` scheme.
pub fn is_data_url(url: &str) -> bool {
    url.get(..DATA_URL_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(DATA_URL_PREFIX))
}

/// Encode bytes as a base64 `data:` URL.
pub fn encode_data_url(media_type: &str, bytes: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("{DATA_URL_PREFIX}{media_type};base64,{payload}")
}

/// Decode a `data:` URL (RFC 2397), base64 or percent-encoded.
pub fn decode_data_url(url: &str) -> PosterResult<DataUrl> {
    if !is_data_url(url) {
        return Err(invalid("URL does not start with 'data:'"));
    }

    let rest = &url[DATA_URL_PREFIX.len()..];
    let (metadata, data) = rest
        .split_once(',')
        .ok_or_else(|| invalid("missing comma in data URL"))?;

    let mut parts = metadata.split(';');
    let media_type = match parts.next().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_ascii_lowercase(),
        _ => DEFAULT_MEDIA_TYPE.to_owned(),
    };
    let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        decode_base64_data(data)?
    } else {
        percent_decode(data)?
    };
    Ok(DataUrl { media_type, bytes })
}

// ASCII whitespace inside the payload is tolerated.
fn decode_base64_data(data: &str) -> PosterResult<Vec<u8>> {
    let cleaned: Vec<u8> = data
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| invalid(format!("invalid base64: {e}")))
}

fn percent_decode(input: &str) -> PosterResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let hex = bytes
            .get(i + 1..i + 3)
            .ok_or_else(|| invalid("incomplete percent-escape"))?;
        let hi = (hex[0] as char).to_digit(16);
        let lo = (hex[1] as char).to_digit(16);
        let (Some(hi), Some(lo)) = (hi, lo) else {
            return Err(invalid("invalid percent-escape"));
        };
        out.push(((hi << 4) | lo) as u8);
        i += 3;
    }
    Ok(out)
}

fn invalid(reason: impl Into<String>) -> PosterError {
    PosterError::validation(format!("invalid data URL: {}", reason.into()))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/data_url.rs"]
mod tests;
