use super::*;

#[test]
fn base64_payload_decodes() {
    let url = encode_data_url("image/png", &[0x89, b'P', b'N', b'G']);
    assert!(url.starts_with("data:image/png;base64,"));
    let decoded = decode_data_url(&url).unwrap();
    assert_eq!(decoded.media_type, "image/png");
    assert_eq!(decoded.bytes, vec![0x89, b'P', b'N', b'G']);
}

#[test]
fn whitespace_in_base64_is_tolerated() {
    let decoded = decode_data_url("data:image/png;base64,aGVs\n bG8=").unwrap();
    assert_eq!(decoded.bytes, b"hello");
}

#[test]
fn percent_encoded_payload_and_default_type() {
    let decoded = decode_data_url("data:,a%20b%2C").unwrap();
    assert_eq!(decoded.media_type, "text/plain");
    assert_eq!(decoded.bytes, b"a b,");
}

#[test]
fn malformed_urls_are_rejected() {
    assert!(decode_data_url("http://example.com/a.png").is_err());
    assert!(decode_data_url("data:image/png;base64").is_err());
    assert!(decode_data_url("data:image/png;base64,!!!").is_err());
    assert!(decode_data_url("data:,%2").is_err());
    assert!(decode_data_url("data:,%zz").is_err());
    assert!(is_data_url("DATA:image/png,x"));
}
