// Domain endpoints, one file per backend resource.
//
// Each file adds inherent methods to `ApiClient`. They are thin: build the
// path, pass parameters through, and hand back the `ApiResult` unchanged.
// No retries and no caching happen at this layer.

mod api_schemas;
mod auth;
mod devices;
mod mappings;
mod notifications;
mod services;
mod templates;
mod yang_models;

/// Encode a caller-supplied value for use as a single path segment.
fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}

#[cfg(test)]
mod tests {
    use super::segment;

    #[test]
    fn segment_escapes_reserved_characters() {
        assert_eq!(
            segment("urn:ietf:params:xml:ns:yang:ietf-interfaces"),
            "urn%3Aietf%3Aparams%3Axml%3Ans%3Ayang%3Aietf-interfaces"
        );
        assert_eq!(segment("http://a/b c"), "http%3A%2F%2Fa%2Fb%20c");
        assert_eq!(segment("plain-id_42"), "plain-id_42");
    }
}
