//! Identity Comparator
//!
//! Finds stored media that is byte-identical to a reference blob. The digest
//! rejects most candidates cheaply; a digest match is confirmed by comparing
//! every byte.

use base64::Engine;
use bytes::Bytes;

use super::digest::compute_digest;
use super::store::ContentStore;

/// Data-URL prefix stripped from reference payloads
pub const DATA_URL_PREFIX: &str = "data:video/mp4;base64,";

/// Decoded reference blob with its digest computed once
#[derive(Debug, Clone)]
pub struct ReferenceBlob {
    data: Bytes,
    digest: String,
}

impl ReferenceBlob {
    /// Wrap raw bytes
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let digest = compute_digest(&data);
        Self { data, digest }
    }

    /// Decode a complete base64 payload, with or without the data-URL prefix
    pub fn from_base64(payload: &str) -> Result<Self, base64::DecodeError> {
        let encoded = payload.strip_prefix(DATA_URL_PREFIX).unwrap_or(payload);
        let data = base64::engine::general_purpose::STANDARD.decode(encoded)?;
        Ok(Self::new(data))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Check a candidate buffer against this reference
    pub fn matches(&self, candidate: &[u8]) -> bool {
        is_identical(&self.digest, &self.data, candidate)
    }
}

/// Decide whether `candidate` is byte-identical to `reference`
///
/// `reference_digest` must be the digest of `reference`.
pub fn is_identical(reference_digest: &str, reference: &[u8], candidate: &[u8]) -> bool {
    if compute_digest(candidate) != reference_digest {
        return false;
    }

    if reference.len() != candidate.len() {
        return false;
    }

    reference.iter().zip(candidate).all(|(a, b)| a == b)
}

/// Collect the candidate ids whose stored bytes match the reference
///
/// Ids missing from the store are skipped. Output keeps the caller's order.
pub async fn find_matches<S: AsRef<str>>(
    reference: &ReferenceBlob,
    candidate_ids: &[S],
    store: &ContentStore,
) -> Vec<String> {
    let mut results = Vec::new();

    for id in candidate_ids {
        let id = id.as_ref();
        let Some(candidate) = store.get(id).await else {
            continue;
        };

        if reference.matches(&candidate) {
            results.push(id.to_string());
        }
    }

    tracing::debug!(
        reference_digest = %reference.digest(),
        reference_size = reference.data().len(),
        matches = results.len(),
        "Comparison pass complete"
    );

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_is_reflexive() {
        let data = b"some video bytes".to_vec();
        let digest = compute_digest(&data);
        assert!(is_identical(&digest, &data, &data));
        assert!(is_identical(&compute_digest(b""), b"", b""));
    }

    #[test]
    fn test_single_byte_difference() {
        let a = vec![1u8, 2, 3, 4, 5];
        let mut b = a.clone();
        b[4] = 6;
        assert!(!is_identical(&compute_digest(&a), &a, &b));
    }

    #[test]
    fn test_digest_match_still_checks_bytes() {
        // A digest that claims equality is not trusted on its own
        let a = b"ABC";
        let b = b"XYZ";
        let forged = compute_digest(b);
        assert!(!is_identical(&forged, a, b));
    }

    #[test]
    fn test_length_mismatch() {
        let a = b"ABC";
        let b = b"ABCD";
        assert!(!is_identical(&compute_digest(a), a, b));
    }

    #[test]
    fn test_from_base64_strips_prefix() {
        let blob = ReferenceBlob::from_base64("data:video/mp4;base64,QUJD").unwrap();
        assert_eq!(blob.data(), b"ABC");
        assert_eq!(blob.digest(), compute_digest(b"ABC"));

        let bare = ReferenceBlob::from_base64("QUJD").unwrap();
        assert_eq!(bare.data(), b"ABC");
    }

    #[test]
    fn test_from_base64_rejects_garbage() {
        assert!(ReferenceBlob::from_base64("data:video/mp4;base64,Q!JD").is_err());
        // A half-delivered payload is not valid base64
        assert!(ReferenceBlob::from_base64("QUJ").is_err());
    }

    #[tokio::test]
    async fn test_find_matches_keeps_caller_order() {
        let store = ContentStore::new();
        store.put("abc-1", Bytes::from_static(b"ABC")).await;
        store.put("abd", Bytes::from_static(b"ABD")).await;
        store.put("abc-2", Bytes::from_static(b"ABC")).await;

        let reference = ReferenceBlob::from_base64("data:video/mp4;base64,QUJD").unwrap();
        let results = find_matches(
            &reference,
            &["abc-2", "missing", "abd", "abc-1"],
            &store,
        )
        .await;

        assert_eq!(results, vec!["abc-2".to_string(), "abc-1".to_string()]);
    }
}
