use sha2::{Digest, Sha256};

/// Hex characters kept from the digest. 32 bits of suffix, so collisions are
/// possible at scale; the container runtime refusing duplicate names is what
/// actually enforces uniqueness.
const SUFFIX_LEN: usize = 8;

/// Builds a container name of the form `{label}-{suffix}`, where the suffix is
/// the first 8 hex characters of `sha256("{label}/{id}")`.
pub fn generate_unique_name(label: &str, id: &str) -> String {
    let digest = Sha256::digest(format!("{}/{}", label, id).as_bytes());
    let hex = format!("{:x}", digest);

    format!("{}-{}", label, &hex[..SUFFIX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("vllm-0-0", "66a886db-86db-4cf9-8c06-8984ad15dde2", "vllm-0-0-cff1b8da")]
    #[case("vllm-0-0", "41728e34-bf7e-41da-bf0e-0f46764b1752", "vllm-0-0-bb2a28c3")]
    #[case(
        "llamacpp-0-0",
        "66a886db-86db-4cf9-8c06-8984ad15dde2",
        "llamacpp-0-0-58d1283d"
    )]
    fn generates_expected_names(#[case] label: &str, #[case] id: &str, #[case] expected: &str) {
        assert_eq!(generate_unique_name(label, id), expected);
    }

    #[test]
    fn is_deterministic() {
        let id = "66a886db-86db-4cf9-8c06-8984ad15dde2";
        let first = generate_unique_name("vllm-0-0", id);
        for _ in 0..10 {
            assert_eq!(generate_unique_name("vllm-0-0", id), first);
        }
    }

    #[test]
    fn suffix_depends_on_label_and_id() {
        let id = "66a886db-86db-4cf9-8c06-8984ad15dde2";
        let vllm = generate_unique_name("vllm-0-0", id);
        let llamacpp = generate_unique_name("llamacpp-0-0", id);

        assert_ne!(vllm.rsplit('-').next(), llamacpp.rsplit('-').next());
        assert_ne!(vllm, generate_unique_name("vllm-0-0", "another-id"));
    }

    #[test]
    fn keeps_structured_labels_intact() {
        let name = generate_unique_name("svc-3-1", "id");
        assert!(name.starts_with("svc-3-1-"));
        assert_eq!(name.len(), "svc-3-1-".len() + SUFFIX_LEN);
    }
}
