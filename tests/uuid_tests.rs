//! Layout and uniqueness checks for generated identifiers.

use std::collections::HashSet;

use tonneau::uuid::{generate_uuid, UUID_LEN};

#[test]
fn test_identifier_length_and_variant() {
    let id = generate_uuid();
    assert_eq!(id.len(), UUID_LEN);
    // RFC4122 variant: top two bits of byte 8 are `10`.
    assert_eq!(id[8] & 0xc0, 0x80);
}

#[test]
fn test_no_collisions_in_ten_thousand() {
    let mut seen = HashSet::with_capacity(10_000);
    for _ in 0..10_000 {
        let id = generate_uuid();
        assert_eq!(id[8] & 0xc0, 0x80);
        assert!(seen.insert(id), "duplicate identifier generated");
    }
}
