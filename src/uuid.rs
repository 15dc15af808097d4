//! Random 16-byte connection identifiers with RFC4122 layout.
//!
//! Used by socket objects to fabricate an anonymous identity when a peer
//! has not assigned one explicitly. The generator is stateless and safe to
//! call concurrently.
//!
//! The backing facility is selected at build time: with the default
//! `native-uuid` feature the `uuid` crate's version-4 generator is used;
//! without it, raw entropy is drawn from `rand` and the RFC4122 variant and
//! version bits are stamped by hand. Either way the output is exactly 16
//! bytes with variant bits `10` in byte 8.

/// Length of a generated identifier in bytes.
pub const UUID_LEN: usize = 16;

/// Generate a random RFC4122 identifier.
///
/// Never returns a degraded value: an entropy-source failure aborts the
/// process, since a weak or zero identifier risks silent collisions.
#[cfg(feature = "native-uuid")]
#[must_use]
pub fn generate_uuid() -> [u8; UUID_LEN] {
    *::uuid::Uuid::new_v4().as_bytes()
}

/// Generate a random RFC4122 identifier.
///
/// Never returns a degraded value: an entropy-source failure aborts the
/// process, since a weak or zero identifier risks silent collisions.
#[cfg(not(feature = "native-uuid"))]
#[must_use]
pub fn generate_uuid() -> [u8; UUID_LEN] {
    use rand::RngCore;

    let mut buf = [0u8; UUID_LEN];
    rand::thread_rng().fill_bytes(&mut buf);
    set_rfc4122_bits(&mut buf);
    buf
}

/// Stamp RFC4122 layout onto raw random bytes.
///
/// Sets the variant field (top two bits of byte 8) to `10` and the version
/// field (top nibble of byte 6) to 4, randomly generated.
pub fn set_rfc4122_bits(buf: &mut [u8; UUID_LEN]) {
    buf[8] = (buf[8] & 0x3f) | 0x80;
    buf[6] = (buf[6] & 0x0f) | 0x40;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_and_version_bits() {
        let id = generate_uuid();
        assert_eq!(id[8] & 0xc0, 0x80);
        assert_eq!(id[6] & 0xf0, 0x40);
    }

    #[test]
    fn test_bit_stamping_is_idempotent() {
        let mut buf = [0xffu8; UUID_LEN];
        set_rfc4122_bits(&mut buf);
        assert_eq!(buf[8], 0xbf);
        assert_eq!(buf[6], 0x4f);

        let snapshot = buf;
        set_rfc4122_bits(&mut buf);
        assert_eq!(buf, snapshot);

        let mut zeros = [0u8; UUID_LEN];
        set_rfc4122_bits(&mut zeros);
        assert_eq!(zeros[8], 0x80);
        assert_eq!(zeros[6], 0x40);
    }

    #[test]
    fn test_successive_identifiers_differ() {
        let a = generate_uuid();
        let b = generate_uuid();
        assert_ne!(a, b);
    }
}
