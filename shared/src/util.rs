//! Id and secret generation helpers

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2025-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
///
/// Used for every entity id: stores, users, treatments, resources,
/// timeslots, bookings, webhook subscriptions.
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2025-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_735_689_600_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Generate a 256-bit random secret, hex-encoded (64 characters).
///
/// Webhook subscription signing secrets are minted with this on creation.
pub fn generate_secret() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_id_positive() {
        for _ in 0..100 {
            assert!(snowflake_id() > 0);
        }
    }

    #[test]
    fn test_snowflake_id_ordering() {
        // Ids minted a few ms apart must be strictly increasing
        let a = snowflake_id();
        std::thread::sleep(std::time::Duration::from_millis(3));
        let b = snowflake_id();
        assert!(b > a);
    }

    #[test]
    fn test_generate_secret_shape() {
        let s = generate_secret();
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
        // Two draws must differ
        assert_ne!(s, generate_secret());
    }
}
