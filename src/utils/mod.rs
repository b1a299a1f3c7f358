pub mod ip;

pub use ip::extract_client_ip;

/// Generate a prefixed random identifier, e.g. `clk_9f8a6b3c1d2e4f50`.
///
/// 8 random bytes (64 bits of entropy) rendered as 16 hex chars, which is
/// collision-resistant at the volumes a single deployment sees.
pub fn generate_prefixed_id(prefix: &str) -> String {
    let bytes: [u8; 8] = rand::random();
    let mut id = String::with_capacity(prefix.len() + 16);
    id.push_str(prefix);
    for byte in bytes {
        use std::fmt::Write;
        let _ = write!(id, "{:02x}", byte);
    }
    id
}

pub mod id_prefix {
    pub const CLICK: &str = "clk_";
    pub const LINK: &str = "lnk_";
    pub const TRANSACTION: &str = "txn_";
    pub const WITHDRAWAL: &str = "wd_";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn prefixed_id_shape() {
        let id = generate_prefixed_id(id_prefix::CLICK);
        assert!(id.starts_with("clk_"));
        assert_eq!(id.len(), 4 + 16);
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            seen.insert(generate_prefixed_id(id_prefix::TRANSACTION));
        }
        assert_eq!(seen.len(), 1000);
    }
}
