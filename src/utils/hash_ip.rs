use sha2::{Digest, Sha256};
use std::env;

/// Hash a visitor's IP address for privacy and storage. The hash, not
/// the raw address, is what keys ad-view sessions.
pub fn hash_ip(ip: &str) -> String {
    let salt = env::var("IP_HASH_SALT").unwrap_or_else(|_| String::from("moviezone_salt"));
    let salted_ip = format!("{}{}", ip, salt);

    let mut hasher = Sha256::new();
    hasher.update(salted_ip.as_bytes());
    let result = hasher.finalize();

    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_ip_hashes_stably_and_distinct_ips_differ() {
        assert_eq!(hash_ip("203.0.113.9"), hash_ip("203.0.113.9"));
        assert_ne!(hash_ip("203.0.113.9"), hash_ip("203.0.113.10"));
    }

    #[test]
    fn output_is_hex_sha256() {
        let hashed = hash_ip("198.51.100.1");
        assert_eq!(hashed.len(), 64);
        assert!(hashed.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
