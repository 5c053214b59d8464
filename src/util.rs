/// Sum of the dot-separated numeric parts of an address, mod 360. Parts that do
/// not parse as numbers count as zero.
pub fn address_digest(address: &str) -> f64 {
    let sum = address
        .split('.')
        .map(|part| part.trim().parse::<u64>().unwrap_or(0))
        .fold(0u64, u64::wrapping_add);
    (sum % 360) as f64
}

/// Stable identifier of a hop on the rendering surface.
pub fn node_key(address: &str) -> String {
    format!("node-{}", address.replace(['.', ':'], "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_sums_octets() {
        assert_eq!(address_digest("10.1.10.1"), 22.0);
        assert_eq!(address_digest("255.255.255.255"), 300.0);
        assert_eq!(address_digest("200.200.0.0"), 40.0);
        assert_eq!(address_digest("router.example"), 0.0);
        assert_eq!(address_digest(""), 0.0);
    }

    #[test]
    fn node_keys() {
        assert_eq!(node_key("10.1.10.1"), "node-10-1-10-1");
        assert_eq!(node_key("2001:db8::1"), "node-2001-db8--1");
    }
}
