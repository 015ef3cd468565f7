//! Small helpers.

use rand::Rng;

/// Generate an id unique enough for naming page elements.
///
/// The current time in milliseconds followed by five random numbers below
/// 65535, all rendered in radix 32.
pub fn unique_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut rng = rand::rng();
    let mut id = radix32(millis);
    for _ in 0..5 {
        id.push_str(&radix32(rng.random_range(0..65535)));
    }
    id
}

fn radix32(mut n: u64) -> String {
    const DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 32) as usize]);
        n /= 32;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radix32() {
        assert_eq!(radix32(0), "0");
        assert_eq!(radix32(31), "v");
        assert_eq!(radix32(32), "10");
        assert_eq!(radix32(65534), "1vvu");
    }

    #[test]
    fn test_unique_id_shape() {
        let a = unique_id();
        let b = unique_id();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_digit() || ('a'..='v').contains(&c)));
        assert!(a.len() >= 10);
    }
}
