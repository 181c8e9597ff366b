use rand::Rng;

const COUPON_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Random coupon code, uppercase letters and digits without the
/// easily-confused `0/O/1/I`.
pub fn generate_coupon_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| COUPON_ALPHABET[rng.gen_range(0..COUPON_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_coupon_code() {
        let code = generate_coupon_code(8);
        assert_eq!(code.len(), 8);
        assert!(code.bytes().all(|b| COUPON_ALPHABET.contains(&b)));
        assert!(!code.contains('O') && !code.contains('0'));
    }

    #[test]
    fn test_generate_coupon_code_lengths() {
        assert_eq!(generate_coupon_code(0), "");
        assert_eq!(generate_coupon_code(12).len(), 12);
    }
}
