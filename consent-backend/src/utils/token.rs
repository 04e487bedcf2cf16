// src/utils/token.rs
use rand::{distributions::Alphanumeric, Rng};

/// 暗号学的に推測不能なトークンを生成する
///
/// 英数字1文字あたり約5.95ビットのエントロピーなので、長さ32で190ビット弱。
/// 共有トークンの最低要件（128ビット）を十分に満たす。
pub fn generate_secure_token(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generates_requested_length() {
        assert_eq!(generate_secure_token(32).len(), 32);
        assert_eq!(generate_secure_token(64).len(), 64);
    }

    #[test]
    fn tokens_are_alphanumeric() {
        let token = generate_secure_token(128);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn consecutive_tokens_differ() {
        let tokens: HashSet<String> = (0..100).map(|_| generate_secure_token(32)).collect();
        assert_eq!(tokens.len(), 100);
    }
}
