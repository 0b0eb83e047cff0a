#[cfg(test)]
mod tests {
    use serial_test::serial;

    use crate::cache::token::Token;
    use crate::cache::token_cache::{read_bounded, TokenCache};
    use crate::helpers::time::now_millis;
    use crate::tests::common::{fallback_file, request, write_fallback};
    use crate::utils::constants::MAX_DELAY_MS;

    #[tokio::test]
    async fn set_get_remove() {
        let cache = TokenCache::new();
        let token = Token::new("value".into(), now_millis() + 1000);

        assert!(cache.get("key").await.is_none());
        cache.set("key", token.clone()).await;
        assert_eq!(cache.get("key").await, Some(token));

        cache.remove("key").await;
        assert!(cache.get("key").await.is_none());
    }

    #[tokio::test]
    async fn empty_key_is_ignored() {
        let cache = TokenCache::new();
        cache.set("", Token::new("value".into(), now_millis() + 1000)).await;
        assert!(cache.get("").await.is_none());
    }

    #[tokio::test]
    async fn expired_tokens_stay_until_removed() {
        let cache = TokenCache::new();
        cache.set("key", Token::new("old".into(), now_millis() - 1)).await;

        let token = cache.get("key").await.unwrap();
        assert!(token.is_expired());
        assert_eq!(token.auth_token(), "old");
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let cache = TokenCache::new();
        let clone = cache.clone();
        clone.set("key", Token::new("shared".into(), now_millis() + 1000)).await;
        assert_eq!(cache.get("key").await.unwrap().auth_token(), "shared");
    }

    #[tokio::test]
    async fn fallback_reads_single_line() {
        let dir = tempfile::tempdir().unwrap();
        write_fallback(dir.path(), b"escrowed-password\n");

        let before = now_millis();
        let token = TokenCache::with_base_dir(dir.path()).fallback(&request()).await.unwrap();

        assert_eq!(token.auth_token(), "escrowed-password");
        assert!(token.expires_at_millis() >= before + MAX_DELAY_MS);
        assert!(token.expires_at_millis() <= now_millis() + MAX_DELAY_MS);
    }

    #[tokio::test]
    async fn fallback_without_trailing_newline_or_with_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::with_base_dir(dir.path());

        write_fallback(dir.path(), b"no-newline");
        assert_eq!(cache.fallback(&request()).await.unwrap().auth_token(), "no-newline");

        write_fallback(dir.path(), b"windows\r\n");
        assert_eq!(cache.fallback(&request()).await.unwrap().auth_token(), "windows");
    }

    #[tokio::test]
    async fn fallback_rejects_two_lines() {
        let dir = tempfile::tempdir().unwrap();
        write_fallback(dir.path(), b"first\nsecond\n");
        assert!(TokenCache::with_base_dir(dir.path()).fallback(&request()).await.is_none());

        write_fallback(dir.path(), b"first\n\n");
        assert!(TokenCache::with_base_dir(dir.path()).fallback(&request()).await.is_none());
    }

    #[tokio::test]
    async fn fallback_size_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::with_base_dir(dir.path());

        write_fallback(dir.path(), &[b'x'; 201]);
        assert!(cache.fallback(&request()).await.is_none());

        write_fallback(dir.path(), &[b'x'; 200]);
        assert_eq!(cache.fallback(&request()).await.unwrap().auth_token().len(), 200);
    }

    #[tokio::test]
    async fn large_fallback_is_read_only_up_to_the_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::with_base_dir(dir.path());
        let big = vec![b'x'; 1 << 20];
        write_fallback(dir.path(), &big);

        assert_eq!(read_bounded(&fallback_file(dir.path()), 200).await.unwrap().len(), 201);
        assert!(cache.fallback(&request()).await.is_none());
    }

    #[tokio::test]
    async fn fallback_missing_empty_or_binary_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::with_base_dir(dir.path());

        assert!(cache.fallback(&request()).await.is_none());

        write_fallback(dir.path(), b"");
        assert!(cache.fallback(&request()).await.is_none());

        write_fallback(dir.path(), &[0xff, 0xfe, 0x00]);
        assert!(cache.fallback(&request()).await.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn fallback_defaults_to_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_fallback(dir.path(), b"from-cwd");

        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let token = TokenCache::new().fallback(&request()).await;
        std::env::set_current_dir(previous).unwrap();

        assert_eq!(token.unwrap().auth_token(), "from-cwd");
    }
}
