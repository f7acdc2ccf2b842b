//! Content-shape statistics attached to every record's metadata.

use std::sync::LazyLock;

use mnemo_core::ContentStats;
use regex::Regex;

static TURN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(Human|Assistant|User|AI|H|A):").unwrap());

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"https?://[^\s<>"')\]]+"#).unwrap());

static FILE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:~|\.{1,2})?(?:/[\w.@-]+){2,}").unwrap());

/// Count speaker turns, fenced code blocks, URLs, and file paths.
pub fn scan_content(content: &str) -> ContentStats {
    ContentStats {
        turn_count: TURN_RE.find_iter(content).count() as u32,
        code_block_count: (content.matches("```").count() / 2) as u32,
        url_count: URL_RE.find_iter(content).count() as u32,
        file_path_count: FILE_PATH_RE
            .find_iter(content)
            .filter(|path| !path.as_str().starts_with("//"))
            .count() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_counts_turns() {
        let content = "Human: one\nAssistant: two\nHuman: three\n";
        assert_eq!(scan_content(content).turn_count, 3);
    }

    #[test]
    fn test_scan_counts_code_blocks() {
        let content = "intro\n```rust\nfn main() {}\n```\ntext\n```\nplain\n```\n";
        assert_eq!(scan_content(content).code_block_count, 2);
    }

    #[test]
    fn test_unclosed_fence_not_counted() {
        let content = "```rust\nfn main() {}\n";
        assert_eq!(scan_content(content).code_block_count, 0);
    }

    #[test]
    fn test_scan_counts_urls() {
        let content = "see https://example.com/docs and http://other.example.org?q=1 end";
        assert_eq!(scan_content(content).url_count, 2);
    }

    #[test]
    fn test_scan_counts_file_paths() {
        let content = "edit src/memory/store.rs and /etc/hosts then ./crates/core/lib.rs";
        let stats = scan_content(content);
        assert!(stats.file_path_count >= 2);
    }

    #[test]
    fn test_empty_content() {
        let stats = scan_content("");
        assert_eq!(stats.turn_count, 0);
        assert_eq!(stats.code_block_count, 0);
        assert_eq!(stats.url_count, 0);
        assert_eq!(stats.file_path_count, 0);
    }
}
