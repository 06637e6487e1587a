// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 字节序列查找。所有分帧边界（CRLF、CRLFCRLF）都通过这里定位。

/// 在 `buffer[start..end)` 范围内查找 `target` 第一次出现的位置。
///
/// 匹配必须完整落在范围内。`target` 为空、`start > end` 或 `end` 越界时返回 `None`。
pub fn find(buffer: &[u8], target: &[u8], start: usize, end: usize) -> Option<usize> {
    if target.is_empty() || start > end || end > buffer.len() {
        return None;
    }
    buffer[start..end]
        .windows(target.len())
        .position(|window| window == target)
        .map(|i| i + start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_crlf() {
        let buf = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";
        assert_eq!(find(buf, b"\r\n", 0, buf.len()), Some(14));
        assert_eq!(find(buf, b"\r\n\r\n", 14, buf.len()), Some(23));
    }

    #[test]
    fn test_find_respects_start() {
        let buf = b"ab\r\ncd\r\n";
        assert_eq!(find(buf, b"\r\n", 3, buf.len()), Some(6));
    }

    #[test]
    fn test_match_must_fit_in_range() {
        let buf = b"abc\r\n";
        // 目标跨越了 end 边界
        assert_eq!(find(buf, b"\r\n", 0, 4), None);
        assert_eq!(find(buf, b"\r\n", 0, 5), Some(3));
    }

    #[test]
    fn test_degenerate_inputs() {
        let buf = b"abc";
        assert_eq!(find(buf, b"", 0, 3), None);
        assert_eq!(find(buf, b"a", 2, 1), None);
        assert_eq!(find(buf, b"a", 0, 10), None);
        assert_eq!(find(buf, b"abcd", 0, 3), None);
    }
}
