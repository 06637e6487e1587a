// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # URL 编码解码模块
//!
//! 处理 `application/x-www-form-urlencoded` 约定的键值数据：
//! - `&` 分隔键值对，`=` 分隔键和值，缺少 `=` 时值为空串
//! - `%XX` 百分号转义，`+` 解码为空格
//! - 任何一个非法转义都会使整个解码失败
//!
//! 查询串按单值解码（后出现的覆盖先出现的），表单请求体按多值解码（按出现顺序累积）。

use std::collections::HashMap;

use crate::exception::Exception;

/// 解码请求体中的表单数据。重复的键按首次出现的顺序累积所有值。
pub fn decode_form(input: &str) -> Result<HashMap<String, Vec<String>>, Exception> {
    let mut params: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in pairs(input) {
        let key = percent_decode(key)?;
        let value = percent_decode(value)?;
        params.entry(key).or_default().push(value);
    }
    Ok(params)
}

/// 解码请求目标中的查询串。每个键只保留最后一个值。
pub fn decode_query(input: &str) -> Result<HashMap<String, String>, Exception> {
    let mut params = HashMap::new();
    for (key, value) in pairs(input) {
        params.insert(percent_decode(key)?, percent_decode(value)?);
    }
    Ok(params)
}

fn pairs(input: &str) -> impl Iterator<Item = (&str, &str)> {
    input
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.split_once('=').unwrap_or((segment, "")))
}

/// 百分号解码，同时把 `+` 还原为空格。
///
/// 解码后不是合法 UTF-8 的字节会被替换为 U+FFFD。
pub fn percent_decode(s: &str) -> Result<String, Exception> {
    if !s.contains('%') && !s.contains('+') {
        return Ok(s.to_string());
    }

    let bytes = s.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = bytes.get(i + 1).copied().and_then(hex_digit);
                let lo = bytes.get(i + 2).copied().and_then(hex_digit);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => result.push(hi << 4 | lo),
                    _ => return Err(Exception::MalformedEncoding(s.to_string())),
                }
                i += 3;
            }
            b'+' => {
                result.push(b' ');
                i += 1;
            }
            b => {
                result.push(b);
                i += 1;
            }
        }
    }
    Ok(String::from_utf8_lossy(&result).into_owned())
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
