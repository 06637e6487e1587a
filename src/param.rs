// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块定义了 `routeserve` 遵循的 HTTP 协议相关常量和数据结构，包括：
//! - 分帧使用的分隔符与请求头读取上限。
//! - 常见的 HTTP 状态码及其原因短语（Reason Phrase）。
//! - 内置静态处理器使用的 MIME 类型映射表。
//! - HTTP 方法的强类型枚举。

use lazy_static::lazy_static;
use std::{collections::HashMap, fmt};

/// 服务器名称标识，用于 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = "routeserve";

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 请求行结束标记
pub const REQUEST_LINE_DELIMITER: &[u8] = b"\r\n";

/// 头部块结束标记
pub const HEADERS_DELIMITER: &[u8] = b"\r\n\r\n";

/// 请求行加头部块的读取上限（字节）。超过该长度的头部无法被解析。
pub const HEADER_LIMIT: usize = 4096;

/// `Content-Type` 中出现该标记时才对请求体做表单解码
pub const FORM_URLENCODED: &str = "x-www-form-urlencoded";

/// 工作池默认槽位数
pub const DEFAULT_POOL_SIZE: usize = 64;

lazy_static! {
    /// HTTP 状态码与其对应的标准原因短语映射表。
    ///
    /// 参考标准：[RFC 9110: HTTP Semantics](https://www.rfc-editor.org/rfc/rfc9110.html)。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        map.insert(200, "OK");
        map.insert(204, "No Content");
        map.insert(301, "Moved Permanently");
        map.insert(302, "Found");
        map.insert(304, "Not Modified");
        map.insert(400, "Bad Request");
        map.insert(403, "Forbidden");
        map.insert(404, "Not Found");
        map.insert(405, "Method Not Allowed");
        map.insert(413, "Content Too Large");
        map.insert(431, "Request Header Fields Too Large");
        map.insert(500, "Internal Server Error");
        map.insert(501, "Not Implemented");
        map.insert(503, "Service Unavailable");
        map
    };
}

lazy_static! {
    /// 文件后缀名到 MIME 类型（Media Type）的映射表。
    pub static ref MIME_TYPES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("css", "text/css;charset=utf-8");
        map.insert("csv", "text/csv");
        map.insert("gif", "image/gif");
        map.insert("htm", "text/html;charset=utf-8");
        map.insert("html", "text/html;charset=utf-8");
        map.insert("ico", "image/x-icon");
        map.insert("jpg", "image/jpeg");
        map.insert("jpeg", "image/jpeg");
        map.insert("js", "text/javascript;charset=utf-8");
        map.insert("json", "application/json");
        map.insert("mjs", "text/javascript");
        map.insert("pdf", "application/pdf");
        map.insert("png", "image/png");
        map.insert("svg", "image/svg+xml");
        map.insert("txt", "text/plain");
        map.insert("wasm", "application/wasm");
        map.insert("webp", "image/webp");
        map.insert("woff", "font/woff");
        map.insert("woff2", "font/woff2");
        map.insert("xml", "text/xml");
        map
    };
}

/// 兜底类型（无法识别后缀的二进制流）
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// 支持的 HTTP 请求方法。其它方法在分帧阶段即被拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpRequestMethod {
    /// 获取资源
    Get,
    /// 提交数据或执行操作
    Post,
}

impl HttpRequestMethod {
    /// 按请求行中的原始写法匹配方法名（区分大小写）。
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(HttpRequestMethod::Get),
            "POST" => Some(HttpRequestMethod::Post),
            _ => None,
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    /// 将枚举格式化为 HTTP 标准大写方法名
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Post => write!(f, "POST"),
        }
    }
}
