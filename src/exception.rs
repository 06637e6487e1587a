// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了服务器在连接处理生命周期中可能出现的各类异常情况。
//!
//! ## 分类
//! - **报文分帧错误**：请求行、方法、路径、头部块或头部行不合法。只终止当前连接，核心不写任何响应。
//! - **请求体截断**：`Content-Length` 声明的字节数超过了流中实际可读的字节数。
//! - **编码错误**：查询串或表单中出现非法的百分号转义。
//! - **监听失败**：监听 Socket 本身出错，这是唯一会越过单个连接边界的错误。

use std::{fmt, io};

/// 服务器处理连接过程中发生的异常类型。
#[derive(Debug)]
pub enum Exception {
    /// 在读取上限内找不到请求行结尾的 CRLF。
    NoRequestLine,
    /// 请求行按单个空格拆分后不是恰好三段。
    MalformedRequestLine,
    /// 请求方法不是 GET 或 POST。
    UnsupportedMethod(String),
    /// 请求目标不以 `/` 开头。
    InvalidPath(String),
    /// 在读取上限内找不到头部块结束标记（CRLFCRLF）。
    HeadersNotFound,
    /// 头部行中没有冒号。
    MalformedHeader(String),
    /// `Content-Length` 不是非负整数。
    InvalidContentLength(String),
    /// 流在读满 `Content-Length` 字节之前结束。
    TruncatedBody { expected: usize, received: usize },
    /// 查询串或表单中的百分号转义不合法。
    MalformedEncoding(String),
    /// 监听 Socket 失败，接收循环随之退出。
    AcceptorFatal(io::Error),
    /// 连接读写或处理器内部的 I/O 错误。
    Io(io::Error),
    /// 配置文件无法读取或内容非法。
    Config(String),
}

use Exception::*;

impl Exception {
    /// 是否属于报文分帧错误。
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            NoRequestLine
                | MalformedRequestLine
                | UnsupportedMethod(_)
                | InvalidPath(_)
                | HeadersNotFound
                | MalformedHeader(_)
                | InvalidContentLength(_)
        )
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoRequestLine => write!(f, "No request line"),
            MalformedRequestLine => write!(f, "Malformed request line"),
            UnsupportedMethod(m) => write!(f, "Unsupported method in request ({})", m),
            InvalidPath(p) => write!(f, "Invalid path in request ({})", p),
            HeadersNotFound => write!(f, "Headers not found in request"),
            MalformedHeader(line) => write!(f, "Malformed header line ({})", line),
            InvalidContentLength(v) => write!(f, "Invalid Content-Length ({})", v),
            TruncatedBody { expected, received } => write!(
                f,
                "Body truncated: expected {} bytes, received {}",
                expected, received
            ),
            MalformedEncoding(s) => write!(f, "Malformed percent-encoding ({})", s),
            AcceptorFatal(e) => write!(f, "Listening socket failed: {}", e),
            Io(e) => write!(f, "I/O error: {}", e),
            Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Exception {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AcceptorFatal(e) | Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Exception {
    fn from(e: io::Error) -> Self {
        Io(e)
    }
}
