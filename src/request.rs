// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 该模块负责把 TCP 流中的原始字节解析为强类型的 `Request` 结构体。它涵盖了：
//! 1. 请求行（Request-Line）的分帧与校验（方法、路径、版本三段）。
//! 2. 头部块的定位与逐行拆分。
//! 3. 基于 `Content-Length` 的请求体读取（仅非 GET 请求）。
//! 4. 查询串与 URL 编码表单的解码。
//!
//! 请求行加头部块最多读取 [`HEADER_LIMIT`] 字节，超出上限的请求一律无法解析。

use std::{collections::HashMap, fmt};

use log::debug;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    sync::Mutex,
};

use crate::{
    exception::Exception,
    form::{decode_form, decode_query},
    param::*,
    reader::ReadAhead,
};

/// 请求保留的输入流：预读窗口加上 Socket 的读半部。
pub type InputStream = ReadAhead<Box<dyn AsyncRead + Send + Unpin>>;

/// 表示一个完整解析后的 HTTP 请求。
///
/// 每个连接只构建一次，构建后不再修改。分帧失败时不会产生任何部分构建的 `Request`。
pub struct Request {
    /// HTTP 请求方法（只可能是 GET 或 POST）
    method: HttpRequestMethod,
    /// 去掉查询部分后的请求路径，总是以 `/` 开头且不含 `?`
    path: String,
    /// 请求头，重名时后出现的覆盖先出现的
    headers: HashMap<String, String>,
    /// 查询参数，每个键一个值
    query_params: HashMap<String, String>,
    /// 表单参数，仅在 POST 且 `Content-Type` 为 URL 编码表单时存在
    post_params: Option<HashMap<String, Vec<String>>>,
    /// 请求体文本，仅在非 GET 且成功读取 `Content-Length` 字节时存在
    body: Option<String>,
    /// 输入流。只保证声明长度以内的前缀已被消费
    input: Mutex<InputStream>,
}

impl Request {
    /// 从字节流中解码出一个 `Request`。
    ///
    /// # 逻辑步骤
    /// 1. 预读：把最多 4096 字节读入可倒回的窗口，直到找到需要的分隔符。
    /// 2. 请求行：按单个空格拆成三段，校验方法与路径。
    /// 3. 头部：倒回窗口，精确取出头部字节范围并逐行拆分。
    /// 4. 请求体：非 GET 请求按 `Content-Length` 读满指定字节数。
    /// 5. 参数：解码查询串，以及 URL 编码表单形式的请求体。
    ///
    /// # 错误处理
    /// 分帧失败返回相应的 `Exception`；请求体不足返回 `TruncatedBody`；
    /// 非法的百分号转义返回 `MalformedEncoding`。
    pub async fn decode<R>(stream: R) -> Result<Self, Exception>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let mut reader: InputStream = ReadAhead::new(Box::new(stream), HEADER_LIMIT);

        // 1. 请求行
        let request_line_end = reader
            .fill_until(REQUEST_LINE_DELIMITER, 0)
            .await?
            .ok_or(Exception::NoRequestLine)?;
        let request_line = String::from_utf8_lossy(reader.window(0..request_line_end)).into_owned();
        let parts: Vec<&str> = request_line.split(' ').collect();
        if parts.len() != 3 {
            return Err(Exception::MalformedRequestLine);
        }

        let method = HttpRequestMethod::parse(parts[0])
            .ok_or_else(|| Exception::UnsupportedMethod(parts[0].to_string()))?;

        let target = parts[1];
        if !target.starts_with('/') {
            return Err(Exception::InvalidPath(target.to_string()));
        }

        // 2. 头部块。从请求行的 CRLF 开始查找，这样空头部块也能匹配
        let headers_start = request_line_end + REQUEST_LINE_DELIMITER.len();
        let headers_end = reader
            .fill_until(HEADERS_DELIMITER, request_line_end)
            .await?
            .ok_or(Exception::HeadersNotFound)?;
        let headers = if headers_end > request_line_end {
            parse_headers(reader.window(headers_start..headers_end))?
        } else {
            HashMap::new()
        };
        reader.consume_to(headers_end + HEADERS_DELIMITER.len());

        // 3. 请求体，GET 请求即使带了 Content-Length 也不读取
        let mut body = None;
        if method != HttpRequestMethod::Get {
            if let Some(value) = find_header(&headers, "Content-Length") {
                let length: usize = value
                    .trim()
                    .parse()
                    .map_err(|_| Exception::InvalidContentLength(value.to_string()))?;
                body = Some(read_body(&mut reader, length).await?);
            }
        }

        // 4. 参数
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query.split('#').next().unwrap_or("")),
            None => (target, ""),
        };
        let query_params = decode_query(query)?;

        let post_params = match (&body, find_header(&headers, "Content-Type")) {
            (Some(body), Some(content_type)) if content_type.contains(FORM_URLENCODED) => {
                Some(decode_form(body)?)
            }
            _ => None,
        };

        debug!(
            "请求解码完成：{} {}，头部{}个，请求体{}字节",
            method,
            path,
            headers.len(),
            body.as_ref().map_or(0, |b| b.len())
        );

        Ok(Self {
            method,
            path: path.to_string(),
            headers,
            query_params,
            post_params,
            body,
            input: Mutex::new(reader),
        })
    }
}

/// 拆分头部块。每行在第一个冒号处分为名和值，值前面的一个空格被跳过。
///
/// 没有冒号的行会使整个请求失败。
fn parse_headers(bytes: &[u8]) -> Result<HashMap<String, String>, Exception> {
    let text = String::from_utf8_lossy(bytes);
    let mut headers = HashMap::new();
    for line in text.split(CRLF) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Exception::MalformedHeader(line.to_string()))?;
        let value = value.strip_prefix(' ').unwrap_or(value);
        headers.insert(name.to_string(), value.to_string());
    }
    Ok(headers)
}

/// 先按原样查找，再忽略大小写查找。
fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .or_else(|| {
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
        .map(String::as_str)
}

/// 读满 `length` 字节：先回放窗口中剩余的字节，再从底层流读取，短读会自动重试。
async fn read_body(reader: &mut InputStream, length: usize) -> Result<String, Exception> {
    let mut bytes = Vec::with_capacity(length.min(HEADER_LIMIT));
    reader.take(length as u64).read_to_end(&mut bytes).await?;
    if bytes.len() < length {
        return Err(Exception::TruncatedBody {
            expected: length,
            received: bytes.len(),
        });
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// --- Getter 访问器实现 ---

impl Request {
    /// 获取请求方法
    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    /// 获取请求路径（不含查询参数）
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 获取全部请求头
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// 获取单个请求头，名称不区分大小写
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// 获取全部查询参数
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// 获取全部表单参数
    pub fn post_params(&self) -> Option<&HashMap<String, Vec<String>>> {
        self.post_params.as_ref()
    }

    pub fn post_param(&self, name: &str) -> Option<&[String]> {
        self.post_params
            .as_ref()
            .and_then(|params| params.get(name))
            .map(Vec::as_slice)
    }

    /// 获取请求体文本
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// 获取连接的输入流，可继续读取请求体之后的字节
    pub fn input(&self) -> &Mutex<InputStream> {
        &self.input
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &self.headers)
            .field("query_params", &self.query_params)
            .field("post_params", &self.post_params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}
