// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! HTTP 响应报文构建器。核心不使用它，供处理器拼装完整的响应。

use bytes::Bytes;
use chrono::prelude::*;
use log::error;
use tokio::io::{self, AsyncWrite, AsyncWriteExt};

use crate::param::*;

#[derive(Debug, Clone)]
pub struct Response {
    status_code: u16,
    information: String,
    content_type: Option<String>,
    date: DateTime<Utc>,
    server_name: String,
    content: Bytes,
}

impl Response {
    pub fn new() -> Self {
        Self {
            status_code: 200,
            information: "OK".to_string(),
            content_type: None,
            date: Utc::now(),
            server_name: SERVER_NAME.to_string(),
            content: Bytes::new(),
        }
    }

    /// 以给定状态码构建一个空响应
    pub fn from_status_code(code: u16) -> Self {
        let mut response = Self::new();
        response.set_code(code);
        response
    }

    pub fn response_404() -> Self {
        Self::from_status_code(404)
    }

    pub fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = match STATUS_CODES.get(&code) {
            Some(&info) => info.to_string(),
            None => {
                error!("未登记的状态码：{}，原因短语留空", code);
                String::new()
            }
        };
        self
    }

    pub fn set_content(&mut self, content: impl Into<Bytes>, content_type: &str) -> &mut Self {
        self.content = content.into();
        self.content_type = Some(content_type.to_string());
        self
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let mut header = format!(
            "HTTP/1.1 {} {}{}",
            self.status_code, self.information, CRLF
        );
        if let Some(t) = &self.content_type {
            header.push_str(&format!("Content-Type: {}{}", t, CRLF));
        }
        header.push_str(&format!("Content-Length: {}{}", self.content.len(), CRLF));
        header.push_str(&format!("Date: {}{}", format_date(&self.date), CRLF));
        header.push_str(&format!("Server: {}{}", self.server_name, CRLF));
        header.push_str(&["Connection: close", CRLF, CRLF].concat());

        [header.as_bytes(), &self.content[..]].concat()
    }

    /// 写出完整报文并刷新输出端
    pub async fn write_to<W>(&self, out: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        out.write_all(&self.as_bytes()).await?;
        out.flush().await
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
