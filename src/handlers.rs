// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 内置处理器
//!
//! - [`NotFoundHandler`]：路由未命中时使用，返回完整的 404 响应。
//! - [`StaticFileHandler`]：把请求路径映射到站点根目录下的文件。
//! - [`TemplateHandler`]：读取文本文件并把占位符替换为当前时间。

use std::{
    ffi::OsStr,
    io,
    path::{Component, Path, PathBuf},
};

use chrono::Local;
use futures_util::{future::BoxFuture, FutureExt};
use log::{debug, warn};

use crate::{
    param::{DEFAULT_MIME, MIME_TYPES},
    request::Request,
    response::Response,
    router::{Handler, Output},
};

/// 默认的 404 处理器
#[derive(Debug, Default, Clone, Copy)]
pub struct NotFoundHandler;

impl Handler for NotFoundHandler {
    fn handle<'a>(&'a self, request: &'a Request, out: Output<'a>) -> BoxFuture<'a, io::Result<()>> {
        async move {
            debug!("未找到路由：{} {}", request.method(), request.path());
            Response::response_404().write_to(out).await
        }
        .boxed()
    }
}

/// 静态文件处理器
#[derive(Debug, Clone)]
pub struct StaticFileHandler {
    root: PathBuf,
}

impl StaticFileHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Handler for StaticFileHandler {
    fn handle<'a>(&'a self, request: &'a Request, out: Output<'a>) -> BoxFuture<'a, io::Result<()>> {
        async move {
            let file_path = match resolve(&self.root, request.path()) {
                Some(p) => p,
                None => {
                    warn!("请求的路径：{} 包含非法片段，返回404", request.path());
                    return Response::response_404().write_to(out).await;
                }
            };
            let content = match tokio::fs::read(&file_path).await {
                Ok(c) => c,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("请求的文件：{} 不存在，返回404", file_path.display());
                    return Response::response_404().write_to(out).await;
                }
                Err(e) => return Err(e),
            };
            let mut response = Response::new();
            response.set_content(content, get_mime(&file_path));
            response.write_to(out).await
        }
        .boxed()
    }
}

/// 模板处理器：把文件中的占位符替换为当前本地时间
#[derive(Debug, Clone)]
pub struct TemplateHandler {
    root: PathBuf,
    placeholder: String,
}

impl TemplateHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            placeholder: "{time}".to_string(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    fn render(&self, template: &str) -> String {
        let now = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string();
        template.replace(&self.placeholder, &now)
    }
}

impl Handler for TemplateHandler {
    fn handle<'a>(&'a self, request: &'a Request, out: Output<'a>) -> BoxFuture<'a, io::Result<()>> {
        async move {
            let file_path = match resolve(&self.root, request.path()) {
                Some(p) => p,
                None => return Response::response_404().write_to(out).await,
            };
            let template = match tokio::fs::read_to_string(&file_path).await {
                Ok(t) => t,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("模板文件：{} 不存在，返回404", file_path.display());
                    return Response::response_404().write_to(out).await;
                }
                Err(e) => return Err(e),
            };
            let mut response = Response::new();
            response.set_content(self.render(&template), get_mime(&file_path));
            response.write_to(out).await
        }
        .boxed()
    }
}

/// 把请求路径拼接到根目录下。含 `..` 等非普通片段时返回 `None`。
fn resolve(root: &Path, path: &str) -> Option<PathBuf> {
    let relative = Path::new(path.trim_start_matches('/'));
    if relative.as_os_str().is_empty() {
        return None;
    }
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(relative))
}

fn get_mime(path: &Path) -> &'static str {
    path.extension()
        .and_then(OsStr::to_str)
        .and_then(|ext| MIME_TYPES.get(ext).copied())
        .unwrap_or(DEFAULT_MIME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    async fn run(handler: &dyn Handler, raw: &'static [u8]) -> String {
        let request = Request::decode(raw).await.unwrap();
        let mut out = Vec::new();
        handler.handle(&request, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>hi</h1>").unwrap();
        fs::write(dir.path().join("classic.html"), "now: {time}").unwrap();
        fs::write(dir.path().join("blob"), [0u8, 1, 2]).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_not_found_handler() {
        let text = run(&NotFoundHandler, b"GET /nope HTTP/1.1\r\n\r\n").await;
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("Content-Length: 0\r\n"));
    }

    #[tokio::test]
    async fn test_static_file_served_with_mime() {
        let dir = site();
        let handler = StaticFileHandler::new(dir.path());
        let text = run(&handler, b"GET /index.html HTTP/1.1\r\n\r\n").await;
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/html;charset=utf-8\r\n"));
        assert!(text.contains("Content-Length: 11\r\n"));
        assert!(text.ends_with("<h1>hi</h1>"));
    }

    #[tokio::test]
    async fn test_static_file_unknown_extension() {
        let dir = site();
        let handler = StaticFileHandler::new(dir.path());
        let text = run(&handler, b"GET /blob HTTP/1.1\r\n\r\n").await;
        assert!(text.contains("Content-Type: application/octet-stream\r\n"));
    }

    #[tokio::test]
    async fn test_static_file_missing() {
        let dir = site();
        let handler = StaticFileHandler::new(dir.path());
        let text = run(&handler, b"GET /gone.html HTTP/1.1\r\n\r\n").await;
        assert!(text.starts_with("HTTP/1.1 404 Not Found"));
    }

    #[tokio::test]
    async fn test_static_file_rejects_traversal() {
        let dir = site();
        let handler = StaticFileHandler::new(dir.path().join("sub"));
        let text = run(&handler, b"GET /../index.html HTTP/1.1\r\n\r\n").await;
        assert!(text.starts_with("HTTP/1.1 404 Not Found"));
    }

    #[tokio::test]
    async fn test_template_replaces_placeholder() {
        let dir = site();
        let handler = TemplateHandler::new(dir.path());
        let text = run(&handler, b"GET /classic.html HTTP/1.1\r\n\r\n").await;
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(!text.contains("{time}"));
        assert!(text.contains("now: 20"));
    }

    #[test]
    fn test_custom_placeholder() {
        let handler = TemplateHandler::new(".").with_placeholder("$NOW");
        let rendered = handler.render("a $NOW b {time}");
        assert!(!rendered.contains("$NOW"));
        assert!(rendered.ends_with(" b {time}"));
    }

    #[test]
    fn test_resolve() {
        let root = Path::new("/srv");
        assert_eq!(resolve(root, "/a/b.css"), Some(PathBuf::from("/srv/a/b.css")));
        assert_eq!(resolve(root, "/"), None);
        assert_eq!(resolve(root, "/a/../../etc/passwd"), None);
    }

    #[test]
    fn test_get_mime() {
        assert_eq!(get_mime(Path::new("a.css")), "text/css;charset=utf-8");
        assert_eq!(get_mime(Path::new("a.png")), "image/png");
        assert_eq!(get_mime(Path::new("a.unknown")), DEFAULT_MIME);
        assert_eq!(get_mime(Path::new("noext")), DEFAULT_MIME);
    }
}
