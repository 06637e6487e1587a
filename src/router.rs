// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由表
//!
//! 按 (方法, 路径) 精确匹配处理器。路径只做字符串全等比较，
//! 不支持通配符，也不对结尾的 `/` 做归一化。
//!
//! 路由表在启动后仍可能被注册，同时被多个工作槽并发查找，
//! 因此底层使用 `DashMap` 并发哈希表，处理器以 `Arc` 共享。

use std::{io, sync::Arc};

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use tokio::io::AsyncWrite;

use crate::{param::HttpRequestMethod, request::Request};

/// 交给处理器的输出端。核心自身不向其中写入任何内容。
pub type Output<'a> = &'a mut (dyn AsyncWrite + Send + Unpin);

/// 请求处理器：消费一个 `Request` 和一个输出端，可能以 I/O 错误失败。
///
/// 404 处理器、静态文件处理器和模板处理器都是它的实现。
pub trait Handler: Send + Sync {
    fn handle<'a>(&'a self, request: &'a Request, out: Output<'a>) -> BoxFuture<'a, io::Result<()>>;
}

/// 线程安全的路由表。
#[derive(Default)]
pub struct RouteTable {
    get: DashMap<String, Arc<dyn Handler>>,
    post: DashMap<String, Arc<dyn Handler>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn routes(&self, method: HttpRequestMethod) -> &DashMap<String, Arc<dyn Handler>> {
        match method {
            HttpRequestMethod::Get => &self.get,
            HttpRequestMethod::Post => &self.post,
        }
    }

    /// 注册处理器。同一 (方法, 路径) 再次注册时覆盖旧的处理器。
    pub fn register<H>(&self, method: HttpRequestMethod, path: &str, handler: H)
    where
        H: Handler + 'static,
    {
        self.register_shared(method, path, Arc::new(handler));
    }

    /// 注册一个已被共享的处理器，多条路由可以指向同一个实例。
    pub fn register_shared(&self, method: HttpRequestMethod, path: &str, handler: Arc<dyn Handler>) {
        self.routes(method).insert(path.to_string(), handler);
    }

    /// 查找处理器，未命中返回 `None`。
    pub fn lookup(&self, method: HttpRequestMethod, path: &str) -> Option<Arc<dyn Handler>> {
        self.routes(method)
            .get(path)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// 已注册的路由总数
    pub fn len(&self) -> usize {
        self.get.len() + self.post.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use std::thread;
    use tokio::io::AsyncWriteExt;

    /// 把固定标记写入输出端的处理器，用于区分命中的是哪个实例
    struct Tag(&'static str);

    impl Handler for Tag {
        fn handle<'a>(&'a self, _request: &'a Request, out: Output<'a>) -> BoxFuture<'a, io::Result<()>> {
            async move { out.write_all(self.0.as_bytes()).await }.boxed()
        }
    }

    async fn run(handler: &dyn Handler) -> String {
        let request = Request::decode(&b"GET / HTTP/1.1\r\n\r\n"[..]).await.unwrap();
        let mut out = Vec::new();
        handler.handle(&request, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let table = RouteTable::new();
        assert!(table.is_empty());
        table.register(HttpRequestMethod::Get, "/index.html", Tag("index"));

        let handler = table.lookup(HttpRequestMethod::Get, "/index.html").unwrap();
        assert_eq!(run(handler.as_ref()).await, "index");
        assert_eq!(table.len(), 1);
    }

    /// 方法不同或路径不完全相同都视为未命中
    #[test]
    fn test_exact_match_only() {
        let table = RouteTable::new();
        table.register(HttpRequestMethod::Get, "/a", Tag("a"));

        assert!(table.lookup(HttpRequestMethod::Post, "/a").is_none());
        assert!(table.lookup(HttpRequestMethod::Get, "/a/").is_none());
        assert!(table.lookup(HttpRequestMethod::Get, "/A").is_none());
        assert!(table.lookup(HttpRequestMethod::Get, "/").is_none());
    }

    #[tokio::test]
    async fn test_reregister_overwrites() {
        let table = RouteTable::new();
        table.register(HttpRequestMethod::Post, "/x", Tag("first"));
        table.register(HttpRequestMethod::Post, "/x", Tag("second"));

        assert_eq!(table.len(), 1);
        let handler = table.lookup(HttpRequestMethod::Post, "/x").unwrap();
        assert_eq!(run(handler.as_ref()).await, "second");
    }

    #[test]
    fn test_shared_handler_across_routes() {
        let table = RouteTable::new();
        let shared: Arc<dyn Handler> = Arc::new(Tag("shared"));
        table.register_shared(HttpRequestMethod::Get, "/a", Arc::clone(&shared));
        table.register_shared(HttpRequestMethod::Post, "/a", Arc::clone(&shared));

        let get = table.lookup(HttpRequestMethod::Get, "/a").unwrap();
        let post = table.lookup(HttpRequestMethod::Post, "/a").unwrap();
        assert!(Arc::ptr_eq(&get, &post));
    }

    /// 多线程并发注册与查找，不应丢失任何路由
    #[test]
    fn test_concurrent_register_and_lookup() {
        let table = Arc::new(RouteTable::new());
        let threads = 8;
        let per_thread = 200;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let table = Arc::clone(&table);
                thread::spawn(move || {
                    for i in 0..per_thread {
                        let path = format!("/t{}/{}", t, i);
                        table.register(HttpRequestMethod::Get, &path, Tag("x"));
                        assert!(table.lookup(HttpRequestMethod::Get, &path).is_some());
                        // 顺带查找其它线程的路由，结果要么命中要么未命中
                        let _ = table.lookup(HttpRequestMethod::Get, &format!("/t{}/{}", (t + 1) % threads, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(table.len(), threads * per_thread);
        for t in 0..threads {
            for i in 0..per_thread {
                assert!(table
                    .lookup(HttpRequestMethod::Get, &format!("/t{}/{}", t, i))
                    .is_some());
            }
        }
    }
}
