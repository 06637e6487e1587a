// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 解码器的性质测试：报文无论被拆成怎样的分段到达，解析结果都应一致。

use std::{
    collections::HashMap,
    io,
    pin::Pin,
    task::{Context, Poll},
};

use proptest::prelude::*;
use routeserve::{HttpRequestMethod, Request};
use tokio::{
    io::{AsyncRead, ReadBuf},
    runtime::Runtime,
};

/// 按给定的分段长度依次交出字节的读取器
struct Segmented {
    data: Vec<u8>,
    pos: usize,
    sizes: Vec<usize>,
    turn: usize,
}

impl Segmented {
    fn new(data: Vec<u8>, sizes: Vec<usize>) -> Self {
        Self {
            data,
            pos: 0,
            sizes,
            turn: 0,
        }
    }
}

impl AsyncRead for Segmented {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let size = if self.sizes.is_empty() {
            usize::MAX
        } else {
            self.sizes[self.turn % self.sizes.len()]
        };
        self.turn += 1;
        let n = size.min(buf.remaining()).min(self.data.len() - self.pos);
        let start = self.pos;
        buf.put_slice(&self.data[start..start + n]);
        self.pos += n;
        Poll::Ready(Ok(()))
    }
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn header_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[A-Za-z][A-Za-z-]{0,11}", "([a-z0-9][a-z0-9 ;=/]{0,24})?"), 0..12)
}

proptest! {
    #[test]
    fn prop_get_decodes_identically_across_segments(
        path in "/[a-z0-9/._-]{0,40}",
        headers in header_strategy(),
        sizes in prop::collection::vec(1usize..64, 1..8),
    ) {
        let mut raw = format!("GET {} HTTP/1.1\r\n", path);
        let mut expected = HashMap::new();
        for (name, value) in &headers {
            raw.push_str(&format!("{}: {}\r\n", name, value));
            expected.insert(name.clone(), value.clone());
        }
        raw.push_str("\r\n");

        let rt = runtime();
        let whole = rt.block_on(Request::decode(Segmented::new(raw.clone().into_bytes(), vec![]))).unwrap();
        let split = rt.block_on(Request::decode(Segmented::new(raw.into_bytes(), sizes))).unwrap();

        prop_assert_eq!(whole.method(), HttpRequestMethod::Get);
        prop_assert_eq!(split.method(), HttpRequestMethod::Get);
        prop_assert_eq!(whole.path(), path.as_str());
        prop_assert_eq!(split.path(), path.as_str());
        prop_assert_eq!(whole.headers(), &expected);
        prop_assert_eq!(split.headers(), &expected);
    }

    #[test]
    fn prop_post_body_is_exactly_declared_bytes(
        body in "[ -~\r\n]{0,600}",
        trailing in "[a-z]{0,20}",
        sizes in prop::collection::vec(1usize..256, 1..6),
    ) {
        let raw = format!(
            "POST /upload HTTP/1.1\r\nHost: x\r\nContent-Length: {}\r\n\r\n{}{}",
            body.len(),
            body,
            trailing
        );

        let rt = runtime();
        let request = rt.block_on(Request::decode(Segmented::new(raw.into_bytes(), sizes))).unwrap();
        prop_assert_eq!(request.body(), Some(body.as_str()));
        prop_assert!(request.post_params().is_none());
    }

    #[test]
    fn prop_form_values_accumulate_in_order(
        values in prop::collection::vec("[a-z0-9]{0,8}", 1..10),
    ) {
        let form: Vec<String> = values.iter().map(|v| format!("k={}", v)).collect();
        let form = form.join("&");
        let raw = format!(
            "POST /f HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
            form.len(),
            form
        );

        let rt = runtime();
        let request = rt.block_on(Request::decode(Segmented::new(raw.into_bytes(), vec![3]))).unwrap();
        prop_assert_eq!(request.post_param("k"), Some(values.as_slice()));
    }
}
