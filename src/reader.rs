// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 预读缓冲
//!
//! 头部块的长度事先未知，而 Socket 又没有按行读取的原语，所以解析时先把
//! 最多 `limit` 个字节读进一个可重复访问的窗口，在窗口内查找边界，
//! 之后再把尚未消费的那部分字节原样"回放"给后续读取者（例如请求体的读取）。
//!
//! 窗口内的字节只会被回放一次；窗口耗尽后读取直接落到底层流上。

use std::{
    io,
    ops::Range,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

use crate::scanner;

/// 带上限的预读窗口，包裹一个底层异步字节流。
#[derive(Debug)]
pub struct ReadAhead<R> {
    inner: R,
    buffer: Vec<u8>,
    /// 窗口中已填充的字节数
    filled: usize,
    /// 已被消费（不再回放）的字节数
    consumed: usize,
}

impl<R: AsyncRead + Unpin> ReadAhead<R> {
    /// 创建一个最多预读 `limit` 字节的窗口。
    pub fn new(inner: R, limit: usize) -> Self {
        Self {
            inner,
            buffer: vec![0; limit],
            filled: 0,
            consumed: 0,
        }
    }

    /// 在窗口的 `[start, filled)` 中查找 `delimiter`，找不到就继续从底层流读取，
    /// 直到找到、窗口写满或流结束。
    ///
    /// 返回分隔符起始位置。结果只取决于字节内容，与数据被拆成几次到达无关。
    pub async fn fill_until(&mut self, delimiter: &[u8], start: usize) -> io::Result<Option<usize>> {
        let mut scan_from = start;
        loop {
            if let Some(i) = scanner::find(&self.buffer, delimiter, scan_from, self.filled) {
                return Ok(Some(i));
            }
            if self.filled == self.buffer.len() {
                return Ok(None);
            }
            // 新到达的字节可能和上一轮末尾拼出分隔符
            scan_from = start.max((self.filled + 1).saturating_sub(delimiter.len()));
            let limit = self.buffer.len();
            let n = self.inner.read(&mut self.buffer[self.filled..limit]).await?;
            if n == 0 {
                return Ok(None);
            }
            self.filled += n;
        }
    }

    /// 重新访问窗口中的一段字节（倒回）。
    pub fn window(&self, range: Range<usize>) -> &[u8] {
        let end = range.end.min(self.filled);
        let start = range.start.min(end);
        &self.buffer[start..end]
    }

    /// 标记窗口中前 `position` 个字节已被消费，之后的字节仍会被回放。
    pub fn consume_to(&mut self, position: usize) {
        self.consumed = position.min(self.filled);
    }

    /// 窗口中已填充的字节数。
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// 窗口中尚待回放的字节数。
    pub fn pending(&self) -> usize {
        self.filled - self.consumed
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ReadAhead<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.consumed < this.filled {
            let n = buf.remaining().min(this.filled - this.consumed);
            buf.put_slice(&this.buffer[this.consumed..this.consumed + n]);
            this.consumed += n;
            return Poll::Ready(Ok(()));
        }
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}
