// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 连接接收与工作池
//!
//! - [`WorkerPool`]：固定数量的执行槽位，一个连接从头到尾占用一个槽位。
//!   槽位用完后新提交的连接按先来后到排队，这就是服务器唯一的背压手段。
//! - [`Server`]：持有路由表与 404 处理器，运行接收循环，把每个连接提交到工作池。
//! - [`dispatch`]：单个连接上的处理流程：解码请求、查路由、调用处理器。
//!
//! 单个连接上的任何错误只会终止该连接。只有监听 Socket 本身出错才会让接收循环退出。

use std::{
    future::Future,
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use log::{debug, error, info, warn};
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufWriter},
    net::{TcpListener, TcpStream},
    sync::Semaphore,
    task::JoinHandle,
};

use crate::{
    exception::Exception,
    handlers::NotFoundHandler,
    param::{HttpRequestMethod, DEFAULT_POOL_SIZE},
    request::Request,
    router::{Handler, RouteTable},
};

/// 固定槽位的工作池
#[derive(Debug, Clone)]
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// 创建一个拥有 `size` 个槽位的工作池。`size` 为 0 时按 1 处理。
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            slots: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// 提交一个任务，调用方不会被阻塞。
    ///
    /// 任务先排队等待槽位，拿到后一直持有直到任务结束。
    pub fn submit<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let slots = Arc::clone(&self.slots);
        tokio::spawn(async move {
            let _permit = match slots.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    warn!("工作池已关闭，丢弃任务");
                    return;
                }
            };
            task.await;
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// 当前空闲的槽位数
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

/// HTTP 服务器：路由表、404 处理器和工作池的持有者
pub struct Server {
    routes: Arc<RouteTable>,
    not_found: Arc<dyn Handler>,
    pool: WorkerPool,
    next_id: AtomicU64,
}

impl Server {
    pub fn new(pool_size: usize) -> Self {
        Self {
            routes: Arc::new(RouteTable::new()),
            not_found: Arc::new(NotFoundHandler),
            pool: WorkerPool::new(pool_size),
            next_id: AtomicU64::new(0),
        }
    }

    /// 替换默认的 404 处理器
    pub fn with_not_found<H>(mut self, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.not_found = Arc::new(handler);
        self
    }

    /// 路由表句柄，可在服务运行期间继续注册
    pub fn routes(&self) -> Arc<RouteTable> {
        Arc::clone(&self.routes)
    }

    pub fn add_handler<H>(&self, method: HttpRequestMethod, path: &str, handler: H)
    where
        H: Handler + 'static,
    {
        self.routes.register(method, path, handler);
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// 绑定地址并运行接收循环
    pub async fn listen(&self, addr: SocketAddr) -> Result<(), Exception> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            error!("无法绑定地址：{}，错误：{}", addr, e);
            Exception::AcceptorFatal(e)
        })?;
        info!("地址{}绑定完成", addr);
        self.serve(listener).await
    }

    /// 在已绑定的监听器上运行接收循环。
    ///
    /// 每个连接被提交到工作池后立即接收下一个连接。
    /// 只有 `accept` 本身失败才会返回。
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Exception> {
        if let Ok(addr) = listener.local_addr() {
            info!("服务端开始在{}上接收连接，工作池槽位{}个", addr, self.pool.size());
        }
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("监听Socket失败，停止接收新连接：{}", e);
                    return Err(Exception::AcceptorFatal(e));
                }
            };
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            debug!("[ID{}]新的连接：{}", id, peer);

            let routes = Arc::clone(&self.routes);
            let not_found = Arc::clone(&self.not_found);
            self.pool.submit(async move {
                process(stream, id, routes, not_found).await;
            });
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

/// 单个连接的完整生命周期。函数返回时读写两半都被释放，连接随之关闭。
async fn process(stream: TcpStream, id: u64, routes: Arc<RouteTable>, not_found: Arc<dyn Handler>) {
    let start_time = Instant::now();
    let (input, output) = stream.into_split();
    let mut out = BufWriter::new(output);

    match dispatch(input, &mut out, &routes, not_found.as_ref()).await {
        Ok(()) => {
            if let Err(e) = out.shutdown().await {
                debug!("[ID{}]关闭输出流失败: {}", id, e);
            }
            debug!(
                "[ID{}]连接处理完毕，用时{}ms",
                id,
                start_time.elapsed().as_millis()
            );
        }
        Err(e) if e.is_framing() => warn!("[ID{}]请求分帧失败: {}", id, e),
        Err(e) => warn!("[ID{}]处理连接时出错: {}", id, e),
    }
}

/// 解码一个请求，查找路由并调用处理器；未命中时调用 `not_found`。
///
/// 核心不向 `out` 写入任何内容，解码失败时直接返回错误。
pub async fn dispatch<R, W>(
    input: R,
    out: &mut W,
    routes: &RouteTable,
    not_found: &dyn Handler,
) -> Result<(), Exception>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin,
{
    let request = Request::decode(input).await?;
    match routes.lookup(request.method(), request.path()) {
        Some(handler) => {
            info!("{} {} -> 已注册处理器", request.method(), request.path());
            handler.handle(&request, out).await?;
        }
        None => {
            info!("{} {} -> 404", request.method(), request.path());
            not_found.handle(&request, out).await?;
        }
    }
    Ok(())
}
