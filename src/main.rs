// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # routeserve 启动入口
//!
//! 初始化日志、加载配置、注册路由，然后在配置的端口上开始接收连接。
//! - `public/` 下的静态页面同时注册 GET 与 POST 两种方法
//! - `/classic.html` 由模板处理器渲染，页面中的 `{time}` 被替换为当前时间

use std::{process, sync::Arc};

use log::{error, info, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
};
use tokio::runtime::Builder;

use routeserve::{Config, Exception, Handler, HttpRequestMethod, Server, StaticFileHandler, TemplateHandler};

/// 可直接访问的静态页面
const VALID_PATHS: &[&str] = &[
    "/index.html",
    "/styles.css",
    "/app.js",
    "/forms.html",
    "/formspost.html",
];

fn main() {
    // 1. 初始化日志系统：优先使用外部 YAML 配置，读取失败时退回到控制台输出
    init_logging("config/log4rs.yaml");

    // 2. 环境配置加载：从 TOML 文件读取运行参数
    let config = match Config::from_toml("config/development.toml") {
        Ok(config) => {
            info!("配置文件已载入");
            config
        }
        Err(e) => {
            error!("{}，使用默认配置", e);
            Config::new()
        }
    };
    info!("www root: {}", config.www_root());

    // 3. 异步运行时：工作线程数来自配置
    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("无法创建异步运行时：{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(config)) {
        error!("服务端退出：{}", e);
        process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Exception> {
    let server = Server::new(config.pool_size());

    let static_files: Arc<dyn Handler> = Arc::new(StaticFileHandler::new(config.www_root()));
    let routes = server.routes();
    for path in VALID_PATHS {
        routes.register_shared(HttpRequestMethod::Get, path, Arc::clone(&static_files));
        routes.register_shared(HttpRequestMethod::Post, path, Arc::clone(&static_files));
    }
    server.add_handler(
        HttpRequestMethod::Get,
        "/classic.html",
        TemplateHandler::new(config.www_root()),
    );
    info!("已注册{}条路由", routes.len());

    let addr = config.socket_addr();
    info!("服务端将在{}上监听Socket连接", addr);
    server.listen(addr).await
}

fn init_logging(path: &str) {
    if let Err(e) = log4rs::init_file(path, Default::default()) {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}")))
            .build();
        let fallback = log4rs::Config::builder()
            .appender(Appender::builder().build("stdout", Box::new(stdout)))
            .build(Root::builder().appender("stdout").build(LevelFilter::Info));
        match fallback.map(log4rs::init_config) {
            Ok(Ok(_)) => error!("无法读取日志配置{}：{}，改用控制台输出", path, e),
            _ => eprintln!("无法初始化日志系统：{}", e),
        }
    }
}
