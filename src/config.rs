// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::warn;
use std::fs;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::exception::Exception;
use crate::param::DEFAULT_POOL_SIZE;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_www_root")]
    www_root: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_pool_size")]
    pool_size: usize,
    #[serde(default)]
    worker_threads: usize,
    #[serde(default = "default_local")]
    local: bool,
}

fn default_www_root() -> String {
    "public".to_string()
}

fn default_port() -> u16 {
    9999
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

fn default_local() -> bool {
    true
}

impl Config {
    pub fn new() -> Self {
        Self {
            www_root: default_www_root(),
            port: default_port(),
            pool_size: default_pool_size(),
            worker_threads: num_cpus::get(),
            local: default_local(),
        }
    }

    pub fn from_toml(filename: &str) -> Result<Self, Exception> {
        let str_val = fs::read_to_string(filename)
            .map_err(|e| Exception::Config(format!("no such file {}: {}", filename, e)))?;
        Self::parse(&str_val)
    }

    /// 解析 TOML 文本并修正不合理的取值
    pub fn parse(str_val: &str) -> Result<Self, Exception> {
        let mut raw_config: Config =
            toml::from_str(str_val).map_err(|e| Exception::Config(e.to_string()))?;
        if raw_config.port == 0 {
            return Err(Exception::Config("port must be a positive integer".to_string()));
        }
        if raw_config.worker_threads == 0 {
            raw_config.worker_threads = num_cpus::get();
        }
        if raw_config.pool_size == 0 {
            warn!("pool_size被设置为0，工作池至少需要一个槽位，因此该值将被改为{}。", DEFAULT_POOL_SIZE);
            raw_config.pool_size = DEFAULT_POOL_SIZE;
        }
        Ok(raw_config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn www_root(&self) -> &str {
        &self.www_root
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn local(&self) -> bool {
        self.local
    }

    /// 监听地址：`local` 为真时只监听本地回环
    pub fn socket_addr(&self) -> SocketAddr {
        let address = match self.local {
            true => Ipv4Addr::LOCALHOST,
            false => Ipv4Addr::UNSPECIFIED,
        };
        SocketAddr::V4(SocketAddrV4::new(address, self.port))
    }
}
