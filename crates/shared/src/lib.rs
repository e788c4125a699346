//! 共享库
//!
//! 包含引擎二进制共用的配置加载与日志初始化代码。

pub mod config;
pub mod observability;
