//! 配置管理模块
//!
//! 支持 TOML 配置文件分层加载和环境变量覆盖。

use crate::observability::ObservabilityConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// 规则引擎评估配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 事实缺失时是否以 false 代替
    pub allow_undefined_facts: bool,
    /// 是否只返回第一个匹配
    pub first_match_only: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allow_undefined_facts: false,
            first_match_only: true,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub engine: EngineConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 配置目录取自 `CONFIG_DIR`（默认 `config`），环境取自 `RULEBLOCK_ENV`（默认 `development`）。
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
        Self::load_from(service_name, &config_dir)
    }

    /// 从指定目录加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. {config_dir}/default.toml
    /// 2. {config_dir}/{environment}.toml
    /// 3. {config_dir}/{service_name}.toml
    /// 4. 环境变量（RULEBLOCK_ 前缀，层级用双下划线分隔，
    ///    如 RULEBLOCK_ENGINE__ALLOW_UNDEFINED_FACTS -> engine.allow_undefined_facts）
    pub fn load_from(
        service_name: &str,
        config_dir: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let env = std::env::var("RULEBLOCK_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            .add_source(
                Environment::with_prefix("RULEBLOCK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
