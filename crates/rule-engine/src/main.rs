//! 规则引擎命令行工具
//!
//! 从磁盘读取规则块文档和事实数据，输出匹配的规则条目（JSON，写到 stdout）。
//! 日志写到 stderr。

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rule_engine::{EngineOptions, RuleBlock, new_engine};
use ruleblock_shared::config::AppConfig;
use ruleblock_shared::observability;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const SERVICE_NAME: &str = "rule-engine";

/// 规则块评估工具
#[derive(Parser, Debug)]
#[command(name = "rule-engine")]
#[command(version, about = "规则块评估工具")]
#[command(propagate_version = true)]
struct Cli {
    /// 配置目录
    #[arg(long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 加载规则块并用事实数据评估
    Evaluate {
        /// 规则块文档（每个文件一个 JSON 规则块）
        #[arg(short, long, required = true, num_args = 1..)]
        rules: Vec<PathBuf>,

        /// 事实数据（JSON 对象）
        #[arg(short, long)]
        facts: PathBuf,

        /// 返回所有匹配而不是第一个
        #[arg(long)]
        all_matches: bool,

        /// 事实缺失时以 false 代替
        #[arg(long)]
        allow_undefined_facts: bool,
    },

    /// 解析并静态检查规则块文档
    Validate {
        /// 规则块文档
        #[arg(short, long, required = true, num_args = 1..)]
        rules: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(SERVICE_NAME, &cli.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    let mut obs_config = config
        .observability
        .clone()
        .with_service_name(SERVICE_NAME);
    if let Some(level) = &cli.log_level {
        obs_config = obs_config.with_log_level(level.as_str());
    }
    observability::init(&obs_config)?;

    match cli.command {
        Commands::Evaluate {
            rules,
            facts,
            all_matches,
            allow_undefined_facts,
        } => {
            let options = EngineOptions {
                allow_undefined_facts: config.engine.allow_undefined_facts || allow_undefined_facts,
                first_match_only: config.engine.first_match_only && !all_matches,
            };
            evaluate(options, &rules, &facts)
        }
        Commands::Validate { rules } => validate(&rules),
    }
}

fn evaluate(options: EngineOptions, rules: &[PathBuf], facts: &Path) -> Result<()> {
    let engine = new_engine(options);

    for path in rules {
        engine
            .add_rule(&read(path)?)
            .with_context(|| format!("Failed to load rule document {}", path.display()))?;
    }
    info!(rule_blocks = engine.len(), ?options, "Rules loaded");

    let matches = engine
        .evaluate_json(&read(facts)?)
        .with_context(|| format!("Failed to evaluate facts {}", facts.display()))?;
    info!(matches = matches.len(), "Evaluation complete");

    let output = json!({
        "matched": !matches.is_empty(),
        "matches": matches,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn validate(rules: &[PathBuf]) -> Result<()> {
    let mut failed = 0;

    for path in rules {
        let block = RuleBlock::from_json(&read(path)?)
            .with_context(|| format!("Failed to parse rule document {}", path.display()))?;

        let problems = block.validate();
        if problems.is_empty() {
            println!("{}: ok ({} entries)", block.uuid, block.entries.len());
        } else {
            failed += 1;
            for problem in &problems {
                warn!(
                    rule_id = %block.uuid,
                    file = %path.display(),
                    error = %problem,
                    "Invalid rule"
                );
                println!("{}: {}", block.uuid, problem);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} rule documents failed validation", failed, rules.len());
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
