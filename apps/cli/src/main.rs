//! # Hand Gestures CLI
//!
//! 双手手势分发的命令行前端。
//!
//! ### 运行模式（默认）
//!
//! 从标准输入逐行读取 `<hand> <gesture>`（或 `<topic> <gesture>`），
//! 转发给入站适配器。EOF 或 Ctrl+C 时排空队列并退出。
//!
//! ```bash
//! $ printf 'r fist\nl grasp\n' | hand-gestures
//! $ hand-gestures --config hands.toml run --ready-timeout-ms 500
//! ```
//!
//! ### 单次模式
//!
//! ```bash
//! hand-gestures send r point
//! hand-gestures catalog --hand l
//! hand-gestures config init hands.toml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hand_sdk::DispatchConfig;
use std::path::{Path, PathBuf};

mod commands;

use commands::{CatalogCommand, ConfigCommand, RunCommand, SendCommand};

/// Hand Gestures - 双手手势分发工具
#[derive(Parser, Debug)]
#[command(name = "hand-gestures")]
#[command(about = "Dispatch named gestures to a pair of robotic hands", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件（TOML），缺省使用内置默认值
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 从标准输入读取手势并分发（默认）
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 分发单个手势并打印提交的轨迹
    Send {
        #[command(flatten)]
        args: SendCommand,
    },

    /// 列出手势目录
    Catalog {
        #[command(flatten)]
        args: CatalogCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// 加载配置文件，未指定时返回默认配置
fn load_config(path: Option<&Path>) -> Result<DispatchConfig> {
    match path {
        Some(path) => DispatchConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(DispatchConfig::default()),
    }
}

fn main() -> Result<()> {
    // RUST_LOG 优先
    hand_sdk::init_logger(hand_sdk::DEFAULT_LOG_DIRECTIVE);

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        None => RunCommand::default().execute(&config),
        Some(Commands::Run { args }) => args.execute(&config),
        Some(Commands::Send { args }) => args.execute(&config),
        Some(Commands::Catalog { args }) => args.execute(),
        Some(Commands::Config(cmd)) => cmd.execute(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hand_sdk::Hand;

    #[test]
    fn test_no_subcommand_defaults_to_run() {
        let cli = Cli::try_parse_from(["hand-gestures"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["hand-gestures", "catalog", "--config", "hands.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("hands.toml")));
        assert!(matches!(cli.command, Some(Commands::Catalog { .. })));
    }

    #[test]
    fn test_send_parses_hand() {
        let cli = Cli::try_parse_from(["hand-gestures", "send", "left", "grasp"]).unwrap();
        match cli.command {
            Some(Commands::Send { args }) => {
                assert_eq!(args.hand, Hand::Left);
                assert_eq!(args.gesture, "grasp");
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_send_rejects_unknown_hand() {
        assert!(Cli::try_parse_from(["hand-gestures", "send", "middle", "fist"]).is_err());
    }

    #[test]
    fn test_load_config_default() {
        let config = load_config(None).unwrap();
        assert_eq!(config, DispatchConfig::default());
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }
}
