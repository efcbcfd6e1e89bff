//! 配置管理命令
//!
//! 打印生效配置，或把默认配置写到文件作为起点。

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use hand_sdk::DispatchConfig;
use std::path::PathBuf;

/// 配置子命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印生效配置（TOML）
    Show,

    /// 写出默认配置文件
    Init {
        /// 输出路径
        path: PathBuf,

        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(&self, config: &DispatchConfig) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                print!("{}", config.to_toml_string()?);
                Ok(())
            },
            ConfigCommand::Init { path, force } => {
                init_config(path, *force)?;
                println!("Wrote default config to {}", path.display());
                Ok(())
            },
        }
    }
}

fn init_config(path: &std::path::Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    DispatchConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_writes_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hands.toml");

        init_config(&path, false).unwrap();
        let loaded = DispatchConfig::load(&path).unwrap();
        assert_eq!(loaded, DispatchConfig::default());
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hands.toml");
        std::fs::write(&path, "# existing\n").unwrap();

        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
        assert_eq!(
            DispatchConfig::load(&path).unwrap(),
            DispatchConfig::default()
        );
    }
}
