//! 目录命令
//!
//! 打印标准手势目录（每只手的手势名与关节目标）。

use anyhow::Result;
use clap::Args;
use hand_sdk::{GestureCatalog, Hand};
use std::fmt::Write;

/// 目录命令参数
#[derive(Args, Debug, Default)]
pub struct CatalogCommand {
    /// 只列出指定的手
    #[arg(long)]
    pub hand: Option<Hand>,
}

impl CatalogCommand {
    pub fn execute(&self) -> Result<()> {
        let catalog = GestureCatalog::standard()?;
        print!("{}", self.render(&catalog));
        Ok(())
    }

    fn render(&self, catalog: &GestureCatalog) -> String {
        let hands: Vec<Hand> = match self.hand {
            Some(hand) => vec![hand],
            None => Hand::ALL.to_vec(),
        };

        let mut out = String::new();
        for hand in hands {
            let _ = writeln!(out, "{}_hand ({} joints)", hand, hand.joint_count());
            let _ = writeln!(out, "  joints: {}", hand.joint_names().join(", "));
            for (name, targets) in catalog.hand(hand).iter() {
                let _ = writeln!(out, "  {:<10} {:?}", name, targets);
            }
        }
        out
    }
}
