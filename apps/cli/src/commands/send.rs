//! 单次发送命令
//!
//! 启动引擎、分发一个手势、排空队列后打印提交的轨迹。

use anyhow::{Context, Result, bail};
use clap::Args;
use hand_sdk::prelude::*;
use std::time::Duration;

/// 等待提交完成的最长时间
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// 发送命令参数
#[derive(Args, Debug)]
pub struct SendCommand {
    /// 目标手（r/right 或 l/left）
    pub hand: Hand,

    /// 手势名
    pub gesture: String,
}

impl SendCommand {
    /// 执行发送
    pub fn execute(&self, config: &DispatchConfig) -> Result<()> {
        let command = self.dispatch_once(config)?;

        println!("{}_hand {}", self.hand, self.gesture);
        for (name, position) in command.joint_names().iter().zip(command.positions()) {
            println!("  {:<20} {}", name, position);
        }
        println!("  time_from_start: {:?}", command.time_from_start());
        Ok(())
    }

    fn dispatch_once(&self, config: &DispatchConfig) -> Result<TrajectoryCommand> {
        let (right, right_ctl) = LoopbackEndpoint::new(config.endpoint_name(Hand::Right));
        let (left, left_ctl) = LoopbackEndpoint::new(config.endpoint_name(Hand::Left));
        let engine = hand_sdk::builder_from_config(config)
            .build(right, left)
            .context("Failed to start dispatch engine")?;

        engine.inbound_adapter().on_event(self.hand, &self.gesture);
        engine
            .flush_hand(self.hand, SEND_TIMEOUT)
            .context("Gesture was not processed in time")?;
        engine.shutdown();

        let control = match self.hand {
            Hand::Right => right_ctl,
            Hand::Left => left_ctl,
        };
        match control.submitted().pop() {
            Some(command) => Ok(command),
            None => bail!(
                "No goal submitted for {}_hand: gesture {:?} is not in the catalog",
                self.hand,
                self.gesture
            ),
        }
    }
}
