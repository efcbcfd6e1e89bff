//! 运行命令
//!
//! 专用输入线程读取标准输入，通过通道交给主线程；
//! 主线程把每行转发给入站适配器，直到 EOF 或 Ctrl+C。

use anyhow::{Context, Result};
use clap::Args;
use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use hand_sdk::prelude::*;
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// 主循环检查退出标志的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 退出前排空队列的最长时间
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// 运行命令参数
#[derive(Args, Debug, Default)]
pub struct RunCommand {
    /// 轨迹时长（毫秒，覆盖配置）
    #[arg(long)]
    pub duration_ms: Option<u64>,

    /// 就绪等待上限（毫秒，0 表示无限等待，覆盖配置）
    #[arg(long)]
    pub ready_timeout_ms: Option<u64>,

    /// 以离线状态启动的手（该手的端点永远不就绪）
    #[arg(long, value_name = "HAND")]
    pub offline: Vec<Hand>,
}

impl RunCommand {
    /// 应用命令行覆盖
    fn effective_config(&self, config: &DispatchConfig) -> Result<DispatchConfig> {
        let mut config = config.clone();
        if let Some(ms) = self.duration_ms {
            config.dispatch.duration_ms = ms;
        }
        if let Some(ms) = self.ready_timeout_ms {
            config.dispatch.ready_timeout_ms = ms;
        }
        config.validate()?;
        Ok(config)
    }

    /// 长期运行的端点：不记录命令，控制端直接丢弃
    fn endpoint(&self, config: &DispatchConfig, hand: Hand) -> LoopbackEndpoint {
        let name = config.endpoint_name(hand);
        let (endpoint, _control) = if self.offline.contains(&hand) {
            LoopbackEndpoint::offline(name)
        } else {
            LoopbackEndpoint::new(name)
        };
        endpoint.recording(false)
    }

    /// 执行运行命令
    pub fn execute(&self, config: &DispatchConfig) -> Result<()> {
        let config = self.effective_config(config)?;

        let engine = hand_sdk::builder_from_config(&config)
            .build(
                self.endpoint(&config, Hand::Right),
                self.endpoint(&config, Hand::Left),
            )
            .context("Failed to start dispatch engine")?;
        let adapter = engine.inbound_adapter();

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        ctrlc::set_handler(move || {
            eprintln!("\nReceived interrupt signal. Shutting down...");
            flag.store(false, Ordering::Release);
        })
        .context("Failed to set signal handler")?;

        for hand in Hand::ALL {
            info!(
                "{}_hand: topic {} -> {}",
                hand,
                engine.subscription(hand).topic(),
                engine.endpoint_name(hand)
            );
        }
        eprintln!("Reading \"<hand> <gesture>\" lines from stdin. Press Ctrl+C to stop.");

        let lines = spawn_stdin_reader();
        while running.load(Ordering::Acquire) {
            match lines.recv_timeout(POLL_INTERVAL) {
                Ok(line) => forward_line(&adapter, &line),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if running.load(Ordering::Acquire) {
            // EOF：等待已排队的手势处理完
            if let Err(e) = engine.flush(FLUSH_TIMEOUT) {
                warn!("Pending gestures not flushed before exit: {}", e);
            }
        }

        for hand in Hand::ALL {
            let m = engine.metrics(hand);
            eprintln!(
                "{}_hand: received {}, submitted {}, rejected {}, unreachable {}, cancelled {}, dropped {}",
                hand, m.received, m.submitted, m.rejected, m.unreachable, m.cancelled, m.queue_drops
            );
        }

        engine.shutdown();
        Ok(())
    }
}

/// 标准输入读取线程（EOF 时关闭通道）
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = bounded::<String>(16);

    thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .map(|_| ())
        .unwrap_or_else(|e| warn!("Failed to spawn stdin reader: {}", e));

    rx
}

/// 拆分一行输入为 `(目标, 手势)`
///
/// 空行和 `#` 开头的注释行返回 `None`。
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (target, gesture) = line.split_once(char::is_whitespace)?;
    let gesture = gesture.trim();
    if gesture.is_empty() {
        return None;
    }
    Some((target, gesture))
}

/// 转发一行输入：目标可以是手（`r`/`left` 等）或话题名
fn forward_line(adapter: &InboundAdapter, line: &str) {
    let Some((target, gesture)) = parse_line(line) else {
        if !line.trim().is_empty() && !line.trim_start().starts_with('#') {
            warn!("Ignoring malformed line: {:?}", line);
        }
        return;
    };

    if let Ok(hand) = target.parse::<Hand>() {
        adapter.on_event(hand, gesture);
    } else if !adapter.on_topic_message(target, gesture) {
        warn!("Unknown hand or topic: {:?}", target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("r fist"), Some(("r", "fist")));
        assert_eq!(parse_line("  left   grasp  "), Some(("left", "grasp")));
        assert_eq!(
            parse_line("/l_hand/l_hand_topic open"),
            Some(("/l_hand/l_hand_topic", "open"))
        );
    }

    #[test]
    fn test_parse_line_skips() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("# comment"), None);
        assert_eq!(parse_line("r"), None);
        assert_eq!(parse_line("r   "), None);
    }

    #[test]
    fn test_effective_config_overrides() {
        let cmd = RunCommand {
            duration_ms: Some(250),
            ready_timeout_ms: Some(80),
            offline: vec![],
        };
        let config = cmd.effective_config(&DispatchConfig::default()).unwrap();
        assert_eq!(config.duration(), Duration::from_millis(250));
        assert_eq!(config.ready_timeout(), Some(Duration::from_millis(80)));
    }

    #[test]
    fn test_run_endpoints_do_not_record() {
        let cmd = RunCommand {
            offline: vec![Hand::Left],
            ..Default::default()
        };
        let config = DispatchConfig::default();
        for hand in Hand::ALL {
            let mut endpoint = cmd.endpoint(&config, hand);
            assert!(!endpoint.is_recording());
            assert_eq!(endpoint.name(), hand.default_action_name());
            assert_eq!(endpoint.wait_ready(Duration::ZERO), hand == Hand::Right);
        }
    }

    #[test]
    fn test_effective_config_rejects_zero_duration() {
        let cmd = RunCommand {
            duration_ms: Some(0),
            ..Default::default()
        };
        assert!(cmd.effective_config(&DispatchConfig::default()).is_err());
    }

    #[test]
    fn test_forward_line_routes_by_hand_and_topic() {
        let (right, right_ctl) = LoopbackEndpoint::for_hand(Hand::Right);
        let (left, left_ctl) = LoopbackEndpoint::for_hand(Hand::Left);
        let engine = HandDriverBuilder::new()
            .ready_poll(Duration::from_millis(5))
            .build(right, left)
            .unwrap();
        let adapter = engine.inbound_adapter();

        forward_line(&adapter, "R fist");
        forward_line(&adapter, "/l_hand/l_hand_topic grasp");
        forward_line(&adapter, "middle fist");
        forward_line(&adapter, "garbage");
        engine.flush(Duration::from_secs(2)).unwrap();

        assert_eq!(right_ctl.submitted_count(), 1);
        assert_eq!(left_ctl.submitted_count(), 1);
        assert_eq!(
            left_ctl.submitted()[0].positions(),
            &[-1.3, 0.95, 1.5, -0.97, -1.42]
        );
    }
}
