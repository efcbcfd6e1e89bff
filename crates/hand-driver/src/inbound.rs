//! 入站适配器
//!
//! 外部传输层（每只手一个订阅通道）每收到一条手势消息，就调用对应
//! [`GestureSubscription::on_message`]。订阅端唯一附加的信息是固定的手部标识，
//! 分发线程不需要推断消息来自哪只手。
//!
//! 入站路径从不向调用方报错：未知手势由分发线程记录后丢弃，
//! 队列满/已关闭只记录一条警告。

use crate::error::DriverError;
use crate::worker::{DispatchRequest, HandContext};
use crossbeam_channel::{Sender, TrySendError};
use hand_protocol::Hand;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{info, trace, warn};

/// 单手请求队列发送端
#[derive(Debug, Clone)]
pub(crate) struct RequestQueue {
    tx: Sender<DispatchRequest>,
    ctx: Arc<HandContext>,
    capacity: usize,
}

impl RequestQueue {
    pub(crate) fn new(tx: Sender<DispatchRequest>, ctx: Arc<HandContext>, capacity: usize) -> Self {
        Self { tx, ctx, capacity }
    }

    pub(crate) fn hand(&self) -> Hand {
        self.ctx.hand
    }

    /// 入队一条请求（不阻塞）
    ///
    /// # 错误
    /// - `DriverError::ChannelFull`: 队列已满
    /// - `DriverError::ChannelClosed`: 分发线程已退出
    pub(crate) fn push(&self, gesture: &str) -> Result<(), DriverError> {
        // 先计数再发送，保证分发线程的 mark_done 不会先于 mark_enqueued
        self.ctx.mark_enqueued();

        match self.tx.try_send(DispatchRequest::new(gesture)) {
            Ok(()) => {
                trace!("{}_hand: queued {:?}", self.ctx.hand, gesture);
                Ok(())
            },
            Err(TrySendError::Full(_)) => {
                self.ctx.mark_done();
                self.ctx.metrics.queue_drops.fetch_add(1, Ordering::Relaxed);
                Err(DriverError::ChannelFull(self.capacity))
            },
            Err(TrySendError::Disconnected(_)) => {
                self.ctx.mark_done();
                self.ctx.metrics.queue_drops.fetch_add(1, Ordering::Relaxed);
                Err(DriverError::ChannelClosed)
            },
        }
    }
}

/// 单手手势订阅
///
/// 可克隆，可移动到传输层的回调线程中长期持有。
#[derive(Debug, Clone)]
pub struct GestureSubscription {
    topic: String,
    queue: RequestQueue,
}

impl GestureSubscription {
    pub(crate) fn new(topic: impl Into<String>, queue: RequestQueue) -> Self {
        Self {
            topic: topic.into(),
            queue,
        }
    }

    /// 固定的手部标识
    pub fn hand(&self) -> Hand {
        self.queue.hand()
    }

    /// 订阅话题名称
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// 处理一条入站消息（负载即手势名）
    pub fn on_message(&self, payload: &str) {
        info!("{}_hand, arg: {}", self.hand(), payload);

        if let Err(e) = self.queue.push(payload) {
            warn!(
                "{}_hand: dropping gesture {:?} from {}: {}",
                self.hand(),
                payload,
                self.topic,
                e
            );
        }
    }
}

/// 双手入站适配器
#[derive(Debug, Clone)]
pub struct InboundAdapter {
    right: GestureSubscription,
    left: GestureSubscription,
}

impl InboundAdapter {
    pub(crate) fn new(right: GestureSubscription, left: GestureSubscription) -> Self {
        Self { right, left }
    }

    /// 取某只手的订阅
    pub fn subscription(&self, hand: Hand) -> &GestureSubscription {
        match hand {
            Hand::Right => &self.right,
            Hand::Left => &self.left,
        }
    }

    /// 按手转发一条入站事件
    pub fn on_event(&self, hand: Hand, payload: &str) {
        self.subscription(hand).on_message(payload);
    }

    /// 按话题名转发，未知话题返回 `false`
    pub fn on_topic_message(&self, topic: &str, payload: &str) -> bool {
        match Hand::ALL
            .into_iter()
            .map(|hand| self.subscription(hand))
            .find(|sub| sub.topic() == topic)
        {
            Some(sub) => {
                sub.on_message(payload);
                true
            },
            None => {
                warn!("Message on unknown topic {}: {:?}", topic, payload);
                false
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HookManager;
    use crossbeam_channel::bounded;
    use parking_lot::RwLock;

    fn queue(hand: Hand, capacity: usize) -> (RequestQueue, crossbeam_channel::Receiver<DispatchRequest>) {
        let ctx = Arc::new(HandContext::new(hand, Arc::new(RwLock::new(HookManager::new()))));
        let (tx, rx) = bounded(capacity);
        (RequestQueue::new(tx, ctx, capacity), rx)
    }

    #[test]
    fn test_subscription_forwards_with_fixed_hand() {
        let (q, rx) = queue(Hand::Left, 4);
        let sub = GestureSubscription::new(Hand::Left.default_topic(), q);
        assert_eq!(sub.hand(), Hand::Left);
        assert_eq!(sub.topic(), "/l_hand/l_hand_topic");

        sub.on_message("fist");
        sub.on_message("wave");

        let received: Vec<_> = rx.try_iter().map(|r| r.gesture).collect();
        assert_eq!(received, vec!["fist".to_string(), "wave".to_string()]);
    }

    #[test]
    fn test_push_full_queue() {
        let (q, _rx) = queue(Hand::Right, 1);
        assert!(q.push("open").is_ok());
        assert!(matches!(q.push("fist"), Err(DriverError::ChannelFull(1))));
        assert_eq!(q.ctx.pending(), 1);
        assert_eq!(q.ctx.metrics.snapshot().queue_drops, 1);
    }

    #[test]
    fn test_push_closed_queue() {
        let (q, rx) = queue(Hand::Right, 1);
        drop(rx);
        assert!(matches!(q.push("open"), Err(DriverError::ChannelClosed)));
        assert_eq!(q.ctx.pending(), 0);
    }

    #[test]
    fn test_adapter_routes_by_topic() {
        let (rq, rrx) = queue(Hand::Right, 4);
        let (lq, lrx) = queue(Hand::Left, 4);
        let adapter = InboundAdapter::new(
            GestureSubscription::new(Hand::Right.default_topic(), rq),
            GestureSubscription::new(Hand::Left.default_topic(), lq),
        );

        assert!(adapter.on_topic_message("/r_hand/r_hand_topic", "point"));
        adapter.on_event(Hand::Left, "open");
        assert!(!adapter.on_topic_message("/nowhere", "open"));

        assert_eq!(rrx.try_recv().unwrap().gesture, "point");
        assert_eq!(lrx.try_recv().unwrap().gesture, "open");
        assert!(rrx.try_recv().is_err());
    }
}
