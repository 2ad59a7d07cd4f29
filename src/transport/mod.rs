use alloc::boxed::Box;

use crate::protocol::Message;

/// A reliable, ordered, bidirectional message channel.
///
/// `recv` must be cancel-safe: the session drops pending receives when it
/// has outbound traffic to write.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

pub mod in_memory;
pub mod stream;
