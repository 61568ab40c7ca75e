/*!
# Message Transport

Reliable asynchronous delivery fabric between node inboxes. Each node owns one
unbounded channel; a `Fabric` is the clonable bundle of every inbox's sender
side. Crossbeam channels preserve per-producer arrival order, which is exactly
the per-directed-edge FIFO guarantee the algorithm needs. Nothing stronger is
promised: messages from different senders interleave arbitrarily.

Delivery is the only synchronization primitive between nodes; there is no
shared mutable state anywhere else.
*/

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::debug;

use crate::core::error::{FragmentaError, Result};
use crate::core::protocol::Message;
use crate::core::types::NodeId;

/// Envelope delivered to a node inbox.
#[derive(Debug, Clone)]
pub(crate) enum Packet {
    /// A protocol message arriving over the edge from `from`.
    Protocol { from: NodeId, message: Message },
    /// Runner-level control: drain no further, return the final node state.
    /// Never sent by the algorithm itself.
    Shutdown,
}

/// Sender sides of every node inbox.
#[derive(Clone)]
pub(crate) struct Fabric {
    inboxes: Vec<Sender<Packet>>,
}

impl Fabric {
    /// Creates a fabric for `n` nodes, returning the receiver side of each
    /// inbox in node-index order.
    pub(crate) fn new(n: usize) -> (Self, Vec<Receiver<Packet>>) {
        let (inboxes, receivers) = (0..n).map(|_| unbounded()).unzip();
        (Self { inboxes }, receivers)
    }

    /// Delivers `message` from node `from` to node `to`.
    pub(crate) fn send(&self, from: NodeId, to: NodeId, message: Message) -> Result<()> {
        debug!(
            from = from.index(),
            to = to.index(),
            kind = message.kind(),
            payload = ?message,
            "send"
        );
        let inbox = self
            .inboxes
            .get(to.index())
            .ok_or_else(|| FragmentaError::transport(format!("no inbox for node {}", to.index())))?;
        inbox.send(Packet::Protocol { from, message })?;
        Ok(())
    }

    /// Returns a sender for the given node's own inbox, used by the node to
    /// re-enqueue postponed messages at the tail of its queue.
    pub(crate) fn loopback(&self, node: NodeId) -> Result<Sender<Packet>> {
        self.inboxes
            .get(node.index())
            .cloned()
            .ok_or_else(|| FragmentaError::transport(format!("no inbox for node {}", node.index())))
    }

    /// Broadcasts `Shutdown` to every inbox. Inboxes whose node already exited
    /// are skipped silently.
    pub(crate) fn shutdown_all(&self) {
        for inbox in &self.inboxes {
            let _ = inbox.send(Packet::Shutdown);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Level;

    #[test]
    fn test_per_sender_fifo() {
        let (fabric, mut receivers) = Fabric::new(2);
        let rx = receivers.remove(1);
        let a = NodeId::from_index(0);
        let b = NodeId::from_index(1);

        for level in 0..4 as Level {
            fabric.send(a, b, Message::Connect { level }).unwrap();
        }

        let mut seen = Vec::new();
        for _ in 0..4 {
            match rx.recv().unwrap() {
                Packet::Protocol {
                    message: Message::Connect { level },
                    ..
                } => seen.push(level),
                other => panic!("unexpected packet: {:?}", other),
            }
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_shutdown_reaches_every_inbox() {
        let (fabric, receivers) = Fabric::new(3);
        fabric.shutdown_all();
        for rx in receivers {
            assert!(matches!(rx.recv().unwrap(), Packet::Shutdown));
        }
    }

    #[test]
    fn test_unknown_destination_is_an_error() {
        let (fabric, _receivers) = Fabric::new(1);
        let err = fabric
            .send(NodeId::from_index(0), NodeId::from_index(9), Message::Accept)
            .unwrap_err();
        assert!(matches!(err, FragmentaError::Transport(_)));
    }
}
