/*!
# GHS Wire Protocol

The message vocabulary of the Gallager–Humblet–Spira algorithm, together with
the per-channel and per-node classifications the handlers dispatch on.

The seven message kinds form a closed set; everything in the crate matches on
them exhaustively. There is deliberately no trait-object dispatch here: the
protocol is finished, and a new variant would be a new algorithm.
*/

use crate::core::types::{Level, Weight};

/// Classification a node holds for each of its incident edges.
///
/// A channel starts `Basic` and is classified at most once: `Basic -> Branch`
/// when the edge is adopted into the spanning tree, `Basic -> Reject` when the
/// edge is proven to lead back into the node's own fragment. Neither final
/// state is ever left again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelStatus {
    /// Not yet classified.
    Basic,
    /// Known to be in the minimum spanning tree.
    Branch,
    /// Known to be internal to the node's own fragment.
    Reject,
}

/// Computation state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// Initial state, before local wakeup.
    Sleeping,
    /// Participating in a find-minimum-outgoing-edge wave.
    Find,
    /// Not currently participating in a find wave.
    Found,
}

/// A GHS protocol message.
///
/// `name` fields carry fragment names, which after the first merge are always
/// core-edge weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Proposal to merge across the edge the message arrives on, sent by a
    /// fragment whose minimum outgoing edge this is.
    Connect { level: Level },
    /// Identity broadcast: the receiver adopts the sender's fragment level and
    /// name, and (when `state` is `Find`) joins the find wave.
    Initiate {
        level: Level,
        name: Weight,
        state: NodeState,
    },
    /// Probe asking whether the receiver belongs to a different fragment.
    Test { level: Level, name: Weight },
    /// Answer to `Test`: the probed edge leaves the sender's fragment.
    Accept,
    /// Answer to `Test`: both endpoints are in the same fragment.
    Reject,
    /// Convergecast carrying the best outgoing-edge weight of a subtree.
    Report { best: Weight },
    /// Walks from the core toward the fragment's minimum outgoing edge, whose
    /// adjacent node then issues `Connect`.
    ChangeRoot,
}

impl Message {
    /// Short stable name for trace output.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Connect { .. } => "CONNECT",
            Message::Initiate { .. } => "INITIATE",
            Message::Test { .. } => "TEST",
            Message::Accept => "ACCEPT",
            Message::Reject => "REJECT",
            Message::Report { .. } => "REPORT",
            Message::ChangeRoot => "CHANGEROOT",
        }
    }
}
