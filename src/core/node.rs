/*!
# GHS Node Agent

One `NodeAgent` per vertex. An agent owns all of its mutable state and talks to
the rest of the world exclusively through its inbox, the fabric, and the
collector channel. The dispatch loop wakes the node once, then consumes packets
until the runner sends `Shutdown`.

Postponement is the load-bearing mechanism here: a handler that cannot act yet
(its fragment level is too low, or a channel is still unclassified) re-enqueues
the packet at the tail of its own inbox and yields. The message is retried only
after strictly newer arrivals had a chance to change the node's state. Head
re-enqueueing would starve exactly those messages and deadlock the run.
*/

use std::collections::HashMap;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use tracing::debug;

use crate::core::collector::CollectorEvent;
use crate::core::error::{FragmentaError, Result};
use crate::core::ghs::NodeSummary;
use crate::core::protocol::{ChannelStatus, Message, NodeState};
use crate::core::transport::{Fabric, Packet};
use crate::core::types::{INFINITE_WEIGHT, Level, NodeId, Weight};

pub(crate) struct NodeAgent {
    id: NodeId,
    /// Incident edges as a neighbor -> weight map. Immutable after construction.
    weights: HashMap<NodeId, Weight>,
    status: HashMap<NodeId, ChannelStatus>,
    state: NodeState,
    level: Level,
    /// Undefined until the first `Initiate` arrives.
    fragment_name: Option<Weight>,
    /// Incident edge pointing toward the sender of the most recent `Initiate`.
    in_branch: Option<NodeId>,
    best_edge: Option<NodeId>,
    best_wt: Weight,
    test_edge: Option<NodeId>,
    /// Outstanding child reports in the current find wave.
    find_count: u32,
    inbox: Receiver<Packet>,
    loopback: Sender<Packet>,
    fabric: Fabric,
    events: Sender<CollectorEvent>,
}

impl NodeAgent {
    pub(crate) fn new(
        id: NodeId,
        weights: HashMap<NodeId, Weight>,
        inbox: Receiver<Packet>,
        fabric: Fabric,
        events: Sender<CollectorEvent>,
    ) -> Result<Self> {
        let status = weights
            .keys()
            .map(|&neighbor| (neighbor, ChannelStatus::Basic))
            .collect();
        let loopback = fabric.loopback(id)?;
        Ok(Self {
            id,
            weights,
            status,
            state: NodeState::Sleeping,
            level: 0,
            fragment_name: None,
            in_branch: None,
            best_edge: None,
            best_wt: INFINITE_WEIGHT,
            test_edge: None,
            find_count: 0,
            inbox,
            loopback,
            fabric,
            events,
        })
    }

    /// Wakes the node, then consumes packets until shutdown. On a protocol
    /// violation the error is reported to the run's event channel before the
    /// thread exits, so the runner never blocks on a dead node.
    pub(crate) fn run(mut self) -> Result<NodeSummary> {
        match self.run_inner() {
            Ok(()) => Ok(self.summarize()),
            Err(error) => {
                let _ = self.events.send(CollectorEvent::Fault {
                    node: self.id,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    fn run_inner(&mut self) -> Result<()> {
        self.wakeup()?;
        loop {
            match self.inbox.recv()? {
                Packet::Shutdown => return Ok(()),
                Packet::Protocol { from, message } => {
                    debug!(
                        node = self.id.index(),
                        from = from.index(),
                        kind = message.kind(),
                        "receive"
                    );
                    self.dispatch(from, message)?;
                }
            }
        }
    }

    fn dispatch(&mut self, from: NodeId, message: Message) -> Result<()> {
        match message {
            Message::Connect { level } => self.handle_connect(from, level),
            Message::Initiate { level, name, state } => {
                self.handle_initiate(from, level, name, state)
            }
            Message::Test { level, name } => self.handle_test(from, level, name),
            Message::Accept => self.handle_accept(from),
            Message::Reject => self.handle_reject(from),
            Message::Report { best } => self.handle_report(from, best),
            Message::ChangeRoot => self.change_root(),
        }
    }

    /// One-time local start: adopt the cheapest incident edge and propose a
    /// merge across it. Every singleton is a level-0 fragment, and by the cut
    /// property its cheapest edge is in every MST.
    fn wakeup(&mut self) -> Result<()> {
        if self.state != NodeState::Sleeping {
            return Err(self.violation("wakeup on a node that is already awake"));
        }
        debug!(node = self.id.index(), "wakeup");
        let (edge, weight) = self
            .min_basic_edge()
            .ok_or_else(|| self.violation("wakeup on a node with no incident edges"))?;
        self.set_status(edge, ChannelStatus::Branch)?;
        self.adopt(edge, weight)?;
        self.level = 0;
        self.state = NodeState::Found;
        self.find_count = 0;
        self.send(edge, Message::Connect { level: 0 })
    }

    fn handle_connect(&mut self, from: NodeId, their_level: Level) -> Result<()> {
        if self.state == NodeState::Sleeping {
            // Unreachable when the runner wakes every node up front, but kept
            // so a delayed start cannot wedge the protocol.
            self.wakeup()?;
        }
        if their_level < self.level {
            // Absorb the lower-level fragment.
            self.set_status(from, ChannelStatus::Branch)?;
            let weight = self.weight_of(from)?;
            self.adopt(from, weight)?;
            let name = self.fragment_name()?;
            self.send(
                from,
                Message::Initiate {
                    level: self.level,
                    name,
                    state: self.state,
                },
            )?;
            if self.state == NodeState::Find {
                self.find_count += 1;
            }
            Ok(())
        } else if self.status_of(from)? == ChannelStatus::Basic {
            // We cannot yet tell whether the sender is in our fragment, and we
            // are not at the right level to merge. Retry after newer messages.
            self.postpone(from, Message::Connect { level: their_level })
        } else {
            // The channel is already a branch, so we issued a Connect across
            // this edge ourselves: symmetric merge at equal level. The edge
            // weight becomes the new fragment's name.
            let weight = self.weight_of(from)?;
            self.send(
                from,
                Message::Initiate {
                    level: self.level + 1,
                    name: weight,
                    state: NodeState::Find,
                },
            )
        }
    }

    fn handle_initiate(
        &mut self,
        from: NodeId,
        level: Level,
        name: Weight,
        state: NodeState,
    ) -> Result<()> {
        debug!(
            node = self.id.index(),
            level,
            name = name.0,
            state = ?state,
            "adopt fragment identity"
        );
        self.level = level;
        self.fragment_name = Some(name);
        self.state = state;
        self.in_branch = Some(from);
        self.best_edge = None;
        self.best_wt = INFINITE_WEIGHT;

        let children: Vec<NodeId> = self
            .status
            .iter()
            .filter(|&(&neighbor, &status)| neighbor != from && status == ChannelStatus::Branch)
            .map(|(&neighbor, _)| neighbor)
            .collect();
        for child in children {
            self.send(child, Message::Initiate { level, name, state })?;
            if state == NodeState::Find {
                self.find_count += 1;
            }
        }
        if state == NodeState::Find {
            self.probe()?;
        }
        Ok(())
    }

    fn handle_test(&mut self, from: NodeId, their_level: Level, their_name: Weight) -> Result<()> {
        if self.state == NodeState::Sleeping {
            self.wakeup()?;
        }
        if self.level < their_level {
            // We may rise in level and then answer correctly.
            return self.postpone(from, Message::Test { level: their_level, name: their_name });
        }
        let name = self.fragment_name()?;
        if name != their_name {
            // Different fragment. The channel stays unclassified on purpose:
            // this very edge may still become our minimum outgoing edge.
            self.send(from, Message::Accept)
        } else {
            if self.status_of(from)? == ChannelStatus::Basic {
                self.set_status(from, ChannelStatus::Reject)?;
            }
            if self.test_edge != Some(from) {
                self.send(from, Message::Reject)
            } else {
                // Both ends probed the same internal edge; skip the reply and
                // move on to the next candidate.
                self.probe()
            }
        }
    }

    fn handle_accept(&mut self, from: NodeId) -> Result<()> {
        self.test_edge = None;
        let weight = self.weight_of(from)?;
        if weight < self.best_wt {
            self.best_edge = Some(from);
            self.best_wt = weight;
        }
        self.report()
    }

    fn handle_reject(&mut self, from: NodeId) -> Result<()> {
        if self.status_of(from)? == ChannelStatus::Basic {
            self.set_status(from, ChannelStatus::Reject)?;
        }
        self.probe()
    }

    fn handle_report(&mut self, from: NodeId, their_best: Weight) -> Result<()> {
        if self.status_of(from)? != ChannelStatus::Branch {
            return Err(self.violation("REPORT received on an edge that is not a branch"));
        }
        if Some(from) != self.in_branch {
            // Child report.
            self.find_count = self
                .find_count
                .checked_sub(1)
                .ok_or_else(|| self.violation("find_count underflow"))?;
            if their_best < self.best_wt {
                self.best_wt = their_best;
                self.best_edge = Some(from);
            }
            self.report()
        } else if self.state == NodeState::Find {
            // Report from the far side of the core: our own subtree first.
            self.postpone(from, Message::Report { best: their_best })
        } else if their_best > self.best_wt {
            self.change_root()
        } else if their_best == INFINITE_WEIGHT {
            // Both core endpoints found no outgoing edge: the tree is complete.
            debug!(node = self.id.index(), "halt");
            self.events.send(CollectorEvent::Halt)?;
            Ok(())
        } else {
            // Equal finite weights cannot happen with distinct weights; a
            // strictly better far side means the merge is driven from there.
            Ok(())
        }
    }

    /// Probes the cheapest unclassified edge, or reports if none is left.
    fn probe(&mut self) -> Result<()> {
        match self.min_basic_edge() {
            Some((edge, _)) => {
                self.test_edge = Some(edge);
                let name = self.fragment_name()?;
                debug!(node = self.id.index(), edge = edge.index(), "probe");
                self.send(
                    edge,
                    Message::Test {
                        level: self.level,
                        name,
                    },
                )
            }
            None => {
                self.test_edge = None;
                self.report()
            }
        }
    }

    /// Sends the subtree's best weight upward once all children reported and
    /// no probe is outstanding.
    fn report(&mut self) -> Result<()> {
        if self.find_count == 0 && self.test_edge.is_none() {
            self.state = NodeState::Found;
            let parent = self
                .in_branch
                .ok_or_else(|| self.violation("report with no in_branch"))?;
            debug!(node = self.id.index(), best = self.best_wt.0, "report");
            self.send(parent, Message::Report { best: self.best_wt })?;
        }
        Ok(())
    }

    /// Walks toward the fragment's minimum outgoing edge; the node adjacent to
    /// it adopts the edge and proposes the merge.
    fn change_root(&mut self) -> Result<()> {
        let best = self
            .best_edge
            .ok_or_else(|| self.violation("change-root with no best edge"))?;
        debug!(node = self.id.index(), best = best.index(), "change root");
        if self.status_of(best)? == ChannelStatus::Branch {
            self.send(best, Message::ChangeRoot)
        } else {
            self.send(best, Message::Connect { level: self.level })?;
            self.set_status(best, ChannelStatus::Branch)?;
            let weight = self.weight_of(best)?;
            self.adopt(best, weight)
        }
    }

    fn postpone(&self, from: NodeId, message: Message) -> Result<()> {
        debug!(
            node = self.id.index(),
            from = from.index(),
            kind = message.kind(),
            "postpone"
        );
        self.loopback.send(Packet::Protocol { from, message })?;
        // Give other threads a chance to produce the state change this message
        // is waiting for.
        thread::yield_now();
        Ok(())
    }

    fn send(&self, to: NodeId, message: Message) -> Result<()> {
        self.fabric.send(self.id, to, message)
    }

    fn adopt(&self, edge: NodeId, weight: Weight) -> Result<()> {
        debug!(
            node = self.id.index(),
            edge = edge.index(),
            weight = weight.0,
            "adopt edge"
        );
        self.events.send(CollectorEvent::EdgeAdopted {
            u: self.id,
            v: edge,
            weight,
        })?;
        Ok(())
    }

    fn min_basic_edge(&self) -> Option<(NodeId, Weight)> {
        self.weights
            .iter()
            .filter(|(neighbor, _)| self.status.get(*neighbor) == Some(&ChannelStatus::Basic))
            .min_by_key(|&(_, &weight)| weight)
            .map(|(&neighbor, &weight)| (neighbor, weight))
    }

    fn status_of(&self, neighbor: NodeId) -> Result<ChannelStatus> {
        self.status
            .get(&neighbor)
            .copied()
            .ok_or_else(|| self.violation(format!("no channel toward node {}", neighbor.index())))
    }

    /// Classifies a channel, enforcing that `Branch` and `Reject` are final.
    fn set_status(&mut self, neighbor: NodeId, next: ChannelStatus) -> Result<()> {
        let current = self.status_of(neighbor)?;
        if current != ChannelStatus::Basic && current != next {
            return Err(self.violation(format!(
                "illegal channel transition {:?} -> {:?} toward node {}",
                current,
                next,
                neighbor.index()
            )));
        }
        self.status.insert(neighbor, next);
        Ok(())
    }

    fn weight_of(&self, neighbor: NodeId) -> Result<Weight> {
        self.weights
            .get(&neighbor)
            .copied()
            .ok_or_else(|| self.violation(format!("no edge toward node {}", neighbor.index())))
    }

    fn fragment_name(&self) -> Result<Weight> {
        self.fragment_name
            .ok_or_else(|| self.violation("fragment name required but still undefined"))
    }

    fn violation(&self, message: impl Into<String>) -> FragmentaError {
        FragmentaError::protocol(
            self.id.index(),
            format!(
                "{} (state {:?}, level {}, find_count {})",
                message.into(),
                self.state,
                self.level,
                self.find_count
            ),
        )
    }

    fn summarize(&self) -> NodeSummary {
        let mut classified: Vec<(NodeId, ChannelStatus)> =
            self.status.iter().map(|(&n, &s)| (n, s)).collect();
        classified.sort_by_key(|(n, _)| n.index());
        let by_status = |wanted: ChannelStatus| -> Vec<NodeId> {
            classified
                .iter()
                .filter(|&&(_, s)| s == wanted)
                .map(|&(n, _)| n)
                .collect()
        };
        NodeSummary {
            id: self.id,
            state: self.state,
            level: self.level,
            fragment_name: self.fragment_name,
            best_wt: self.best_wt,
            find_count: self.find_count,
            test_edge: self.test_edge,
            branches: by_status(ChannelStatus::Branch),
            rejected: by_status(ChannelStatus::Reject),
            unclassified: by_status(ChannelStatus::Basic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use ordered_float::OrderedFloat;

    fn id(i: usize) -> NodeId {
        NodeId::from_index(i)
    }

    fn agent_with_neighbors(
        node: usize,
        neighbors: &[(usize, f64)],
        n: usize,
    ) -> (
        NodeAgent,
        Vec<Receiver<Packet>>,
        Receiver<CollectorEvent>,
    ) {
        let (fabric, receivers) = Fabric::new(n);
        let inbox = receivers[node].clone();
        let (event_tx, event_rx) = unbounded();
        let weights = neighbors
            .iter()
            .map(|&(i, w)| (id(i), OrderedFloat(w)))
            .collect();
        let agent = NodeAgent::new(id(node), weights, inbox, fabric, event_tx).unwrap();
        (agent, receivers, event_rx)
    }

    fn next_message(rx: &Receiver<Packet>) -> Message {
        match rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("timed out waiting for message")
        {
            Packet::Protocol { message, .. } => message,
            Packet::Shutdown => panic!("unexpected shutdown"),
        }
    }

    #[test]
    fn test_wakeup_adopts_cheapest_edge() {
        let (mut agent, receivers, events) =
            agent_with_neighbors(0, &[(1, 7.0), (2, 3.0)], 3);
        agent.wakeup().unwrap();

        assert_eq!(agent.state, NodeState::Found);
        assert_eq!(agent.level, 0);
        assert_eq!(agent.status_of(id(2)).unwrap(), ChannelStatus::Branch);
        assert_eq!(agent.status_of(id(1)).unwrap(), ChannelStatus::Basic);

        // Connect(0) goes out over the cheapest edge.
        assert_eq!(
            next_message(&receivers[1]),
            Message::Connect { level: 0 }
        );
        match events.recv_timeout(std::time::Duration::from_secs(5)).expect("timed out waiting for event") {
            CollectorEvent::EdgeAdopted { u, v, weight } => {
                assert_eq!((u.index(), v.index()), (0, 2));
                assert_eq!(weight, OrderedFloat(3.0));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_equal_level_connect_over_basic_channel_is_postponed() {
        let (mut agent, _receivers, _events) =
            agent_with_neighbors(0, &[(1, 1.0), (2, 2.0)], 3);
        agent.wakeup().unwrap();

        // Node 2 proposes at our level over a still-unclassified channel.
        agent.handle_connect(id(2), 0).unwrap();

        // The proposal must sit at the tail of our own inbox, untouched.
        match agent.inbox.try_recv().unwrap() {
            Packet::Protocol { from, message } => {
                assert_eq!(from, id(2));
                assert_eq!(message, Message::Connect { level: 0 });
            }
            other => panic!("unexpected packet: {:?}", other),
        }
        assert_eq!(agent.status_of(id(2)).unwrap(), ChannelStatus::Basic);
    }

    #[test]
    fn test_symmetric_connect_raises_level_and_names_fragment() {
        let (mut agent, receivers, _events) =
            agent_with_neighbors(0, &[(1, 4.0), (2, 9.0)], 3);
        agent.wakeup().unwrap();
        drop(next_message(&receivers[1])); // our own Connect(0)

        // Node 1 answers with its own Connect over the now-branch edge.
        agent.handle_connect(id(1), 0).unwrap();
        assert_eq!(
            next_message(&receivers[1]),
            Message::Initiate {
                level: 1,
                name: OrderedFloat(4.0),
                state: NodeState::Find,
            }
        );
    }

    #[test]
    fn test_lower_level_connect_is_absorbed() {
        let (mut agent, receivers, events) =
            agent_with_neighbors(0, &[(1, 1.0), (2, 5.0)], 3);
        agent.wakeup().unwrap();
        drop(next_message(&receivers[1]));
        drop(events.recv_timeout(std::time::Duration::from_secs(5)).expect("timed out waiting for event"));

        // Pretend the merge already happened and we sit at level 1.
        agent
            .handle_initiate(id(1), 1, OrderedFloat(1.0), NodeState::Found)
            .unwrap();

        agent.handle_connect(id(2), 0).unwrap();
        assert_eq!(agent.status_of(id(2)).unwrap(), ChannelStatus::Branch);
        assert_eq!(
            next_message(&receivers[2]),
            Message::Initiate {
                level: 1,
                name: OrderedFloat(1.0),
                state: NodeState::Found,
            }
        );
        match events.recv_timeout(std::time::Duration::from_secs(5)).expect("timed out waiting for event") {
            CollectorEvent::EdgeAdopted { u, v, .. } => {
                assert_eq!((u.index(), v.index()), (0, 2));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_find_initiate_starts_probe_on_cheapest_basic_edge() {
        let (mut agent, receivers, _events) =
            agent_with_neighbors(0, &[(1, 1.0), (2, 5.0), (3, 2.0)], 4);
        agent.wakeup().unwrap();
        drop(next_message(&receivers[1]));

        agent
            .handle_initiate(id(1), 1, OrderedFloat(1.0), NodeState::Find)
            .unwrap();
        assert_eq!(agent.test_edge, Some(id(3)));
        assert_eq!(
            next_message(&receivers[3]),
            Message::Test {
                level: 1,
                name: OrderedFloat(1.0),
            }
        );
    }

    #[test]
    fn test_report_on_non_branch_edge_is_a_violation() {
        let (mut agent, receivers, _events) =
            agent_with_neighbors(0, &[(1, 1.0), (2, 5.0)], 3);
        agent.wakeup().unwrap();
        drop(next_message(&receivers[1]));

        let err = agent
            .handle_report(id(2), OrderedFloat(2.0))
            .unwrap_err();
        assert!(matches!(err, FragmentaError::Protocol { node: 0, .. }));
    }

    #[test]
    fn test_rejected_channel_is_final() {
        let (mut agent, receivers, _events) =
            agent_with_neighbors(0, &[(1, 1.0), (2, 5.0)], 3);
        agent.wakeup().unwrap();
        drop(next_message(&receivers[1]));
        agent.set_status(id(2), ChannelStatus::Reject).unwrap();
        let err = agent
            .set_status(id(2), ChannelStatus::Branch)
            .unwrap_err();
        assert!(matches!(err, FragmentaError::Protocol { .. }));
    }
}
