//! Planning context - the explicit state every planner call works against
//!
//! Nothing in this crate holds ambient state. The network, the resource
//! sink and the boundary's security policy are handed to each planner call
//! through a `PlanningContext`, which also records every resource the sink
//! hands back so a failed call still reports what it created.

use crate::error::Result;
use crate::security::{RuleInsert, SecurityPolicy};
use crate::sink::ResourceSink;
use alb_types::{
    Direction, ListenerResource, NetworkContext, Peer, SecurityRule, TargetGroupResource,
};
use tracing::debug;

/// Borrowed state for one planning pass over one boundary
pub struct PlanningContext<'a> {
    network: &'a NetworkContext,
    sink: &'a dyn ResourceSink,
    policy: &'a mut SecurityPolicy,
    created: CreatedResources,
}

/// Resources the sink created during one planning pass, in creation order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatedResources {
    pub target_groups: Vec<TargetGroupResource>,
    pub listeners: Vec<ListenerResource>,
}

impl CreatedResources {
    pub fn is_empty(&self) -> bool {
        self.target_groups.is_empty() && self.listeners.is_empty()
    }
}

impl<'a> PlanningContext<'a> {
    pub fn new(
        network: &'a NetworkContext,
        sink: &'a dyn ResourceSink,
        policy: &'a mut SecurityPolicy,
    ) -> Self {
        Self {
            network,
            sink,
            policy,
            created: CreatedResources::default(),
        }
    }

    pub fn network(&self) -> &NetworkContext {
        self.network
    }

    pub fn sink(&self) -> &dyn ResourceSink {
        self.sink
    }

    pub fn policy(&self) -> &SecurityPolicy {
        self.policy
    }

    pub fn policy_mut(&mut self) -> &mut SecurityPolicy {
        self.policy
    }

    /// Fails with [`PlanError::PolicyLocked`](crate::PlanError::PolicyLocked)
    /// once the boundary is locked. Planners call this before touching the
    /// sink or the port pool.
    pub fn ensure_unlocked(&self) -> Result<()> {
        self.policy.ensure_unlocked()
    }

    pub fn record_target_group(&mut self, target_group: TargetGroupResource) {
        self.created.target_groups.push(target_group);
    }

    pub fn record_listener(&mut self, listener: ListenerResource) {
        self.created.listeners.push(listener);
    }

    pub fn created(&self) -> &CreatedResources {
        &self.created
    }

    /// Release the borrowed state, keeping what the sink created
    pub fn into_created(self) -> CreatedResources {
        self.created
    }

    /// Open a port on the policy and declare the rule to the sink.
    ///
    /// Only newly added rules reach the sink; a duplicate is reported as
    /// [`RuleInsert::AlreadyPresent`] and nothing is declared.
    pub fn open_port(&mut self, port: u16, peer: Peer, direction: Direction) -> Result<RuleInsert> {
        let peer = peer.canonical();
        let insert = self.policy.open_port(port, peer, direction)?;
        match insert {
            RuleInsert::Added => {
                self.sink.declare_security_rule(
                    self.policy.boundary(),
                    &SecurityRule::new(port, peer, direction),
                )?;
            }
            RuleInsert::AlreadyPresent => {
                debug!(port = port, peer = %peer, direction = %direction, "Rule already declared");
            }
        }
        Ok(insert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{InMemoryResourceSink, SinkOperation};
    use alb_types::{BoundaryId, VpcId};

    fn network() -> NetworkContext {
        NetworkContext::new(VpcId::new("vpc-1"), "10.0.0.0/16".parse().unwrap())
    }

    #[test]
    fn test_open_port_declares_new_rules_once() {
        let sink = InMemoryResourceSink::new();
        let network = network();
        let boundary = BoundaryId::new("sg-1");
        let mut policy = SecurityPolicy::new(boundary.clone());
        let mut ctx = PlanningContext::new(&network, &sink, &mut policy);

        let first = ctx.open_port(443, Peer::AnyIpv4, Direction::Ingress).unwrap();
        let second = ctx.open_port(443, Peer::AnyIpv4, Direction::Ingress).unwrap();

        assert_eq!(first, RuleInsert::Added);
        assert_eq!(second, RuleInsert::AlreadyPresent);
        assert_eq!(sink.rules_for(&boundary).len(), 1);
    }

    #[test]
    fn test_open_port_sink_failure_keeps_policy_rule() {
        let sink = InMemoryResourceSink::new();
        sink.fail_on(SinkOperation::DeclareSecurityRule);
        let network = network();
        let mut policy = SecurityPolicy::new(BoundaryId::new("sg-1"));
        let mut ctx = PlanningContext::new(&network, &sink, &mut policy);

        assert!(ctx.open_port(80, Peer::AnyIpv4, Direction::Ingress).is_err());
        // The policy records intent; applying it is the sink's job
        assert_eq!(policy.len(), 1);
    }

    #[test]
    fn test_open_port_declares_canonical_peer() {
        let sink = InMemoryResourceSink::new();
        let network = network();
        let boundary = BoundaryId::new("sg-1");
        let mut policy = SecurityPolicy::new(boundary.clone());
        let mut ctx = PlanningContext::new(&network, &sink, &mut policy);

        let raw = Peer::Ipv4("10.0.0.7/16".parse().unwrap());
        ctx.open_port(443, raw, Direction::Ingress).unwrap();
        let again = ctx.open_port(443, Peer::ipv4(network.cidr), Direction::Ingress).unwrap();

        assert_eq!(again, RuleInsert::AlreadyPresent);
        assert_eq!(
            sink.rules_for(&boundary),
            vec![SecurityRule::new(443, Peer::ipv4(network.cidr), Direction::Ingress)]
        );
    }

    #[test]
    fn test_ensure_unlocked_follows_policy() {
        let sink = InMemoryResourceSink::new();
        let network = network();
        let mut policy = SecurityPolicy::new(BoundaryId::new("sg-1"));

        let ctx = PlanningContext::new(&network, &sink, &mut policy);
        assert!(ctx.ensure_unlocked().is_ok());
        assert!(ctx.into_created().is_empty());

        policy.lock();
        let ctx = PlanningContext::new(&network, &sink, &mut policy);
        assert!(ctx.ensure_unlocked().unwrap_err().is_policy_locked());
    }
}
