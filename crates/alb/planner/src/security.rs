//! Security policy of one load balancer boundary
//!
//! A policy starts unlocked and collects rules while the topology is being
//! planned. Once planning completes it is locked, and every later attempt to
//! widen the perimeter fails with [`PlanError::PolicyLocked`].

use crate::error::{PlanError, Result};
use alb_types::{BoundaryId, Direction, Peer, SecurityRule};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PolicyState {
    Unlocked,
    Locked,
}

/// Outcome of [`SecurityPolicy::open_port`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleInsert {
    /// The rule was new
    Added,
    /// An identical rule already existed; nothing changed
    AlreadyPresent,
}

/// Rule set of one boundary
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    boundary: BoundaryId,
    rules: Vec<SecurityRule>,
    state: PolicyState,
}

impl SecurityPolicy {
    pub fn new(boundary: BoundaryId) -> Self {
        Self {
            boundary,
            rules: Vec::new(),
            state: PolicyState::Unlocked,
        }
    }

    pub fn boundary(&self) -> &BoundaryId {
        &self.boundary
    }

    /// Fails with [`PlanError::PolicyLocked`] once the policy is locked
    pub fn ensure_unlocked(&self) -> Result<()> {
        if self.state == PolicyState::Locked {
            return Err(PlanError::PolicyLocked {
                boundary: self.boundary.clone(),
            });
        }
        Ok(())
    }

    /// Allow TCP traffic on `port` from (ingress) or to (egress) `peer`.
    ///
    /// Peers are compared by the range they cover, so a duplicate rule is a
    /// no-op even when spelled with host bits. Fails if the policy is locked,
    /// whatever the arguments, or if `port` is 0.
    pub fn open_port(&mut self, port: u16, peer: Peer, direction: Direction) -> Result<RuleInsert> {
        self.ensure_unlocked()?;
        if port == 0 {
            return Err(PlanError::InvalidPort(port));
        }

        let peer = peer.canonical();
        let rule = SecurityRule::new(port, peer, direction);
        if self.rules.contains(&rule) {
            debug!(boundary = %self.boundary, rule = %rule.description(), "Rule already present");
            return Ok(RuleInsert::AlreadyPresent);
        }

        debug!(
            boundary = %self.boundary,
            port = port,
            peer = %peer,
            direction = %direction,
            "Rule added"
        );
        self.rules.push(rule);
        Ok(RuleInsert::Added)
    }

    /// Finalize the rule set. Irreversible.
    pub fn lock(&mut self) {
        if self.state == PolicyState::Unlocked {
            info!(boundary = %self.boundary, rules = self.rules.len(), "Security policy locked");
        }
        self.state = PolicyState::Locked;
    }

    pub fn is_locked(&self) -> bool {
        self.state == PolicyState::Locked
    }

    /// Rules in insertion order
    pub fn rules(&self) -> &[SecurityRule] {
        &self.rules
    }

    pub fn contains(&self, rule: &SecurityRule) -> bool {
        self.rules.contains(rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> SecurityPolicy {
        SecurityPolicy::new(BoundaryId::new("sg-1"))
    }

    #[test]
    fn test_open_port_adds_rule() {
        let mut policy = policy();
        let result = policy.open_port(443, Peer::AnyIpv4, Direction::Ingress).unwrap();

        assert_eq!(result, RuleInsert::Added);
        assert!(policy.contains(&SecurityRule::new(443, Peer::AnyIpv4, Direction::Ingress)));
        assert_eq!(policy.len(), 1);
    }

    #[test]
    fn test_duplicate_is_noop() {
        let mut policy = policy();
        policy.open_port(80, Peer::AnyIpv4, Direction::Ingress).unwrap();
        let again = policy.open_port(80, Peer::AnyIpv4, Direction::Ingress).unwrap();

        assert_eq!(again, RuleInsert::AlreadyPresent);
        assert_eq!(policy.len(), 1);
    }

    #[test]
    fn test_direction_distinguishes_rules() {
        let mut policy = policy();
        policy.open_port(80, Peer::AnyIpv4, Direction::Ingress).unwrap();
        policy.open_port(80, Peer::AnyIpv4, Direction::Egress).unwrap();
        assert_eq!(policy.len(), 2);
    }

    #[test]
    fn test_same_range_is_one_rule() {
        let mut policy = policy();
        let exact = Peer::ipv4("10.0.0.0/16".parse().unwrap());
        let host_bits = Peer::Ipv4("10.0.0.7/16".parse().unwrap());

        assert_eq!(policy.open_port(443, exact, Direction::Ingress).unwrap(), RuleInsert::Added);
        assert_eq!(
            policy.open_port(443, host_bits, Direction::Ingress).unwrap(),
            RuleInsert::AlreadyPresent
        );
        assert_eq!(policy.rules(), &[SecurityRule::new(443, exact, Direction::Ingress)]);
    }

    #[test]
    fn test_port_zero_rejected() {
        let mut policy = policy();
        let result = policy.open_port(0, Peer::AnyIpv4, Direction::Ingress);
        assert!(matches!(result, Err(PlanError::InvalidPort(0))));
        assert!(policy.is_empty());
    }

    #[test]
    fn test_locked_policy_rejects_everything() {
        let mut policy = policy();
        policy.open_port(80, Peer::AnyIpv4, Direction::Ingress).unwrap();
        policy.lock();

        assert!(policy.is_locked());
        assert!(policy.ensure_unlocked().unwrap_err().is_policy_locked());
        // Even a duplicate of an existing rule fails once locked
        let dup = policy.open_port(80, Peer::AnyIpv4, Direction::Ingress);
        assert!(dup.as_ref().unwrap_err().is_policy_locked());
        // ...and so does an otherwise invalid call
        let invalid = policy.open_port(0, Peer::AnyIpv4, Direction::Ingress);
        assert!(invalid.unwrap_err().is_policy_locked());
        assert_eq!(policy.len(), 1);
    }

    #[test]
    fn test_lock_is_idempotent() {
        let mut policy = policy();
        policy.lock();
        policy.lock();
        assert!(policy.is_locked());
    }
}
