//! Resource descriptors handed to a provisioning backend
//!
//! A descriptor is the fully resolved form of a template: every default has
//! been applied and every reference points at something that already
//! exists. A `*Resource` pairs a descriptor with the handle the backend
//! returned for it.

use crate::action::{ActionSpec, Protocol};
use crate::ids::{
    BoundaryId, CertificateRef, ListenerId, LoadBalancerId, SubnetId, TargetGroupId, VpcId,
};
use crate::load_balancer::LoadBalancerScheme;
use crate::target_group::TargetType;
use crate::traffic::{Direction, Peer};
use serde::{Deserialize, Serialize};

/// Single-port TCP firewall rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityRule {
    pub port: u16,
    pub peer: Peer,
    pub direction: Direction,
}

impl SecurityRule {
    /// The peer is stored in canonical form
    pub fn new(port: u16, peer: Peer, direction: Direction) -> Self {
        Self {
            port,
            peer: peer.canonical(),
            direction,
        }
    }

    /// Human-readable rule description, e.g. `Ingress 443 rule.`
    pub fn description(&self) -> String {
        format!("{} {} rule.", self.direction, self.port)
    }
}

/// Security boundary (firewall perimeter) of one load balancer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityBoundaryDescriptor {
    pub name: String,
    pub description: String,
    pub vpc: VpcId,
    /// Always false for planner-owned boundaries: egress is opened per rule
    pub allow_all_outbound: bool,
}

/// Application load balancer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerDescriptor {
    pub name: String,
    pub scheme: LoadBalancerScheme,
    pub subnets: Vec<SubnetId>,
    pub boundaries: Vec<BoundaryId>,
}

impl LoadBalancerDescriptor {
    /// Load balancer type; this planner only builds application load balancers
    pub fn lb_type(&self) -> &'static str {
        "application"
    }
}

/// Target group with normalized health-check settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroupDescriptor {
    /// Logical id within the provisioning stack, e.g. `ApiBlueTargetGroup`
    pub logical_id: String,
    /// Target group name, e.g. `ApiBlue`
    pub name: String,
    pub port: u16,
    pub protocol: Protocol,
    pub vpc: VpcId,
    pub target_type: TargetType,
    pub health_check_path: String,
    /// Comma-joined healthy codes, e.g. `200,301`
    pub health_matcher: String,
}

/// Listener bound to a load balancer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerDescriptor {
    /// Logical id within the provisioning stack, e.g. `ApiHttpsListener20000`
    pub logical_id: String,
    pub load_balancer: LoadBalancerId,
    pub port: u16,
    pub protocol: Protocol,
    pub certificate: Option<CertificateRef>,
    pub default_action: ActionSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryResource {
    pub id: BoundaryId,
    pub descriptor: SecurityBoundaryDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerResource {
    pub id: LoadBalancerId,
    pub descriptor: LoadBalancerDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroupResource {
    pub id: TargetGroupId,
    pub descriptor: TargetGroupDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerResource {
    pub id: ListenerId,
    pub descriptor: ListenerDescriptor,
}

impl ListenerResource {
    pub fn port(&self) -> u16 {
        self.descriptor.port
    }

    pub fn protocol(&self) -> Protocol {
        self.descriptor.protocol
    }

    pub fn action(&self) -> &ActionSpec {
        &self.descriptor.default_action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_description() {
        let rule = SecurityRule::new(443, Peer::AnyIpv4, Direction::Ingress);
        assert_eq!(rule.description(), "Ingress 443 rule.");

        let rule = SecurityRule::new(80, Peer::AnyIpv4, Direction::Egress);
        assert_eq!(rule.description(), "Egress 80 rule.");
    }

    #[test]
    fn test_rule_peer_is_canonical() {
        let rule = SecurityRule::new(
            443,
            Peer::Ipv4("10.0.0.7/16".parse().unwrap()),
            Direction::Ingress,
        );
        assert_eq!(rule.peer.to_string(), "10.0.0.0/16");
        assert_eq!(
            rule,
            SecurityRule::new(443, Peer::ipv4("10.0.0.0/16".parse().unwrap()), Direction::Ingress)
        );
    }
}
