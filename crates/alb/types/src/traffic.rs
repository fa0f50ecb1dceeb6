//! Traffic intent and network peers

use crate::ids::VpcId;
use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who may talk to a listener (inbound) or be talked to by it (outbound)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficPolicy {
    /// Allow traffic to/from the whole internet
    Internet,
    /// Allow traffic to/from the load balancer's own network only
    VpcOnly,
    /// Do not open anything
    None,
}

/// Concrete address range used in a security rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Peer {
    /// Any IPv4 address
    AnyIpv4,
    /// A specific IPv4 range
    Ipv4(Ipv4Network),
}

impl Peer {
    /// Peer for the range `network` covers, with host bits cleared so that
    /// `10.0.0.7/16` and `10.0.0.0/16` name the same peer
    pub fn ipv4(network: Ipv4Network) -> Self {
        if network.prefix() == 0 {
            return Peer::AnyIpv4;
        }
        Peer::Ipv4(canonical_network(network))
    }

    /// The same peer in canonical form
    pub fn canonical(self) -> Self {
        match self {
            Peer::AnyIpv4 => Peer::AnyIpv4,
            Peer::Ipv4(network) => Peer::ipv4(network),
        }
    }
}

fn canonical_network(network: Ipv4Network) -> Ipv4Network {
    Ipv4Network::new(network.network(), network.prefix()).unwrap_or(network)
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Peer::AnyIpv4 => f.write_str("0.0.0.0/0"),
            Peer::Ipv4(network) => write!(f, "{}", network),
        }
    }
}

/// Traffic direction of a security rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ingress,
    Egress,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ingress => "Ingress",
            Direction::Egress => "Egress",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The network a load balancer is placed in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkContext {
    /// Network identifier
    pub vpc_id: VpcId,

    /// The network's own address range
    pub cidr: Ipv4Network,
}

impl NetworkContext {
    pub fn new(vpc_id: VpcId, cidr: Ipv4Network) -> Self {
        Self {
            vpc_id,
            cidr: canonical_network(cidr),
        }
    }
}
