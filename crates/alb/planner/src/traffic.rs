//! Traffic policy resolution

use alb_types::{NetworkContext, Peer, TrafficPolicy};

/// Map a traffic intent to the peer a security rule should name.
///
/// `TrafficPolicy::None` resolves to no peer: nothing is opened.
pub fn resolve(policy: TrafficPolicy, network: &NetworkContext) -> Option<Peer> {
    match policy {
        TrafficPolicy::Internet => Some(Peer::AnyIpv4),
        TrafficPolicy::VpcOnly => Some(Peer::ipv4(network.cidr)),
        TrafficPolicy::None => None,
    }
}
