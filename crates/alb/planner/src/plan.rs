//! Topology plan snapshot

use alb_types::{
    BoundaryResource, ListenerResource, LoadBalancerResource, SecurityRule, TargetGroupResource,
};
use serde::{Deserialize, Serialize};

/// Everything one session planned for one load balancer, in creation order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyPlan {
    pub load_balancer: LoadBalancerResource,
    pub boundary: BoundaryResource,
    pub rules: Vec<SecurityRule>,
    pub target_groups: Vec<TargetGroupResource>,
    pub listeners: Vec<ListenerResource>,
}

impl TopologyPlan {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn listener_on(&self, port: u16) -> Option<&ListenerResource> {
        self.listeners.iter().find(|l| l.port() == port)
    }

    pub fn target_group(&self, name: &str) -> Option<&TargetGroupResource> {
        self.target_groups.iter().find(|tg| tg.descriptor.name == name)
    }

    /// Listener ports, sorted
    pub fn ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = self.listeners.iter().map(|l| l.port()).collect();
        ports.sort_unstable();
        ports
    }
}
