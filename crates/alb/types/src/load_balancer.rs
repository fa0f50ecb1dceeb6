//! Load balancer definitions

use crate::ids::{BoundaryId, SubnetId};
use crate::traffic::NetworkContext;
use serde::{Deserialize, Serialize};

/// Whether the load balancer is reachable from the internet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancerScheme {
    /// Public, reachable from the internet
    #[default]
    Public,
    /// Internal, reachable from inside the network only
    Internal,
}

impl LoadBalancerScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadBalancerScheme::Public => "internet-facing",
            LoadBalancerScheme::Internal => "internal",
        }
    }
}

/// Everything needed to provision one load balancer boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancerSpec {
    /// Prefix for every resource created for this load balancer
    pub prefix: String,

    /// Network the load balancer is placed in
    pub network: NetworkContext,

    /// Subnets the load balancer may use
    pub subnets: Vec<SubnetId>,

    /// Additional boundaries attached before the planner-owned one
    pub extra_boundaries: Vec<BoundaryId>,

    /// Public or internal
    pub scheme: LoadBalancerScheme,
}

impl LoadBalancerSpec {
    pub fn new(prefix: impl Into<String>, network: NetworkContext) -> Self {
        Self {
            prefix: prefix.into(),
            network,
            subnets: Vec::new(),
            extra_boundaries: Vec::new(),
            scheme: LoadBalancerScheme::Public,
        }
    }

    pub fn with_subnets(mut self, subnets: impl IntoIterator<Item = SubnetId>) -> Self {
        self.subnets = subnets.into_iter().collect();
        self
    }

    pub fn with_extra_boundary(mut self, boundary: BoundaryId) -> Self {
        self.extra_boundaries.push(boundary);
        self
    }

    pub fn with_scheme(mut self, scheme: LoadBalancerScheme) -> Self {
        self.scheme = scheme;
        self
    }
}
