//! ALB Types - Value types for blue/green load balancer topologies
//!
//! These types describe *what* a load balancer tier should look like. They
//! carry no planning logic; `alb-planner` consumes them and turns them into
//! resource descriptors handed to a provisioning backend.
//!
//! ## Key Concepts
//!
//! - **TrafficPolicy**: Intent for who may reach (or be reached by) a listener
//! - **Peer**: Concrete address range used in a security rule
//! - **ActionSpec**: What a listener does with a request (redirect, forward, fixed response)
//! - **ListenerSpec / TargetGroupSpec**: Templates a planner realizes
//! - **Lane**: One of the two symmetric serving paths (blue, green)
//! - **Descriptors**: Fully resolved resources handed to a resource sink

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod action;
pub mod ids;
pub mod lane;
pub mod listener;
pub mod load_balancer;
pub mod resource;
pub mod target_group;
pub mod traffic;

// Re-export main types
pub use action::{ActionSpec, FixedResponseConfig, Protocol, RedirectConfig};
pub use ids::{BoundaryId, CertificateRef, ListenerId, LoadBalancerId, SubnetId, TargetGroupId, VpcId};
pub use lane::Lane;
pub use listener::ListenerSpec;
pub use load_balancer::{LoadBalancerScheme, LoadBalancerSpec};
pub use resource::{
    BoundaryResource, ListenerDescriptor, ListenerResource, LoadBalancerDescriptor,
    LoadBalancerResource, SecurityBoundaryDescriptor, SecurityRule, TargetGroupDescriptor,
    TargetGroupResource,
};
pub use target_group::{TargetGroupSpec, TargetType};
pub use traffic::{Direction, NetworkContext, Peer, TrafficPolicy};
