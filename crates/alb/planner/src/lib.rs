//! ALB Planner - blue/green topology planning for application load balancers
//!
//! Turns listener and target group templates into fully resolved resource
//! descriptors and hands them to a [`ResourceSink`]. The planner decides
//! names, ports, actions and firewall rules; the sink owns creating the
//! resources on a real backend.
//!
//! ## Architectural Boundaries
//!
//! - `alb-types` owns: templates, descriptors and identifiers
//! - `alb-planner` owns: naming, port allocation, action wiring, security rules
//! - the `ResourceSink` implementation owns: idempotency, retries, apply order
//!   on the backend and compensation after a failed planning call
//!
//! ## Key Principle
//!
//! Planning is synchronous and holds no ambient state. Every mutable piece
//! (security policy, port pool) belongs to one [`LoadBalancerSession`] and
//! is passed explicitly to each planner through a [`PlanningContext`].
//!
//! ## Usage
//!
//! ```
//! use alb_planner::{InMemoryResourceSink, LoadBalancerPlanner, PlannerConfig};
//! use alb_types::{LoadBalancerSpec, NetworkContext, VpcId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sink = InMemoryResourceSink::new();
//! let planner = LoadBalancerPlanner::new(&sink, PlannerConfig::default())?;
//!
//! let network = NetworkContext::new(VpcId::new("vpc-1"), "10.0.0.0/16".parse()?);
//! let mut session = planner.provision(LoadBalancerSpec::new("Web", network))?;
//!
//! // Production/deployment listeners answer 404 until lanes are attached
//! session.default_listeners(None)?;
//!
//! let listener = session.listener_template("Api");
//! let target_group = session.target_group_template("Api").with_health_check_path("/health");
//! let pair = session.blue_green(&listener, &target_group)?;
//! assert_ne!(pair.blue.listener.port(), pair.green.listener.port());
//!
//! let plan = session.finalize();
//! println!("{}", plan.to_json_pretty()?);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod actions;
pub mod blue_green;
pub mod config;
pub mod context;
pub mod defaults;
pub mod error;
pub mod listener;
pub mod load_balancer;
pub mod plan;
pub mod ports;
pub mod security;
pub mod sink;
pub mod target_group;
pub mod traffic;

// Re-exports
pub use blue_green::{BlueGreenOrchestrator, BlueGreenPair, LaneResources};
pub use config::{
    ConfigError, DefaultTopologyConfig, LaneSuffixes, PlannerConfig, PortRangeConfig,
    TrafficDefaults,
};
pub use context::{CreatedResources, PlanningContext};
pub use defaults::{DefaultListeners, DefaultTopologyBuilder};
pub use error::{PlanError, Result};
pub use listener::plan_listener;
pub use load_balancer::{LoadBalancerPlanner, LoadBalancerSession};
pub use plan::TopologyPlan;
pub use ports::PortAllocator;
pub use security::{RuleInsert, SecurityPolicy};
pub use sink::{InMemoryResourceSink, ResourceSink, SinkError, SinkEvent, SinkOperation};
pub use target_group::plan_target_group;
pub use traffic::resolve;
