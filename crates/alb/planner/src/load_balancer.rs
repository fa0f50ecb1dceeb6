//! Load balancer provisioning and the planning session
//!
//! `LoadBalancerPlanner::provision` creates the planner-owned security
//! boundary and the load balancer, then hands back a `LoadBalancerSession`.
//! The session owns every piece of mutable planning state for that load
//! balancer (boundary policy, lane port pool, recorded resources), so two
//! sessions never interfere with each other.

use crate::blue_green::{BlueGreenOrchestrator, BlueGreenPair};
use crate::config::PlannerConfig;
use crate::context::{CreatedResources, PlanningContext};
use crate::defaults::{DefaultListeners, DefaultTopologyBuilder};
use crate::error::{PlanError, Result};
use crate::listener;
use crate::plan::TopologyPlan;
use crate::security::{RuleInsert, SecurityPolicy};
use crate::sink::ResourceSink;
use crate::target_group;
use alb_types::{
    BoundaryResource, CertificateRef, Direction, ListenerResource, ListenerSpec,
    LoadBalancerDescriptor, LoadBalancerResource, LoadBalancerSpec, NetworkContext, Peer,
    SecurityBoundaryDescriptor, TargetGroupResource, TargetGroupSpec,
};
use tracing::{debug, info, instrument};

const OPERATION: &str = "provision";

/// Name of the planner-owned security boundary
pub fn boundary_name(prefix: &str) -> String {
    format!("{}AppLoadBalancerSG", prefix)
}

/// Name of the load balancer
pub fn load_balancer_name(prefix: &str) -> String {
    format!("{}AppLoadBalancer", prefix)
}

/// Entry point: provisions load balancers against one sink
pub struct LoadBalancerPlanner<'s> {
    sink: &'s dyn ResourceSink,
    config: PlannerConfig,
}

impl<'s> LoadBalancerPlanner<'s> {
    /// Create a planner; the configuration is validated up front
    pub fn new(sink: &'s dyn ResourceSink, config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { sink, config })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Create the boundary and the load balancer, and open a session on them
    #[instrument(skip(self, spec), fields(prefix = %spec.prefix, scheme = spec.scheme.as_str()))]
    pub fn provision(&self, spec: LoadBalancerSpec) -> Result<LoadBalancerSession<'s>> {
        if spec.prefix.is_empty() {
            return Err(PlanError::precondition(
                OPERATION,
                "load balancer prefix may not be empty",
            ));
        }

        let boundary_descriptor = SecurityBoundaryDescriptor {
            name: boundary_name(&spec.prefix),
            description: format!("A {} load balancer security group.", spec.prefix),
            vpc: spec.network.vpc_id.clone(),
            allow_all_outbound: false,
        };
        let boundary_id = self.sink.create_security_boundary(&boundary_descriptor)?;

        let mut boundaries = spec.extra_boundaries.clone();
        boundaries.push(boundary_id.clone());
        let load_balancer_descriptor = LoadBalancerDescriptor {
            name: load_balancer_name(&spec.prefix),
            scheme: spec.scheme,
            subnets: spec.subnets.clone(),
            boundaries,
        };
        let load_balancer_id = self.sink.create_load_balancer(&load_balancer_descriptor)?;

        info!(
            boundary_id = %boundary_id,
            load_balancer_id = %load_balancer_id,
            subnets = load_balancer_descriptor.subnets.len(),
            "Load balancer provisioned"
        );

        Ok(LoadBalancerSession {
            sink: self.sink,
            prefix: spec.prefix,
            network: spec.network,
            policy: SecurityPolicy::new(boundary_id.clone()),
            orchestrator: BlueGreenOrchestrator::from_config(&self.config),
            defaults: DefaultTopologyBuilder::from_config(&self.config),
            config: self.config.clone(),
            boundary: BoundaryResource {
                id: boundary_id,
                descriptor: boundary_descriptor,
            },
            load_balancer: LoadBalancerResource {
                id: load_balancer_id,
                descriptor: load_balancer_descriptor,
            },
            target_groups: Vec::new(),
            listeners: Vec::new(),
        })
    }
}

/// Planning state of one provisioned load balancer
pub struct LoadBalancerSession<'s> {
    sink: &'s dyn ResourceSink,
    prefix: String,
    network: NetworkContext,
    policy: SecurityPolicy,
    orchestrator: BlueGreenOrchestrator,
    defaults: DefaultTopologyBuilder,
    config: PlannerConfig,
    boundary: BoundaryResource,
    load_balancer: LoadBalancerResource,
    target_groups: Vec<TargetGroupResource>,
    listeners: Vec<ListenerResource>,
}

impl<'s> LoadBalancerSession<'s> {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn network(&self) -> &NetworkContext {
        &self.network
    }

    pub fn load_balancer(&self) -> &LoadBalancerResource {
        &self.load_balancer
    }

    pub fn boundary(&self) -> &BoundaryResource {
        &self.boundary
    }

    pub fn policy(&self) -> &SecurityPolicy {
        &self.policy
    }

    pub fn is_finalized(&self) -> bool {
        self.policy.is_locked()
    }

    /// Ports left in the lane pool
    pub fn remaining_ports(&self) -> usize {
        self.orchestrator.remaining_ports()
    }

    /// Listener template bound to this load balancer with the configured
    /// traffic defaults
    pub fn listener_template(&self, name: impl Into<String>) -> ListenerSpec {
        ListenerSpec::new(name, self.load_balancer.id.clone())
            .with_inbound(self.config.traffic.inbound)
            .with_outbound(self.config.traffic.outbound)
    }

    /// Target group template in this load balancer's network
    pub fn target_group_template(&self, name: impl Into<String>) -> TargetGroupSpec {
        TargetGroupSpec::new(name, self.network.vpc_id.clone())
    }

    /// Open a port on the boundary directly
    pub fn open_port(&mut self, port: u16, peer: Peer, direction: Direction) -> Result<RuleInsert> {
        let mut ctx = PlanningContext::new(&self.network, self.sink, &mut self.policy);
        ctx.open_port(port, peer, direction)
    }

    pub fn plan_target_group(&mut self, spec: &TargetGroupSpec) -> Result<TargetGroupResource> {
        let mut ctx = PlanningContext::new(&self.network, self.sink, &mut self.policy);
        let result = target_group::plan_target_group(&mut ctx, spec);
        let created = ctx.into_created();
        self.record(created);
        result
    }

    pub fn plan_listener(&mut self, spec: &ListenerSpec) -> Result<ListenerResource> {
        let mut ctx = PlanningContext::new(&self.network, self.sink, &mut self.policy);
        let result = listener::plan_listener(&mut ctx, spec);
        let created = ctx.into_created();
        self.record(created);
        result
    }

    /// Build the production/deployment listener pairs, HTTPS when a
    /// certificate is given
    pub fn default_listeners(
        &mut self,
        certificate: Option<&CertificateRef>,
    ) -> Result<DefaultListeners> {
        let mut ctx = PlanningContext::new(&self.network, self.sink, &mut self.policy);
        let result = self.defaults.build(
            &mut ctx,
            &self.prefix,
            &self.load_balancer.id,
            certificate,
        );
        let created = ctx.into_created();
        self.record(created);
        result
    }

    /// Build a blue/green lane pair from the two templates
    pub fn blue_green(
        &mut self,
        listener_template: &ListenerSpec,
        target_group_template: &TargetGroupSpec,
    ) -> Result<BlueGreenPair> {
        let mut ctx = PlanningContext::new(&self.network, self.sink, &mut self.policy);
        let result = self.orchestrator.create_blue_green(
            &mut ctx,
            listener_template,
            target_group_template,
        );
        let created = ctx.into_created();
        self.record(created);
        result
    }

    /// Lock the boundary policy and snapshot everything planned so far.
    ///
    /// Idempotent. Any later planning call fails with
    /// [`PlanError::PolicyLocked`].
    pub fn finalize(&mut self) -> TopologyPlan {
        self.policy.lock();

        info!(
            load_balancer_id = %self.load_balancer.id,
            rules = self.policy.len(),
            target_groups = self.target_groups.len(),
            listeners = self.listeners.len(),
            "Topology finalized"
        );

        TopologyPlan {
            load_balancer: self.load_balancer.clone(),
            boundary: self.boundary.clone(),
            rules: self.policy.rules().to_vec(),
            target_groups: self.target_groups.clone(),
            listeners: self.listeners.clone(),
        }
    }

    // Whatever the sink created is kept, even when the call failed later on
    fn record(&mut self, created: CreatedResources) {
        if !created.is_empty() {
            debug!(
                target_groups = created.target_groups.len(),
                listeners = created.listeners.len(),
                "Recording created resources"
            );
        }
        self.target_groups.extend(created.target_groups);
        self.listeners.extend(created.listeners);
    }
}
