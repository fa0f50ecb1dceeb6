//! Resource sink - the provisioning backend boundary
//!
//! Planners never create live network objects themselves. They hand fully
//! resolved descriptors to a [`ResourceSink`], which owns idempotency,
//! retries and transactional apply for whatever backend it wraps.
//!
//! [`InMemoryResourceSink`] records everything it is given. It is suitable
//! for tests and dry runs; production callers implement the trait over
//! their provisioning API.

use alb_types::{
    BoundaryId, ListenerDescriptor, ListenerId, LoadBalancerDescriptor, LoadBalancerId,
    SecurityBoundaryDescriptor, SecurityRule, TargetGroupDescriptor, TargetGroupId,
};
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Sink operations, used for error reporting and fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkOperation {
    CreateSecurityBoundary,
    CreateLoadBalancer,
    CreateTargetGroup,
    CreateListener,
    DeclareSecurityRule,
}

impl fmt::Display for SinkOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SinkOperation::CreateSecurityBoundary => "create_security_boundary",
            SinkOperation::CreateLoadBalancer => "create_load_balancer",
            SinkOperation::CreateTargetGroup => "create_target_group",
            SinkOperation::CreateListener => "create_listener",
            SinkOperation::DeclareSecurityRule => "declare_security_rule",
        };
        f.write_str(name)
    }
}

/// Resource sink errors
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("{operation} rejected: {reason}")]
    Rejected {
        operation: SinkOperation,
        reason: String,
    },

    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Provisioning backend consumed by the planners
pub trait ResourceSink: Send + Sync {
    /// Create the firewall perimeter of one load balancer
    fn create_security_boundary(
        &self,
        descriptor: &SecurityBoundaryDescriptor,
    ) -> Result<BoundaryId, SinkError>;

    /// Create a load balancer
    fn create_load_balancer(
        &self,
        descriptor: &LoadBalancerDescriptor,
    ) -> Result<LoadBalancerId, SinkError>;

    /// Create a target group
    fn create_target_group(
        &self,
        descriptor: &TargetGroupDescriptor,
    ) -> Result<TargetGroupId, SinkError>;

    /// Create a listener
    fn create_listener(&self, descriptor: &ListenerDescriptor) -> Result<ListenerId, SinkError>;

    /// Apply one firewall rule to a boundary
    fn declare_security_rule(
        &self,
        boundary: &BoundaryId,
        rule: &SecurityRule,
    ) -> Result<(), SinkError>;
}

/// One recorded sink call, in call order
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    SecurityBoundaryCreated(BoundaryId),
    LoadBalancerCreated(LoadBalancerId),
    TargetGroupCreated(TargetGroupId),
    ListenerCreated(ListenerId),
    SecurityRuleDeclared(BoundaryId, SecurityRule),
}

/// In-memory resource sink
///
/// Handles are deterministic (`tg-0003`, `listener-0004`, ...) so tests can
/// assert on them. Target group names and `(load balancer, port)` listener
/// bindings are unique, as they are on real backends. Uniqueness is claimed
/// through an index entry, so concurrent callers racing for one name see
/// exactly one success.
pub struct InMemoryResourceSink {
    sequence: AtomicU64,
    boundary_names: DashMap<String, BoundaryId>,
    target_group_names: DashMap<String, TargetGroupId>,
    listener_bindings: DashMap<(LoadBalancerId, u16), ListenerId>,
    boundaries: DashMap<BoundaryId, (u64, SecurityBoundaryDescriptor)>,
    load_balancers: DashMap<LoadBalancerId, (u64, LoadBalancerDescriptor)>,
    target_groups: DashMap<TargetGroupId, (u64, TargetGroupDescriptor)>,
    listeners: DashMap<ListenerId, (u64, ListenerDescriptor)>,
    rules: DashMap<BoundaryId, Vec<SecurityRule>>,
    journal: DashMap<u64, SinkEvent>,
    failing: DashSet<SinkOperation>,
}

impl InMemoryResourceSink {
    pub fn new() -> Self {
        Self {
            sequence: AtomicU64::new(0),
            boundary_names: DashMap::new(),
            target_group_names: DashMap::new(),
            listener_bindings: DashMap::new(),
            boundaries: DashMap::new(),
            load_balancers: DashMap::new(),
            target_groups: DashMap::new(),
            listeners: DashMap::new(),
            rules: DashMap::new(),
            journal: DashMap::new(),
            failing: DashSet::new(),
        }
    }

    /// Make every subsequent call of `operation` fail
    pub fn fail_on(&self, operation: SinkOperation) {
        self.failing.insert(operation);
    }

    /// Undo [`fail_on`](Self::fail_on)
    pub fn recover(&self, operation: SinkOperation) {
        self.failing.remove(&operation);
    }

    fn check(&self, operation: SinkOperation) -> Result<(), SinkError> {
        if self.failing.contains(&operation) {
            return Err(SinkError::Rejected {
                operation,
                reason: "injected failure".into(),
            });
        }
        Ok(())
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn record(&self, seq: u64, event: SinkEvent) {
        debug!(seq = seq, event = ?event, "Sink call recorded");
        self.journal.insert(seq, event);
    }

    /// All recorded calls, oldest first
    pub fn journal(&self) -> Vec<SinkEvent> {
        let mut entries: Vec<(u64, SinkEvent)> = self
            .journal
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, event)| event).collect()
    }

    /// Created listeners, oldest first
    pub fn listeners(&self) -> Vec<(ListenerId, ListenerDescriptor)> {
        let mut entries: Vec<(u64, ListenerId, ListenerDescriptor)> = self
            .listeners
            .iter()
            .map(|e| (e.value().0, e.key().clone(), e.value().1.clone()))
            .collect();
        entries.sort_by_key(|(seq, _, _)| *seq);
        entries.into_iter().map(|(_, id, d)| (id, d)).collect()
    }

    /// Created target groups, oldest first
    pub fn target_groups(&self) -> Vec<(TargetGroupId, TargetGroupDescriptor)> {
        let mut entries: Vec<(u64, TargetGroupId, TargetGroupDescriptor)> = self
            .target_groups
            .iter()
            .map(|e| (e.value().0, e.key().clone(), e.value().1.clone()))
            .collect();
        entries.sort_by_key(|(seq, _, _)| *seq);
        entries.into_iter().map(|(_, id, d)| (id, d)).collect()
    }

    pub fn load_balancer(&self, id: &LoadBalancerId) -> Option<LoadBalancerDescriptor> {
        self.load_balancers.get(id).map(|e| e.value().1.clone())
    }

    pub fn boundary(&self, id: &BoundaryId) -> Option<SecurityBoundaryDescriptor> {
        self.boundaries.get(id).map(|e| e.value().1.clone())
    }

    /// Rules declared on a boundary, in declaration order
    pub fn rules_for(&self, boundary: &BoundaryId) -> Vec<SecurityRule> {
        self.rules
            .get(boundary)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }
}

impl Default for InMemoryResourceSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSink for InMemoryResourceSink {
    fn create_security_boundary(
        &self,
        descriptor: &SecurityBoundaryDescriptor,
    ) -> Result<BoundaryId, SinkError> {
        self.check(SinkOperation::CreateSecurityBoundary)?;

        let slot = match self.boundary_names.entry(descriptor.name.clone()) {
            Entry::Occupied(_) => return Err(SinkError::Conflict(descriptor.name.clone())),
            Entry::Vacant(slot) => slot,
        };

        let seq = self.next_sequence();
        let id = BoundaryId::new(format!("sg-{:04}", seq));
        slot.insert(id.clone());
        self.boundaries
            .insert(id.clone(), (seq, descriptor.clone()));
        self.record(seq, SinkEvent::SecurityBoundaryCreated(id.clone()));
        Ok(id)
    }

    fn create_load_balancer(
        &self,
        descriptor: &LoadBalancerDescriptor,
    ) -> Result<LoadBalancerId, SinkError> {
        self.check(SinkOperation::CreateLoadBalancer)?;

        for boundary in &descriptor.boundaries {
            if !self.boundaries.contains_key(boundary) {
                return Err(SinkError::UnknownResource(boundary.to_string()));
            }
        }

        let seq = self.next_sequence();
        let id = LoadBalancerId::new(format!("lb-{:04}", seq));
        self.load_balancers
            .insert(id.clone(), (seq, descriptor.clone()));
        self.record(seq, SinkEvent::LoadBalancerCreated(id.clone()));
        Ok(id)
    }

    fn create_target_group(
        &self,
        descriptor: &TargetGroupDescriptor,
    ) -> Result<TargetGroupId, SinkError> {
        self.check(SinkOperation::CreateTargetGroup)?;

        let slot = match self.target_group_names.entry(descriptor.name.clone()) {
            Entry::Occupied(_) => return Err(SinkError::Conflict(descriptor.name.clone())),
            Entry::Vacant(slot) => slot,
        };

        let seq = self.next_sequence();
        let id = TargetGroupId::new(format!("tg-{:04}", seq));
        slot.insert(id.clone());
        self.target_groups
            .insert(id.clone(), (seq, descriptor.clone()));
        self.record(seq, SinkEvent::TargetGroupCreated(id.clone()));
        Ok(id)
    }

    fn create_listener(&self, descriptor: &ListenerDescriptor) -> Result<ListenerId, SinkError> {
        self.check(SinkOperation::CreateListener)?;

        if !self.load_balancers.contains_key(&descriptor.load_balancer) {
            return Err(SinkError::UnknownResource(
                descriptor.load_balancer.to_string(),
            ));
        }
        if let Some(target_group) = descriptor.default_action.target_group() {
            if !self.target_groups.contains_key(target_group) {
                return Err(SinkError::UnknownResource(target_group.to_string()));
            }
        }
        let binding = (descriptor.load_balancer.clone(), descriptor.port);
        let slot = match self.listener_bindings.entry(binding) {
            Entry::Occupied(_) => {
                return Err(SinkError::Conflict(format!(
                    "{} port {}",
                    descriptor.load_balancer, descriptor.port
                )))
            }
            Entry::Vacant(slot) => slot,
        };

        let seq = self.next_sequence();
        let id = ListenerId::new(format!("listener-{:04}", seq));
        slot.insert(id.clone());
        self.listeners
            .insert(id.clone(), (seq, descriptor.clone()));
        self.record(seq, SinkEvent::ListenerCreated(id.clone()));
        Ok(id)
    }

    fn declare_security_rule(
        &self,
        boundary: &BoundaryId,
        rule: &SecurityRule,
    ) -> Result<(), SinkError> {
        self.check(SinkOperation::DeclareSecurityRule)?;

        if !self.boundaries.contains_key(boundary) {
            return Err(SinkError::UnknownResource(boundary.to_string()));
        }

        let mut rules = self.rules.entry(boundary.clone()).or_default();
        if rules.contains(rule) {
            return Ok(());
        }
        rules.push(*rule);
        drop(rules);

        let seq = self.next_sequence();
        self.record(seq, SinkEvent::SecurityRuleDeclared(boundary.clone(), *rule));
        Ok(())
    }
}
