//! Listener planning

use crate::actions::not_found_action;
use crate::context::PlanningContext;
use crate::error::{PlanError, Result};
use crate::traffic::resolve;
use alb_types::{Direction, ListenerDescriptor, ListenerResource, ListenerSpec};
use tracing::{info, instrument};

/// Logical id of a listener, e.g. `ApiHttpsListener443`
pub fn logical_id(spec: &ListenerSpec, port: u16) -> String {
    format!("{}{}Listener{}", spec.name, spec.protocol().title(), port)
}

/// Realize a listener template.
///
/// Opens the template's inbound/outbound rules on the boundary policy
/// (declaring each new rule to the sink), then creates the listener. A
/// template without an action gets the 404 fallback. The port must already
/// be assigned, and the boundary must still be unlocked even when the
/// template opens no rule.
#[instrument(skip(ctx, spec), fields(listener = %spec.name, port = ?spec.port))]
pub fn plan_listener(ctx: &mut PlanningContext<'_>, spec: &ListenerSpec) -> Result<ListenerResource> {
    ctx.ensure_unlocked()?;

    let port = spec.port.ok_or_else(|| PlanError::MissingPort {
        listener: spec.name.clone(),
    })?;

    let rules = [
        (resolve(spec.inbound, ctx.network()), Direction::Ingress),
        (resolve(spec.outbound, ctx.network()), Direction::Egress),
    ];
    for (peer, direction) in rules {
        let Some(peer) = peer else {
            continue;
        };

        ctx.open_port(port, peer, direction)?;
    }

    let descriptor = ListenerDescriptor {
        logical_id: logical_id(spec, port),
        load_balancer: spec.load_balancer.clone(),
        port,
        protocol: spec.protocol(),
        certificate: spec.certificate.clone(),
        default_action: spec.action.clone().unwrap_or_else(not_found_action),
    };
    let id = ctx.sink().create_listener(&descriptor)?;
    let resource = ListenerResource { id, descriptor };
    ctx.record_listener(resource.clone());

    info!(
        listener_id = %resource.id,
        logical_id = %resource.descriptor.logical_id,
        protocol = %resource.descriptor.protocol,
        action = resource.descriptor.default_action.kind(),
        "Listener planned"
    );

    Ok(resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::https_redirect_action;
    use crate::security::SecurityPolicy;
    use crate::sink::{InMemoryResourceSink, ResourceSink, SinkOperation};
    use alb_types::{
        ActionSpec, BoundaryId, CertificateRef, LoadBalancerDescriptor, LoadBalancerId,
        LoadBalancerScheme, NetworkContext, Peer, Protocol, SecurityBoundaryDescriptor,
        SecurityRule, TrafficPolicy, VpcId,
    };

    struct Fixture {
        sink: InMemoryResourceSink,
        network: NetworkContext,
        policy: SecurityPolicy,
        load_balancer: LoadBalancerId,
    }

    fn fixture() -> Fixture {
        let sink = InMemoryResourceSink::new();
        let boundary = sink
            .create_security_boundary(&SecurityBoundaryDescriptor {
                name: "WebAppLoadBalancerSG".into(),
                description: "test".into(),
                vpc: VpcId::new("vpc-1"),
                allow_all_outbound: false,
            })
            .unwrap();
        let load_balancer = sink
            .create_load_balancer(&LoadBalancerDescriptor {
                name: "WebAppLoadBalancer".into(),
                scheme: LoadBalancerScheme::Public,
                subnets: vec![],
                boundaries: vec![boundary.clone()],
            })
            .unwrap();

        Fixture {
            sink,
            network: NetworkContext::new(VpcId::new("vpc-1"), "10.0.0.0/16".parse().unwrap()),
            policy: SecurityPolicy::new(boundary),
            load_balancer,
        }
    }

    #[test]
    fn test_plain_listener() {
        let mut f = fixture();
        let spec = ListenerSpec::new("Web", f.load_balancer.clone()).with_port(80);
        let mut ctx = PlanningContext::new(&f.network, &f.sink, &mut f.policy);

        let listener = plan_listener(&mut ctx, &spec).unwrap();
        assert_eq!(ctx.created().listeners, vec![listener.clone()]);

        assert_eq!(listener.port(), 80);
        assert_eq!(listener.protocol(), Protocol::Http);
        assert_eq!(listener.descriptor.logical_id, "WebHttpListener80");
        assert_eq!(listener.action(), &not_found_action());
        assert!(listener.descriptor.certificate.is_none());

        // Default traffic: inbound from anywhere, nothing outbound
        assert_eq!(
            f.policy.rules(),
            &[SecurityRule::new(80, Peer::AnyIpv4, Direction::Ingress)]
        );
        assert_eq!(f.sink.rules_for(f.policy.boundary()), f.policy.rules());
    }

    #[test]
    fn test_certificate_makes_https() {
        let mut f = fixture();
        let spec = ListenerSpec::new("Web", f.load_balancer.clone())
            .with_port(443)
            .with_certificate(CertificateRef::new("cert-1"));
        let mut ctx = PlanningContext::new(&f.network, &f.sink, &mut f.policy);

        let listener = plan_listener(&mut ctx, &spec).unwrap();

        assert_eq!(listener.protocol(), Protocol::Https);
        assert_eq!(listener.descriptor.logical_id, "WebHttpsListener443");
        assert_eq!(
            listener.descriptor.certificate,
            Some(CertificateRef::new("cert-1"))
        );
    }

    #[test]
    fn test_explicit_action_is_kept() {
        let mut f = fixture();
        let spec = ListenerSpec::new("Web", f.load_balancer.clone())
            .with_port(80)
            .with_action(https_redirect_action(443));
        let mut ctx = PlanningContext::new(&f.network, &f.sink, &mut f.policy);

        let listener = plan_listener(&mut ctx, &spec).unwrap();
        assert!(matches!(listener.action(), ActionSpec::Redirect(_)));
    }

    #[test]
    fn test_vpc_traffic_both_directions() {
        let mut f = fixture();
        let spec = ListenerSpec::new("Internal", f.load_balancer.clone())
            .with_port(8080)
            .with_inbound(TrafficPolicy::VpcOnly)
            .with_outbound(TrafficPolicy::VpcOnly);
        let cidr = f.network.cidr;
        let mut ctx = PlanningContext::new(&f.network, &f.sink, &mut f.policy);

        plan_listener(&mut ctx, &spec).unwrap();

        assert_eq!(
            f.policy.rules(),
            &[
                SecurityRule::new(8080, Peer::ipv4(cidr), Direction::Ingress),
                SecurityRule::new(8080, Peer::ipv4(cidr), Direction::Egress),
            ]
        );
    }

    #[test]
    fn test_no_traffic_opens_nothing() {
        let mut f = fixture();
        let spec = ListenerSpec::new("Closed", f.load_balancer.clone())
            .with_port(9000)
            .with_inbound(TrafficPolicy::None);
        let mut ctx = PlanningContext::new(&f.network, &f.sink, &mut f.policy);

        plan_listener(&mut ctx, &spec).unwrap();
        assert!(f.policy.is_empty());
    }

    #[test]
    fn test_missing_port_fails() {
        let mut f = fixture();
        let spec = ListenerSpec::new("Web", f.load_balancer.clone());
        let mut ctx = PlanningContext::new(&f.network, &f.sink, &mut f.policy);

        let result = plan_listener(&mut ctx, &spec);
        assert!(matches!(result, Err(PlanError::MissingPort { .. })));
        assert!(f.sink.listeners().is_empty());
    }

    #[test]
    fn test_locked_policy_fails_before_listener_exists() {
        let mut f = fixture();
        f.policy.lock();
        let spec = ListenerSpec::new("Web", f.load_balancer.clone()).with_port(80);
        let mut ctx = PlanningContext::new(&f.network, &f.sink, &mut f.policy);

        let result = plan_listener(&mut ctx, &spec);
        assert!(result.unwrap_err().is_policy_locked());
        assert!(f.sink.listeners().is_empty());
    }

    #[test]
    fn test_locked_policy_rejects_listener_without_rules() {
        let mut f = fixture();
        f.policy.lock();
        let spec = ListenerSpec::new("Closed", f.load_balancer.clone())
            .with_port(9000)
            .with_inbound(TrafficPolicy::None)
            .with_outbound(TrafficPolicy::None);
        let mut ctx = PlanningContext::new(&f.network, &f.sink, &mut f.policy);

        let result = plan_listener(&mut ctx, &spec);
        assert!(result.unwrap_err().is_policy_locked());
        assert!(ctx.created().is_empty());
        assert!(f.sink.listeners().is_empty());
    }

    #[test]
    fn test_shared_port_declares_rule_once() {
        let mut f = fixture();
        let other_lb = f
            .sink
            .create_load_balancer(&LoadBalancerDescriptor {
                name: "Other".into(),
                scheme: LoadBalancerScheme::Internal,
                subnets: vec![],
                boundaries: vec![f.policy.boundary().clone()],
            })
            .unwrap();
        let mut ctx = PlanningContext::new(&f.network, &f.sink, &mut f.policy);

        plan_listener(&mut ctx, &ListenerSpec::new("A", f.load_balancer.clone()).with_port(80))
            .unwrap();
        plan_listener(&mut ctx, &ListenerSpec::new("B", other_lb).with_port(80)).unwrap();

        assert_eq!(f.policy.len(), 1);
        assert_eq!(f.sink.rules_for(&BoundaryId::new("sg-0001")).len(), 1);
    }

    #[test]
    fn test_sink_rule_failure_propagates() {
        let mut f = fixture();
        f.sink.fail_on(SinkOperation::DeclareSecurityRule);
        let spec = ListenerSpec::new("Web", f.load_balancer.clone()).with_port(80);
        let mut ctx = PlanningContext::new(&f.network, &f.sink, &mut f.policy);

        let result = plan_listener(&mut ctx, &spec);
        assert!(matches!(result, Err(PlanError::Sink(_))));
        assert!(f.sink.listeners().is_empty());
    }
}
