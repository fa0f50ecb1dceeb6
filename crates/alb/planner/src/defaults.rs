//! Default four-listener topology
//!
//! A load balancer gets a "production" listener pair and a "deployment"
//! listener pair without the caller supplying any target group. HTTP
//! listeners always exist; HTTPS listeners exist only with a certificate,
//! in which case each HTTP listener redirects to its HTTPS sibling. Until a
//! deployment tool attaches forwarding rules, everything answers 404.

use crate::actions::{https_redirect_action, not_found_action};
use crate::config::{DefaultTopologyConfig, PlannerConfig, TrafficDefaults};
use crate::context::PlanningContext;
use crate::error::Result;
use crate::listener::plan_listener;
use alb_types::{CertificateRef, ListenerResource, ListenerSpec, LoadBalancerId};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Listeners of the default topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultListeners {
    production_http: ListenerResource,
    production_https: Option<ListenerResource>,
    deployment_http: ListenerResource,
    deployment_https: Option<ListenerResource>,
}

impl DefaultListeners {
    pub fn https_enabled(&self) -> bool {
        self.production_https.is_some()
    }

    pub fn production_http(&self) -> &ListenerResource {
        &self.production_http
    }

    pub fn production_https(&self) -> Option<&ListenerResource> {
        self.production_https.as_ref()
    }

    pub fn deployment_http(&self) -> &ListenerResource {
        &self.deployment_http
    }

    pub fn deployment_https(&self) -> Option<&ListenerResource> {
        self.deployment_https.as_ref()
    }

    /// Listener serving live traffic: HTTPS when enabled, otherwise HTTP
    pub fn production_listener(&self) -> &ListenerResource {
        self.production_https
            .as_ref()
            .unwrap_or(&self.production_http)
    }

    /// Listener serving test traffic for the lane being deployed
    pub fn deployment_listener(&self) -> &ListenerResource {
        self.deployment_https
            .as_ref()
            .unwrap_or(&self.deployment_http)
    }

    /// All created listeners in creation order
    pub fn all(&self) -> Vec<&ListenerResource> {
        let mut listeners = vec![&self.production_http];
        listeners.extend(self.production_https.as_ref());
        listeners.push(&self.deployment_http);
        listeners.extend(self.deployment_https.as_ref());
        listeners
    }
}

/// Builds the default topology from the ordinary listener planner
#[derive(Debug, Clone, Default)]
pub struct DefaultTopologyBuilder {
    ports: DefaultTopologyConfig,
    traffic: TrafficDefaults,
}

impl DefaultTopologyBuilder {
    pub fn new(ports: DefaultTopologyConfig, traffic: TrafficDefaults) -> Self {
        Self { ports, traffic }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.default_topology.clone(), config.traffic.clone())
    }

    fn spec(&self, prefix: &str, load_balancer: &LoadBalancerId, port: u16) -> ListenerSpec {
        ListenerSpec::new(prefix, load_balancer.clone())
            .with_port(port)
            .with_inbound(self.traffic.inbound)
            .with_outbound(self.traffic.outbound)
    }

    /// Plan the production pair then the deployment pair, HTTP before HTTPS.
    ///
    /// Fails with `PolicyLocked` before creating anything once the boundary
    /// is locked, even with traffic policies that open no rule.
    #[instrument(skip(self, ctx, load_balancer, certificate), fields(prefix = %prefix, https = certificate.is_some()))]
    pub fn build(
        &self,
        ctx: &mut PlanningContext<'_>,
        prefix: &str,
        load_balancer: &LoadBalancerId,
        certificate: Option<&CertificateRef>,
    ) -> Result<DefaultListeners> {
        ctx.ensure_unlocked()?;

        let (production_http, production_https) = self.build_pair(
            ctx,
            prefix,
            load_balancer,
            certificate,
            self.ports.production_http_port,
            self.ports.production_https_port,
        )?;
        let (deployment_http, deployment_https) = self.build_pair(
            ctx,
            prefix,
            load_balancer,
            certificate,
            self.ports.deployment_http_port,
            self.ports.deployment_https_port,
        )?;

        let listeners = DefaultListeners {
            production_http,
            production_https,
            deployment_http,
            deployment_https,
        };

        info!(
            listeners = listeners.all().len(),
            production_port = listeners.production_listener().port(),
            deployment_port = listeners.deployment_listener().port(),
            "Default listeners planned"
        );

        Ok(listeners)
    }

    fn build_pair(
        &self,
        ctx: &mut PlanningContext<'_>,
        prefix: &str,
        load_balancer: &LoadBalancerId,
        certificate: Option<&CertificateRef>,
        http_port: u16,
        https_port: u16,
    ) -> Result<(ListenerResource, Option<ListenerResource>)> {
        let http_action = match certificate {
            Some(_) => https_redirect_action(https_port),
            None => not_found_action(),
        };
        let http = plan_listener(
            ctx,
            &self
                .spec(prefix, load_balancer, http_port)
                .with_action(http_action),
        )?;

        let https = match certificate {
            Some(certificate) => Some(plan_listener(
                ctx,
                &self
                    .spec(prefix, load_balancer, https_port)
                    .with_certificate(certificate.clone())
                    .with_action(not_found_action()),
            )?),
            None => None,
        };

        Ok((http, https))
    }
}
