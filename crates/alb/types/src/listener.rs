//! Listener templates

use crate::action::{ActionSpec, Protocol};
use crate::ids::{CertificateRef, LoadBalancerId};
use crate::traffic::TrafficPolicy;
use serde::{Deserialize, Serialize};

/// Inbound policy applied when a template does not choose one
pub const DEFAULT_INBOUND: TrafficPolicy = TrafficPolicy::Internet;

/// Outbound policy applied when a template does not choose one
pub const DEFAULT_OUTBOUND: TrafficPolicy = TrafficPolicy::None;

/// Template for a load balancer listener
///
/// The protocol is not stored: it is HTTPS exactly when a certificate is
/// attached. Port and action may be left unset when a planner assigns them
/// (blue/green lanes get both from the orchestrator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerSpec {
    /// Name prefix; lanes append their suffix to it
    pub name: String,

    /// Load balancer the listener is attached to
    pub load_balancer: LoadBalancerId,

    /// Port to listen on
    pub port: Option<u16>,

    /// Certificate enabling HTTPS
    pub certificate: Option<CertificateRef>,

    /// Who may reach the listener
    pub inbound: TrafficPolicy,

    /// Where the listener may send traffic
    pub outbound: TrafficPolicy,

    /// Default action
    pub action: Option<ActionSpec>,
}

impl ListenerSpec {
    pub fn new(name: impl Into<String>, load_balancer: LoadBalancerId) -> Self {
        Self {
            name: name.into(),
            load_balancer,
            port: None,
            certificate: None,
            inbound: DEFAULT_INBOUND,
            outbound: DEFAULT_OUTBOUND,
            action: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_certificate(mut self, certificate: CertificateRef) -> Self {
        self.certificate = Some(certificate);
        self
    }

    pub fn with_inbound(mut self, policy: TrafficPolicy) -> Self {
        self.inbound = policy;
        self
    }

    pub fn with_outbound(mut self, policy: TrafficPolicy) -> Self {
        self.outbound = policy;
        self
    }

    pub fn with_action(mut self, action: ActionSpec) -> Self {
        self.action = Some(action);
        self
    }

    /// HTTPS iff a certificate is attached
    pub fn protocol(&self) -> Protocol {
        if self.certificate.is_some() {
            Protocol::Https
        } else {
            Protocol::Http
        }
    }

    /// Copy of this template whose name carries `suffix`
    pub fn renamed(&self, suffix: &str) -> Self {
        let mut copy = self.clone();
        copy.name = format!("{}{}", self.name, suffix);
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> ListenerSpec {
        ListenerSpec::new("Api", LoadBalancerId::new("lb-1"))
    }

    #[test]
    fn test_defaults() {
        let spec = template();
        assert_eq!(spec.inbound, TrafficPolicy::Internet);
        assert_eq!(spec.outbound, TrafficPolicy::None);
        assert!(spec.port.is_none());
        assert!(spec.action.is_none());
    }

    #[test]
    fn test_protocol_follows_certificate() {
        let spec = template();
        assert_eq!(spec.protocol(), Protocol::Http);

        let spec = spec.with_certificate(CertificateRef::new("cert-1"));
        assert_eq!(spec.protocol(), Protocol::Https);
    }

    #[test]
    fn test_renamed_copy_leaves_template_untouched() {
        let spec = template().with_inbound(TrafficPolicy::VpcOnly);
        let blue = spec.renamed("Blue");

        assert_eq!(blue.name, "ApiBlue");
        assert_eq!(spec.name, "Api");
        assert_eq!(blue.inbound, TrafficPolicy::VpcOnly);
        assert_eq!(blue.load_balancer, spec.load_balancer);
    }
}
