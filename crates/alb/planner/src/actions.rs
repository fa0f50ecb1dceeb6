//! Listener action builders

use alb_types::{ActionSpec, FixedResponseConfig, Protocol, RedirectConfig, TargetGroupId};

/// Status used for redirects; permanent so clients update bookmarks
pub const REDIRECT_STATUS: &str = "HTTP_301";

/// Fallback status when nothing can serve the request
pub const NOT_FOUND_STATUS: u16 = 404;

pub const NOT_FOUND_BODY: &str = "Not found.";

/// Redirect to the same host, path and query on `port` using `protocol`
pub fn redirect_action(port: u16, protocol: Protocol) -> ActionSpec {
    ActionSpec::Redirect(RedirectConfig {
        status_code: REDIRECT_STATUS.into(),
        host: "#{host}".into(),
        path: "/#{path}".into(),
        port,
        query: "#{query}".into(),
        protocol,
    })
}

/// Redirect to HTTPS on `port`
pub fn https_redirect_action(port: u16) -> ActionSpec {
    redirect_action(port, Protocol::Https)
}

/// Forward to a target group
pub fn forward_action(target_group: &TargetGroupId) -> ActionSpec {
    ActionSpec::Forward {
        target_group: target_group.clone(),
    }
}

pub fn fixed_response_action(status_code: u16, body: impl Into<String>) -> ActionSpec {
    ActionSpec::FixedResponse(FixedResponseConfig {
        status_code,
        message_body: body.into(),
    })
}

/// The 404 fallback used wherever no forwarding target exists yet
pub fn not_found_action() -> ActionSpec {
    fixed_response_action(NOT_FOUND_STATUS, NOT_FOUND_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_preserves_request() {
        match https_redirect_action(443) {
            ActionSpec::Redirect(config) => {
                assert_eq!(config.status_code, "HTTP_301");
                assert_eq!(config.host, "#{host}");
                assert_eq!(config.path, "/#{path}");
                assert_eq!(config.query, "#{query}");
                assert_eq!(config.port, 443);
                assert_eq!(config.protocol, Protocol::Https);
            }
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[test]
    fn test_redirect_to_plain_http() {
        let action = redirect_action(8080, Protocol::Http);
        assert!(matches!(
            action,
            ActionSpec::Redirect(RedirectConfig {
                port: 8080,
                protocol: Protocol::Http,
                ..
            })
        ));
    }

    #[test]
    fn test_forward() {
        let tg = TargetGroupId::new("tg-7");
        assert_eq!(forward_action(&tg).target_group(), Some(&tg));
    }

    #[test]
    fn test_not_found() {
        assert_eq!(
            not_found_action(),
            ActionSpec::FixedResponse(FixedResponseConfig {
                status_code: 404,
                message_body: "Not found.".into(),
            })
        );
    }
}
