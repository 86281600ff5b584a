// Host capability negotiation
//
// The host tells us once, at startup, what it can do. negotiate() turns that
// profile into the set of affordances the controller may ever enable, plus an
// optional banner explaining anything that is permanently unavailable.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::view::Banner;

/// Which host the recorder is running in (only affects guidance text)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostFlavor {
    #[default]
    Generic,
    /// Brave blocks capture and file pickers behind its shields
    Brave,
}

/// Process-wide, read-only facts about the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    /// Screen/tab/window capture is available
    pub capture_supported: bool,
    /// The host offers an interactive "save as" handle with streaming writes
    pub interactive_save_supported: bool,
    /// Mobile form factor
    pub mobile: bool,
    /// Local or encrypted-transport execution context
    pub secure_context: bool,
    #[serde(default)]
    pub host: HostFlavor,
}

impl CapabilityProfile {
    /// Profile for a fully capable desktop host
    pub fn desktop() -> Self {
        Self {
            capture_supported: true,
            interactive_save_supported: true,
            mobile: false,
            secure_context: true,
            host: HostFlavor::Generic,
        }
    }

    /// Build a profile, deriving the secure-context bit from the page origin
    pub fn for_origin(
        origin: &str,
        capture_supported: bool,
        interactive_save_supported: bool,
        mobile: bool,
    ) -> Self {
        Self {
            capture_supported,
            interactive_save_supported,
            mobile,
            secure_context: is_secure_origin(origin),
            host: HostFlavor::Generic,
        }
    }

    pub fn with_host(mut self, host: HostFlavor) -> Self {
        self.host = host;
        self
    }
}

/// Affordances reachable for the lifetime of the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiation {
    /// Source selection (and therefore recording) may be offered
    pub capture_allowed: bool,
    /// The "choose save location" affordance is shown and saves may be interactive
    pub interactive_save_allowed: bool,
    /// Startup message, if anything is permanently unavailable
    pub message: Option<Banner>,
}

/// Decide which affordances the profile allows
///
/// Pure: the same profile always yields the same negotiation.
///
/// Saving is only offered on a host that can record.
pub fn negotiate(profile: &CapabilityProfile) -> Negotiation {
    if !profile.secure_context {
        return Negotiation {
            capture_allowed: false,
            interactive_save_allowed: false,
            message: Some(Banner::error(
                "Screen recording requires a secure connection. \
                 Open this page over HTTPS or from localhost.",
            )),
        };
    }

    if !profile.capture_supported {
        let text = if profile.mobile {
            "Screen recording is not supported on mobile devices. \
             Please use a desktop browser."
        } else {
            "Your browser does not support screen recording. \
             Please update to a recent version of Chrome, Edge or Firefox."
        };
        return Negotiation {
            capture_allowed: false,
            interactive_save_allowed: false,
            message: Some(Banner::error(text)),
        };
    }

    let interactive_save_allowed = profile.interactive_save_supported;
    let message = if interactive_save_allowed {
        None
    } else {
        Some(Banner::info(
            "Recordings will be saved to your downloads folder.",
        ))
    };

    Negotiation {
        capture_allowed: true,
        interactive_save_allowed,
        message,
    }
}

/// Whether an origin counts as a secure execution context
///
/// Encrypted transport and local origins qualify.
pub fn is_secure_origin(origin: &str) -> bool {
    let origin = origin.trim().to_ascii_lowercase();

    let Some((scheme, rest)) = origin.split_once("://") else {
        return false;
    };

    match scheme {
        "https" | "wss" | "file" => return true,
        "http" | "ws" => {}
        _ => return false,
    }

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let authority = authority.rsplit('@').next().unwrap_or_default();

    let host = if let Some(bracketed) = authority.strip_prefix('[') {
        bracketed.split(']').next().unwrap_or_default()
    } else {
        authority.split(':').next().unwrap_or_default()
    };

    host == "localhost"
        || host.ends_with(".localhost")
        || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}
