//! Origin resolution for relayed requests.

use std::fmt;

use url::{Host, Url};

use crate::http::{ParsedRequest, RequestError};

/// Where a relayed request goes and how its request line is rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    host: String,
    port: u16,
    /// Path and query exactly as the client wrote them.
    origin_form: String,
    /// `Host` header value to add when the client sent none.
    authority: String,
}

impl Target {
    /// Resolve the origin from the absolute-form URL.
    ///
    /// Origin-form requests name no origin and are rejected. A hop that
    /// arrives back at this proxy therefore ends after one relay.
    pub fn from_request(request: &ParsedRequest, default_port: u16) -> Result<Self, RequestError> {
        let url = request
            .url()
            .ok_or_else(|| RequestError::InvalidTarget(request.target().to_string()))?;
        Self::from_url(url, request, default_port)
    }

    fn from_url(url: &Url, request: &ParsedRequest, default_port: u16) -> Result<Self, RequestError> {
        if url.scheme() != "http" {
            return Err(RequestError::UnsupportedScheme(url.scheme().to_string()));
        }
        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => return Err(RequestError::MissingHost),
        };
        let declared = declared_port(url, request.target());
        let port = declared.unwrap_or(default_port);
        let host_str = url.host_str().unwrap_or(&host);
        let authority = match declared {
            Some(port) => format!("{host_str}:{port}"),
            None => host_str.to_string(),
        };

        Ok(Self {
            host,
            port,
            origin_form: request.origin_form().to_string(),
            authority,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn origin_form(&self) -> &str {
        &self.origin_form
    }

    /// Request head to send upstream: origin-form request line, the
    /// client's headers verbatim, `Host` added only if missing.
    pub fn request_head(&self, request: &ParsedRequest) -> String {
        let mut head = format!("{} {} {}\r\n", request.method(), self.origin_form, request.version());
        if !request.headers().contains("host") {
            head.push_str(&format!("Host: {}\r\n", self.authority));
        }
        for (name, value) in request.headers().iter() {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");
        head
    }
}

/// `Url` drops a port equal to the scheme default, so recover an explicit
/// `:80` from the raw authority text.
fn declared_port(url: &Url, raw: &str) -> Option<u16> {
    url.port().or_else(|| {
        let authority = raw.split("://").nth(1).unwrap_or(raw);
        let authority = authority.split(&['/', '?', '#'][..]).next().unwrap_or(authority);
        let host_port = authority.rsplit('@').next().unwrap_or(authority);
        let (_, port) = host_port.rsplit_once(':')?;
        if port.is_empty() || port.contains(']') {
            return None;
        }
        url.port_or_known_default()
    })
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
