//! Method dispatch.
//!
//! # Responsibilities
//! - Hold the handler set of one deployment
//! - Map a parsed method to exactly one route
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - Exhaustive match over the method enum, no string comparisons

use crate::config::ServerConfig;
use crate::files::FileHandler;
use crate::http::Method;
use crate::proxy::ProxyRelay;

/// Which deployment a process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    FileServer,
    Proxy,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceKind::FileServer => f.write_str("file-server"),
            ServiceKind::Proxy => f.write_str("proxy"),
        }
    }
}

#[derive(Debug, Clone)]
enum Handlers {
    Files(FileHandler),
    Relay(ProxyRelay),
}

/// The handler chosen for one request.
#[derive(Debug, Clone, Copy)]
pub enum Route<'a> {
    FileGet(&'a FileHandler),
    FileUpload(&'a FileHandler),
    Relay(&'a ProxyRelay),
    NotImplemented,
}

#[derive(Debug, Clone)]
pub struct Router {
    handlers: Handlers,
}

impl Router {
    pub fn file_server(files: FileHandler) -> Self {
        Self {
            handlers: Handlers::Files(files),
        }
    }

    pub fn proxy(relay: ProxyRelay) -> Self {
        Self {
            handlers: Handlers::Relay(relay),
        }
    }

    /// Build the handler set for `kind` from configuration.
    pub fn from_config(kind: ServiceKind, config: &ServerConfig) -> Self {
        match kind {
            ServiceKind::FileServer => Self::file_server(FileHandler::new(&config.files, &config.limits)),
            ServiceKind::Proxy => Self::proxy(ProxyRelay::new(&config.proxy, &config.timeouts)),
        }
    }

    pub fn kind(&self) -> ServiceKind {
        match self.handlers {
            Handlers::Files(_) => ServiceKind::FileServer,
            Handlers::Relay(_) => ServiceKind::Proxy,
        }
    }

    pub fn route(&self, method: &Method) -> Route<'_> {
        match (&self.handlers, method) {
            (Handlers::Files(files), Method::Get) => Route::FileGet(files),
            (Handlers::Files(files), Method::Post) => Route::FileUpload(files),
            (Handlers::Relay(relay), Method::Get) => Route::Relay(relay),
            (Handlers::Relay(_), Method::Post) | (_, Method::Other(_)) => Route::NotImplemented,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_server_routes() {
        let router = Router::from_config(ServiceKind::FileServer, &ServerConfig::default());
        assert_eq!(router.kind(), ServiceKind::FileServer);
        assert!(matches!(router.route(&Method::Get), Route::FileGet(_)));
        assert!(matches!(router.route(&Method::Post), Route::FileUpload(_)));
        assert!(matches!(
            router.route(&Method::Other("DELETE".into())),
            Route::NotImplemented
        ));
    }

    #[test]
    fn proxy_routes_only_get() {
        let router = Router::from_config(ServiceKind::Proxy, &ServerConfig::default());
        assert_eq!(router.kind(), ServiceKind::Proxy);
        assert!(matches!(router.route(&Method::Get), Route::Relay(_)));
        assert!(matches!(router.route(&Method::Post), Route::NotImplemented));
        assert!(matches!(router.route(&Method::Other("PUT".into())), Route::NotImplemented));
    }
}
