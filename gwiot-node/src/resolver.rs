use no_std_net::Ipv6Addr;

/// Answer of the platform's name service cache for a single name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Cached(Ipv6Addr),
    Uncached,
    Expired,
    /// A query for the name is in flight
    Resolving,
    NotFound,
    Error,
}

/// Host name resolution engine. Query completion is signalled to the
/// task out of band (see [`crate::Suspend::Resolution`]).
pub trait NameService {
    fn lookup(&mut self, name: &str) -> Lookup;

    /// Start an asynchronous query for `name`
    fn query(&mut self, name: &str);
}

impl<T: NameService + ?Sized> NameService for &mut T {
    fn lookup(&mut self, name: &str) -> Lookup {
        (**self).lookup(name)
    }

    fn query(&mut self, name: &str) {
        (**self).query(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionState {
    #[default]
    Unresolved,
    Resolving,
    Resolved(Ipv6Addr),
    Failed,
}

impl ResolutionState {
    pub fn address(&self) -> Option<Ipv6Addr> {
        match self {
            ResolutionState::Resolved(addr) => Some(*addr),
            _ => None,
        }
    }
}

/// Drives one target name through the name service's cache/query
/// lifecycle.
///
/// Only the service's own [`Lookup::Resolving`] counts as a query in
/// flight. Any uncached or expired answer issues a fresh query, so an
/// entry the engine dropped mid-query is asked for again.
///
/// Failed is reported but never retried here; the caller decides
/// whether to poll again. The report loop re-polls on every wake, so to
/// it Failed and Resolving only differ in what gets logged.
pub struct ResolverAdapter<N> {
    service: N,
    state: ResolutionState,
}

impl<N: NameService> ResolverAdapter<N> {
    pub fn new(service: N) -> Self {
        Self {
            service,
            state: ResolutionState::Unresolved,
        }
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    pub fn service(&self) -> &N {
        &self.service
    }

    pub fn poll(&mut self, name: &str) -> ResolutionState {
        let next = match parse_literal(name) {
            Some(addr) => ResolutionState::Resolved(addr),
            None => self.poll_service(name),
        };
        self.transition(name, next);
        next
    }

    fn poll_service(&mut self, name: &str) -> ResolutionState {
        match self.service.lookup(name) {
            Lookup::Cached(addr) => ResolutionState::Resolved(addr),
            Lookup::Resolving => {
                log::debug!("Still looking up \"{name}\"...");
                ResolutionState::Resolving
            }
            lookup @ (Lookup::Uncached | Lookup::Expired) => {
                log::info!("Attempting to look up {name} ({lookup:?})");
                self.service.query(name);
                ResolutionState::Resolving
            }
            lookup @ (Lookup::NotFound | Lookup::Error) => {
                log::warn!("Lookup of \"{name}\" failed, status = {lookup:?}");
                ResolutionState::Failed
            }
        }
    }

    fn transition(&mut self, name: &str, next: ResolutionState) {
        if next == self.state {
            return;
        }
        match next {
            ResolutionState::Resolved(addr) => log::info!("Lookup of \"{name}\" succeeded: {addr}"),
            other => log::info!("Resolution of \"{name}\": {:?} -> {other:?}", self.state),
        }
        self.state = next;
    }
}

/// Bare or bracketed IPv6 literals bypass the name service
fn parse_literal(name: &str) -> Option<Ipv6Addr> {
    let name = name
        .strip_prefix('[')
        .and_then(|n| n.strip_suffix(']'))
        .unwrap_or(name);
    name.parse().ok()
}
