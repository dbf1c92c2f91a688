use std::{
    collections::HashMap,
    net::{IpAddr, Ipv6Addr, SocketAddr},
    sync::{Arc, Mutex},
    time::Duration,
};

use gwiot_node::{Lookup, NameService};
use tokio::{runtime::Handle, sync::Notify, time::Instant};

use crate::HostError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Pending,
    Found { addr: Ipv6Addr, expires: Instant },
    Missing { expires: Instant },
}

/// [`NameService`] backed by the system resolver (`getaddrinfo` via
/// [`tokio::net::lookup_host`]).
///
/// Each query runs as its own task and writes its outcome into a shared
/// cache, then signals completion through [`Self::completion`]. IPv4
/// only hosts are reported as IPv4-mapped IPv6 addresses.
pub struct SystemNameService {
    cache: Arc<Mutex<HashMap<String, Entry>>>,
    completion: Arc<Notify>,
    runtime: Handle,
    ttl: Duration,
    negative_ttl: Duration,
}

impl SystemNameService {
    /// Must be called from within a tokio runtime
    pub fn new(ttl: Duration, negative_ttl: Duration) -> Result<Self, HostError> {
        Ok(Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
            completion: Arc::new(Notify::new()),
            runtime: Handle::try_current()?,
            ttl,
            negative_ttl,
        })
    }

    /// Notified once per finished query, found or not
    pub fn completion(&self) -> Arc<Notify> {
        self.completion.clone()
    }

    #[cfg(test)]
    fn insert(&self, name: &str, entry: Entry) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(name.to_string(), entry);
        }
    }
}

impl NameService for SystemNameService {
    fn lookup(&mut self, name: &str) -> Lookup {
        let Ok(cache) = self.cache.lock() else {
            log::error!("Name cache poisoned");
            return Lookup::Error;
        };
        let now = Instant::now();
        match cache.get(name) {
            None => Lookup::Uncached,
            Some(Entry::Pending) => Lookup::Resolving,
            Some(Entry::Found { addr, expires }) if now < *expires => {
                Lookup::Cached(crate::from_std(*addr))
            }
            Some(Entry::Missing { expires }) if now < *expires => Lookup::NotFound,
            Some(_) => Lookup::Expired,
        }
    }

    fn query(&mut self, name: &str) {
        match self.cache.lock() {
            Ok(mut cache) => {
                cache.insert(name.to_string(), Entry::Pending);
            }
            Err(_) => {
                log::error!("Name cache poisoned, dropping query for {name}");
                return;
            }
        }

        let name = name.to_string();
        let cache = self.cache.clone();
        let completion = self.completion.clone();
        let ttl = self.ttl;
        let negative_ttl = self.negative_ttl;

        self.runtime.spawn(async move {
            let entry = match tokio::net::lookup_host((name.as_str(), 0)).await {
                Ok(addrs) => match pick_address(addrs) {
                    Some(addr) => Entry::Found {
                        addr,
                        expires: Instant::now() + ttl,
                    },
                    None => {
                        log::warn!("No usable address for {name}");
                        Entry::Missing {
                            expires: Instant::now() + negative_ttl,
                        }
                    }
                },
                Err(e) => {
                    log::warn!("Lookup of {name} failed {e:}");
                    Entry::Missing {
                        expires: Instant::now() + negative_ttl,
                    }
                }
            };

            if let Ok(mut cache) = cache.lock() {
                cache.insert(name, entry);
            }
            completion.notify_one();
        });
    }
}

/// Prefer a native IPv6 address, fall back to a mapped IPv4 one
fn pick_address(addrs: impl Iterator<Item = SocketAddr>) -> Option<Ipv6Addr> {
    let mut mapped = None;
    for addr in addrs {
        match addr.ip() {
            IpAddr::V6(v6) => return Some(v6),
            IpAddr::V4(v4) => {
                mapped.get_or_insert(v4.to_ipv6_mapped());
            }
        }
    }
    mapped
}
