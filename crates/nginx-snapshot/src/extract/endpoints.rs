//! Status endpoint discovery.
//!
//! A `location` containing `api` (NGINX Plus) or `stub_status` (open source)
//! yields one URL built from the first listen address of its enclosing
//! `server`, however deeply the location is nested. URLs are kept in
//! traversal order without de-duplication. The host part follows these
//! rules:
//!
//! - a named listen host (`listen localhost:8080`) is used as is
//! - otherwise the first usable `server_name` wins (`_` is not usable)
//! - otherwise an IP listen host is kept, IPv6 in brackets
//! - wildcard hosts (`*`, `0.0.0.0`, `[::]`, none) become `localhost`

use std::net::IpAddr;

use nginx_snapshot_core::Result;

use crate::directive::{Directive, Payload};
use crate::traverse::traverse;

/// Candidate status URLs, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusEndpoints {
    /// `api` locations
    pub plus: Vec<String>,
    /// `stub_status` locations
    pub oss: Vec<String>,
}

impl StatusEndpoints {
    pub fn extend(&mut self, other: Self) {
        self.plus.extend(other.plus);
        self.oss.extend(other.oss);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plus.is_empty() && self.oss.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Host {
    Wildcard,
    Ip(String),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Listen {
    host: Host,
    port: u16,
}

const DEFAULT_PORT: u16 = 80;

fn classify(host: &str) -> Host {
    match host {
        "" | "*" | "0.0.0.0" => Host::Wildcard,
        h if h.parse::<IpAddr>().is_ok() => Host::Ip(h.to_string()),
        h => Host::Name(h.to_string()),
    }
}

/// Parse the address argument of `listen`. Unix sockets yield `None`.
fn parse_listen(arg: &str) -> Option<Listen> {
    if arg.starts_with("unix:") {
        return None;
    }

    if let Some(rest) = arg.strip_prefix('[') {
        let (addr, after) = rest.split_once(']')?;
        let port = match after.strip_prefix(':') {
            Some(p) => p.parse().ok()?,
            None if after.is_empty() => DEFAULT_PORT,
            None => return None,
        };
        let host = match addr.parse::<IpAddr>() {
            Ok(ip) if ip.is_unspecified() => Host::Wildcard,
            Ok(_) => Host::Ip(format!("[{addr}]")),
            Err(_) => return None,
        };
        return Some(Listen { host, port });
    }

    if !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit()) {
        return Some(Listen {
            host: Host::Wildcard,
            port: arg.parse().ok()?,
        });
    }

    match arg.rsplit_once(':') {
        Some((host, port)) => Some(Listen {
            host: classify(host),
            port: port.parse().ok()?,
        }),
        None => Some(Listen {
            host: classify(arg),
            port: DEFAULT_PORT,
        }),
    }
}

/// First `server_name` usable as a literal host.
fn server_name(server: &Directive) -> Option<&str> {
    server
        .children()
        .iter()
        .find(|d| d.is("server_name"))
        .and_then(Directive::first_arg)
        .filter(|name| {
            !name.is_empty() && *name != "_" && !name.starts_with('~') && !name.contains('*')
        })
}

/// `host:port` of the first TCP listen address of `server`.
fn server_address(server: &Directive) -> Option<String> {
    let mut listens = server.children().iter().filter(|d| d.is("listen")).peekable();
    let listen = if listens.peek().is_none() {
        Listen {
            host: Host::Wildcard,
            port: DEFAULT_PORT,
        }
    } else {
        listens.find_map(|d| d.first_arg().and_then(parse_listen))?
    };

    let name = server_name(server);
    let host = match listen.host {
        Host::Name(n) => n,
        Host::Ip(ip) => name.map_or(ip, str::to_string),
        Host::Wildcard => name.unwrap_or("localhost").to_string(),
    };
    Some(format!("{host}:{}", listen.port))
}

/// URI of a `location` if it can be requested literally.
fn location_uri(location: &Directive) -> Option<&str> {
    let uri = match location.args.as_slice() {
        [uri] => uri,
        [modifier, uri] if modifier == "=" || modifier == "^~" => uri,
        _ => return None,
    };
    uri.starts_with('/').then_some(uri.as_str())
}

/// Visitor that builds [`StatusEndpoints`] during a traversal.
///
/// Traversal is parent-before-children and `location` blocks only nest inside
/// a `server`, so the last `server` block seen encloses every location that
/// follows until the next one.
#[derive(Debug, Default)]
pub struct EndpointCollector {
    server: Option<String>,
    found: StatusEndpoints,
}

impl EndpointCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visit(&mut self, parent: Option<&Directive>, current: &Directive) {
        if current.is("server") && current.block.is_some() {
            self.server = server_address(current);
            return;
        }
        if !current.is("location") || !parent.is_some_and(|p| p.is("server") || p.is("location")) {
            return;
        }
        let (Some(address), Some(uri)) = (self.server.as_deref(), location_uri(current)) else {
            return;
        };

        let children = current.children();
        let url = format!("http://{address}{uri}");
        if children.iter().any(|d| d.is("api")) {
            self.found.plus.push(url.clone());
        }
        if children.iter().any(|d| d.is("stub_status")) {
            self.found.oss.push(url);
        }
    }

    #[must_use]
    pub fn finish(self) -> StatusEndpoints {
        self.found
    }
}

/// All status endpoints in `payload`
pub fn collect_endpoints(payload: &Payload) -> Result<StatusEndpoints> {
    let mut collector = EndpointCollector::new();
    traverse(payload, |parent, current| {
        collector.visit(parent, current);
        Ok(true)
    })?;
    Ok(collector.finish())
}
