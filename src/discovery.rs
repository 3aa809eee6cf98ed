use anyhow::{anyhow, Context, Result};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs, UdpSocket};
use sysinfo::{System, SystemExt};
use tracing::error;

/// Always offered, whatever the lookups return
pub const LOOPBACK: &str = "127.0.0.1";

/// Public address used only to let the OS pick the outbound interface
const PROBE_TARGET: (Ipv4Addr, u16) = (Ipv4Addr::new(8, 8, 8, 8), 80);

/// Collect the IPv4 addresses of this host
///
/// Each lookup step is independent; failures are logged and the loopback
/// address is always part of the result.
pub fn discover_addresses() -> Vec<String> {
    collect_addresses(host_addresses(), outbound_address())
}

/// Merge the lookup outcomes, logging the failed ones
fn collect_addresses(host: Result<Vec<Ipv4Addr>>, outbound: Result<Ipv4Addr>) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    match host {
        Ok(addresses) => found.extend(addresses.iter().map(Ipv4Addr::to_string)),
        Err(e) => error!("Error getting interface addresses: {:#}", e),
    }

    match outbound {
        Ok(address) => found.push(address.to_string()),
        Err(e) => error!("Error getting primary address: {:#}", e),
    }

    found.push(LOOPBACK.to_string());
    sort_addresses(found)
}

/// Addresses the host name resolves to
fn host_addresses() -> Result<Vec<Ipv4Addr>> {
    let system = System::new();
    let host = system
        .host_name()
        .ok_or_else(|| anyhow!("Host name is not available"))?;

    let addresses = (host.as_str(), 0)
        .to_socket_addrs()
        .with_context(|| format!("Failed to resolve host name {}", host))?
        .filter_map(|addr| match addr.ip() {
            IpAddr::V4(ip) => Some(ip),
            IpAddr::V6(_) => None,
        })
        .collect();

    Ok(addresses)
}

/// Local address the OS would use to reach the outside world
///
/// Connecting a UDP socket sends nothing; it only binds a route.
fn outbound_address() -> Result<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).context("Failed to bind probe socket")?;
    socket
        .connect(PROBE_TARGET)
        .context("Failed to route probe socket")?;

    match socket.local_addr().context("Failed to read probe address")?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() => Ok(ip),
        other => Err(anyhow!("Probe socket has no usable address: {}", other)),
    }
}

/// Deduplicate and order addresses segment by segment as numbers
pub fn sort_addresses<I>(addresses: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let unique: HashSet<String> = addresses.into_iter().collect();
    let mut sorted: Vec<String> = unique.into_iter().collect();
    sorted.sort_by(|a, b| compare_segments(a, b));
    sorted
}

/// `10.2.0.1` < `10.10.0.1`; non-numeric segments sort after numeric ones
fn compare_segments(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        let ordering = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match (x.parse::<u64>(), y.parse::<u64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                (Ok(_), Err(_)) => Ordering::Less,
                (Err(_), Ok(_)) => Ordering::Greater,
                (Err(_), Err(_)) => x.cmp(y),
            },
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}
