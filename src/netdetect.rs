use anyhow::Result;
use if_addrs::{get_if_addrs, IfAddr};
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::SweepError;

/// Detect local non-loopback IPv4 interface addresses, sorted and deduplicated.
pub fn detect_local_ipv4s() -> Result<Vec<Ipv4Addr>> {
    let mut set = BTreeSet::new();
    for iface in get_if_addrs()? {
        if let IfAddr::V4(v4) = iface.addr {
            if v4.ip.is_loopback() {
                continue;
            }
            set.insert(v4.ip);
        }
    }
    Ok(set.into_iter().collect())
}

/// Build the network an address belongs to, masking off host bits.
///
/// `prefix` is the raw subnet field; it must be an optionally signed run of
/// ASCII digits. An address that does not parse, or an integer that is not a
/// valid prefix length for the family (negative, overflowing, too long), is
/// an `InvalidNetwork`.
pub fn parse_network(ip: &str, prefix: &str) -> Result<IpNet, SweepError> {
    let digits = prefix.strip_prefix(['+', '-']).unwrap_or(prefix);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SweepError::InvalidPrefix);
    }
    // Any integer is a number; one that is not a valid prefix length is a bad network.
    let prefix: u8 = prefix.parse().map_err(|_| SweepError::InvalidNetwork)?;
    let addr: IpAddr = ip.parse().map_err(|_| SweepError::InvalidNetwork)?;
    let net = IpNet::new(addr, prefix).map_err(|_| SweepError::InvalidNetwork)?;
    Ok(net.trunc())
}

/// Number of usable host addresses in `net`, without materialising them.
///
/// Saturates at `u128::MAX` for an IPv6 /0.
pub fn host_count(net: &IpNet) -> u128 {
    match net {
        IpNet::V4(n4) => match n4.prefix_len() {
            32 => 1,
            31 => 2,
            p => (1u128 << (32 - p)) - 2,
        },
        IpNet::V6(n6) => match n6.prefix_len() {
            128 => 1,
            127 => 2,
            p => 1u128
                .checked_shl(u32::from(128 - p))
                .map(|n| n - 1)
                .unwrap_or(u128::MAX),
        },
    }
}

/// Expand a network into its host addresses, in ascending order.
///
/// IPv4 skips the network and broadcast addresses; IPv6 skips the
/// subnet-router anycast address. Point-to-point (/31, /127) and single-host
/// (/32, /128) networks keep every address. Check `host_count` first: this
/// allocates one entry per host.
pub fn expand_hosts(net: &IpNet) -> Vec<IpAddr> {
    match net {
        IpNet::V4(n4) => expand_ipv4net_hosts(*n4).into_iter().map(IpAddr::V4).collect(),
        IpNet::V6(n6) => expand_ipv6net_hosts(*n6).into_iter().map(IpAddr::V6).collect(),
    }
}

fn expand_ipv4net_hosts(net: Ipv4Net) -> Vec<Ipv4Addr> {
    let start = u32::from(net.network());
    let end = u32::from(net.broadcast());
    if net.prefix_len() >= 31 {
        return (start..=end).map(Ipv4Addr::from).collect();
    }
    (start + 1..end).map(Ipv4Addr::from).collect()
}

fn expand_ipv6net_hosts(net: Ipv6Net) -> Vec<Ipv6Addr> {
    let start = u128::from(net.network());
    let end = u128::from(net.broadcast());
    if net.prefix_len() >= 127 {
        return (start..=end).map(Ipv6Addr::from).collect();
    }
    (start + 1..=end).map(Ipv6Addr::from).collect()
}
