use std::net::{IpAddr, SocketAddr, UdpSocket};

/// Best guess at this machine's LAN address
///
/// Connecting a UDP socket only picks a route, no packet is sent.
pub fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();

    if ip.is_loopback() || ip.is_unspecified() {
        None
    } else {
        Some(ip)
    }
}

/// Lines printed at startup telling users how to reach the server
pub fn connection_hints(bound: SocketAddr, lan_ip: Option<IpAddr>) -> Vec<String> {
    let host = match lan_ip {
        Some(ip) => ip.to_string(),
        None if bound.ip().is_unspecified() => "No IP found".to_string(),
        None => bound.ip().to_string(),
    };
    let port = bound.port();

    vec![
        format!("Server started on {}:{}", host, port),
        format!("Clients can connect using: nc {} {}", host, port),
        format!("Use these flags --ip={} --port={}", host, port),
    ]
}
