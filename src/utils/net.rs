use std::io;
use std::net::TcpListener;

use tokio::net::TcpStream;

/// Checks whether something is accepting TCP connections at `addr`.
pub async fn is_server_ready(addr: &str) -> bool {
    TcpStream::connect(addr).await.is_ok()
}

/// Reserves `count` distinct ephemeral ports by binding local listeners.
///
/// All listeners are held until return so the same port is never handed out
/// twice. The ports are free at return time, not leased.
pub fn get_available_ports(count: usize) -> io::Result<Vec<u16>> {
    let mut ports = Vec::with_capacity(count);
    let mut listeners = Vec::with_capacity(count);

    for _ in 0..count {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        ports.push(listener.local_addr()?.port());
        listeners.push(listener);
    }

    Ok(ports)
}
