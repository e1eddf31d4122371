//! Server lifecycle management.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use tiny_http::Server;

use crate::core::register_server;
use crate::{debug, log};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = String::new();

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => {
                debug!("serve"; "cannot bind {}: {}", addr, e);
                last_error = e.to_string();
            }
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error
    ))
}

/// Register server for graceful shutdown.
///
/// When Ctrl+C is pressed, the handler set up in main() unblocks the
/// request loop.
pub fn register_server_for_shutdown(server: Arc<Server>) {
    register_server(server);
}

/// Wait until every in-flight request has released its sender, at most
/// `timeout`.
pub fn wait_for_requests(done: &Receiver<()>, timeout: Duration) {
    match done.recv_timeout(timeout) {
        Err(RecvTimeoutError::Timeout) => {
            log!("serve"; "gave up waiting for in-flight requests");
        }
        Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel;
    use std::net::Ipv4Addr;
    use std::thread;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_bind_skips_taken_port() {
        let taken = Server::http(SocketAddr::new(LOCALHOST, 0)).unwrap();
        let port = taken.server_addr().to_ip().unwrap().port();

        let (_server, addr) = bind_with_retry(LOCALHOST, port).unwrap();
        assert!(addr.port() > port);
        assert!(u32::from(addr.port()) < u32::from(port) + u32::from(MAX_PORT_RETRIES));
    }

    #[test]
    fn test_wait_returns_when_requests_finish() {
        let (tx, rx) = channel::bounded::<()>(0);
        let worker = tx.clone();
        drop(tx);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            drop(worker);
        });

        let started = std::time::Instant::now();
        wait_for_requests(&rx, Duration::from_secs(5));
        assert!(started.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }
}
