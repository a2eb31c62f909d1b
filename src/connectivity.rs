//! Network reachability signal
//!
//! The weather cache only asks one question: is the network reachable right
//! now? It does not own the answer.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// A reachability answer fixed by the caller (e.g. `--offline`)
#[derive(Debug)]
pub struct StaticConnectivity {
    online: AtomicBool,
}

impl StaticConnectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn online() -> Self {
        Self::new(true)
    }

    pub fn offline() -> Self {
        Self::new(false)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connectivity for StaticConnectivity {
    async fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Treats the network as reachable if a TCP connection to `addr` opens
/// within `timeout`
#[derive(Debug, Clone)]
pub struct ProbeConnectivity {
    addr: String,
    timeout: Duration,
}

impl ProbeConnectivity {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Connectivity for ProbeConnectivity {
    async fn is_online(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(self.addr.as_str())).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(addr = %self.addr, error = %e, "connectivity probe failed");
                false
            }
            Err(_) => {
                debug!(addr = %self.addr, timeout = ?self.timeout, "connectivity probe timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_static_connectivity_toggles() {
        let conn = StaticConnectivity::offline();
        assert!(!conn.is_online().await);
        conn.set_online(true);
        assert!(conn.is_online().await);
    }

    #[tokio::test]
    async fn test_probe_succeeds_against_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let probe = ProbeConnectivity::new(addr, Duration::from_secs(1));
        assert!(probe.is_online().await);
    }

    #[tokio::test]
    async fn test_probe_fails_when_nothing_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let probe = ProbeConnectivity::new(addr, Duration::from_secs(1));
        assert!(!probe.is_online().await);
    }
}
