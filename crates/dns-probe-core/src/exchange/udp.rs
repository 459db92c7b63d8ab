use crate::config::normalize_server;
use crate::error::{Error, ExchangePhase, Result};
use crate::traits::{DnsExchange, Exchanged};
use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::{UdpSocket, lookup_host};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP, one fresh socket per exchange
///
/// The timeout bounds each phase separately: dial (resolve + connect),
/// write and read.
#[derive(Debug, Clone)]
pub struct UdpExchange {
    server: String,
    timeout: Duration,
}

impl UdpExchange {
    /// Create an exchange bound to `server`, defaulting the port to 53
    pub fn new(server: &str, timeout: Duration) -> Self {
        Self {
            server: normalize_server(server),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn dial(&self) -> Result<UdpSocket> {
        let addr = lookup_host(self.server.as_str()).await?.next().ok_or_else(|| {
            Error::Transport(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no address for {}", self.server),
            ))
        })?;

        let bind_addr: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(addr).await?;
        Ok(socket)
    }
}

#[async_trait]
impl DnsExchange for UdpExchange {
    async fn exchange(&self, query: &Message) -> Result<Exchanged> {
        let wire = query.to_vec()?;

        let socket = timeout(self.timeout, self.dial())
            .await
            .map_err(|_| Error::timeout(ExchangePhase::Dial, &self.server))??;

        let started = Instant::now();

        let bytes_sent = timeout(self.timeout, socket.send(&wire))
            .await
            .map_err(|_| Error::timeout(ExchangePhase::Write, &self.server))??;

        debug!(server = %self.server, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let bytes_received = timeout(self.timeout, socket.recv(&mut recv_buf))
            .await
            .map_err(|_| Error::timeout(ExchangePhase::Read, &self.server))??;

        let rtt = started.elapsed();
        recv_buf.truncate(bytes_received);

        debug!(server = %self.server, bytes_received, "UDP response received");

        let response = Message::from_vec(&recv_buf)?;

        if response.id() != query.id() {
            warn!(
                server = %self.server,
                expected = query.id(),
                received = response.id(),
                "UDP response with mismatched id"
            );
            return Err(Error::protocol(format!(
                "id mismatch: expected {}, got {}",
                query.id(),
                response.id()
            )));
        }

        if response.message_type() != MessageType::Response {
            return Err(Error::protocol("received a query instead of a response"));
        }

        Ok(Exchanged { response, rtt })
    }

    fn server(&self) -> &str {
        &self.server
    }
}
