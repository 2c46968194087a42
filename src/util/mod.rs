//! Utility functions shared across the application.

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::warn;

/// Find an available port, starting from the preferred port.
///
/// Development servers get restarted constantly and the previous
/// instance may still hold the port, so rather than failing we probe:
/// the preferred port first, then the next 10 consecutive ports, then
/// whatever the OS hands out.
pub async fn find_available_port(host: &str, preferred: u16) -> std::io::Result<u16> {
    let parse_addr = |port: u16| -> std::io::Result<SocketAddr> {
        format!("{}:{}", host, port)
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    };

    if let Ok(listener) = TcpListener::bind(parse_addr(preferred)?).await {
        drop(listener);
        return Ok(preferred);
    }

    for offset in 1..=10 {
        let port = preferred.saturating_add(offset);
        if let Ok(listener) = TcpListener::bind(parse_addr(port)?).await {
            drop(listener);
            warn!(
                preferred,
                actual = port,
                "Preferred port unavailable, using alternate"
            );
            return Ok(port);
        }
    }

    let listener = TcpListener::bind(parse_addr(0)?).await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    warn!(preferred, actual = port, "Using OS-assigned port");
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_available_port_preferred() {
        let preferred = 49152;
        let port = find_available_port("127.0.0.1", preferred).await.unwrap();
        assert!(port > 0);
    }

    #[tokio::test]
    async fn test_find_available_port_fallback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let bound_port = listener.local_addr().unwrap().port();

        let port = find_available_port("127.0.0.1", bound_port).await.unwrap();
        assert!(port > 0);
        assert_ne!(port, bound_port);

        drop(listener);
    }

    #[tokio::test]
    async fn test_find_available_port_invalid_host() {
        let result = find_available_port("invalid-host-format[", 8080).await;
        assert!(result.is_err());
    }
}
