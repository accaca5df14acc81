use anyhow::{Context as AnyhowContext, Result};
use std::net::SocketAddr;

/// Resolve `bind` and reject any address that is reachable from other hosts
/// unless `public` is set. The upload route writes to the store, so exposing
/// it has to be explicit.
pub(crate) async fn check_bind_address(bind: &str, public: bool) -> Result<Vec<SocketAddr>> {
    let resolved: Vec<SocketAddr> = tokio::net::lookup_host(bind)
        .await
        .with_context(|| format!("Cannot resolve bind address {bind}"))?
        .collect();
    if resolved.is_empty() {
        anyhow::bail!("Bind address {bind} resolved to nothing");
    }

    if !public {
        if let Some(exposed) = resolved.iter().find(|addr| !addr.ip().is_loopback()) {
            anyhow::bail!(
                "Refusing to bind {bind} ({exposed} is not loopback); pass --public to serve other hosts"
            );
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loopback_is_allowed_without_public() {
        let addrs = check_bind_address("127.0.0.1:0", false).await.unwrap();
        assert!(addrs.iter().all(|addr| addr.ip().is_loopback()));
    }

    #[tokio::test]
    async fn wildcard_needs_public() {
        let err = check_bind_address("0.0.0.0:0", false).await.unwrap_err();
        assert!(err.to_string().contains("--public"));
        check_bind_address("0.0.0.0:0", true).await.unwrap();
    }

    #[tokio::test]
    async fn garbage_address_is_an_error() {
        assert!(check_bind_address("not an address", false).await.is_err());
    }
}
