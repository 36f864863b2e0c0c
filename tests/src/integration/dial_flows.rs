//! # Dial Flows
//!
//! Connector-side behaviour over loopback TCP.
//!
//! ## Flows Tested:
//!
//! 1. **Missing credential**: the dial is closed before any byte is sent
//! 2. **Plain `Connector` surface**: failures arrive as `io::Error` wrapping `AuthError`
//! 3. **Config-driven setup**: listener and connector built from a TOML document

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use pc_01_connection_auth::{
        AuthConfig, AuthConnector, AuthError, AuthListener, Connector, CredentialStore,
        ProtocolError, TcpConnector,
    };
    use std::io;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::time::timeout;

    // =============================================================================
    // MISSING CREDENTIAL
    // =============================================================================

    #[tokio::test]
    async fn test_unknown_destination_sends_nothing() {
        init_telemetry();
        let (addr, mut events) = spawn_accept_loop(good_authorizer()).await;

        let store = CredentialStore::new();
        store.set_credential("some-other-host", good_credential());
        let connector = AuthConnector::tcp(store);

        let err = timeout(STEP, connector.connect("127.0.0.1", addr.port()))
            .await
            .unwrap()
            .unwrap_err();
        assert!(
            matches!(err, AuthError::NoCredential { ref destination } if destination == "127.0.0.1")
        );

        // The server saw the connection open and close with zero bytes.
        match next_event(&mut events).await {
            ServerEvent::Rejected(AuthError::Protocol(ProtocolError::Truncated { field })) => {
                assert_eq!(field, "login");
            }
            other => panic!("expected an empty connection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connect_refused_is_io_error() {
        init_telemetry();
        let port = {
            let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
            probe.local_addr().unwrap().port()
        };

        let store = CredentialStore::new();
        store.set_credential("127.0.0.1", good_credential());
        let err = AuthConnector::tcp(store)
            .connect("127.0.0.1", port)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Io(_)));
        assert!(!err.is_authorization_failure());
    }

    // =============================================================================
    // PLAIN CONNECTOR SURFACE
    // =============================================================================

    #[tokio::test]
    async fn test_rejection_downcasts_from_io_error() {
        init_telemetry();
        let (addr, _events) = spawn_accept_loop(good_authorizer()).await;

        let store = CredentialStore::new();
        store.set_credential("127.0.0.1", random_credential());
        let connector = AuthConnector::tcp(store);

        let err: io::Error = Connector::connect(&connector, "127.0.0.1", addr.port())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);

        let auth = err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<AuthError>())
            .expect("io::Error should wrap the AuthError");
        assert!(auth.rejected_credential().unwrap().login().starts_with("rand-"));
    }

    #[tokio::test]
    async fn test_connector_stacks_under_generic_code() {
        init_telemetry();
        let (addr, mut events) = spawn_accept_loop(good_authorizer()).await;

        async fn dial_and_mark<C: Connector>(connector: &C, port: u16) -> io::Result<()> {
            let mut stream = connector.connect("127.0.0.1", port).await?;
            stream.write_u8(MARKER).await
        }

        let store = Arc::new(CredentialStore::new());
        store.set_credential("127.0.0.1", good_credential());
        let connector = AuthConnector::new(TcpConnector::new(), Arc::clone(&store));

        timeout(STEP, dial_and_mark(&connector, addr.port()))
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            next_event(&mut events).await,
            ServerEvent::Accepted { first_byte: MARKER, .. }
        ));
    }

    // =============================================================================
    // CONFIG-DRIVEN SETUP
    // =============================================================================

    #[tokio::test]
    async fn test_config_driven_listener_and_connector() {
        init_telemetry();
        let config = AuthConfig::parse(
            r#"
            [listener]
            bind_addr = "127.0.0.1:0"
            handshake_timeout_ms = 200

            [connector]
            nodelay = true
            connect_timeout_ms = 2000
            handshake_timeout_ms = 2000
            "#,
        )
        .unwrap();

        let listener = AuthListener::bind(config.listener.bind_addr, good_authorizer())
            .await
            .unwrap()
            .with_options(config.listener.handshake);
        assert_eq!(
            listener.options().timeout,
            Some(Duration::from_millis(200))
        );
        let (addr, mut events) = serve(listener);

        // A peer that never speaks is cut off by the listener deadline.
        let _silent = TcpStream::connect(addr).await.unwrap();
        match next_event(&mut events).await {
            ServerEvent::Rejected(AuthError::TimedOut { after }) => {
                assert_eq!(after, Duration::from_millis(200));
            }
            other => panic!("expected a timeout, got {other:?}"),
        }

        // A well-behaved client still gets through.
        let store = CredentialStore::new();
        store.set_credential("127.0.0.1", good_credential());
        let connector = AuthConnector::new(TcpConnector::with_config(config.connector.tcp), store)
            .with_options(config.connector.handshake);

        let mut stream = timeout(STEP, connector.connect("127.0.0.1", addr.port()))
            .await
            .unwrap()
            .unwrap();
        assert!(stream.nodelay().unwrap());
        stream.write_u8(MARKER).await.unwrap();
        assert!(matches!(
            next_event(&mut events).await,
            ServerEvent::Accepted { first_byte: MARKER, .. }
        ));
    }
}
