//! # Handshake Flows
//!
//! An authenticating listener and connector talking over loopback TCP.
//!
//! ## Flows Tested:
//!
//! 1. **Accepted peer**: correct credential, stream handed over at the first application byte
//! 2. **Rejected peer**: both ends fail, the accept loop keeps serving
//! 3. **Concurrency**: many dials at once, each decided independently
//! 4. **Malformed peer**: partial frames never get a verdict

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use futures::future::join_all;
    use pc_01_connection_auth::{
        AuthConnector, AuthError, CountingAuthorizer, CredentialStore, FixedCredential,
        ProtocolError,
    };
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::time::timeout;

    const N: usize = 10;

    // =============================================================================
    // ACCEPTED AND REJECTED PEERS
    // =============================================================================

    #[tokio::test]
    async fn test_accepted_peer_delivers_first_byte() {
        init_telemetry();
        let (addr, mut events) = spawn_accept_loop(good_authorizer()).await;

        let store = CredentialStore::new();
        store.set_credential("127.0.0.1", good_credential());
        let connector = AuthConnector::tcp(store);

        let mut stream = timeout(STEP, connector.connect("127.0.0.1", addr.port()))
            .await
            .unwrap()
            .unwrap();
        stream.write_u8(MARKER).await.unwrap();

        match next_event(&mut events).await {
            ServerEvent::Accepted { login, first_byte } => {
                assert_eq!(login, "login");
                assert_eq!(first_byte, MARKER);
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_peer_fails_both_ends_and_loop_continues() {
        init_telemetry();
        let (addr, mut events) = spawn_accept_loop(good_authorizer()).await;

        let store = Arc::new(CredentialStore::new());
        store.set_credential("127.0.0.1", pc_01_connection_auth::Credential::new("x", "y"));
        let connector = AuthConnector::tcp(Arc::clone(&store));

        let err = timeout(STEP, connector.connect("127.0.0.1", addr.port()))
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, AuthError::AuthorizationFailed { .. }));
        assert_eq!(err.rejected_credential().unwrap().login(), "x");

        match next_event(&mut events).await {
            ServerEvent::Rejected(e) => {
                assert!(e.is_authorization_failure());
                assert_eq!(e.rejected_credential().unwrap().password(), "y");
            }
            other => panic!("expected rejection, got {other:?}"),
        }

        // Same listener, next client.
        store.set_credential("127.0.0.1", good_credential());
        let mut stream = timeout(STEP, connector.connect("127.0.0.1", addr.port()))
            .await
            .unwrap()
            .unwrap();
        stream.write_u8(MARKER).await.unwrap();
        assert!(matches!(
            next_event(&mut events).await,
            ServerEvent::Accepted { first_byte: MARKER, .. }
        ));
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_correct_dials_all_succeed() {
        init_telemetry();
        let counting = CountingAuthorizer::new(good_authorizer());
        let calls = counting.counter();
        let (addr, mut events) = spawn_accept_loop(counting).await;

        let connector = Arc::new(AuthConnector::tcp(FixedCredential::new(good_credential())));
        let dials = (0..N).map(|_| {
            let connector = Arc::clone(&connector);
            async move {
                let mut stream = connector.connect("127.0.0.1", addr.port()).await?;
                stream.write_u8(MARKER).await?;
                Ok::<_, AuthError>(stream)
            }
        });

        let results = timeout(STEP, join_all(dials)).await.unwrap();
        assert!(results.iter().all(Result::is_ok));

        let mut accepted = 0;
        for _ in 0..N {
            if let ServerEvent::Accepted { first_byte, .. } = next_event(&mut events).await {
                assert_eq!(first_byte, MARKER);
                accepted += 1;
            }
        }
        assert_eq!(accepted, N);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), N);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_wrong_dials_all_fail() {
        init_telemetry();
        let (addr, mut events) = spawn_accept_loop(good_authorizer()).await;

        let dials = (0..N).map(|_| {
            let connector = AuthConnector::tcp(FixedCredential::new(random_credential()));
            async move { connector.connect("127.0.0.1", addr.port()).await }
        });

        let results = timeout(STEP, join_all(dials)).await.unwrap();
        for result in &results {
            assert!(matches!(result, Err(AuthError::AuthorizationFailed { .. })));
        }

        for _ in 0..N {
            assert!(matches!(
                next_event(&mut events).await,
                ServerEvent::Rejected(AuthError::AuthorizationFailed { .. })
            ));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_mixed_concurrent_dials_get_their_own_verdicts() {
        init_telemetry();
        let (addr, mut events) = spawn_accept_loop(good_authorizer()).await;

        let dials = (0..2 * N).map(|i| {
            let good = i % 2 == 0;
            let credential = if good {
                good_credential()
            } else {
                random_credential()
            };
            let connector = AuthConnector::tcp(FixedCredential::new(credential));
            async move {
                let result = match connector.connect("127.0.0.1", addr.port()).await {
                    Ok(mut stream) => stream.write_u8(MARKER).await.map_err(AuthError::from),
                    Err(e) => Err(e),
                };
                (good, result)
            }
        });

        let results = timeout(STEP, join_all(dials)).await.unwrap();
        for (good, result) in &results {
            if *good {
                assert!(result.is_ok(), "good credential failed: {result:?}");
            } else {
                assert!(matches!(result, Err(AuthError::AuthorizationFailed { credential })
                    if credential.login().starts_with("rand-")));
            }
        }

        let (mut accepted, mut rejected) = (0, 0);
        for _ in 0..2 * N {
            match next_event(&mut events).await {
                ServerEvent::Accepted { login, first_byte } => {
                    assert_eq!(login, "login");
                    assert_eq!(first_byte, MARKER);
                    accepted += 1;
                }
                ServerEvent::Rejected(e) => {
                    assert!(e.rejected_credential().unwrap().login().starts_with("rand-"));
                    rejected += 1;
                }
            }
        }
        assert_eq!((accepted, rejected), (N, N));
    }

    // =============================================================================
    // MALFORMED PEERS
    // =============================================================================

    #[tokio::test]
    async fn test_partial_login_gets_no_verdict() {
        init_telemetry();
        let (addr, mut events) = spawn_accept_loop(good_authorizer()).await;

        let mut raw = TcpStream::connect(addr).await.unwrap();
        raw.write_all(&[0x00, 0x05, b'l', b'o']).await.unwrap();
        raw.shutdown().await.unwrap();

        match next_event(&mut events).await {
            ServerEvent::Rejected(AuthError::Protocol(ProtocolError::Truncated { field })) => {
                assert_eq!(field, "login");
            }
            other => panic!("expected truncated login, got {other:?}"),
        }

        let mut reply = Vec::new();
        timeout(STEP, raw.read_to_end(&mut reply))
            .await
            .unwrap()
            .unwrap();
        assert!(reply.is_empty());
    }

    #[tokio::test]
    async fn test_raw_client_sees_verdict_bytes() {
        init_telemetry();
        let (addr, mut events) = spawn_accept_loop(good_authorizer()).await;

        // "login" / "password" framed by hand.
        let mut frame = vec![0x00, 0x05];
        frame.extend_from_slice(b"login");
        frame.extend_from_slice(&[0x00, 0x08]);
        frame.extend_from_slice(b"password");

        let mut raw = TcpStream::connect(addr).await.unwrap();
        raw.write_all(&frame).await.unwrap();
        assert_eq!(timeout(STEP, raw.read_u8()).await.unwrap().unwrap(), 0x00);
        raw.write_u8(MARKER).await.unwrap();
        assert!(matches!(
            next_event(&mut events).await,
            ServerEvent::Accepted { first_byte: MARKER, .. }
        ));

        let last = frame.len() - 1;
        frame[last] = b'X';
        let mut raw = TcpStream::connect(addr).await.unwrap();
        raw.write_all(&frame).await.unwrap();
        assert_ne!(timeout(STEP, raw.read_u8()).await.unwrap().unwrap(), 0x00);
        assert!(matches!(
            next_event(&mut events).await,
            ServerEvent::Rejected(AuthError::AuthorizationFailed { .. })
        ));

        // Nothing follows a rejection: the server end is closed.
        let mut rest = Vec::new();
        timeout(STEP, raw.read_to_end(&mut rest))
            .await
            .unwrap()
            .unwrap();
        assert!(rest.is_empty());
    }
}
