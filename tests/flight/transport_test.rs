#[cfg(test)]
mod tests {
    use quiver::config::Settings;
    use quiver::flight::protocol::{ActionRequest, ActionResponse, ErrorInfo};
    use quiver::flight::{ActionClient, ActionTransport, FlightError};
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    /// Serve one connection, answering per action name:
    /// `healthcheck` succeeds empty, `echo` returns the body unchanged,
    /// `fail` answers with an error, anything else is never answered.
    async fn spawn_server() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut reader = BufReader::new(read_half);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
                let request: ActionRequest = match serde_json::from_str(&line) {
                    Ok(r) => r,
                    Err(_) => break,
                };
                let response = match request.action.as_str() {
                    "healthcheck" => ActionResponse {
                        id: request.id,
                        success: true,
                        body: None,
                        error: None,
                    },
                    "echo" => ActionResponse {
                        id: request.id,
                        success: true,
                        body: Some(request.body),
                        error: None,
                    },
                    "fail" => ActionResponse {
                        id: request.id,
                        success: false,
                        body: None,
                        error: Some(ErrorInfo {
                            code: "DATASET_EXISTS".to_string(),
                            message: "dataset already exists".to_string(),
                        }),
                    },
                    _ => continue,
                };
                let mut payload = serde_json::to_string(&response).unwrap();
                payload.push('\n');
                if write_half.write_all(payload.as_bytes()).await.is_err() {
                    break;
                }
            }
        });

        addr
    }

    #[tokio::test]
    async fn test_connect_runs_healthcheck() {
        let addr = spawn_server().await;
        let client = ActionClient::connect("127.0.0.1", addr.port()).await.unwrap();
        assert!(client.is_alive());
    }

    #[tokio::test]
    async fn test_connect_with_settings_wires_transport_config() {
        let addr = spawn_server().await;
        let document = format!(
            "[transport]\nhost = \"127.0.0.1\"\nport = {}\ntimeout_secs = 5\n",
            addr.port()
        );
        let settings: Settings = toml::from_str(&document).unwrap();
        assert_eq!(settings.transport.endpoint(), addr.to_string());

        let client = ActionClient::connect_with_settings(&settings).await.unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(5));

        let reply = client.request("echo", b"configured").await.unwrap();
        assert_eq!(reply, b"configured");
    }

    #[tokio::test]
    async fn test_request_round_trips_opaque_bytes() {
        let addr = spawn_server().await;
        let client = ActionClient::connect("127.0.0.1", addr.port()).await.unwrap();

        let reply = client.request("echo", b"feature bytes \x00\x01").await.unwrap();
        assert_eq!(reply, b"feature bytes \x00\x01");
    }

    #[tokio::test]
    async fn test_transport_trait_delegates() {
        let addr = spawn_server().await;
        let client = ActionClient::connect("127.0.0.1", addr.port()).await.unwrap();

        let transport: &dyn ActionTransport = &client;
        let reply = transport.do_action("echo", b"payload".to_vec()).await.unwrap();
        assert_eq!(reply, b"payload");
    }

    #[tokio::test]
    async fn test_remote_error_carries_server_code() {
        let addr = spawn_server().await;
        let client = ActionClient::connect("127.0.0.1", addr.port()).await.unwrap();

        let err = client.request("fail", b"").await.unwrap_err();
        match err {
            FlightError::Remote { code, message } => {
                assert_eq!(code, "DATASET_EXISTS");
                assert_eq!(message, "dataset already exists");
            }
            other => panic!("expected Remote, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unanswered_request_times_out() {
        let addr = spawn_server().await;
        let client =
            ActionClient::connect_with_timeout("127.0.0.1", addr.port(), Duration::from_millis(250))
                .await
                .unwrap();

        let err = client.request("black-hole", b"").await.unwrap_err();
        assert!(matches!(err, FlightError::Timeout(_)));
        assert!(err.is_retriable());

        // The connection itself is still usable afterwards.
        let reply = client.request("echo", b"still here").await.unwrap();
        assert_eq!(reply, b"still here");
    }

    #[tokio::test]
    async fn test_connect_to_dead_server() {
        // Bind then drop to find a port nobody is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = ActionClient::connect("127.0.0.1", addr.port()).await.unwrap_err();
        assert!(matches!(err, FlightError::Connect(_)));
    }
}
