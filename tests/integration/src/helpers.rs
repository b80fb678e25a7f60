//! Test helpers for integration tests
//!
//! Spawns the REST API and the WebSocket gateway in-process over shared
//! memory stores, and provides HTTP and WebSocket clients for them.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use chat_common::{AppConfig, GatewayConfig, JwtService};
use chat_db::{MemoryMessageStore, MemoryUserDirectory};
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::fixtures::{AuthResponse, SignupRequest};

/// How long a client waits for an expected event
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

const JWT_SECRET: &str = "integration-test-secret";

/// API and gateway sharing one user directory and message store
pub struct TestServer {
    pub api_addr: SocketAddr,
    pub gateway_addr: SocketAddr,
    pub client: Client,
    pub users: Arc<MemoryUserDirectory>,
    pub messages: Arc<MemoryMessageStore>,
    _handles: Vec<JoinHandle<()>>,
}

impl TestServer {
    /// Start with default gateway settings
    pub async fn start() -> Result<Self> {
        Self::start_with_gateway(GatewayConfig::default()).await
    }

    /// Start with custom gateway settings (timeouts, buffers, default rooms)
    pub async fn start_with_gateway(gateway: GatewayConfig) -> Result<Self> {
        let config = test_config()?;
        let jwt = Arc::new(JwtService::new(JWT_SECRET, config.jwt.token_expiry));
        let users = Arc::new(MemoryUserDirectory::new());
        let messages = Arc::new(MemoryMessageStore::new());

        let api_state =
            chat_api::build_app_state(config, jwt.clone(), users.clone(), messages.clone())?;
        let api_app = chat_api::create_app_with_config(api_state)?;
        let api_listener = TcpListener::bind("127.0.0.1:0").await?;
        let api_addr = api_listener.local_addr()?;

        let gateway_state =
            chat_gateway::build_gateway_state(gateway, jwt, users.clone(), messages.clone());
        let gateway_app = chat_gateway::create_app(gateway_state);
        let gateway_listener = TcpListener::bind("127.0.0.1:0").await?;
        let gateway_addr = gateway_listener.local_addr()?;

        let handles = vec![
            tokio::spawn(async move {
                chat_api::serve(api_listener, api_app).await.ok();
            }),
            tokio::spawn(async move {
                chat_gateway::serve(gateway_listener, gateway_app).await.ok();
            }),
        ];

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            api_addr,
            gateway_addr,
            client,
            users,
            messages,
            _handles: handles,
        })
    }

    /// Get base URL for the API
    pub fn base_url(&self) -> String {
        format!("http://{}", self.api_addr)
    }

    /// Gateway URL carrying `token` in the query string
    pub fn gateway_url(&self, token: &str) -> String {
        format!("ws://{}/gateway?token={}", self.gateway_addr, token)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    /// Sign up a fresh account through the REST API
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse> {
        let response = self.post("/api/auth/signup", request).await?;
        assert_json(response, StatusCode::CREATED).await
    }

    /// Sign up a unique account with the given name prefix
    pub async fn signup_unique(&self, prefix: &str) -> Result<AuthResponse> {
        self.signup(&SignupRequest::unique(prefix)).await
    }

    /// Open a gateway connection and wait for `ready`
    pub async fn connect(&self, token: &str) -> Result<WsClient> {
        let (stream, _) = connect_async(self.gateway_url(token)).await?;
        let mut client = WsClient {
            stream,
            pending: VecDeque::new(),
            ready: Value::Null,
        };

        // Presence broadcasts may overtake `ready`; keep them for later reads
        loop {
            let event = client.read_event(EVENT_TIMEOUT).await?;
            if event["event"] == "ready" {
                client.ready = event["data"].clone();
                break;
            }
            client.pending.push_back(event);
        }

        Ok(client)
    }

    /// Open the first connection of `auth`'s user and wait until its own
    /// `user_online` has arrived, so later reads start from a quiet stream
    pub async fn connect_online(&self, auth: &AuthResponse) -> Result<WsClient> {
        let mut client = self.connect(&auth.token).await?;
        client.wait_for_user("user_online", &auth.user.id).await?;
        Ok(client)
    }

    /// Attempt a gateway handshake and return the HTTP status of a rejection
    pub async fn rejected_handshake(&self, url: &str) -> Result<StatusCode> {
        match connect_async(url).await {
            Ok(_) => bail!("handshake unexpectedly succeeded"),
            Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
                Ok(StatusCode::from_u16(response.status().as_u16())?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Configuration for the in-process servers. Nothing is read from the
/// environment; the database URL is never used.
pub fn test_config() -> Result<AppConfig> {
    let vars: HashMap<&str, &str> = [
        ("APP_ENV", "development"),
        ("API_PORT", "0"),
        ("GATEWAY_PORT", "0"),
        ("DATABASE_URL", "postgres://unused"),
        ("JWT_SECRET", JWT_SECRET),
        ("RATE_LIMIT_REQUESTS_PER_SECOND", "1000"),
        ("RATE_LIMIT_BURST", "1000"),
    ]
    .into_iter()
    .collect();

    AppConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()))
        .map_err(|e| anyhow!("Config error: {e}"))
}

/// A gateway client speaking `{"event", "data"}` JSON frames
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    pending: VecDeque<Value>,
    /// Payload of the `ready` event
    pub ready: Value,
}

impl WsClient {
    /// Send a client event
    pub async fn send_event(&mut self, event: &str, data: Value) -> Result<()> {
        let frame = json!({ "event": event, "data": data });
        self.stream.send(Message::Text(frame.to_string())).await?;
        Ok(())
    }

    /// Send a raw frame
    pub async fn send_raw(&mut self, message: Message) -> Result<()> {
        self.stream.send(message).await?;
        Ok(())
    }

    /// Next event, whatever its name
    pub async fn next_event(&mut self) -> Result<Value> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(event);
        }
        self.read_event(EVENT_TIMEOUT).await
    }

    /// Next event, which must be named `name`; returns its `data`
    pub async fn expect_event(&mut self, name: &str) -> Result<Value> {
        let event = self.next_event().await?;
        if event["event"] != name {
            bail!("expected `{name}`, got {event}");
        }
        Ok(event["data"].clone())
    }

    /// Skip events until one named `name` arrives; returns its `data`
    pub async fn wait_for(&mut self, name: &str) -> Result<Value> {
        loop {
            let event = self.next_event().await?;
            if event["event"] == name {
                return Ok(event["data"].clone());
            }
        }
    }

    /// Skip events until a presence event `name` for `user_id` arrives
    pub async fn wait_for_user(&mut self, name: &str, user_id: &str) -> Result<Value> {
        loop {
            let data = self.wait_for(name).await?;
            if data["userId"] == user_id {
                return Ok(data);
            }
        }
    }

    /// Every event that arrives before `window` passes without one
    pub async fn drain(&mut self, window: Duration) -> Vec<Value> {
        let mut events: Vec<Value> = self.pending.drain(..).collect();
        while let Ok(event) = self.read_event(window).await {
            events.push(event);
        }
        events
    }

    /// Fails if any event arrives within `window`
    pub async fn assert_silent(&mut self, window: Duration) -> Result<()> {
        if let Some(event) = self.pending.pop_front() {
            bail!("expected silence, got {event}");
        }
        match self.read_event(window).await {
            Ok(event) => bail!("expected silence, got {event}"),
            Err(_) => Ok(()),
        }
    }

    /// Wait for the server to close the connection; returns the close code
    pub async fn expect_close(&mut self, within: Duration) -> Result<u16> {
        let deadline = tokio::time::Instant::now() + within;
        loop {
            let frame = tokio::time::timeout_at(deadline, self.stream.next())
                .await
                .map_err(|_| anyhow!("no close frame within {within:?}"))?;
            match frame {
                Some(Ok(Message::Close(Some(frame)))) => return Ok(u16::from(frame.code)),
                Some(Ok(Message::Close(None))) | None => bail!("closed without a code"),
                Some(Ok(_)) => {}
                Some(Err(e)) => bail!("socket error before close frame: {e}"),
            }
        }
    }

    /// Close from the client side
    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        // Drain until the server acknowledges
        while let Ok(Some(Ok(_))) = tokio::time::timeout(EVENT_TIMEOUT, self.stream.next()).await {}
        Ok(())
    }

    async fn read_event(&mut self, within: Duration) -> Result<Value> {
        let deadline = tokio::time::Instant::now() + within;
        loop {
            let frame = tokio::time::timeout_at(deadline, self.stream.next())
                .await
                .map_err(|_| anyhow!("no event within {within:?}"))?;
            match frame {
                Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(&text)?),
                Some(Ok(Message::Close(frame))) => bail!("connection closed: {frame:?}"),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => bail!("connection ended"),
            }
        }
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
