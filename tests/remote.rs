//! Runs a client against a local websocket server playing the part of the
//! player.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    sync::{mpsc, oneshot},
};
use tokio_tungstenite::{tungstenite::Message, WebSocketStream};

use gmusic_remote::{
    cache::{Cache, MemoryCache, AUTH_TOKEN_KEY},
    command::Command,
    config::Config,
    host::{Host, Prompt, StatusItem},
    remote::{Client, Exit},
};

#[derive(Debug, Default)]
struct StatusLog {
    texts: Vec<String>,
    disposed: bool,
}

#[derive(Clone, Default)]
struct TestHost {
    status: Arc<Mutex<StatusLog>>,
}

impl TestHost {
    fn texts(&self) -> Vec<String> {
        self.status.lock().unwrap().texts.clone()
    }

    fn is_disposed(&self) -> bool {
        self.status.lock().unwrap().disposed
    }

    async fn wait_until(&self, condition: impl Fn(&Self) -> bool) {
        while !condition(self) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

struct TestStatus {
    log: Arc<Mutex<StatusLog>>,
}

impl StatusItem for TestStatus {
    fn set_text(&mut self, text: &str) {
        let mut log = self.log.lock().unwrap();
        if !log.disposed {
            log.texts.push(text.to_owned());
        }
    }

    fn show(&mut self) {}

    fn dispose(&mut self) {
        self.log.lock().unwrap().disposed = true;
    }
}

#[async_trait]
impl Prompt for TestHost {
    async fn input_box(&self, _prompt: &str) -> Option<String> {
        Some(" 1234 ".to_owned())
    }

    async fn quick_pick(&self, _items: &[&str]) -> Option<String> {
        None
    }
}

impl Host for TestHost {
    fn status_item(&self) -> Box<dyn StatusItem> {
        Box::new(TestStatus {
            log: Arc::clone(&self.status),
        })
    }
}

async fn next_request(ws: &mut WebSocketStream<TcpStream>) -> Value {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return serde_json::from_str(text.as_str()).unwrap(),
            Some(Ok(_)) => continue,
            other => panic!("expected a request, got {other:?}"),
        }
    }
}

async fn send(ws: &mut WebSocketStream<TcpStream>, frame: &str) {
    ws.send(Message::text(frame.to_owned())).await.unwrap();
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = listener.accept().await.unwrap();
    tokio_tungstenite::accept_async(stream).await.unwrap()
}

/// Reads until the client goes away.
async fn expect_close(ws: &mut WebSocketStream<TcpStream>) {
    while let Some(Ok(message)) = ws.next().await {
        if message.is_close() {
            return;
        }
    }
}

async fn bind() -> (TcpListener, Config) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut config = Config::new().unwrap();
    config.url = format!("ws://127.0.0.1:{port}").parse().unwrap();
    config.app_id = "test-app".to_owned();

    (listener, config)
}

async fn player(listener: TcpListener) {
    let mut ws = accept(&listener).await;

    assert_eq!(
        next_request(&mut ws).await,
        json!({"namespace": "connect", "method": "connect", "arguments": ["test-app"]})
    );
    send(&mut ws, r#"{"channel":"connect","payload":"CODE_REQUIRED"}"#).await;

    assert_eq!(
        next_request(&mut ws).await,
        json!({"namespace": "connect", "method": "connect", "arguments": ["test-app", "1234"]})
    );
    send(&mut ws, r#"{"channel":"connect","payload":"abc123"}"#).await;
    send(&mut ws, "not json").await;
    send(&mut ws, r#"{"channel":"time","payload":{"current":1,"total":2}}"#).await;
    send(
        &mut ws,
        r#"{"channel":"track","payload":{"title":"Song","artist":"Band","album":"Record","albumArt":null}}"#,
    )
    .await;
    send(&mut ws, r#"{"channel":"playState","payload":true}"#).await;

    assert_eq!(
        next_request(&mut ws).await,
        json!({"namespace": "playback", "method": "playPause", "arguments": null})
    );
    ws.close(None).await.unwrap();
}

#[tokio::test]
async fn pairs_follows_state_and_sends_commands() {
    let (listener, config) = bind().await;
    let server = tokio::spawn(player(listener));

    let host = Arc::new(TestHost::default());
    let cache = Arc::new(MemoryCache::new());
    let mut client = Client::new(&config, Arc::clone(&host), cache.clone()).unwrap();

    let (commands_tx, mut commands) = mpsc::channel(4);
    let watcher = TestHost::clone(&host);
    let driver = tokio::spawn(async move {
        watcher
            .wait_until(|host| host.texts().iter().any(|text| text == "▶ Song - Band"))
            .await;
        commands_tx.send(Command::PlayPause).await.unwrap();
        commands_tx
    });

    let exit = tokio::time::timeout(Duration::from_secs(10), client.start(&mut commands))
        .await
        .expect("session did not end")
        .unwrap();
    assert_eq!(exit, Exit::Closed);

    server.await.unwrap();
    let _commands_tx = driver.await.unwrap();
    assert_eq!(cache.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("abc123"));
}

#[tokio::test]
async fn oversized_and_binary_frames_are_ignored_until_restart() {
    let (listener, config) = bind().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        next_request(&mut ws).await;

        let title = "x".repeat(1024 * 1024 + 1);
        let oversized = json!({"channel": "track", "payload": {"title": title, "artist": "Big"}});
        send(&mut ws, &oversized.to_string()).await;
        ws.send(Message::binary(vec![0xde, 0xad, 0xbe, 0xef]))
            .await
            .unwrap();
        send(
            &mut ws,
            r#"{"channel":"track","payload":{"title":"Small","artist":"Band"}}"#,
        )
        .await;

        expect_close(&mut ws).await;
    });

    let host = Arc::new(TestHost::default());
    let mut client =
        Client::new(&config, Arc::clone(&host), Arc::new(MemoryCache::new())).unwrap();

    let (commands_tx, mut commands) = mpsc::channel(4);
    let watcher = TestHost::clone(&host);
    let driver = tokio::spawn(async move {
        watcher.wait_until(|host| !host.texts().is_empty()).await;
        commands_tx.send(Command::Restart).await.unwrap();
        commands_tx
    });

    let exit = tokio::time::timeout(Duration::from_secs(10), client.start(&mut commands))
        .await
        .expect("session did not end")
        .unwrap();
    assert_eq!(exit, Exit::Restart);
    assert_eq!(host.texts(), ["▶ Small - Band"]);

    tokio::time::timeout(Duration::from_secs(10), server)
        .await
        .expect("socket was not closed")
        .unwrap();
    let _commands_tx = driver.await.unwrap();
}

#[tokio::test]
async fn socket_error_hides_status_but_keeps_sending() {
    let (listener, config) = bind().await;
    let (received_tx, received_rx) = oneshot::channel();
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        next_request(&mut ws).await;

        // A final text frame of two bytes that are not UTF-8.
        ws.get_mut()
            .write_all(&[0x81, 0x02, 0xff, 0xfe])
            .await
            .unwrap();
        send(
            &mut ws,
            r#"{"channel":"track","payload":{"title":"Late","artist":"Band"}}"#,
        )
        .await;

        assert_eq!(
            next_request(&mut ws).await,
            json!({"namespace": "playback", "method": "playPause", "arguments": null})
        );
        received_tx.send(()).unwrap();

        expect_close(&mut ws).await;
    });

    let host = Arc::new(TestHost::default());
    let mut client =
        Client::new(&config, Arc::clone(&host), Arc::new(MemoryCache::new())).unwrap();

    let (commands_tx, mut commands) = mpsc::channel(4);
    let watcher = TestHost::clone(&host);
    let driver = tokio::spawn(async move {
        watcher.wait_until(TestHost::is_disposed).await;
        commands_tx.send(Command::PlayPause).await.unwrap();
        received_rx.await.unwrap();
        commands_tx.send(Command::Quit).await.unwrap();
    });

    let exit = tokio::time::timeout(Duration::from_secs(10), client.start(&mut commands))
        .await
        .expect("session did not end")
        .unwrap();
    assert_eq!(exit, Exit::Quit);
    assert!(host.is_disposed());
    assert!(host.texts().is_empty());

    driver.await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_player_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut config = Config::new().unwrap();
    config.url = format!("ws://127.0.0.1:{port}").parse().unwrap();

    let mut client = Client::new(
        &config,
        Arc::new(TestHost::default()),
        Arc::new(MemoryCache::new()),
    )
    .unwrap();
    let (_commands_tx, mut commands) = mpsc::channel(1);

    assert!(client.start(&mut commands).await.is_err());
}
