//! In-process ServerQuery server for tests.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

pub(crate) const OK: &str = "error id=0 msg=ok\n\r";

/// Answers each command line with the scripted reply for its first word.
/// Unknown commands get error 256. Every received line is logged.
pub(crate) struct FakeQueryServer {
    pub port: u16,
    pub received: Arc<Mutex<Vec<String>>>,
}

impl FakeQueryServer {
    pub async fn start(script: Vec<(&'static str, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Vec::new()));
        let script = Arc::new(script);

        let log = received.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let script = script.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let (r, mut w) = stream.into_split();
                    if w
                        .write_all(b"TS3\n\rWelcome to the TeamSpeak 3 ServerQuery interface.\n\r")
                        .await
                        .is_err()
                    {
                        return;
                    }
                    let mut reader = BufReader::new(r);
                    let mut line = String::new();
                    loop {
                        line.clear();
                        if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                            break;
                        }
                        let command = line.trim().to_string();
                        log.lock().push(command.clone());
                        let name = command.split(' ').next().unwrap_or("").to_string();
                        if name == "quit" {
                            break;
                        }
                        let reply = script
                            .iter()
                            .find(|(cmd, _)| *cmd == name)
                            .map(|(_, reply)| reply.clone())
                            .unwrap_or_else(|| "error id=256 msg=command\\snot\\sfound\n\r".to_string());
                        if w.write_all(reply.as_bytes()).await.is_err() {
                            break;
                        }
                    }
                });
            }
        });

        Self { port, received }
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }
}
