//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// How a scripted backend behaves once a client connects.
#[derive(Clone, Copy)]
#[allow(dead_code)]
pub enum Script {
    /// Accept and never write.
    Silent,
    /// Accept and close at once, like a port proxy with nothing behind it.
    Hangup,
    /// Write these bytes immediately, before reading anything (MySQL style).
    Greeting(&'static [u8]),
    /// Read the request, then write these bytes.
    Reply(&'static [u8]),
}

/// A port nothing is listening on.
#[allow(dead_code)]
pub async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Start a scripted backend on an ephemeral 127.0.0.1 port.
///
/// Every request it reads is forwarded on the returned channel.
pub async fn start_scripted_backend(script: Script) -> (SocketAddr, mpsc::UnboundedReceiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (addr, spawn_backend(listener, script))
}

/// Start a scripted backend on a fixed port after `delay`.
#[allow(dead_code)]
pub fn start_backend_later(port: u16, delay: Duration, script: Script) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
        drop(spawn_backend(listener, script));
    });
}

fn spawn_backend(listener: TcpListener, script: Script) -> mpsc::UnboundedReceiver<Vec<u8>> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        match script {
                            Script::Silent => {
                                tokio::time::sleep(Duration::from_secs(30)).await;
                            }
                            Script::Hangup => drop(socket),
                            Script::Greeting(bytes) => {
                                let _ = socket.write_all(bytes).await;
                                tokio::time::sleep(Duration::from_millis(200)).await;
                            }
                            Script::Reply(bytes) => {
                                let mut buf = vec![0u8; 1024];
                                if let Ok(n) = socket.read(&mut buf).await {
                                    let _ = tx.send(buf[..n].to_vec());
                                }
                                let _ = socket.write_all(bytes).await;
                                let _ = socket.shutdown().await;
                                tokio::time::sleep(Duration::from_millis(10)).await;
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    rx
}
