use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::QueryError;
use super::codec::{Command, Notification, Record, Status, parse_records};

/// Maximum bytes per ServerQuery line. Longer lines abort the connection.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

/// Read one `\n` terminated line into `buf`, capped at MAX_LINE_LENGTH bytes.
/// Returns Ok(0) on EOF, Ok(n) on success, Err on I/O error or line too long.
/// A line cut off by EOF is returned as is.
pub(crate) async fn read_bounded_line<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
    buf: &mut String,
) -> std::io::Result<usize> {
    let mut line = Vec::new();
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            break;
        }
        let (taken, done) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };
        line.extend_from_slice(&available[..taken]);
        reader.consume(taken);

        if line.len() > MAX_LINE_LENGTH {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "query line exceeds maximum length",
            ));
        }
        if done {
            break;
        }
    }
    buf.push_str(&String::from_utf8_lossy(&line));
    Ok(line.len())
}

/// Replies end in `\n\r`, so the `\r` shows up at the start of the next line.
fn clean(line: &str) -> &str {
    line.trim_matches(['\r', '\n'])
}

struct Session {
    writer: OwnedWriteHalf,
    replies: mpsc::UnboundedReceiver<String>,
}

/// A live ServerQuery session.
///
/// A reader task owns the read half: `notify*` lines go to the notification
/// channel handed out by [`QueryConnection::connect`], everything else is
/// queued as reply lines. Commands are serialized through the session lock
/// so replies are never interleaved.
pub struct QueryConnection {
    session: Mutex<Session>,
    closed: CancellationToken,
}

impl QueryConnection {
    pub async fn connect(
        host: &str,
        port: u16,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Notification>), QueryError> {
        let stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect((host, port)))
            .await
            .map_err(|_| QueryError::Timeout)??;
        let (read_half, writer) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        // greeting: "TS3" then a welcome line
        let mut line = String::new();
        let mut greeting = Vec::new();
        while greeting.len() < 2 {
            line.clear();
            let n = tokio::time::timeout(REPLY_TIMEOUT, read_bounded_line(&mut reader, &mut line))
                .await
                .map_err(|_| QueryError::Timeout)??;
            if n == 0 {
                return Err(QueryError::Closed);
            }
            let text = clean(&line);
            if !text.is_empty() {
                greeting.push(text.to_string());
            }
        }
        if greeting[0] != "TS3" {
            return Err(QueryError::Handshake(greeting[0].clone()));
        }

        let (reply_tx, replies) = mpsc::unbounded_channel();
        let (notify_tx, notifications) = mpsc::unbounded_channel();
        let closed = CancellationToken::new();

        let reader_closed = closed.clone();
        tokio::spawn(async move {
            read_loop(reader, reply_tx, notify_tx).await;
            reader_closed.cancel();
        });

        let conn = Self {
            session: Mutex::new(Session { writer, replies }),
            closed,
        };
        Ok((conn, notifications))
    }

    /// Send a command and collect its data records.
    ///
    /// A non-zero `error id` other than "empty result set" becomes
    /// [`QueryError::Server`].
    pub async fn command(&self, cmd: &Command) -> Result<Vec<Record>, QueryError> {
        if self.is_closed() {
            return Err(QueryError::Closed);
        }
        let mut session = self.session.lock().await;

        // anything left over belongs to an abandoned command
        while session.replies.try_recv().is_ok() {}

        let mut wire = cmd.format();
        trace!(command = %cmd.name, "query >");
        wire.push('\n');
        session.writer.write_all(wire.as_bytes()).await?;

        let mut records = Vec::new();
        loop {
            let line = tokio::time::timeout(REPLY_TIMEOUT, session.replies.recv())
                .await
                .map_err(|_| QueryError::Timeout)?
                .ok_or(QueryError::Closed)?;

            if let Some(status) = Status::parse(&line) {
                return if status.is_ok() {
                    Ok(records)
                } else {
                    Err(QueryError::Server {
                        id: status.id,
                        msg: status.msg,
                    })
                };
            }
            records.extend(parse_records(&line));
        }
    }

    /// Like [`command`](Self::command) but only the first record matters.
    pub async fn command_one(&self, cmd: &Command) -> Result<Record, QueryError> {
        self.command(cmd).await?.into_iter().next().ok_or(QueryError::EmptyReply)
    }

    /// Send `quit` without waiting for a reply.
    pub async fn quit(&self) {
        let mut session = self.session.lock().await;
        let _ = session.writer.write_all(b"quit\n").await;
        let _ = session.writer.shutdown().await;
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Resolves once the server side of the connection is gone.
    pub async fn closed(&self) {
        self.closed.cancelled().await;
    }
}

async fn read_loop<R: AsyncRead + Unpin>(
    mut reader: BufReader<R>,
    replies: mpsc::UnboundedSender<String>,
    notifications: mpsc::UnboundedSender<Notification>,
) {
    let mut buf = String::new();
    loop {
        buf.clear();
        match read_bounded_line(&mut reader, &mut buf).await {
            Ok(0) => {
                debug!("query connection closed by server");
                break;
            }
            Err(e) => {
                debug!(error = %e, "query read failed");
                break;
            }
            Ok(_) => {}
        }

        let line = clean(&buf);
        if line.is_empty() {
            continue;
        }
        if let Some(notification) = Notification::parse(line) {
            let _ = notifications.send(notification);
        } else if replies.send(line.to_string()).is_err() {
            break;
        }
    }
}
