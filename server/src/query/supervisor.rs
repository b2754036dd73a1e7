use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::banner::HistoryBuffer;
use crate::config::TeamSpeakSection;
use crate::i18n::Strings;

use super::client::QueryClient;
use super::codec::{Command, Notification};
use super::QueryError;
use super::connection::QueryConnection;

/// Timers driving the supervisor.
#[derive(Debug, Clone, Copy)]
pub struct Intervals {
    pub reconnect: Duration,
    pub sample: Duration,
    pub keepalive: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            reconnect: Duration::from_secs(10),
            sample: Duration::from_secs(60),
            keepalive: Duration::from_secs(180),
        }
    }
}

enum SessionEnd {
    Cancelled,
    Lost,
}

/// Keep a ServerQuery session alive until `cancel` fires.
///
/// Connects, logs in and selects the virtual server, then samples the
/// online count into `history` and forwards join notifications to
/// `client`. A failed connect or a dropped session is retried after
/// `intervals.reconnect`. On cancellation the session is closed with `quit`.
pub async fn run_supervisor(
    settings: TeamSpeakSection,
    client: Arc<QueryClient>,
    history: Arc<HistoryBuffer>,
    strings: &'static Strings,
    intervals: Intervals,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }

        info!(host = %settings.host, port = settings.query_port, "{}", strings.ts_connecting);
        let opened = tokio::select! {
            _ = cancel.cancelled() => break,
            opened = open_session(&settings) => opened,
        };

        match opened {
            Ok((conn, notifications)) => {
                info!("{}", strings.ts_connected);
                let conn = Arc::new(conn);
                client.attach(conn.clone());

                match run_session(&conn, notifications, &client, &history, intervals, &cancel).await {
                    SessionEnd::Cancelled => {
                        client.disconnect().await;
                        break;
                    }
                    SessionEnd::Lost => {
                        client.detach();
                        warn!("{}", strings.ts_connection_lost);
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "{}", strings.ts_connection_failed);
                info!("{}", strings.ts_retry);
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(intervals.reconnect) => {}
        }
    }
    debug!("query supervisor stopped");
}

/// Connect and run the login sequence.
async fn open_session(
    settings: &TeamSpeakSection,
) -> Result<(QueryConnection, mpsc::UnboundedReceiver<Notification>), QueryError> {
    let (conn, notifications) = QueryConnection::connect(&settings.host, settings.query_port).await?;

    if !settings.username.is_empty() {
        conn.command(
            &Command::new("login")
                .param("client_login_name", &settings.username)
                .param("client_login_password", &settings.password),
        )
        .await?;
    }
    conn.command(&Command::new("use").param("port", settings.server_port))
        .await?;

    // a taken nickname or missing notify permission is not fatal
    if let Err(e) = conn
        .command(&Command::new("clientupdate").param("client_nickname", &settings.nickname))
        .await
    {
        warn!(nickname = %settings.nickname, error = %e, "could not set query nickname");
    }
    if let Err(e) = conn
        .command(&Command::new("servernotifyregister").param("event", "server"))
        .await
    {
        warn!(error = %e, "could not register for server notifications");
    }

    Ok((conn, notifications))
}

async fn run_session(
    conn: &QueryConnection,
    mut notifications: mpsc::UnboundedReceiver<Notification>,
    client: &QueryClient,
    history: &HistoryBuffer,
    intervals: Intervals,
    cancel: &CancellationToken,
) -> SessionEnd {
    sample(client, history).await;

    let mut sampler = interval_at(Instant::now() + intervals.sample, intervals.sample);
    let mut keepalive = interval_at(Instant::now() + intervals.keepalive, intervals.keepalive);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return SessionEnd::Cancelled,
            _ = conn.closed() => return SessionEnd::Lost,
            Some(notification) = notifications.recv() => {
                client.handle_notification(&notification);
            }
            _ = sampler.tick() => sample(client, history).await,
            _ = keepalive.tick() => {
                if let Err(e) = client.keepalive().await {
                    warn!(error = %e, "query keepalive failed");
                }
            }
        }
    }
}

async fn sample(client: &QueryClient, history: &HistoryBuffer) {
    match client.fetch_server_info().await {
        Ok(info) => {
            debug!(online = info.clients_online, "recorded online count");
            history.record(info.clients_online);
        }
        Err(e) => debug!(error = %e, "online sample skipped"),
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;
    use crate::i18n::EN;
    use crate::query::testing::{FakeQueryServer, OK};
    use crate::status::StatusSource;

    fn fast() -> Intervals {
        Intervals {
            reconnect: Duration::from_millis(50),
            sample: Duration::from_millis(40),
            keepalive: Duration::from_millis(60),
        }
    }

    fn settings(port: u16) -> TeamSpeakSection {
        TeamSpeakSection {
            host: "127.0.0.1".into(),
            query_port: port,
            password: "secret".into(),
            ..Default::default()
        }
    }

    async fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        for _ in 0..100 {
            if cond() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        cond()
    }

    #[tokio::test]
    async fn test_session_logs_in_samples_and_quits() {
        let server = FakeQueryServer::start(vec![
            ("login", OK.to_string()),
            ("use", OK.to_string()),
            ("clientupdate", OK.to_string()),
            (
                "servernotifyregister",
                format!("{OK}notifycliententerview client_nickname=Alice client_type=0\n\r"),
            ),
            (
                "serverinfo",
                format!("virtualserver_name=Test virtualserver_clientsonline=4 virtualserver_maxclients=10\n\r{OK}"),
            ),
            ("version", format!("version=3.13.7 build=1 platform=Linux\n\r{OK}")),
        ])
        .await;

        let client = Arc::new(QueryClient::new(&EN));
        let history = Arc::new(HistoryBuffer::new());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_supervisor(
            settings(server.port),
            client.clone(),
            history.clone(),
            &EN,
            fast(),
            cancel.clone(),
        ));

        assert!(wait_for(|| history.len() >= 2).await, "sampler should keep recording");
        assert!(history.snapshot().iter().all(|&n| n == 3));
        assert!(wait_for(|| client.last_joined() == "Alice").await);
        assert_eq!(client.server_info().await.name, "Test");
        assert!(
            wait_for(|| server.received().iter().any(|l| l == "version")).await,
            "keepalive should run"
        );

        cancel.cancel();
        handle.await.unwrap();
        assert!(!client.is_connected());
        assert!(wait_for(|| server.received().iter().any(|l| l == "quit")).await);

        let received = server.received();
        assert_eq!(received[0], "login client_login_name=serveradmin client_login_password=secret");
        assert_eq!(received[1], "use port=9987");
        assert_eq!(received[2], "clientupdate client_nickname=BannerBot");
        assert_eq!(received[3], "servernotifyregister event=server");
    }

    #[tokio::test]
    async fn test_unreachable_server_stays_offline_until_cancelled() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let client = Arc::new(QueryClient::new(&EN));
        let history = Arc::new(HistoryBuffer::new());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_supervisor(
            settings(port),
            client.clone(),
            history.clone(),
            &EN,
            fast(),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!client.is_connected());
        assert!(history.is_empty());
        assert_eq!(client.server_info().await, crate::status::ServerInfo::offline());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("supervisor should stop promptly")
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_login_retries() {
        let server = FakeQueryServer::start(vec![(
            "login",
            "error id=520 msg=invalid\\sloginname\\sor\\spassword\n\r".to_string(),
        )])
        .await;

        let client = Arc::new(QueryClient::new(&EN));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_supervisor(
            settings(server.port),
            client.clone(),
            Arc::new(HistoryBuffer::new()),
            &EN,
            fast(),
            cancel.clone(),
        ));

        let attempts = || server.received().iter().filter(|l| l.starts_with("login")).count();
        assert!(wait_for(|| attempts() >= 2).await, "login should be retried");
        assert!(!client.is_connected());

        cancel.cancel();
        handle.await.unwrap();
    }
}
