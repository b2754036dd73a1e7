use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::i18n::Strings;
use crate::status::{self, ChannelInfo, ClientInfo, ServerInfo, StatusSource, TopChannel};

use super::QueryError;
use super::codec::{Command, Notification, Record};
use super::connection::QueryConnection;

/// Voice clients have `client_type=0`; query sessions have 1.
const VOICE_CLIENT: u32 = 0;

/// Status source backed by a ServerQuery session.
///
/// The supervisor installs and removes the live connection; every read
/// degrades to the offline sentinel or an empty value when no session is
/// available or a command fails.
pub struct QueryClient {
    connection: RwLock<Option<Arc<QueryConnection>>>,
    last_joined: Mutex<String>,
    strings: &'static Strings,
}

impl QueryClient {
    pub fn new(strings: &'static Strings) -> Self {
        Self {
            connection: RwLock::new(None),
            last_joined: Mutex::new(String::new()),
            strings,
        }
    }

    pub fn attach(&self, conn: Arc<QueryConnection>) {
        *self.connection.write() = Some(conn);
    }

    pub fn detach(&self) -> Option<Arc<QueryConnection>> {
        self.connection.write().take()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.read().as_ref().is_some_and(|c| !c.is_closed())
    }

    fn current(&self) -> Result<Arc<QueryConnection>, QueryError> {
        self.connection.read().clone().ok_or(QueryError::NotConnected)
    }

    /// Apply a server notification. Only real clients entering count as joins.
    pub fn handle_notification(&self, notification: &Notification) {
        if notification.event != "notifycliententerview" {
            return;
        }
        let record = &notification.record;
        if record.num::<u32>("client_type") != Some(VOICE_CLIENT) {
            return;
        }
        if let Some(nick) = record.get("client_nickname").filter(|n| !n.is_empty()) {
            debug!(nickname = %nick, "client joined");
            *self.last_joined.lock() = nick.to_string();
        }
    }

    pub async fn fetch_server_info(&self) -> Result<ServerInfo, QueryError> {
        let conn = self.current()?;
        let record = conn.command_one(&Command::new("serverinfo")).await?;
        Ok(server_info_from_record(&record))
    }

    pub async fn fetch_clients(&self) -> Result<Vec<ClientInfo>, QueryError> {
        let conn = self.current()?;
        let records = conn
            .command(&Command::new("clientlist").flag("away").flag("times"))
            .await?;
        let now = Utc::now().timestamp();
        Ok(records
            .iter()
            .filter(|r| r.num::<u32>("client_type") == Some(VOICE_CLIENT))
            .map(|r| client_from_record(r, now))
            .collect())
    }

    pub async fn fetch_channels(&self) -> Result<Vec<ChannelInfo>, QueryError> {
        let conn = self.current()?;
        let records = conn.command(&Command::new("channellist")).await?;
        Ok(records.iter().map(channel_from_record).collect())
    }

    /// Round trip that keeps the session from idling out.
    pub async fn keepalive(&self) -> Result<(), QueryError> {
        self.current()?.command(&Command::new("version")).await?;
        Ok(())
    }

    /// Send `quit` on the current session, if any, and drop it.
    pub async fn disconnect(&self) {
        if let Some(conn) = self.detach() {
            conn.quit().await;
            info!("query session closed");
        }
    }
}

impl StatusSource for QueryClient {
    async fn server_info(&self) -> ServerInfo {
        match self.fetch_server_info().await {
            Ok(info) => info,
            Err(QueryError::NotConnected) => ServerInfo::offline(),
            Err(e) => {
                warn!(error = %e, "{}", self.strings.ts_server_info_error);
                ServerInfo::error()
            }
        }
    }

    async fn clients(&self) -> Vec<ClientInfo> {
        self.fetch_clients().await.unwrap_or_else(|e| {
            debug!(error = %e, "clientlist unavailable");
            Vec::new()
        })
    }

    async fn channels(&self) -> Vec<ChannelInfo> {
        self.fetch_channels().await.unwrap_or_else(|e| {
            debug!(error = %e, "channellist unavailable");
            Vec::new()
        })
    }

    async fn top_channel(&self) -> Option<TopChannel> {
        status::top_channel(&self.channels().await)
    }

    async fn newest_client(&self) -> String {
        status::newest_client(&self.clients().await)
    }

    fn last_joined(&self) -> String {
        self.last_joined.lock().clone()
    }
}

/// The query session itself counts as a client; it is subtracted here.
pub fn server_info_from_record(record: &Record) -> ServerInfo {
    ServerInfo {
        name: record.str_or("virtualserver_name", "TeamSpeak Server"),
        platform: record.str_or("virtualserver_platform", "-"),
        version: record.str_or("virtualserver_version", "-"),
        clients_online: record
            .num::<u32>("virtualserver_clientsonline")
            .unwrap_or(1)
            .saturating_sub(1),
        max_clients: record.num("virtualserver_maxclients").unwrap_or(0),
        channels_online: record.num("virtualserver_channelsonline").unwrap_or(0),
        uptime: record.num("virtualserver_uptime").unwrap_or(0),
        ping: 0,
    }
}

/// `connection_connected_time` (ms) when present, otherwise the time since
/// `client_lastconnected`.
pub fn client_from_record(record: &Record, now_secs: i64) -> ClientInfo {
    let connection_time = match record.num::<u64>("connection_connected_time") {
        Some(ms) => ms / 1000,
        None => record
            .num::<i64>("client_lastconnected")
            .map(|since| now_secs.saturating_sub(since).max(0) as u64)
            .unwrap_or(u64::MAX),
    };
    ClientInfo {
        nickname: record.str_or("client_nickname", ""),
        is_away: record.num::<u8>("client_away") == Some(1),
        channel_id: record.num("cid").unwrap_or(0),
        connection_time,
    }
}

pub fn channel_from_record(record: &Record) -> ChannelInfo {
    ChannelInfo {
        id: record.num("cid").unwrap_or(0),
        name: record.str_or("channel_name", ""),
        total_clients: record.num("total_clients").unwrap_or(0),
        needed_subscribe_power: record.num("channel_needed_subscribe_power").unwrap_or(0),
    }
}
