use std::future::Future;

use serde::Serialize;

/// Virtual server status as shown on the banner and served by `/api/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub name: String,
    pub platform: String,
    pub version: String,
    pub clients_online: u32,
    pub max_clients: u32,
    pub channels_online: u32,
    /// Seconds since the virtual server started.
    pub uptime: u64,
    pub ping: u32,
}

impl ServerInfo {
    /// Sentinel used while no query connection exists.
    pub fn offline() -> Self {
        Self::zeroed("Server Offline")
    }

    /// Returned when a query fails on a live connection.
    pub fn error() -> Self {
        Self::zeroed("Error")
    }

    fn zeroed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            platform: "-".into(),
            version: "-".into(),
            clients_online: 0,
            max_clients: 0,
            channels_online: 0,
            uptime: 0,
            ping: 0,
        }
    }
}

/// A connected voice client (query clients excluded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub nickname: String,
    pub is_away: bool,
    pub channel_id: u32,
    /// Seconds connected.
    pub connection_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub id: u32,
    pub name: String,
    pub total_clients: u32,
    pub needed_subscribe_power: u32,
}

/// The busiest channel, as shown in the banner's bottom info line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopChannel {
    pub name: String,
    pub clients: u32,
}

/// Pick the channel with the most clients. Ties keep the first channel seen;
/// empty channels never qualify.
pub fn top_channel(channels: &[ChannelInfo]) -> Option<TopChannel> {
    let mut top: Option<&ChannelInfo> = None;
    for ch in channels {
        if ch.total_clients > 0 && top.is_none_or(|t| ch.total_clients > t.total_clients) {
            top = Some(ch);
        }
    }
    top.map(|ch| TopChannel {
        name: ch.name.clone(),
        clients: ch.total_clients,
    })
}

/// Name of the client with the shortest connection time, or empty.
pub fn newest_client(clients: &[ClientInfo]) -> String {
    clients
        .iter()
        .reduce(|newest, c| {
            if c.connection_time < newest.connection_time {
                c
            } else {
                newest
            }
        })
        .map(|c| c.nickname.clone())
        .unwrap_or_default()
}

/// Live status capability consumed by the banner compositor and the JSON API.
///
/// None of these calls fail: implementations log upstream errors and hand
/// back degraded defaults (offline sentinel, empty lists, `None`, `""`).
pub trait StatusSource: Send + Sync + 'static {
    fn server_info(&self) -> impl Future<Output = ServerInfo> + Send;

    fn clients(&self) -> impl Future<Output = Vec<ClientInfo>> + Send;

    fn channels(&self) -> impl Future<Output = Vec<ChannelInfo>> + Send;

    fn top_channel(&self) -> impl Future<Output = Option<TopChannel>> + Send;

    /// Nickname of the most recently connected client, or empty.
    fn newest_client(&self) -> impl Future<Output = String> + Send;

    /// Last nickname seen joining through server notifications, or empty.
    fn last_joined(&self) -> String;
}
