use std::time::Duration;

use forge_logging::{forge_debug, forge_info};
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use url::Url;

use crate::ChannelError;

#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub ws_base_url: String,
    pub connect_timeout: Duration,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            ws_base_url: "ws://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Rewrites an `http(s)` backend URL to its `ws(s)` counterpart.
pub fn derive_ws_url(http_url: &str) -> Result<String, ChannelError> {
    if let Some(rest) = http_url.strip_prefix("https://") {
        Ok(format!("wss://{rest}"))
    } else if let Some(rest) = http_url.strip_prefix("http://") {
        Ok(format!("ws://{rest}"))
    } else {
        Err(ChannelError::InvalidUrl(format!(
            "backend url must start with http:// or https://: {http_url}"
        )))
    }
}

/// Opens the per-task live progress connection.
#[async_trait::async_trait]
pub trait ProgressChannel: Send + Sync {
    async fn open(&self, task_id: &str) -> Result<Box<dyn FrameSource>, ChannelError>;
}

/// An open connection yielding raw text frames in arrival order.
#[async_trait::async_trait]
pub trait FrameSource: Send {
    /// `None` once the peer has closed the connection.
    async fn next_text(&mut self) -> Option<Result<String, ChannelError>>;

    async fn close(&mut self);
}

#[derive(Debug, Clone)]
pub struct WsProgressChannel {
    settings: ChannelSettings,
}

impl WsProgressChannel {
    pub fn new(settings: ChannelSettings) -> Self {
        Self { settings }
    }

    fn progress_url(&self, task_id: &str) -> Result<Url, ChannelError> {
        let mut url = Url::parse(&self.settings.ws_base_url)
            .map_err(|err| ChannelError::InvalidUrl(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ChannelError::InvalidUrl(self.settings.ws_base_url.clone()))?
            .pop_if_empty()
            .extend(&["ws", "progress", task_id]);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl ProgressChannel for WsProgressChannel {
    async fn open(&self, task_id: &str) -> Result<Box<dyn FrameSource>, ChannelError> {
        let url = self.progress_url(task_id)?;
        forge_info!("Opening progress channel {}", url);
        let connect = connect_async(url.as_str());
        let (stream, _) = tokio::time::timeout(self.settings.connect_timeout, connect)
            .await
            .map_err(|_| ChannelError::Connect(format!("timed out connecting to {url}")))?
            .map_err(|err| ChannelError::Connect(err.to_string()))?;
        Ok(Box::new(WsFrameSource { stream }))
    }
}

struct WsFrameSource {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait::async_trait]
impl FrameSource for WsFrameSource {
    async fn next_text(&mut self) -> Option<Result<String, ChannelError>> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Binary(bytes)) => {
                    return Some(Ok(String::from_utf8_lossy(&bytes).into_owned()))
                }
                Ok(Message::Close(frame)) => {
                    forge_debug!("Progress channel closed by peer: {:?}", frame);
                    return None;
                }
                Ok(_) => continue,
                Err(err) => return Some(Err(ChannelError::Transport(err.to_string()))),
            }
        }
        None
    }

    async fn close(&mut self) {
        if let Err(err) = self.stream.close(None).await {
            forge_debug!("Progress channel close: {}", err);
        }
    }
}
