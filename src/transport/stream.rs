use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::protocol::Message;
use crate::transport::Transport;

/// Default timeout for writing one frame (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum frame size (1 MB); a full match state is far below this.
const MAX_MESSAGE_SIZE: u32 = 1_000_000;

const HEADER_LEN: usize = 4;

/// Length-prefixed bincode frames over any byte stream.
///
/// Each frame is a 4-byte big-endian body length followed by the bincode
/// encoding of one [`Message`].
pub struct StreamTransport<S> {
    stream: S,
    buffer: Vec<u8>,
    timeout_duration: Duration,
    max_message_size: u32,
}

pub type TcpTransport = StreamTransport<TcpStream>;

impl TcpTransport {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + Sync,
{
    pub fn new(stream: S) -> Self {
        Self::with_config(stream, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE)
    }

    pub fn with_config(stream: S, timeout_duration: Duration, max_message_size: u32) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
            timeout_duration,
            max_message_size,
        }
    }

    /// Pop one complete frame off the receive buffer.
    fn try_decode(&mut self) -> anyhow::Result<Option<Message>> {
        if self.buffer.len() < HEADER_LEN {
            return Ok(None);
        }
        let mut len_buf = [0u8; HEADER_LEN];
        len_buf.copy_from_slice(&self.buffer[..HEADER_LEN]);
        let len = u32::from_be_bytes(len_buf);

        if len > self.max_message_size {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                len,
                self.max_message_size
            ));
        }
        if len == 0 {
            return Err(anyhow::anyhow!("Invalid message length: 0"));
        }

        let end = HEADER_LEN + len as usize;
        if self.buffer.len() < end {
            return Ok(None);
        }
        let msg = bincode::deserialize(&self.buffer[HEADER_LEN..end])
            .map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))?;
        self.buffer.drain(..end);
        Ok(Some(msg))
    }

    fn map_io_error(e: std::io::Error) -> anyhow::Error {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::BrokenPipe => {
                anyhow::anyhow!("Connection closed by peer")
            }
            std::io::ErrorKind::ConnectionReset => anyhow::anyhow!("Connection reset by peer"),
            _ => anyhow::anyhow!("I/O error: {}", e),
        }
    }
}

#[async_trait::async_trait]
impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + Sync,
{
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        let data =
            bincode::serialize(&msg).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
        if data.len() as u64 > u64::from(self.max_message_size) {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                data.len(),
                self.max_message_size
            ));
        }

        let mut frame = Vec::with_capacity(HEADER_LEN + data.len());
        frame.extend_from_slice(&(data.len() as u32).to_be_bytes());
        frame.extend_from_slice(&data);

        let duration = self.timeout_duration;
        let stream = &mut self.stream;
        let write_op = async move {
            stream.write_all(&frame).await.map_err(Self::map_io_error)?;
            stream.flush().await.map_err(Self::map_io_error)?;
            anyhow::Ok(())
        };
        timeout(duration, write_op)
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", duration))?
    }

    // Only `read` is awaited here, which is cancel-safe; partial frames stay
    // in the buffer.
    async fn recv(&mut self) -> anyhow::Result<Message> {
        loop {
            if let Some(msg) = self.try_decode()? {
                return Ok(msg);
            }
            let mut chunk = [0u8; 4096];
            let n = self.stream.read(&mut chunk).await.map_err(Self::map_io_error)?;
            if n == 0 {
                return Err(anyhow::anyhow!("Connection closed by peer"));
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }
}
