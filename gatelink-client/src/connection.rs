use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use gatelink_protocol::Frame;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::reader::FrameReader;

/// One open transport connection: a write handle plus a [`FrameReader`] over
/// a cloned read handle of the same socket.
pub struct Connection {
    stream: TcpStream,
    reader: FrameReader<TcpStream>,
}

impl Connection {
    /// Establish a TCP connection. `timeout` bounds the connect itself and
    /// is installed as the socket write timeout.
    pub fn connect(addr: &str, timeout: Duration) -> Result<Self> {
        let socket_addr: SocketAddr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| ClientError::InvalidAddress(addr.to_owned()))?;

        debug!(addr = %socket_addr, "TCP connecting");
        let stream = TcpStream::connect_timeout(&socket_addr, timeout)?;
        stream.set_nodelay(true).ok();
        stream.set_write_timeout(Some(timeout))?;

        let read_half = stream.try_clone()?;
        Ok(Self {
            stream,
            reader: FrameReader::new(read_half),
        })
    }

    /// Write a complete encoded frame in one logical write.
    pub fn send_raw(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Bound the next read attempts on the shared socket. `None` blocks
    /// indefinitely.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(timeout)?;
        Ok(())
    }

    /// Block until the reader produces the next valid frame.
    pub fn read_frame(&mut self) -> Result<Frame> {
        self.reader.read_frame()
    }

    /// Shut down both directions of the socket. The file descriptors are
    /// released when the connection is dropped.
    pub fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown(Shutdown::Both)?;
        Ok(())
    }
}
