use crate::protocol::Frame;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::Duration;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("serial port {port} is unavailable")]
    Unavailable {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("write failed")]
    Write(#[source] io::Error),
    #[error("read failed")]
    Read(#[source] io::Error),
    #[error("break signal failed")]
    Break(#[source] serialport::Error),
    #[error("port status query failed")]
    Status(#[source] serialport::Error),
}

/// Duplex byte link to the controller
///
/// Reads never block: callers ask how many bytes are waiting and take only those.
pub trait Link {
    /// Write one frame and flush it.
    fn write_frame(&mut self, frame: &Frame) -> Result<(), LinkError>;

    /// Hold the transmit line in break for `duration`, then release it.
    fn send_break(&mut self, duration: Duration) -> Result<(), LinkError>;

    /// Number of inbound bytes ready to read without blocking
    fn bytes_available(&mut self) -> Result<usize, LinkError>;

    /// Append every currently available inbound byte to `buf`.
    ///
    /// Returns the number of bytes appended (0 when nothing is waiting).
    fn read_available(&mut self, buf: &mut Vec<u8>) -> Result<usize, LinkError>;

    /// Short human-readable description for the status bar
    fn describe(&self) -> String;
}

/// Physical serial port, 8N1 without flow control
pub struct SerialLink {
    port: Box<dyn SerialPort>,
    name: String,
    baud_rate: u32,
}

impl SerialLink {
    pub fn open(name: &str, baud_rate: u32, read_timeout: Duration) -> Result<Self, LinkError> {
        info!("Opening serial port {} at {} baud...", name, baud_rate);

        let port = serialport::new(name, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(read_timeout)
            .open()
            .map_err(|source| LinkError::Unavailable {
                port: name.to_string(),
                source,
            })?;

        info!("Serial port opened");

        Ok(Self {
            port,
            name: name.to_string(),
            baud_rate,
        })
    }
}

impl Link for SerialLink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), LinkError> {
        debug!("Sending frame: {} ({} bytes)", frame, frame.as_bytes().len());
        self.port.write_all(frame.as_bytes()).map_err(LinkError::Write)?;
        self.port.flush().map_err(LinkError::Write)
    }

    fn send_break(&mut self, duration: Duration) -> Result<(), LinkError> {
        info!("Asserting break for {:?}", duration);
        self.port.set_break().map_err(LinkError::Break)?;
        std::thread::sleep(duration);
        self.port.clear_break().map_err(LinkError::Break)
    }

    fn bytes_available(&mut self) -> Result<usize, LinkError> {
        self.port
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(LinkError::Status)
    }

    fn read_available(&mut self, buf: &mut Vec<u8>) -> Result<usize, LinkError> {
        let waiting = self.bytes_available()?;
        if waiting == 0 {
            return Ok(0);
        }

        let start = buf.len();
        buf.resize(start + waiting, 0);
        match self.port.read(&mut buf[start..]) {
            Ok(n) => {
                buf.truncate(start + n);
                Ok(n)
            }
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => {
                buf.truncate(start);
                Ok(0)
            }
            Err(e) => {
                buf.truncate(start);
                Err(LinkError::Read(e))
            }
        }
    }

    fn describe(&self) -> String {
        format!("{} @ {}", self.name, self.baud_rate)
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        info!("Closing serial port {}", self.name);
    }
}

/// In-memory link for rehearsing without hardware
///
/// With echo enabled every written frame comes straight back as inbound
/// bytes, which is what a firmware that echoes its input looks like.
#[derive(Debug, Default)]
pub struct LoopbackLink {
    inbound: VecDeque<u8>,
    echo: bool,
    /// Frames written, in order
    pub written: Vec<Frame>,
    /// Break durations asserted, in order
    pub breaks: Vec<Duration>,
}

impl LoopbackLink {
    pub fn new() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl LoopbackLink {
    /// A link that records traffic but never echoes
    pub fn silent() -> Self {
        Self::default()
    }

    /// Queue bytes as if the device had sent them
    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }
}

impl Link for LoopbackLink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), LinkError> {
        debug!("Loopback frame: {}", frame);
        if self.echo {
            self.inbound.extend(frame.as_bytes());
        }
        self.written.push(frame.clone());
        Ok(())
    }

    fn send_break(&mut self, duration: Duration) -> Result<(), LinkError> {
        info!("Loopback break for {:?}", duration);
        self.breaks.push(duration);
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize, LinkError> {
        Ok(self.inbound.len())
    }

    fn read_available(&mut self, buf: &mut Vec<u8>) -> Result<usize, LinkError> {
        let n = self.inbound.len();
        buf.extend(self.inbound.drain(..));
        Ok(n)
    }

    fn describe(&self) -> String {
        if self.echo {
            "loopback".to_string()
        } else {
            "loopback (silent)".to_string()
        }
    }
}

/// Names and kinds of the serial ports present on this machine
pub fn list_ports() -> Result<Vec<(String, String)>, serialport::Error> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|p| {
            let kind = match p.port_type {
                serialport::SerialPortType::UsbPort(info) => match info.product {
                    Some(product) => format!("USB ({})", product),
                    None => format!("USB {:04x}:{:04x}", info.vid, info.pid),
                },
                serialport::SerialPortType::PciPort => "PCI".to_string(),
                serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
                serialport::SerialPortType::Unknown => "unknown".to_string(),
            };
            (p.port_name, kind)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{button_frame, text_frame};

    #[test]
    fn test_loopback_echoes_frames() {
        let mut link = LoopbackLink::new();
        link.write_frame(&text_frame("hi")).unwrap();
        assert_eq!(link.bytes_available().unwrap(), 4);

        let mut buf = Vec::new();
        assert_eq!(link.read_available(&mut buf).unwrap(), 4);
        assert_eq!(buf, b"$hi\r");
        assert_eq!(link.read_available(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_silent_loopback_records_only() {
        let mut link = LoopbackLink::silent();
        link.write_frame(&button_frame(1, true).unwrap()).unwrap();
        link.send_break(Duration::from_millis(100)).unwrap();

        assert_eq!(link.bytes_available().unwrap(), 0);
        assert_eq!(link.written.len(), 1);
        assert_eq!(link.breaks, vec![Duration::from_millis(100)]);
    }

    #[test]
    fn test_open_missing_port_is_unavailable() {
        let result = SerialLink::open(
            "/dev/rig-panel-does-not-exist",
            38400,
            Duration::from_millis(2),
        );
        assert!(matches!(result, Err(LinkError::Unavailable { .. })));
    }
}
