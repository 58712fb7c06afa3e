//! Transport abstraction over the physical device link.
//!
//! [`DeviceTransport`] is the capability interface the session is
//! written against; backends are selected explicitly at startup, never
//! by runtime platform sniffing. [`SerialTransport`] talks USB-CDC
//! serial through the `serialport` crate; [`RecordingTransport`]
//! captures the outgoing byte stream (the command transcript) and plays
//! scripted status responses, for dry runs and tests.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::time::{Duration, Instant};

use cutkit_devicedb::DeviceProfile;

use crate::error::{DeviceError, Result};
use crate::protocol::CMD_TERMINATOR;

/// Outcome of one transport write attempt.
///
/// Recoverable outcomes (a timeout, a zero-length write) are ordinary
/// values, not errors: the session's retry loop is an explicit,
/// caller-visible loop rather than exception-driven control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportWrite {
    /// This many bytes were accepted (possibly fewer than offered).
    Wrote(usize),
    /// The device accepted nothing within the timeout.
    TimedOut,
}

/// Blocking byte transport with explicit timeouts.
///
/// Opening and claiming the underlying handle happen at construction;
/// the handle is released when the transport is dropped.
pub trait DeviceTransport {
    /// Write as much of `data` as the device accepts within `timeout`.
    fn write(&mut self, data: &[u8], timeout: Duration) -> Result<TransportWrite>;

    /// Read up to `len` bytes, waiting at most `timeout`. An empty
    /// window is [`DeviceError::ReadTimeout`]; partial reads are
    /// returned as-is.
    fn read(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>>;

    /// Drain whatever bytes are immediately available without blocking.
    fn read_available(&mut self) -> Result<Vec<u8>>;

    /// Discard buffered state on both sides of the link.
    fn reset(&mut self) -> Result<()>;
}

/// Connection parameters for the serial backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportParams {
    /// Baud rate (ignored by pure USB-CDC devices but required to open).
    pub baud_rate: u32,
    /// Default I/O timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for TransportParams {
    fn default() -> Self {
        Self { baud_rate: 115_200, timeout_ms: 1000 }
    }
}

/// A discovered, supported device.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    /// OS port name (e.g. `/dev/ttyACM0`, `COM4`).
    pub port_name: String,
    /// Capability profile matched from the hardware table.
    pub profile: DeviceProfile,
}

/// Enumerate serial ports and match them against the hardware table.
///
/// Unrecognized products from a known vendor are included with the
/// generic fallback profile; foreign devices are skipped.
pub fn discover() -> Result<Vec<DiscoveredDevice>> {
    let ports = serialport::available_ports()?;
    let mut found = Vec::new();
    for port in ports {
        if let serialport::SerialPortType::UsbPort(usb) = &port.port_type {
            if let Some(profile) = cutkit_devicedb::lookup(usb.vid, usb.pid) {
                tracing::debug!(port = %port.port_name, device = %profile.name, "discovered device");
                found.push(DiscoveredDevice { port_name: port.port_name.clone(), profile });
            }
        }
    }
    Ok(found)
}

/// Open the first supported device found.
pub fn open_first(params: &TransportParams) -> Result<(SerialTransport, DeviceProfile)> {
    let candidates = serialport::available_ports().map(|p| p.len()).unwrap_or(0);
    let found = discover()?;
    let Some(device) = found.into_iter().next() else {
        return Err(DeviceError::DeviceNotFound { candidates });
    };
    let transport = SerialTransport::open(&device.port_name, params)?;
    Ok((transport, device.profile))
}

/// Serial-port transport.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Open and claim a port.
    pub fn open(port_name: &str, params: &TransportParams) -> Result<Self> {
        let port = serialport::new(port_name, params.baud_rate)
            .timeout(Duration::from_millis(params.timeout_ms))
            .open()
            .map_err(|e| {
                tracing::warn!(port = port_name, error = %e, "failed to open serial port");
                DeviceError::from(e)
            })?;
        Ok(Self { port })
    }
}

impl DeviceTransport for SerialTransport {
    fn write(&mut self, data: &[u8], timeout: Duration) -> Result<TransportWrite> {
        self.port.set_timeout(timeout)?;
        match self.port.write(data) {
            Ok(n) => Ok(TransportWrite::Wrote(n)),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(TransportWrite::TimedOut),
            Err(e) => Err(e.into()),
        }
    }

    fn read(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        self.port.set_timeout(timeout)?;
        let mut buf = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e.into()),
            }
            if Instant::now() >= deadline {
                break;
            }
        }
        if filled == 0 {
            return Err(DeviceError::ReadTimeout { timeout_ms: timeout.as_millis() as u64 });
        }
        buf.truncate(filled);
        Ok(buf)
    }

    fn read_available(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut chunk = [0u8; 64];
        self.port.set_timeout(Duration::from_millis(1))?;
        loop {
            match self.port.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => out.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(out)
    }

    fn reset(&mut self) -> Result<()> {
        self.port.clear(serialport::ClearBuffer::All)?;
        Ok(())
    }
}

/// Transport that records the outgoing stream and plays scripted status
/// responses.
///
/// The recorded transcript is what external collaborators consume for
/// previews; the scripted responses make session behavior fully
/// testable without hardware.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    written: Vec<u8>,
    responses: VecDeque<Vec<u8>>,
    /// Played when the response script is exhausted.
    default_response: Option<Vec<u8>>,
    /// Bytes returned by the next `read_available` drain.
    pending_noise: Vec<u8>,
    /// Accept at most this many bytes per write (None: unlimited).
    write_cap: Option<usize>,
}

impl RecordingTransport {
    /// Transport that always reports Ready.
    pub fn new() -> Self {
        Self { default_response: Some(b"0\x03".to_vec()), ..Default::default() }
    }

    /// Queue a scripted response frame.
    pub fn push_response(&mut self, frame: &[u8]) {
        self.responses.push_back(frame.to_vec());
    }

    /// Queue diagnostic noise for the next pre-write drain.
    pub fn push_noise(&mut self, bytes: &[u8]) {
        self.pending_noise.extend_from_slice(bytes);
    }

    /// Limit how many bytes each write accepts (to exercise short-write
    /// handling).
    pub fn set_write_cap(&mut self, cap: usize) {
        self.write_cap = Some(cap);
    }

    /// Everything written so far.
    pub fn transcript(&self) -> &[u8] {
        &self.written
    }

    /// The transcript split into terminated command strings.
    pub fn commands(&self) -> Vec<String> {
        self.written
            .split(|&b| b == CMD_TERMINATOR)
            .filter(|c| !c.is_empty())
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect()
    }
}

impl DeviceTransport for RecordingTransport {
    fn write(&mut self, data: &[u8], _timeout: Duration) -> Result<TransportWrite> {
        let n = self.write_cap.map_or(data.len(), |cap| cap.min(data.len()));
        self.written.extend_from_slice(&data[..n]);
        Ok(TransportWrite::Wrote(n))
    }

    fn read(&mut self, _len: usize, timeout: Duration) -> Result<Vec<u8>> {
        if let Some(frame) = self.responses.pop_front() {
            return Ok(frame);
        }
        match &self.default_response {
            Some(frame) => Ok(frame.clone()),
            None => Err(DeviceError::ReadTimeout { timeout_ms: timeout.as_millis() as u64 }),
        }
    }

    fn read_available(&mut self) -> Result<Vec<u8>> {
        Ok(std::mem::take(&mut self.pending_noise))
    }

    fn reset(&mut self) -> Result<()> {
        self.pending_noise.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_transport_keeps_the_transcript() {
        let mut t = RecordingTransport::new();
        t.write(b"M0,0\x03D1,2\x03", Duration::from_millis(10)).unwrap();
        assert_eq!(t.commands(), vec!["M0,0", "D1,2"]);
    }

    #[test]
    fn recording_transport_scripted_responses_then_default() {
        let mut t = RecordingTransport::new();
        t.push_response(b"1\x03");
        assert_eq!(t.read(2, Duration::from_millis(10)).unwrap(), b"1\x03");
        assert_eq!(t.read(2, Duration::from_millis(10)).unwrap(), b"0\x03");
    }

    #[test]
    fn write_cap_produces_short_writes() {
        let mut t = RecordingTransport::new();
        t.set_write_cap(3);
        let r = t.write(b"M0,0\x03", Duration::from_millis(10)).unwrap();
        assert_eq!(r, TransportWrite::Wrote(3));
        assert_eq!(t.transcript(), b"M0,");
    }
}
