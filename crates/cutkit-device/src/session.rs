//! Device session: converts planned mm polylines into the wire protocol
//! over a claimed transport.
//!
//! The session is synchronous and single-owner. Its state machine is
//! `Uninitialized → Ready ⇄ Moving`, with `Unloaded` reachable whenever
//! media is removed and `Unknown` as the catch-all for odd status
//! payloads. Writes are chunked, drained and retried; `safe_write` adds
//! the burst cap and Ready-wait backpressure that protect the device's
//! small command buffer. Commands go out strictly in planner order.

use std::thread;
use std::time::{Duration, Instant};

use cutkit_core::{mm_to_units, BoundingBox, MediaDescriptor, Point2, RegMarks};
use cutkit_devicedb::{clamp_pressure, clamp_speed, media_default, DeviceProfile};

use crate::error::{DeviceError, Result};
use crate::protocol::{
    cmd, parse_status, DeviceCommand, SessionState, CMD_INITIALIZE, CMD_TERMINATOR,
    STATUS_FRAME_LEN, STATUS_REQUEST,
};
use crate::transform::Transform;
use crate::transport::{DeviceTransport, TransportWrite};

/// Upper bound for one transport-level write.
pub const WRITE_CHUNK: usize = 4096;

/// Upper bound for one `safe_write` burst; bursts are cut at the last
/// complete command terminator below this.
pub const SAFE_BURST: usize = 1024;

/// Retries per chunk before a write is declared failed.
const WRITE_RETRIES: u32 = 3;

/// Sleep between write retries.
const RETRY_SLEEP: Duration = Duration::from_millis(100);

/// Sleep between status polls; `wait_for_ready` is a sleep-poll loop,
/// not a spin loop.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Consecutive malformed status frames tolerated before escalating.
const MALFORMED_LIMIT: u32 = 5;

/// How long a burst may wait for the device to drain its buffer.
const READY_TIMEOUT: Duration = Duration::from_secs(60);

/// How long the registration-mark search may take.
const REGMARK_TIMEOUT: Duration = Duration::from_secs(30);

/// Setup parameters for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupParams {
    /// Vendor media id; also selects default speed/pressure.
    pub media: u16,
    /// Explicit speed, or the media default.
    pub speed: Option<u8>,
    /// Explicit pressure, or the media default.
    pub pressure: Option<u8>,
    /// Pen instead of blade: no blade-circle compensation command.
    pub pen: bool,
    /// Blade-rotation compensation circle, device units.
    pub blade_circle: Option<u8>,
    /// Extra feed-roller pass for heavy media.
    pub track_enhance: bool,
    /// Landscape orientation.
    pub landscape: bool,
}

impl Default for SetupParams {
    fn default() -> Self {
        Self {
            media: 300,
            speed: None,
            pressure: None,
            pen: false,
            blade_circle: Some(18),
            track_enhance: false,
            landscape: false,
        }
    }
}

/// Where the head goes after a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailerMode {
    /// Back to the load origin.
    ReturnHome,
    /// Feed forward past the drawing so the result can be cut free.
    AdvancePast,
}

/// What a plot job produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOutcome {
    /// Bounding box of every emitted coordinate, device units.
    pub bbox: BoundingBox,
    /// The trailer command that positioned the head after the job.
    pub trailer: String,
}

/// A plotting session over a claimed transport.
///
/// The transport is released when the session is dropped; it must never
/// be shared between two sessions.
pub struct Session<T: DeviceTransport> {
    transport: T,
    profile: DeviceProfile,
    last_state: SessionState,
    initialized: bool,
    io_timeout: Duration,
    regmark_timeout: Duration,
}

impl<T: DeviceTransport> Session<T> {
    /// Take ownership of a transport.
    pub fn new(transport: T, profile: DeviceProfile) -> Self {
        Self {
            transport,
            profile,
            last_state: SessionState::Unknown(Vec::new()),
            initialized: false,
            io_timeout: Duration::from_millis(1000),
            regmark_timeout: REGMARK_TIMEOUT,
        }
    }

    /// Override the registration-mark search timeout.
    pub fn set_regmark_timeout(&mut self, timeout: Duration) {
        self.regmark_timeout = timeout;
    }

    /// The capability profile this session runs against.
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Last status reported by the device.
    pub fn last_state(&self) -> &SessionState {
        &self.last_state
    }

    /// Borrow the transport (transcript access for recording backends).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Query the device status.
    ///
    /// Sends the fixed status request and parses the fixed-size reply.
    /// A write timeout here is reported as [`DeviceError::ReadTimeout`]:
    /// status queries are polls and their loops retry on that variant.
    pub fn status(&mut self) -> Result<SessionState> {
        match self.transport.write(STATUS_REQUEST, self.io_timeout)? {
            TransportWrite::Wrote(n) if n == STATUS_REQUEST.len() => {}
            _ => {
                return Err(DeviceError::ReadTimeout {
                    timeout_ms: self.io_timeout.as_millis() as u64,
                })
            }
        }
        let frame = self.transport.read(STATUS_FRAME_LEN, self.io_timeout)?;
        let state = parse_status(&frame)?;
        if let SessionState::Unknown(bytes) = &state {
            tracing::warn!(?bytes, "device reported an unknown status");
        }
        self.last_state = state.clone();
        Ok(state)
    }

    /// Poll until the device is `Ready` or `timeout` elapses.
    ///
    /// Read timeouts and malformed frames are retried (the latter up to
    /// [`MALFORMED_LIMIT`] consecutive occurrences); everything else is
    /// fatal.
    pub fn wait_for_ready(&mut self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let mut malformed = 0u32;
        loop {
            match self.status() {
                Ok(SessionState::Ready) => return Ok(()),
                Ok(_) => malformed = 0,
                Err(DeviceError::ReadTimeout { .. }) => {}
                Err(DeviceError::MalformedStatus { bytes }) => {
                    malformed += 1;
                    tracing::warn!(?bytes, malformed, "malformed status frame");
                    if malformed >= MALFORMED_LIMIT {
                        return Err(DeviceError::MalformedStatus { bytes });
                    }
                }
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                return Err(DeviceError::ReadTimeout { timeout_ms: timeout.as_millis() as u64 });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Write a payload in bounded chunks with drain-and-retry.
    ///
    /// Before each chunk any spurious diagnostic bytes are drained with a
    /// non-blocking read. A timed-out or zero-length write sleeps and
    /// retries the same chunk up to [`WRITE_RETRIES`] times; persistent
    /// failure is fatal ([`DeviceError::WriteFailed`], or
    /// [`DeviceError::WriteIncomplete`] when part of the chunk went out).
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        for chunk in data.chunks(WRITE_CHUNK) {
            let drained = self.transport.read_available()?;
            if !drained.is_empty() {
                tracing::debug!(bytes = drained.len(), "drained diagnostic bytes before write");
            }
            let mut written = 0usize;
            let mut attempts = 0u32;
            while written < chunk.len() {
                match self.transport.write(&chunk[written..], self.io_timeout)? {
                    TransportWrite::Wrote(0) | TransportWrite::TimedOut => {
                        attempts += 1;
                        if attempts > WRITE_RETRIES {
                            return Err(if written > 0 {
                                DeviceError::WriteIncomplete { written, len: chunk.len() }
                            } else {
                                DeviceError::WriteFailed { retries: WRITE_RETRIES }
                            });
                        }
                        tracing::debug!(attempts, "write stalled, retrying chunk");
                        thread::sleep(RETRY_SLEEP);
                    }
                    TransportWrite::Wrote(n) => {
                        written += n;
                        attempts = 0;
                    }
                }
            }
        }
        Ok(())
    }

    /// Write with device-buffer backpressure.
    ///
    /// Each physical burst stays below [`SAFE_BURST`] bytes and is cut at
    /// the last complete command terminator within the cap, so no command
    /// straddles a burst. Between bursts the session blocks until the
    /// device reports `Ready` again; this is the primary protection
    /// against overflowing the device's internal command buffer.
    pub fn safe_write(&mut self, data: &[u8]) -> Result<()> {
        let mut rest = data;
        while !rest.is_empty() {
            let cut = if rest.len() <= SAFE_BURST {
                rest.len()
            } else {
                match rest[..SAFE_BURST].iter().rposition(|&b| b == CMD_TERMINATOR) {
                    Some(i) => i + 1,
                    None => SAFE_BURST,
                }
            };
            let (burst, tail) = rest.split_at(cut);
            self.write(burst)?;
            rest = tail;
            if !rest.is_empty() {
                self.wait_for_ready(READY_TIMEOUT)?;
            }
        }
        Ok(())
    }

    /// Initialize the device and configure it for a job.
    ///
    /// Unspecified speed/pressure come from the media table;
    /// out-of-range values are clamped to the device's documented range,
    /// not rejected.
    pub fn setup(&mut self, params: &SetupParams) -> Result<()> {
        let (default_speed, default_pressure) = match media_default(params.media) {
            Ok(m) => (m.speed, m.pressure),
            Err(e) => {
                tracing::warn!(media = params.media, error = %e, "unknown media, using custom defaults");
                (10, 30)
            }
        };
        let speed = clamp_speed(params.speed.unwrap_or(default_speed));
        let pressure = clamp_pressure(params.pressure.unwrap_or(default_pressure));

        let mut buf = CMD_INITIALIZE.to_vec();
        buf.extend(cmd::media(params.media));
        buf.extend(cmd::speed(speed));
        buf.extend(cmd::pressure(pressure));
        if !params.pen {
            if let Some(circle) = params.blade_circle {
                buf.extend(cmd::blade_circle(circle));
            }
        }
        buf.extend(cmd::track_enhance(params.track_enhance));
        buf.extend(cmd::landscape(params.landscape));
        self.write(&buf)?;
        self.initialized = true;
        Ok(())
    }

    /// Plot planned polylines.
    ///
    /// Runs the registration-mark search when the media requests it,
    /// transforms and clips every vertex, emits the Move/Draw stream via
    /// [`Self::safe_write`] and finishes with the trailer move. Returns
    /// the realized bounding box and the trailer command.
    ///
    /// Degenerate paths (fewer than two vertices) are skipped with a
    /// warning; an entirely empty job yields an empty bounding box.
    pub fn plot(
        &mut self,
        paths: &[Vec<Point2>],
        media: &MediaDescriptor,
        offset_mm: Point2,
        trailer_mode: TrailerMode,
    ) -> Result<PlotOutcome> {
        if !self.initialized {
            tracing::debug!("plotting without explicit setup, device keeps its current parameters");
        }
        if let Some(regs) = &media.regmarks {
            if regs.search {
                self.search_regmarks(regs)?;
            }
        }

        let tf = Transform::new(media, &self.profile, offset_mm);
        let mut bbox = BoundingBox::new();
        let mut stream: Vec<u8> = Vec::new();

        for (i, path) in paths.iter().enumerate() {
            if path.len() < 2 {
                tracing::warn!(path = i, vertices = path.len(), "skipping degenerate path");
                continue;
            }
            let mut prev_clipped = true; // first vertex always travels pen-up
            for (v, &p) in path.iter().enumerate() {
                let cp = tf.apply(p);
                let command = if v > 0 && !prev_clipped && !cp.clipped {
                    DeviceCommand::Draw { x: cp.x, y: cp.y }
                } else {
                    DeviceCommand::Move { x: cp.x, y: cp.y }
                };
                command.encode_into(&mut stream);
                bbox.visit(cp.x, cp.y);
                prev_clipped = cp.clipped;
            }
        }

        if stream.is_empty() {
            tracing::warn!("nothing to plot");
        } else {
            self.safe_write(&stream)?;
        }

        let trailer_cmd = self.trailer_command(trailer_mode, &bbox);
        self.write(&trailer_cmd)?;
        let trailer = String::from_utf8_lossy(
            trailer_cmd.strip_suffix(&[CMD_TERMINATOR]).unwrap_or(&trailer_cmd),
        )
        .into_owned();

        Ok(PlotOutcome { bbox, trailer })
    }

    fn trailer_command(&self, mode: TrailerMode, bbox: &BoundingBox) -> Vec<u8> {
        match mode {
            TrailerMode::ReturnHome => cmd::home(),
            TrailerMode::AdvancePast => {
                let y = if bbox.is_empty() { 0 } else { bbox.lly + mm_to_units(10.0) };
                let mut out = Vec::new();
                DeviceCommand::Move { x: 0, y }.encode_into(&mut out);
                out
            }
        }
    }

    /// Ask the device to search for registration marks.
    ///
    /// The search is bounded by the regmark timeout (30s unless
    /// overridden); running out of time is
    /// [`DeviceError::RegistrationNotFound`] — fatal to the current job,
    /// but the session and its handle remain valid.
    pub fn search_regmarks(&mut self, regs: &RegMarks) -> Result<()> {
        let seq =
            cmd::regmark_search(mm_to_units(regs.length_mm), mm_to_units(regs.width_mm));
        self.write(&seq)?;
        match self.wait_for_ready(self.regmark_timeout) {
            Ok(()) => Ok(()),
            Err(DeviceError::ReadTimeout { .. }) => Err(DeviceError::RegistrationNotFound {
                timeout_ms: self.regmark_timeout.as_millis() as u64,
            }),
            Err(e) => Err(e),
        }
    }
}
