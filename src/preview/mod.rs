//! HTTP preview surface: MJPEG stream, snapshot, and health routes.
//!
//! Capture loops publish JPEG-encoded frames into a shared latest-frame
//! slot; the server pushes whatever is in the slot to connected clients.
//! One overwrite per loop iteration, last write wins, no queue and no
//! backpressure. Any number of clients may consume the stream; each
//! connection is handled on its own thread so a long-lived stream never
//! starves the accept loop.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

const MAX_REQUEST_BYTES: usize = 8192;
const MULTIPART_BOUNDARY: &str = "frame";

/// One published frame: encoded bytes plus the publish sequence number.
#[derive(Clone, Debug)]
pub struct JpegFrame {
    pub data: Arc<Vec<u8>>,
    pub seq: u64,
}

/// The shared latest-frame slot.
pub type SharedJpeg = Arc<Mutex<Option<JpegFrame>>>;

/// Create an empty slot for a capture loop and its preview server.
pub fn shared_slot() -> SharedJpeg {
    Arc::new(Mutex::new(None))
}

/// Read the slot. Returns `None` before the first publish.
pub fn latest(slot: &SharedJpeg) -> Option<JpegFrame> {
    match slot.lock() {
        Ok(guard) => guard.clone(),
        Err(_) => None,
    }
}

/// Publisher side of the slot. Stamps each publish with a fresh sequence
/// number so stream handlers can tell a redraw from a stale read.
pub struct FramePublisher {
    slot: SharedJpeg,
    seq: AtomicU64,
}

impl FramePublisher {
    pub fn new(slot: SharedJpeg) -> Self {
        Self {
            slot,
            seq: AtomicU64::new(0),
        }
    }

    /// Overwrite the slot with a newly encoded frame. Last write wins.
    pub fn publish(&self, jpeg: Vec<u8>) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        match self.slot.lock() {
            Ok(mut guard) => {
                *guard = Some(JpegFrame {
                    data: Arc::new(jpeg),
                    seq,
                });
            }
            Err(_) => log::warn!("frame slot poisoned; dropping frame {}", seq),
        }
    }

    pub fn published(&self) -> u64 {
        self.seq.load(Ordering::Relaxed)
    }
}

/// Configuration for the preview server.
#[derive(Clone, Debug)]
pub struct PreviewConfig {
    pub addr: String,
    /// Pause between slot polls while streaming; bounds the push rate.
    pub frame_interval: Duration,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
            frame_interval: Duration::from_millis(33),
        }
    }
}

/// Handle for a running preview server.
#[derive(Debug)]
pub struct PreviewHandle {
    pub addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl PreviewHandle {
    /// Signal shutdown and wait for the accept loop to exit. Streaming
    /// connections observe the same flag and drain within one poll interval.
    pub fn stop(mut self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            join.join()
                .map_err(|_| anyhow!("preview server thread panicked"))?;
        }
        Ok(())
    }
}

pub struct PreviewServer {
    cfg: PreviewConfig,
    slot: SharedJpeg,
}

impl PreviewServer {
    pub fn new(cfg: PreviewConfig, slot: SharedJpeg) -> Self {
        Self { cfg, slot }
    }

    pub fn spawn(self) -> Result<PreviewHandle> {
        let configured_addr: SocketAddr = self.cfg.addr.parse()?;
        let listener = TcpListener::bind(configured_addr)?;
        let addr = listener.local_addr()?;
        listener.set_nonblocking(true)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_thread = shutdown.clone();
        let cfg = self.cfg.clone();
        let slot = self.slot.clone();
        let join = std::thread::spawn(move || {
            if let Err(err) = run_server(listener, cfg, slot, shutdown_thread) {
                log::error!("preview server stopped: {}", err);
            }
        });

        Ok(PreviewHandle {
            addr,
            shutdown,
            join: Some(join),
        })
    }
}

fn run_server(
    listener: TcpListener,
    cfg: PreviewConfig,
    slot: SharedJpeg,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match listener.accept() {
            Ok((stream, peer)) => {
                let slot = slot.clone();
                let shutdown = shutdown.clone();
                let interval = cfg.frame_interval;
                std::thread::spawn(move || {
                    if let Err(err) = handle_connection(stream, &slot, &shutdown, interval) {
                        log::debug!("preview connection {} closed: {}", peer, err);
                    }
                });
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(50));
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn handle_connection(
    mut stream: TcpStream,
    slot: &SharedJpeg,
    shutdown: &Arc<AtomicBool>,
    interval: Duration,
) -> Result<()> {
    let request = read_request(&mut stream)?;
    if request.method != "GET" {
        write_json_response(&mut stream, 405, r#"{"error":"method_not_allowed"}"#)?;
        return Ok(());
    }

    match request.path.as_str() {
        "/health" => write_json_response(&mut stream, 200, r#"{"status":"ok"}"#),
        "/snapshot.jpg" => match latest(slot) {
            Some(frame) => write_response(&mut stream, 200, "image/jpeg", &frame.data),
            None => write_json_response(&mut stream, 503, r#"{"error":"no_frame"}"#),
        },
        "/" => {
            // No content is served before the first frame is published.
            if latest(slot).is_none() {
                return write_json_response(&mut stream, 503, r#"{"error":"no_frame"}"#);
            }
            stream_mjpeg(&mut stream, slot, shutdown, interval)
        }
        _ => write_json_response(&mut stream, 404, r#"{"error":"not_found"}"#),
    }
}

/// Push JPEG parts to a connected client until it disconnects or the server
/// shuts down. A part is written whenever the slot's sequence advances.
fn stream_mjpeg(
    stream: &mut TcpStream,
    slot: &SharedJpeg,
    shutdown: &Arc<AtomicBool>,
    interval: Duration,
) -> Result<()> {
    let header = format!(
        "HTTP/1.1 200 OK\r\nCache-Control: no-store\r\nConnection: close\r\nContent-Type: multipart/x-mixed-replace; boundary={MULTIPART_BOUNDARY}\r\n\r\n"
    );
    stream.write_all(header.as_bytes())?;

    let mut last_seq = 0u64;
    loop {
        if shutdown.load(Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(frame) = latest(slot) {
            if frame.seq != last_seq {
                let part_header = format!(
                    "--{MULTIPART_BOUNDARY}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
                    frame.data.len()
                );
                stream.write_all(part_header.as_bytes())?;
                stream.write_all(&frame.data)?;
                stream.write_all(b"\r\n")?;
                stream.flush()?;
                last_seq = frame.seq;
            }
        }
        std::thread::sleep(interval);
    }
}

fn read_request(stream: &mut TcpStream) -> Result<HttpRequest> {
    stream.set_read_timeout(Some(Duration::from_secs(2)))?;
    let mut buf = [0u8; 1024];
    let mut data = Vec::new();
    loop {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        if data.len() > MAX_REQUEST_BYTES {
            return Err(anyhow!("request too large"));
        }
        if data.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    let text = String::from_utf8_lossy(&data);
    let mut lines = text.split("\r\n");
    let request_line = lines.next().ok_or_else(|| anyhow!("empty request"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().ok_or_else(|| anyhow!("missing method"))?;
    let raw_path = parts.next().ok_or_else(|| anyhow!("missing path"))?;
    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((k, v)) = line.split_once(':') {
            headers.insert(k.trim().to_lowercase(), v.trim().to_string());
        }
    }
    let path = raw_path.split('?').next().unwrap_or(raw_path).to_string();
    Ok(HttpRequest {
        method: method.to_string(),
        path,
        headers,
    })
}

fn write_json_response(stream: &mut TcpStream, status: u16, body: &str) -> Result<()> {
    write_response(stream, status, "application/json", body.as_bytes())
}

fn write_response(
    stream: &mut TcpStream,
    status: u16,
    content_type: &str,
    body: &[u8],
) -> Result<()> {
    let status_line = match status {
        200 => "HTTP/1.1 200 OK",
        404 => "HTTP/1.1 404 Not Found",
        405 => "HTTP/1.1 405 Method Not Allowed",
        503 => "HTTP/1.1 503 Service Unavailable",
        _ => "HTTP/1.1 500 Internal Server Error",
    };
    let header = format!(
        "{status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {len}\r\nCache-Control: no-store\r\n\r\n",
        status_line = status_line,
        content_type = content_type,
        len = body.len()
    );
    stream.write_all(header.as_bytes())?;
    stream.write_all(body)?;
    Ok(())
}

#[derive(Debug)]
struct HttpRequest {
    method: String,
    path: String,
    #[allow(dead_code)]
    headers: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publisher_advances_sequence_numbers() {
        let slot = shared_slot();
        let publisher = FramePublisher::new(slot.clone());

        assert!(latest(&slot).is_none());

        publisher.publish(vec![1, 2, 3]);
        let first = latest(&slot).unwrap();
        assert_eq!(first.seq, 1);
        assert_eq!(first.data.as_slice(), &[1, 2, 3]);

        publisher.publish(vec![4]);
        let second = latest(&slot).unwrap();
        assert_eq!(second.seq, 2);
        assert_eq!(publisher.published(), 2);
    }

    #[test]
    fn last_write_wins() {
        let slot = shared_slot();
        let publisher = FramePublisher::new(slot.clone());

        for i in 0..10u8 {
            publisher.publish(vec![i]);
        }
        assert_eq!(latest(&slot).unwrap().data.as_slice(), &[9]);
    }
}
