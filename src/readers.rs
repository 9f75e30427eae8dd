//! Line sources: local files (single path or glob) and a single HTTP resource.
//!
//! Every source is turned into a [`LineStream`]: one producer thread per input
//! pushes [`SourcedLine`]s into a shared bounded channel. Opening fails up
//! front with a [`SourceError`]; once lines are flowing, read failures only
//! end the affected input.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, warn};

use crate::decompression::{maybe_decompress, open_log_file};
use crate::error::SourceError;
use crate::record::SourcedLine;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 10_000;

const GLOB_CHARS: [char; 3] = ['*', '?', '['];
const URL_SOURCE_SUFFIX: &str = " (url)";

type LineReader = Box<dyn BufRead + Send>;

/// Something that can be opened into a stream of tagged raw lines.
pub trait LineSource {
    fn locator(&self) -> &str;

    fn open(&self, capacity: usize) -> Result<LineStream, SourceError>;
}

/// Pick the source matching `locator` and open it.
pub fn open_source(locator: &str, capacity: usize) -> Result<LineStream, SourceError> {
    source_for(locator).open(capacity)
}

pub fn source_for(locator: &str) -> Box<dyn LineSource> {
    if is_url(locator) {
        Box::new(UrlSource::new(locator))
    } else {
        Box::new(FileSource::new(locator))
    }
}

pub fn is_url(locator: &str) -> bool {
    let lower = locator.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Lines from all inputs, in no particular cross-input order.
///
/// Dropping the stream disconnects the channel; producers notice on their
/// next send and stop, closing their input.
pub struct LineStream {
    receiver: Receiver<SourcedLine>,
    producers: Vec<JoinHandle<()>>,
    source_ids: Vec<String>,
}

impl LineStream {
    /// Spawn one producer per `(source id, reader)` pair.
    pub fn from_readers(inputs: Vec<(String, LineReader)>, capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        let mut producers = Vec::with_capacity(inputs.len());
        let mut source_ids = Vec::with_capacity(inputs.len());

        for (source_id, reader) in inputs {
            source_ids.push(source_id.clone());
            let sender = sender.clone();
            producers.push(thread::spawn(move || {
                produce_lines(source_id, reader, sender);
            }));
        }

        Self {
            receiver,
            producers,
            source_ids,
        }
    }

    /// Stream over in-memory lines attributed to one source.
    pub fn from_lines<I, S>(source_id: &str, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut body = String::new();
        for line in lines {
            body.push_str(line.as_ref());
            body.push('\n');
        }
        let reader: LineReader = Box::new(io::Cursor::new(body.into_bytes()));
        Self::from_readers(vec![(source_id.to_string(), reader)], DEFAULT_CHANNEL_CAPACITY)
    }

    /// Identifiers of the inputs feeding this stream, in open order.
    pub fn source_ids(&self) -> &[String] {
        &self.source_ids
    }

    /// Wait for every producer to exit.
    pub fn finish(self) {
        let Self {
            receiver,
            producers,
            ..
        } = self;
        drop(receiver);
        for handle in producers {
            if handle.join().is_err() {
                warn!("line producer thread panicked");
            }
        }
    }
}

impl Iterator for LineStream {
    type Item = SourcedLine;

    fn next(&mut self) -> Option<SourcedLine> {
        self.receiver.recv().ok()
    }
}

fn produce_lines(source_id: String, mut reader: LineReader, sender: Sender<SourcedLine>) {
    let mut buf = Vec::new();
    let mut sent = 0usize;
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(strip_line_ending(&buf)).into_owned();
                if sender.send(SourcedLine::new(source_id.as_str(), line)).is_err() {
                    debug!(source = %source_id, "line consumer gone, stopping");
                    return;
                }
                sent += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(source = %source_id, error = %e, "read failed, skipping rest of input");
                break;
            }
        }
    }
    debug!(source = %source_id, lines = sent, "input exhausted");
}

fn strip_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

/// One local file or every file matching a glob pattern.
#[derive(Debug, Clone)]
pub struct FileSource {
    locator: String,
}

impl FileSource {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
        }
    }

    pub fn is_pattern(&self) -> bool {
        self.locator.contains(GLOB_CHARS)
    }

    /// Files this source would read, sorted by path.
    pub fn resolve(&self) -> Result<Vec<PathBuf>, SourceError> {
        if !self.is_pattern() {
            let path = PathBuf::from(&self.locator);
            if !path.is_file() {
                return Err(SourceError::NotFound {
                    locator: self.locator.clone(),
                });
            }
            return Ok(vec![path]);
        }

        let entries = glob::glob(&self.locator).map_err(|e| SourceError::InvalidPattern {
            pattern: self.locator.clone(),
            reason: e.msg.to_string(),
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable glob match");
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(SourceError::NotFound {
                locator: self.locator.clone(),
            });
        }
        Ok(paths)
    }
}

impl LineSource for FileSource {
    fn locator(&self) -> &str {
        &self.locator
    }

    fn open(&self, capacity: usize) -> Result<LineStream, SourceError> {
        let paths = self.resolve()?;
        let single = !self.is_pattern();
        let mut inputs = Vec::with_capacity(paths.len());

        for path in paths {
            match open_log_file(&path) {
                Ok(reader) => {
                    let source_id = file_source_id(&path);
                    debug!(source = %source_id, path = %path.display(), "opened input");
                    inputs.push((source_id, reader));
                }
                Err(source) if single => return Err(SourceError::Io { path, source }),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping file"),
            }
        }

        if inputs.is_empty() {
            return Err(SourceError::NotFound {
                locator: self.locator.clone(),
            });
        }
        Ok(LineStream::from_readers(inputs, capacity))
    }
}

/// Base name of the file, or the whole path when it has none.
pub fn file_source_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A single log fetched with one HTTP GET.
#[derive(Debug, Clone)]
pub struct UrlSource {
    url: String,
}

impl UrlSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Last non-empty path segment (host when the path is empty) plus ` (url)`.
    pub fn source_id(&self) -> String {
        let name = match reqwest::Url::parse(&self.url) {
            Ok(url) => url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map(str::to_string)
                .or_else(|| url.host_str().map(str::to_string))
                .unwrap_or_else(|| self.url.clone()),
            Err(_) => self.url.clone(),
        };
        format!("{}{}", name, URL_SOURCE_SUFFIX)
    }
}

impl LineSource for UrlSource {
    fn locator(&self) -> &str {
        &self.url
    }

    fn open(&self, capacity: usize) -> Result<LineStream, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let response = client
            .get(&self.url)
            .send()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::NonSuccessStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let source_id = self.source_id();
        debug!(source = %source_id, status = status.as_u16(), "opened input");
        let reader = maybe_decompress(response).map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(LineStream::from_readers(vec![(source_id, reader)], capacity))
    }
}
