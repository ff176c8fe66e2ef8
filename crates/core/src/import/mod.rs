//! Turning dropped files into soundboard clips.
//!
//! A drop arrives as a `text/uri-list` payload. Each URI is resolved to a
//! local path and sniffed; only regular files that look like audio survive.
//! [`spawn_import`] does the scan on a detached worker thread and hands
//! accepted URIs back over a channel, pausing between files so the host can
//! add tiles one at a time.

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use crossbeam::channel::{self, Receiver, Sender};
use url::Url;

use crate::{Result, SoundjamError};

/// Drag target carrying a list of URIs.
pub const URI_LIST_TARGET: &str = "text/uri-list";

const SNIFF_LEN: usize = 16;

/// Data delivered by a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropData {
    pub target: String,
    pub uris: Vec<String>,
}

impl DropData {
    /// Parses a `text/uri-list` body.
    pub fn from_uri_list(body: &str) -> Self {
        Self {
            target: URI_LIST_TARGET.to_string(),
            uris: parse_uri_list(body),
        }
    }

    /// Builds a uri-list drop from local paths, as a file manager would.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let uris = paths
            .iter()
            .map(|path| path_to_file_uri(path.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            target: URI_LIST_TARGET.to_string(),
            uris,
        })
    }

    pub fn is_uri_list(&self) -> bool {
        self.target == URI_LIST_TARGET
    }
}

/// Progress reported by the import worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportEvent {
    /// An audio file worth a tile.
    Clip(String),
    /// The worker is done; no further events follow.
    Finished { accepted: usize, skipped: usize },
}

/// Splits a uri-list body into URIs, skipping comments and blank lines.
pub fn parse_uri_list(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn file_uri_to_path(uri: &str) -> Result<PathBuf> {
    let parsed = Url::parse(uri).map_err(|_| SoundjamError::InvalidUri(uri.to_string()))?;
    if parsed.scheme() != "file" {
        return Err(SoundjamError::InvalidUri(uri.to_string()));
    }
    parsed
        .to_file_path()
        .map_err(|_| SoundjamError::InvalidUri(uri.to_string()))
}

/// `file://` URI for `path`, made absolute against the working directory.
pub fn path_to_file_uri(path: &Path) -> Result<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|_| SoundjamError::InvalidUri(absolute.display().to_string()))
}

/// Guesses a content type from the file's leading bytes, falling back to the
/// extension.
pub fn sniff_content_type(path: &Path) -> Result<Option<&'static str>> {
    let mut head = [0u8; SNIFF_LEN];
    let mut file = File::open(path)?;
    let mut filled = 0;
    while filled < head.len() {
        let read = file.read(&mut head[filled..])?;
        if read == 0 {
            break;
        }
        filled += read;
    }

    Ok(content_type_from_magic(&head[..filled]).or_else(|| content_type_from_extension(path)))
}

fn content_type_from_magic(head: &[u8]) -> Option<&'static str> {
    if head.len() >= 12 && &head[0..4] == b"RIFF" && &head[8..12] == b"WAVE" {
        return Some("audio/x-wav");
    }
    if head.len() >= 12 && &head[0..4] == b"FORM" && matches!(&head[8..12], b"AIFF" | b"AIFC") {
        return Some("audio/x-aiff");
    }
    if head.starts_with(b"fLaC") {
        return Some("audio/x-flac");
    }
    if head.starts_with(b"OggS") {
        return Some("audio/ogg");
    }
    if head.starts_with(b"\xEF\xBB\xBF") || head.starts_with(b"\xFF\xFE") || head.starts_with(b"\xFE\xFF") {
        return Some("text/plain");
    }
    if head.starts_with(b"ID3") || is_mpeg_frame_header(head) {
        return Some("audio/mpeg");
    }
    if head.len() >= 12 && &head[4..8] == b"ftyp" && matches!(&head[8..11], b"M4A" | b"M4B") {
        return Some("audio/mp4");
    }
    if head.starts_with(b"%PDF") {
        return Some("application/pdf");
    }
    if head.starts_with(b"\x89PNG") {
        return Some("image/png");
    }
    None
}

/// Frame sync plus a version, layer, bitrate and sample rate that are not
/// reserved.
fn is_mpeg_frame_header(head: &[u8]) -> bool {
    let &[0xFF, flags, rates, ..] = head else {
        return false;
    };
    let sync = flags & 0xE0 == 0xE0;
    let version = (flags >> 3) & 0b11;
    let layer = (flags >> 1) & 0b11;
    let bitrate = rates >> 4;
    let sample_rate = (rates >> 2) & 0b11;
    sync && version != 0b01 && layer != 0b00 && bitrate != 0b1111 && sample_rate != 0b11
}

fn content_type_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match ext.as_str() {
        "wav" | "wave" => "audio/x-wav",
        "aif" | "aiff" | "aifc" => "audio/x-aiff",
        "flac" => "audio/x-flac",
        "ogg" | "oga" | "opus" => "audio/ogg",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "txt" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => return None,
    };
    Some(content_type)
}

pub fn is_audio_content_type(content_type: &str) -> bool {
    content_type.contains("audio")
}

/// Returns the URI back if it names an existing regular file that sniffs as
/// audio.
pub fn accept_uri(uri: &str) -> Option<String> {
    let path = match file_uri_to_path(uri) {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!(%err, "skipping dropped uri");
            return None;
        }
    };

    if !path.is_file() {
        tracing::debug!(?path, "skipping missing or non-regular file");
        return None;
    }

    match sniff_content_type(&path) {
        Ok(Some(content_type)) if is_audio_content_type(content_type) => Some(uri.to_string()),
        Ok(content_type) => {
            tracing::debug!(?path, ?content_type, "skipping non-audio file");
            None
        }
        Err(err) => {
            tracing::debug!(?path, %err, "could not sniff dropped file");
            None
        }
    }
}

/// Scans a drop on the current thread, sending accepted URIs as it goes.
pub fn scan(payload: &DropData, throttle: Duration, sender: &Sender<ImportEvent>) -> (usize, usize) {
    if !payload.is_uri_list() {
        tracing::debug!(drop_target = %payload.target, "ignoring drop with unsupported target");
        return (0, payload.uris.len());
    }

    let mut accepted = 0;
    let mut skipped = 0;
    for uri in &payload.uris {
        match accept_uri(uri) {
            Some(uri) => {
                if sender.send(ImportEvent::Clip(uri)).is_err() {
                    tracing::debug!("import receiver dropped, stopping scan");
                    break;
                }
                accepted += 1;
                if !throttle.is_zero() {
                    thread::sleep(throttle);
                }
            }
            None => skipped += 1,
        }
    }
    (accepted, skipped)
}

/// Runs [`scan`] on a detached worker thread. The worker is never joined or
/// cancelled; it ends after sending [`ImportEvent::Finished`].
pub fn spawn_import(payload: DropData, throttle: Duration) -> Result<Receiver<ImportEvent>> {
    let (sender, receiver) = channel::unbounded();
    thread::Builder::new()
        .name("soundjam-import".to_string())
        .spawn(move || {
            let (accepted, skipped) = scan(&payload, throttle, &sender);
            tracing::info!(accepted, skipped, "import finished");
            let _ = sender.send(ImportEvent::Finished { accepted, skipped });
        })?;
    Ok(receiver)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    fn wav_header() -> Vec<u8> {
        let mut bytes = b"RIFF".to_vec();
        bytes.extend_from_slice(&36u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes
    }

    #[test]
    fn parses_uri_list_bodies() {
        let body = "# dragged from files\r\nfile:///tmp/a.wav\r\n\r\n  file:///tmp/b%20c.mp3  \n";
        let payload = DropData::from_uri_list(body);
        assert!(payload.is_uri_list());
        assert_eq!(payload.uris, vec!["file:///tmp/a.wav", "file:///tmp/b%20c.mp3"]);
    }

    #[test]
    fn converts_between_paths_and_uris() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two words.wav");
        let uri = path_to_file_uri(&path).unwrap();
        assert!(uri.starts_with("file://"));
        assert!(uri.contains("two%20words.wav"));
        assert_eq!(file_uri_to_path(&uri).unwrap(), path);

        assert!(matches!(
            file_uri_to_path("https://example.com/a.wav"),
            Err(SoundjamError::InvalidUri(_))
        ));
        assert!(file_uri_to_path("not a uri").is_err());
    }

    #[test]
    fn sniffs_magic_before_extension() {
        let dir = tempfile::tempdir().unwrap();
        let disguised = write(dir.path(), "notes.txt", &wav_header());
        let flac = write(dir.path(), "a.bin", b"fLaC\0\0\0\x22");
        let by_name = write(dir.path(), "b.ogg", b"");
        let text = write(dir.path(), "c.wav.txt", b"hello");

        assert_eq!(sniff_content_type(&disguised).unwrap(), Some("audio/x-wav"));
        assert_eq!(sniff_content_type(&flac).unwrap(), Some("audio/x-flac"));
        assert_eq!(sniff_content_type(&by_name).unwrap(), Some("audio/ogg"));
        assert_eq!(sniff_content_type(&text).unwrap(), Some("text/plain"));
    }

    #[test]
    fn byte_order_marks_are_text_not_mpeg_sync() {
        let dir = tempfile::tempdir().unwrap();
        let utf16 = write(dir.path(), "notes.txt", b"\xFF\xFEh\0e\0l\0l\0o\0");
        let utf16_be = write(dir.path(), "be.txt", b"\xFE\xFF\0h\0i");
        let ones = write(dir.path(), "ones.bin", &[0xFF; 8]);
        let frame = write(dir.path(), "frame.bin", &[0xFF, 0xFB, 0x90, 0x64]);

        assert_eq!(sniff_content_type(&utf16).unwrap(), Some("text/plain"));
        assert_eq!(sniff_content_type(&utf16_be).unwrap(), Some("text/plain"));
        assert_eq!(sniff_content_type(&ones).unwrap(), None);
        assert_eq!(sniff_content_type(&frame).unwrap(), Some("audio/mpeg"));
        assert_eq!(accept_uri(&path_to_file_uri(&utf16).unwrap()), None);
    }

    #[test]
    fn accepts_only_existing_audio_files() {
        let dir = tempfile::tempdir().unwrap();
        let wav = write(dir.path(), "kick.wav", &wav_header());
        let text = write(dir.path(), "readme.txt", b"hello");

        let wav_uri = path_to_file_uri(&wav).unwrap();
        assert_eq!(accept_uri(&wav_uri), Some(wav_uri.clone()));
        assert_eq!(accept_uri(&path_to_file_uri(&text).unwrap()), None);
        assert_eq!(accept_uri(&path_to_file_uri(dir.path()).unwrap()), None);
        assert_eq!(accept_uri(&path_to_file_uri(&dir.path().join("gone.wav")).unwrap()), None);
    }

    #[test]
    fn worker_reports_clips_then_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let kick = write(dir.path(), "kick.wav", &wav_header());
        let snare = write(dir.path(), "snare.mp3", b"ID3\x04\0\0\0\0\0\0");
        let notes = write(dir.path(), "notes.txt", b"hello");

        let payload = DropData::from_paths(&[&kick, &notes, &snare]).unwrap();
        let receiver = spawn_import(payload.clone(), Duration::from_millis(1)).unwrap();
        let events: Vec<ImportEvent> = receiver.iter().collect();

        assert_eq!(
            events,
            vec![
                ImportEvent::Clip(payload.uris[0].clone()),
                ImportEvent::Clip(payload.uris[2].clone()),
                ImportEvent::Finished { accepted: 2, skipped: 1 },
            ]
        );
    }

    #[test]
    fn other_targets_import_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let kick = write(dir.path(), "kick.wav", &wav_header());
        let mut payload = DropData::from_paths(&[kick]).unwrap();
        payload.target = "text/plain".to_string();

        let (sender, receiver) = channel::unbounded();
        assert_eq!(scan(&payload, Duration::ZERO, &sender), (0, 1));
        drop(sender);
        assert!(receiver.iter().next().is_none());
    }
}
