//! Command-line interface implementation

use crate::audio::{AudioFormat, Command, DecodeErrorStatus, DecodeOutcome, DecoderClient};
use crate::metadata::{ReplayGainInfo, Tag};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};

const LOG_TARGET: &str = "flac_bridge::ui::cli";

/// Command-line arguments for flac-bridge
#[derive(Parser, Debug)]
#[command(author, version, about = "Decode FLAC streams into raw interleaved PCM", long_about = None)]
pub struct Args {
    /// FLAC or Ogg FLAC file to decode
    pub input: PathBuf,

    /// Write PCM to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file path
    #[arg(short, long, env = "FLAC_BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long, value_name = "N")]
    pub max_frames: Option<u64>,

    /// Seek to this position, in seconds, after the first frame
    #[arg(long, value_name = "SECONDS")]
    pub seek: Option<f64>,

    /// Print the stream's tag and exit
    #[arg(long)]
    pub tags: bool,

    /// Print the virtual file name of cue-sheet track N and exit
    #[arg(long, value_name = "N")]
    pub track_name: Option<u32>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

/// CLI user interface
pub struct Cli {
    pub args: Args,
}

impl Cli {
    /// Create a new CLI instance from the process arguments
    pub fn new() -> Self {
        Cli {
            args: Args::parse(),
        }
    }

    /// Display a scanned tag
    pub fn display_tag(&self, tag: &Tag) {
        if tag.is_empty() {
            println!("No tag information found.");
        } else {
            print!("{}", tag);
        }
    }

    /// Display the end-of-session summary on stderr
    pub fn display_summary<W: Write>(&self, outcome: DecodeOutcome, sink: &PcmSink<W>) {
        let how = match outcome {
            DecodeOutcome::Finished => "finished",
            DecodeOutcome::Stopped => "stopped",
        };
        eprintln!(
            "Decode {}: {} frames, {} bytes of PCM{}",
            how,
            sink.frames_delivered(),
            sink.bytes_written(),
            sink.format().map(|f| format!(" ({})", f)).unwrap_or_default()
        );
        if let Some(rg) = sink.replay_gain() {
            eprintln!(
                "Replay gain: track {:+.2} dB (peak {:.6}), album {:+.2} dB (peak {:.6})",
                rg.track.gain, rg.track.peak, rg.album.gain, rg.album.peak
            );
        }
        if sink.warnings() > 0 {
            eprintln!("{} decode warnings", sink.warnings());
        }
    }

    /// Display error messages
    pub fn display_error(&self, error: &dyn Error) {
        eprintln!("Error: {}", error);
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer writing every delivered frame to `W`.
///
/// Answers `Stop` once `max_frames` frames went out or the writer failed,
/// and `Seek` on the first frame when a seek target is pending.
pub struct PcmSink<W: Write> {
    writer: W,
    command: Command,
    max_frames: Option<u64>,
    pending_seek: Option<f64>,
    format: Option<AudioFormat>,
    replay_gain: Option<ReplayGainInfo>,
    frames_delivered: u64,
    bytes_written: u64,
    warnings: u64,
    write_error: Option<io::Error>,
    progress: Option<ProgressBar>,
}

impl<W: Write> PcmSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            command: Command::None,
            max_frames: None,
            pending_seek: None,
            format: None,
            replay_gain: None,
            frames_delivered: 0,
            bytes_written: 0,
            warnings: 0,
            write_error: None,
            progress: None,
        }
    }

    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn with_seek(mut self, seconds: Option<f64>) -> Self {
        self.pending_seek = seconds;
        self
    }

    /// Shows a progress bar once the stream length is known.
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled.then(ProgressBar::hidden);
        self
    }

    pub fn format(&self) -> Option<AudioFormat> {
        self.format
    }

    pub fn replay_gain(&self) -> Option<&ReplayGainInfo> {
        self.replay_gain.as_ref()
    }

    pub fn frames_delivered(&self) -> u64 {
        self.frames_delivered
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn warnings(&self) -> u64 {
        self.warnings
    }

    /// Flushes the writer and reports any write failure seen while decoding.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(progress) = self.progress.take() {
            progress.finish_and_clear();
        }
        if let Some(e) = self.write_error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> DecoderClient for PcmSink<W> {
    fn initialized(&mut self, format: AudioFormat, seekable: bool, total_seconds: Option<f64>) {
        info!(target: LOG_TARGET, "Audio format {} (seekable: {}, duration: {:?})", format, seekable, total_seconds);
        self.format = Some(format);

        if let (Some(progress), Some(seconds)) = (self.progress.as_mut(), total_seconds) {
            let total_frames = (seconds * format.sample_rate() as f64) as u64;
            let bar = ProgressBar::new(total_frames);
            if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} frames ({eta})") {
                bar.set_style(style);
            }
            *progress = bar;
        }
        if !seekable && self.pending_seek.is_some() {
            debug!(target: LOG_TARGET, "Stream is not seekable, dropping seek request");
            self.pending_seek = None;
        }
    }

    fn deliver_audio(&mut self, pcm: &[u8], _bit_rate: u32) -> Command {
        if let Err(e) = self.writer.write_all(pcm) {
            error!(target: LOG_TARGET, "Failed to write PCM: {}", e);
            self.write_error = Some(e);
            self.command = Command::Stop;
            return self.command;
        }
        self.frames_delivered += 1;
        self.bytes_written += pcm.len() as u64;

        if let (Some(progress), Some(format)) = (&self.progress, self.format) {
            if format.frame_size() > 0 {
                progress.inc((pcm.len() / format.frame_size()) as u64);
            }
        }

        self.command = if self.max_frames.is_some_and(|max| self.frames_delivered >= max) {
            Command::Stop
        } else if self.pending_seek.is_some() {
            Command::Seek
        } else {
            Command::None
        };
        self.command
    }

    fn command(&self) -> Command {
        self.command
    }

    fn notify_replay_gain(&mut self, info: ReplayGainInfo) {
        self.replay_gain = Some(info);
    }

    fn notify_warning(&mut self, _plugin: &str, _kind: DecodeErrorStatus) {
        self.warnings += 1;
    }

    fn seek_frame(&self) -> u64 {
        match (self.pending_seek, self.format) {
            (Some(seconds), Some(format)) => (seconds.max(0.0) * format.sample_rate() as f64) as u64,
            _ => 0,
        }
    }

    fn command_finished(&mut self) {
        if let Some(progress) = &self.progress {
            progress.set_position(self.seek_frame());
        }
        self.pending_seek = None;
        self.command = Command::None;
    }

    fn seek_error(&mut self) {
        self.pending_seek = None;
        self.command = Command::None;
    }
}
