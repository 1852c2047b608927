use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for produced files (overrides the config)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Print status records as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the audio track from a video file
    ExtractAudio {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Audio format: mp3, aac, wav, ogg, flac
        #[arg(short, long, default_value = "mp3")]
        format: String,
    },

    /// Re-encode a video to reduce its size
    Compress {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Compression level: low, medium, high
        #[arg(short, long, default_value = "medium")]
        level: String,
    },

    /// Remux a video into another container
    Convert {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Target container: mp4, avi, mov, mkv, webm, flv, wmv, m4v, 3gp
        #[arg(short, long)]
        target_format: String,
    },

    /// Cut a section out of a video
    Trim {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Start time (HH:MM:SS, MM:SS or seconds)
        #[arg(short, long)]
        start: String,

        /// End time (HH:MM:SS, MM:SS or seconds)
        #[arg(short, long)]
        end: String,
    },

    /// Show container and stream information
    Info {
        /// Input media file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Check that ffmpeg is installed and print its version
    Check,

    /// Write the default configuration to a file
    InitConfig {
        /// Destination path
        #[arg(default_value = "ffstage.toml")]
        path: PathBuf,
    },
}
