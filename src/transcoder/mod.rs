mod ffmpeg;

pub use ffmpeg::{Bitrate, Mp3Transcoder};
