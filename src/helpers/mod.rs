pub mod disposition;
pub mod download;
mod id;
pub mod temp_dir;
