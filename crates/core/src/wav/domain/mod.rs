pub mod clip_reader;
pub mod clip_writer;
pub mod encoding;
