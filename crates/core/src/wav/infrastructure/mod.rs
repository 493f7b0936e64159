pub mod hound_reader;
pub mod hound_writer;
