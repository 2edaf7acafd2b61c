pub mod writer;

pub use writer::HistoryWriter;
