pub mod account;
pub mod export_row;
pub mod history;
pub mod movie;

pub use account::PlexCredentials;
pub use export_row::ExportRow;
pub use history::HistoryEntry;
pub use movie::{ItemLookup, MovieDetails};
