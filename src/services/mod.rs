mod record_source;
mod tape_store;

pub use record_source::RecordSource;
pub use tape_store::TapeStore;
