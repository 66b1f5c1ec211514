mod list;
mod write;

pub use list::TransactionListFilter;
pub use write::EntrySpec;
