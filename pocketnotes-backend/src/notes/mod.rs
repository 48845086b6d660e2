//! Notes system — the in-memory collection plus its persistence mirror
//! and the embedded image encoding it stores.

pub mod images;
pub mod store;

pub use store::{Note, NoteDraft, NoteStore};
