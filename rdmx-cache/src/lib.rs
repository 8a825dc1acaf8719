mod cache;

pub use cache::{Atom, AtomCache, get_text, intern_text, text_count};
