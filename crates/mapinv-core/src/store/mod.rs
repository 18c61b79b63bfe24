mod catalogue;
mod collection;

pub use catalogue::Catalogue;
pub use collection::Collection;
