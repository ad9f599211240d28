pub mod catalog;
pub mod clock;
pub mod extra_cache;
pub mod providers;
pub mod selection;

pub use catalog::{CatalogProvider, StaticCatalog};
pub use clock::{Clock, ManualClock, SystemClock};
pub use extra_cache::ExtraContentCache;
pub use selection::{SelectionController, SelectionSettings};
