pub mod card_grid;
pub mod catalog_view;
pub mod detail_overlay;
pub mod format;
pub mod search_bar;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use card_grid::{CardGrid, CardGridProps, ERROR_MARKER, IMAGE_MARKER};
pub use catalog_view::{CatalogView, CatalogViewProps};
pub use detail_overlay::{overlay_area, DetailOverlay, DetailOverlayProps};
pub use format::format_name;
pub use search_bar::{SearchBar, SearchBarProps};
