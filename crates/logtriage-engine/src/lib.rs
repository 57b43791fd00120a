pub mod rank;
pub mod summary;

pub use rank::rank;
pub use summary::render_selection_list;
