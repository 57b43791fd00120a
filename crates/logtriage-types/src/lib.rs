pub mod coordinate;
pub mod criteria;
pub mod record;

pub use coordinate::CodeCoordinate;
pub use criteria::{FilterCriteria, normalize_environment};
pub use record::LogRecord;
