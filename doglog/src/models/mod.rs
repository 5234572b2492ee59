pub mod date;
pub mod duration;
pub mod path;

pub use date::parse_date;
pub use duration::range_to_seconds;
pub use path::expand_path;
