pub mod logging;

pub use logging::format_number;
