pub mod chain;
pub mod history;
pub mod operator;
pub mod wire;

pub use chain::{Chain, ChainStep};
pub use history::{History, HistoryEntry};
pub use operator::Operator;
pub use wire::Calculation;
