pub mod request_state;
pub mod session;

pub use request_state::RequestState;
pub use session::CalculatorSession;
