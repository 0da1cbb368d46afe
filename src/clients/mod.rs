pub mod calculator_client;

pub use calculator_client::CalculatorClient;
