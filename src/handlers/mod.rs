pub mod analyzer;

pub use analyzer::AnalyzerGateway;
