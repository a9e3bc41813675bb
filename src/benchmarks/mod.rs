pub mod benchmarks_model;
pub mod benchmarks_repository;

pub use benchmarks_model::{BenchmarkInfo, BenchmarkQuote};
pub use benchmarks_repository::{BenchmarkRepository, BenchmarkRepositoryTrait};

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Benchmark registry.
    /// TOPIX maps to the Nikkei 225 series: the TOPIX feed is unavailable
    /// from the quote source this engine is paired with.
    pub static ref BENCHMARKS: HashMap<&'static str, BenchmarkInfo> = {
        let mut m = HashMap::new();
        m.insert(
            "N225",
            BenchmarkInfo {
                key: "N225",
                symbol: "^N225",
                name: "Nikkei 225",
                currency: "JPY",
            },
        );
        m.insert(
            "TOPIX",
            BenchmarkInfo {
                key: "TOPIX",
                symbol: "^N225",
                name: "Nikkei 225",
                currency: "JPY",
            },
        );
        m.insert(
            "SP500",
            BenchmarkInfo {
                key: "SP500",
                symbol: "^GSPC",
                name: "S&P 500",
                currency: "USD",
            },
        );
        m
    };
}

pub fn lookup(benchmark_key: &str) -> Option<&'static BenchmarkInfo> {
    BENCHMARKS.get(benchmark_key)
}
