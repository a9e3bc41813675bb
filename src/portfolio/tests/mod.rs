pub(crate) mod support;

mod performance_tests;
