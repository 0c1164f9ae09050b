mod adapter_tests;
mod common;
