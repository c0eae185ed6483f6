//! Integration tests for poly-arb

mod config_test;
mod feed_test;
mod pipeline_test;
