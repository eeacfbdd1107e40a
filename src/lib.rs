//! Front-end resolver for keyword-driven test data.
//!
//! This library turns test case files and suite directories into a tree of
//! suites, tests and user keywords. It also provides the argument validation
//! and run-keyword registration used when keyword calls are bound.
//!
//! ```rust,no_run
//! use kwresolve::builder::SuiteBuilder;
//! use kwresolve::raw::TsvReader;
//! use kwresolve::syslog::TracingSink;
//!
//! let mut sink = TracingSink;
//! let mut suite = SuiteBuilder::new(&TsvReader, &mut sink)
//!     .resolve(&["acceptance"], &[])
//!     .expect("suite");
//! suite.set_names(None);
//! println!("{} tests", suite.test_count());
//! ```

pub mod arguments;
pub mod builder;
pub mod check;
pub mod cli;
pub mod error;
pub mod metadata;
pub mod model;
pub mod names;
pub mod raw;
pub mod run_keywords;
pub mod runner;
pub mod syslog;
