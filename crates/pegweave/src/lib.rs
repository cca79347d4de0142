//! A recursive-descent PEG matching engine.
//!
//! `pegweave` interprets a (possibly cyclic) graph of [matcher::Matcher]
//! values against an [location::InputBuffer], building a parse tree while
//! supporting semantic actions, syntactic predicates, and enforced error
//! recovery. There is no grammar-definition DSL: grammars are assembled
//! directly as Rust values, the way a `parboiled`-style library exposes
//! `Rule`-returning methods, using the constructors in [matcher::build].
//!
//! # Getting started
//!
//! ```
//! use pegweave::location::StrBuffer;
//! use pegweave::matcher::build::{one_or_more, char_range};
//! use pegweave::parser::Parser;
//!
//! let digits = one_or_more(char_range('0', '9'));
//! let buffer = StrBuffer::new("42");
//! let run = Parser::new(&buffer).parse(digits).unwrap();
//!
//! assert!(run.matched);
//! assert!(run.fully_consumed);
//! ```
//!
//! # Layout
//!
//! - [location] — the input buffer and cursor.
//! - [char_class] — character sets used by starter/follower computation.
//! - [matcher] — the `Matcher` trait and the built-in variants.
//! - [context] — the per-invocation frame every matcher runs against.
//! - [follower] — the follower-set walk used during recovery.
//! - [recovery] — the `ErrorHandler` contract and the shipped `Recovery`.
//! - [tree] — the parse tree produced by a successful parse.
//! - [error] — `ParseError` (recoverable) and `ParseFault` (fatal).
//! - [parser] — the `Parser`/`ParseRun` entry point.
//! - [diagnostics] — rendering a `ParseError` for a terminal.

mod driver;

pub mod char_class;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod follower;
pub mod location;
pub mod matcher;
pub mod parser;
pub mod recovery;
pub mod tree;

pub use context::MatcherContext;
pub use error::{ParseError, ParseFault};
pub use matcher::Matcher;
pub use parser::{ParseRun, Parser};
pub use tree::ParseNode;
