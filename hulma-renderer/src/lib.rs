//! # hulma-renderer
//!
//! Evaluates hulma template trees against JSON data, writing output to a
//! [`Renderer`] sink.
//!
//! ## Usage
//!
//! ```rust
//! use hulma_renderer::Engine;
//! use serde_json::{json, Map, Value};
//!
//! let mut engine = Engine::new();
//! engine.register_filter("upper", |v: Value| {
//!     Ok(Value::String(v.as_str().unwrap_or_default().to_uppercase()))
//! });
//! engine.add_source("hello", "Hello {{ name|upper }}!").unwrap();
//!
//! let mut data = Map::new();
//! data.insert("name".into(), json!("world"));
//! assert_eq!(engine.render("hello", &data).unwrap(), "Hello WORLD!");
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod interpreter;
pub mod registry;
pub mod sink;
pub mod store;

pub use context::RenderContext;
pub use engine::{Engine, EngineConfig};
pub use error::{ErrorKind, RenderError};
pub use registry::{Arguments, CallbackError, CallbackResult, Filter, Function, Registry};
pub use sink::{stringify, Renderer, StringRenderer, WriterRenderer};
pub use store::{TemplateStore, DEFAULT_MAX_INCLUDE_DEPTH};
