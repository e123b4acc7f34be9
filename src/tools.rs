//! # Tool registry
//!
//! Runs ask the client to execute functions by name, passing arguments as JSON
//! text and expecting JSON text back. This module stores typed Rust handlers
//! behind a uniform, type-erased adapter:
//!
//! ```text
//! register(name, Fn(Input) -> Future<Result<Output, E>>)
//!     │
//!     ▼
//! ToolAdapter: Fn(String) -> Future<Result<Option<String>>>
//!     1. decode the argument text into Input      (Error::Decode on failure)
//!     2. await the handler                        (Error::Tool on failure)
//!     3. encode Output as JSON text, or None for unit handlers
//! ```
//!
//! `register_raw` skips step 1 and hands the handler a [`CallArgument`] holding
//! the argument text exactly as the run sent it.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use assistant_runs::ToolRegistry;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct WeatherQuery {
//!     city: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Weather {
//!     #[serde(rename = "tempC")]
//!     temp_c: f64,
//! }
//!
//! let registry = ToolRegistry::new();
//! registry.register("getWeather", |query: WeatherQuery| async move {
//!     let temp_c = if query.city == "Zurich" { 21.5 } else { 15.0 };
//!     Ok::<_, std::io::Error>(Weather { temp_c })
//! });
//! ```
//!
//! ## Concurrency
//!
//! The table sits behind an `RwLock`. Lookups clone the adapter's `Arc` and
//! release the lock before invoking it, so handlers never run under the lock.
//! Re-registering a name replaces the entry for later lookups; an invocation
//! already in flight finishes with the adapter it looked up.

use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};

/// Boxed error accepted from handlers
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Type-erased tool adapter.
///
/// ```text
/// Arc<                                                  // shared by concurrent runs
///   dyn Fn(String)                                      // raw argument text
///     -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send>>
///     + Send + Sync>
/// ```
///
/// `Ok(None)` means the handler produces no value.
pub type ToolAdapter = Arc<dyn Fn(String) -> ToolFuture + Send + Sync>;

/// Future returned by a [`ToolAdapter`]
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<Option<String>>> + Send>>;

/// Raw argument text of a tool call.
///
/// Handlers registered with [`ToolRegistry::register_raw`] receive the text
/// untouched (key order, number formatting and blank input included) and pick
/// the target type themselves.
///
/// ```rust
/// use assistant_runs::CallArgument;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Query {
///     city: String,
/// }
///
/// let argument = CallArgument::new(r#"{"city":"Zurich"}"#);
/// let query: Query = argument.decoded()?;
/// assert_eq!(query.city, "Zurich");
/// # Ok::<(), assistant_runs::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArgument {
    input: String,
}

impl CallArgument {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.input
    }

    /// Decodes the argument text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] on malformed JSON or a type mismatch.
    pub fn decoded<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.input)?)
    }
}

/// Table of tool handlers keyed by function name
#[derive(Default)]
pub struct ToolRegistry {
    handlers: RwLock<HashMap<String, ToolAdapter>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler whose output is sent back as JSON text.
    ///
    /// Replaces any handler previously registered under `name`.
    pub fn register<I, O, E, F, Fut>(&self, name: impl Into<String>, handler: F)
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<O, E>> + Send + 'static,
    {
        let name = name.into();
        let handler = Arc::new(handler);
        let tool_name = name.clone();

        let adapter: ToolAdapter = Arc::new(move |arguments: String| -> ToolFuture {
            let handler = Arc::clone(&handler);
            let tool_name = tool_name.clone();
            Box::pin(async move {
                let input: I = decode_arguments(&tool_name, &arguments)?;
                let output = handler(input).await.map_err(handler_error)?;
                Ok(Some(serde_json::to_string(&output)?))
            })
        });

        self.register_adapter(name, adapter);
    }

    /// Registers a handler that produces no value; its output text is empty.
    ///
    /// Replaces any handler previously registered under `name`.
    pub fn register_unit<I, E, F, Fut>(&self, name: impl Into<String>, handler: F)
    where
        I: DeserializeOwned + Send + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), E>> + Send + 'static,
    {
        let name = name.into();
        let handler = Arc::new(handler);
        let tool_name = name.clone();

        let adapter: ToolAdapter = Arc::new(move |arguments: String| -> ToolFuture {
            let handler = Arc::clone(&handler);
            let tool_name = tool_name.clone();
            Box::pin(async move {
                let input: I = decode_arguments(&tool_name, &arguments)?;
                handler(input).await.map_err(handler_error)?;
                Ok(None)
            })
        });

        self.register_adapter(name, adapter);
    }

    /// Registers a handler that receives the argument text undecoded.
    ///
    /// Its output is sent back as JSON text. Replaces any handler previously
    /// registered under `name`.
    pub fn register_raw<O, E, F, Fut>(&self, name: impl Into<String>, handler: F)
    where
        O: Serialize + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(CallArgument) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<O, E>> + Send + 'static,
    {
        let handler = Arc::new(handler);

        let adapter: ToolAdapter = Arc::new(move |arguments: String| -> ToolFuture {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let output = handler(CallArgument::new(arguments))
                    .await
                    .map_err(handler_error)?;
                Ok(Some(serde_json::to_string(&output)?))
            })
        });

        self.register_adapter(name, adapter);
    }

    /// Registers a pre-built adapter.
    pub fn register_adapter(&self, name: impl Into<String>, adapter: ToolAdapter) {
        let name = name.into();
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if handlers.insert(name.clone(), adapter).is_some() {
            log::debug!("Replaced handler for tool '{}'", name);
        }
    }

    /// Looks up the adapter registered under `name`.
    pub fn get(&self, name: &str) -> Option<ToolAdapter> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invokes the tool registered under `name` with raw argument text.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolNotFound`] if nothing is registered under `name`
    /// - [`Error::Decode`] if the arguments do not decode into the handler's input
    /// - [`Error::Tool`] if the handler fails
    pub async fn invoke(&self, name: &str, arguments: &str) -> Result<Option<String>> {
        let adapter = self.get(name).ok_or_else(|| Error::tool_not_found(name))?;
        adapter(arguments.to_string()).await
    }
}

/// Decodes argument text; blank text is treated as an empty object.
fn decode_arguments<I: DeserializeOwned>(tool_name: &str, arguments: &str) -> Result<I> {
    let text = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };

    serde_json::from_str(text)
        .map_err(|e| Error::decode(format!("invalid arguments for tool '{}': {}", tool_name, e)))
}

fn handler_error<E: Into<BoxError>>(error: E) -> Error {
    Error::tool(error.into().to_string())
}
