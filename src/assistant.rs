//! Assistant handle: remote identity, shared transport and tool registry.

use crate::config::ClientOptions;
use crate::thread::Thread;
use crate::tools::{BoxError, CallArgument, ToolRegistry};
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;

/// A remote assistant plus the tools it may call locally.
///
/// Cloning is cheap and clones share the same transport and registry, so a tool
/// registered through any clone is visible to every thread and run created from
/// any other.
///
/// # Examples
///
/// ```rust,no_run
/// use assistant_runs::{Assistant, ClientOptions, ContentPayload};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize)]
/// struct Query {
///     city: String,
/// }
///
/// #[derive(Serialize)]
/// struct Weather {
///     #[serde(rename = "tempC")]
///     temp_c: f64,
/// }
///
/// # async fn example() -> assistant_runs::Result<()> {
/// let assistant = Assistant::connect("asst_123", ClientOptions::from_env().build()?)?;
/// assistant.set_tool("getWeather", |query: Query| async move {
///     Ok::<_, std::io::Error>(Weather { temp_c: if query.city == "Zurich" { 21.5 } else { 15.0 } })
/// });
///
/// let thread = assistant.create_thread().await?;
/// thread.add_message([ContentPayload::text("How warm is it in Zurich?")]).await?;
///
/// for message in thread.run(None).await? {
///     println!("{}", message.text());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Assistant {
    id: String,
    transport: Arc<dyn Transport>,
    tools: Arc<ToolRegistry>,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("id", &self.id)
            .field("tools", &self.tools)
            .finish()
    }
}

impl Assistant {
    /// Creates an assistant backed by any transport.
    pub fn new(id: impl Into<String>, transport: impl Transport + 'static) -> Self {
        Self::with_transport(id, Arc::new(transport))
    }

    /// Creates an assistant sharing an existing transport handle.
    pub fn with_transport(id: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            id: id.into(),
            transport,
            tools: Arc::new(ToolRegistry::new()),
        }
    }

    /// Creates an assistant talking HTTP with the given options.
    pub fn connect(id: impl Into<String>, options: ClientOptions) -> Result<Self> {
        Ok(Self::new(id, HttpTransport::new(options)?))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Registers a tool whose result is returned to the run as JSON text.
    ///
    /// Registering an existing name replaces the previous handler.
    pub fn set_tool<I, O, E, F, Fut>(&self, name: impl Into<String>, handler: F)
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<O, E>> + Send + 'static,
    {
        self.tools.register(name, handler);
    }

    /// Registers a tool that produces no value; the run receives an empty output.
    pub fn set_unit_tool<I, E, F, Fut>(&self, name: impl Into<String>, handler: F)
    where
        I: DeserializeOwned + Send + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), E>> + Send + 'static,
    {
        self.tools.register_unit(name, handler);
    }

    /// Registers a tool that receives the argument text exactly as the run sent it.
    pub fn set_raw_tool<O, E, F, Fut>(&self, name: impl Into<String>, handler: F)
    where
        O: Serialize + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(CallArgument) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<O, E>> + Send + 'static,
    {
        self.tools.register_raw(name, handler);
    }

    /// Creates a remote thread bound to this assistant.
    ///
    /// # Errors
    ///
    /// Transport failures are returned as-is; nothing is retried.
    pub async fn create_thread(&self) -> Result<Thread> {
        let raw = self.transport.create_thread().await?;
        log::debug!("Created thread {} for assistant {}", raw.id, self.id);
        Ok(Thread::new(raw.id, self.clone()))
    }

    /// Binds an existing remote thread id without issuing a request.
    pub fn thread(&self, id: impl Into<String>) -> Thread {
        Thread::new(id.into(), self.clone())
    }
}
