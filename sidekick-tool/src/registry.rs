//! Tool registry: register, lookup, and execute tools.

use std::collections::HashMap;
use std::sync::Arc;

use sidekick_types::{Tool, ToolContext, ToolDefinition, ToolDyn, ToolError, ToolOutput};

/// Registry of tools keyed by unique name.
///
/// Tools are stored as type-erased [`ToolDyn`] trait objects. Registration
/// order is preserved so [`definitions`](ToolRegistry::definitions) is
/// deterministic across calls.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolDyn>>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a strongly-typed tool (auto-erased to `ToolDyn`).
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateName`] when a tool with the same name
    /// is already registered. The first registrant stays in place.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<(), ToolError> {
        self.register_dyn(Arc::new(tool))
    }

    /// Register a pre-erased tool.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateName`] when a tool with the same name
    /// is already registered. The first registrant stays in place.
    pub fn register_dyn(&mut self, tool: Arc<dyn ToolDyn>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::DuplicateName(name));
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolDyn>> {
        self.tools.get(name).cloned()
    }

    /// Whether a tool with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Definitions for all registered tools, in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.definition())
            .collect()
    }

    /// Whether the registry has no tools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NotFound`] for an unregistered name, or the
    /// tool's own error on failure.
    pub async fn execute(
        &self,
        name: &str,
        input: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        tracing::debug!(tool = name, "executing tool");
        tool.call_dyn(input, ctx).await
    }
}
