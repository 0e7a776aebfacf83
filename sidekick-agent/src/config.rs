//! The immutable per-session configuration snapshot.

use std::path::PathBuf;

use sidekick_mcp::McpServerConfig;
use sidekick_types::ConfigError;

use crate::capabilities::Capabilities;

/// Name of the synthesized Jira/Confluence bridge server.
pub const ATLASSIAN_SERVER: &str = "atlassian";
/// Name of the synthesized OCI bridge server.
pub const OCI_SERVER: &str = "oci";

/// Everything the agent needs for one session, created once at session
/// start and read-only thereafter. Settings changes produce a new
/// snapshot and a new agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model provider name; only `claude` is currently supported.
    pub model_provider: String,
    /// Model override; empty means the provider default.
    pub model_name: Option<String>,
    /// Anthropic API key.
    pub anthropic_api_key: String,

    /// Whether Jira/Confluence tools were requested.
    pub atlassian_enabled: bool,
    /// Jira base URL.
    pub jira_url: String,
    /// Jira account name.
    pub jira_username: String,
    /// Jira API token.
    pub jira_api_token: String,
    /// Confluence base URL.
    pub confluence_url: String,
    /// Confluence account name.
    pub confluence_username: String,
    /// Confluence API token.
    pub confluence_api_token: String,

    /// Whether OCI tools were requested.
    pub oci_enabled: bool,
    /// OCI region identifier.
    pub oci_region: String,
    /// OCI compartment OCID.
    pub oci_compartment_id: String,
    /// OCI tenancy OCID.
    pub oci_tenancy_id: String,

    /// Allow-listed code repository roots.
    pub code_repository_paths: Vec<PathBuf>,
    /// User-defined MCP servers.
    pub custom_servers: Vec<McpServerConfig>,

    /// Command line spawning the Atlassian bridge process.
    pub atlassian_mcp_command: String,
    /// Command line spawning the OCI bridge process.
    pub oci_mcp_command: String,

    /// Directory of skill markdown files appended to the system prompt.
    pub skills_dir: Option<PathBuf>,
    /// Whether skills are loaded at all.
    pub skills_enabled: bool,

    /// Sliding-window cap on conversation history length.
    pub max_history_messages: usize,
    /// Hard bound on oracle/tool iterations per user message.
    pub max_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model_provider: "claude".into(),
            model_name: None,
            anthropic_api_key: String::new(),
            atlassian_enabled: false,
            jira_url: String::new(),
            jira_username: String::new(),
            jira_api_token: String::new(),
            confluence_url: String::new(),
            confluence_username: String::new(),
            confluence_api_token: String::new(),
            oci_enabled: false,
            oci_region: String::new(),
            oci_compartment_id: String::new(),
            oci_tenancy_id: String::new(),
            code_repository_paths: Vec::new(),
            custom_servers: Vec::new(),
            atlassian_mcp_command: "sidekick-atlassian-mcp".into(),
            oci_mcp_command: "sidekick-oci-mcp".into(),
            skills_dir: None,
            skills_enabled: true,
            max_history_messages: 40,
            max_iterations: 10,
        }
    }
}

impl AgentConfig {
    /// Build a snapshot from environment variables (the same names the
    /// original `.env` layout uses), leaving defaults elsewhere.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        let flag = |name: &str| matches!(var(name).to_lowercase().as_str(), "1" | "true" | "yes");

        let mut config = Self {
            model_provider: {
                let provider = var("MODEL_PROVIDER");
                if provider.is_empty() { "claude".into() } else { provider }
            },
            model_name: std::env::var("MODEL_NAME").ok().filter(|name| !name.is_empty()),
            anthropic_api_key: var("ANTHROPIC_API_KEY"),
            atlassian_enabled: flag("ATLASSIAN_ENABLED"),
            jira_url: var("JIRA_URL"),
            jira_username: var("JIRA_USERNAME"),
            jira_api_token: var("JIRA_API_TOKEN"),
            confluence_url: var("CONFLUENCE_URL"),
            confluence_username: var("CONFLUENCE_USERNAME"),
            confluence_api_token: var("CONFLUENCE_API_TOKEN"),
            oci_enabled: flag("OCI_ENABLED"),
            oci_region: var("OCI_REGION"),
            oci_compartment_id: var("OCI_COMPARTMENT_ID"),
            oci_tenancy_id: var("OCI_TENANCY_ID"),
            code_repository_paths: parse_path_list(&var("CODE_REPOSITORY_PATHS")),
            skills_dir: std::env::var("SKILLS_DIR").ok().filter(|d| !d.is_empty()).map(PathBuf::from),
            ..Self::default()
        };

        if let Ok(command) = std::env::var("ATLASSIAN_MCP_COMMAND")
            && !command.is_empty()
        {
            config.atlassian_mcp_command = command;
        }
        if let Ok(command) = std::env::var("OCI_MCP_COMMAND")
            && !command.is_empty()
        {
            config.oci_mcp_command = command;
        }
        if let Ok(raw) = std::env::var("CUSTOM_MCP_SERVERS")
            && !raw.is_empty()
        {
            match serde_json::from_str::<Vec<McpServerConfig>>(&raw) {
                Ok(servers) => config.custom_servers = servers,
                Err(e) => tracing::warn!(error = %e, "CUSTOM_MCP_SERVERS did not parse; ignoring"),
            }
        }
        config
    }

    /// Check that the oracle itself can be constructed. A failure here is
    /// fatal to the whole session, unlike per-capability problems.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProvider`] for an unsupported
    /// provider name and [`ConfigError::Missing`] for an absent API key.
    pub fn provider_ready(&self) -> Result<(), ConfigError> {
        match self.model_provider.to_lowercase().as_str() {
            "claude" => {
                if self.anthropic_api_key.is_empty() {
                    Err(ConfigError::Missing("ANTHROPIC_API_KEY".into()))
                } else {
                    Ok(())
                }
            }
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }

    /// All configuration problems worth reporting. Per-capability issues
    /// are warnings — the capability stays off, the session still runs.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Err(e) = self.provider_ready() {
            errors.push(e);
        }
        if self.atlassian_enabled {
            for (field, value) in [
                ("JIRA_URL", &self.jira_url),
                ("JIRA_USERNAME", &self.jira_username),
                ("JIRA_API_TOKEN", &self.jira_api_token),
                ("CONFLUENCE_URL", &self.confluence_url),
                ("CONFLUENCE_USERNAME", &self.confluence_username),
                ("CONFLUENCE_API_TOKEN", &self.confluence_api_token),
            ] {
                if value.is_empty() {
                    errors.push(ConfigError::Missing(field.into()));
                }
            }
        }
        if self.oci_enabled {
            for (field, value) in [
                ("OCI_REGION", &self.oci_region),
                ("OCI_COMPARTMENT_ID", &self.oci_compartment_id),
                ("OCI_TENANCY_ID", &self.oci_tenancy_id),
            ] {
                if value.is_empty() {
                    errors.push(ConfigError::Missing(field.into()));
                }
            }
        }
        errors
    }

    /// Derive the requested-and-plausibly-usable capability predicates.
    /// Computed once at agent construction — the single source of truth,
    /// never re-derived from scattered flag checks.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            filesystem: !self.code_repository_paths.is_empty(),
            atlassian: self.atlassian_enabled
                && !self.jira_url.is_empty()
                && !self.jira_username.is_empty()
                && !self.jira_api_token.is_empty()
                && !self.confluence_url.is_empty()
                && !self.confluence_username.is_empty()
                && !self.confluence_api_token.is_empty(),
            oci: self.oci_enabled
                && !self.oci_region.is_empty()
                && !self.oci_compartment_id.is_empty()
                && !self.oci_tenancy_id.is_empty(),
            custom_servers: self
                .custom_servers
                .iter()
                .filter(|server| server.enabled)
                .map(|server| server.name.clone())
                .collect(),
        }
    }

    /// Synthesize the MCP server descriptors this snapshot calls for:
    /// the Atlassian and OCI bridges (credentials travel as child-process
    /// environment variables) plus the user-defined servers.
    #[must_use]
    pub fn mcp_server_configs(&self) -> Vec<McpServerConfig> {
        let capabilities = self.capabilities();
        let mut servers = Vec::new();

        if capabilities.atlassian {
            let (command, args) = split_command(&self.atlassian_mcp_command);
            let mut server = McpServerConfig::new(ATLASSIAN_SERVER, command);
            server.args = args;
            servers.push(
                server
                    .env_var("JIRA_URL", &self.jira_url)
                    .env_var("JIRA_USERNAME", &self.jira_username)
                    .env_var("JIRA_API_TOKEN", &self.jira_api_token)
                    .env_var("CONFLUENCE_URL", &self.confluence_url)
                    .env_var("CONFLUENCE_USERNAME", &self.confluence_username)
                    .env_var("CONFLUENCE_API_TOKEN", &self.confluence_api_token),
            );
        }
        if capabilities.oci {
            let (command, args) = split_command(&self.oci_mcp_command);
            let mut server = McpServerConfig::new(OCI_SERVER, command);
            server.args = args;
            servers.push(
                server
                    .env_var("OCI_REGION", &self.oci_region)
                    .env_var("OCI_COMPARTMENT_ID", &self.oci_compartment_id)
                    .env_var("OCI_TENANCY_ID", &self.oci_tenancy_id),
            );
        }
        servers.extend(self.custom_servers.iter().cloned());
        servers
    }
}

/// Parse a colon-delimited path list, dropping empty segments.
fn parse_path_list(raw: &str) -> Vec<PathBuf> {
    raw.split(':')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Split a command line into executable and arguments.
fn split_command(raw: &str) -> (String, Vec<String>) {
    let mut parts = raw.split_whitespace().map(str::to_string);
    let command = parts.next().unwrap_or_default();
    (command, parts.collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atlassian_config() -> AgentConfig {
        AgentConfig {
            atlassian_enabled: true,
            jira_url: "https://jira.example.com".into(),
            jira_username: "dev".into(),
            jira_api_token: "token".into(),
            confluence_url: "https://wiki.example.com".into(),
            confluence_username: "dev".into(),
            confluence_api_token: "token".into(),
            anthropic_api_key: "sk-ant-test".into(),
            ..AgentConfig::default()
        }
    }

    #[test]
    fn colon_delimited_paths_parse() {
        let paths = parse_path_list("/a/repo:/b/repo::");
        assert_eq!(paths, vec![PathBuf::from("/a/repo"), PathBuf::from("/b/repo")]);
    }

    #[test]
    fn enabled_capability_with_missing_credentials_is_reported_and_unusable() {
        let mut config = atlassian_config();
        config.jira_api_token.clear();

        assert!(!config.capabilities().atlassian);
        assert!(
            config
                .validate()
                .iter()
                .any(|e| e.to_string().contains("JIRA_API_TOKEN"))
        );
    }

    #[test]
    fn capability_predicates_follow_flags_and_credentials() {
        let config = atlassian_config();
        let capabilities = config.capabilities();
        assert!(capabilities.atlassian);
        assert!(!capabilities.oci);
        assert!(!capabilities.filesystem);
    }

    #[test]
    fn atlassian_bridge_carries_credentials_as_env() {
        let servers = atlassian_config().mcp_server_configs();
        assert_eq!(servers.len(), 1);
        let bridge = &servers[0];
        assert_eq!(bridge.name, ATLASSIAN_SERVER);
        assert_eq!(bridge.env["JIRA_URL"], "https://jira.example.com");
        assert_eq!(bridge.env["CONFLUENCE_API_TOKEN"], "token");
    }

    #[test]
    fn disabled_capability_synthesizes_no_server() {
        let config = AgentConfig {
            anthropic_api_key: "k".into(),
            ..AgentConfig::default()
        };
        assert!(config.mcp_server_configs().is_empty());
    }

    #[test]
    fn unknown_provider_is_fatal() {
        let config = AgentConfig {
            model_provider: "llamacpp".into(),
            ..AgentConfig::default()
        };
        assert!(matches!(
            config.provider_ready(),
            Err(ConfigError::UnknownProvider(_))
        ));
    }

    #[test]
    fn command_lines_split_into_program_and_args() {
        let (command, args) = split_command("python3 mcp-server/server.py --verbose");
        assert_eq!(command, "python3");
        assert_eq!(args, vec!["mcp-server/server.py", "--verbose"]);
    }
}
