//! Capability predicates and system-prompt synthesis.
//!
//! The prompt never asserts a capability that is not genuinely callable:
//! configuration intent ([`Capabilities`]) and actual connection state
//! ([`ToolAvailability`]) must both hold for a section to appear. This is
//! the guard against the claimed-but-never-connected bug class.

use crate::config::{ATLASSIAN_SERVER, OCI_SERVER};

/// What the configuration snapshot requested and plausibly supports.
/// Derived once at agent construction; see
/// [`AgentConfig::capabilities`](crate::config::AgentConfig::capabilities).
#[derive(Debug, Clone)]
pub struct Capabilities {
    /// At least one allow-listed repository root is configured.
    pub filesystem: bool,
    /// Jira/Confluence requested with a full credential set.
    pub atlassian: bool,
    /// OCI requested with region/compartment/tenancy present.
    pub oci: bool,
    /// Names of enabled user-defined servers.
    pub custom_servers: Vec<String>,
}

/// What actually connected and registered, captured per turn.
#[derive(Debug, Clone, Default)]
pub struct ToolAvailability {
    /// Registered filesystem tool names.
    pub filesystem_tools: Vec<String>,
    /// Registered exploration tool names.
    pub exploration_tools: Vec<String>,
    /// Connected MCP servers with their discovered tool names, in start
    /// order.
    pub mcp_servers: Vec<(String, Vec<String>)>,
}

impl ToolAvailability {
    fn server_tools(&self, name: &str) -> Option<&[String]> {
        self.mcp_servers
            .iter()
            .find(|(server, _)| server == name)
            .map(|(_, tools)| tools.as_slice())
    }
}

/// Base persona and working guidelines, independent of capabilities.
const PERSONA: &str = "You are an AI assistant helping engineers work with their project \
tools: issue trackers, documentation, cloud infrastructure, and local code repositories.\n\
\n\
Guidelines:\n\
- Use the available tools to answer from real data instead of guessing.\n\
- Reference ticket keys, page titles, and file paths explicitly.\n\
- Keep answers concise and actionable; summarize long tool output.\n";

/// Build the dynamic system prompt from the capability predicates and the
/// per-turn availability snapshot.
///
/// Pure function: no side effects, deterministic for a given input. Each
/// capability section lists the *actually discovered* tool names. When no
/// group qualifies, the prompt states explicitly that no tools are
/// configured.
#[must_use]
pub fn build_system_prompt(
    capabilities: &Capabilities,
    availability: &ToolAvailability,
    skills: Option<&str>,
) -> String {
    let mut prompt = String::from(PERSONA);
    let mut any_section = false;

    if capabilities.filesystem && !availability.filesystem_tools.is_empty() {
        any_section = true;
        prompt.push_str(&format!(
            "\n## Code Repository Access\nRead-only access to the allow-listed repositories.\n\
             Tools: {}\n",
            availability.filesystem_tools.join(", ")
        ));
        if !availability.exploration_tools.is_empty() {
            prompt.push_str(&format!(
                "For \"what is this project\" questions, start with project_overview; use \
                 find_relevant_files to locate code for a specific question.\n\
                 Tools: {}\n",
                availability.exploration_tools.join(", ")
            ));
        }
    }

    if capabilities.atlassian
        && let Some(tools) = availability.server_tools(ATLASSIAN_SERVER)
        && !tools.is_empty()
    {
        any_section = true;
        prompt.push_str(&format!(
            "\n## Jira & Confluence Capabilities\nSearch and update tickets, read and write \
             documentation pages.\nTools: {}\n",
            tools.join(", ")
        ));
    }

    if capabilities.oci
        && let Some(tools) = availability.server_tools(OCI_SERVER)
        && !tools.is_empty()
    {
        any_section = true;
        prompt.push_str(&format!(
            "\n## Oracle Cloud Infrastructure Capabilities\nInspect compute, networking, and \
             storage resources in the configured compartment.\nTools: {}\n",
            tools.join(", ")
        ));
    }

    for (server, tools) in &availability.mcp_servers {
        if server == ATLASSIAN_SERVER || server == OCI_SERVER || tools.is_empty() {
            continue;
        }
        if capabilities.custom_servers.iter().any(|name| name == server) {
            any_section = true;
            prompt.push_str(&format!(
                "\n## {server} Capabilities\nTools: {}\n",
                tools.join(", ")
            ));
        }
    }

    if !any_section {
        prompt.push_str(
            "\nNo tools are currently configured. Answer from general knowledge and say so \
             when a task would need live data.\n",
        );
    }

    if let Some(skills) = skills
        && !skills.is_empty()
    {
        prompt.push_str("\n## Workflow Knowledge\n");
        prompt.push_str(skills);
        prompt.push('\n');
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_requested() -> Capabilities {
        Capabilities {
            filesystem: true,
            atlassian: true,
            oci: true,
            custom_servers: vec!["weather".into()],
        }
    }

    #[test]
    fn requested_but_unconnected_groups_are_omitted() {
        // Atlassian requested, but the server never connected.
        let availability = ToolAvailability {
            filesystem_tools: vec!["read_file".into()],
            exploration_tools: vec![],
            mcp_servers: vec![],
        };
        let prompt = build_system_prompt(&all_requested(), &availability, None);
        assert!(!prompt.contains("Jira"));
        assert!(!prompt.contains("Oracle Cloud"));
        assert!(prompt.contains("Code Repository Access"));
    }

    #[test]
    fn connected_but_unrequested_servers_are_omitted() {
        let capabilities = Capabilities {
            filesystem: false,
            atlassian: false,
            oci: false,
            custom_servers: vec![],
        };
        let availability = ToolAvailability {
            filesystem_tools: vec![],
            exploration_tools: vec![],
            mcp_servers: vec![("atlassian".into(), vec!["jira_search".into()])],
        };
        let prompt = build_system_prompt(&capabilities, &availability, None);
        assert!(!prompt.contains("Jira"));
        assert!(prompt.contains("No tools are currently configured"));
    }

    #[test]
    fn sections_list_discovered_tool_names() {
        let availability = ToolAvailability {
            filesystem_tools: vec!["read_file".into(), "search_files".into()],
            exploration_tools: vec!["project_overview".into()],
            mcp_servers: vec![
                ("atlassian".into(), vec!["jira_search".into(), "confluence_read".into()]),
                ("weather".into(), vec!["forecast".into()]),
            ],
        };
        let prompt = build_system_prompt(&all_requested(), &availability, None);
        assert!(prompt.contains("jira_search, confluence_read"));
        assert!(prompt.contains("read_file, search_files"));
        assert!(prompt.contains("## weather Capabilities"));
        assert!(prompt.contains("forecast"));
    }

    #[test]
    fn empty_everything_states_no_tools() {
        let capabilities = Capabilities {
            filesystem: false,
            atlassian: false,
            oci: false,
            custom_servers: vec![],
        };
        let prompt = build_system_prompt(&capabilities, &ToolAvailability::default(), None);
        assert!(prompt.contains("No tools are currently configured"));
    }

    #[test]
    fn skills_text_is_appended_verbatim() {
        let capabilities = Capabilities {
            filesystem: false,
            atlassian: false,
            oci: false,
            custom_servers: vec![],
        };
        let prompt = build_system_prompt(
            &capabilities,
            &ToolAvailability::default(),
            Some("Always link tickets."),
        );
        assert!(prompt.contains("## Workflow Knowledge"));
        assert!(prompt.contains("Always link tickets."));
    }
}
