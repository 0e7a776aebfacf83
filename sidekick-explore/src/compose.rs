//! Service-name extraction from compose/orchestration files.

/// Extract service names from a compose file by line-anchored matching.
///
/// No YAML parser: keys indented by exactly two spaces directly under the
/// top-level `services:` block are taken as service names. Keys under the
/// other top-level blocks (`version`, `volumes`, `networks`, …) are
/// ignored.
#[must_use]
pub fn extract_services(text: &str) -> Vec<String> {
    let mut services = Vec::new();
    let mut in_services = false;

    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() || trimmed.trim_start().starts_with('#') {
            continue;
        }

        // Top-level key: no indentation at all.
        if !trimmed.starts_with(' ') {
            in_services = trimmed == "services:";
            continue;
        }

        if !in_services {
            continue;
        }

        // Service key: exactly two spaces of indentation, `name:` shape.
        if let Some(rest) = trimmed.strip_prefix("  ")
            && !rest.starts_with(' ')
            && !rest.starts_with('-')
            && let Some(name) = rest.strip_suffix(':')
            && !name.is_empty()
            && !name.contains(' ')
        {
            services.push(name.to_string());
        }
    }
    services
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPOSE: &str = "\
version: '3.8'

services:
  web:
    image: nginx
    ports:
      - 8080:80
  api:
    build: .
    environment:
      DEBUG: 'true'
  worker:
    image: worker:latest

volumes:
  data:

networks:
  backend:
";

    #[test]
    fn extracts_service_names_only() {
        assert_eq!(extract_services(COMPOSE), vec!["web", "api", "worker"]);
    }

    #[test]
    fn deeper_keys_are_not_services() {
        // `ports`/`environment` are nested four spaces and must not appear.
        let services = extract_services(COMPOSE);
        assert!(!services.contains(&"ports".to_string()));
        assert!(!services.contains(&"environment".to_string()));
    }

    #[test]
    fn no_services_block_means_no_services() {
        assert!(extract_services("volumes:\n  data:\n").is_empty());
    }
}
