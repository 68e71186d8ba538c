//! Robots.txt rule evaluation
//!
//! Allow/deny decisions go through the robotstxt crate; crawl-delay is parsed
//! here because the matcher does not surface it.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt rules for one site
///
/// Fetched once at engine construction and read-only afterwards. Bodies that
/// are not robots.txt at all (a 404 page served with the redirect-following
/// fetcher, for instance) contain no recognizable directives and therefore
/// allow everything.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
}

impl RobotsPolicy {
    /// Creates a policy from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Returns the raw robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The full URL (or bare path) to check
    /// * `user_agent` - The user agent string
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Gets the crawl delay for a specific user agent
    ///
    /// Consecutive `User-agent` lines form one group header; any other
    /// directive closes the header, and the next `User-agent` line starts a
    /// fresh group. A group's `Crawl-delay` applies to every agent named in
    /// its header. A delay from a group naming the agent outright wins over
    /// one from a wildcard group.
    ///
    /// # Returns
    ///
    /// * `Some(f64)` - The crawl delay in seconds
    /// * `None` - If no crawl delay applies to this agent
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let mut group_agents: Vec<String> = Vec::new();
        let mut in_group_header = false;
        let mut wildcard_delay: Option<f64> = None;
        let mut agent_delay: Option<f64> = None;

        let normalized_agent = user_agent.to_lowercase();

        for line in self.content.lines() {
            let trimmed = line.trim();

            // Skip comments and empty lines
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if !in_group_header {
                        group_agents.clear();
                        in_group_header = true;
                    }
                    group_agents.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    in_group_header = false;
                    if let Ok(delay) = value.parse::<f64>() {
                        let named = group_agents
                            .iter()
                            .any(|ua| ua != "*" && normalized_agent.contains(ua.as_str()));
                        if named {
                            agent_delay = Some(delay);
                        } else if group_agents.iter().any(|ua| ua == "*") {
                            wildcard_delay = Some(delay);
                        }
                    }
                }
                _ => {
                    // Allow, Disallow, Sitemap, ... close the group header
                    in_group_header = false;
                }
            }
        }

        // Prefer the agent's own delay over the wildcard delay
        agent_delay.or(wildcard_delay)
    }
}
