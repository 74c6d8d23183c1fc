//! Credential resolution for the three agents.
//!
//! Values come from a flat key/value source (normally the process
//! environment, after `.env` has been loaded). A missing key reads as an
//! empty string, so "configured" is simply "both ids are non-empty".

use pf_protocol::{AgentCredentials, AgentKind};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

pub const REGION_KEY: &str = "AWS_DEFAULT_REGION";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Read-only key/value lookup.
pub trait CredentialSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl CredentialSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl CredentialSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// `PAYMENT_VALIDATOR_AGENT_ID` and friends.
pub fn agent_id_key(agent: AgentKind) -> String {
    format!("{}_AGENT_ID", agent.logical_name().to_uppercase())
}

pub fn alias_id_key(agent: AgentKind) -> String {
    format!("{}_AGENT_ALIAS_ID", agent.logical_name().to_uppercase())
}

/// Snapshot of every agent's credentials plus the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialResolver {
    credentials: BTreeMap<AgentKind, AgentCredentials>,
    region: String,
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self {
            credentials: BTreeMap::new(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl CredentialResolver {
    pub fn from_source<S: CredentialSource + ?Sized>(source: &S) -> Self {
        let read = |key: &str| source.get(key).unwrap_or_default();

        let credentials = AgentKind::ALL
            .iter()
            .map(|&agent| {
                let creds = AgentCredentials::new(read(&agent_id_key(agent)), read(&alias_id_key(agent)));
                (agent, creds)
            })
            .collect();

        let region = read(REGION_KEY);
        let region = if region.trim().is_empty() {
            DEFAULT_REGION.to_string()
        } else {
            region
        };

        Self { credentials, region }
    }

    pub fn from_env() -> Self {
        Self::from_source(&EnvSource)
    }

    /// Replace the region, e.g. from `.payflow/config.toml`.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Credentials for `agent`; both fields empty when unset.
    pub fn credentials_for(&self, agent: AgentKind) -> AgentCredentials {
        self.credentials.get(&agent).cloned().unwrap_or_default()
    }

    pub fn is_configured(&self, agent: AgentKind) -> bool {
        self.credentials_for(agent).is_configured()
    }

    /// Lookup by logical name; unknown names resolve to empty credentials.
    pub fn credentials_for_name(&self, name: &str) -> AgentCredentials {
        AgentKind::from_str(name)
            .map(|agent| self.credentials_for(agent))
            .unwrap_or_default()
    }

    pub fn is_configured_by_name(&self, name: &str) -> bool {
        self.credentials_for_name(name).is_configured()
    }

    pub fn configured_agents(&self) -> Vec<AgentKind> {
        AgentKind::ALL
            .into_iter()
            .filter(|agent| self.is_configured(*agent))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_key_names() {
        assert_eq!(agent_id_key(AgentKind::SanctionCheck), "SANCTION_CHECK_AGENT_ID");
        assert_eq!(
            alias_id_key(AgentKind::PaymentOrchestrator),
            "PAYMENT_ORCHESTRATOR_AGENT_ALIAS_ID"
        );
    }

    #[test]
    fn test_missing_values_are_empty() {
        let resolver = CredentialResolver::from_source(&source(&[]));

        let creds = resolver.credentials_for(AgentKind::PaymentValidator);
        assert_eq!(creds.agent_id, "");
        assert_eq!(creds.alias_id, "");
        assert!(!resolver.is_configured(AgentKind::PaymentValidator));
        assert_eq!(resolver.region(), DEFAULT_REGION);
    }

    #[test]
    fn test_configured_requires_both_ids() {
        let resolver = CredentialResolver::from_source(&source(&[
            ("PAYMENT_VALIDATOR_AGENT_ID", "VAL"),
            ("PAYMENT_VALIDATOR_AGENT_ALIAS_ID", "ALIAS"),
            ("SANCTION_CHECK_AGENT_ID", "SAN"),
            ("AWS_DEFAULT_REGION", "eu-central-1"),
        ]));

        assert!(resolver.is_configured(AgentKind::PaymentValidator));
        assert!(!resolver.is_configured(AgentKind::SanctionCheck));
        assert_eq!(resolver.configured_agents(), vec![AgentKind::PaymentValidator]);
        assert_eq!(resolver.region(), "eu-central-1");
    }

    #[test]
    fn test_lookup_by_name() {
        let resolver = CredentialResolver::from_source(&source(&[
            ("SANCTION_CHECK_AGENT_ID", "SAN"),
            ("SANCTION_CHECK_AGENT_ALIAS_ID", "SAN-ALIAS"),
        ]));

        assert!(resolver.is_configured_by_name("sanction_check"));
        assert_eq!(resolver.credentials_for_name("sanction_check").alias_id, "SAN-ALIAS");
        assert!(!resolver.is_configured_by_name("fraud_check"));
        assert_eq!(resolver.credentials_for_name("fraud_check").agent_id, "");
    }

    #[test]
    fn test_region_override() {
        let resolver = CredentialResolver::from_source(&source(&[("AWS_DEFAULT_REGION", "")]))
            .with_region("ap-southeast-2");
        assert_eq!(resolver.region(), "ap-southeast-2");
    }
}
