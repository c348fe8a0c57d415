//! Prometheus request counters

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Counter label for policy type creation requests
pub const CREATE_POLICY_TYPE_REQS: &str = "CreatePolicyTypeReqs";

/// Registry owned by one server instance
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    policy_requests: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let policy_requests = IntCounterVec::new(
            Opts::new("A1Policy_total", "Policy type and instance counters"),
            &["counter"],
        )?;
        registry.register(Box::new(policy_requests.clone()))?;

        Ok(Self {
            registry,
            policy_requests,
        })
    }

    pub fn inc(&self, counter: &str) {
        self.policy_requests.with_label_values(&[counter]).inc();
    }

    #[cfg(test)]
    pub fn get(&self, counter: &str) -> u64 {
        self.policy_requests.with_label_values(&[counter]).get()
    }

    /// Text exposition format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
