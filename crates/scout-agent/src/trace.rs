//! Per-run record of capability invocations, kept for diagnostics

use serde::Serialize;

/// One capability invocation and what it returned
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityCall {
    /// Capability name as proposed by the model
    pub capability: String,
    /// Argument the capability received, or the raw payload when rejected
    pub input: String,
    /// Text handed back to the model
    pub output: String,
    /// Whether the call was rejected before dispatch
    pub rejected: bool,
    /// Wall time spent in the capability
    pub duration_ms: u64,
}

/// Ordered invocation trace for a single orchestration run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trace {
    calls: Vec<CapabilityCall>,
}

impl Trace {
    /// Empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call
    pub fn record(&mut self, call: CapabilityCall) {
        self.calls.push(call);
    }

    /// Calls in invocation order
    pub fn calls(&self) -> &[CapabilityCall] {
        &self.calls
    }

    /// Names of capabilities that actually ran
    pub fn invoked(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter(|c| !c.rejected)
            .map(|c| c.capability.as_str())
            .collect()
    }

    /// Number of recorded calls
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoked_skips_rejected() {
        let mut trace = Trace::new();
        trace.record(CapabilityCall {
            capability: "PriceOracle".to_string(),
            input: "{\"ticker\":\"TSLA\"}".to_string(),
            output: "Unknown capability".to_string(),
            rejected: true,
            duration_ms: 0,
        });
        trace.record(CapabilityCall {
            capability: "TechnicalAnalyst".to_string(),
            input: "TSLA".to_string(),
            output: "RSI 40".to_string(),
            rejected: false,
            duration_ms: 12,
        });

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.invoked(), vec!["TechnicalAnalyst"]);
    }
}
