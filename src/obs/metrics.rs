// self
use crate::obs::{FlowKind, FlowOutcome, MappingFallback};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"bankbridge_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a remote-vocabulary fallback as a warning event plus a counter (when enabled).
pub fn record_mapping_fallback(kind: MappingFallback, value: &str) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		kind = kind.as_str(),
		value,
		"Remote vocabulary fell back to the default mapping.",
	);
	#[cfg(feature = "metrics")]
	metrics::counter!("bankbridge_mapping_fallback_total", "kind" => kind.as_str()).increment(1);

	#[cfg(all(feature = "metrics", not(feature = "tracing")))]
	{
		let _ = value;
	}
	#[cfg(not(any(feature = "tracing", feature = "metrics")))]
	{
		let _ = (kind, value);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_flow_outcome_noop_without_metrics() {
		record_flow_outcome(FlowKind::AccountSync, FlowOutcome::Failure);
	}

	#[test]
	fn record_mapping_fallback_noop_without_features() {
		record_mapping_fallback(MappingFallback::AccountKind, "PREPAID");
	}
}
