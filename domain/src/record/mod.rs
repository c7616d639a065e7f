//! Structured records of engine activity.
//!
//! One [`StrategyRecord`] per strategy outcome and one [`VerdictRecord`] per
//! request. Records are plain data; where they go is decided by the
//! application's record sink.

use crate::core::request::RequestId;
use crate::core::strategy::StrategyId;
use crate::credential::CredentialId;
use crate::quorum::{StrategyResult, StrategyStatus, Verdict, VerdictKind};
use serde::{Deserialize, Serialize};

/// Outcome of one strategy within a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRecord {
    pub request_id: RequestId,
    pub strategy: StrategyId,
    pub status: StrategyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub latency_ms: u64,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<CredentialId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StrategyRecord {
    pub fn from_result(request_id: RequestId, result: &StrategyResult) -> Self {
        Self {
            request_id,
            strategy: result.strategy.clone(),
            status: result.status,
            answer: result.answer.as_ref().map(|a| a.value.clone()),
            latency_ms: result.latency_ms,
            attempts: result.attempts,
            credential: result.credential.clone(),
            reason: result.failure_summary(),
        }
    }
}

/// Summary of one verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub request_id: RequestId,
    pub kind: VerdictKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub confidence: f64,
    pub agreement: f64,
    pub ok_count: usize,
    pub total: usize,
    pub degraded: bool,
    pub elapsed_ms: u64,
    /// Answer of the advisory synthesis round, when one ran and answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<String>,
}

impl VerdictRecord {
    pub fn from_verdict(request_id: RequestId, verdict: &Verdict, elapsed_ms: u64) -> Self {
        Self {
            request_id,
            kind: verdict.kind,
            answer: verdict.answer.value().map(str::to_string),
            confidence: verdict.confidence,
            agreement: verdict.agreement,
            ok_count: verdict.ok_count,
            total: verdict.total,
            degraded: verdict.degraded,
            elapsed_ms,
            synthesis: verdict
                .synthesis
                .as_ref()
                .and_then(|s| s.answer.as_ref())
                .map(|a| a.value.clone()),
        }
    }
}

/// Any record emitted by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    Strategy(StrategyRecord),
    Verdict(VerdictRecord),
}

impl Record {
    /// Type tag written alongside the record
    pub fn record_type(&self) -> &'static str {
        match self {
            Record::Strategy(_) => "strategy_result",
            Record::Verdict(_) => "verdict",
        }
    }
}

impl From<StrategyRecord> for Record {
    fn from(record: StrategyRecord) -> Self {
        Record::Strategy(record)
    }
}

impl From<VerdictRecord> for Record {
    fn from(record: VerdictRecord) -> Self {
        Record::Verdict(record)
    }
}
