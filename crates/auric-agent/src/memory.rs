//! Confidence-tracked working memory for one analysis run
//!
//! The memory stores facts (one slot per key), corroborating evidence,
//! hypotheses under test, and an append-only history of everything that
//! happened. A fresh instance backs each run; `clear` resets it for reuse.
//!
//! Confidence is monotonically non-decreasing with evidence: corroboration
//! can only raise a fact's score (capped boost), never lower it. The only way
//! a belief weakens is a later `store_fact` overwrite with a lower base.

use auric_core::plan::AnalysisStep;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

const DEFAULT_FACT_CONFIDENCE: f64 = 0.8;
const EVIDENCE_BOOST_PER_ITEM: f64 = 0.1;
const EVIDENCE_BOOST_CAP: f64 = 0.3;
/// Facts above this confidence are exposed to synthesis
const CONFIRMED_THRESHOLD: f64 = 0.7;
const RECENT_EVIDENCE_LIMIT: usize = 10;

/// One stored belief
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
    pub value: Value,
    /// Tool that produced the value
    pub source: String,
    /// Confidence as stored, before any evidence boost
    pub base_confidence: f64,
    /// Current confidence, never above 1.0
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub corroborating_evidence: Vec<Value>,
}

/// A corroborating observation attached to an existing fact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub fact_key: String,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HypothesisStatus {
    Active,
    Confirmed,
    Rejected,
}

/// A candidate conclusion under test, identified by its description
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hypothesis {
    pub description: String,
    pub supporting_facts: Vec<String>,
    pub test_plan: Vec<AnalysisStep>,
    pub status: HypothesisStatus,
    pub confidence: f64,
}

/// Append-only audit trail record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum HistoryEntry {
    FactStored {
        key: String,
        value: Value,
        source: String,
        confidence: f64,
        timestamp: DateTime<Utc>,
    },
    HypothesisFormulated {
        description: String,
        supporting_facts: Vec<String>,
        timestamp: DateTime<Utc>,
    },
    HypothesisUpdated {
        description: String,
        status: HypothesisStatus,
        confidence: f64,
        timestamp: DateTime<Utc>,
    },
}

/// Summary counts over the whole memory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySummary {
    pub total_facts: usize,
    pub total_hypotheses: usize,
    pub active_hypotheses: usize,
    pub total_evidence: usize,
}

/// Read-only snapshot handed to synthesis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisContext {
    /// Facts above the confirmation threshold, key to value
    pub confirmed_facts: HashMap<String, Value>,
    pub active_hypotheses: Vec<Hypothesis>,
    /// Most recent evidence in insertion order
    pub recent_evidence: Vec<Evidence>,
    pub analysis_summary: MemorySummary,
}

impl AnalysisContext {
    pub fn is_empty(&self) -> bool {
        self.confirmed_facts.is_empty()
            && self.active_hypotheses.is_empty()
            && self.recent_evidence.is_empty()
    }
}

/// Aggregate confidence statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceMetrics {
    /// 0 when no facts are stored
    pub average_fact_confidence: f64,
    /// Facts with confidence above 0.8
    pub high_confidence_facts: usize,
    /// Facts with confidence below 0.5
    pub low_confidence_facts: usize,
    pub hypothesis_confidence: Vec<f64>,
}

/// Fact/evidence/hypothesis store scoped to a single run
#[derive(Debug, Default)]
pub struct WorkingMemory {
    facts: HashMap<String, Fact>,
    hypotheses: Vec<Hypothesis>,
    evidence: Vec<Evidence>,
    history: Vec<HistoryEntry>,
}

impl WorkingMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fact at the default confidence of 0.8
    pub fn store_fact(&mut self, key: impl Into<String>, value: Value, source: impl Into<String>) {
        self.store_fact_with_confidence(key, value, source, DEFAULT_FACT_CONFIDENCE);
    }

    /// Insert or overwrite the fact at `key`.
    ///
    /// Overwriting replaces the whole Fact, so prior corroborating evidence
    /// for that key is gone. Always succeeds.
    pub fn store_fact_with_confidence(
        &mut self,
        key: impl Into<String>,
        value: Value,
        source: impl Into<String>,
        confidence: f64,
    ) {
        let key = key.into();
        let source = source.into();
        let confidence = confidence.clamp(0.0, 1.0);
        let timestamp = Utc::now();

        self.facts.insert(
            key.clone(),
            Fact {
                value: value.clone(),
                source: source.clone(),
                base_confidence: confidence,
                confidence,
                timestamp,
                corroborating_evidence: Vec::new(),
            },
        );

        self.history.push(HistoryEntry::FactStored {
            key,
            value,
            source,
            confidence,
            timestamp,
        });
    }

    /// Attach corroborating evidence to an existing fact and recompute its
    /// confidence as `min(base + min(count * 0.1, 0.3), 1.0)`.
    ///
    /// A missing key is a silent no-op.
    pub fn add_evidence(&mut self, fact_key: &str, evidence: Value) {
        let Some(fact) = self.facts.get_mut(fact_key) else {
            return;
        };

        fact.corroborating_evidence.push(evidence.clone());
        let boost = (fact.corroborating_evidence.len() as f64 * EVIDENCE_BOOST_PER_ITEM)
            .min(EVIDENCE_BOOST_CAP);
        fact.confidence = (fact.base_confidence + boost).min(1.0);

        self.evidence.push(Evidence {
            fact_key: fact_key.to_string(),
            payload: evidence,
            timestamp: Utc::now(),
        });
    }

    /// Open a hypothesis at `active`/0.5
    pub fn formulate_hypothesis(
        &mut self,
        description: impl Into<String>,
        supporting_facts: Vec<String>,
        test_plan: Vec<AnalysisStep>,
    ) {
        let description = description.into();
        let timestamp = Utc::now();

        self.hypotheses.push(Hypothesis {
            description: description.clone(),
            supporting_facts: supporting_facts.clone(),
            test_plan,
            status: HypothesisStatus::Active,
            confidence: 0.5,
        });

        self.history.push(HistoryEntry::HypothesisFormulated {
            description,
            supporting_facts,
            timestamp,
        });
    }

    /// Resolve a hypothesis by description.
    ///
    /// Only `active -> confirmed` and `active -> rejected` transitions apply;
    /// anything else (including an unknown description) is a silent no-op.
    /// Status and confidence change together.
    pub fn update_hypothesis_status(
        &mut self,
        description: &str,
        status: HypothesisStatus,
        confidence: f64,
    ) {
        if status == HypothesisStatus::Active {
            return;
        }
        let Some(hypothesis) = self
            .hypotheses
            .iter_mut()
            .find(|h| h.description == description)
        else {
            return;
        };
        if hypothesis.status != HypothesisStatus::Active {
            return;
        }

        hypothesis.status = status;
        hypothesis.confidence = confidence.clamp(0.0, 1.0);

        self.history.push(HistoryEntry::HypothesisUpdated {
            description: description.to_string(),
            status,
            confidence: hypothesis.confidence,
            timestamp: Utc::now(),
        });
    }

    /// Direct fact access for reflection and tests
    pub fn fact(&self, key: &str) -> Option<&Fact> {
        self.facts.get(key)
    }

    /// Snapshot for synthesis: confirmed facts, active hypotheses, the last
    /// 10 evidence records in insertion order, and summary counts
    pub fn context(&self) -> AnalysisContext {
        let confirmed_facts: HashMap<String, Value> = self
            .facts
            .iter()
            .filter(|(_, fact)| fact.confidence > CONFIRMED_THRESHOLD)
            .map(|(key, fact)| (key.clone(), fact.value.clone()))
            .collect();

        let active_hypotheses: Vec<Hypothesis> = self
            .hypotheses
            .iter()
            .filter(|h| h.status == HypothesisStatus::Active)
            .cloned()
            .collect();

        let start = self.evidence.len().saturating_sub(RECENT_EVIDENCE_LIMIT);
        let recent_evidence = self.evidence[start..].to_vec();

        AnalysisContext {
            analysis_summary: MemorySummary {
                total_facts: self.facts.len(),
                total_hypotheses: self.hypotheses.len(),
                active_hypotheses: active_hypotheses.len(),
                total_evidence: self.evidence.len(),
            },
            confirmed_facts,
            active_hypotheses,
            recent_evidence,
        }
    }

    /// Defensive copy of the full ordered history
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.clone()
    }

    pub fn confidence_metrics(&self) -> ConfidenceMetrics {
        let confidences: Vec<f64> = self.facts.values().map(|f| f.confidence).collect();
        let average = if confidences.is_empty() {
            0.0
        } else {
            confidences.iter().sum::<f64>() / confidences.len() as f64
        };

        ConfidenceMetrics {
            average_fact_confidence: average,
            high_confidence_facts: confidences.iter().filter(|&&c| c > 0.8).count(),
            low_confidence_facts: confidences.iter().filter(|&&c| c < 0.5).count(),
            hypothesis_confidence: self.hypotheses.iter().map(|h| h.confidence).collect(),
        }
    }

    /// Reset all state; used for run isolation and reuse
    pub fn clear(&mut self) {
        self.facts.clear();
        self.hypotheses.clear();
        self.evidence.clear();
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_fact_twice_keeps_second_value() {
        let mut memory = WorkingMemory::new();
        memory.store_fact("technical_analysis", json!({"rsi": 41.0}), "s1");
        memory.store_fact("technical_analysis", json!({"rsi": 67.0}), "s2");

        let context = memory.context();
        assert_eq!(
            context.confirmed_facts["technical_analysis"],
            json!({"rsi": 67.0})
        );
        assert_eq!(context.analysis_summary.total_facts, 1);
        assert_eq!(memory.fact("technical_analysis").unwrap().source, "s2");
        // Both writes are on the audit trail
        assert_eq!(memory.history().len(), 2);
    }

    #[test]
    fn test_overwrite_clears_prior_evidence() {
        let mut memory = WorkingMemory::new();
        memory.store_fact("data_collection", json!(1), "s1");
        memory.add_evidence("data_collection", json!("corroboration"));
        assert!((memory.fact("data_collection").unwrap().confidence - 0.9).abs() < 1e-9);

        memory.store_fact("data_collection", json!(2), "s2");
        let fact = memory.fact("data_collection").unwrap();
        assert!(fact.corroborating_evidence.is_empty());
        assert!((fact.confidence - 0.8).abs() < 1e-9);
        // The global evidence log never shrinks
        assert_eq!(memory.context().analysis_summary.total_evidence, 1);
    }

    #[test]
    fn test_add_evidence_unknown_key_is_noop() {
        let mut memory = WorkingMemory::new();
        memory.store_fact("data_collection", json!(1), "s1");
        let before = memory.confidence_metrics();

        memory.add_evidence("nonexistent", json!("ignored"));

        assert_eq!(memory.confidence_metrics(), before);
        assert!(memory.context().recent_evidence.is_empty());
    }

    #[test]
    fn test_evidence_boost_is_capped() {
        let mut memory = WorkingMemory::new();
        memory.store_fact("sentiment_analysis", json!(0.7), "s1");

        for i in 0..10 {
            memory.add_evidence("sentiment_analysis", json!({"observation": i}));
        }

        let fact = memory.fact("sentiment_analysis").unwrap();
        // min(0.8 + min(10 * 0.1, 0.3), 1.0)
        assert!((fact.confidence - 1.0).abs() < 1e-9);
        assert_eq!(fact.corroborating_evidence.len(), 10);
    }

    #[test]
    fn test_context_excludes_low_confidence_facts() {
        let mut memory = WorkingMemory::new();
        memory.store_fact_with_confidence("data_collection", json!(1), "s1", 0.7);
        memory.store_fact_with_confidence("technical_analysis", json!(2), "s2", 0.71);

        let context = memory.context();
        assert!(!context.confirmed_facts.contains_key("data_collection"));
        assert!(context.confirmed_facts.contains_key("technical_analysis"));
        assert_eq!(context.analysis_summary.total_facts, 2);
    }

    #[test]
    fn test_recent_evidence_keeps_last_ten_in_order() {
        let mut memory = WorkingMemory::new();
        memory.store_fact("data_collection", json!(1), "s1");
        for i in 0..15 {
            memory.add_evidence("data_collection", json!(i));
        }

        let recent = memory.context().recent_evidence;
        assert_eq!(recent.len(), 10);
        assert_eq!(recent.first().unwrap().payload, json!(5));
        assert_eq!(recent.last().unwrap().payload, json!(14));
    }

    #[test]
    fn test_hypothesis_lifecycle() {
        let mut memory = WorkingMemory::new();
        memory.formulate_hypothesis(
            "breakout above resistance",
            vec!["technical_analysis".to_string()],
            Vec::new(),
        );

        let context = memory.context();
        assert_eq!(context.active_hypotheses.len(), 1);
        assert_eq!(
            context.active_hypotheses[0].status,
            HypothesisStatus::Active
        );
        assert!((context.active_hypotheses[0].confidence - 0.5).abs() < 1e-9);

        memory.update_hypothesis_status("breakout above resistance", HypothesisStatus::Confirmed, 0.85);
        assert!(memory.context().active_hypotheses.is_empty());
        assert_eq!(memory.confidence_metrics().hypothesis_confidence, vec![0.85]);

        // Terminal states stay put
        memory.update_hypothesis_status("breakout above resistance", HypothesisStatus::Rejected, 0.1);
        assert_eq!(memory.confidence_metrics().hypothesis_confidence, vec![0.85]);
    }

    #[test]
    fn test_update_unknown_hypothesis_is_noop() {
        let mut memory = WorkingMemory::new();
        memory.update_hypothesis_status("never formulated", HypothesisStatus::Confirmed, 0.9);
        assert!(memory.history().is_empty());
    }

    #[test]
    fn test_transition_to_active_is_rejected() {
        let mut memory = WorkingMemory::new();
        memory.formulate_hypothesis("h", Vec::new(), Vec::new());
        memory.update_hypothesis_status("h", HypothesisStatus::Active, 0.9);

        // Still active at the original confidence, no update on the trail
        let context = memory.context();
        assert!((context.active_hypotheses[0].confidence - 0.5).abs() < 1e-9);
        assert_eq!(memory.history().len(), 1);
    }

    #[test]
    fn test_confidence_metrics() {
        let mut memory = WorkingMemory::new();
        assert_eq!(memory.confidence_metrics().average_fact_confidence, 0.0);

        memory.store_fact_with_confidence("a", json!(1), "s", 0.9);
        memory.store_fact_with_confidence("b", json!(2), "s", 0.4);
        memory.store_fact_with_confidence("c", json!(3), "s", 0.7);

        let metrics = memory.confidence_metrics();
        assert!((metrics.average_fact_confidence - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(metrics.high_confidence_facts, 1);
        assert_eq!(metrics.low_confidence_facts, 1);
    }

    #[test]
    fn test_stored_confidence_is_clamped() {
        let mut memory = WorkingMemory::new();
        memory.store_fact_with_confidence("a", json!(1), "s", 1.7);
        assert!((memory.fact("a").unwrap().confidence - 1.0).abs() < 1e-9);

        memory.store_fact_with_confidence("b", json!(2), "s", -0.2);
        assert!((memory.fact("b").unwrap().confidence - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut memory = WorkingMemory::new();
        memory.store_fact("a", json!(1), "s");
        memory.add_evidence("a", json!("e"));
        memory.formulate_hypothesis("h", Vec::new(), Vec::new());

        memory.clear();

        let context = memory.context();
        assert!(context.is_empty());
        assert_eq!(context.analysis_summary, MemorySummary::default());
        assert!(memory.history().is_empty());
    }

    #[test]
    fn test_history_entry_wire_tags() {
        let mut memory = WorkingMemory::new();
        memory.store_fact("a", json!(1), "s");
        memory.formulate_hypothesis("h", Vec::new(), Vec::new());
        memory.update_hypothesis_status("h", HypothesisStatus::Rejected, 0.2);

        let history = serde_json::to_value(memory.history()).unwrap();
        assert_eq!(history[0]["type"], "fact_stored");
        assert_eq!(history[1]["type"], "hypothesis_formulated");
        assert_eq!(history[2]["type"], "hypothesis_updated");
        assert_eq!(history[2]["status"], "rejected");
    }
}
