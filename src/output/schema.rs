//! Sloth specification document schemas
//!
//! Two shapes are supported: the native `prometheus/v1` spec consumed by the
//! `sloth generate` CLI, and the `sloth.slok.dev/v1` `PrometheusServiceLevel`
//! custom resource consumed by the Kubernetes controller. Absent values are
//! skipped rather than emitted empty.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

pub const PROMETHEUS_V1_VERSION: &str = "prometheus/v1";
pub const KUBERNETES_API_VERSION: &str = "sloth.slok.dev/v1";
pub const KUBERNETES_KIND: &str = "PrometheusServiceLevel";

/// Integral objectives render as `95`, fractional ones as `99.9`
fn serialize_objective<S>(objective: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if objective.fract() == 0.0 && objective.abs() < 1e15 {
        serializer.serialize_i64(*objective as i64)
    } else {
        serializer.serialize_f64(*objective)
    }
}

// prometheus/v1

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrometheusSpec {
    pub version: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    pub slos: Vec<PrometheusSlo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrometheusSlo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(serialize_with = "serialize_objective")]
    pub objective: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    pub sli: PrometheusSli,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alerting: Option<SpecAlerting>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrometheusSli {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<PrometheusRawSli>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<PrometheusEventsSli>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrometheusRawSli {
    pub error_ratio_query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrometheusEventsSli {
    pub error_query: String,
    pub total_query: String,
}

/// Alerting section, identical in both formats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecAlerting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

// sloth.slok.dev/v1

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesSpec {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: ServiceLevelSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLevelSpec {
    pub service: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    pub slos: Vec<KubernetesSlo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubernetesSlo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(serialize_with = "serialize_objective")]
    pub objective: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    pub sli: KubernetesSli,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alerting: Option<SpecAlerting>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubernetesSli {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<KubernetesRawSli>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<KubernetesEventsSli>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesRawSli {
    pub error_ratio_query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesEventsSli {
    pub error_query: String,
    pub total_query: String,
}
