//! Specification rendering and output

pub mod generator;
pub mod schema;

pub use generator::{GenerateError, OutputTarget, RenderedSpec, SpecGenerator};

use std::fmt;
use std::str::FromStr;

/// Versioned output document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecFormat {
    /// Sloth native spec, `version: prometheus/v1`
    PrometheusV1,
    /// `PrometheusServiceLevel` custom resource, `apiVersion: sloth.slok.dev/v1`
    KubernetesV1,
}

impl SpecFormat {
    pub fn all() -> &'static [SpecFormat] {
        &[SpecFormat::PrometheusV1, SpecFormat::KubernetesV1]
    }

    /// Schema identifier written into the document
    pub fn id(&self) -> &'static str {
        match self {
            SpecFormat::PrometheusV1 => schema::PROMETHEUS_V1_VERSION,
            SpecFormat::KubernetesV1 => schema::KUBERNETES_API_VERSION,
        }
    }

    /// Middle part of the output file name
    pub fn file_stem(&self) -> &'static str {
        match self {
            SpecFormat::PrometheusV1 => "prometheus",
            SpecFormat::KubernetesV1 => "kubernetes",
        }
    }
}

impl fmt::Display for SpecFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SpecFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prometheus" | "prometheus/v1" | "sloth" => Ok(SpecFormat::PrometheusV1),
            "kubernetes" | "k8s" | "sloth.slok.dev/v1" => Ok(SpecFormat::KubernetesV1),
            other => Err(format!(
                "Unsupported format: {}. Valid options: prometheus/v1, sloth.slok.dev/v1",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("prometheus".parse::<SpecFormat>().unwrap(), SpecFormat::PrometheusV1);
        assert_eq!("prometheus/v1".parse::<SpecFormat>().unwrap(), SpecFormat::PrometheusV1);
        assert_eq!("K8S".parse::<SpecFormat>().unwrap(), SpecFormat::KubernetesV1);
        assert_eq!(
            "sloth.slok.dev/v1".parse::<SpecFormat>().unwrap(),
            SpecFormat::KubernetesV1
        );
        assert!("openslo/v1".parse::<SpecFormat>().is_err());
    }

    #[test]
    fn test_ids_round_trip() {
        for format in SpecFormat::all() {
            assert_eq!(format.id().parse::<SpecFormat>().unwrap(), *format);
            assert_eq!(format.to_string(), format.id());
        }
    }
}
