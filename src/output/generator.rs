//! Renders a [`Service`] into Sloth specification documents
//!
//! Every requested format is rendered from the same borrowed service before
//! anything is written, so a rendering failure never leaves a partial
//! document behind. Files are written through a temporary sibling and renamed
//! into place.

use super::schema::{
    KubernetesEventsSli, KubernetesRawSli, KubernetesSli, KubernetesSlo, KubernetesSpec,
    ObjectMeta, PrometheusEventsSli, PrometheusRawSli, PrometheusSli, PrometheusSlo,
    PrometheusSpec, ServiceLevelSpec, SpecAlerting, KUBERNETES_KIND,
};
use super::SpecFormat;
use crate::model::{Alerting, Service, SloBlock};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no output format requested")]
    NoFormats,

    #[error("SLO '{slo}' has neither sli.raw_query nor sli.error_query/sli.total_query")]
    MissingSli { slo: String },

    #[error("failed to serialize {format} specification: {source}")]
    Serialize {
        format: SpecFormat,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One rendered document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSpec {
    pub format: SpecFormat,
    pub file_name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    Directory(PathBuf),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpecGenerator;

impl SpecGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn prometheus_spec(&self, service: &Service) -> Result<PrometheusSpec, GenerateError> {
        let slos = service
            .slos()
            .iter()
            .map(|slo| {
                let (raw, events) = sli_parts(slo)?;
                Ok(PrometheusSlo {
                    name: slo.name.clone(),
                    description: slo.description.clone(),
                    objective: slo.objective,
                    labels: slo.labels.clone(),
                    sli: PrometheusSli {
                        raw: raw.map(|query| PrometheusRawSli {
                            error_ratio_query: query.to_string(),
                        }),
                        events: events.map(|(error, total)| PrometheusEventsSli {
                            error_query: error.to_string(),
                            total_query: total.to_string(),
                        }),
                    },
                    alerting: slo.alerting.as_ref().map(spec_alerting),
                })
            })
            .collect::<Result<Vec<_>, GenerateError>>()?;

        Ok(PrometheusSpec {
            version: SpecFormat::PrometheusV1.id().to_string(),
            service: service.name().to_string(),
            labels: BTreeMap::new(),
            slos,
        })
    }

    pub fn kubernetes_spec(&self, service: &Service) -> Result<KubernetesSpec, GenerateError> {
        let slos = service
            .slos()
            .iter()
            .map(|slo| {
                let (raw, events) = sli_parts(slo)?;
                Ok(KubernetesSlo {
                    name: slo.name.clone(),
                    description: slo.description.clone(),
                    objective: slo.objective,
                    labels: slo.labels.clone(),
                    sli: KubernetesSli {
                        raw: raw.map(|query| KubernetesRawSli {
                            error_ratio_query: query.to_string(),
                        }),
                        events: events.map(|(error, total)| KubernetesEventsSli {
                            error_query: error.to_string(),
                            total_query: total.to_string(),
                        }),
                    },
                    alerting: slo.alerting.as_ref().map(spec_alerting),
                })
            })
            .collect::<Result<Vec<_>, GenerateError>>()?;

        Ok(KubernetesSpec {
            api_version: SpecFormat::KubernetesV1.id().to_string(),
            kind: KUBERNETES_KIND.to_string(),
            metadata: ObjectMeta {
                name: resource_name(service.name()),
            },
            spec: ServiceLevelSpec {
                service: service.name().to_string(),
                labels: BTreeMap::new(),
                slos,
            },
        })
    }

    pub fn render(&self, service: &Service, format: SpecFormat) -> Result<RenderedSpec, GenerateError> {
        let serialized = match format {
            SpecFormat::PrometheusV1 => serde_yaml::to_string(&self.prometheus_spec(service)?),
            SpecFormat::KubernetesV1 => serde_yaml::to_string(&self.kubernetes_spec(service)?),
        };
        let content = serialized.map_err(|source| GenerateError::Serialize { format, source })?;

        debug!(format = %format, bytes = content.len(), "Rendered specification");

        Ok(RenderedSpec {
            format,
            file_name: format!("{}.{}.yaml", file_safe(service.name()), format.file_stem()),
            content,
        })
    }

    /// Renders each distinct format once, in request order
    pub fn render_all(
        &self,
        service: &Service,
        formats: &[SpecFormat],
    ) -> Result<Vec<RenderedSpec>, GenerateError> {
        if formats.is_empty() {
            return Err(GenerateError::NoFormats);
        }

        let mut rendered: Vec<RenderedSpec> = Vec::with_capacity(formats.len());
        for format in formats {
            if rendered.iter().any(|spec| spec.format == *format) {
                continue;
            }
            rendered.push(self.render(service, *format)?);
        }
        Ok(rendered)
    }

    /// Renders every format, then writes them to `target`. Returns the files
    /// written (empty for standard output).
    pub fn write(
        &self,
        service: &Service,
        formats: &[SpecFormat],
        target: &OutputTarget,
    ) -> Result<Vec<PathBuf>, GenerateError> {
        let rendered = self.render_all(service, formats)?;

        match target {
            OutputTarget::Stdout => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                write_documents(&rendered, &mut handle).map_err(|source| GenerateError::Io {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
                Ok(Vec::new())
            }
            OutputTarget::Directory(dir) => {
                fs::create_dir_all(dir).map_err(|source| GenerateError::Io {
                    path: dir.clone(),
                    source,
                })?;

                let mut written = Vec::with_capacity(rendered.len());
                for spec in &rendered {
                    let path = dir.join(&spec.file_name);
                    write_file(&path, &spec.content)?;
                    info!(path = %path.display(), format = %spec.format, "Specification written");
                    written.push(path);
                }
                Ok(written)
            }
        }
    }
}

/// Writes documents as one YAML stream separated by `---`
pub fn write_documents<W: Write>(documents: &[RenderedSpec], writer: &mut W) -> io::Result<()> {
    for (i, spec) in documents.iter().enumerate() {
        if i > 0 {
            writer.write_all(b"---\n")?;
        }
        writer.write_all(spec.content.as_bytes())?;
    }
    writer.flush()
}

fn write_file(path: &Path, content: &str) -> Result<(), GenerateError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&tmp, content)
        .and_then(|_| fs::rename(&tmp, path))
        .map_err(|source| {
            let _ = fs::remove_file(&tmp);
            GenerateError::Io {
                path: path.to_path_buf(),
                source,
            }
        })
}

/// `(raw, events)` parts of a block's SLI; at least one must be present
fn sli_parts(slo: &SloBlock) -> Result<(Option<&str>, Option<(&str, &str)>), GenerateError> {
    let raw = slo.sli.raw_form();
    let events = slo.sli.events_form();
    if raw.is_none() && events.is_none() {
        return Err(GenerateError::MissingSli {
            slo: slo.name.clone(),
        });
    }
    Ok((raw, events))
}

fn spec_alerting(alerting: &Alerting) -> SpecAlerting {
    SpecAlerting {
        name: alerting.name.clone(),
        labels: alerting.labels.clone(),
        annotations: alerting.annotations.clone(),
    }
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '/' | '\\' | ':') {
                '-'
            } else {
                c
            }
        })
        .collect()
}

/// Kubernetes object names: lowercase alphanumerics, '-' and '.'
fn resource_name(service: &str) -> String {
    let name: String = service
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let name = name.trim_matches(|c| c == '-' || c == '.');
    if name.is_empty() {
        "service".to_string()
    } else {
        name.chars().take(253).collect()
    }
}
