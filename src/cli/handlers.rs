use super::commands::GenerateArgs;
use crate::config::GeneratorConfig;
use crate::output::{OutputTarget, SpecFormat};
use crate::pipeline::{AnnotationPipeline, GenerateOutcome};
use crate::scan::CancellationFlag;
use crate::{NAME, VERSION};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

pub async fn handle_generate(args: &GenerateArgs, quiet: bool) -> i32 {
    match run_generate(args).await {
        Ok(outcome) => report(args, &outcome, quiet),
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

pub fn handle_version() -> i32 {
    println!("{} {}", NAME, VERSION);
    0
}

/// Environment configuration with command-line flags layered on top
pub fn resolve_config(args: &GenerateArgs) -> Result<GeneratorConfig> {
    let mut config = GeneratorConfig::from_env().context("invalid SLOTH_COMMENTS_* environment")?;

    if let Some(sentinel) = &args.sentinel {
        config.sentinel = sentinel.clone();
    }
    if let Some(language) = args.language {
        config.language = language.into();
    }
    if !args.formats.is_empty() {
        config.formats = args.formats.iter().map(|f| SpecFormat::from(*f)).collect();
    }
    if args.max_depth.is_some() {
        config.max_depth = args.max_depth;
    }
    config.exclude.extend(args.exclude.iter().cloned());

    config.validate().context("invalid configuration")?;
    debug!("{}", config);
    Ok(config)
}

fn output_target(args: &GenerateArgs) -> Result<OutputTarget> {
    if args.stdout {
        return Ok(OutputTarget::Stdout);
    }
    let dir = args
        .output_dir
        .clone()
        .context("an output directory or --stdout is required")?;
    Ok(OutputTarget::Directory(dir))
}

fn include_paths(args: &GenerateArgs) -> Result<Vec<PathBuf>> {
    if !args.include.is_empty() {
        return Ok(args.include.clone());
    }
    let cwd = env::current_dir().context("failed to determine current directory")?;
    Ok(vec![cwd])
}

async fn run_generate(args: &GenerateArgs) -> Result<GenerateOutcome> {
    let config = resolve_config(args)?;
    let target = output_target(args)?;
    let include = include_paths(args)?;

    let cancellation = CancellationFlag::new();
    let mut pipeline = AnnotationPipeline::from_config(&config, include)
        .context("failed to set up annotation pipeline")?
        .with_cancellation(cancellation.clone());
    if let Some(name) = &args.service {
        pipeline = pipeline.with_service_name(name.clone());
    }

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling generation");
            cancellation.cancel();
        }
    });

    info!(language = %config.language, "Generating SLO specifications");
    let formats = config.formats.clone();
    let result = tokio::task::spawn_blocking(move || pipeline.run(&formats, &target))
        .await
        .context("generation task failed")?;
    interrupt.abort();

    result.context("failed to generate SLO specifications")
}

fn report(args: &GenerateArgs, outcome: &GenerateOutcome, quiet: bool) -> i32 {
    let output = &outcome.output;
    let warnings = output.diagnostics.len();

    info!(
        service = %output.service.name(),
        slos = output.service.slos().len(),
        files_scanned = output.files_scanned,
        warnings,
        "Generation complete"
    );

    if !quiet && !args.stdout {
        for path in &outcome.written {
            eprintln!("Wrote {}", path.display());
        }
    }

    if args.strict && warnings > 0 {
        error!(warnings, "Warnings raised in strict mode");
        return 1;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::{CliArgs, Commands, FormatArg, LanguageArg};
    use crate::languages::SourceLanguage;
    use clap::Parser;
    use serial_test::serial;

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["sloth-comments", "generate"];
        full.extend_from_slice(argv);
        match CliArgs::parse_from(full).command {
            Commands::Generate(args) => args,
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    #[serial]
    fn test_flags_override_environment() {
        env::set_var("SLOTH_COMMENTS_LANGUAGE", "python");
        env::set_var("SLOTH_COMMENTS_EXCLUDE", "gen/");

        let args = generate_args(&["out", "--lang", "rust", "-f", "k8s", "--exclude", "*.pb.rs"]);
        let config = resolve_config(&args);

        env::remove_var("SLOTH_COMMENTS_LANGUAGE");
        env::remove_var("SLOTH_COMMENTS_EXCLUDE");

        let config = config.unwrap();
        assert_eq!(args.language, Some(LanguageArg::Rust));
        assert_eq!(config.language, SourceLanguage::Rust);
        assert_eq!(config.formats, vec![SpecFormat::KubernetesV1]);
        assert_eq!(config.exclude, vec!["gen/", "*.pb.rs"]);
    }

    #[test]
    #[serial]
    fn test_invalid_sentinel_flag_is_rejected() {
        let args = generate_args(&["out", "--sentinel", "my slo"]);
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    #[serial]
    fn test_log_level_env_is_not_generator_config() {
        env::set_var("SLOTH_COMMENTS_LOG_LEVEL", "loud");
        let args = generate_args(&["out", "--log-level", "debug"]);
        let config = resolve_config(&args);
        env::remove_var("SLOTH_COMMENTS_LOG_LEVEL");

        assert!(config.is_ok());
    }

    #[test]
    fn test_output_target() {
        let args = generate_args(&["--stdout", "-f", "prometheus"]);
        assert_eq!(args.formats, vec![FormatArg::Prometheus]);
        assert_eq!(output_target(&args).unwrap(), OutputTarget::Stdout);

        let args = generate_args(&["specs"]);
        assert_eq!(
            output_target(&args).unwrap(),
            OutputTarget::Directory(PathBuf::from("specs"))
        );
    }

    #[test]
    fn test_include_defaults_to_current_dir() {
        let args = generate_args(&["specs"]);
        let paths = include_paths(&args).unwrap();
        assert_eq!(paths, vec![env::current_dir().unwrap()]);
    }
}
