use crate::languages::SourceLanguage;
use crate::output::SpecFormat;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Generate Sloth SLO specifications from source code comments
#[derive(Parser, Debug)]
#[command(
    name = "sloth-comments",
    about = "Generate Sloth SLO specifications from source code comments",
    version,
    long_about = "sloth-comments scans source trees for @sloth comment annotations, groups \
                  them into SLO blocks and writes Sloth specification documents \
                  (prometheus/v1 or the sloth.slok.dev/v1 Kubernetes resource)."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate SLO specifications from annotated sources",
        long_about = "Scans the include directories for annotation comments and writes one \
                      specification document per requested format.\n\n\
                      Examples:\n  \
                      sloth-comments generate ./slos -d ./cmd -d ./internal\n  \
                      sloth-comments generate --stdout -d . --lang rust\n  \
                      sloth-comments generate ./slos -d . -f prometheus -f kubernetes"
    )]
    Generate(GenerateArgs),

    #[command(about = "Print version information")]
    Version,
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(
        value_name = "OUTPUT_DIR",
        required_unless_present = "stdout",
        conflicts_with = "stdout",
        help = "Directory the specification files are written to"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        short = 'd',
        long = "include",
        visible_alias = "dirs",
        value_name = "DIR",
        help = "Directory or file to scan (repeatable, defaults to the current directory)"
    )]
    pub include: Vec<PathBuf>,

    #[arg(
        short = 'e',
        long,
        value_name = "GLOB",
        help = "Gitignore-style pattern to exclude (repeatable)"
    )]
    pub exclude: Vec<String>,

    #[arg(short = 'l', long = "lang", value_enum, help = "Source language to scan")]
    pub language: Option<LanguageArg>,

    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        help = "Output format (repeatable)"
    )]
    pub formats: Vec<FormatArg>,

    #[arg(long, help = "Write documents to standard output instead of a directory")]
    pub stdout: bool,

    #[arg(
        short = 's',
        long,
        value_name = "NAME",
        help = "Service name used when no service annotation is present"
    )]
    pub service: Option<String>,

    #[arg(long, value_name = "WORD", help = "Annotation prefix word after '@'")]
    pub sentinel: Option<String>,

    #[arg(long, value_name = "DEPTH", help = "Maximum directory depth to descend")]
    pub max_depth: Option<usize>,

    #[arg(long, help = "Exit with an error when any warning was raised")]
    pub strict: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageArg {
    Go,
    Rust,
    Python,
    Wasm,
}

impl From<LanguageArg> for SourceLanguage {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::Go => SourceLanguage::Go,
            LanguageArg::Rust => SourceLanguage::Rust,
            LanguageArg::Python => SourceLanguage::Python,
            LanguageArg::Wasm => SourceLanguage::Wasm,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    #[value(aliases = ["prometheus/v1", "sloth"])]
    Prometheus,
    #[value(aliases = ["sloth.slok.dev/v1", "k8s"])]
    Kubernetes,
}

impl From<FormatArg> for SpecFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Prometheus => SpecFormat::PrometheusV1,
            FormatArg::Kubernetes => SpecFormat::KubernetesV1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_generate_args() {
        let args = CliArgs::parse_from(["sloth-comments", "generate", "out"]);
        match args.command {
            Commands::Generate(generate) => {
                assert_eq!(generate.output_dir, Some(PathBuf::from("out")));
                assert!(generate.include.is_empty());
                assert!(generate.formats.is_empty());
                assert!(generate.language.is_none());
                assert!(!generate.stdout);
                assert!(!generate.strict);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_generate_with_options() {
        let args = CliArgs::parse_from([
            "sloth-comments",
            "generate",
            "--stdout",
            "-d",
            "cmd",
            "--dirs",
            "internal",
            "--exclude",
            "gen/",
            "--lang",
            "python",
            "-f",
            "k8s",
            "--format",
            "prometheus",
            "--service",
            "checkout",
            "--sentinel",
            "slo",
            "--max-depth",
            "3",
        ]);

        match args.command {
            Commands::Generate(generate) => {
                assert!(generate.stdout);
                assert!(generate.output_dir.is_none());
                assert_eq!(
                    generate.include,
                    vec![PathBuf::from("cmd"), PathBuf::from("internal")]
                );
                assert_eq!(generate.exclude, vec!["gen/"]);
                assert_eq!(generate.language, Some(LanguageArg::Python));
                assert_eq!(
                    generate.formats,
                    vec![FormatArg::Kubernetes, FormatArg::Prometheus]
                );
                assert_eq!(generate.service.as_deref(), Some("checkout"));
                assert_eq!(generate.sentinel.as_deref(), Some("slo"));
                assert_eq!(generate.max_depth, Some(3));
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_generate_requires_output() {
        assert!(CliArgs::try_parse_from(["sloth-comments", "generate"]).is_err());
        assert!(
            CliArgs::try_parse_from(["sloth-comments", "generate", "out", "--stdout"]).is_err()
        );
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["sloth-comments", "version", "-v"]);
        assert!(args.verbose);
        assert!(matches!(args.command, Commands::Version));

        assert!(CliArgs::try_parse_from(["sloth-comments", "version", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_arg_conversions() {
        assert_eq!(SourceLanguage::from(LanguageArg::Wasm), SourceLanguage::Wasm);
        assert_eq!(SpecFormat::from(FormatArg::Kubernetes), SpecFormat::KubernetesV1);
    }
}
