use crate::commands::{
    run_audit, run_compare, run_estimate, run_presets, AuditArgs, CompareArgs, EstimateArgs,
};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use comps_valuation::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "comps-valuation",
    about = "Value properties from comparable sales and audit stored comp data",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Adjust and compare comparable sales for a subject property
    Valuation {
        #[command(subcommand)]
        command: ValuationCommand,
    },
    /// Audit a stored comp corpus for systemic data defects
    Quality {
        #[command(subcommand)]
        command: QualityCommand,
    },
    /// Audit the bundled Orlando sample and value one of its properties
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ValuationCommand {
    /// List the standard adjustment presets
    Presets,
    /// Compare adjusted comps against a subject described in a JSON request file
    Compare(CompareArgs),
    /// Reconcile a market estimate from raw comps in a JSON request file
    Estimate(EstimateArgs),
}

#[derive(Subcommand, Debug)]
enum QualityCommand {
    /// Run every detector over a CSV or NDJSON comp export
    Audit(AuditArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Valuation { command } => match command {
            ValuationCommand::Presets => run_presets(),
            ValuationCommand::Compare(args) => run_compare(args),
            ValuationCommand::Estimate(args) => run_estimate(args),
        },
        Command::Quality {
            command: QualityCommand::Audit(args),
        } => run_audit(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["comps-valuation"]).expect("no args parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn audit_requires_exactly_one_source() {
        assert!(Cli::try_parse_from(["comps-valuation", "quality", "audit"]).is_err());
        assert!(Cli::try_parse_from([
            "comps-valuation",
            "quality",
            "audit",
            "--csv",
            "a.csv",
            "--ndjson",
            "b.ndjson",
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "comps-valuation",
            "quality",
            "audit",
            "--csv",
            "comps.csv",
            "--psf-min",
            "45",
        ])
        .expect("csv audit parses");
        match cli.command {
            Some(Command::Quality {
                command: QualityCommand::Audit(args),
            }) => {
                assert_eq!(args.psf_min, Some(45.0));
                assert!(args.ndjson.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
