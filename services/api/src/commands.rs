use chrono::NaiveDate;
use clap::{ArgGroup, Args};
use comps_valuation::config::{AppConfig, ConfigError};
use comps_valuation::error::AppError;
use comps_valuation::import::{CompsImporter, ImportError};
use comps_valuation::quality::{AuditReport, CorpusAuditor, QualityConfig};
use comps_valuation::service::{CompareRequest, EstimateRequest, ValuationService};
use comps_valuation::valuation::{
    AdjustmentDirection, AdjustmentUnit, ComparisonSummary, DeltaFlags, MarketEstimate,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    /// JSON file holding the subject and its adjusted comparables
    #[arg(long)]
    pub(crate) request: PathBuf,
    /// Print the summary as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// JSON file holding the subject and its raw comparables
    #[arg(long)]
    pub(crate) request: PathBuf,
    /// Reference date for recency weighting (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["csv", "ndjson"])))]
pub(crate) struct AuditArgs {
    /// Comp export with one row per comp, grouped by property_id
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Newline-delimited JSON, one property comp set per line
    #[arg(long)]
    pub(crate) ndjson: Option<PathBuf>,
    /// Override the lower price-per-sqft bound
    #[arg(long)]
    pub(crate) psf_min: Option<f64>,
    /// Override the upper price-per-sqft bound
    #[arg(long)]
    pub(crate) psf_max: Option<f64>,
    /// Print the report as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_presets() -> Result<(), AppError> {
    let service = ValuationService::default();
    println!("Standard adjustment presets");
    for preset in service.presets() {
        let sign = match preset.direction {
            AdjustmentDirection::Add => "+",
            AdjustmentDirection::Subtract => "-",
        };
        let amount = match preset.unit {
            AdjustmentUnit::Currency => format!("{sign}${:.0}", preset.magnitude),
            AdjustmentUnit::Percent => format!("{sign}{}%", preset.magnitude),
        };
        println!("- {:<24} {:>9}", preset.name, amount);
    }
    Ok(())
}

pub(crate) fn run_compare(args: CompareArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = ValuationService::from_config(&config);
    let request: CompareRequest = read_request(&args.request)?;
    let summary = service.compare(request)?;

    if args.json {
        print_json(&summary);
    } else {
        render_comparison(&summary);
    }
    Ok(())
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let service = ValuationService::default();
    let mut request: EstimateRequest = read_request(&args.request)?;
    if args.as_of.is_some() {
        request.as_of = args.as_of;
    }
    let estimate = service.estimate(request)?;

    if args.json {
        print_json(&estimate);
    } else {
        render_estimate(&estimate);
    }
    Ok(())
}

pub(crate) fn run_audit(args: AuditArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let quality = audit_config(config.quality, args.psf_min, args.psf_max)?;
    let mut auditor = CorpusAuditor::new(&quality);

    if let Some(path) = args.csv.as_deref() {
        for property in CompsImporter::comp_sets_from_path(path)? {
            auditor.observe(&property?);
        }
    } else if let Some(path) = args.ndjson.as_deref() {
        for property in CompsImporter::ndjson_from_path(path)? {
            auditor.observe(&property?);
        }
    }

    let report = auditor.finish();
    if args.json {
        print_json(&report);
    } else {
        render_audit_report(&report);
    }
    Ok(())
}

fn audit_config(
    mut quality: QualityConfig,
    psf_min: Option<f64>,
    psf_max: Option<f64>,
) -> Result<QualityConfig, ConfigError> {
    if let Some(min) = psf_min {
        quality.psf_min = min;
    }
    if let Some(max) = psf_max {
        quality.psf_max = max;
    }
    if quality.psf_min >= quality.psf_max {
        return Err(ConfigError::InvalidPsfRange {
            min: quality.psf_min,
            max: quality.psf_max,
        });
    }
    Ok(quality)
}

fn read_request<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|err| AppError::Import(ImportError::from(err)))
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(err) => println!("JSON output unavailable: {}", err),
    }
}

pub(crate) fn render_comparison(summary: &ComparisonSummary) {
    match summary.subject_price_per_sqft {
        Some(psf) => println!("Subject: {} (${}/sqft estimate)", summary.subject_address, psf),
        None => println!("Subject: {}", summary.subject_address),
    }

    println!("\nComparables");
    for comp in &summary.comparables {
        println!(
            "- {} | sold ${} | adjusted ${} ({:+}) | ${}/sqft | {:.1} mi{}",
            comp.address,
            comp.sale_price,
            comp.adjusted_value,
            comp.total_adjustment,
            comp.price_per_sqft_adjusted,
            comp.distance_miles,
            describe_flags(&comp.deltas)
        );
    }

    println!(
        "\nAverage adjusted value: ${}",
        summary.average_adjusted_value
    );
    println!(
        "Value range: ${} - ${} (spread ${})",
        summary.value_range.min,
        summary.value_range.max,
        summary.value_range.spread()
    );
    if let Some(variance) = summary.estimate_variance_pct {
        println!("Variance against existing estimate: {:+.1}%", variance);
    }
    println!(
        "Flagged comparables: {} of {}",
        summary.flagged_comparables,
        summary.comparables.len()
    );
}

fn describe_flags(deltas: &DeltaFlags) -> String {
    let mut flags = Vec::new();
    if deltas.bedrooms_flagged {
        flags.push(format!("beds {:+}", deltas.bedrooms));
    }
    if deltas.bathrooms_flagged {
        flags.push(format!("baths {:+}", deltas.bathrooms));
    }
    if deltas.sqft_flagged {
        flags.push(format!("sqft {:+.1}%", deltas.sqft_pct));
    }
    if deltas.year_built_flagged {
        if let Some(years) = deltas.year_built {
            flags.push(format!("built {:+}y", years));
        }
    }

    if flags.is_empty() {
        String::new()
    } else {
        format!(" | flags: {}", flags.join(", "))
    }
}

pub(crate) fn render_estimate(estimate: &MarketEstimate) {
    println!(
        "Market estimate: ${} (range ${} - ${}, confidence {}%)",
        estimate.estimated_value, estimate.min_value, estimate.max_value, estimate.confidence
    );
    println!(
        "- weighted ${} | median ${} | mean ${} | std dev ${}",
        estimate.methods.weighted, estimate.methods.median, estimate.methods.mean, estimate.std_dev
    );
    println!(
        "- {} comparables used, {} rejected",
        estimate.used_comparables, estimate.rejected_comparables
    );
    for comp in &estimate.comparables {
        println!(
            "  - {}: ${} -> ${} ({:+.1}%, weight {:.2})",
            comp.address, comp.sale_price, comp.normalized_price, comp.adjustment_pct, comp.weight
        );
    }
}

pub(crate) fn render_audit_report(report: &AuditReport) {
    let stats = &report.statistics;
    println!(
        "Comp corpus audit: {} properties, {} comps",
        stats.property_count, stats.total_comps
    );
    match (stats.health_score, stats.health_grade) {
        (Some(score), Some(grade)) => println!("Health score: {}/100 ({})", score, grade.label()),
        _ => println!("Health score: n/a (no comps)"),
    }
    println!(
        "Issues: {} critical | {} medium | {} low",
        report.severity_counts.critical, report.severity_counts.medium, report.severity_counts.low
    );

    if report.is_clean() {
        println!("\nNo data-quality issues detected");
    }
    for issue in &report.issues {
        println!(
            "\n[{}] {} ({})",
            issue.severity.label(),
            issue.title,
            issue.category.tag()
        );
        match issue.pool_share_pct {
            Some(share) => println!("  Affected: {} ({}% of pool)", issue.affected_count, share),
            None => println!("  Affected: {}", issue.affected_count),
        }
        println!("  {}", issue.detail);
        println!("  Probable cause: {}", issue.probable_cause);
        println!("  Recommended action: {}", issue.recommended_action);
    }

    println!("\nStatistics");
    println!(
        "- {} zero-distance comps | {} beyond the {:.1} mi search radius",
        stats.zero_distance_comps, stats.comps_beyond_radius, stats.search_radius_miles
    );
    if let Some(distance) = stats.distance_miles {
        println!(
            "- distance (non-zero): {:.1} - {:.1} mi, mean {:.2}",
            distance.min, distance.max, distance.mean
        );
    }
    if let Some(price) = stats.sale_price {
        println!(
            "- sale price: ${:.0} - ${:.0}, mean ${:.0}",
            price.min, price.max, price.mean
        );
    }
    if let Some(psf) = stats.price_per_sqft {
        println!(
            "- price per sqft: ${:.0} - ${:.0}, mean ${:.1}",
            psf.min, psf.max, psf.mean
        );
    }

    println!("\nEstimate vs comp average");
    for row in &report.value_consistency {
        let estimate = row
            .estimated_value
            .map_or_else(|| "n/a".to_string(), |value| format!("${value}"));
        let average = row
            .avg_comp_sale
            .map_or_else(|| "n/a".to_string(), |value| format!("${value}"));
        let variance = row
            .variance_pct
            .map_or_else(String::new, |pct| format!(" ({pct:+}%)"));
        println!(
            "- {} {}: estimate {} | comp avg {}{}",
            row.property_id, row.address, estimate, average, variance
        );
    }
}
