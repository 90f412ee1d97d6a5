use crate::commands::{render_audit_report, render_comparison, render_estimate};
use chrono::{Local, NaiveDate};
use clap::Args;
use comps_valuation::error::AppError;
use comps_valuation::import::CompsImporter;
use comps_valuation::quality::{CorpusAuditor, PropertyCompSet, QualityConfig};
use comps_valuation::service::{
    CompareRequest, ComparableInput, EstimateRequest, ValuationService,
};
use comps_valuation::valuation::{
    Adjustment, AdjustmentSet, ComparisonSummary, MarketEstimate, SubjectProperty,
    INFERIOR_CONDITION,
};
use std::io::Cursor;

const SAMPLE_CORPUS: &str =
    include_str!("../../../crates/comps-valuation/fixtures/orlando_sample.csv");

const DEMO_PROPERTY_ID: &str = "7";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for the market estimate (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Stop after the corpus audit.
    #[arg(long)]
    pub(crate) skip_valuation: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        as_of,
        skip_valuation,
    } = args;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());

    let corpus = load_sample_corpus()?;

    println!("Comps data-quality demo (Orlando sample corpus)");
    let mut auditor = CorpusAuditor::new(&QualityConfig::default());
    auditor.observe_all(&corpus);
    render_audit_report(&auditor.finish());

    if skip_valuation {
        return Ok(());
    }

    let Some(property) = corpus.iter().find(|set| set.id == DEMO_PROPERTY_ID) else {
        println!("\nValuation demo skipped: property {DEMO_PROPERTY_ID} missing from sample");
        return Ok(());
    };

    println!(
        "\nValuation demo for {} (zero-distance comps excluded)",
        property.address
    );
    let (summary, estimate) = demo_valuation(property, as_of)?;
    render_comparison(&summary);
    println!("\nAutomated market estimate as of {}", as_of);
    render_estimate(&estimate);

    Ok(())
}

/// Compares the adjusted located comps of `property` and estimates its market value.
pub(crate) fn demo_valuation(
    property: &PropertyCompSet,
    as_of: NaiveDate,
) -> Result<(ComparisonSummary, MarketEstimate), AppError> {
    let service = ValuationService::default();
    let subject = demo_subject(property);

    let summary = service.compare(CompareRequest {
        subject: subject.clone(),
        comparables: demo_comparables(property),
    })?;
    let estimate = service.estimate(EstimateRequest {
        subject,
        comparables: property
            .comps
            .iter()
            .filter(|comp| !comp.has_zero_distance())
            .cloned()
            .collect(),
        as_of: Some(as_of),
    })?;
    Ok((summary, estimate))
}

pub(crate) fn load_sample_corpus() -> Result<Vec<PropertyCompSet>, AppError> {
    let sets = CompsImporter::comp_sets_from_reader(Cursor::new(SAMPLE_CORPUS))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sets)
}

fn demo_subject(property: &PropertyCompSet) -> SubjectProperty {
    SubjectProperty {
        address: property.address.clone(),
        estimated_value: property.estimated_value,
        bedrooms: 3,
        bathrooms: 2.0,
        living_area_sqft: 1_800,
        year_built: 1998,
    }
}

/// Picks the adjustments an appraiser might apply to the usable comps of the demo
/// property.
fn demo_comparables(property: &PropertyCompSet) -> Vec<ComparableInput> {
    property
        .comps
        .iter()
        .filter(|comp| !comp.has_zero_distance())
        .enumerate()
        .map(|(position, comp)| {
            let mut selection = AdjustmentSet::new();
            match position {
                0 => selection.select_preset("Updated Kitchen"),
                1 => {
                    selection.select_preset("Needs Roof Replacement");
                    selection.add_custom("Busy corner", -2_500);
                }
                2 => selection.select_preset(INFERIOR_CONDITION),
                _ => {}
            }
            let mut adjustments = selection.to_adjustments();
            if comp.bedrooms < 3 {
                adjustments.push(Adjustment::custom("Missing bedroom", 5_000));
            }
            ComparableInput {
                sale: comp.clone(),
                adjustments,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_corpus_loads_four_properties() {
        let corpus = load_sample_corpus().expect("fixture parses");
        assert_eq!(corpus.len(), 4);
        assert_eq!(
            corpus.iter().map(|set| set.comps.len()).sum::<usize>(),
            24
        );
    }

    #[test]
    fn demo_valuation_uses_only_located_comps() {
        let corpus = load_sample_corpus().expect("fixture parses");
        let property = corpus
            .iter()
            .find(|set| set.id == DEMO_PROPERTY_ID)
            .expect("demo property present");

        let comparables = demo_comparables(property);
        assert_eq!(comparables.len(), 5);
        assert!(comparables
            .iter()
            .all(|input| !input.sale.has_zero_distance()));

        let summary = ValuationService::default()
            .compare(CompareRequest {
                subject: demo_subject(property),
                comparables,
            })
            .expect("demo comparison succeeds");
        assert_eq!(summary.comparables.len(), 5);
        assert!(summary.value_range.min <= summary.average_adjusted_value);
        assert!(summary.average_adjusted_value <= summary.value_range.max);
    }

    #[test]
    fn demo_valuation_applies_every_selected_adjustment() {
        let corpus = load_sample_corpus().expect("fixture parses");
        let property = corpus
            .iter()
            .find(|set| set.id == DEMO_PROPERTY_ID)
            .expect("demo property present");
        let as_of = NaiveDate::from_ymd_opt(2026, 1, 20).expect("valid date");

        let (summary, estimate) =
            demo_valuation(property, as_of).expect("demo valuation succeeds");
        let condition = &summary.comparables[2];
        assert_eq!(condition.address, "7705 Park Ave");
        assert_eq!(condition.adjusted_value, 85_100);
        assert_eq!(condition.total_adjustment, -3_900);
        assert_eq!(estimate.used_comparables, 5);
    }

    #[test]
    fn demo_runs_end_to_end() {
        let args = DemoArgs {
            as_of: NaiveDate::from_ymd_opt(2026, 1, 20),
            skip_valuation: false,
        };
        run_demo(args).expect("demo completes");
    }
}
