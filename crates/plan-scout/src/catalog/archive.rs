use std::io::Write;

use crate::engine::ranking::RankedPlan;

/// Export a ranked plan list as CSV for spreadsheet review or archival.
///
/// One row per plan, in ranked order. Money columns are rounded to cents.
pub fn write_ranked_csv<W: Write>(writer: W, plans: &[RankedPlan]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "rank",
        "plan_id",
        "plan_name",
        "rep_name",
        "tdu_area",
        "rate_type",
        "term_months",
        "price_kwh_500",
        "price_kwh_1000",
        "price_kwh_2000",
        "annual_cost",
        "average_monthly_cost",
        "effective_rate",
        "quality_score",
        "combined_score",
        "warning_count",
        "is_gimmick",
    ])?;

    for (index, ranked) in plans.iter().enumerate() {
        let plan = &ranked.plan;
        csv_writer.write_record([
            (index + 1).to_string(),
            plan.plan_id.clone(),
            plan.plan_name.clone(),
            plan.rep_name.clone(),
            plan.tdu_area.clone(),
            plan.rate_type.as_str().to_string(),
            plan.term_months.to_string(),
            format!("{:.1}", plan.price_kwh_500),
            format!("{:.1}", plan.price_kwh_1000),
            format!("{:.1}", plan.price_kwh_2000),
            format!("{:.2}", ranked.annual_cost),
            format!("{:.2}", ranked.average_monthly_cost),
            format!("{:.2}", ranked.effective_rate),
            format!("{:.0}", ranked.quality_score),
            format!("{:.2}", ranked.combined_score),
            ranked.warnings.len().to_string(),
            ranked.is_gimmick.to_string(),
        ])?;
    }

    csv_writer.flush().map_err(csv::Error::from)
}
