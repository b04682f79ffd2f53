//! Sample data and stdout reports.
//!
//! The sample set mirrors the live Power to Choose feed in miniature: clean
//! fixed-rate plans, bill-credit traps, a free-nights time-of-use plan, a
//! Spanish duplicate, and plans across every major TDU, so the demo
//! exercises deduplication, warnings, and the quality gates end to end.

use chrono::{Local, Months, NaiveDate};
use clap::Args;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use plan_scout::catalog::archive::write_ranked_csv;
use plan_scout::catalog::{
    CatalogError, CityTaxData, ElectricityPlan, LocalTaxesData, PlansData, PlansMetadata,
    RangeTaxData, RateType, TaxInfo, TduRate, TduRatesData,
};
use plan_scout::config::AppConfig;
use plan_scout::engine::etf;
use plan_scout::engine::ranking::{PlanRanker, RankingOutcome};
use plan_scout::engine::usage::UsageProfile;
use plan_scout::PlanCatalog;

use crate::error::AppError;
use crate::infra::{resolve_service_area, UsageInput};

#[derive(Args, Debug)]
pub(crate) struct RankReportArgs {
    /// Directory holding plans.json, tdu-rates.json, and local-taxes.json
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// TDU service area code (e.g. ONCOR)
    #[arg(long)]
    pub(crate) tdu_area: Option<String>,
    /// ZIP code used to resolve the TDU area and local tax rate
    #[arg(long)]
    pub(crate) zip: Option<String>,
    /// Average monthly usage in kWh
    #[arg(long)]
    pub(crate) average_monthly_kwh: Option<f64>,
    /// Home-size label (apartment, small, medium, large)
    #[arg(long)]
    pub(crate) home_size: Option<String>,
    /// Current contract start date (YYYY-MM-DD), for renewal analysis
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) contract_start: Option<NaiveDate>,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// How many ranked plans to print
    #[arg(long, default_value_t = 10)]
    pub(crate) top: usize,
    /// Also write the full ranked list to a CSV file
    #[arg(long)]
    pub(crate) csv_out: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Average monthly usage in kWh for the demo household
    #[arg(long)]
    pub(crate) average_monthly_kwh: Option<f64>,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Write the sample plans.json, tdu-rates.json, and local-taxes.json here
    #[arg(long)]
    pub(crate) write_data: Option<PathBuf>,
    /// How many ranked plans to print
    #[arg(long)]
    pub(crate) top: Option<usize>,
}

pub(crate) fn run_rank_report(args: RankReportArgs) -> Result<(), AppError> {
    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => AppConfig::load()?.data.data_dir,
    };
    let catalog = PlanCatalog::load_dir(&data_dir)?;

    let usage = UsageInput {
        monthly_usage: None,
        average_monthly_kwh: args.average_monthly_kwh,
        home_size: args.home_size.clone(),
    };

    rank_and_render(
        &catalog,
        args.tdu_area.as_deref(),
        args.zip.as_deref(),
        &usage,
        args.contract_start,
        args.today,
        args.top,
        args.csv_out.as_deref(),
    )
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Plan Scout demo (sample data)");

    let catalog = sample_catalog()?;

    if let Some(dir) = &args.write_data {
        let today = args.today.unwrap_or_else(|| Local::now().date_naive());
        write_sample_data(dir, today)?;
        println!("Wrote sample data files to {}", dir.display());
    }

    let usage = UsageInput {
        monthly_usage: None,
        average_monthly_kwh: args.average_monthly_kwh,
        home_size: None,
    };

    rank_and_render(
        &catalog,
        Some("ONCOR"),
        None,
        &usage,
        None,
        args.today,
        args.top.unwrap_or(10),
        None,
    )
}

#[allow(clippy::too_many_arguments)]
fn rank_and_render(
    catalog: &PlanCatalog,
    tdu_area: Option<&str>,
    zip: Option<&str>,
    usage: &UsageInput,
    contract_start: Option<NaiveDate>,
    today: Option<NaiveDate>,
    top: usize,
    csv_out: Option<&Path>,
) -> Result<(), AppError> {
    let (tdu, tax) = resolve_service_area(catalog, tdu_area, zip)?;
    let profile = usage.resolve()?;
    let reference = today.unwrap_or_else(|| Local::now().date_naive());

    let plans = catalog.plans_for_area(&tdu.code);
    let ranker = PlanRanker::new(Some(tdu), tax)?;
    let outcome = ranker.rank(&plans, &profile, reference, contract_start)?;

    render_report(&outcome, ranker.tdu(), ranker.tax(), &profile, reference, top);

    if let Some(path) = csv_out {
        let file = fs::File::create(path)?;
        write_ranked_csv(file, &outcome.plans)?;
        println!("\nWrote {} ranked plans to {}", outcome.plans.len(), path.display());
    }

    Ok(())
}

fn render_report(
    outcome: &RankingOutcome,
    tdu: &TduRate,
    tax: &TaxInfo,
    profile: &UsageProfile,
    reference: NaiveDate,
    top: usize,
) {
    println!("\nService area: {} ({})", tdu.code, tdu.name);
    println!("Local tax rate: {:.2}% ({})", tax.rate * 100.0, tax.region);
    println!(
        "Household usage: {:.0} kWh/mo average, evaluated {}",
        profile.average(),
        reference
    );
    println!(
        "Listings: {} fetched -> {} after deduplication ({} duplicate(s), {} English-only, {} Spanish-only)",
        outcome.dedup.original_count,
        outcome.plans.len(),
        outcome.dedup.duplicate_count,
        outcome.dedup.orphaned_english_count,
        outcome.dedup.orphaned_spanish_count
    );

    println!("\nTop plans");
    for (index, ranked) in outcome.plans.iter().take(top).enumerate() {
        println!(
            "{:>2}. {} - {}",
            index + 1,
            ranked.plan.plan_name,
            ranked.plan.rep_name
        );
        println!(
            "    ${:.2}/mo average | ${:.2}/yr | {:.1} cents/kWh effective | quality {:.0}/100",
            ranked.average_monthly_cost,
            ranked.annual_cost,
            ranked.effective_rate,
            ranked.quality_score
        );

        let display = etf::display_info(&ranked.plan);
        if display.needs_confirmation {
            println!("    Cancellation: {} (verify in the EFL)", display.label);
        } else {
            println!("    Cancellation: {}", display.label);
        }

        if ranked.is_gimmick {
            println!("    Flagged as a gimmick offer");
        }
        for warning in &ranked.warnings {
            println!("    ! {}", warning.message);
        }
    }

    if outcome.plans.len() > top {
        println!("\n({} more plans not shown)", outcome.plans.len() - top);
    }
}

pub(crate) fn sample_catalog() -> Result<PlanCatalog, CatalogError> {
    PlanCatalog::from_parts(sample_plans(), sample_tdus(), sample_taxes())
}

fn fixed_plan(
    id: &str,
    name: &str,
    rep: &str,
    tdu_area: &str,
    prices: (f64, f64, f64),
    term_months: u32,
    base_charge: f64,
    etf: f64,
    renewable_pct: u8,
) -> ElectricityPlan {
    ElectricityPlan {
        plan_id: id.to_string(),
        plan_name: name.to_string(),
        rep_name: rep.to_string(),
        tdu_area: tdu_area.to_string(),
        rate_type: RateType::Fixed,
        term_months,
        price_kwh_500: prices.0,
        price_kwh_1000: prices.1,
        price_kwh_2000: prices.2,
        base_charge_monthly: base_charge,
        early_termination_fee: Some(etf),
        etf_details: None,
        renewable_pct,
        is_prepaid: false,
        is_tou: false,
        special_terms: None,
        promotion_details: None,
        fees_credits: None,
        min_usage_fees: None,
        language: "en".to_string(),
        efl_url: None,
        enrollment_url: None,
        terms_url: None,
    }
}

fn sample_plans() -> Vec<ElectricityPlan> {
    let gexa = ElectricityPlan {
        promotion_details: Some("100% renewable energy".to_string()),
        ..fixed_plan(
            "GEXA_SAVER_12",
            "Saver Supreme 12",
            "Gexa Energy",
            "ONCOR",
            (11.9, 9.5, 8.9),
            12,
            4.95,
            175.0,
            100,
        )
    };
    let gexa_spanish = ElectricityPlan {
        plan_id: "GEXA_SAVER_12_ES".to_string(),
        plan_name: "Ahorro Supremo 12".to_string(),
        language: "es".to_string(),
        ..gexa.clone()
    };

    let frontier_credit = ElectricityPlan {
        special_terms: Some(
            "$120 bill credit applied when usage is between 1000-1050 kWh".to_string(),
        ),
        promotion_details: Some("Special promotional rate with bill credit".to_string()),
        ..fixed_plan(
            "FRONTIER_CREDIT_12",
            "Bill Credit Plus 12",
            "Frontier Utilities",
            "ONCOR",
            (22.8, 7.9, 11.4),
            12,
            9.95,
            150.0,
            0,
        )
    };

    let ambit_credit = ElectricityPlan {
        special_terms: Some("$100 bill credit when usage is exactly 1000 kWh".to_string()),
        promotion_details: Some("Introductory credit offer".to_string()),
        ..fixed_plan(
            "AMBIT_CREDIT_12",
            "Credit Boost 12",
            "Ambit Energy",
            "CENTERPOINT",
            (21.4, 8.4, 10.9),
            12,
            9.95,
            195.0,
            0,
        )
    };

    let txu_free_nights = ElectricityPlan {
        is_tou: true,
        special_terms: Some("Free electricity every night from 9 PM to 6 AM".to_string()),
        promotion_details: Some("Free nights with solar renewable energy".to_string()),
        ..fixed_plan(
            "TXU_FREENIGHTS_12",
            "Free Nights & Solar Days 12",
            "TXU Energy",
            "ONCOR",
            (16.8, 13.2, 11.9),
            12,
            9.95,
            195.0,
            50,
        )
    };

    let champion_36 = ElectricityPlan {
        promotion_details: Some("Long-term rate lock".to_string()),
        ..fixed_plan(
            "CHAMPION_36",
            "Champ Saver-36",
            "Champion Energy",
            "ONCOR",
            (10.8, 8.9, 8.4),
            36,
            9.95,
            300.0,
            18,
        )
    };

    let spring_6 = ElectricityPlan {
        promotion_details: Some("Great for timing your renewal to fall season".to_string()),
        ..fixed_plan(
            "SPRING_POWER_6",
            "Seasonal Saver 6",
            "Spring Power & Gas",
            "ONCOR",
            (13.1, 10.6, 9.9),
            6,
            9.95,
            75.0,
            25,
        )
    };

    vec![
        fixed_plan(
            "4CHANGE_SIMPLE_12",
            "Maxx Saver Select 12",
            "4Change Energy",
            "ONCOR",
            (12.4, 9.8, 9.1),
            12,
            9.95,
            150.0,
            23,
        ),
        gexa,
        gexa_spanish,
        frontier_credit,
        txu_free_nights,
        champion_36,
        spring_6,
        fixed_plan(
            "DIRECT_VALUE_12",
            "Live Brighter 12",
            "Direct Energy",
            "ONCOR",
            (12.1, 9.9, 9.2),
            12,
            8.95,
            150.0,
            15,
        ),
        fixed_plan(
            "RELIANT_TRUE_24",
            "True Simple 24",
            "Reliant Energy",
            "CENTERPOINT",
            (13.2, 10.2, 9.4),
            24,
            9.95,
            240.0,
            0,
        ),
        ambit_credit,
        fixed_plan(
            "DISCOUNT_POWER_12",
            "Saver 12",
            "Discount Power",
            "AEP_NORTH",
            (11.7, 9.3, 8.8),
            12,
            4.95,
            150.0,
            30,
        ),
        fixed_plan(
            "PENNYWISE_AEP_12",
            "Smart Choice 12",
            "Pennywise Power",
            "AEP_CENTRAL",
            (12.3, 9.7, 9.0),
            12,
            4.95,
            150.0,
            22,
        ),
        fixed_plan(
            "CIRRO_TNMP_12",
            "Simple Rate 12",
            "Cirro Energy",
            "TNMP",
            (14.2, 11.5, 10.8),
            12,
            9.95,
            150.0,
            12,
        ),
    ]
}

fn sample_tdus() -> Vec<TduRate> {
    let tdu = |code: &str, name: &str, base: f64, per_kwh: f64, zips: Vec<(u32, u32)>| TduRate {
        code: code.to_string(),
        name: name.to_string(),
        monthly_base_charge: base,
        per_kwh_rate: per_kwh,
        effective_date: "2025-03-01".to_string(),
        zip_codes: zips,
        notes: None,
    };

    vec![
        tdu(
            "ONCOR",
            "Oncor Electric Delivery",
            4.23,
            4.56,
            vec![(75001, 75999), (76001, 76399)],
        ),
        tdu(
            "CENTERPOINT",
            "CenterPoint Energy",
            4.39,
            4.90,
            vec![(77001, 77599)],
        ),
        tdu(
            "TNMP",
            "Texas-New Mexico Power",
            7.85,
            5.80,
            vec![(79701, 79799)],
        ),
        tdu(
            "AEP_NORTH",
            "AEP Texas North",
            5.88,
            5.10,
            vec![(76801, 76999)],
        ),
        tdu(
            "AEP_CENTRAL",
            "AEP Texas Central",
            5.88,
            5.47,
            vec![(78401, 78499)],
        ),
    ]
}

fn sample_taxes() -> LocalTaxesData {
    let mut major_cities = BTreeMap::new();
    major_cities.insert(
        "dallas".to_string(),
        CityTaxData {
            rate: 0.0825,
            tdu: Some("ONCOR".to_string()),
            deregulated: true,
            note: None,
            zip_codes: vec!["75201".to_string(), "75202".to_string(), "75203".to_string()],
        },
    );
    major_cities.insert(
        "houston".to_string(),
        CityTaxData {
            rate: 0.0825,
            tdu: Some("CENTERPOINT".to_string()),
            deregulated: true,
            note: None,
            zip_codes: vec!["77002".to_string(), "77019".to_string()],
        },
    );

    let mut zip_code_ranges = BTreeMap::new();
    zip_code_ranges.insert(
        "76001-76399".to_string(),
        RangeTaxData {
            rate: 0.0775,
            region: "Tarrant County".to_string(),
            tdu: Some("ONCOR".to_string()),
            note: None,
        },
    );
    zip_code_ranges.insert(
        "77001-77599".to_string(),
        RangeTaxData {
            rate: 0.0815,
            region: "Harris County".to_string(),
            tdu: Some("CENTERPOINT".to_string()),
            note: None,
        },
    );

    LocalTaxesData {
        major_cities,
        zip_code_ranges,
        default_local_rate: 0.0625,
    }
}

fn write_sample_data(dir: &Path, today: NaiveDate) -> Result<(), AppError> {
    fs::create_dir_all(dir)?;

    let plans = sample_plans();
    let plans_data = PlansData {
        metadata: PlansMetadata {
            fetched_at: format!("{today}T00:00:00Z"),
            total_plans: plans.len(),
            source: "sample data (for development)".to_string(),
        },
        plans,
    };
    write_json(dir, "plans.json", &plans_data)?;

    let next_update = today
        .checked_add_months(Months::new(1))
        .unwrap_or(today);
    let tdus_data = TduRatesData {
        tdus: sample_tdus(),
        last_updated: today.to_string(),
        next_update: next_update.to_string(),
    };
    write_json(dir, "tdu-rates.json", &tdus_data)?;

    write_json(dir, "local-taxes.json", &sample_taxes())
}

fn write_json<T: serde::Serialize>(dir: &Path, file: &str, value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(|source| {
        AppError::Catalog(CatalogError::Json {
            file: file.to_string(),
            source,
        })
    })?;
    fs::write(dir.join(file), rendered).map_err(AppError::from)
}
