//! Dashboard command: period-to-date giving totals

use chrono::Local;

use crate::cli::parse_optional_date;
use crate::config::settings::Settings;
use crate::display::format_dashboard;
use crate::error::OffertoryResult;
use crate::models::ReportingPeriod;
use crate::services::DashboardService;
use crate::storage::Storage;

/// Handle the dashboard command
pub fn handle_dashboard_command(
    storage: &Storage,
    settings: &Settings,
    as_of: Option<&str>,
) -> OffertoryResult<()> {
    let as_of = parse_optional_date(as_of)?.unwrap_or_else(|| Local::now().date_naive());
    let service = DashboardService::new(storage);

    let totals = service.totals_as_of(as_of)?;
    let year_start = ReportingPeriod::YearToDate.start_date(as_of);
    let funds = service.fund_totals(Some(year_start), Some(as_of))?;

    print!(
        "{}",
        format_dashboard(&totals, &funds, &settings.currency_symbol)
    );
    Ok(())
}
