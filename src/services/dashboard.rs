//! Dashboard totals
//!
//! "To-date" sums are `SUM(amount)` over donations whose check date falls on
//! or after the start of the period containing the reference date.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::error::{OffertoryError, OffertoryResult};
use crate::models::period::year_bounds;
use crate::models::{DonorTotal, FundTotal, Money, ReportingPeriod};
use crate::storage::{DonationFilter, LiveQuery, Storage, Table};

/// Month, quarter and year to date totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardTotals {
    pub as_of: NaiveDate,
    pub month_to_date: Money,
    pub quarter_to_date: Money,
    pub year_to_date: Money,
}

impl DashboardTotals {
    pub fn get(&self, period: ReportingPeriod) -> Money {
        match period {
            ReportingPeriod::MonthToDate => self.month_to_date,
            ReportingPeriod::QuarterToDate => self.quarter_to_date,
            ReportingPeriod::YearToDate => self.year_to_date,
        }
    }
}

/// Service for aggregate figures
pub struct DashboardService<'a> {
    storage: &'a Storage,
}

impl<'a> DashboardService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Totals relative to today's local date
    pub fn totals(&self) -> OffertoryResult<DashboardTotals> {
        self.totals_as_of(Local::now().date_naive())
    }

    /// Totals relative to `as_of`
    pub fn totals_as_of(&self, as_of: NaiveDate) -> OffertoryResult<DashboardTotals> {
        Ok(DashboardTotals {
            as_of,
            month_to_date: self.period_total(ReportingPeriod::MonthToDate, as_of)?,
            quarter_to_date: self.period_total(ReportingPeriod::QuarterToDate, as_of)?,
            year_to_date: self.period_total(ReportingPeriod::YearToDate, as_of)?,
        })
    }

    pub fn period_total(&self, period: ReportingPeriod, as_of: NaiveDate) -> OffertoryResult<Money> {
        self.storage.donations.sum_since(period.start_date(as_of))
    }

    /// Totals that re-compute whenever donations change
    pub fn live_totals(&self) -> OffertoryResult<LiveQuery<DashboardTotals>> {
        let storage = self.storage.clone();
        LiveQuery::new(self.storage.changes(), &[Table::Donations], move || {
            DashboardService::new(&storage).totals()
        })
    }

    /// Per-fund totals over an inclusive date range
    pub fn fund_totals(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> OffertoryResult<Vec<FundTotal>> {
        self.storage
            .donations
            .fund_totals(&DonationFilter::between(from, to))
    }

    /// Per-donor totals for a calendar year
    pub fn donor_totals(&self, year: i32) -> OffertoryResult<Vec<DonorTotal>> {
        let (start, end) = year_bounds(year)
            .ok_or_else(|| OffertoryError::Validation(format!("Invalid year: {}", year)))?;
        self.storage
            .donations
            .donor_totals(&DonationFilter::between(Some(start), Some(end)))
    }
}
