//! Donation repository
//!
//! Besides CRUD this holds the aggregate queries behind the dashboard,
//! deposit reports and statements. Listings join in donor and fund names so
//! callers never issue one query per row.

use chrono::{NaiveDate, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use crate::error::OffertoryResult;
use crate::models::{
    BatchId, Donation, DonationDetails, DonationId, DonationLine, DonorId, DonorTotal, FundTotal,
    Money,
};

use super::changes::Table;
use super::database::Database;

const DONATION_COLUMNS: &str = "d.id, d.donor_id, d.batch_id, d.fund_id, d.check_number, \
                                d.amount, d.check_date, d.check_image_id, d.created_at";

fn donation_from_row(row: &Row<'_>) -> rusqlite::Result<Donation> {
    Ok(Donation {
        id: row.get(0)?,
        donor_id: row.get(1)?,
        batch_id: row.get(2)?,
        fund_id: row.get(3)?,
        check_number: row.get(4)?,
        amount: row.get(5)?,
        check_date: row.get(6)?,
        check_image_id: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn line_from_row(row: &Row<'_>) -> rusqlite::Result<DonationLine> {
    Ok(DonationLine {
        donation: donation_from_row(row)?,
        donor_first_name: row.get(9)?,
        donor_last_name: row.get(10)?,
        fund_name: row.get(11)?,
    })
}

/// Criteria for listing donations. Empty criteria match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DonationFilter {
    /// Inclusive lower bound on the check date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the check date
    pub to: Option<NaiveDate>,
    pub batch_id: Option<BatchId>,
    pub donor_id: Option<DonorId>,
}

impl DonationFilter {
    pub fn batch(batch_id: BatchId) -> Self {
        Self {
            batch_id: Some(batch_id),
            ..Self::default()
        }
    }

    pub fn donor(donor_id: DonorId) -> Self {
        Self {
            donor_id: Some(donor_id),
            ..Self::default()
        }
    }

    pub fn between(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            from,
            to,
            ..Self::default()
        }
    }

    /// WHERE clause over the `d` alias plus its bound values
    fn where_clause(&self) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(from) = self.from {
            values.push(Box::new(from));
            conditions.push(format!("d.check_date >= ?{}", values.len()));
        }
        if let Some(to) = self.to {
            values.push(Box::new(to));
            conditions.push(format!("d.check_date <= ?{}", values.len()));
        }
        if let Some(batch_id) = self.batch_id {
            values.push(Box::new(batch_id));
            conditions.push(format!("d.batch_id = ?{}", values.len()));
        }
        if let Some(donor_id) = self.donor_id {
            values.push(Box::new(donor_id));
            conditions.push(format!("d.donor_id = ?{}", values.len()));
        }

        if conditions.is_empty() {
            (String::new(), values)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), values)
        }
    }
}

/// Repository for donations
#[derive(Clone)]
pub struct DonationRepository {
    db: Database,
}

impl DonationRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(&self, details: &DonationDetails) -> OffertoryResult<Donation> {
        let created_at = Utc::now();
        let check_number = details.check_number.trim().to_string();
        let id = self.db.write(Table::Donations, |conn| {
            conn.execute(
                "INSERT INTO donations (donor_id, batch_id, fund_id, check_number, amount, \
                 check_date, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    details.donor_id,
                    details.batch_id,
                    details.fund_id,
                    check_number,
                    details.amount,
                    details.check_date,
                    created_at,
                ],
            )?;
            Ok(DonationId::new(conn.last_insert_rowid()))
        })?;

        Ok(Donation {
            id,
            donor_id: details.donor_id,
            batch_id: details.batch_id,
            fund_id: details.fund_id,
            check_number,
            amount: details.amount,
            check_date: details.check_date,
            check_image_id: None,
            created_at,
        })
    }

    pub fn get(&self, id: DonationId) -> OffertoryResult<Option<Donation>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM donations d WHERE d.id = ?1", DONATION_COLUMNS),
                    params![id],
                    donation_from_row,
                )
                .optional()?)
        })
    }

    /// Replace the editable fields of a donation. Its check images follow
    /// the donation to its new donor and batch.
    pub fn update(&self, id: DonationId, details: &DonationDetails) -> OffertoryResult<()> {
        self.db
            .transaction(&[Table::Donations, Table::CheckImages], |tx| {
                tx.execute(
                    "UPDATE donations SET donor_id = ?1, batch_id = ?2, fund_id = ?3, \
                     check_number = ?4, amount = ?5, check_date = ?6 WHERE id = ?7",
                    params![
                        details.donor_id,
                        details.batch_id,
                        details.fund_id,
                        details.check_number.trim(),
                        details.amount,
                        details.check_date,
                        id,
                    ],
                )?;
                tx.execute(
                    "UPDATE check_images SET donor_id = ?1, batch_id = ?2 WHERE donation_id = ?3",
                    params![details.donor_id, details.batch_id, id],
                )?;
                Ok(())
            })
    }

    /// Delete a donation; its check images cascade
    pub fn delete(&self, id: DonationId) -> OffertoryResult<bool> {
        self.db
            .transaction(&[Table::Donations, Table::CheckImages], |tx| {
                Ok(tx.execute("DELETE FROM donations WHERE id = ?1", params![id])? > 0)
            })
    }

    /// Donations matching `filter` with donor and fund names, ordered by
    /// check date then entry order
    pub fn lines(&self, filter: &DonationFilter) -> OffertoryResult<Vec<DonationLine>> {
        let (where_clause, values) = filter.where_clause();
        self.db.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {}, p.first_name, p.last_name, f.name \
                 FROM donations d \
                 JOIN donors p ON p.id = d.donor_id \
                 JOIN funds f ON f.id = d.fund_id \
                 {} ORDER BY d.check_date, d.id",
                DONATION_COLUMNS, where_clause
            ))?;
            let lines = stmt
                .query_map(params_from_iter(values.iter()), line_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(lines)
        })
    }

    pub fn list_by_batch(&self, batch_id: BatchId) -> OffertoryResult<Vec<DonationLine>> {
        self.lines(&DonationFilter::batch(batch_id))
    }

    pub fn list_by_donor(&self, donor_id: DonorId) -> OffertoryResult<Vec<DonationLine>> {
        self.lines(&DonationFilter::donor(donor_id))
    }

    /// Sum of amounts matching `filter`
    pub fn sum(&self, filter: &DonationFilter) -> OffertoryResult<Money> {
        let (where_clause, values) = filter.where_clause();
        self.db.read(|conn| {
            Ok(conn.query_row(
                &format!(
                    "SELECT COALESCE(SUM(d.amount), 0) FROM donations d {}",
                    where_clause
                ),
                params_from_iter(values.iter()),
                |row| row.get(0),
            )?)
        })
    }

    /// Sum of amounts with a check date on or after `start`
    pub fn sum_since(&self, start: NaiveDate) -> OffertoryResult<Money> {
        self.sum(&DonationFilter::between(Some(start), None))
    }

    /// Per-fund totals over `filter`, ordered by fund name
    pub fn fund_totals(&self, filter: &DonationFilter) -> OffertoryResult<Vec<FundTotal>> {
        let (where_clause, values) = filter.where_clause();
        self.db.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT f.id, f.name, SUM(d.amount), COUNT(*) \
                 FROM donations d JOIN funds f ON f.id = d.fund_id \
                 {} GROUP BY f.id ORDER BY f.name",
                where_clause
            ))?;
            let totals = stmt
                .query_map(params_from_iter(values.iter()), |row| {
                    Ok(FundTotal {
                        fund_id: row.get(0)?,
                        fund_name: row.get(1)?,
                        total: row.get(2)?,
                        count: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(totals)
        })
    }

    /// Per-donor totals over `filter`, ordered by last then first name
    pub fn donor_totals(&self, filter: &DonationFilter) -> OffertoryResult<Vec<DonorTotal>> {
        let (where_clause, values) = filter.where_clause();
        self.db.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT p.id, p.first_name, p.last_name, SUM(d.amount), COUNT(*) \
                 FROM donations d JOIN donors p ON p.id = d.donor_id \
                 {} GROUP BY p.id ORDER BY p.last_name, p.first_name, p.id",
                where_clause
            ))?;
            let totals = stmt
                .query_map(params_from_iter(values.iter()), |row| {
                    Ok(DonorTotal {
                        donor_id: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        total: row.get(3)?,
                        count: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(totals)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchNumbering, DonorName, FundDetails, FundId, NewUser};
    use crate::storage::batches::BatchRepository;
    use crate::storage::check_images::CheckImageRepository;
    use crate::storage::donors::DonorRepository;
    use crate::storage::funds::FundRepository;
    use crate::storage::users::UserRepository;

    struct Fixture {
        donations: DonationRepository,
        batch_id: BatchId,
        donor_id: DonorId,
        other_donor: DonorId,
        missions: FundId,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let user = UserRepository::new(db.clone())
            .create(&NewUser {
                username: "admin".into(),
                password_hash: "x".into(),
                ..NewUser::default()
            })
            .unwrap();
        let funds = FundRepository::new(db.clone());
        funds
            .create_with_id(FundId::DEFAULT, &FundDetails::with_unknown_bank("General Fund"))
            .unwrap();
        let missions = funds
            .create(&FundDetails::with_unknown_bank("Missions"))
            .unwrap();
        let donors = DonorRepository::new(db.clone());
        let donor = donors.create(&DonorName::new("John", "Smith")).unwrap();
        let other = donors.create(&DonorName::new("Ann", "Lee")).unwrap();
        let batch = BatchRepository::new(db.clone())
            .create(date(2025, 3, 2), user.id, BatchNumbering::DatePrefixed)
            .unwrap();

        Fixture {
            donations: DonationRepository::new(db),
            batch_id: batch.id,
            donor_id: donor.id,
            other_donor: other.id,
            missions: missions.id,
        }
    }

    fn add(f: &Fixture, donor: DonorId, fund: FundId, cents: i64, day: NaiveDate) -> Donation {
        f.donations
            .create(&DonationDetails {
                donor_id: donor,
                batch_id: f.batch_id,
                fund_id: fund,
                check_number: "100".into(),
                amount: Money::from_cents(cents),
                check_date: day,
            })
            .unwrap()
    }

    #[test]
    fn test_lines_join_names() {
        let f = fixture();
        add(&f, f.donor_id, f.missions, 5000, date(2025, 3, 2));

        let lines = f.donations.list_by_batch(f.batch_id).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].donor_name(), "John Smith");
        assert_eq!(lines[0].fund_name, "Missions");
    }

    #[test]
    fn test_sums_match_arithmetic() {
        let f = fixture();
        add(&f, f.donor_id, FundId::DEFAULT, 1000, date(2025, 1, 15));
        add(&f, f.donor_id, FundId::DEFAULT, 2550, date(2025, 3, 1));
        add(&f, f.other_donor, f.missions, 725, date(2025, 3, 20));

        assert_eq!(
            f.donations.sum_since(date(2025, 3, 1)).unwrap(),
            Money::from_cents(2550 + 725)
        );
        assert_eq!(
            f.donations.sum_since(date(2025, 1, 1)).unwrap(),
            Money::from_cents(1000 + 2550 + 725)
        );
        assert!(f.donations.sum_since(date(2025, 4, 1)).unwrap().is_zero());
    }

    #[test]
    fn test_fund_and_donor_totals() {
        let f = fixture();
        add(&f, f.donor_id, FundId::DEFAULT, 1000, date(2025, 3, 2));
        add(&f, f.donor_id, f.missions, 500, date(2025, 3, 2));
        add(&f, f.other_donor, f.missions, 250, date(2025, 3, 2));

        let funds = f.donations.fund_totals(&DonationFilter::default()).unwrap();
        assert_eq!(funds.len(), 2);
        assert_eq!(funds[0].fund_name, "General Fund");
        assert_eq!(funds[0].total, Money::from_cents(1000));
        assert_eq!(funds[1].total, Money::from_cents(750));
        assert_eq!(funds[1].count, 2);

        let donors = f.donations.donor_totals(&DonationFilter::default()).unwrap();
        assert_eq!(donors[0].last_name, "Lee");
        assert_eq!(donors[1].total, Money::from_cents(1500));
    }

    #[test]
    fn test_update_and_delete() {
        let f = fixture();
        let donation = add(&f, f.donor_id, FundId::DEFAULT, 1000, date(2025, 3, 2));

        let mut details = DonationDetails {
            donor_id: f.other_donor,
            batch_id: f.batch_id,
            fund_id: f.missions,
            check_number: "200".into(),
            amount: Money::from_cents(1234),
            check_date: date(2025, 3, 3),
        };
        f.donations.update(donation.id, &details).unwrap();
        let stored = f.donations.get(donation.id).unwrap().unwrap();
        assert_eq!(stored.amount, Money::from_cents(1234));
        assert_eq!(stored.donor_id, f.other_donor);

        details.amount = Money::from_cents(-1);
        assert!(f.donations.update(donation.id, &details).is_err());

        assert!(f.donations.delete(donation.id).unwrap());
        assert!(f.donations.get(donation.id).unwrap().is_none());
    }

    #[test]
    fn test_update_moves_check_image_to_new_donor() {
        let f = fixture();
        let donation = add(&f, f.donor_id, FundId::DEFAULT, 1000, date(2025, 3, 2));
        let images = CheckImageRepository::new(f.donations.db.clone());
        let image = images
            .create(donation.id, f.batch_id, Some(f.donor_id), "images/a.png")
            .unwrap();

        f.donations
            .update(
                donation.id,
                &DonationDetails {
                    donor_id: f.other_donor,
                    batch_id: f.batch_id,
                    fund_id: FundId::DEFAULT,
                    check_number: "100".into(),
                    amount: Money::from_cents(1000),
                    check_date: date(2025, 3, 2),
                },
            )
            .unwrap();

        let stored = images.get(image.id).unwrap().unwrap();
        assert_eq!(stored.donor_id, Some(f.other_donor));
        assert_eq!(stored.donation_id, donation.id);
    }
}
