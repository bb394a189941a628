//! Ledger session: one connection, the current filter, the effective date
//! and the projection loaded under them.

use super::commit::{self, CommitOutcome, CommittedValue};
use super::export;
use super::projection::{self, DisplayColumn, LedgerRow, SortDirection, Totals};
use super::sandbox::{self, AdhocOutcome};
use crate::db::bookings;
use crate::db::categories::{self, CascadePolicy, CategoryRemoval};
use crate::db::query::{self, BookingFilter};
use crate::error::{LedgerError, Result};
use crate::model::{Amount, EffectiveDate, NewBooking};
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::{debug, info};

pub struct Session {
    conn: Connection,
    effective: EffectiveDate,
    filter: BookingFilter,
    rows: Vec<LedgerRow>,
    sort: Option<(DisplayColumn, SortDirection)>,
}

impl Session {
    /// Start a session and load the unfiltered projection.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] if the initial load fails.
    pub fn open(conn: Connection, effective: EffectiveDate) -> Result<Self> {
        let mut session = Self {
            conn,
            effective,
            filter: BookingFilter::default(),
            rows: Vec::new(),
            sort: None,
        };
        session.reload()?;
        Ok(session)
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    #[must_use]
    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    #[must_use]
    pub const fn filter(&self) -> &BookingFilter {
        &self.filter
    }

    #[must_use]
    pub const fn effective_date(&self) -> &EffectiveDate {
        &self.effective
    }

    /// Rebuild the projection from the store under the current filter.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] if the query fails.
    pub fn reload(&mut self) -> Result<()> {
        let joined = query::list_bookings(&self.conn, &self.filter)?;
        self.rows = projection::project(joined);
        if let Some((column, direction)) = self.sort {
            projection::sort_rows(&mut self.rows, column, direction);
        }
        debug!(rows = self.rows.len(), "projection reloaded");
        Ok(())
    }

    /// Replace the filter and reload.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] if the query fails.
    pub fn set_filter(&mut self, filter: BookingFilter) -> Result<()> {
        self.filter = filter;
        self.reload()
    }

    /// Clear text and date filters and reload.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] if the query fails.
    pub fn reset_filters(&mut self) -> Result<()> {
        self.set_filter(BookingFilter::default())
    }

    /// Set the effective date. Setting it to the real today clears the override.
    pub fn set_effective_date(&mut self, date: NaiveDate) {
        self.effective.set(date);
        info!(effective = %self.effective.today(), "effective date set");
    }

    pub const fn clear_effective_date(&mut self) {
        self.effective.clear();
    }

    /// View-only re-sort; kept across reloads.
    pub fn sort(&mut self, column: DisplayColumn, direction: SortDirection) {
        self.sort = Some((column, direction));
        projection::sort_rows(&mut self.rows, column, direction);
    }

    fn row(&self, id: i64) -> Result<&LedgerRow> {
        self.rows
            .iter()
            .find(|row| row.id == id)
            .ok_or_else(|| LedgerError::not_found("booking in current view", id))
    }

    /// Edit one cell of a loaded row and persist it.
    ///
    /// The in-memory row takes the committed value. The row stays in the view
    /// even if it no longer matches the filter; the next reload settles that.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] if the row is not loaded or was deleted underneath
    /// - [`LedgerError::Validation`] for locked cells or bad input
    /// - [`LedgerError::Schema`] for id/category columns
    /// - [`LedgerError::Store`] if the update fails
    pub fn edit(&mut self, id: i64, column: DisplayColumn, raw: &str) -> Result<CommitOutcome> {
        let intent = self.row(id)?.edit_intent(column, raw, &self.effective)?;
        let outcome = commit::commit(&self.conn, &intent)?;

        if let Some(row) = self.rows.iter_mut().find(|row| row.id == id) {
            match &outcome.value {
                CommittedValue::Date(date) => row.date = *date,
                CommittedValue::Note(note) => row.note.clone_from(note),
                CommittedValue::Amount(amount) => {
                    if row.inflow.is_some() {
                        row.inflow = Some(*amount);
                    } else {
                        row.outflow = Some(*amount);
                    }
                }
            }
        }
        Ok(outcome)
    }

    /// Insert a booking and reload.
    ///
    /// `date` defaults to the effective date. `category` is a display label
    /// such as `Rent` or `Rent (out)`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Validation`] for an empty note or bad amount
    /// - [`LedgerError::NotFound`] for an unknown category
    /// - [`LedgerError::Store`] if the insert fails
    pub fn add_booking(
        &mut self,
        note: &str,
        amount: &str,
        category: &str,
        date: Option<NaiveDate>,
    ) -> Result<i64> {
        if note.trim().is_empty() {
            return Err(LedgerError::validation("note", note, "must not be empty"));
        }
        let amount = Amount::parse(amount)?;
        let category_id = categories::resolve_label_id(&self.conn, category)?;
        let booking = NewBooking {
            date: date.unwrap_or_else(|| self.effective.today()),
            note: note.to_string(),
            amount,
            category_id,
        };
        let id = bookings::insert_booking(&self.conn, &booking)?;
        self.reload()?;
        Ok(id)
    }

    /// Delete a booking and drop it from the view.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] if no booking has `id`, [`LedgerError::Store`] on failure.
    pub fn delete_booking(&mut self, id: i64) -> Result<()> {
        bookings::delete_booking(&self.conn, id)?;
        self.rows.retain(|row| row.id != id);
        Ok(())
    }

    /// Delete a category under `policy` and reload.
    ///
    /// # Errors
    ///
    /// See [`categories::delete_category`].
    pub fn delete_category(&mut self, id: i64, policy: CascadePolicy) -> Result<CategoryRemoval> {
        let removal = categories::delete_category(&self.conn, id, policy)?;
        self.reload()?;
        Ok(removal)
    }

    /// Sums over the loaded rows.
    ///
    /// # Errors
    ///
    /// See [`projection::totals`].
    pub fn totals(&self) -> Result<Totals> {
        projection::totals(&self.rows)
    }

    #[must_use]
    pub fn export_markdown(&self) -> String {
        export::markdown_table(&self.rows)
    }

    /// Run an ad-hoc read query. The projection is left untouched.
    ///
    /// # Errors
    ///
    /// See [`sandbox::run`].
    pub fn adhoc(&self, text: &str) -> Result<AdhocOutcome> {
        sandbox::run(&self.conn, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{booking, category, test_db, ymd};
    use crate::model::FlowDirection;

    fn rent_session(effective: EffectiveDate) -> (Session, i64) {
        let conn = test_db();
        category(&conn, "Food", FlowDirection::Outflow);
        category(&conn, "Salary", FlowDirection::Inflow);
        let rent = category(&conn, "Rent", FlowDirection::Outflow);
        booking(&conn, ymd(2024, 1, 10), "January rent", "1200", rent);
        (Session::open(conn, effective).unwrap(), rent)
    }

    #[test]
    fn rent_booking_projects_to_outflow() {
        let (session, rent) = rent_session(EffectiveDate::unset());
        assert_eq!(rent, 3);
        let rows = session.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].outflow, Some(Amount::parse("1200").unwrap()));
        assert_eq!(rows[0].inflow, None);
        assert_eq!(rows[0].category, "Rent");
    }

    #[test]
    fn effective_date_gates_edits() {
        let (mut session, rent) = rent_session(EffectiveDate::fixed(ymd(2024, 1, 15)));
        booking(session.connection(), ymd(2024, 1, 20), "Late rent", "50", rent);
        session.reload().unwrap();

        let err = session.edit(1, DisplayColumn::Note, "changed").unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));

        let outcome = session.edit(2, DisplayColumn::Outflow, "75").unwrap();
        assert_eq!(outcome.value, CommittedValue::Amount(Amount::parse("75").unwrap()));
        assert_eq!(session.rows()[1].outflow, Some(Amount::parse("75").unwrap()));
        assert_eq!(session.rows()[1].inflow, None);

        session.set_effective_date(ymd(2024, 1, 1));
        session.edit(1, DisplayColumn::Note, "changed").unwrap();
        assert_eq!(session.rows()[0].note, "changed");
    }

    #[test]
    fn edit_keeps_row_visible_until_reload() {
        let (mut session, _) = rent_session(EffectiveDate::fixed(ymd(2024, 1, 1)));
        session
            .set_filter(BookingFilter {
                text: Some("rent".to_string()),
                ..Default::default()
            })
            .unwrap();
        session.edit(1, DisplayColumn::Note, "Miete").unwrap();
        assert_eq!(session.rows().len(), 1);

        session.reload().unwrap();
        assert!(session.rows().is_empty());

        session.reset_filters().unwrap();
        assert_eq!(session.rows().len(), 1);
    }

    #[test]
    fn add_defaults_to_effective_date_and_requires_note() {
        let (mut session, _) = rent_session(EffectiveDate::fixed(ymd(2024, 3, 1)));

        let err = session.add_booking("  ", "5", "Food", None).unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));
        let err = session.add_booking("Bread", "", "Food", None).unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));
        let err = session.add_booking("Bread", "2", "Fuel", None).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));

        let id = session.add_booking("Bread", "2,50", "Food (out)", None).unwrap();
        let added = session.rows().iter().find(|r| r.id == id).unwrap();
        assert_eq!(added.date, ymd(2024, 3, 1));
        assert_eq!(added.outflow, Some(Amount::parse("2.5").unwrap()));

        let pay = session.add_booking("Pay", "3000", "Salary", Some(ymd(2024, 2, 28))).unwrap();
        let added = session.rows().iter().find(|r| r.id == pay).unwrap();
        assert_eq!(added.inflow, Some(Amount::parse("3000").unwrap()));
        assert_eq!(added.date, ymd(2024, 2, 28));
    }

    #[test]
    fn delete_removes_row_from_view() {
        let (mut session, _) = rent_session(EffectiveDate::unset());
        session.delete_booking(1).unwrap();
        assert!(session.rows().is_empty());
        assert!(matches!(
            session.delete_booking(1),
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[test]
    fn cascade_delete_empties_the_view() {
        let (mut session, rent) = rent_session(EffectiveDate::unset());
        for day in 2..=5 {
            booking(session.connection(), ymd(2024, 1, day), "more rent", "1", rent);
        }
        session.reload().unwrap();
        assert_eq!(session.rows().len(), 5);

        assert!(session.delete_category(rent, CascadePolicy::Refuse).is_err());
        assert_eq!(session.rows().len(), 5);

        let removal = session.delete_category(rent, CascadePolicy::Cascade).unwrap();
        assert_eq!(removal.bookings_removed, 5);
        assert!(session.rows().is_empty());
    }

    #[test]
    fn sort_survives_reload_and_totals_follow_rows() {
        let (mut session, rent) = rent_session(EffectiveDate::unset());
        booking(session.connection(), ymd(2024, 1, 5), "Deposit", "300", rent);
        session.sort(DisplayColumn::Date, SortDirection::Ascending);
        assert_eq!(session.rows()[0].note, "Deposit");

        session.reload().unwrap();
        assert_eq!(session.rows()[0].note, "Deposit");
        assert_eq!(session.totals().unwrap().outflow, Amount::parse("1500").unwrap().value());
        assert!(session.export_markdown().contains("|Deposit|"));
    }

    #[test]
    fn adhoc_does_not_touch_projection() {
        let (session, _) = rent_session(EffectiveDate::unset());
        assert!(matches!(
            session.adhoc("delete from bookings"),
            Err(LedgerError::UnsafeQuery { .. })
        ));
        assert!(matches!(session.adhoc("outflow > 0"), Ok(AdhocOutcome::Grid(_))));
        assert_eq!(session.rows().len(), 1);
    }
}
