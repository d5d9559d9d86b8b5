//! Per-issuer filings index with point-in-time filtering.
//!
//! Fetches the submissions feed for one issuer and applies the primary PIT
//! gate: only filings whose acceptance timestamp falls on or before the end
//! of the cutoff day survive. Everything downstream operates on the output
//! of this gate.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::{debug, info, warn};

use fundsnap_core::dates::{parse_date, parse_datetime, within_cutoff};
use fundsnap_core::error::Result;
use fundsnap_core::period::PeriodType;
use fundsnap_core::types::{Cik, Filing, FormType, Ticker};

use crate::EDGAR_BASE_URL;
use crate::client::EdgarClient;

/// Submissions feed for one issuer.
#[derive(Debug, Deserialize)]
struct Submissions {
    filings: FilingsSection,
}

#[derive(Debug, Deserialize)]
struct FilingsSection {
    recent: FilingColumns,
    #[serde(default)]
    files: Vec<ArchivePage>,
}

/// The column-oriented filing arrays the feed uses. All columns are indexed
/// in parallel.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilingColumns {
    #[serde(default)]
    accession_number: Vec<String>,
    #[serde(default)]
    form: Vec<String>,
    #[serde(default)]
    filing_date: Vec<String>,
    #[serde(default, rename = "acceptanceDateTime")]
    acceptance_date_time: Vec<String>,
    #[serde(default)]
    report_date: Vec<String>,
}

/// Reference to an older filing batch (the feed paginates history).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArchivePage {
    name: String,
    #[serde(default)]
    filing_from: Option<String>,
}

/// Fetches and PIT-filters the filing list for one issuer.
#[derive(Clone, Debug)]
pub struct FilingsIndex {
    client: EdgarClient,
}

impl FilingsIndex {
    /// Creates an index backed by the given client.
    #[must_use]
    pub const fn new(client: EdgarClient) -> Self {
        Self { client }
    }

    /// Returns all filings for `cik` visible as of `cutoff`, filtered to
    /// forms matching `period_type`, sorted ascending by period end.
    ///
    /// An empty result is `Ok(vec![])`; the caller records coverage.
    ///
    /// # Errors
    /// Network/parse failures from the feed, or a corrupt index entry whose
    /// date ordering breaks the filing invariant.
    pub async fn fetch(
        &self,
        cik: &Cik,
        ticker: &Ticker,
        cutoff: NaiveDate,
        period_type: PeriodType,
        include_amendments: bool,
    ) -> Result<Vec<Filing>> {
        let url = format!("{EDGAR_BASE_URL}/submissions/CIK{}.json", cik.as_str());
        let submissions: Submissions = self.client.get_json(&url).await?;

        let mut records = parse_columns(
            &submissions.filings.recent,
            cik,
            ticker,
            cutoff,
            period_type,
            include_amendments,
        )?;

        // Older filings live in archive pages; skip pages entirely after the cutoff.
        for archive in &submissions.filings.files {
            if let Some(from) = archive.filing_from.as_deref().and_then(parse_date) {
                if from > cutoff {
                    continue;
                }
            }
            let archive_url = format!("{EDGAR_BASE_URL}/submissions/{}", archive.name);
            match self.client.get_json::<FilingColumns>(&archive_url).await {
                Ok(columns) => {
                    let batch = parse_columns(
                        &columns,
                        cik,
                        ticker,
                        cutoff,
                        period_type,
                        include_amendments,
                    )?;
                    debug!(
                        archive = %archive.name,
                        count = batch.len(),
                        "fetched archive filings"
                    );
                    records.extend(batch);
                }
                Err(e) => {
                    warn!(archive = %archive.name, error = %e, "failed to fetch archive page");
                }
            }
        }

        // Ascending period order: later periods overwrite earlier rows when a
        // restatement spans periods.
        records.sort_by(|a, b| {
            a.period_end
                .cmp(&b.period_end)
                .then_with(|| a.acceptance_datetime.cmp(&b.acceptance_datetime))
        });

        info!(
            ticker = %ticker,
            cik = %cik,
            %cutoff,
            count = records.len(),
            "filings index built"
        );
        Ok(records)
    }
}

/// Parses one column batch into qualifying [`Filing`] records.
fn parse_columns(
    columns: &FilingColumns,
    cik: &Cik,
    ticker: &Ticker,
    cutoff: NaiveDate,
    period_type: PeriodType,
    include_amendments: bool,
) -> Result<Vec<Filing>> {
    let mut records = Vec::new();

    for (i, form) in columns.form.iter().enumerate() {
        let form_type = FormType::from_sec(form);
        if !form_type.matches(period_type) {
            continue;
        }
        if form_type.is_amendment() && !include_amendments {
            continue;
        }

        let Some(filing_date) = columns
            .filing_date
            .get(i)
            .and_then(|s| parse_date(s))
        else {
            debug!(index = i, form, "skipping filing without filing date");
            continue;
        };

        // Missing acceptance timestamps (very old filings) fall back to the
        // end of the filing day, the latest moment they could have appeared.
        let acceptance = columns
            .acceptance_date_time
            .get(i)
            .and_then(|s| parse_datetime(s))
            .unwrap_or_else(|| {
                filing_date.and_time(NaiveTime::from_hms_opt(23, 59, 59).expect("valid time"))
            });

        // The primary PIT gate.
        if !within_cutoff(acceptance, cutoff) {
            continue;
        }

        let Some(period_end) = columns.report_date.get(i).and_then(|s| parse_date(s)) else {
            debug!(index = i, form, "skipping filing without report date");
            continue;
        };

        let accession = columns
            .accession_number
            .get(i)
            .cloned()
            .unwrap_or_default();

        records.push(Filing::new(
            cik.clone(),
            ticker.clone(),
            accession,
            form_type,
            filing_date,
            acceptance,
            period_end,
        )?);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn columns() -> FilingColumns {
        FilingColumns {
            accession_number: vec![
                "0000320193-16-000070".into(),
                "0000320193-17-000009".into(),
                "0000320193-16-000050".into(),
                "0000320193-16-000060".into(),
            ],
            form: vec!["10-K".into(), "10-K".into(), "10-Q".into(), "8-K".into()],
            filing_date: vec![
                "2016-10-26".into(),
                "2017-02-15".into(),
                "2016-07-27".into(),
                "2016-09-07".into(),
            ],
            acceptance_date_time: vec![
                "2016-10-26T16:32:23.000Z".into(),
                "2017-02-15T08:01:36.000Z".into(),
                "2016-07-27T16:31:00.000Z".into(),
                "2016-09-07T08:00:00.000Z".into(),
            ],
            report_date: vec![
                "2016-09-24".into(),
                "2016-12-31".into(),
                "2016-06-25".into(),
                "2016-09-07".into(),
            ],
        }
    }

    fn parse(
        cutoff: NaiveDate,
        period_type: PeriodType,
        include_amendments: bool,
    ) -> Vec<Filing> {
        parse_columns(
            &columns(),
            &Cik::new("320193"),
            &Ticker::new("AAPL"),
            cutoff,
            period_type,
            include_amendments,
        )
        .unwrap()
    }

    #[test]
    fn pit_gate_excludes_post_cutoff_acceptance() {
        let records = parse(d(2016, 12, 31), PeriodType::Annual, true);
        // Only the FY2016 10-K accepted 2016-10-26; the Feb-2017 10-K is gated out
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].accession, "0000320193-16-000070");
    }

    #[test]
    fn advancing_cutoff_admits_later_filing() {
        let records = parse(d(2017, 3, 1), PeriodType::Annual, true);
        assert_eq!(records.len(), 2);
        // Ascending period_end after the caller sorts; parse preserves feed order
        assert!(
            records
                .iter()
                .any(|r| r.accession == "0000320193-17-000009")
        );
    }

    #[test]
    fn acceptance_at_end_of_cutoff_day_is_included() {
        let mut cols = columns();
        cols.acceptance_date_time[0] = "2016-12-31T23:59:59".into();
        cols.filing_date[0] = "2016-12-31".into();
        let records = parse_columns(
            &cols,
            &Cik::new("320193"),
            &Ticker::new("AAPL"),
            d(2016, 12, 31),
            PeriodType::Annual,
            true,
        )
        .unwrap();
        assert_eq!(records.len(), 1);

        cols.acceptance_date_time[0] = "2017-01-01T00:00:00".into();
        cols.filing_date[0] = "2017-01-01".into();
        let records = parse_columns(
            &cols,
            &Cik::new("320193"),
            &Ticker::new("AAPL"),
            d(2016, 12, 31),
            PeriodType::Annual,
            true,
        )
        .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn form_filter_respects_period_type() {
        let records = parse(d(2016, 12, 31), PeriodType::Quarterly, true);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].form_type, FormType::QuarterlyReport);
        // 8-K never qualifies for either period type
        assert!(records.iter().all(|r| r.accession != "0000320193-16-000060"));
    }

    #[test]
    fn amendments_can_be_excluded() {
        let mut cols = columns();
        cols.form[1] = "10-K/A".into();
        cols.acceptance_date_time[1] = "2016-12-01T10:00:00".into();
        cols.filing_date[1] = "2016-12-01".into();
        cols.report_date[1] = "2016-09-24".into();

        let with = parse_columns(
            &cols,
            &Cik::new("320193"),
            &Ticker::new("AAPL"),
            d(2016, 12, 31),
            PeriodType::Annual,
            true,
        )
        .unwrap();
        assert_eq!(with.len(), 2);

        let without = parse_columns(
            &cols,
            &Cik::new("320193"),
            &Ticker::new("AAPL"),
            d(2016, 12, 31),
            PeriodType::Annual,
            false,
        )
        .unwrap();
        assert_eq!(without.len(), 1);
        assert_eq!(without[0].form_type, FormType::AnnualReport);
    }

    #[test]
    fn missing_acceptance_falls_back_to_end_of_filing_day() {
        let mut cols = columns();
        cols.acceptance_date_time[0] = String::new();
        let records = parse_columns(
            &cols,
            &Cik::new("320193"),
            &Ticker::new("AAPL"),
            d(2016, 12, 31),
            PeriodType::Annual,
            true,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].acceptance_datetime,
            d(2016, 10, 26).and_hms_opt(23, 59, 59).unwrap()
        );
    }

    #[test]
    fn submissions_json_shape_parses() {
        let json = r#"{
            "cik": "320193",
            "name": "Apple Inc.",
            "filings": {
                "recent": {
                    "accessionNumber": ["0000320193-16-000070"],
                    "form": ["10-K"],
                    "filingDate": ["2016-10-26"],
                    "acceptanceDateTime": ["2016-10-26T16:32:23.000Z"],
                    "reportDate": ["2016-09-24"]
                },
                "files": [
                    {"name": "CIK0000320193-submissions-001.json",
                     "filingFrom": "1994-01-26", "filingTo": "2010-12-31"}
                ]
            }
        }"#;
        let parsed: Submissions = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.filings.recent.form, vec!["10-K"]);
        assert_eq!(parsed.filings.files.len(), 1);
        assert_eq!(
            parsed.filings.files[0].filing_from.as_deref(),
            Some("1994-01-26")
        );
    }
}
