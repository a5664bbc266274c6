//! Headline statistics over the cleaned table.

use crate::dataset::{Record, STUDY_CUTOFF_DAY, Sex, Status};

/// Counts the dashboard's summary panel reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSummary {
    pub total: usize,
    pub alive: usize,
    pub deceased: usize,
    pub men: usize,
    pub women: usize,
    /// Deceased records whose death date falls on the study cutoff day, as
    /// opposed to alive records carrying the cutoff as a sentinel.
    pub last_day_deaths: usize,
}

impl DatasetSummary {
    pub fn compute(records: &[Record]) -> Self {
        let alive = records.iter().filter(|r| r.status == Status::Alive).count();
        let men = records.iter().filter(|r| r.sex == Sex::Male).count();
        let last_day_deaths = records
            .iter()
            .filter(|r| r.status == Status::Deceased && r.date_of_death == STUDY_CUTOFF_DAY)
            .count();
        DatasetSummary {
            total: records.len(),
            alive,
            deceased: records.len() - alive,
            men,
            women: records.len() - men,
            last_day_deaths,
        }
    }

    pub fn render_rows(&self) -> Vec<Vec<String>> {
        let row = |metric: &str, value: usize| vec![metric.to_string(), value.to_string()];
        vec![
            row("patients", self.total),
            row("alive at study cutoff", self.alive),
            row("deceased", self.deceased),
            row("men", self.men),
            row("women", self.women),
            row("deaths on last study day", self.last_day_deaths),
        ]
    }
}
