//! View-state model, chart specifications, and figure selection.
//!
//! [`select()`] is a stateless pure mapping from `(view_state, table)` to a
//! [`ChartSpec`]. Invalid view-states are unrepresentable once a
//! [`ViewState`] exists; the string boundary the UI collaborator calls is
//! [`ViewState::from_request()`], which rejects unknown tokens with
//! [`UnknownViewStateError`] instead of falling back to a default figure.

use itertools::Itertools;
use serde::Serialize;

use crate::{
    dataset::{Record, Region, Sex},
    error::UnknownViewStateError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Histogram,
    Pie,
    Scatter,
}

/// Payload of one named series. Histograms carry the raw sample values
/// (binning is the renderer's concern), pies carry per-label counts, and
/// scatters carry explicit points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesData {
    Values(Vec<i64>),
    Slices(Vec<(String, u64)>),
    Points(Vec<(i64, i64)>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: String,
    pub data: SeriesData,
}

impl Series {
    fn new(name: &str, data: SeriesData) -> Self {
        Series {
            name: name.to_string(),
            data,
        }
    }
}

/// A complete renderer-agnostic figure description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
    pub stacked: bool,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    AgeDistribution,
    ByRegion,
    DaysLived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionFilter {
    /// Patient counts across all regions.
    All,
    /// Transmission-mode breakdown over all regions.
    AllModes,
    /// Transmission-mode breakdown restricted to one region.
    Region(Region),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub category: Category,
    pub split_by_sex: bool,
    pub region_filter: RegionFilter,
}

impl ViewState {
    /// Builds a view-state from the UI's wire tokens. Unknown tokens fail
    /// loudly; there is no default figure.
    pub fn from_request(
        category: &str,
        split_by_sex: bool,
        region_filter: &str,
    ) -> Result<Self, UnknownViewStateError> {
        let category = match category {
            "age-distribution" => Category::AgeDistribution,
            "by-region" => Category::ByRegion,
            "days-lived" => Category::DaysLived,
            other => return Err(UnknownViewStateError::Category(other.to_string())),
        };
        let region_filter = match region_filter {
            "all" => RegionFilter::All,
            "all-modes" => RegionFilter::AllModes,
            "nsw" => RegionFilter::Region(Region::NewSouthWales),
            "qld" => RegionFilter::Region(Region::Queensland),
            "vic" => RegionFilter::Region(Region::Victoria),
            "other" => RegionFilter::Region(Region::Others),
            other => return Err(UnknownViewStateError::RegionFilter(other.to_string())),
        };
        Ok(ViewState {
            category,
            split_by_sex,
            region_filter,
        })
    }
}

/// Maps a view-state and the cleaned table to one figure. Deterministic:
/// identical inputs always produce an identical spec.
pub fn select(view: &ViewState, records: &[Record]) -> ChartSpec {
    match view.category {
        Category::AgeDistribution => age_histogram(records, view.split_by_sex),
        Category::ByRegion => match view.region_filter {
            RegionFilter::All => region_pie(records),
            RegionFilter::AllModes => transmission_pie(records, None),
            RegionFilter::Region(region) => transmission_pie(records, Some(region)),
        },
        Category::DaysLived => days_lived_scatter(records),
    }
}

fn age_histogram(records: &[Record], split_by_sex: bool) -> ChartSpec {
    let ages_of = |sex: Option<Sex>| {
        records
            .iter()
            .filter(|r| sex.is_none_or(|s| r.sex == s))
            .map(|r| r.age_at_diagnosis)
            .collect::<Vec<_>>()
    };
    let (title, stacked, series) = if split_by_sex {
        (
            "Age Distribution between Men and Women",
            true,
            vec![
                Series::new("men", SeriesData::Values(ages_of(Some(Sex::Male)))),
                Series::new("women", SeriesData::Values(ages_of(Some(Sex::Female)))),
            ],
        )
    } else {
        (
            "Age Distribution",
            false,
            vec![Series::new("patient count", SeriesData::Values(ages_of(None)))],
        )
    };
    ChartSpec {
        kind: ChartKind::Histogram,
        title: title.to_string(),
        x_label: Some("Age at Diagnosis".to_string()),
        y_label: Some("Number of Patients".to_string()),
        stacked,
        series,
    }
}

fn region_pie(records: &[Record]) -> ChartSpec {
    let slices = count_slices(records.iter().map(|r| r.region.label()));
    pie_spec(
        "Number of Patients in Australian States",
        Series::new("patients", SeriesData::Slices(slices)),
    )
}

fn transmission_pie(records: &[Record], region: Option<Region>) -> ChartSpec {
    let slices = count_slices(
        records
            .iter()
            .filter(|r| region.is_none_or(|want| r.region == want))
            .map(|r| r.transmission_mode.label()),
    );
    let title = match region {
        None => "Modes of Transmission in Australia".to_string(),
        Some(Region::Others) => "Modes of Transmission in other states".to_string(),
        Some(region) => format!("Modes of Transmission in {}", region.label()),
    };
    pie_spec(&title, Series::new("patients", SeriesData::Slices(slices)))
}

/// Counts occurrences per label, ordered by descending count with ties
/// broken by ascending label. A selection matching zero records yields zero
/// slices rather than an error.
fn count_slices<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(String, u64)> {
    labels
        .counts()
        .into_iter()
        .map(|(label, count)| (label.to_string(), count as u64))
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

fn pie_spec(title: &str, series: Series) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Pie,
        title: title.to_string(),
        x_label: None,
        y_label: None,
        stacked: false,
        series: vec![series],
    }
}

fn days_lived_scatter(records: &[Record]) -> ChartSpec {
    let points = records
        .iter()
        .map(|r| (r.age_at_diagnosis, r.days_after_diagnosis))
        .into_group_map()
        .into_iter()
        .map(|(age, days)| {
            let mean = days.iter().sum::<i64>() as f64 / days.len() as f64;
            (age, mean.round() as i64)
        })
        .sorted_by_key(|&(age, _)| age)
        .collect::<Vec<_>>();
    ChartSpec {
        kind: ChartKind::Scatter,
        title: "days patients lived by age group".to_string(),
        x_label: Some("Age at Diagnosis".to_string()),
        y_label: Some("Days lived".to_string()),
        stacked: false,
        series: vec![Series::new("mean days lived", SeriesData::Points(points))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Status, Transmission};

    fn record(region: Region, sex: Sex, age: i64, days: i64) -> Record {
        Record {
            region,
            sex,
            date_of_diagnosis: 10000,
            date_of_death: 10000 + days,
            days_after_diagnosis: days,
            status: Status::Deceased,
            transmission_mode: Transmission::HomosexualContact,
            age_at_diagnosis: age,
        }
    }

    #[test]
    fn from_request_rejects_unknown_tokens() {
        assert_eq!(
            ViewState::from_request("bar-chart", false, "all").unwrap_err(),
            UnknownViewStateError::Category("bar-chart".to_string())
        );
        assert_eq!(
            ViewState::from_request("by-region", false, "unknown-region").unwrap_err(),
            UnknownViewStateError::RegionFilter("unknown-region".to_string())
        );
    }

    #[test]
    fn split_histogram_carries_one_series_per_sex() {
        let records = vec![
            record(Region::NewSouthWales, Sex::Male, 35, 100),
            record(Region::NewSouthWales, Sex::Female, 30, 90),
            record(Region::Victoria, Sex::Male, 41, 200),
        ];
        let view = ViewState::from_request("age-distribution", true, "all").unwrap();
        let spec = select(&view, &records);

        assert_eq!(spec.kind, ChartKind::Histogram);
        assert!(spec.stacked);
        assert_eq!(spec.series.len(), 2);
        assert_eq!(spec.series[0].name, "men");
        assert_eq!(spec.series[0].data, SeriesData::Values(vec![35, 41]));
        assert_eq!(spec.series[1].data, SeriesData::Values(vec![30]));
    }

    #[test]
    fn region_pie_orders_slices_by_count_then_label() {
        let records = vec![
            record(Region::Victoria, Sex::Male, 35, 100),
            record(Region::Victoria, Sex::Male, 36, 100),
            record(Region::NewSouthWales, Sex::Male, 37, 100),
            record(Region::Queensland, Sex::Female, 38, 100),
        ];
        let view = ViewState::from_request("by-region", false, "all").unwrap();
        let spec = select(&view, &records);

        let SeriesData::Slices(slices) = &spec.series[0].data else {
            panic!("expected pie slices");
        };
        assert_eq!(
            slices,
            &vec![
                ("Victoria".to_string(), 2),
                ("New South Wales".to_string(), 1),
                ("Queensland".to_string(), 1),
            ]
        );
        let total: u64 = slices.iter().map(|(_, n)| n).sum();
        assert_eq!(total, records.len() as u64);
    }

    #[test]
    fn empty_region_filter_yields_zero_slices() {
        let records = vec![record(Region::Victoria, Sex::Male, 35, 100)];
        let view = ViewState::from_request("by-region", false, "qld").unwrap();
        let spec = select(&view, &records);

        assert_eq!(spec.kind, ChartKind::Pie);
        assert_eq!(spec.series[0].data, SeriesData::Slices(Vec::new()));
    }

    #[test]
    fn scatter_averages_days_per_distinct_age() {
        let records = vec![
            record(Region::Victoria, Sex::Male, 30, 100),
            record(Region::Victoria, Sex::Male, 30, 200),
            record(Region::Victoria, Sex::Female, 30, 300),
            record(Region::NewSouthWales, Sex::Male, 25, 50),
        ];
        let view = ViewState::from_request("days-lived", false, "all").unwrap();
        let spec = select(&view, &records);

        assert_eq!(spec.kind, ChartKind::Scatter);
        assert_eq!(
            spec.series[0].data,
            SeriesData::Points(vec![(25, 50), (30, 200)])
        );
    }

    #[test]
    fn select_is_deterministic_down_to_json_bytes() {
        let records = vec![
            record(Region::Victoria, Sex::Male, 30, 100),
            record(Region::Others, Sex::Female, 44, 310),
            record(Region::Queensland, Sex::Male, 52, 75),
        ];
        for request in [
            ("age-distribution", false, "all"),
            ("age-distribution", true, "all"),
            ("by-region", false, "all"),
            ("by-region", false, "all-modes"),
            ("by-region", false, "vic"),
            ("days-lived", false, "all"),
        ] {
            let view = ViewState::from_request(request.0, request.1, request.2).unwrap();
            let first = select(&view, &records);
            let second = select(&view, &records);
            assert_eq!(first, second);
            assert_eq!(
                serde_json::to_vec(&first).unwrap(),
                serde_json::to_vec(&second).unwrap()
            );
        }
    }

    #[test]
    fn region_titles_match_the_dashboard_captions() {
        let records: Vec<Record> = Vec::new();
        let cases = [
            ("all", "Number of Patients in Australian States"),
            ("all-modes", "Modes of Transmission in Australia"),
            ("nsw", "Modes of Transmission in New South Wales"),
            ("vic", "Modes of Transmission in Victoria"),
            ("qld", "Modes of Transmission in Queensland"),
            ("other", "Modes of Transmission in other states"),
        ];
        for (token, title) in cases {
            let view = ViewState::from_request("by-region", false, token).unwrap();
            assert_eq!(select(&view, &records).title, title);
        }
    }
}
