//! View filter.
//!
//! The projection is never stored: callers recompute it whenever the store,
//! the search term or the status facet changes.

use crate::types::{Report, StatusFacet};

/// Reports matching `term` (case-insensitive, title or description) and
/// `facet`, in store order
pub fn project<'a, I>(reports: I, term: &str, facet: StatusFacet) -> Vec<&'a Report>
where
    I: IntoIterator<Item = &'a Report>,
{
    let needle = term.to_lowercase();
    reports
        .into_iter()
        .filter(|report| facet.admits(report.status) && matches_term(report, &needle))
        .collect()
}

fn matches_term(report: &Report, needle: &str) -> bool {
    needle.is_empty()
        || report.title.to_lowercase().contains(needle)
        || report.description.to_lowercase().contains(needle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use crate::store::ReportStore;
    use crate::types::{ReportId, ReportStatus, ReportType};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn report(id: &str, status: ReportStatus, title: &str, description: &str) -> Report {
        Report {
            id: ReportId::new(id),
            report_type: ReportType::RedFlag,
            status,
            title: title.to_string(),
            description: description.to_string(),
            location: None,
            incident_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            report_date: None,
            images: Vec::new(),
        }
    }

    fn ids(reports: &[&Report]) -> Vec<String> {
        reports.iter().map(|r| r.id.to_string()).collect()
    }

    fn sample() -> ReportStore {
        [
            report("1", ReportStatus::Pending, "Pothole", "Main street"),
            report("2", ReportStatus::Resolved, "Bribery", "At the checkpoint"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_search_term_is_case_insensitive() {
        let store = sample();
        assert_eq!(ids(&project(&store, "bri", StatusFacet::All)), vec!["2"]);
        assert_eq!(ids(&project(&store, "POT", StatusFacet::All)), vec!["1"]);
    }

    #[test]
    fn test_search_matches_description() {
        let store = sample();
        assert_eq!(ids(&project(&store, "checkpoint", StatusFacet::All)), vec!["2"]);
    }

    #[test]
    fn test_status_facet() {
        let store = sample();
        assert_eq!(
            ids(&project(&store, "", StatusFacet::Only(ReportStatus::Pending))),
            vec!["1"]
        );
        assert!(project(&store, "bri", StatusFacet::Only(ReportStatus::Pending)).is_empty());
    }

    #[test]
    fn test_projection_leaves_store_untouched() {
        let store = sample();
        let before = store.clone();
        let _ = project(&store, "x", StatusFacet::Only(ReportStatus::Rejected));
        assert_eq!(store, before);
    }

    fn any_status() -> impl Strategy<Value = ReportStatus> {
        prop::sample::select(ReportStatus::SUBMITTED.to_vec())
    }

    fn any_store() -> impl Strategy<Value = ReportStore> {
        prop::collection::vec((any_status(), "[a-zA-Z ]{0,12}", "[a-zA-Z ]{0,12}"), 0..12).prop_map(
            |rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (status, title, description))| {
                        report(&i.to_string(), status, &title, &description)
                    })
                    .collect()
            },
        )
    }

    fn any_facet() -> impl Strategy<Value = StatusFacet> {
        prop_oneof![Just(StatusFacet::All), any_status().prop_map(StatusFacet::Only)]
    }

    proptest! {
        #[test]
        fn prop_empty_term_and_all_is_identity(store in any_store()) {
            let projected = project(&store, "", StatusFacet::All);
            let all: Vec<&Report> = store.iter().collect();
            prop_assert_eq!(projected, all);
        }

        #[test]
        fn prop_projection_is_idempotent(
            store in any_store(),
            term in "[a-zA-Z]{0,3}",
            facet in any_facet(),
        ) {
            let once = project(&store, &term, facet);
            let twice = project(once.iter().copied(), &term, facet);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_projection_preserves_store_order(
            store in any_store(),
            term in "[a-z]{0,2}",
            facet in any_facet(),
        ) {
            let positions: Vec<usize> = project(&store, &term, facet)
                .into_iter()
                .filter_map(|r| store.iter().position(|s| s.id == r.id))
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
