//! Client-side report collection.
//!
//! An ordered sequence keyed by report id. Every operation is synchronous
//! and total: patching or removing an id that is not present does nothing.

use crate::types::{Report, ReportChanges, ReportId};

/// Reports known to one mounted view, in service order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportStore {
    reports: Vec<Report>,
}

impl ReportStore {
    /// Create an empty store
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reports: Vec::new(),
        }
    }

    /// Replace the whole collection with a fetch result
    ///
    /// Should the service list an id twice, the later entry wins and keeps
    /// the earlier position.
    pub fn load(&mut self, reports: Vec<Report>) {
        self.reports.clear();
        for report in reports {
            self.insert(report);
        }
    }

    /// Add a report with a service-confirmed id
    ///
    /// An id already present is replaced in place.
    pub fn insert(&mut self, report: Report) {
        match self.position(&report.id) {
            Some(index) => self.reports[index] = report,
            None => self.reports.push(report),
        }
    }

    /// Merge confirmed changes into a report. Returns whether it was present.
    pub fn patch(&mut self, id: &ReportId, changes: &ReportChanges) -> bool {
        self.reports
            .iter_mut()
            .find(|report| report.id == *id)
            .map(|report| report.apply(changes))
            .is_some()
    }

    /// Drop a report, returning it if it was present
    pub fn remove(&mut self, id: &ReportId) -> Option<Report> {
        self.position(id).map(|index| self.reports.remove(index))
    }

    /// Look up a report
    #[must_use]
    pub fn get(&self, id: &ReportId) -> Option<&Report> {
        self.reports.iter().find(|report| report.id == *id)
    }

    /// Whether `id` is present
    #[must_use]
    pub fn contains(&self, id: &ReportId) -> bool {
        self.position(id).is_some()
    }

    /// Reports in store order
    pub fn iter(&self) -> std::slice::Iter<'_, Report> {
        self.reports.iter()
    }

    /// Reports as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[Report] {
        &self.reports
    }

    /// Number of reports
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// True when the store holds no report
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    fn position(&self, id: &ReportId) -> Option<usize> {
        self.reports.iter().position(|report| report.id == *id)
    }
}

impl<'a> IntoIterator for &'a ReportStore {
    type Item = &'a Report;
    type IntoIter = std::slice::Iter<'a, Report>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Report> for ReportStore {
    fn from_iter<I: IntoIterator<Item = Report>>(iter: I) -> Self {
        let mut store = Self::new();
        store.load(iter.into_iter().collect());
        store
    }
}
