//! Mock Report Service.

use crate::error::ServiceError;
use crate::policy::status_is_mutable;
use crate::service::{CreatedReport, NewReport, ReportService, ServiceFuture, ServiceResult};
use crate::types::{Report, ReportChanges, ReportId, ReportStatus, UserId};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

/// Report Service operation, for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `fetch_all`
    FetchAll,
    /// `fetch_for_user`
    FetchForUser,
    /// `create`
    Create,
    /// `update`
    Update,
    /// `set_status`
    SetStatus,
    /// `delete`
    Delete,
}

/// A call received by the mock, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    /// `fetch_all()`
    FetchAll,
    /// `fetch_for_user(user_id)`
    FetchForUser(UserId),
    /// `create(report)`
    Create(NewReport),
    /// `update(id, changes)`
    Update(ReportId, ReportChanges),
    /// `set_status(id, status)`
    SetStatus(ReportId, ReportStatus),
    /// `delete(id)`
    Delete(ReportId),
}

impl ServiceCall {
    /// Operation this call belongs to
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::FetchAll => Operation::FetchAll,
            Self::FetchForUser(_) => Operation::FetchForUser,
            Self::Create(_) => Operation::Create,
            Self::Update(..) => Operation::Update,
            Self::SetStatus(..) => Operation::SetStatus,
            Self::Delete(_) => Operation::Delete,
        }
    }
}

#[derive(Debug, Default)]
struct Backend {
    reports: Vec<(UserId, Report)>,
    next_id: u64,
    failures: HashMap<Operation, VecDeque<ServiceError>>,
    calls: Vec<ServiceCall>,
}

impl Backend {
    fn find(&mut self, id: &ReportId) -> ServiceResult<&mut Report> {
        self.reports
            .iter_mut()
            .map(|(_, report)| report)
            .find(|report| report.id == *id)
            .ok_or_else(|| ServiceError::Rejected {
                status: 404,
                message: "Report not found".to_string(),
            })
    }

    fn injected_failure(&mut self, operation: Operation) -> ServiceResult<()> {
        match self.failures.get_mut(&operation).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn handle(&mut self, call: ServiceCall) -> ServiceResult<Answer> {
        self.injected_failure(call.operation())?;

        match call {
            ServiceCall::FetchAll => Ok(Answer::Reports(
                self.reports.iter().map(|(_, report)| report.clone()).collect(),
            )),
            ServiceCall::FetchForUser(user_id) => Ok(Answer::Reports(
                self.reports
                    .iter()
                    .filter(|(owner, _)| *owner == user_id)
                    .map(|(_, report)| report.clone())
                    .collect(),
            )),
            ServiceCall::Create(request) => {
                self.next_id += 1;
                let id = ReportId::new(self.next_id.to_string());
                let owner = request.user_id.clone();
                self.reports.push((owner, request.into_report(id.clone())));
                Ok(Answer::Created(CreatedReport { id }))
            },
            ServiceCall::Update(id, changes) => {
                let report = self.find(&id)?;
                if !status_is_mutable(report.status) {
                    return Err(ServiceError::Rejected {
                        status: 403,
                        message: "Report can no longer be modified".to_string(),
                    });
                }
                report.apply(&changes);
                Ok(Answer::Done)
            },
            ServiceCall::SetStatus(id, status) => {
                self.find(&id)?.status = status;
                Ok(Answer::Done)
            },
            ServiceCall::Delete(id) => {
                if !status_is_mutable(self.find(&id)?.status) {
                    return Err(ServiceError::Rejected {
                        status: 403,
                        message: "Report can no longer be deleted".to_string(),
                    });
                }
                self.reports.retain(|(_, report)| report.id != id);
                Ok(Answer::Done)
            },
        }
    }
}

enum Answer {
    Reports(Vec<Report>),
    Created(CreatedReport),
    Done,
}

/// Releases responses held back by a gated [`MockReportService`]
#[derive(Debug, Clone)]
pub struct MockGate(Arc<Semaphore>);

impl MockGate {
    /// Let `count` more responses through
    pub fn release(&self, count: usize) {
        self.0.add_permits(count);
    }

    /// Let every current and future response through
    pub fn open(&self) {
        self.0.close();
    }
}

/// Mock Report Service.
///
/// Keeps reports in memory and behaves like the real service: it assigns
/// ids, answers fetches per owner and refuses to modify reports that left
/// the editable statuses. Calls are recorded when they are made, before
/// any answer. A gated instance holds every answer until the gate releases
/// it, so tests can observe state while a call is outstanding.
#[derive(Debug, Clone, Default)]
pub struct MockReportService {
    backend: Arc<Mutex<Backend>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockReportService {
    /// Create an empty, ungated service
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service whose answers wait for the returned gate
    #[must_use]
    pub fn gated() -> (Self, MockGate) {
        let semaphore = Arc::new(Semaphore::new(0));
        let service = Self {
            backend: Arc::default(),
            gate: Some(Arc::clone(&semaphore)),
        };
        (service, MockGate(semaphore))
    }

    /// Add reports owned by `owner`
    #[must_use]
    pub fn with_reports(self, owner: &UserId, reports: impl IntoIterator<Item = Report>) -> Self {
        {
            let mut backend = self.lock();
            for report in reports {
                backend.reports.push((owner.clone(), report));
            }
        }
        self
    }

    /// Make the next call of `operation` fail with `error`
    pub fn fail_next(&self, operation: Operation, error: ServiceError) {
        self.lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Calls received so far
    #[must_use]
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.lock().calls.clone()
    }

    /// Reports as the service currently holds them
    #[must_use]
    pub fn reports(&self) -> Vec<Report> {
        self.lock()
            .reports
            .iter()
            .map(|(_, report)| report.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn call(&self, call: ServiceCall) -> ServiceFuture<Answer> {
        self.lock().calls.push(call.clone());

        let backend = Arc::clone(&self.backend);
        let gate = self.gate.clone();
        Box::pin(async move {
            if let Some(gate) = gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            backend
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .handle(call)
        })
    }

    fn call_done(&self, call: ServiceCall) -> ServiceFuture<()> {
        let answer = self.call(call);
        Box::pin(async move { answer.await.map(|_| ()) })
    }
}

impl ReportService for MockReportService {
    fn fetch_all(&self) -> ServiceFuture<Vec<Report>> {
        let answer = self.call(ServiceCall::FetchAll);
        Box::pin(async move {
            match answer.await? {
                Answer::Reports(reports) => Ok(reports),
                _ => Ok(Vec::new()),
            }
        })
    }

    fn fetch_for_user(&self, user_id: &UserId) -> ServiceFuture<Vec<Report>> {
        let answer = self.call(ServiceCall::FetchForUser(user_id.clone()));
        Box::pin(async move {
            match answer.await? {
                Answer::Reports(reports) => Ok(reports),
                _ => Ok(Vec::new()),
            }
        })
    }

    fn create(&self, report: &NewReport) -> ServiceFuture<CreatedReport> {
        let answer = self.call(ServiceCall::Create(report.clone()));
        Box::pin(async move {
            match answer.await? {
                Answer::Created(created) => Ok(created),
                _ => Err(ServiceError::Decode("create answered without an id".to_string())),
            }
        })
    }

    fn update(&self, id: &ReportId, changes: &ReportChanges) -> ServiceFuture<()> {
        self.call_done(ServiceCall::Update(id.clone(), changes.clone()))
    }

    fn set_status(&self, id: &ReportId, status: ReportStatus) -> ServiceFuture<()> {
        self.call_done(ServiceCall::SetStatus(id.clone(), status))
    }

    fn delete(&self, id: &ReportId) -> ServiceFuture<()> {
        self.call_done(ServiceCall::Delete(id.clone()))
    }
}
