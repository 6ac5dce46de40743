//! Tests de integración para el scheduler
//! tests/integration_test.rs
//!
//! Ejercitan el pool completo: prioridades, FIFO por nivel, cancelación,
//! aislamiento de fallos y la barrera de shutdown.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use job_scheduler::jobs::types::null_sink;
use job_scheduler::jobs::{
    Job, JobCore, JobError, JobKind, JobObserver, JobPriority, JobRef, JobScheduler, JobStatus,
    SchedulerConfig,
};

/// Helper: scheduler de prueba con backoff corto y sin afinidad
fn test_scheduler(workers: usize) -> JobScheduler {
    let config = SchedulerConfig {
        workers,
        backoff_ms: 10,
        pin_workers: false,
    };
    JobScheduler::new(config, null_sink()).unwrap()
}

/// Helper: job de ordenamiento chico
fn sort_job() -> JobRef {
    JobKind::QuickSort.create(vec![5, 3, 8, 1, 9, 2], null_sink())
}

/// Helper: espera hasta que `cond` sea verdadera o venza el timeout
fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}

fn all_terminal(jobs: &[JobRef]) -> bool {
    jobs.iter().all(|job| job.status().is_terminal())
}

/// Observer que acumula (evento, job_id) en orden de llegada
struct EventRecorder {
    events: Mutex<Vec<(&'static str, String)>>,
}

impl EventRecorder {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    fn events(&self) -> Vec<(&'static str, String)> {
        self.events.lock().unwrap().clone()
    }

    fn started_order(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(event, _)| *event == "started")
            .map(|(_, id)| id)
            .collect()
    }
}

impl JobObserver for EventRecorder {
    fn job_started(&self, job: &JobRef) {
        self.events
            .lock()
            .unwrap()
            .push(("started", job.id().to_string()));
    }

    fn job_completed(&self, job: &JobRef) {
        self.events
            .lock()
            .unwrap()
            .push(("completed", job.id().to_string()));
    }

    fn job_failed(&self, job: &JobRef, _error: &JobError) {
        self.events
            .lock()
            .unwrap()
            .push(("failed", job.id().to_string()));
    }
}

/// Job de prueba que duerme un rato antes de terminar
struct SlowJob {
    core: JobCore,
    delay: Duration,
}

impl SlowJob {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            core: JobCore::new("Slow Job", 1, Vec::new(), null_sink()),
            delay,
        })
    }
}

impl Job for SlowJob {
    fn core(&self) -> &JobCore {
        &self.core
    }

    fn execute(&self) -> Result<(), JobError> {
        let start = Instant::now();
        thread::sleep(self.delay);
        self.core.record_execution(start.elapsed());
        Ok(())
    }
}

/// Job de prueba que siempre reporta falla
struct FailingJob {
    core: JobCore,
}

impl FailingJob {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            core: JobCore::new("Failing Job", 1, Vec::new(), null_sink()),
        })
    }
}

impl Job for FailingJob {
    fn core(&self) -> &JobCore {
        &self.core
    }

    fn execute(&self) -> Result<(), JobError> {
        Err(JobError::ExecutionFailed("boom".to_string()))
    }
}

/// Job de prueba que hace panic en pleno execute
struct PanickingJob {
    core: JobCore,
}

impl PanickingJob {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            core: JobCore::new("Panicking Job", 1, Vec::new(), null_sink()),
        })
    }
}

impl Job for PanickingJob {
    fn core(&self) -> &JobCore {
        &self.core
    }

    fn execute(&self) -> Result<(), JobError> {
        panic!("deliberate test panic");
    }
}

// ==================== Ejecución End-to-End ====================

#[test]
fn test_pool_executes_submitted_jobs() {
    let scheduler = test_scheduler(2);
    scheduler.start().unwrap();

    let jobs: Vec<JobRef> = (0..4)
        .map(|i| {
            let kind = if i % 2 == 0 {
                JobKind::BubbleSort
            } else {
                JobKind::QuickSort
            };
            let job = kind.create(vec![5, 3, 8, 1, 9, 2], null_sink());
            scheduler.add_job(Arc::clone(&job), JobPriority::Medium);
            job
        })
        .collect();

    assert!(wait_until(Duration::from_secs(5), || all_terminal(&jobs)));

    for job in &jobs {
        assert_eq!(job.status(), JobStatus::Done);
        assert_eq!(job.data(), vec![1, 2, 3, 5, 8, 9]);
        assert_eq!(job.profiling().execution_count, 1);
    }
    assert_eq!(scheduler.pending_jobs(), 0);

    scheduler.stop();
}

#[test]
fn test_started_precedes_completed_for_each_job() {
    let scheduler = test_scheduler(2);
    let recorder = EventRecorder::new();
    scheduler.register_observer(recorder.clone());
    scheduler.start().unwrap();

    let jobs: Vec<JobRef> = (0..3)
        .map(|_| {
            let job = sort_job();
            scheduler.add_job(Arc::clone(&job), JobPriority::High);
            job
        })
        .collect();

    assert!(wait_until(Duration::from_secs(5), || all_terminal(&jobs)));
    scheduler.stop();

    let events = recorder.events();
    for job in &jobs {
        let started = events
            .iter()
            .position(|(event, id)| *event == "started" && id == job.id());
        let completed = events
            .iter()
            .position(|(event, id)| *event == "completed" && id == job.id());
        assert!(started.is_some(), "missing started event for {}", job.id());
        assert!(completed.is_some(), "missing completed event for {}", job.id());
        assert!(started < completed);
    }
}

// ==================== Prioridades y Orden FIFO ====================

#[test]
fn test_priority_ordering_observed_by_single_worker() {
    // Todo se encola antes de start(): con un solo worker el orden de
    // started es exactamente el orden de reclamo de la cola
    let scheduler = test_scheduler(1);
    let recorder = EventRecorder::new();
    scheduler.register_observer(recorder.clone());

    let low_a = sort_job();
    let low_b = sort_job();
    let medium = sort_job();
    let high_a = sort_job();
    let high_b = sort_job();

    scheduler.add_job(Arc::clone(&low_a), JobPriority::Low);
    scheduler.add_job(Arc::clone(&low_b), JobPriority::Low);
    scheduler.add_job(Arc::clone(&medium), JobPriority::Medium);
    scheduler.add_job(Arc::clone(&high_a), JobPriority::High);
    scheduler.add_job(Arc::clone(&high_b), JobPriority::High);

    scheduler.start().unwrap();

    let jobs = [
        Arc::clone(&low_a),
        Arc::clone(&low_b),
        Arc::clone(&medium),
        Arc::clone(&high_a),
        Arc::clone(&high_b),
    ];
    assert!(wait_until(Duration::from_secs(5), || all_terminal(&jobs)));
    scheduler.stop();

    let expected = vec![
        high_a.id().to_string(),
        high_b.id().to_string(),
        medium.id().to_string(),
        low_a.id().to_string(),
        low_b.id().to_string(),
    ];
    assert_eq!(recorder.started_order(), expected);
}

#[test]
fn test_fifo_within_priority_level() {
    let scheduler = test_scheduler(1);
    let recorder = EventRecorder::new();
    scheduler.register_observer(recorder.clone());

    let jobs: Vec<JobRef> = (0..4)
        .map(|_| {
            let job = sort_job();
            scheduler.add_job(Arc::clone(&job), JobPriority::Medium);
            job
        })
        .collect();

    scheduler.start().unwrap();
    assert!(wait_until(Duration::from_secs(5), || all_terminal(&jobs)));
    scheduler.stop();

    let expected: Vec<String> = jobs.iter().map(|job| job.id().to_string()).collect();
    assert_eq!(recorder.started_order(), expected);
}

// ==================== Contador de Pendientes ====================

#[test]
fn test_pending_count_tracks_queue() {
    let scheduler = test_scheduler(2);

    let jobs: Vec<JobRef> = (0..5)
        .map(|_| {
            let job = sort_job();
            scheduler.add_job(Arc::clone(&job), JobPriority::Low);
            job
        })
        .collect();
    assert_eq!(scheduler.pending_jobs(), 5);

    assert!(scheduler.cancel_job(&jobs[0]));
    assert_eq!(scheduler.pending_jobs(), 4);

    scheduler.start().unwrap();
    assert!(wait_until(Duration::from_secs(5), || {
        scheduler.pending_jobs() == 0
    }));
    scheduler.stop();
}

// ==================== Cancelación ====================

#[test]
fn test_cancel_queued_job_never_executes() {
    let scheduler = test_scheduler(1);

    let keep = sort_job();
    let cancel = sort_job();
    scheduler.add_job(Arc::clone(&keep), JobPriority::Medium);
    scheduler.add_job(Arc::clone(&cancel), JobPriority::Medium);

    assert!(scheduler.cancel_job(&cancel));
    assert_eq!(cancel.status(), JobStatus::Canceled);

    scheduler.start().unwrap();
    assert!(wait_until(Duration::from_secs(5), || {
        keep.status().is_terminal()
    }));
    scheduler.stop();

    assert_eq!(keep.status(), JobStatus::Done);
    assert_eq!(cancel.status(), JobStatus::Canceled);
    assert_eq!(cancel.profiling().execution_count, 0);

    // Un job ya cancelado no puede cancelarse de nuevo
    assert!(!scheduler.cancel_job(&cancel));
}

#[test]
fn test_cancel_running_job_fails() {
    let scheduler = test_scheduler(1);
    scheduler.start().unwrap();

    let slow: JobRef = SlowJob::new(Duration::from_millis(300));
    scheduler.add_job(Arc::clone(&slow), JobPriority::High);

    // Esperar a que el worker lo reclame
    assert!(wait_until(Duration::from_secs(2), || {
        slow.status() == JobStatus::Running
    }));

    // Ya reclamado: corre hasta terminar
    assert!(!scheduler.cancel_job(&slow));

    assert!(wait_until(Duration::from_secs(2), || {
        slow.status().is_terminal()
    }));
    assert_eq!(slow.status(), JobStatus::Done);

    scheduler.stop();
}

#[test]
fn test_cancel_completed_job_fails() {
    let scheduler = test_scheduler(1);
    scheduler.start().unwrap();

    let job = sort_job();
    scheduler.add_job(Arc::clone(&job), JobPriority::High);
    assert!(wait_until(Duration::from_secs(5), || {
        job.status().is_terminal()
    }));

    assert!(!scheduler.cancel_job(&job));
    assert_eq!(job.status(), JobStatus::Done);

    scheduler.stop();
}

// ==================== Aislamiento de Fallos ====================

#[test]
fn test_failing_job_does_not_kill_worker() {
    let scheduler = test_scheduler(1);
    let recorder = EventRecorder::new();
    scheduler.register_observer(recorder.clone());

    let failing: JobRef = FailingJob::new();
    let after: JobRef = sort_job();
    scheduler.add_job(Arc::clone(&failing), JobPriority::Medium);
    scheduler.add_job(Arc::clone(&after), JobPriority::Medium);

    scheduler.start().unwrap();
    let jobs = [Arc::clone(&failing), Arc::clone(&after)];
    assert!(wait_until(Duration::from_secs(5), || all_terminal(&jobs)));
    scheduler.stop();

    // El job fallido queda en Error y el worker sigue procesando
    assert_eq!(failing.status(), JobStatus::Error);
    assert_eq!(after.status(), JobStatus::Done);

    let events = recorder.events();
    assert!(events.contains(&("failed", failing.id().to_string())));
    assert!(events.contains(&("completed", after.id().to_string())));
}

#[test]
fn test_panicking_job_is_contained() {
    let scheduler = test_scheduler(1);

    let panicking: JobRef = PanickingJob::new();
    let after: JobRef = sort_job();
    scheduler.add_job(Arc::clone(&panicking), JobPriority::Medium);
    scheduler.add_job(Arc::clone(&after), JobPriority::Medium);

    scheduler.start().unwrap();
    let jobs = [Arc::clone(&panicking), Arc::clone(&after)];
    assert!(wait_until(Duration::from_secs(5), || all_terminal(&jobs)));
    scheduler.stop();

    assert_eq!(panicking.status(), JobStatus::Error);
    assert_eq!(after.status(), JobStatus::Done);
}

// ==================== Barrera de Shutdown ====================

#[test]
fn test_stop_waits_for_in_flight_job() {
    let scheduler = test_scheduler(1);
    scheduler.start().unwrap();

    let slow: JobRef = SlowJob::new(Duration::from_millis(200));
    scheduler.add_job(Arc::clone(&slow), JobPriority::High);

    assert!(wait_until(Duration::from_secs(2), || {
        slow.status() == JobStatus::Running
    }));

    // stop() bloquea hasta que el job en vuelo termine
    scheduler.stop();
    assert_eq!(slow.status(), JobStatus::Done);
}

#[test]
fn test_no_execution_after_stop() {
    let scheduler = test_scheduler(2);
    scheduler.start().unwrap();
    scheduler.stop();

    let job = sort_job();
    scheduler.add_job(Arc::clone(&job), JobPriority::High);

    // Con el pool detenido nadie reclama el job
    thread::sleep(Duration::from_millis(150));
    assert_eq!(job.status(), JobStatus::Queued);
    assert_eq!(job.profiling().execution_count, 0);
    assert_eq!(scheduler.pending_jobs(), 1);

    // Un segundo stop() es inocuo
    scheduler.stop();
}

#[test]
fn test_stop_is_safe_without_start() {
    let scheduler = test_scheduler(2);
    scheduler.stop();
    scheduler.stop();
}

#[test]
fn test_queued_jobs_remain_cancelable_after_stop() {
    let scheduler = test_scheduler(1);
    scheduler.start().unwrap();
    scheduler.stop();

    let job = sort_job();
    scheduler.add_job(Arc::clone(&job), JobPriority::Low);
    assert_eq!(scheduler.pending_jobs(), 1);

    assert!(scheduler.cancel_job(&job));
    assert_eq!(job.status(), JobStatus::Canceled);
    assert_eq!(scheduler.pending_jobs(), 0);
}
