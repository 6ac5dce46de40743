//! # Scheduler con Pool de Workers
//! src/jobs/scheduler.rs
//!
//! Coordina la ejecución de jobs: pool fijo de threads, cola de
//! prioridades, cancelación, notificaciones y shutdown ordenado.
//!
//! Ciclo de vida del pool: `NotStarted → Running → Stopping → Stopped`.
//! `start()` es válido una sola vez; `stop()` es seguro aunque `start()`
//! nunca se haya llamado y bloquea hasta que todos los workers terminen.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;

use crate::jobs::job::{Job, JobError, JobRef};
use crate::jobs::notifier::{JobObserver, LifecycleNotifier};
use crate::jobs::queue::PriorityJobQueue;
use crate::jobs::types::{JobPriority, JobStatus, LogSink};

/// Error del scheduler
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Configuración inválida detectada en construcción
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// `start()` fuera del estado `NotStarted`
    #[error("scheduler can only be started once")]
    AlreadyStarted,
}

/// Configuración del scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Workers pedidos; el efectivo es min(pedidos, cores disponibles)
    pub workers: usize,

    /// Tiempo máximo de espera de un worker ocioso antes de re-chequear
    /// la señal de stop (milisegundos)
    pub backoff_ms: u64,

    /// Fijar cada worker a un core lógico (best-effort)
    pub pin_workers: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            backoff_ms: 100,
            pin_workers: false,
        }
    }
}

impl SchedulerConfig {
    /// Crea una configuración desde el Config principal
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            workers: config.workers,
            backoff_ms: config.backoff_ms,
            pin_workers: config.pin_workers,
        }
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }
        if self.backoff_ms == 0 {
            return Err("Backoff must be > 0 ms".to_string());
        }
        Ok(())
    }
}

/// Estado del pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    NotStarted,
    Running,
    Stopping,
    Stopped,
}

impl PoolState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolState::NotStarted => "notstarted",
            PoolState::Running => "running",
            PoolState::Stopping => "stopping",
            PoolState::Stopped => "stopped",
        }
    }
}

/// Scheduler de jobs con pool de workers de tamaño fijo
pub struct JobScheduler {
    config: SchedulerConfig,

    /// Cantidad efectiva de workers tras el clamp a los cores disponibles
    workers: usize,

    /// Cola compartida con los workers
    queue: PriorityJobQueue,

    /// Canal de notificaciones de ciclo de vida
    notifier: Arc<LifecycleNotifier>,

    /// Señal cooperativa de stop para todos los workers
    stop_flag: Arc<AtomicBool>,

    /// Estado del pool
    state: Mutex<PoolState>,

    /// Handles de los workers, para el join-all del shutdown
    handles: Mutex<Vec<JoinHandle<()>>>,

    /// Sink de logging inyectado
    log: LogSink,
}

impl JobScheduler {
    /// Crea un scheduler validando la configuración
    pub fn new(config: SchedulerConfig, log: LogSink) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;

        let available = num_cpus::get();
        let workers = config.workers.min(available);

        log(&format!(
            "JobScheduler initialized with {} workers (available cores: {})",
            workers, available
        ));

        Ok(Self {
            config,
            workers,
            queue: PriorityJobQueue::new(),
            notifier: Arc::new(LifecycleNotifier::new()),
            stop_flag: Arc::new(AtomicBool::new(false)),
            state: Mutex::new(PoolState::NotStarted),
            handles: Mutex::new(Vec::new()),
            log,
        })
    }

    /// Cantidad efectiva de workers del pool
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Estado actual del pool
    pub fn state(&self) -> PoolState {
        *self.state.lock().unwrap()
    }

    /// Registra un observer de ciclo de vida
    pub fn register_observer(&self, observer: Arc<dyn JobObserver>) {
        self.notifier.register(observer);
    }

    /// Encola un job con la prioridad dada
    ///
    /// Puede llamarse desde cualquier thread y nunca bloquea más allá de
    /// la sección crítica de la cola.
    pub fn add_job(&self, job: JobRef, priority: JobPriority) {
        self.queue.enqueue(job, priority);
    }

    /// Cancela un job todavía encolado
    ///
    /// Retorna `true` solo si esa instancia exacta seguía encolada y fue
    /// removida; su estado terminal queda en `Canceled`. Retorna `false`
    /// si ya fue reclamado por un worker o ya terminó; el caller puede
    /// re-consultar el estado del job.
    pub fn cancel_job(&self, job: &JobRef) -> bool {
        if self.queue.remove(job) {
            job.core().try_transition(JobStatus::Canceled);
            (self.log)(&format!("Job {} ({}) canceled", job.id(), job.name()));
            true
        } else {
            false
        }
    }

    /// Jobs encolados y todavía no reclamados por ningún worker
    pub fn pending_jobs(&self) -> usize {
        self.queue.len()
    }

    /// Snapshot de estadísticas del pool y la cola como JSON
    pub fn queue_stats(&self) -> serde_json::Value {
        let stats = self.queue.stats();
        serde_json::json!({
            "state": self.state().as_str(),
            "workers": self.workers,
            "pending": stats.total,
            "high": stats.high,
            "medium": stats.medium,
            "low": stats.low,
        })
    }

    /// Lanza los N workers del pool
    ///
    /// Válido una sola vez, desde `NotStarted`.
    pub fn start(&self) -> Result<(), SchedulerError> {
        let mut state = self.state.lock().unwrap();
        if *state != PoolState::NotStarted {
            return Err(SchedulerError::AlreadyStarted);
        }
        *state = PoolState::Running;

        let mut handles = self.handles.lock().unwrap();
        for worker_id in 0..self.workers {
            let queue = self.queue.clone();
            let notifier = Arc::clone(&self.notifier);
            let stop_flag = Arc::clone(&self.stop_flag);
            let log = Arc::clone(&self.log);
            let backoff = Duration::from_millis(self.config.backoff_ms);
            let pin = self.config.pin_workers;

            let handle = thread::Builder::new()
                .name(format!("worker-{}", worker_id))
                .spawn(move || worker_loop(worker_id, queue, notifier, stop_flag, log, backoff, pin))
                .expect("failed to spawn worker thread");
            handles.push(handle);
        }

        Ok(())
    }

    /// Detiene el pool y espera a que todos los workers terminen
    ///
    /// Cooperativo: los jobs en vuelo terminan de ejecutarse; los jobs
    /// encolados quedan pendientes. Es seguro llamarlo sin `start()`
    /// previo y también más de una vez.
    pub fn stop(&self) {
        {
            let mut state = self.state.lock().unwrap();
            match *state {
                PoolState::NotStarted => {
                    *state = PoolState::Stopped;
                    return;
                }
                PoolState::Stopped => return,
                PoolState::Running | PoolState::Stopping => {
                    *state = PoolState::Stopping;
                }
            }
        }

        self.stop_flag.store(true, Ordering::Release);
        self.queue.wake_all();

        // Join bajo el lock de handles: un stop() concurrente bloquea
        // acá hasta que el primero termine de esperar a los workers
        let mut handles = self.handles.lock().unwrap();
        while let Some(handle) = handles.pop() {
            if let Err(e) = handle.join() {
                (self.log)(&format!("Error joining worker thread: {:?}", e));
            }
        }
        drop(handles);

        *self.state.lock().unwrap() = PoolState::Stopped;
        (self.log)("JobScheduler stopped");
    }
}

/// Loop principal de cada worker
///
/// Desencola el job de mayor prioridad, lo ejecuta con aislamiento de
/// fallos y publica los eventos de ciclo de vida. Un worker ocioso
/// bloquea en la cola hasta `backoff` y re-chequea la señal de stop.
fn worker_loop(
    worker_id: usize,
    queue: PriorityJobQueue,
    notifier: Arc<LifecycleNotifier>,
    stop_flag: Arc<AtomicBool>,
    log: LogSink,
    backoff: Duration,
    pin: bool,
) {
    if pin {
        pin_to_core(worker_id, &log);
    }

    log(&format!("Worker {} started", worker_id));

    while !stop_flag.load(Ordering::Acquire) {
        match queue.dequeue_timeout(backoff) {
            Some(job) => run_job(worker_id, &job, &notifier, &log),
            None => {
                // Timeout o despertar del shutdown: el while re-chequea stop
            }
        }
    }

    log(&format!("Worker {} stopped", worker_id));
}

/// Ejecuta un job con aislamiento de fallos
///
/// Tanto un `Err` del job como un panic quedan contenidos acá: el job
/// pasa a `Error`, se notifica la falla y el worker sigue su loop.
fn run_job(worker_id: usize, job: &JobRef, notifier: &LifecycleNotifier, log: &LogSink) {
    job.core().try_transition(JobStatus::Running);
    notifier.notify_started(job);
    log(&format!("Worker {} executing {}", worker_id, job.name()));

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| job.execute()));

    match outcome {
        Ok(Ok(())) => {
            job.core().try_transition(JobStatus::Done);
            let last = job.profiling().last_execution_time;
            log(&format!(
                "Worker {} finished {}. Execution time: {:.4}s",
                worker_id,
                job.name(),
                last.as_secs_f64()
            ));
            notifier.notify_completed(job);
        }
        Ok(Err(error)) => {
            job.core().try_transition(JobStatus::Error);
            log(&format!("Worker {} failed {}: {}", worker_id, job.name(), error));
            notifier.notify_failed(job, &error);
        }
        Err(payload) => {
            let error = JobError::Panicked(panic_message(payload));
            job.core().try_transition(JobStatus::Error);
            log(&format!("Worker {} failed {}: {}", worker_id, job.name(), error));
            notifier.notify_failed(job, &error);
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Fija el worker actual a un core lógico (best-effort)
///
/// Si la plataforma no expone afinidad o no alcanzan los cores, se
/// loguea y el worker sigue sin fijar: nunca aborta el arranque.
fn pin_to_core(worker_id: usize, log: &LogSink) {
    match core_affinity::get_core_ids() {
        Some(core_ids) if worker_id < core_ids.len() => {
            if core_affinity::set_for_current(core_ids[worker_id]) {
                log(&format!("Worker {} pinned to CPU core {}", worker_id, worker_id));
            } else {
                log(&format!("Worker {} could not be pinned to core {}", worker_id, worker_id));
            }
        }
        _ => {
            log(&format!("Worker {} running unpinned (no affinity support)", worker_id));
        }
    }
}
