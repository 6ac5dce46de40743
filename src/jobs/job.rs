//! # Contrato Polimórfico de Job
//! src/jobs/job.rs
//!
//! Define el trait `Job`, el estado compartido `JobCore` que embeben las
//! variantes concretas, y las estadísticas de profiling por job.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;

use crate::jobs::types::{JobStatus, LogSink};

/// Referencia compartida a un job polimórfico
pub type JobRef = Arc<dyn Job>;

/// Error de ejecución de un job
#[derive(Debug, Clone, Error)]
pub enum JobError {
    /// La ejecución reportó una falla de dominio
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// La ejecución hizo panic; el worker lo contiene y sigue vivo
    #[error("execution panicked: {0}")]
    Panicked(String),
}

/// Estadísticas de ejecución de un job
///
/// Propiedad exclusiva del job; solo las muta el worker que lo está
/// ejecutando (invariante de escritor único).
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfilingStats {
    /// Duración de la última ejecución
    pub last_execution_time: Duration,

    /// Promedio acumulado sobre todas las ejecuciones
    pub average_execution_time: Duration,

    /// Cantidad de veces que el job fue ejecutado
    pub execution_count: u32,
}

impl ProfilingStats {
    /// Registra una ejecución y recalcula el promedio acumulado:
    /// `avg = (avg * (count - 1) + last) / count` después de incrementar count
    pub fn record(&mut self, elapsed: Duration) {
        self.last_execution_time = elapsed;
        self.execution_count += 1;
        let count = self.execution_count as f64;
        let avg = (self.average_execution_time.as_secs_f64() * (count - 1.0)
            + elapsed.as_secs_f64())
            / count;
        self.average_execution_time = Duration::from_secs_f64(avg);
    }
}

/// Contador global para IDs de job
///
/// Un contador atómico garantiza que dos jobs vivos nunca compartan ID;
/// la cancelación por instancia exacta depende de eso.
static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> String {
    format!("job-{:08x}", NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed))
}

/// Estado mutable interno del job
struct JobState {
    status: JobStatus,
    profiling: ProfilingStats,
}

/// Estado compartido que embebe cada variante concreta de job
///
/// Identidad inmutable (id, nombre, score de complejidad) más payload y
/// estado mutables protegidos por locks. El payload solo lo toca el worker
/// que ejecuta el job; los locks existen para que el caller pueda observar
/// snapshots sin carreras.
pub struct JobCore {
    /// ID único del job
    id: String,

    /// Nombre legible ("Bubble Sort", "Quick Sort")
    name: &'static str,

    /// Estimación de complejidad calculada en construcción
    big_o_score: u64,

    /// Payload sobre el que opera execute(), in place
    data: Mutex<Vec<i32>>,

    /// Estado + profiling
    state: Mutex<JobState>,

    /// Sink de logging inyectado
    log: LogSink,
}

impl JobCore {
    pub fn new(name: &'static str, big_o_score: u64, data: Vec<i32>, log: LogSink) -> Self {
        Self {
            id: next_job_id(),
            name,
            big_o_score,
            data: Mutex::new(data),
            state: Mutex::new(JobState {
                status: JobStatus::Queued,
                profiling: ProfilingStats::default(),
            }),
            log,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn big_o_score(&self) -> u64 {
        self.big_o_score
    }

    /// Estado actual del job
    pub fn status(&self) -> JobStatus {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .status
    }

    /// Intenta aplicar una transición de estado
    ///
    /// Las transiciones son monótonas: si el job ya está en un estado
    /// terminal la transición se rechaza y retorna `false`.
    pub fn try_transition(&self, status: JobStatus) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.status.is_terminal() {
            return false;
        }
        state.status = status;
        true
    }

    /// Snapshot del payload
    pub fn data(&self) -> Vec<i32> {
        // Recupera el lock aunque un execute() anterior haya hecho panic
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Ejecuta `f` con acceso exclusivo al payload
    pub fn with_data<R>(&self, f: impl FnOnce(&mut Vec<i32>) -> R) -> R {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut data)
    }

    /// Snapshot del profiling
    pub fn profiling(&self) -> ProfilingStats {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .profiling
    }

    /// Registra una ejecución terminada en el profiling
    pub fn record_execution(&self, elapsed: Duration) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .profiling
            .record(elapsed);
    }

    /// Emite un mensaje por el sink inyectado
    pub fn log(&self, msg: &str) {
        (self.log)(msg);
    }

    /// Emite un snapshot del payload por el sink: "prefix 5, 3, 8"
    pub fn log_data(&self, prefix: &str) {
        let joined = self
            .data()
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self.log(&format!("{} {}", prefix, joined));
    }
}

/// Unidad de trabajo polimórfica
///
/// Las variantes concretas embeben un [`JobCore`] y solo implementan
/// `core()` y `execute()`; identidad, estado y profiling vienen dados.
pub trait Job: Send + Sync {
    /// Estado compartido del job
    fn core(&self) -> &JobCore;

    /// Ejecuta el trabajo transformando el payload in place
    ///
    /// Contrato: dentro del pool lo invoca únicamente el worker que
    /// desencoló el job, sin acceso concurrente al payload. Al terminar
    /// registra el tiempo transcurrido en el profiling del job. Puede
    /// reportar una falla de dominio con `JobError`; el worker la contiene
    /// sin terminar su loop.
    fn execute(&self) -> Result<(), JobError>;

    /// ID único del job
    fn id(&self) -> &str {
        self.core().id()
    }

    /// Nombre legible del job
    fn name(&self) -> &'static str {
        self.core().name()
    }

    /// Estimación de complejidad declarada en construcción
    fn big_o_score(&self) -> u64 {
        self.core().big_o_score()
    }

    /// Estado actual
    fn status(&self) -> JobStatus {
        self.core().status()
    }

    /// Snapshot del profiling
    fn profiling(&self) -> ProfilingStats {
        self.core().profiling()
    }

    /// Snapshot del payload
    fn data(&self) -> Vec<i32> {
        self.core().data()
    }

    /// Snapshot del estado como JSON para la capa de presentación
    fn to_status_json(&self) -> serde_json::Value {
        let profiling = self.profiling();
        serde_json::json!({
            "id": self.id(),
            "name": self.name(),
            "status": self.status().as_str(),
            "big_o_score": self.big_o_score(),
            "execution_count": profiling.execution_count,
            "last_execution_ms": profiling.last_execution_time.as_secs_f64() * 1000.0,
            "average_execution_ms": profiling.average_execution_time.as_secs_f64() * 1000.0,
        })
    }
}
