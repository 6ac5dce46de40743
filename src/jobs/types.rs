//! # Tipos Fundamentales del Sistema de Jobs
//! src/jobs/types.rs
//!
//! Define estados, prioridades, el registro de tipos de job y el sink
//! de logging inyectable.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::jobs::job::JobRef;
use crate::jobs::sorting::{BubbleSortJob, QuickSortJob};

/// Sink de logging inyectado en construcción.
///
/// Se invoca desde threads de workers arbitrarios y desde el propio pool,
/// así que el callback debe tolerar invocación concurrente.
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Sink que imprime cada mensaje por stdout
pub fn stdout_sink() -> LogSink {
    Arc::new(|msg| println!("{}", msg))
}

/// Sink que descarta todos los mensajes (útil en tests)
pub fn null_sink() -> LogSink {
    Arc::new(|_| {})
}

/// Estado de un job
///
/// Las transiciones son monótonas: una vez en estado terminal
/// (`Done`, `Error`, `Canceled`) el job no cambia más de estado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job en cola esperando ejecución
    Queued,

    /// Job ejecutándose en un worker
    Running,

    /// Job completado exitosamente
    Done,

    /// Job falló durante la ejecución
    Error,

    /// Job cancelado antes de ser reclamado por un worker
    Canceled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
            JobStatus::Canceled => "canceled",
        }
    }

    /// Verifica si el estado es terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error | JobStatus::Canceled)
    }

    /// Verifica si un job en este estado puede cancelarse
    ///
    /// Solo los jobs encolados son cancelables: una vez reclamado por un
    /// worker, el job corre hasta terminar.
    pub fn is_cancelable(&self) -> bool {
        matches!(self, JobStatus::Queued)
    }
}

/// Prioridad de un job
///
/// El orden de desencolado es estricto: High antes que Medium,
/// Medium antes que Low. Dentro de un mismo nivel el orden es FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPriority {
    Low = 0,
    Medium = 1,
    High = 2,
}

/// Cantidad de niveles de prioridad
pub const PRIORITY_LEVELS: usize = 3;

impl Default for JobPriority {
    fn default() -> Self {
        JobPriority::Medium
    }
}

impl JobPriority {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(JobPriority::Low),
            "medium" => Some(JobPriority::Medium),
            "high" => Some(JobPriority::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobPriority::Low => "low",
            JobPriority::Medium => "medium",
            JobPriority::High => "high",
        }
    }

    /// Índice del nivel dentro de la cola (Low=0 .. High=2)
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Tipo de job que puede construir el sistema
///
/// Funciona como registro: mapea un tipo pedido a su constructor,
/// evitando despacho por strings en el resto del código.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    BubbleSort,
    QuickSort,
}

impl JobKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bubble" | "bubblesort" => Some(JobKind::BubbleSort),
            "quick" | "quicksort" => Some(JobKind::QuickSort),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::BubbleSort => "bubblesort",
            JobKind::QuickSort => "quicksort",
        }
    }

    /// Construye un job de este tipo sobre el payload dado
    pub fn create(&self, data: Vec<i32>, log: LogSink) -> JobRef {
        match self {
            JobKind::BubbleSort => Arc::new(BubbleSortJob::new(data, log)),
            JobKind::QuickSort => Arc::new(QuickSortJob::new(data, log)),
        }
    }
}
