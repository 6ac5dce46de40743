//! # Cola de Prioridades para Jobs
//! src/jobs/queue.rs
//!
//! Cola thread-safe multi-nivel: un FIFO por prioridad detrás de un único
//! mutex, con Condvar para que los workers bloqueen hasta que haya trabajo.
//!
//! Invariantes: un job aparece a lo sumo en un nivel a la vez, y el
//! contador de pendientes siempre es igual al total de jobs presentes
//! en todos los niveles.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::jobs::job::JobRef;
use crate::jobs::types::{JobPriority, JobStatus, PRIORITY_LEVELS};

/// Estado interno protegido por el mutex
struct QueueState {
    /// Un FIFO por nivel de prioridad, indexado por `JobPriority::index()`
    levels: [VecDeque<JobRef>; PRIORITY_LEVELS],

    /// Jobs encolados y todavía no reclamados
    pending: usize,
}

impl QueueState {
    /// Saca la cabeza del primer nivel no vacío, de mayor a menor prioridad
    fn pop_highest(&mut self) -> Option<JobRef> {
        for level in (0..PRIORITY_LEVELS).rev() {
            if let Some(job) = self.levels[level].pop_front() {
                self.pending -= 1;
                return Some(job);
            }
        }
        None
    }
}

struct QueueShared {
    state: Mutex<QueueState>,
    available: Condvar,
}

/// Cola de prioridades thread-safe
///
/// Cada operación es una sección crítica única, así que el contador de
/// pendientes, el contenido de los niveles y la custodia de cada job son
/// consistentes vistos desde afuera.
pub struct PriorityJobQueue {
    shared: Arc<QueueShared>,
}

impl Default for PriorityJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityJobQueue {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(QueueShared {
                state: Mutex::new(QueueState {
                    levels: [VecDeque::new(), VecDeque::new(), VecDeque::new()],
                    pending: 0,
                }),
                available: Condvar::new(),
            }),
        }
    }

    /// Encola un job al final de su nivel de prioridad
    ///
    /// Nunca bloquea más allá de la sección crítica y despierta a un
    /// worker que esté esperando trabajo.
    pub fn enqueue(&self, job: JobRef, priority: JobPriority) {
        let mut state = self.shared.state.lock().unwrap();
        state.levels[priority.index()].push_back(job);
        state.pending += 1;
        self.shared.available.notify_one();
    }

    /// Desencola el job de mayor prioridad sin bloquear
    ///
    /// Retorna `None` si todos los niveles están vacíos.
    pub fn try_dequeue(&self) -> Option<JobRef> {
        let mut state = self.shared.state.lock().unwrap();
        state.pop_highest()
    }

    /// Desencola el job de mayor prioridad, esperando hasta `timeout`
    ///
    /// Puede retornar `None` antes de cumplirse el timeout si la espera
    /// fue interrumpida (por ejemplo por `wake_all` durante el shutdown);
    /// el caller debe re-chequear su condición de salida y reintentar.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Option<JobRef> {
        let mut state = self.shared.state.lock().unwrap();
        if let Some(job) = state.pop_highest() {
            return Some(job);
        }

        let (mut state, _result) = self
            .shared
            .available
            .wait_timeout(state, timeout)
            .unwrap();
        state.pop_highest()
    }

    /// Remueve un job específico de la cola (para cancelación)
    ///
    /// Solo tiene éxito si esa instancia exacta sigue encolada: se busca
    /// por ID en todos los niveles, no por la cabeza del nivel. Retorna
    /// `false` si el job ya fue reclamado por un worker o ya terminó.
    pub fn remove(&self, job: &JobRef) -> bool {
        let mut state = self.shared.state.lock().unwrap();

        for level in (0..PRIORITY_LEVELS).rev() {
            if let Some(pos) = state.levels[level]
                .iter()
                .position(|queued| queued.id() == job.id())
            {
                if state.levels[level][pos].status() != JobStatus::Queued {
                    return false;
                }
                if state.levels[level].remove(pos).is_some() {
                    state.pending -= 1;
                    return true;
                }
                return false;
            }
        }

        false
    }

    /// Jobs encolados y todavía no reclamados por ningún worker
    pub fn len(&self) -> usize {
        self.shared.state.lock().unwrap().pending
    }

    /// Verifica si la cola está vacía
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Despierta a todos los workers bloqueados en `dequeue_timeout`
    ///
    /// Lo usa el scheduler para que el shutdown no espere el timeout.
    pub fn wake_all(&self) {
        self.shared.available.notify_all();
    }

    /// Obtiene estadísticas de la cola por nivel
    pub fn stats(&self) -> QueueStats {
        let state = self.shared.state.lock().unwrap();
        QueueStats {
            total: state.pending,
            high: state.levels[JobPriority::High.index()].len(),
            medium: state.levels[JobPriority::Medium.index()].len(),
            low: state.levels[JobPriority::Low.index()].len(),
        }
    }
}

impl Clone for PriorityJobQueue {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Estadísticas de una cola
#[derive(Debug, Clone)]
pub struct QueueStats {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}
