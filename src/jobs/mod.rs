//! # Sistema de Jobs
//!
//! Implementa el núcleo del scheduler: jobs polimórficos con profiling,
//! cola de prioridades multi-nivel, pool de workers de tamaño fijo y
//! notificaciones de ciclo de vida.
//!
//! ## Flujo de datos
//!
//! 1. El caller construye un job (`JobKind::create`) y lo encola con
//!    `JobScheduler::add_job(job, prioridad)`
//! 2. Los workers sacan el job de mayor prioridad, lo ejecutan y
//!    actualizan su profiling
//! 3. Los observers registrados reciben started/completed/failed
//! 4. Un job todavía encolado puede cancelarse con `cancel_job`

pub mod job;
pub mod notifier;
pub mod queue;
pub mod scheduler;
pub mod sorting;
pub mod types;

pub use job::{Job, JobCore, JobError, JobRef, ProfilingStats};
pub use notifier::{JobObserver, LifecycleNotifier};
pub use queue::{PriorityJobQueue, QueueStats};
pub use scheduler::{JobScheduler, PoolState, SchedulerConfig, SchedulerError};
pub use sorting::{BubbleSortJob, QuickSortJob};
pub use types::{JobKind, JobPriority, JobStatus, LogSink};
