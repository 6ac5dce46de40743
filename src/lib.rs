//! # Job Scheduler
//! src/lib.rs
//!
//! Pool de workers de tamaño fijo con cola de prioridades y profiling
//! por job, implementado para demostrar conceptos de sistemas operativos:
//! concurrencia, sincronización, planificación y aislamiento de fallos.
//!
//! ## Arquitectura
//!
//! El sistema está dividido en módulos especializados:
//! - `config`: Configuración por CLI y variables de entorno
//! - `jobs`: Núcleo del sistema: jobs polimórficos, cola de prioridades,
//!   scheduler con pool de workers y notificaciones de ciclo de vida
//!
//! ## Ejemplo de uso
//!
//! ```ignore
//! use std::sync::Arc;
//! use job_scheduler::jobs::{JobKind, JobPriority, JobScheduler, SchedulerConfig};
//! use job_scheduler::jobs::types::stdout_sink;
//!
//! let scheduler = JobScheduler::new(SchedulerConfig::default(), stdout_sink()).unwrap();
//! scheduler.start().unwrap();
//!
//! let job = JobKind::BubbleSort.create(vec![5, 3, 8, 1, 9, 2], stdout_sink());
//! scheduler.add_job(Arc::clone(&job), JobPriority::High);
//!
//! scheduler.stop();
//! ```

pub mod config;
pub mod jobs;
