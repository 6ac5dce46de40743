//! # Job Scheduler - Entry Point
//! src/main.rs
//!
//! Binario demo: encola un lote de jobs de ordenamiento con prioridades
//! aleatorias, espera a que el pool los procese y muestra el profiling
//! de cada job. Cumple el rol de la capa de presentación: arma jobs,
//! recibe notificaciones y muestra estado; no posee lógica de scheduling.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::Rng;

use job_scheduler::config::Config;
use job_scheduler::jobs::types::stdout_sink;
use job_scheduler::jobs::{
    Job, JobError, JobKind, JobObserver, JobPriority, JobRef, JobScheduler, SchedulerConfig,
};

/// Observer que reporta los eventos de ciclo de vida por stdout
///
/// Los eventos llegan en el thread del worker; acá solo imprimimos,
/// así que no hace falta marshaling.
struct ConsoleObserver;

impl JobObserver for ConsoleObserver {
    fn job_started(&self, job: &JobRef) {
        println!("🔨 {} started ({})", job.id(), job.name());
    }

    fn job_completed(&self, job: &JobRef) {
        let last = job.profiling().last_execution_time;
        println!("✅ {} completed in {:.4}s", job.id(), last.as_secs_f64());
    }

    fn job_failed(&self, job: &JobRef, error: &JobError) {
        println!("❌ {} failed: {}", job.id(), error);
    }
}

fn main() {
    println!("=================================");
    println!("  Job Scheduler");
    println!("  Principios de Sistemas Operativos");
    println!("=================================\n");

    // Crear configuración (CLI + env)
    let config = Config::new();
    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        std::process::exit(1);
    }
    config.print_summary();

    // Crear el scheduler
    let scheduler_config = SchedulerConfig::from_config(&config);
    let scheduler = match JobScheduler::new(scheduler_config, stdout_sink()) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            eprintln!("💥 Error fatal: {}", e);
            std::process::exit(1);
        }
    };
    scheduler.register_observer(Arc::new(ConsoleObserver));

    if let Err(e) = scheduler.start() {
        eprintln!("💥 Error fatal: {}", e);
        std::process::exit(1);
    }

    // Encolar el lote demo
    let mut rng = rand::thread_rng();
    let kinds = [JobKind::BubbleSort, JobKind::QuickSort];
    let priorities = [JobPriority::Low, JobPriority::Medium, JobPriority::High];
    let mut batch: Vec<(JobRef, JobPriority)> = Vec::new();

    for i in 0..config.batch {
        let size = rng.gen_range(config.min_size..=config.max_size);
        let data: Vec<i32> = (0..size).map(|_| rng.gen_range(1..=100)).collect();

        let kind = kinds[i % kinds.len()];
        let priority = priorities[rng.gen_range(0..priorities.len())];

        let job = kind.create(data, stdout_sink());
        println!(
            "📬 Enqueueing {} ({}, priority {}, {} elements)",
            job.id(),
            job.name(),
            priority.as_str(),
            size
        );
        scheduler.add_job(Arc::clone(&job), priority);
        batch.push((job, priority));
    }

    // Esperar a que todo el lote llegue a estado terminal
    while batch.iter().any(|(job, _)| !job.status().is_terminal()) {
        thread::sleep(Duration::from_millis(50));
    }

    // Tabla de resultados
    println!();
    println!("📊 Results:");
    println!("   ┌──────────────┬──────────────┬──────────┬────────────┬─────────────┐");
    println!("   │ Job          │ Kind         │ Priority │ Big-O      │ Last (ms)   │");
    println!("   ├──────────────┼──────────────┼──────────┼────────────┼─────────────┤");
    for (job, priority) in &batch {
        let last_ms = job.profiling().last_execution_time.as_secs_f64() * 1000.0;
        println!(
            "   │ {:<12} │ {:<12} │ {:<8} │ {:>10} │ {:>11.4} │",
            job.id(),
            job.name(),
            priority.as_str(),
            job.big_o_score(),
            last_ms
        );
    }
    println!("   └──────────────┴──────────────┴──────────┴────────────┴─────────────┘");
    println!();

    scheduler.stop();
}
