//! # Configuración del Scheduler
//! src/config.rs
//!
//! Este módulo define la configuración del scheduler con soporte completo
//! para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./job_scheduler --workers 4 \
//!   --backoff-ms 100 \
//!   --pin-workers \
//!   --batch 6
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! WORKERS=8 BACKOFF_MS=50 ./job_scheduler
//! ```

use clap::Parser;

/// Configuración del pool de workers y del binario demo
#[derive(Debug, Clone, Parser)]
#[command(name = "job_scheduler")]
#[command(about = "Pool de workers con prioridades y profiling de jobs")]
#[command(version = "0.1.0")]
pub struct Config {
    // === Workers ===
    /// Número de workers del pool (se recorta a los cores disponibles)
    #[arg(short, long, default_value = "4", env = "WORKERS")]
    pub workers: usize,

    /// Espera máxima de un worker ocioso antes de re-chequear la señal
    /// de stop, en milisegundos
    #[arg(long = "backoff-ms", default_value = "100", env = "BACKOFF_MS")]
    pub backoff_ms: u64,

    /// Fijar cada worker a un core lógico (best-effort)
    #[arg(long = "pin-workers", env = "PIN_WORKERS")]
    pub pin_workers: bool,

    // === Demo ===
    /// Cantidad de jobs de ejemplo que encola el binario demo
    #[arg(long, default_value = "6", env = "BATCH")]
    pub batch: usize,

    /// Tamaño mínimo del payload de cada job demo
    #[arg(long = "min-size", default_value = "15", env = "MIN_SIZE")]
    pub min_size: usize,

    /// Tamaño máximo del payload de cada job demo
    #[arg(long = "max-size", default_value = "50", env = "MAX_SIZE")]
    pub max_size: usize,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        // Validar workers
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }

        // Validar backoff
        if self.backoff_ms == 0 {
            return Err("Backoff must be > 0 ms".to_string());
        }

        // Validar demo
        if self.batch == 0 {
            return Err("Batch must be >= 1".to_string());
        }
        if self.min_size == 0 {
            return Err("Min size must be >= 1".to_string());
        }
        if self.min_size > self.max_size {
            return Err("Min size must be <= max size".to_string());
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║              Job Scheduler Configuration                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("👷 Worker Pool:");
        println!("   Workers:      {} (requested)", self.workers);
        println!("   Backoff:      {} ms", self.backoff_ms);

        if self.pin_workers {
            println!("   Affinity:     pin each worker to its core");
        } else {
            println!("   Affinity:     disabled");
        }

        println!();
        println!("📋 Demo Batch:");
        println!("   Jobs:         {}", self.batch);
        println!("   Payload size: {}-{} elements", self.min_size, self.max_size);
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            workers: 4,
            backoff_ms: 100,
            pin_workers: false,
            batch: 6,
            min_size: 15,
            max_size: 50,
        }
    }
}
