//! # Jobs de Ordenamiento
//! src/jobs/sorting.rs
//!
//! Las dos variantes de carga de trabajo del sistema: ordenamiento burbuja
//! (O(n²)) y quicksort (O(n log n) promedio). Ambas transforman el payload
//! in place y emiten un snapshot antes/después por el sink de logging.

use std::time::Instant;

use crate::jobs::job::{Job, JobCore, JobError};
use crate::jobs::types::LogSink;

/// Ordenamiento burbuja in place: intercambios adyacentes, O(n²)
pub fn bubble_sort(data: &mut [i32]) {
    let n = data.len();
    for i in 0..n.saturating_sub(1) {
        for j in 0..n - i - 1 {
            if data[j] > data[j + 1] {
                data.swap(j, j + 1);
            }
        }
    }
}

/// Quicksort recursivo in place con partición de Lomuto
///
/// Pivote = último elemento, así que el peor caso es O(n²) sobre entrada
/// ya ordenada; la profundidad de recursión queda acotada por el tamaño
/// de la entrada.
pub fn quick_sort(data: &mut [i32]) {
    if data.len() > 1 {
        quick_sort_range(data, 0, (data.len() - 1) as isize);
    }
}

fn quick_sort_range(data: &mut [i32], low: isize, high: isize) {
    if low < high {
        let pi = partition(data, low, high);
        quick_sort_range(data, low, pi - 1);
        quick_sort_range(data, pi + 1, high);
    }
}

/// Partición de Lomuto: todo lo menor que el pivote queda a su izquierda
fn partition(data: &mut [i32], low: isize, high: isize) -> isize {
    let pivot = data[high as usize];
    let mut i = low - 1;
    for j in low..high {
        if data[j as usize] < pivot {
            i += 1;
            data.swap(i as usize, j as usize);
        }
    }
    data.swap((i + 1) as usize, high as usize);
    i + 1
}

/// Job de ordenamiento burbuja
pub struct BubbleSortJob {
    core: JobCore,
}

impl BubbleSortJob {
    pub fn new(data: Vec<i32>, log: LogSink) -> Self {
        let n = data.len() as u64;
        let score = n * n; // O(n^2)
        Self {
            core: JobCore::new("Bubble Sort", score, data, log),
        }
    }
}

impl Job for BubbleSortJob {
    fn core(&self) -> &JobCore {
        &self.core
    }

    fn execute(&self) -> Result<(), JobError> {
        self.core.log_data("Bubble Sort before sorting:");
        let elapsed = self.core.with_data(|data| {
            let start = Instant::now();
            bubble_sort(data);
            start.elapsed()
        });
        self.core.log_data("Bubble Sort after sorting:");
        self.core.record_execution(elapsed);
        Ok(())
    }
}

/// Job de quicksort
pub struct QuickSortJob {
    core: JobCore,
}

impl QuickSortJob {
    pub fn new(data: Vec<i32>, log: LogSink) -> Self {
        let n = data.len() as f64;
        let score = (n * n.ln()) as u64; // O(n log n)
        Self {
            core: JobCore::new("Quick Sort", score, data, log),
        }
    }
}

impl Job for QuickSortJob {
    fn core(&self) -> &JobCore {
        &self.core
    }

    fn execute(&self) -> Result<(), JobError> {
        self.core.log_data("Quick Sort before sorting:");
        let elapsed = self.core.with_data(|data| {
            let start = Instant::now();
            quick_sort(data);
            start.elapsed()
        });
        self.core.log_data("Quick Sort after sorting:");
        self.core.record_execution(elapsed);
        Ok(())
    }
}
