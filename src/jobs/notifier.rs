//! # Notificaciones de Ciclo de Vida
//! src/jobs/notifier.rs
//!
//! Entrega started/completed/failed a los observers registrados. La
//! entrega es síncrona en el thread del worker que ejecuta el job, sin
//! buffering: un consumidor que necesite confinamiento a otro thread
//! (por ejemplo una UI) debe hacer el marshaling por su cuenta.
//!
//! No hay garantía de orden entre eventos de jobs distintos corriendo
//! en workers distintos; sí se garantiza started-antes-que-completed
//! para cada job individual.

use std::sync::{Arc, Mutex};

use crate::jobs::job::{JobError, JobRef};

/// Observer de ciclo de vida de jobs
///
/// Todos los métodos tienen implementación vacía por defecto, así que un
/// observer implementa solo los eventos que le interesan. Los métodos se
/// invocan desde threads de workers arbitrarios.
pub trait JobObserver: Send + Sync {
    /// Un worker reclamó el job y está por ejecutarlo
    fn job_started(&self, _job: &JobRef) {}

    /// El job terminó exitosamente
    fn job_completed(&self, _job: &JobRef) {}

    /// El job falló durante la ejecución
    fn job_failed(&self, _job: &JobRef, _error: &JobError) {}
}

/// Canal de notificaciones del pool
pub struct LifecycleNotifier {
    observers: Mutex<Vec<Arc<dyn JobObserver>>>,
}

impl Default for LifecycleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleNotifier {
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Registra un observer; puede llamarse en cualquier momento
    pub fn register(&self, observer: Arc<dyn JobObserver>) {
        self.observers.lock().unwrap().push(observer);
    }

    // Copia la lista fuera del lock: un observer lento no serializa
    // al resto del pool ni puede deadlockear registrándose a sí mismo
    fn snapshot(&self) -> Vec<Arc<dyn JobObserver>> {
        self.observers.lock().unwrap().clone()
    }

    pub fn notify_started(&self, job: &JobRef) {
        for observer in self.snapshot() {
            observer.job_started(job);
        }
    }

    pub fn notify_completed(&self, job: &JobRef) {
        for observer in self.snapshot() {
            observer.job_completed(job);
        }
    }

    pub fn notify_failed(&self, job: &JobRef, error: &JobError) {
        for observer in self.snapshot() {
            observer.job_failed(job, error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::types::{null_sink, JobKind};

    /// Observer de prueba que acumula los eventos recibidos
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
            })
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl JobObserver for Recorder {
        fn job_started(&self, job: &JobRef) {
            self.events.lock().unwrap().push(format!("started {}", job.id()));
        }

        fn job_completed(&self, job: &JobRef) {
            self.events.lock().unwrap().push(format!("completed {}", job.id()));
        }

        fn job_failed(&self, job: &JobRef, error: &JobError) {
            self.events
                .lock()
                .unwrap()
                .push(format!("failed {}: {}", job.id(), error));
        }
    }

    #[test]
    fn test_notifier_delivers_in_order() {
        let notifier = LifecycleNotifier::new();
        let recorder = Recorder::new();
        notifier.register(recorder.clone());

        let job = JobKind::BubbleSort.create(vec![2, 1], null_sink());
        notifier.notify_started(&job);
        notifier.notify_completed(&job);

        let events = recorder.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], format!("started {}", job.id()));
        assert_eq!(events[1], format!("completed {}", job.id()));
    }

    #[test]
    fn test_notifier_failure_event() {
        let notifier = LifecycleNotifier::new();
        let recorder = Recorder::new();
        notifier.register(recorder.clone());

        let job = JobKind::QuickSort.create(vec![2, 1], null_sink());
        let error = JobError::ExecutionFailed("boom".to_string());
        notifier.notify_failed(&job, &error);

        let events = recorder.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].contains("boom"));
    }

    #[test]
    fn test_notifier_multiple_observers() {
        let notifier = LifecycleNotifier::new();
        let first = Recorder::new();
        let second = Recorder::new();
        notifier.register(first.clone());
        notifier.register(second.clone());

        let job = JobKind::BubbleSort.create(vec![1], null_sink());
        notifier.notify_started(&job);

        assert_eq!(first.events().len(), 1);
        assert_eq!(second.events().len(), 1);
    }

    #[test]
    fn test_observer_default_methods() {
        // Un observer puede implementar solo los eventos que le interesan
        struct OnlyCompleted;
        impl JobObserver for OnlyCompleted {}

        let notifier = LifecycleNotifier::new();
        notifier.register(Arc::new(OnlyCompleted));

        let job = JobKind::BubbleSort.create(vec![1], null_sink());
        notifier.notify_started(&job);
        notifier.notify_completed(&job);
    }

    #[test]
    fn test_notifier_without_observers() {
        let notifier = LifecycleNotifier::new();
        let job = JobKind::BubbleSort.create(vec![1], null_sink());
        // No debe hacer panic sin observers
        notifier.notify_started(&job);
        notifier.notify_completed(&job);
    }
}
