//! Disposable backing-service environments and guaranteed teardown.
//!
//! A backend under conformance test may need an external service (typically
//! a container). The harness treats that service as an opaque collaborator
//! behind [`Environment`], and distinguishes three setup outcomes: ready,
//! skip (the environment cannot run here, e.g. no container runtime), and
//! failure (it should run but did not). Skips are a precondition result,
//! not an error.

use thiserror::Error;

/// Errors raised while preparing a backing-service environment.
///
/// These abort the test run; an environment that is merely not applicable
/// is reported as [`Readiness::Skipped`] instead.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The environment is applicable but refused to start.
    #[error("could not start the backing service environment")]
    StartFailed,

    /// The environment started but its network address is unobtainable.
    #[error("could not determine the environment network address: {0}")]
    AddressUnavailable(String),
}

/// An opaque, disposable service environment a backend runs against.
///
/// Implementations wrap whatever provisions the service (a container
/// runtime, a fixture process, nothing at all). The harness only ever
/// queries applicability, starts, stops, and asks for the address.
pub trait Environment {
    /// Whether this environment can run on the current host.
    fn applicable(&self) -> bool;

    /// Starts the environment. Returns `false` when startup failed.
    fn start(&mut self) -> bool;

    /// Stops the environment and releases its resources.
    fn stop(&mut self);

    /// Host and port the provisioned service listens on.
    fn network_address(&self) -> Result<(String, u16), EnvError>;
}

/// Outcome of preparing an environment.
#[derive(Debug)]
pub enum Readiness {
    /// The environment is up; the backend is reachable at `host:port`.
    Ready { host: String, port: u16 },

    /// The environment cannot run here; the test should be skipped, which
    /// is distinct from both passing and failing.
    Skipped(String),
}

/// Brings an environment up and registers its teardown.
///
/// On success the environment's `stop` is pushed onto `cleanup`, so it runs
/// on every exit path from the calling test. When obtaining the network
/// address fails after startup, the environment is stopped before the error
/// propagates; setup failure must not leak a running service.
pub fn prepare<E>(mut env: E, cleanup: &mut CleanupStack) -> Result<Readiness, EnvError>
where
    E: Environment + Send + 'static,
{
    if !env.applicable() {
        let reason = "backing service environment is not available on this host".to_string();
        tracing::info!(%reason, "skipping conformance run");
        return Ok(Readiness::Skipped(reason));
    }

    if !env.start() {
        return Err(EnvError::StartFailed);
    }

    let (host, port) = match env.network_address() {
        Ok(address) => address,
        Err(err) => {
            env.stop();
            return Err(err);
        }
    };

    cleanup.defer(move || env.stop());

    tracing::debug!(%host, port, "backing service environment ready");
    Ok(Readiness::Ready { host, port })
}

/// Environment for backends that live inside the test process.
///
/// Always applicable, never fails, and reports the loopback address with
/// port 0 since there is no network endpoint to reach.
#[derive(Debug, Default)]
pub struct InProcess;

impl InProcess {
    pub fn new() -> Self {
        Self
    }
}

impl Environment for InProcess {
    fn applicable(&self) -> bool {
        true
    }

    fn start(&mut self) -> bool {
        true
    }

    fn stop(&mut self) {}

    fn network_address(&self) -> Result<(String, u16), EnvError> {
        Ok(("127.0.0.1".to_string(), 0))
    }
}

/// An explicit, ordered list of teardown actions.
///
/// Actions run in reverse registration order, mirroring resource
/// acquisition. Remaining actions run when the stack is dropped, so
/// teardown happens on panic and early return as well as on the happy
/// path.
#[derive(Default)]
pub struct CleanupStack {
    actions: Vec<Box<dyn FnOnce() + Send>>,
}

impl CleanupStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a teardown action. Later registrations run first.
    pub fn defer(&mut self, action: impl FnOnce() + Send + 'static) {
        self.actions.push(Box::new(action));
    }

    /// Runs all registered actions now, newest first.
    pub fn run(&mut self) {
        while let Some(action) = self.actions.pop() {
            action();
        }
    }
}

impl Drop for CleanupStack {
    fn drop(&mut self) {
        self.run();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_cleanup_runs_in_reverse_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut cleanup = CleanupStack::new();

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            cleanup.defer(move || order.lock().unwrap().push(tag));
        }

        cleanup.run();
        // Re-running an emptied stack is a no-op
        cleanup.run();

        assert_eq!(*order.lock().unwrap(), vec!["third", "second", "first"]);
    }

    #[test]
    fn test_cleanup_runs_on_drop() {
        static RAN: AtomicBool = AtomicBool::new(false);
        RAN.store(false, Ordering::SeqCst);

        {
            let mut cleanup = CleanupStack::new();
            cleanup.defer(|| RAN.store(true, Ordering::SeqCst));
        }

        assert!(RAN.load(Ordering::SeqCst));
    }

    struct NotApplicable;

    impl Environment for NotApplicable {
        fn applicable(&self) -> bool {
            false
        }
        fn start(&mut self) -> bool {
            panic!("start called on an inapplicable environment");
        }
        fn stop(&mut self) {}
        fn network_address(&self) -> Result<(String, u16), EnvError> {
            Err(EnvError::AddressUnavailable("never started".to_string()))
        }
    }

    struct Stubborn;

    impl Environment for Stubborn {
        fn applicable(&self) -> bool {
            true
        }
        fn start(&mut self) -> bool {
            false
        }
        fn stop(&mut self) {}
        fn network_address(&self) -> Result<(String, u16), EnvError> {
            Err(EnvError::AddressUnavailable("never started".to_string()))
        }
    }

    #[test]
    fn test_prepare_skips_inapplicable_environment() {
        let mut cleanup = CleanupStack::new();
        let readiness = prepare(NotApplicable, &mut cleanup).unwrap();
        assert!(matches!(readiness, Readiness::Skipped(_)));
    }

    #[test]
    fn test_prepare_reports_start_failure() {
        let mut cleanup = CleanupStack::new();
        let err = prepare(Stubborn, &mut cleanup).unwrap_err();
        assert!(matches!(err, EnvError::StartFailed));
    }

    #[test]
    fn test_prepare_in_process() {
        let mut cleanup = CleanupStack::new();
        match prepare(InProcess::new(), &mut cleanup).unwrap() {
            Readiness::Ready { host, port } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 0);
            }
            Readiness::Skipped(reason) => panic!("in-process environment skipped: {reason}"),
        }
    }
}
