use std::{
    sync::{Arc, Condvar, Mutex},
    time::Duration,
};

/// Cooperative stop flag shared between the scan loop and signal handlers.
/// Cancelling wakes a sleeping waiter immediately.
#[derive(Clone, Default)]
pub struct CancelToken {
    shared: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, condvar) = &*self.shared;
        *flag.lock().unwrap() = true;
        condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.shared.0.lock().unwrap()
    }

    /// Sleeps for `duration` unless cancelled first. Returns true when the
    /// token was cancelled before or during the wait.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (flag, condvar) = &*self.shared;
        let guard = flag.lock().unwrap();
        let (guard, _) = condvar
            .wait_timeout_while(guard, duration, |cancelled| !*cancelled)
            .unwrap();
        *guard
    }
}

#[test]
fn uncancelled_wait_times_out() {
    let token = CancelToken::new();
    assert!(!token.wait_timeout(Duration::from_millis(10)));
    assert!(!token.is_cancelled());
}

#[test]
fn cancelled_wait_returns_immediately() {
    let token = CancelToken::new();
    token.cancel();
    assert!(token.is_cancelled());
    assert!(token.wait_timeout(Duration::from_secs(60)));
}

#[test]
fn cancel_wakes_a_sleeping_waiter() {
    let token = CancelToken::new();
    let clone = token.clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        clone.cancel();
    });
    let started = std::time::Instant::now();
    assert!(token.wait_timeout(Duration::from_secs(60)));
    assert!(started.elapsed() < Duration::from_secs(30));
    canceller.join().unwrap();
}
