//! Construction failures, completed constructions, and fast-path reads each
//! leave a log record at the expected level.
//!
//! A capturing `log::Log` is installed once for this test binary.  Records
//! are tagged with the emitting thread so tests running in parallel only see
//! their own.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, Once, OnceLock};
use std::thread::{self, ThreadId};

use log::{Level, LevelFilter, Log, Metadata, Record};
use lsr_core::{Error, StrategyKind};
use lsr_strategies::{CountingInitializer, LazySingletonRegistry};

struct Captured {
    thread: ThreadId,
    level: Level,
    message: String,
}

struct CaptureLogger {
    records: Mutex<Vec<Captured>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        let captured = Captured {
            thread: thread::current().id(),
            level: record.level(),
            message: record.args().to_string(),
        };
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(captured);
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};
static INSTALL: Once = Once::new();

fn install() {
    INSTALL.call_once(|| {
        log::set_logger(&LOGGER).expect("no other logger in this test binary");
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Drain this thread's records.
fn take_own() -> Vec<(Level, String)> {
    let me = thread::current().id();
    let mut all = LOGGER.records.lock().unwrap_or_else(|e| e.into_inner());
    let (mine, rest): (Vec<_>, Vec<_>) = all.drain(..).partition(|c| c.thread == me);
    *all = rest;
    mine.into_iter().map(|c| (c.level, c.message)).collect()
}

fn has(records: &[(Level, String)], level: Level, needle: &str) -> bool {
    records
        .iter()
        .any(|(l, m)| *l == level && m.contains(needle))
}

fn log_prefix(kind: StrategyKind) -> &'static str {
    match kind {
        StrategyKind::NaiveLazy => "naive:",
        StrategyKind::Serialized => "serialized:",
        StrategyKind::DoubleChecked => "double-checked:",
        StrategyKind::OnceGuard => "once-guard:",
        _ => unreachable!("{kind} is not a lazily constructing runtime strategy"),
    }
}

const LAZY_KINDS: [StrategyKind; 4] = [
    StrategyKind::NaiveLazy,
    StrategyKind::Serialized,
    StrategyKind::DoubleChecked,
    StrategyKind::OnceGuard,
];

#[test]
fn failed_construction_logs_warning() {
    install();
    for kind in LAZY_KINDS {
        take_own();
        let init = CountingInitializer::new(kind.name(), || 7_u8).fail_first(1);
        let registry = LazySingletonRegistry::new(kind, init.into_fn()).unwrap();

        assert!(matches!(
            registry.get_instance(),
            Err(Error::Construction { .. })
        ));
        let records = take_own();
        assert!(
            has(&records, Level::Warn, "construction failed"),
            "{kind}: {:?}",
            records.iter().map(|(_, m)| m).collect::<Vec<_>>()
        );
        assert!(
            records
                .iter()
                .any(|(l, m)| *l == Level::Warn && m.starts_with(log_prefix(kind))),
            "{kind}: warning is not tagged with the strategy"
        );
        assert!(!has(&records, Level::Debug, "constructed"), "{kind}");
    }
}

#[test]
fn eager_failure_logs_warning() {
    install();
    take_own();
    let result: lsr_core::Result<LazySingletonRegistry<u8>> =
        LazySingletonRegistry::new(StrategyKind::Eager, || {
            Err(Error::construction("primary", "refused"))
        });
    assert!(result.is_err());
    assert!(has(&take_own(), Level::Warn, "eager: construction failed"));
}

#[test]
fn successful_construction_logs_debug() {
    install();
    for kind in LAZY_KINDS {
        take_own();
        let registry = LazySingletonRegistry::with_infallible(kind, || 7_u8).unwrap();
        registry.get_instance().unwrap();
        let records = take_own();
        let constructed = format!("{} constructed", log_prefix(kind));
        assert!(has(&records, Level::Debug, &constructed), "{kind}");
        assert!(!has(&records, Level::Warn, "construction failed"), "{kind}");
    }
}

static REENTRANT: OnceLock<LazySingletonRegistry<u8>> = OnceLock::new();
static REENTRANT_CALLS: AtomicU32 = AtomicU32::new(0);

#[test]
fn naive_logs_claim_in_both_branches() {
    install();
    take_own();
    // The constructor calls back into the same slot, so the inner call finds
    // the claim already taken.
    let registry = REENTRANT.get_or_init(|| {
        LazySingletonRegistry::with_infallible(StrategyKind::NaiveLazy, || {
            if REENTRANT_CALLS.fetch_add(1, Ordering::SeqCst) == 0 {
                let inner = REENTRANT.get().expect("registry is installed");
                inner.get_instance().expect("inner construction succeeds");
            }
            1_u8
        })
        .unwrap()
    });
    registry.get_instance().unwrap();

    let records = take_own();
    assert!(has(&records, Level::Debug, "naive: constructing"));
    assert!(has(
        &records,
        Level::Debug,
        "naive: constructing while slot is constructing"
    ));
    assert!(has(&records, Level::Warn, "naive: overwrote"));
    assert_eq!(REENTRANT_CALLS.load(Ordering::SeqCst), 2);
}

#[test]
fn fast_paths_log_trace() {
    install();
    for kind in [
        StrategyKind::Serialized,
        StrategyKind::DoubleChecked,
        StrategyKind::OnceGuard,
        StrategyKind::Holder,
    ] {
        let registry = LazySingletonRegistry::with_infallible(kind, || 3_u8).unwrap();
        registry.get_instance().unwrap();
        take_own();

        registry.get_instance().unwrap();
        let records = take_own();
        assert!(
            records.iter().any(|(l, _)| *l == Level::Trace),
            "{kind}: no trace record on the read after construction"
        );
        assert!(!has(&records, Level::Debug, "constructing"), "{kind}");
    }
}
