//! Fatal assertion primitive.
//!
//! A failed check runs the optional [`DiagnosticHook`], emits a `tracing`
//! error event, writes `"<description> failed at <file>:<line>"` to stderr,
//! flushes it and aborts the process. Nothing a hook does can stop the abort.
//!
//! Configuration lives in a [`Sentinel`]. Callers either thread one through
//! explicitly or [`install`] it once for the whole process; until then
//! [`Sentinel::global`] hands out a hook-less default.

use std::fmt;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::{Arc, OnceLock};

use tracing::error;

/// Callback receiving `(description, file, line)` just before termination.
pub type DiagnosticHook = Arc<dyn Fn(&str, &str, u32) + Send + Sync>;

static INSTALLED: OnceLock<Sentinel> = OnceLock::new();
static FALLBACK: Sentinel = Sentinel::new();

/// Description of a failed check, built only on the failure path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatalRecord<'a> {
    /// Text of the failed condition.
    pub description: &'a str,
    /// Source file of the call site.
    pub file: &'a str,
    /// Line of the call site.
    pub line: u32,
}

impl<'a> FatalRecord<'a> {
    /// Record for an explicit location.
    pub fn new(description: &'a str, file: &'a str, line: u32) -> Self {
        Self {
            description,
            file,
            line,
        }
    }

    /// Record located at the caller.
    #[track_caller]
    pub fn here(description: &'a str) -> Self {
        let location = Location::caller();
        Self::new(description, location.file(), location.line())
    }
}

impl fmt::Display for FatalRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed at {}:{}", self.description, self.file, self.line)
    }
}

/// Owner of the fatal-path configuration.
#[derive(Clone, Default)]
pub struct Sentinel {
    hook: Option<DiagnosticHook>,
}

impl Sentinel {
    /// Sentinel without a diagnostic hook.
    pub const fn new() -> Self {
        Self { hook: None }
    }

    /// Start configuring a sentinel.
    pub fn builder() -> SentinelBuilder {
        SentinelBuilder::default()
    }

    /// The process-wide sentinel, or the hook-less default if none was installed.
    pub fn global() -> &'static Sentinel {
        INSTALLED.get().unwrap_or(&FALLBACK)
    }

    /// Whether a diagnostic hook is configured.
    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }

    /// Terminate unless `condition` holds.
    #[track_caller]
    pub fn check(&self, condition: bool, description: &str) {
        if !condition {
            self.fail(description);
        }
    }

    /// Terminate, reporting the caller's location.
    #[track_caller]
    pub fn fail(&self, description: &str) -> ! {
        self.terminate(&FatalRecord::here(description))
    }

    /// Terminate with a prepared record.
    ///
    /// Runs the hook, then reports the record as a `tracing` error event and
    /// on stderr, then aborts. A hook that panics in a `panic = "abort"`
    /// build aborts the process itself and the stderr line is never written.
    pub fn terminate(&self, record: &FatalRecord<'_>) -> ! {
        if let Some(hook) = &self.hook {
            // Only effective under panic = "unwind"; with the workspace's abort
            // profiles a panicking hook ends the process before the report below.
            let _ = panic::catch_unwind(AssertUnwindSafe(|| {
                hook(record.description, record.file, record.line);
            }));
        }
        error!(
            description = record.description,
            file = record.file,
            line = record.line,
            "fatal assertion"
        );
        log_abort(record);
        std::process::abort()
    }
}

impl fmt::Debug for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sentinel")
            .field("hook", &self.hook.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Builder for [`Sentinel`].
#[derive(Default)]
pub struct SentinelBuilder {
    hook: Option<DiagnosticHook>,
}

impl SentinelBuilder {
    /// Call `hook` with the failed condition and location before aborting.
    pub fn hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &str, u32) + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Finish configuration.
    pub fn build(self) -> Sentinel {
        Sentinel { hook: self.hook }
    }
}

/// Install the process-wide sentinel.
///
/// Only the first call succeeds; later calls get their sentinel back.
pub fn install(sentinel: Sentinel) -> Result<(), Sentinel> {
    INSTALLED.set(sentinel)
}

/// Whether [`install`] has succeeded in this process.
pub fn installed() -> bool {
    INSTALLED.get().is_some()
}

fn log_abort(record: &FatalRecord<'_>) {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{record}");
    let _ = stderr.flush();
}

/// Abort the process unless the condition holds.
///
/// The stringified condition becomes the description, and the invocation
/// site the reported location.
#[macro_export]
macro_rules! fatal_assert {
    ($cond:expr $(,)?) => {
        $crate::Sentinel::global().check($cond, ::core::stringify!($cond))
    };
}

/// Unconditionally log `description` at the invocation site and abort.
#[macro_export]
macro_rules! fatal_abort {
    ($description:expr $(,)?) => {
        $crate::Sentinel::global().fail($description)
    };
}
