//! Reentrancy guard and no-op diversion of the outer build.
//!
//! The orchestrator starts its nested builds through the same host, and the
//! host loads the same project plugins for them. Without a guard every nested
//! build would start another pair of nested builds. The [`ReentrancyFlag`] is
//! set once, by the first build-start that reaches the orchestrator, and every
//! build that sees it set runs with its natural host behavior.
//!
//! The outer build itself produces nothing: [`DiversionPlugin`] points its
//! input at a virtual, empty entry and turns off writing.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use duplex_config::BuildMode;
use tracing::debug;

use crate::host::{Apply, ConfigEnv, EntryInput, Enforce, HostPlugin, InlineConfig};

/// Virtual module the outer build is pointed at. The NUL prefix never occurs
/// in a filesystem path.
pub const NOOP_ENTRY_ID: &str = "\0duplex:noop-entry.html";

/// Environment variable that marks a process as already inside a duplex
/// build. Read only: a child process started by a nested build inherits it
/// from whoever set it.
pub const NESTED_BUILD_ENV: &str = "IS_DUPLEX_BUILDER";

static PROCESS_FLAG: AtomicBool = AtomicBool::new(false);

/// Whether the inherited environment value marks a nested build.
pub fn env_marks_nested(value: Option<&OsStr>) -> bool {
    match value {
        Some(value) => !value.is_empty() && value != "0" && value != "false",
        None => false,
    }
}

#[derive(Debug, Clone)]
enum FlagScope {
    Process,
    Isolated(Arc<AtomicBool>),
}

/// Handle on the "orchestrator already started" state.
///
/// The default handle is process-wide. [`ReentrancyFlag::isolated`] gives a
/// private flag, for running several independent top-level builds in one
/// process.
#[derive(Debug, Clone)]
pub struct ReentrancyFlag {
    scope: FlagScope,
}

impl Default for ReentrancyFlag {
    fn default() -> Self {
        Self::process()
    }
}

impl ReentrancyFlag {
    pub fn process() -> Self {
        Self {
            scope: FlagScope::Process,
        }
    }

    pub fn isolated() -> Self {
        Self {
            scope: FlagScope::Isolated(Arc::new(AtomicBool::new(false))),
        }
    }

    fn atomic(&self) -> &AtomicBool {
        match &self.scope {
            FlagScope::Process => &PROCESS_FLAG,
            FlagScope::Isolated(flag) => flag,
        }
    }

    pub fn is_set(&self) -> bool {
        if self.atomic().load(Ordering::Acquire) {
            return true;
        }
        match self.scope {
            FlagScope::Process => env_marks_nested(std::env::var_os(NESTED_BUILD_ENV).as_deref()),
            FlagScope::Isolated(_) => false,
        }
    }

    /// Set the flag. Exactly one caller observes an outer context; everyone
    /// after it (and everyone in a process that inherited the marker) gets a
    /// nested one. The flag is never cleared.
    pub fn enter(&self) -> BuildContext {
        let inherited = matches!(self.scope, FlagScope::Process)
            && env_marks_nested(std::env::var_os(NESTED_BUILD_ENV).as_deref());
        if inherited {
            return BuildContext::nested();
        }
        match self
            .atomic()
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => BuildContext::outer(),
            Err(_) => BuildContext::nested(),
        }
    }
}

/// Passed to the orchestrator at build start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildContext {
    pub is_nested_invocation: bool,
}

impl BuildContext {
    pub fn outer() -> Self {
        Self {
            is_nested_invocation: false,
        }
    }

    pub fn nested() -> Self {
        Self {
            is_nested_invocation: true,
        }
    }
}

/// Turns the outer build into a no-op build of [`NOOP_ENTRY_ID`].
#[derive(Debug, Clone)]
pub struct DiversionPlugin {
    mode: BuildMode,
    flag: ReentrancyFlag,
}

impl DiversionPlugin {
    pub const NAME: &'static str = "duplex:skip";

    pub fn new(mode: BuildMode, flag: ReentrancyFlag) -> Self {
        Self { mode, flag }
    }

    fn is_sentinel(&self, id: &str) -> bool {
        !self.mode.is_skip() && id == NOOP_ENTRY_ID
    }
}

impl HostPlugin for DiversionPlugin {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(Self::NAME)
    }

    fn enforce(&self) -> Enforce {
        Enforce::Pre
    }

    fn apply(&self) -> Apply {
        Apply::Build
    }

    fn config(&self, config: &mut InlineConfig, _env: &ConfigEnv) {
        if self.mode.is_skip() || self.flag.is_set() {
            return;
        }
        debug!(entry = %NOOP_ENTRY_ID.escape_debug(), "diverting outer build");
        config.build.write = false;
        config.build.copy_public_dir = false;
        config.build.ssr = None;
        config.build.input = vec![EntryInput::new("main", NOOP_ENTRY_ID)];
    }

    fn resolve_id(&self, specifier: &str) -> Option<String> {
        self.is_sentinel(specifier).then(|| specifier.to_string())
    }

    fn load(&self, id: &str) -> Option<String> {
        self.is_sentinel(id).then(String::new)
    }
}
