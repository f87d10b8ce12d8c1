pub mod batch;
pub mod broadcast;
pub mod clock;
pub mod config;
pub mod discovery;
pub mod driver;
pub mod engine;
pub mod error;
pub mod logging;

pub use batch::{
    new_job_id, BatchProgress, BatchSnapshot, BatchState, ControlState, FileTask, RunGuard,
    TaskStatus,
};
pub use broadcast::{BatchEvent, BatchEventBroadcaster, BatchEventKind};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{load_config, BatchConfig, SlotDefinition};
pub use discovery::{build_tasks, FolderScanner, SlotMatcher};
pub use driver::{BatchDriver, BatchHandle};
pub use engine::{
    EngineOutcome, EngineState, EngineSubscription, EngineTransition, ExecutionEngine,
    RunContext, TransitionBroadcaster,
};
pub use error::{BatchflowError, ConfigError, DiscoveryError, DriverError, EngineError};
pub use logging::{init_logging, LogFormat};
