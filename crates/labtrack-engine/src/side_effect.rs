//! Side-effect contracts for the lifecycle engine.
//!
//! Side-effects are emitted after a mutation has committed. A rolled-back
//! operation emits nothing, so a sink only ever sees facts that are durable.

use labtrack_store::SampleId;

/// A side-effect emitted after committing a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    /// A sample was registered.
    SampleRegistered {
        sample_id: SampleId,
        location: String,
    },
    /// A movement was appended and the sample relocated.
    SampleMoved {
        sample_id: SampleId,
        movement_id: i64,
        from_location: String,
        to_location: String,
    },
    /// An analysis result was appended.
    ResultRecorded {
        sample_id: SampleId,
        result_id: i64,
        assay_type: String,
    },
}

impl SideEffect {
    /// The sample this side-effect concerns.
    pub fn sample_id(&self) -> &SampleId {
        match self {
            Self::SampleRegistered { sample_id, .. }
            | Self::SampleMoved { sample_id, .. }
            | Self::ResultRecorded { sample_id, .. } => sample_id,
        }
    }
}

/// A sink that receives side-effects from the engine.
///
/// Implementations decide what a side-effect means (console narration,
/// notifications, metrics).
pub trait SideEffectSink: Send + Sync {
    /// Called after the corresponding transaction has committed.
    fn emit(&self, effect: SideEffect);
}

/// A no-op sink that discards all side-effects.
#[derive(Debug, Default)]
pub struct NullSink;

impl SideEffectSink for NullSink {
    fn emit(&self, _effect: SideEffect) {}
}

/// A sink that logs each side-effect through `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl SideEffectSink for TracingSink {
    fn emit(&self, effect: SideEffect) {
        match &effect {
            SideEffect::SampleRegistered {
                sample_id,
                location,
            } => tracing::info!(%sample_id, %location, "sample registered"),
            SideEffect::SampleMoved {
                sample_id,
                movement_id,
                from_location,
                to_location,
            } => tracing::info!(
                %sample_id,
                movement_id,
                %from_location,
                %to_location,
                "sample moved"
            ),
            SideEffect::ResultRecorded {
                sample_id,
                result_id,
                assay_type,
            } => tracing::info!(%sample_id, result_id, %assay_type, "result recorded"),
        }
    }
}

/// A sink that records all side-effects, for tests and presentation layers.
#[derive(Debug, Default)]
pub struct RecordingSink {
    effects: std::sync::Mutex<Vec<SideEffect>>,
}

impl RecordingSink {
    /// Creates a new recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded side-effects.
    pub fn effects(&self) -> Vec<SideEffect> {
        self.lock().clone()
    }

    /// Clears all recorded side-effects.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Returns the number of recorded side-effects.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no side-effects have been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SideEffect>> {
        self.effects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SideEffectSink for RecordingSink {
    fn emit(&self, effect: SideEffect) {
        self.lock().push(effect);
    }
}
