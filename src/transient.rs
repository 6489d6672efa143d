use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The kinds of short-lived graphics objects a reference render creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransientKind {
    ShaderProgram,
    BindingLayout,
    PipelineLayout,
    Pipeline,
    BindingSet,
    CommandSequence,
}

impl TransientKind {
    /// Every tracked kind, in the creation order of a reference render.
    pub const ALL: [Self; 6] = [
        Self::ShaderProgram,
        Self::BindingLayout,
        Self::PipelineLayout,
        Self::Pipeline,
        Self::BindingSet,
        Self::CommandSequence,
    ];

    const COUNT: usize = Self::ALL.len();

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Default)]
struct Counters {
    live: [AtomicUsize; TransientKind::COUNT],
    created: [AtomicUsize; TransientKind::COUNT],
}

/// Shared live/created counters for every transient kind.
///
/// Cloning is cheap; all clones observe the same counters. The environment
/// threads one handle into every object it creates, so a test can assert
/// that a harness call released everything it acquired.
#[derive(Debug, Clone, Default)]
pub struct TransientStats {
    counters: Arc<Counters>,
}

impl TransientStats {
    fn acquire(&self, kind: TransientKind) {
        self.counters.created[kind.index()].fetch_add(1, Ordering::Relaxed);
        self.counters.live[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    fn release(&self, kind: TransientKind) {
        self.counters.live[kind.index()].fetch_sub(1, Ordering::Relaxed);
    }

    /// Currently allocated objects of `kind`.
    #[inline]
    #[must_use]
    pub fn live(&self, kind: TransientKind) -> usize {
        self.counters.live[kind.index()].load(Ordering::Relaxed)
    }

    /// Currently allocated objects across all kinds.
    #[must_use]
    pub fn live_total(&self) -> usize {
        TransientKind::ALL.iter().map(|kind| self.live(*kind)).sum()
    }

    /// Objects of `kind` created since the environment came up.
    #[inline]
    #[must_use]
    pub fn created(&self, kind: TransientKind) -> usize {
        self.counters.created[kind.index()].load(Ordering::Relaxed)
    }
}

/// A graphics object whose lifetime is confined to one harness call.
///
/// Wraps the raw wgpu object together with the stats handle that accounted
/// for it. The live count drops exactly once, on `Drop` or [`into_inner`],
/// so release happens on every exit path including the error path.
///
/// [`into_inner`]: Transient::into_inner
pub struct Transient<T> {
    inner: Option<T>,
    kind: TransientKind,
    stats: TransientStats,
}

impl<T> Transient<T> {
    pub(crate) fn new(inner: T, kind: TransientKind, stats: &TransientStats) -> Self {
        stats.acquire(kind);
        Self {
            inner: Some(inner),
            kind,
            stats: stats.clone(),
        }
    }

    /// Which tracked kind this object belongs to.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TransientKind {
        self.kind
    }

    /// Borrow the raw wgpu object.
    ///
    /// `Deref` covers most call sites; this exists for parameters whose
    /// generics defeat deref coercion (e.g. `set_bind_group`).
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &T {
        self.inner
            .as_ref()
            .expect("transient object already consumed")
    }

    /// Unwrap the raw object, releasing the live count now.
    ///
    /// For objects wgpu consumes by value (a command sequence moving into
    /// `Queue::submit`).
    #[must_use]
    pub fn into_inner(mut self) -> T {
        let inner = self
            .inner
            .take()
            .expect("transient object already consumed");
        self.stats.release(self.kind);
        inner
    }
}

impl<T> Deref for Transient<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        self.raw()
    }
}

impl<T> Drop for Transient<T> {
    fn drop(&mut self) {
        if self.inner.take().is_some() {
            self.stats.release(self.kind);
        }
    }
}

/// Compiled compute-stage code, consumed by pipeline creation.
pub type ShaderProgram = Transient<wgpu::ShaderModule>;
/// Description of the single writable-image binding slot.
pub type BindingLayout = Transient<wgpu::BindGroupLayout>;
/// Pipeline-level arrangement of binding layouts.
pub type PipelineLayout = Transient<wgpu::PipelineLayout>;
/// Compute pipeline, created once and used for exactly one dispatch.
pub type PipelineObject = Transient<wgpu::ComputePipeline>;
/// One allocated binding-set instance, written once and never reused.
pub type BindingSet = Transient<wgpu::BindGroup>;
/// Recorded commands, submitted once and consumed by the submit.
pub type CommandSequence = Transient<wgpu::CommandBuffer>;
