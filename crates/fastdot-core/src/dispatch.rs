//! Runtime kernel selection
//!
//! Each call family has an active-implementation slot. A slot starts out
//! *unselected*; the first call through it resolves `Policy::Auto` against the
//! probed CPU, installs the chosen tier and runs it. Every later call loads the
//! slot and jumps straight to the installed kernel.
//!
//! The three slots are packed into one `AtomicU32` (one byte each), so
//! [`Dispatcher::select`] can switch all families with a single store. Writes
//! are racy by intent: two threads resolving concurrently compute the same tier
//! from the same hardware and store the same byte, so no lock is taken.

use crate::capability::CpuFeatures;
use crate::kernels::KernelSet;
use crate::tier::{Family, Policy, Tier};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Tiers in the order selection tries them, strongest first
///
/// Resolution returns the first entry that is at or below the requested
/// ceiling and passes `Tier::is_usable`. `Scalar` is last and always usable.
pub const PRECEDENCE: [Tier; 6] = [
    Tier::Avx512Fma,
    Tier::Avx512,
    Tier::AvxFma,
    Tier::Avx,
    Tier::Sse,
    Tier::Scalar,
];

/// Kernel tables indexed by `Tier as usize`
static KERNELS: [KernelSet; 6] = [
    KernelSet::table(Tier::Scalar),
    KernelSet::table(Tier::Sse),
    KernelSet::table(Tier::Avx),
    KernelSet::table(Tier::AvxFma),
    KernelSet::table(Tier::Avx512),
    KernelSet::table(Tier::Avx512Fma),
];

/// Slot value before anything has been installed
const UNSELECTED: u8 = 0;

/// Resolve a policy to the tier that would be installed on `cpu`
pub fn resolve(policy: Policy, cpu: &CpuFeatures) -> Tier {
    let ceiling = policy.ceiling().unwrap_or(Tier::Avx512Fma);

    for tier in PRECEDENCE.into_iter().filter(|&tier| tier <= ceiling) {
        if tier.is_usable(cpu) {
            return tier;
        }
        log::trace!(
            "{tier} unusable (compiled: {}, cpu: {cpu})",
            tier.is_compiled()
        );
    }

    Tier::Scalar
}

/// Strongest tier usable on `cpu`
pub fn best_tier(cpu: &CpuFeatures) -> Tier {
    resolve(Policy::Auto, cpu)
}

#[inline(always)]
fn shift(family: Family) -> u32 {
    match family {
        Family::Single => 0,
        Family::Double => 8,
        Family::Mixed => 16,
    }
}

#[inline(always)]
fn encode(tier: Tier) -> u32 {
    tier as u32 + 1
}

#[inline(always)]
fn decode(code: u8) -> Option<Tier> {
    match code {
        UNSELECTED => None,
        code => Tier::ALL.get(code as usize - 1).copied(),
    }
}

/// Process-scoped dispatch state for the three call families
///
/// `Dispatcher::new()` is `const`, so an instance can live in a `static`.
/// The crate's free functions use one such global instance; separate
/// instances are independent and mostly useful for testing.
pub struct Dispatcher {
    active: AtomicU32,
}

impl Dispatcher {
    /// A dispatcher with every family unselected
    pub const fn new() -> Self {
        Self {
            active: AtomicU32::new(0),
        }
    }

    #[inline(always)]
    fn slot(&self, family: Family) -> u8 {
        (self.active.load(Ordering::Relaxed) >> shift(family)) as u8
    }

    /// Tier installed for `family`, `None` until the first call or selection
    pub fn active(&self, family: Family) -> Option<Tier> {
        decode(self.slot(family))
    }

    /// Resolve `policy` and install the result for all three families at once
    pub fn select(&self, policy: Policy) -> Tier {
        let cpu = CpuFeatures::detect();
        let tier = resolve(policy, &cpu);
        let code = encode(tier);
        self.active
            .store(code | code << 8 | code << 16, Ordering::Relaxed);
        log_install("all", policy, tier, &cpu);
        tier
    }

    /// Resolve `policy` and install the result for one family only
    pub fn select_family(&self, family: Family, policy: Policy) -> Tier {
        let cpu = CpuFeatures::detect();
        let tier = resolve(policy, &cpu);
        let shift = shift(family);
        let code = encode(tier) << shift;
        let mask = 0xffu32 << shift;
        // The closure always returns Some, so this cannot fail.
        let _ = self
            .active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |packed| {
                Some((packed & !mask) | code)
            });
        log_install(family.name(), policy, tier, &cpu);
        tier
    }

    /// Return every family to the unselected state
    pub fn reset(&self) {
        self.active.store(0, Ordering::Relaxed);
    }

    #[inline]
    fn installed(&self, family: Family) -> Option<&'static KernelSet> {
        decode(self.slot(family)).map(|tier| &KERNELS[tier as usize])
    }

    /// Single precision dot product of `a` and `b`
    #[inline]
    pub fn dot_single(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len(), "operands must have the same length");
        match self.installed(Family::Single) {
            Some(kernels) => kernels.dot_single(a, b),
            None => self.select_then_single(a, b),
        }
    }

    /// Double precision dot product of `a` and `b`
    #[inline]
    pub fn dot_double(&self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "operands must have the same length");
        match self.installed(Family::Double) {
            Some(kernels) => kernels.dot_double(a, b),
            None => self.select_then_double(a, b),
        }
    }

    /// Dot product of single precision `a` and `b`, accumulated in double
    #[inline]
    pub fn dot_mixed(&self, a: &[f32], b: &[f32]) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "operands must have the same length");
        match self.installed(Family::Mixed) {
            Some(kernels) => kernels.dot_mixed(a, b),
            None => self.select_then_mixed(a, b),
        }
    }

    #[cold]
    #[inline(never)]
    fn select_then_single(&self, a: &[f32], b: &[f32]) -> f32 {
        let tier = self.select_family(Family::Single, Policy::Auto);
        KERNELS[tier as usize].dot_single(a, b)
    }

    #[cold]
    #[inline(never)]
    fn select_then_double(&self, a: &[f64], b: &[f64]) -> f64 {
        let tier = self.select_family(Family::Double, Policy::Auto);
        KERNELS[tier as usize].dot_double(a, b)
    }

    #[cold]
    #[inline(never)]
    fn select_then_mixed(&self, a: &[f32], b: &[f32]) -> f64 {
        let tier = self.select_family(Family::Mixed, Policy::Auto);
        KERNELS[tier as usize].dot_mixed(a, b)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("single", &self.active(Family::Single))
            .field("double", &self.active(Family::Double))
            .field("mixed", &self.active(Family::Mixed))
            .finish()
    }
}

fn log_install(target: &str, policy: Policy, tier: Tier, cpu: &CpuFeatures) {
    match policy.ceiling() {
        Some(requested) if requested != tier => log::debug!(
            "dot product ({target}): requested {requested} unavailable, installed {tier} (cpu: {cpu})"
        ),
        _ => log::debug!("dot product ({target}): installed {tier} for policy {policy} (cpu: {cpu})"),
    }
}

static GLOBAL: Dispatcher = Dispatcher::new();

/// The process-wide dispatcher behind the free functions
pub fn global() -> &'static Dispatcher {
    &GLOBAL
}

/// Single precision dot product on the process-wide dispatcher
#[inline]
pub fn dot_single(a: &[f32], b: &[f32]) -> f32 {
    GLOBAL.dot_single(a, b)
}

/// Double precision dot product on the process-wide dispatcher
#[inline]
pub fn dot_double(a: &[f64], b: &[f64]) -> f64 {
    GLOBAL.dot_double(a, b)
}

/// Single precision inputs, double precision accumulation, on the
/// process-wide dispatcher
#[inline]
pub fn dot_mixed(a: &[f32], b: &[f32]) -> f64 {
    GLOBAL.dot_mixed(a, b)
}

/// Re-select the kernels of all three families on the process-wide dispatcher
///
/// Returns the tier actually installed, which is weaker than requested when
/// the requested tier is not compiled in or not supported by this CPU.
pub fn select(policy: Policy) -> Tier {
    GLOBAL.select(policy)
}

/// Tier currently installed for `family` on the process-wide dispatcher
pub fn active_tier(family: Family) -> Option<Tier> {
    GLOBAL.active(family)
}
